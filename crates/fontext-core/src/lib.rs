//! fontext core: values that stay cached until the font changes
//!
//! Font editors keep a live object graph (a font, its glyphs, its kerning
//! and groups) and tell observers when something in it changes. This crate
//! attaches computed values to those objects and throws them away the moment
//! one of the changes they depend on is reported.
//!
//! ## The Pieces
//!
//! From the bottom up:
//!
//! 1. **Notification bus** ([`bus`]) - subscribe to named changes on an owner
//! 2. **Cache store** ([`cache`]) - per-owner slots, keyed by extension and argument
//! 3. **Registrar** ([`registrar`]) - wires an extension's events to its slots
//! 4. **Extensions** ([`extension`], [`registry`]) - the `font_method`,
//!    `font_property`, `font_cached_method` and `font_cached_property`
//!    declarations and the typed handles they return
//! 5. **Lifecycle** - destroyed owners take their caches and subscriptions with them
//!
//! ## Declare, Build, Call
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use fontext_core::events::GlyphEvent;
//! use fontext_core::*;
//!
//! struct Glyph(OwnerId);
//! impl Owner for Glyph {
//!     const KIND: OwnerKind = OwnerKind::Glyph;
//!     fn owner_id(&self) -> OwnerId { self.0 }
//! }
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let counter = calls.clone();
//!
//! let mut builder = RegistryBuilder::new();
//! let area = builder.font_cached_property(
//!     "area",
//!     Dependencies::<Glyph>::new().on(GlyphEvent::ContoursChanged),
//!     move |_, _| {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!         Ok(42.0_f64)
//!     },
//! )?;
//!
//! let bus = Arc::new(EventBus::new());
//! let ext = Extensions::new(Arc::new(builder.build()), bus.clone(), CacheConfig::default());
//! let glyph = Glyph(OwnerId::fresh());
//!
//! area.get(&ext, &glyph)?;
//! area.get(&ext, &glyph)?;
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//!
//! bus.emit(glyph.0, GlyphEvent::ContoursChanged.into());
//! area.get(&ext, &glyph)?;
//! assert_eq!(calls.load(Ordering::SeqCst), 2);
//! # Ok::<(), ExtError>(())
//! ```
//!
//! ## Implementing a Host
//!
//! A host implements [`Owner`] for its object handles and either emits on an
//! [`EventBus`] or adapts its own observer mechanism behind
//! [`NotificationBus`]. It must report owner destruction through the bus's
//! lifecycle signal, otherwise caches of dead owners linger until
//! [`Extensions::forget`] is called.

pub mod bus;
pub mod cache;
pub mod cache_config;
pub mod context;
pub mod error;
pub mod events;
pub mod extension;
mod lifecycle;
pub mod owner;
pub mod registrar;
pub mod registry;

#[cfg(test)]
mod proptests;

pub use bus::{EventBus, Lifecycle, Notification, NotificationBus, SubscriptionHandle};
pub use cache::{CacheMetrics, CacheStore, EntryState, FunctionId};
pub use cache_config::CacheConfig;
pub use context::Extensions;
pub use error::{ConfigError, ExtError, Result};
pub use events::Event;
pub use extension::{
    CachedMethod, CachedProperty, Dependencies, DependencyDescriptor, ExtensionDescriptor,
    ExtensionKind, Method, Property,
};
pub use owner::{Owner, OwnerId, OwnerKind};
pub use registrar::{EventBinding, Registrar, Registration};
pub use registry::{ExtensionRegistry, RegistryBuilder, RegistryId};
