//! Extension handles and their invalidation dependencies
//!
//! Declaring an extension through a [`RegistryBuilder`](crate::RegistryBuilder)
//! returns a typed handle. The handle is how callers invoke the extension:
//!
//! - [`Method`] and [`Property`] run their body on every call
//! - [`CachedMethod`] and [`CachedProperty`] memoize per owner (and per argument
//!   for methods) until one of their [`Dependencies`] fires
//!
//! Handles are cheap to clone and carry the identity of the registry that
//! declared them; using one with an [`Extensions`] context built from a
//! different registry is a configuration error.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use serde::Serialize;

use crate::cache::{EntryState, FunctionId};
use crate::context::Extensions;
use crate::error::{ConfigError, Result};
use crate::events::Event;
use crate::owner::{Owner, OwnerId, OwnerKind};
use crate::registrar::EventBinding;
use crate::registry::RegistryId;

/// The four flavours of extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionKind {
    Method,
    Property,
    CachedMethod,
    CachedProperty,
}

impl ExtensionKind {
    pub fn is_cached(self) -> bool {
        matches!(self, ExtensionKind::CachedMethod | ExtensionKind::CachedProperty)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExtensionKind::Method => "method",
            ExtensionKind::Property => "property",
            ExtensionKind::CachedMethod => "cached method",
            ExtensionKind::CachedProperty => "cached property",
        }
    }
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One invalidation event as recorded in a descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyDescriptor {
    pub event: Event,
    /// Name of the related owner the event is observed on; `None` for the
    /// owner itself
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<&'static str>,
}

/// What the registry knows about a declared extension
#[derive(Debug, Clone, Serialize)]
pub struct ExtensionDescriptor {
    #[serde(skip)]
    pub id: FunctionId,
    pub name: String,
    pub target: OwnerKind,
    pub kind: ExtensionKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyDescriptor>,
}

type Resolver<O> = Arc<dyn Fn(&O) -> Option<OwnerId> + Send + Sync>;

struct Related<O> {
    event: Event,
    via: &'static str,
    resolve: Resolver<O>,
}

/// The events that invalidate a cached extension
///
/// Events on the owner itself must be emitted by the owner's kind. Events on
/// another object go through [`on_related`](Dependencies::on_related), whose
/// accessor is called once, when the extension is first used on an owner.
///
/// ```
/// use fontext_core::{Dependencies, Owner, OwnerId, OwnerKind};
/// use fontext_core::events::GlyphEvent;
///
/// struct Glyph(OwnerId);
/// impl Owner for Glyph {
///     const KIND: OwnerKind = OwnerKind::Glyph;
///     fn owner_id(&self) -> OwnerId { self.0 }
/// }
///
/// let deps = Dependencies::<Glyph>::new()
///     .on(GlyphEvent::AnchorsChanged)
///     .on_named("Glyph.Changed");
/// assert_eq!(deps.len(), 2);
/// ```
pub struct Dependencies<O> {
    own: Vec<Event>,
    related: Vec<Related<O>>,
    error: Option<ConfigError>,
}

impl<O: Owner> Dependencies<O> {
    pub fn new() -> Self {
        Self {
            own: Vec::new(),
            related: Vec::new(),
            error: None,
        }
    }

    /// Parse a whole list of event names on the owner itself
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        names
            .into_iter()
            .fold(Self::new(), |deps, name| deps.on_named(name))
    }

    /// Invalidate when the owner fires `event`
    pub fn on(mut self, event: impl Into<Event>) -> Self {
        let event = event.into();
        if event.emitter() != O::KIND {
            self.fail(ConfigError::EventNotEmitted {
                event,
                target: O::KIND,
            });
        } else if !self.own.contains(&event) {
            self.own.push(event);
        }
        self
    }

    /// Like [`on`](Self::on), with the event given by name
    pub fn on_named(self, name: &str) -> Self {
        match name.parse::<Event>() {
            Ok(event) => self.on(event),
            Err(err) => self.failed(err),
        }
    }

    /// Invalidate when a related object fires `event`
    ///
    /// `resolve` finds the related object from the owner. `via` names the
    /// relation in descriptors and error messages.
    pub fn on_related<R, F>(mut self, event: impl Into<Event>, via: &'static str, resolve: F) -> Self
    where
        R: Owner,
        F: Fn(&O) -> Option<R> + Send + Sync + 'static,
    {
        let event = event.into();
        if event.emitter() != R::KIND {
            self.fail(ConfigError::EventNotEmitted {
                event,
                target: R::KIND,
            });
            return self;
        }
        if self
            .related
            .iter()
            .any(|related| related.event == event && related.via == via)
        {
            return self;
        }
        self.related.push(Related {
            event,
            via,
            resolve: Arc::new(move |owner| resolve(owner).map(|related| related.owner_id())),
        });
        self
    }

    /// Like [`on_related`](Self::on_related), with the event given by name
    pub fn on_related_named<R, F>(self, name: &str, via: &'static str, resolve: F) -> Self
    where
        R: Owner,
        F: Fn(&O) -> Option<R> + Send + Sync + 'static,
    {
        match name.parse::<Event>() {
            Ok(event) => self.on_related(event, via, resolve),
            Err(err) => self.failed(err),
        }
    }

    pub fn len(&self) -> usize {
        self.own.len() + self.related.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fail(&mut self, err: ConfigError) {
        self.error.get_or_insert(err);
    }

    fn failed(mut self, err: ConfigError) -> Self {
        self.fail(err);
        self
    }

    /// Surface the first declaration error, if any
    pub(crate) fn validate(mut self, extension: &str) -> std::result::Result<Self, ConfigError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        if self.is_empty() {
            return Err(ConfigError::NoDependencies(extension.to_string()));
        }
        Ok(self)
    }

    pub(crate) fn describe(&self) -> Vec<DependencyDescriptor> {
        self.own
            .iter()
            .map(|event| DependencyDescriptor {
                event: *event,
                via: None,
            })
            .chain(self.related.iter().map(|related| DependencyDescriptor {
                event: related.event,
                via: Some(related.via),
            }))
            .collect()
    }

    /// Resolve every dependency against a concrete owner
    pub(crate) fn bindings(&self, owner: &O, extension: &str) -> Result<Vec<EventBinding>> {
        let id = owner.owner_id();
        let mut bindings: Vec<EventBinding> = self
            .own
            .iter()
            .map(|event| EventBinding::new(*event, id))
            .collect();
        for related in &self.related {
            let source = (related.resolve)(owner).ok_or_else(|| ConfigError::UnresolvedRelated {
                extension: extension.to_string(),
                via: related.via,
                owner: id,
            })?;
            bindings.push(EventBinding::new(related.event, source));
        }
        Ok(bindings)
    }
}

impl<O: Owner> Default for Dependencies<O> {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity shared by every handle kind
#[derive(Debug, Clone)]
pub(crate) struct Declared {
    pub(crate) registry: RegistryId,
    pub(crate) id: FunctionId,
    pub(crate) name: Arc<str>,
}

pub(crate) type MethodBody<O, A, V> = dyn Fn(&Extensions, &O, &A) -> Result<V> + Send + Sync;
pub(crate) type PropertyBody<O, V> = dyn Fn(&Extensions, &O) -> Result<V> + Send + Sync;

/// Uncached extension method taking one argument
pub struct Method<O, A, V> {
    pub(crate) declared: Declared,
    pub(crate) body: Arc<MethodBody<O, A, V>>,
}

impl<O: Owner, A, V> Method<O, A, V> {
    pub fn call(&self, ext: &Extensions, owner: &O, arg: A) -> Result<V> {
        ext.check_handle(&self.declared)?;
        (self.body)(ext, owner, &arg)
    }

    pub fn name(&self) -> &str {
        &self.declared.name
    }

    pub fn id(&self) -> FunctionId {
        self.declared.id
    }
}

/// Uncached extension property
pub struct Property<O, V> {
    pub(crate) declared: Declared,
    pub(crate) body: Arc<PropertyBody<O, V>>,
}

impl<O: Owner, V> Property<O, V> {
    pub fn get(&self, ext: &Extensions, owner: &O) -> Result<V> {
        ext.check_handle(&self.declared)?;
        (self.body)(ext, owner)
    }

    pub fn name(&self) -> &str {
        &self.declared.name
    }

    pub fn id(&self) -> FunctionId {
        self.declared.id
    }
}

/// Cached extension method; every argument value gets its own slot
pub struct CachedMethod<O, A, V> {
    pub(crate) declared: Declared,
    pub(crate) dependencies: Arc<Dependencies<O>>,
    pub(crate) body: Arc<MethodBody<O, A, V>>,
}

impl<O, A, V> CachedMethod<O, A, V>
where
    O: Owner,
    A: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn call(&self, ext: &Extensions, owner: &O, arg: A) -> Result<V> {
        ext.cached(&self.declared, &self.dependencies, owner, &arg, || {
            (self.body)(ext, owner, &arg)
        })
    }

    /// State of the slot for `arg` on `owner`
    pub fn state(&self, ext: &Extensions, owner: &O, arg: &A) -> EntryState {
        ext.store()
            .entry_state::<A, V>(owner.owner_id(), self.declared.id, arg)
    }

    /// Throw away every cached value of this method on `owner`
    pub fn invalidate(&self, ext: &Extensions, owner: &O) -> usize {
        ext.store().invalidate(owner.owner_id(), self.declared.id)
    }

    pub fn name(&self) -> &str {
        &self.declared.name
    }

    pub fn id(&self) -> FunctionId {
        self.declared.id
    }
}

/// Cached extension property
pub struct CachedProperty<O, V> {
    pub(crate) declared: Declared,
    pub(crate) dependencies: Arc<Dependencies<O>>,
    pub(crate) body: Arc<PropertyBody<O, V>>,
}

impl<O, V> CachedProperty<O, V>
where
    O: Owner,
    V: Clone + Send + Sync + 'static,
{
    pub fn get(&self, ext: &Extensions, owner: &O) -> Result<V> {
        ext.cached(&self.declared, &self.dependencies, owner, &(), || {
            (self.body)(ext, owner)
        })
    }

    pub fn state(&self, ext: &Extensions, owner: &O) -> EntryState {
        ext.store()
            .entry_state::<(), V>(owner.owner_id(), self.declared.id, &())
    }

    pub fn invalidate(&self, ext: &Extensions, owner: &O) -> usize {
        ext.store().invalidate(owner.owner_id(), self.declared.id)
    }

    pub fn name(&self) -> &str {
        &self.declared.name
    }

    pub fn id(&self) -> FunctionId {
        self.declared.id
    }
}

macro_rules! impl_clone {
    ($ty:ident < $($param:ident),+ >, $($field:ident),+) => {
        impl<$($param),+> Clone for $ty<$($param),+> {
            fn clone(&self) -> Self {
                Self {
                    $($field: self.$field.clone()),+
                }
            }
        }
    };
}

impl_clone!(Method<O, A, V>, declared, body);
impl_clone!(Property<O, V>, declared, body);
impl_clone!(CachedMethod<O, A, V>, declared, dependencies, body);
impl_clone!(CachedProperty<O, V>, declared, dependencies, body);
