//! A notifying font object graph
//!
//! [`Font`], [`Glyph`], [`Kerning`] and [`Groups`] are shared handles over
//! interior-mutable data. Every mutation reports what changed on an
//! [`EventBus`](fontext_core::EventBus) before it returns, which is what
//! keeps `fontext` caches honest:
//!
//! | mutation                   | owner events                          | font events                 |
//! |----------------------------|---------------------------------------|-----------------------------|
//! | `Glyph::append_anchor`     | `AnchorsChanged`, `Changed`           | `Changed`                   |
//! | `Glyph::set_contours`      | `ContoursChanged`, `Changed`          | `Changed`                   |
//! | `Glyph::set_width`         | `WidthChanged`, `Changed`             | `MetricsChanged`, `Changed` |
//! | `Glyph::set_unicodes`      | `UnicodesChanged`, `Changed`          | `UnicodesChanged`, `Changed`|
//! | `Glyph::rename`            | `NameChanged`, `Changed`              | `GlyphsChanged`, `Changed`  |
//! | `Font::add_glyph` / remove | -                                     | `GlyphsChanged`, `Changed`  |
//! | `Kerning::set`             | `PairSet`, `Changed`                  | `Changed`                   |
//! | `Groups::set`              | `GroupSet`, `Changed`                 | `Changed`                   |
//!
//! Each object announces its creation on the bus, and its destruction when
//! the last handle goes away, when a glyph is removed from its font, or when
//! the font is [closed](Font::close).
//!
//! ```
//! use std::sync::Arc;
//! use fontext_core::EventBus;
//! use fontext_host::{Anchor, Font, GlyphData};
//!
//! let font = Font::new(Arc::new(EventBus::new()));
//! let a = font.add_glyph(GlyphData::new("a").with_width(500.0).with_unicodes(['a']))?;
//! a.append_anchor(Anchor::new("top", 250.0, 700.0));
//! assert_eq!(font.glyph("a").unwrap().anchors().len(), 1);
//! # Ok::<(), fontext_host::HostError>(())
//! ```

pub mod error;
mod font;
pub mod geometry;
mod glyph;
mod groups;
mod kerning;
mod node;
mod ufo;

pub use error::{HostError, Result};
pub use font::{Font, FontInfo};
pub use geometry::{Anchor, Contour, ContourPoint, PointKind};
pub use glyph::{GeometryMut, Glyph, GlyphData};
pub use groups::{Groups, KERN1_PREFIX, KERN2_PREFIX};
pub use kerning::{Kerning, Pair};
