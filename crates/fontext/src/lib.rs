//! fontext - cached extensions for fonts
//!
//! The extensions here are declared through `fontext-core` on the
//! `fontext-host` object graph. Cached ones are recomputed only after one of
//! the changes they depend on is reported:
//!
//! | extension              | owner   | kind            | invalidated by                                   |
//! |------------------------|---------|-----------------|--------------------------------------------------|
//! | `anchors_map`          | Glyph   | cached property | `Glyph.AnchorsChanged`                           |
//! | `bounds`               | Glyph   | cached property | `Glyph.ContoursChanged`                          |
//! | `segments`             | Glyph   | cached property | `Glyph.ContoursChanged`                          |
//! | `flatten_pair`         | Kerning | cached method   | `Kerning.Changed`, `Groups.Changed` (font groups)|
//! | `flattened_kerning`    | Kerning | cached property | `Kerning.Changed`, `Groups.Changed` (font groups)|
//! | `unicode_map`          | Font    | cached property | `Font.GlyphsChanged`, `Font.UnicodesChanged`     |
//! | `shape_text`           | Font    | cached method   | as `unicode_map`, plus `Font.MetricsChanged`     |
//! | `scale`                | Glyph   | method          | -                                                |
//! | `scale_font`           | Font    | method          | -                                                |
//! | `interpolate_segments` | Glyph   | method          | -                                                |
//! | `remove_overlap`       | Glyph   | method          | -                                                |
//!
//! # Example
//!
//! ```
//! use fontext::{FontSession, host::{Anchor, GlyphData}};
//! use fontext_core::CacheConfig;
//!
//! let session = FontSession::new(CacheConfig::default())?;
//! let font = session.new_font();
//! let glyph = font.add_glyph(GlyphData::new("a").with_anchor(Anchor::new("top", 250.0, 700.0)))?;
//!
//! let fx = session.extensions();
//! assert_eq!(fx.anchors_map.get(session.context(), &glyph)?["top"].len(), 1);
//!
//! glyph.append_anchor(Anchor::new("top", 260.0, 720.0));
//! assert_eq!(fx.anchors_map.get(session.context(), &glyph)?["top"].len(), 2);
//! # Ok::<(), fontext_core::ExtError>(())
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` (default): `scale_font` scales glyphs on the rayon pool

pub mod anchors;
pub mod interpolate;
pub mod kerning;
pub mod outline;
pub mod overlap;
pub mod scale;
mod session;
pub mod shaping;
pub mod unicode;

use std::sync::Arc;

use kurbo::Rect;

use fontext_core::{CachedMethod, CachedProperty, Method, RegistryBuilder, Result};
use fontext_host::{Font, Glyph, Kerning, Pair};

pub use fontext_host as host;

pub use anchors::AnchorsMap;
pub use interpolate::Interpolation;
pub use kerning::FlatKerning;
pub use outline::Segments;
pub use overlap::{NoOverlapRemover, OverlapRemover};
pub use scale::Scale;
pub use session::FontSession;
pub use shaping::{CmapShaper, GlyphRun, PositionedGlyph, Shaper};
pub use unicode::UnicodeMap;

/// Handles to every font extension, all declared on one registry
#[derive(Clone)]
pub struct FontExtensions {
    pub anchors_map: CachedProperty<Glyph, AnchorsMap>,
    pub bounds: CachedProperty<Glyph, Option<Rect>>,
    pub segments: CachedProperty<Glyph, Segments>,
    pub flatten_pair: CachedMethod<Kerning, Pair, Vec<Pair>>,
    pub flattened_kerning: CachedProperty<Kerning, FlatKerning>,
    pub unicode_map: CachedProperty<Font, UnicodeMap>,
    pub shape_text: CachedMethod<Font, String, GlyphRun>,
    pub scale: Method<Glyph, Scale, ()>,
    pub scale_font: Method<Font, f64, usize>,
    pub interpolate_segments: Method<Glyph, Interpolation, Segments>,
    pub remove_overlap: Method<Glyph, (), bool>,
}

impl FontExtensions {
    pub fn builder() -> FontExtensionsBuilder {
        FontExtensionsBuilder::new()
    }

    /// Declare everything with the default shaper and overlap remover
    pub fn declare(registry: &mut RegistryBuilder) -> Result<Self> {
        Self::builder().declare(registry)
    }
}

/// Chooses the engines the extensions delegate to
pub struct FontExtensionsBuilder {
    shaper: Option<Arc<dyn Shaper>>,
    overlap_remover: Option<Arc<dyn OverlapRemover>>,
}

impl FontExtensionsBuilder {
    pub fn new() -> Self {
        Self {
            shaper: None,
            overlap_remover: None,
        }
    }

    /// Choose who turns text into glyph runs
    pub fn shaper(mut self, shaper: Arc<dyn Shaper>) -> Self {
        self.shaper = Some(shaper);
        self
    }

    /// Choose who merges overlapping contours
    pub fn overlap_remover(mut self, remover: Arc<dyn OverlapRemover>) -> Self {
        self.overlap_remover = Some(remover);
        self
    }

    pub fn declare(self, registry: &mut RegistryBuilder) -> Result<FontExtensions> {
        let shaper = self.shaper.unwrap_or_else(|| Arc::new(CmapShaper::new()));
        let remover = self
            .overlap_remover
            .unwrap_or_else(|| Arc::new(NoOverlapRemover));

        let segments = outline::declare_segments(registry)?;
        let unicode_map = unicode::declare(registry)?;
        let scale = scale::declare_glyph(registry)?;

        Ok(FontExtensions {
            anchors_map: anchors::declare(registry)?,
            bounds: outline::declare_bounds(registry)?,
            flatten_pair: kerning::declare_flatten_pair(registry)?,
            flattened_kerning: kerning::declare_flattened_kerning(registry)?,
            shape_text: shaping::declare(registry, shaper, unicode_map.clone())?,
            scale_font: scale::declare_font(registry, scale.clone())?,
            interpolate_segments: interpolate::declare(registry, segments.clone())?,
            remove_overlap: overlap::declare(registry, remover)?,
            segments,
            unicode_map,
            scale,
        })
    }
}

impl Default for FontExtensionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontext_core::{ConfigError, ExtError, ExtensionKind, OwnerKind};

    #[test]
    fn every_extension_lands_on_its_owner() {
        let mut registry = RegistryBuilder::new();
        FontExtensions::declare(&mut registry).unwrap();
        let registry = registry.build();

        assert_eq!(registry.len(), 11);
        assert_eq!(registry.for_target(OwnerKind::Glyph).count(), 6);
        assert_eq!(registry.for_target(OwnerKind::Kerning).count(), 2);
        assert_eq!(registry.for_target(OwnerKind::Font).count(), 3);

        let flatten = registry.lookup(OwnerKind::Kerning, "flatten_pair").unwrap();
        assert_eq!(flatten.kind, ExtensionKind::CachedMethod);
        assert_eq!(flatten.dependencies.len(), 2);
        assert_eq!(flatten.dependencies[1].via, Some("groups"));
    }

    #[test]
    fn declaring_twice_on_one_registry_fails() {
        let mut registry = RegistryBuilder::new();
        FontExtensions::declare(&mut registry).unwrap();
        let err = FontExtensions::declare(&mut registry).err().unwrap();
        assert!(matches!(
            err,
            ExtError::Config(ConfigError::DuplicateExtension { .. })
        ));
    }
}
