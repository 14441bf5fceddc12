//! Text to glyph runs
//!
//! Shaping is delegated to a [`Shaper`]. The built-in [`CmapShaper`] is the
//! simplest one possible: one glyph per character, looked up in the font's
//! unicode map, placed left to right by advance width. Anything smarter
//! (ligatures, marks, kerning) plugs in behind the same trait.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use fontext_core::events::FontEvent;
use fontext_core::{CachedMethod, CachedProperty, RegistryBuilder, Result};
use fontext_host::Font;

use crate::unicode::{cmap_dependencies, UnicodeMap};

/// Glyph used for characters the font does not encode
pub const NOTDEF: &str = ".notdef";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedGlyph {
    pub name: String,
    pub x: f64,
    pub advance: f64,
    /// Byte offset of the source character in the text
    pub cluster: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlyphRun {
    pub glyphs: Vec<PositionedGlyph>,
    pub advance_width: f64,
}

impl GlyphRun {
    pub fn glyph_names(&self) -> Vec<&str> {
        self.glyphs.iter().map(|g| g.name.as_str()).collect()
    }
}

/// Turns text into positioned glyphs
pub trait Shaper: Send + Sync {
    fn name(&self) -> &'static str;

    fn shape(&self, font: &Font, cmap: &BTreeMap<char, String>, text: &str) -> Result<GlyphRun>;
}

/// One glyph per character, advanced by glyph width
pub struct CmapShaper;

impl CmapShaper {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CmapShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl Shaper for CmapShaper {
    fn name(&self) -> &'static str {
        "cmap"
    }

    fn shape(&self, font: &Font, cmap: &BTreeMap<char, String>, text: &str) -> Result<GlyphRun> {
        log::debug!("CmapShaper: shaping {} chars", text.chars().count());

        let mut run = GlyphRun::default();
        for (cluster, ch) in text.char_indices() {
            let name = cmap.get(&ch).map(String::as_str).unwrap_or(NOTDEF);
            let advance = font.glyph(name).map(|glyph| glyph.width()).unwrap_or(0.0);
            run.glyphs.push(PositionedGlyph {
                name: name.to_string(),
                x: run.advance_width,
                advance,
                cluster,
            });
            run.advance_width += advance;
        }
        Ok(run)
    }
}

pub(crate) fn declare(
    builder: &mut RegistryBuilder,
    shaper: Arc<dyn Shaper>,
    unicode_map: CachedProperty<Font, UnicodeMap>,
) -> Result<CachedMethod<Font, String, GlyphRun>> {
    // Advances come from glyph widths, so width edits matter too
    let dependencies = cmap_dependencies().on(FontEvent::MetricsChanged);
    builder.font_cached_method("shape_text", dependencies, move |ext, font, text: &String| {
        let cmap = unicode_map.get(ext, font)?;
        log::debug!("shaping {:?} with {}", text, shaper.name());
        shaper.shape(font, &cmap, text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontext_core::EventBus;
    use fontext_host::GlyphData;

    fn font() -> Font {
        let font = Font::new(Arc::new(EventBus::new()));
        for (name, c, width) in [("H", 'H', 600.0), ("i", 'i', 250.0)] {
            font.add_glyph(GlyphData::new(name).with_unicodes([c]).with_width(width))
                .unwrap();
        }
        font.add_glyph(GlyphData::new(NOTDEF).with_width(500.0))
            .unwrap();
        font
    }

    #[test]
    fn glyphs_advance_left_to_right() {
        let font = font();
        let cmap = crate::unicode::unicode_map(&font);
        let run = CmapShaper::new().shape(&font, &cmap, "Hi").unwrap();

        assert_eq!(run.glyph_names(), vec!["H", "i"]);
        assert_eq!(run.glyphs[1].x, 600.0);
        assert_eq!(run.advance_width, 850.0);
    }

    #[test]
    fn unknown_characters_become_notdef() {
        let font = font();
        let cmap = crate::unicode::unicode_map(&font);
        let run = CmapShaper::new().shape(&font, &cmap, "H\u{e9}i").unwrap();

        assert_eq!(run.glyph_names(), vec!["H", NOTDEF, "i"]);
        assert_eq!(run.glyphs[1].advance, 500.0);
        // The accented character takes two bytes
        assert_eq!(run.glyphs[2].cluster, 3);
    }

    #[test]
    fn clusters_are_text_byte_offsets() {
        let font = font();
        let cmap = crate::unicode::unicode_map(&font);
        let text = "\u{1F600}H\u{e9}i";
        let run = CmapShaper::new().shape(&font, &cmap, text).unwrap();

        let clusters: Vec<usize> = run.glyphs.iter().map(|g| g.cluster).collect();
        let offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        assert_eq!(clusters, offsets);
        assert_eq!(&text[run.glyphs[1].cluster..run.glyphs[2].cluster], "H");
    }

    #[test]
    fn empty_text() {
        let font = font();
        let run = CmapShaper::new().shape(&font, &BTreeMap::new(), "").unwrap();
        assert!(run.glyphs.is_empty());
        assert_eq!(run.advance_width, 0.0);
    }
}
