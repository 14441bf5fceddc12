//! Character to glyph mapping of a font

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

use fontext_core::events::FontEvent;
use fontext_core::{CachedProperty, Dependencies, RegistryBuilder, Result};
use fontext_host::Font;

pub type UnicodeMap = Arc<BTreeMap<char, String>>;

/// Map every encoded character to its glyph
///
/// When two glyphs claim the same character the one that comes first in the
/// font's glyph order keeps it.
pub fn unicode_map(font: &Font) -> BTreeMap<char, String> {
    let mut map = BTreeMap::new();
    for glyph in font.glyphs() {
        let (name, unicodes) = glyph.read(|data| (data.name.clone(), data.unicodes.clone()));
        for c in unicodes {
            match map.entry(c) {
                Entry::Vacant(slot) => {
                    slot.insert(name.clone());
                }
                Entry::Occupied(slot) => log::debug!(
                    "U+{:04X} is claimed by {} and {}; keeping {}",
                    c as u32,
                    slot.get(),
                    name,
                    slot.get()
                ),
            }
        }
    }
    map
}

pub(crate) fn cmap_dependencies() -> Dependencies<Font> {
    Dependencies::new()
        .on(FontEvent::GlyphsChanged)
        .on(FontEvent::UnicodesChanged)
}

pub(crate) fn declare(builder: &mut RegistryBuilder) -> Result<CachedProperty<Font, UnicodeMap>> {
    builder.font_cached_property("unicode_map", cmap_dependencies(), |_, font| {
        Ok(Arc::new(unicode_map(font)))
    })
}
