//! Anchors grouped by name

use std::collections::BTreeMap;

use kurbo::Point;

use fontext_core::events::GlyphEvent;
use fontext_core::{CachedProperty, Dependencies, RegistryBuilder, Result};
use fontext_host::{Anchor, Glyph};

/// Anchor positions by anchor name, in the glyph's anchor order
pub type AnchorsMap = BTreeMap<String, Vec<Point>>;

pub fn anchors_map(anchors: &[Anchor]) -> AnchorsMap {
    let mut map = AnchorsMap::new();
    for anchor in anchors {
        map.entry(anchor.name.clone())
            .or_default()
            .push(anchor.position);
    }
    map
}

pub(crate) fn declare(builder: &mut RegistryBuilder) -> Result<CachedProperty<Glyph, AnchorsMap>> {
    builder.font_cached_property(
        "anchors_map",
        Dependencies::<Glyph>::new().on(GlyphEvent::AnchorsChanged),
        |_, glyph| Ok(glyph.read(|data| anchors_map(&data.anchors))),
    )
}
