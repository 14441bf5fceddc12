//! Fonts: the root of the object graph

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use fontext_core::events::FontEvent;
use fontext_core::{Event, EventBus, Owner, OwnerId, OwnerKind};

use crate::error::{HostError, Result};
use crate::glyph::{Glyph, GlyphData};
use crate::groups::Groups;
use crate::kerning::Kerning;
use crate::node::Node;

/// Font-wide metadata
#[derive(Debug, Clone, PartialEq)]
pub struct FontInfo {
    pub family_name: Option<String>,
    pub style_name: Option<String>,
    pub units_per_em: f64,
    pub ascender: Option<f64>,
    pub descender: Option<f64>,
}

impl Default for FontInfo {
    fn default() -> Self {
        Self {
            family_name: None,
            style_name: None,
            units_per_em: 1000.0,
            ascender: None,
            descender: None,
        }
    }
}

impl FontInfo {
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [&self.family_name, &self.style_name]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            "Untitled Font".to_string()
        } else {
            parts.join(" ")
        }
    }
}

pub(crate) struct FontInner {
    info: RwLock<FontInfo>,
    glyphs: RwLock<Vec<Glyph>>,
    kerning: Kerning,
    groups: Groups,
    /// The UFO this font was loaded from, kept so writing preserves what we
    /// don't model
    pub(crate) source: Mutex<Option<norad::Font>>,
    closed: AtomicBool,
    pub(crate) node: Node,
}

/// Shared handle to a font
///
/// Every mutation, here or on the glyphs, kerning and groups the font owns,
/// is reported on the font's [`EventBus`] before the mutating call returns.
#[derive(Clone)]
pub struct Font {
    inner: Arc<FontInner>,
}

impl Font {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self::with_info(bus, FontInfo::default())
    }

    pub fn with_info(bus: Arc<EventBus>, info: FontInfo) -> Self {
        let inner = Arc::new_cyclic(|weak| FontInner {
            info: RwLock::new(info),
            glyphs: RwLock::new(Vec::new()),
            kerning: Kerning::new(Arc::clone(&bus), weak.clone()),
            groups: Groups::new(Arc::clone(&bus), weak.clone()),
            source: Mutex::new(None),
            closed: AtomicBool::new(false),
            node: Node::new(Arc::clone(&bus)),
        });
        Self { inner }
    }

    pub(crate) fn from_inner(inner: Arc<FontInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &Arc<FontInner> {
        &self.inner
    }

    pub fn id(&self) -> OwnerId {
        self.inner.node.id
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.inner.node.bus
    }

    pub fn info(&self) -> FontInfo {
        self.inner.info.read().clone()
    }

    pub fn units_per_em(&self) -> f64 {
        self.inner.info.read().units_per_em
    }

    pub fn set_info(&self, info: FontInfo) {
        *self.inner.info.write() = info;
        self.emit(&[FontEvent::InfoChanged]);
    }

    pub fn kerning(&self) -> Kerning {
        self.inner.kerning.clone()
    }

    pub fn groups(&self) -> Groups {
        self.inner.groups.clone()
    }

    pub fn glyph(&self, name: &str) -> Option<Glyph> {
        self.inner
            .glyphs
            .read()
            .iter()
            .find(|glyph| glyph.read(|data| data.name == name))
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.glyph(name).is_some()
    }

    /// Glyphs in insertion order
    pub fn glyphs(&self) -> Vec<Glyph> {
        self.inner.glyphs.read().clone()
    }

    pub fn glyph_names(&self) -> Vec<String> {
        self.inner.glyphs.read().iter().map(Glyph::name).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.glyphs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn new_glyph(&self, name: impl Into<String>) -> Result<Glyph> {
        self.add_glyph(GlyphData::new(name))
    }

    /// Add a glyph built from `data`
    pub fn add_glyph(&self, data: GlyphData) -> Result<Glyph> {
        if self.is_closed() {
            return Err(HostError::Closed);
        }
        let glyph = {
            let mut glyphs = self.inner.glyphs.write();
            if glyphs.iter().any(|g| g.read(|d| d.name == data.name)) {
                return Err(HostError::DuplicateGlyph(data.name));
            }
            let glyph = Glyph::new(
                Arc::clone(&self.inner.node.bus),
                Arc::downgrade(&self.inner),
                data,
            );
            glyphs.push(glyph.clone());
            glyph
        };
        self.emit(&[FontEvent::GlyphsChanged]);
        Ok(glyph)
    }

    /// Remove a glyph; the removed glyph is destroyed even if handles to it remain
    pub fn remove_glyph(&self, name: &str) -> Option<Glyph> {
        let removed = {
            let mut glyphs = self.inner.glyphs.write();
            let index = glyphs.iter().position(|g| g.read(|d| d.name == name))?;
            glyphs.remove(index)
        };
        removed.detach();
        self.emit(&[FontEvent::GlyphsChanged]);
        Some(removed)
    }

    /// Tear the whole graph down
    ///
    /// Glyphs, kerning, groups and the font itself are destroyed, in that
    /// order. The handles stay usable as plain data but no longer notify.
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let glyphs = std::mem::take(&mut *self.inner.glyphs.write());
        log::debug!("closing font {} with {} glyphs", self.id(), glyphs.len());
        for glyph in &glyphs {
            glyph.detach();
        }
        self.inner.kerning.destroy();
        self.inner.groups.destroy();
        self.inner.node.destroy();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Emit font events followed by `Font.Changed`
    pub(crate) fn emit(&self, events: &[FontEvent]) {
        emit_font(&self.inner, events);
    }
}

pub(crate) fn emit_font(inner: &FontInner, events: &[FontEvent]) {
    let events: Vec<Event> = events
        .iter()
        .copied()
        .chain(std::iter::once(FontEvent::Changed))
        .map(Event::from)
        .collect();
    inner.node.emit(&events);
}

impl Owner for Font {
    const KIND: OwnerKind = OwnerKind::Font;

    fn owner_id(&self) -> OwnerId {
        self.id()
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("id", &self.id())
            .field("name", &self.info().display_name())
            .field("glyphs", &self.len())
            .finish()
    }
}
