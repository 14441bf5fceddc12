//! Glyphs

use std::fmt;
use std::sync::{Arc, Weak};

use kurbo::Affine;
use parking_lot::RwLock;

use fontext_core::events::{FontEvent, GlyphEvent};
use fontext_core::{Event, EventBus, Owner, OwnerId, OwnerKind};

use crate::error::{HostError, Result};
use crate::font::{emit_font, Font, FontInner};
use crate::geometry::{Anchor, Contour};
use crate::node::Node;

/// Plain glyph contents, detached from any font
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphData {
    pub name: String,
    pub width: f64,
    pub unicodes: Vec<char>,
    pub contours: Vec<Contour>,
    pub anchors: Vec<Anchor>,
}

impl GlyphData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_unicodes(mut self, unicodes: impl IntoIterator<Item = char>) -> Self {
        self.unicodes = unicodes.into_iter().collect();
        self
    }

    pub fn with_contour(mut self, contour: Contour) -> Self {
        self.contours.push(contour);
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchors.push(anchor);
        self
    }
}

/// Mutable view of the parts of a glyph a geometric edit may touch
pub struct GeometryMut<'a> {
    pub width: &'a mut f64,
    pub contours: &'a mut Vec<Contour>,
    pub anchors: &'a mut Vec<Anchor>,
}

impl GeometryMut<'_> {
    /// Apply `affine` to outlines and anchors, and its x scale to the width
    pub fn transform(&mut self, affine: Affine) {
        for contour in self.contours.iter_mut() {
            contour.transform(affine);
        }
        for anchor in self.anchors.iter_mut() {
            anchor.position = affine * anchor.position;
        }
        let [a, _, _, _, _, _] = affine.as_coeffs();
        *self.width *= a;
    }
}

pub(crate) struct GlyphInner {
    font: RwLock<Weak<FontInner>>,
    data: RwLock<GlyphData>,
    node: Node,
}

/// Shared handle to a glyph in a font
#[derive(Clone)]
pub struct Glyph {
    inner: Arc<GlyphInner>,
}

impl Glyph {
    pub(crate) fn new(bus: Arc<EventBus>, font: Weak<FontInner>, data: GlyphData) -> Self {
        Self {
            inner: Arc::new(GlyphInner {
                font: RwLock::new(font),
                data: RwLock::new(data),
                node: Node::new(bus),
            }),
        }
    }

    pub fn id(&self) -> OwnerId {
        self.inner.node.id
    }

    pub fn name(&self) -> String {
        self.inner.data.read().name.clone()
    }

    pub fn width(&self) -> f64 {
        self.inner.data.read().width
    }

    pub fn unicodes(&self) -> Vec<char> {
        self.inner.data.read().unicodes.clone()
    }

    pub fn contours(&self) -> Vec<Contour> {
        self.inner.data.read().contours.clone()
    }

    pub fn anchors(&self) -> Vec<Anchor> {
        self.inner.data.read().anchors.clone()
    }

    /// Snapshot of everything in the glyph
    pub fn data(&self) -> GlyphData {
        self.inner.data.read().clone()
    }

    /// Read the glyph without copying it
    pub fn read<R>(&self, f: impl FnOnce(&GlyphData) -> R) -> R {
        f(&self.inner.data.read())
    }

    /// The font this glyph belongs to, if it is still in one
    pub fn font(&self) -> Option<Font> {
        self.inner.font.read().upgrade().map(Font::from_inner)
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.node.is_destroyed()
    }

    pub fn set_width(&self, width: f64) {
        self.inner.data.write().width = width;
        self.changed(&[GlyphEvent::WidthChanged], &[FontEvent::MetricsChanged]);
    }

    pub fn set_unicodes(&self, unicodes: impl IntoIterator<Item = char>) {
        self.inner.data.write().unicodes = unicodes.into_iter().collect();
        self.changed(&[GlyphEvent::UnicodesChanged], &[FontEvent::UnicodesChanged]);
    }

    /// Rename the glyph; fails if its font already has a glyph of that name
    pub fn rename(&self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if let Some(font) = self.font() {
            if font.glyph(&name).is_some_and(|other| other.id() != self.id()) {
                return Err(HostError::DuplicateGlyph(name));
            }
        }
        self.inner.data.write().name = name;
        self.changed(&[GlyphEvent::NameChanged], &[FontEvent::GlyphsChanged]);
        Ok(())
    }

    pub fn set_contours(&self, contours: Vec<Contour>) {
        self.inner.data.write().contours = contours;
        self.changed(&[GlyphEvent::ContoursChanged], &[]);
    }

    pub fn append_contour(&self, contour: Contour) {
        self.inner.data.write().contours.push(contour);
        self.changed(&[GlyphEvent::ContoursChanged], &[]);
    }

    pub fn clear_contours(&self) {
        self.inner.data.write().contours.clear();
        self.changed(&[GlyphEvent::ContoursChanged], &[]);
    }

    pub fn append_anchor(&self, anchor: Anchor) {
        self.inner.data.write().anchors.push(anchor);
        self.changed(&[GlyphEvent::AnchorsChanged], &[]);
    }

    pub fn set_anchors(&self, anchors: Vec<Anchor>) {
        self.inner.data.write().anchors = anchors;
        self.changed(&[GlyphEvent::AnchorsChanged], &[]);
    }

    pub fn remove_anchor(&self, index: usize) -> Option<Anchor> {
        let removed = {
            let mut data = self.inner.data.write();
            (index < data.anchors.len()).then(|| data.anchors.remove(index))
        };
        if removed.is_some() {
            self.changed(&[GlyphEvent::AnchorsChanged], &[]);
        }
        removed
    }

    pub fn clear_anchors(&self) {
        self.inner.data.write().anchors.clear();
        self.changed(&[GlyphEvent::AnchorsChanged], &[]);
    }

    /// Edit width, outlines and anchors in one go
    pub fn edit_geometry<R>(&self, f: impl FnOnce(&mut GeometryMut<'_>) -> R) -> R {
        let result = {
            let mut data = self.inner.data.write();
            let data = &mut *data;
            let mut geometry = GeometryMut {
                width: &mut data.width,
                contours: &mut data.contours,
                anchors: &mut data.anchors,
            };
            f(&mut geometry)
        };
        self.changed(
            &[
                GlyphEvent::WidthChanged,
                GlyphEvent::ContoursChanged,
                GlyphEvent::AnchorsChanged,
            ],
            &[FontEvent::MetricsChanged],
        );
        result
    }

    /// Emit the specific events, then `Glyph.Changed`, then the font's
    fn changed(&self, glyph_events: &[GlyphEvent], font_events: &[FontEvent]) {
        let events: Vec<Event> = glyph_events
            .iter()
            .copied()
            .chain(std::iter::once(GlyphEvent::Changed))
            .map(Event::from)
            .collect();
        self.inner.node.emit(&events);

        let parent = self.inner.font.read().upgrade();
        if let Some(parent) = parent {
            emit_font(&parent, font_events);
        }
    }

    /// Cut the glyph loose from its font and announce its destruction
    pub(crate) fn detach(&self) {
        *self.inner.font.write() = Weak::new();
        self.inner.node.destroy();
    }
}

impl Owner for Glyph {
    const KIND: OwnerKind = OwnerKind::Glyph;

    fn owner_id(&self) -> OwnerId {
        self.id()
    }
}

impl fmt::Debug for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Glyph")
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}
