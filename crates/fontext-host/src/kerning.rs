//! Kerning tables

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use fontext_core::events::KerningEvent;
use fontext_core::{Event, EventBus, Owner, OwnerId, OwnerKind};

use crate::font::{emit_font, Font, FontInner};
use crate::groups::Groups;
use crate::node::Node;

/// A kerning pair: first and second side, each a glyph or group name
pub type Pair = (String, String);

pub(crate) struct KerningInner {
    font: Weak<FontInner>,
    pairs: RwLock<BTreeMap<Pair, f64>>,
    node: Node,
}

/// Shared handle to a font's kerning
#[derive(Clone)]
pub struct Kerning {
    inner: Arc<KerningInner>,
}

impl Kerning {
    pub(crate) fn new(bus: Arc<EventBus>, font: Weak<FontInner>) -> Self {
        Self {
            inner: Arc::new(KerningInner {
                font,
                pairs: RwLock::new(BTreeMap::new()),
                node: Node::new(bus),
            }),
        }
    }

    pub fn id(&self) -> OwnerId {
        self.inner.node.id
    }

    pub fn font(&self) -> Option<Font> {
        self.inner.font.upgrade().map(Font::from_inner)
    }

    /// The groups of the same font
    pub fn groups(&self) -> Option<Groups> {
        self.font().map(|font| font.groups())
    }

    pub fn get(&self, first: &str, second: &str) -> Option<f64> {
        self.inner
            .pairs
            .read()
            .get(&(first.to_string(), second.to_string()))
            .copied()
    }

    pub fn set(&self, first: impl Into<String>, second: impl Into<String>, value: f64) {
        self.inner
            .pairs
            .write()
            .insert((first.into(), second.into()), value);
        self.changed(KerningEvent::PairSet);
    }

    pub fn remove(&self, first: &str, second: &str) -> Option<f64> {
        let removed = self
            .inner
            .pairs
            .write()
            .remove(&(first.to_string(), second.to_string()));
        if removed.is_some() {
            self.changed(KerningEvent::PairDeleted);
        }
        removed
    }

    pub fn clear(&self) {
        self.inner.pairs.write().clear();
        self.changed(KerningEvent::Cleared);
    }

    /// Rewrite the whole table at once
    pub fn edit<R>(&self, f: impl FnOnce(&mut BTreeMap<Pair, f64>) -> R) -> R {
        let result = f(&mut self.inner.pairs.write());
        self.changed(KerningEvent::Changed);
        result
    }

    pub fn pairs(&self) -> BTreeMap<Pair, f64> {
        self.inner.pairs.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.pairs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn destroy(&self) {
        self.inner.node.destroy();
    }

    fn changed(&self, event: KerningEvent) {
        let mut events = vec![Event::from(event)];
        if event != KerningEvent::Changed {
            events.push(KerningEvent::Changed.into());
        }
        self.inner.node.emit(&events);
        if let Some(font) = self.inner.font.upgrade() {
            emit_font(&font, &[]);
        }
    }
}

impl Owner for Kerning {
    const KIND: OwnerKind = OwnerKind::Kerning;

    fn owner_id(&self) -> OwnerId {
        self.id()
    }
}

impl fmt::Debug for Kerning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kerning")
            .field("id", &self.id())
            .field("pairs", &self.len())
            .finish()
    }
}
