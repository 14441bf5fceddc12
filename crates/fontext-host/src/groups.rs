//! Glyph groups

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use fontext_core::events::GroupsEvent;
use fontext_core::{Event, EventBus, Owner, OwnerId, OwnerKind};

use crate::font::{emit_font, Font, FontInner};
use crate::node::Node;

/// Prefix of first-side kerning groups in UFO sources
pub const KERN1_PREFIX: &str = "public.kern1.";
/// Prefix of second-side kerning groups in UFO sources
pub const KERN2_PREFIX: &str = "public.kern2.";

pub(crate) struct GroupsInner {
    font: Weak<FontInner>,
    groups: RwLock<BTreeMap<String, Vec<String>>>,
    node: Node,
}

/// Shared handle to a font's groups
#[derive(Clone)]
pub struct Groups {
    inner: Arc<GroupsInner>,
}

impl Groups {
    pub(crate) fn new(bus: Arc<EventBus>, font: Weak<FontInner>) -> Self {
        Self {
            inner: Arc::new(GroupsInner {
                font,
                groups: RwLock::new(BTreeMap::new()),
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

    pub fn get(&self, name: &str) -> Option<Vec<String>> {
        self.inner.groups.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.groups.read().contains_key(name)
    }

    pub fn set<I, S>(&self, name: impl Into<String>, members: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members = members.into_iter().map(Into::into).collect();
        self.inner.groups.write().insert(name.into(), members);
        self.changed(GroupsEvent::GroupSet);
    }

    pub fn remove(&self, name: &str) -> Option<Vec<String>> {
        let removed = self.inner.groups.write().remove(name);
        if removed.is_some() {
            self.changed(GroupsEvent::GroupDeleted);
        }
        removed
    }

    pub fn names(&self) -> Vec<String> {
        self.inner.groups.read().keys().cloned().collect()
    }

    pub fn all(&self) -> BTreeMap<String, Vec<String>> {
        self.inner.groups.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn destroy(&self) {
        self.inner.node.destroy();
    }

    fn changed(&self, event: GroupsEvent) {
        self.inner
            .node
            .emit(&[Event::from(event), GroupsEvent::Changed.into()]);
        if let Some(font) = self.inner.font.upgrade() {
            emit_font(&font, &[]);
        }
    }
}

impl Owner for Groups {
    const KIND: OwnerKind = OwnerKind::Groups;

    fn owner_id(&self) -> OwnerId {
        self.id()
    }
}

impl fmt::Debug for Groups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Groups")
            .field("id", &self.id())
            .field("groups", &self.len())
            .finish()
    }
}
