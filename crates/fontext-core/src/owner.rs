//! Owners: the host objects that cached values hang off

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_OWNER_ID: AtomicU64 = AtomicU64::new(1);

/// Reference identity of a host object
///
/// Ids are handed out from a process-wide counter and never reused, so two
/// live objects can never share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Allocate a new, never-before-seen identity
    pub fn fresh() -> Self {
        OwnerId(NEXT_OWNER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kinds of object found in a font graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerKind {
    Font,
    Glyph,
    Kerning,
    Groups,
}

impl OwnerKind {
    pub const ALL: [OwnerKind; 4] = [
        OwnerKind::Font,
        OwnerKind::Glyph,
        OwnerKind::Kerning,
        OwnerKind::Groups,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OwnerKind::Font => "Font",
            OwnerKind::Glyph => "Glyph",
            OwnerKind::Kerning => "Kerning",
            OwnerKind::Groups => "Groups",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A host object that extensions can be attached to
///
/// Implemented by the host's handle types. The associated `KIND` lets the
/// registry check, at declaration time, that an extension only listens to
/// events its target actually emits.
pub trait Owner: Send + Sync + 'static {
    const KIND: OwnerKind;

    fn owner_id(&self) -> OwnerId;
}
