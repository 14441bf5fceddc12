//! Typed change notifications
//!
//! Every change the host can report is a variant here, grouped by the kind of
//! owner that emits it. The dotted names (`"Glyph.AnchorsChanged"`) are only
//! used at the edges: parsing declarations and manifests, and logging.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;
use crate::owner::OwnerKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontEvent {
    /// Any change to the font or something it owns
    Changed,
    /// A glyph was added, removed or renamed
    GlyphsChanged,
    /// The unicode values of one of the font's glyphs changed
    UnicodesChanged,
    /// An advance width of one of the font's glyphs changed
    MetricsChanged,
    InfoChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlyphEvent {
    Changed,
    NameChanged,
    UnicodesChanged,
    WidthChanged,
    ContoursChanged,
    AnchorsChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KerningEvent {
    Changed,
    PairSet,
    PairDeleted,
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupsEvent {
    Changed,
    GroupSet,
    GroupDeleted,
}

/// A change notification, scoped to the owner kind that emits it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    Font(FontEvent),
    Glyph(GlyphEvent),
    Kerning(KerningEvent),
    Groups(GroupsEvent),
}

impl Event {
    pub const ALL: [Event; 18] = [
        Event::Font(FontEvent::Changed),
        Event::Font(FontEvent::GlyphsChanged),
        Event::Font(FontEvent::UnicodesChanged),
        Event::Font(FontEvent::MetricsChanged),
        Event::Font(FontEvent::InfoChanged),
        Event::Glyph(GlyphEvent::Changed),
        Event::Glyph(GlyphEvent::NameChanged),
        Event::Glyph(GlyphEvent::UnicodesChanged),
        Event::Glyph(GlyphEvent::WidthChanged),
        Event::Glyph(GlyphEvent::ContoursChanged),
        Event::Glyph(GlyphEvent::AnchorsChanged),
        Event::Kerning(KerningEvent::Changed),
        Event::Kerning(KerningEvent::PairSet),
        Event::Kerning(KerningEvent::PairDeleted),
        Event::Kerning(KerningEvent::Cleared),
        Event::Groups(GroupsEvent::Changed),
        Event::Groups(GroupsEvent::GroupSet),
        Event::Groups(GroupsEvent::GroupDeleted),
    ];

    /// The owner kind that fires this event
    pub fn emitter(self) -> OwnerKind {
        match self {
            Event::Font(_) => OwnerKind::Font,
            Event::Glyph(_) => OwnerKind::Glyph,
            Event::Kerning(_) => OwnerKind::Kerning,
            Event::Groups(_) => OwnerKind::Groups,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Event::Font(FontEvent::Changed) => "Font.Changed",
            Event::Font(FontEvent::GlyphsChanged) => "Font.GlyphsChanged",
            Event::Font(FontEvent::UnicodesChanged) => "Font.UnicodesChanged",
            Event::Font(FontEvent::MetricsChanged) => "Font.MetricsChanged",
            Event::Font(FontEvent::InfoChanged) => "Font.InfoChanged",
            Event::Glyph(GlyphEvent::Changed) => "Glyph.Changed",
            Event::Glyph(GlyphEvent::NameChanged) => "Glyph.NameChanged",
            Event::Glyph(GlyphEvent::UnicodesChanged) => "Glyph.UnicodesChanged",
            Event::Glyph(GlyphEvent::WidthChanged) => "Glyph.WidthChanged",
            Event::Glyph(GlyphEvent::ContoursChanged) => "Glyph.ContoursChanged",
            Event::Glyph(GlyphEvent::AnchorsChanged) => "Glyph.AnchorsChanged",
            Event::Kerning(KerningEvent::Changed) => "Kerning.Changed",
            Event::Kerning(KerningEvent::PairSet) => "Kerning.PairSet",
            Event::Kerning(KerningEvent::PairDeleted) => "Kerning.PairDeleted",
            Event::Kerning(KerningEvent::Cleared) => "Kerning.Cleared",
            Event::Groups(GroupsEvent::Changed) => "Groups.Changed",
            Event::Groups(GroupsEvent::GroupSet) => "Groups.GroupSet",
            Event::Groups(GroupsEvent::GroupDeleted) => "Groups.GroupDeleted",
        }
    }
}

impl FromStr for Event {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Event::ALL
            .into_iter()
            .find(|event| event.name() == name)
            .ok_or_else(|| ConfigError::UnknownEvent(name.to_string()))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

impl From<FontEvent> for Event {
    fn from(event: FontEvent) -> Self {
        Event::Font(event)
    }
}

impl From<GlyphEvent> for Event {
    fn from(event: GlyphEvent) -> Self {
        Event::Glyph(event)
    }
}

impl From<KerningEvent> for Event {
    fn from(event: KerningEvent) -> Self {
        Event::Kerning(event)
    }
}

impl From<GroupsEvent> for Event {
    fn from(event: GroupsEvent) -> Self {
        Event::Groups(event)
    }
}
