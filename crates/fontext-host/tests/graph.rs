use std::sync::Arc;

use fontext_core::events::{FontEvent, GlyphEvent, GroupsEvent, KerningEvent};
use fontext_core::{Event, EventBus, Lifecycle, NotificationBus, OwnerId};
use fontext_host::{Anchor, Contour, Font, GlyphData, HostError};
use parking_lot::Mutex;

/// Records every notification for the given owners, and every lifecycle signal
struct Recorder {
    events: Arc<Mutex<Vec<(OwnerId, Event)>>>,
    lifecycle: Arc<Mutex<Vec<Lifecycle>>>,
}

impl Recorder {
    fn new(bus: &EventBus) -> Self {
        let lifecycle: Arc<Mutex<Vec<Lifecycle>>> = Arc::default();
        let sink = lifecycle.clone();
        bus.subscribe_lifecycle(Arc::new(move |signal| sink.lock().push(signal)));
        Self {
            events: Arc::default(),
            lifecycle,
        }
    }

    fn watch(&self, bus: &EventBus, owner: OwnerId) {
        for event in Event::ALL {
            let sink = self.events.clone();
            bus.subscribe(
                owner,
                event,
                Arc::new(move |n| sink.lock().push((n.owner, n.event))),
            );
        }
    }

    fn take(&self) -> Vec<(OwnerId, Event)> {
        std::mem::take(&mut *self.events.lock())
    }
}

#[test]
fn anchor_edit_reports_glyph_then_font() {
    let bus = Arc::new(EventBus::new());
    let font = Font::new(bus.clone());
    let glyph = font.new_glyph("a").unwrap();
    let recorder = Recorder::new(&bus);
    recorder.watch(&bus, glyph.id());
    recorder.watch(&bus, font.id());

    glyph.append_anchor(Anchor::new("top", 100.0, 700.0));
    assert_eq!(
        recorder.take(),
        vec![
            (glyph.id(), GlyphEvent::AnchorsChanged.into()),
            (glyph.id(), GlyphEvent::Changed.into()),
            (font.id(), FontEvent::Changed.into()),
        ]
    );

    glyph.set_unicodes(['a']);
    assert_eq!(
        recorder.take(),
        vec![
            (glyph.id(), GlyphEvent::UnicodesChanged.into()),
            (glyph.id(), GlyphEvent::Changed.into()),
            (font.id(), FontEvent::UnicodesChanged.into()),
            (font.id(), FontEvent::Changed.into()),
        ]
    );
}

#[test]
fn kerning_and_groups_report_on_their_own_ids() {
    let bus = Arc::new(EventBus::new());
    let font = Font::new(bus.clone());
    let kerning = font.kerning();
    let groups = font.groups();
    let recorder = Recorder::new(&bus);
    recorder.watch(&bus, kerning.id());
    recorder.watch(&bus, groups.id());

    groups.set("A", ["a", "a.alt"]);
    kerning.set("A", "b", -40.0);
    kerning.remove("A", "b");
    kerning.remove("A", "b");
    assert_eq!(
        recorder.take(),
        vec![
            (groups.id(), GroupsEvent::GroupSet.into()),
            (groups.id(), GroupsEvent::Changed.into()),
            (kerning.id(), KerningEvent::PairSet.into()),
            (kerning.id(), KerningEvent::Changed.into()),
            (kerning.id(), KerningEvent::PairDeleted.into()),
            (kerning.id(), KerningEvent::Changed.into()),
        ]
    );
    assert_eq!(kerning.groups().unwrap().id(), groups.id());
}

#[test]
fn removing_a_glyph_destroys_it() {
    let bus = Arc::new(EventBus::new());
    let recorder = Recorder::new(&bus);
    let font = Font::new(bus.clone());
    let glyph = font.new_glyph("a").unwrap();
    assert!(recorder
        .lifecycle
        .lock()
        .contains(&Lifecycle::Created(glyph.id())));

    let removed = font.remove_glyph("a").unwrap();
    assert!(removed.is_destroyed());
    assert!(removed.font().is_none());
    assert!(font.glyph("a").is_none());
    assert_eq!(
        recorder.lifecycle.lock().last(),
        Some(&Lifecycle::Destroyed(glyph.id()))
    );

    // Dropping the remaining handles does not announce it twice
    drop(removed);
    drop(glyph);
    let destroyed = recorder
        .lifecycle
        .lock()
        .iter()
        .filter(|signal| matches!(signal, Lifecycle::Destroyed(_)))
        .count();
    assert_eq!(destroyed, 1);
}

#[test]
fn close_tears_down_everything() {
    let bus = Arc::new(EventBus::new());
    let recorder = Recorder::new(&bus);
    let font = Font::new(bus.clone());
    let a = font.new_glyph("a").unwrap();
    let b = font.new_glyph("b").unwrap();

    font.close();
    let destroyed: Vec<OwnerId> = recorder
        .lifecycle
        .lock()
        .iter()
        .filter_map(|signal| match signal {
            Lifecycle::Destroyed(id) => Some(*id),
            Lifecycle::Created(_) => None,
        })
        .collect();
    assert_eq!(
        destroyed,
        vec![a.id(), b.id(), font.kerning().id(), font.groups().id(), font.id()]
    );
    assert!(font.is_empty());
    assert!(matches!(font.new_glyph("c"), Err(HostError::Closed)));
}

#[test]
fn dropping_the_font_destroys_owned_objects() {
    let bus = Arc::new(EventBus::new());
    let recorder = Recorder::new(&bus);
    let font = Font::new(bus.clone());
    let glyph_id = font.new_glyph("a").unwrap().id();
    let font_id = font.id();

    drop(font);
    let lifecycle = recorder.lifecycle.lock();
    assert!(lifecycle.contains(&Lifecycle::Destroyed(glyph_id)));
    assert!(lifecycle.contains(&Lifecycle::Destroyed(font_id)));
    assert_eq!(bus.total_subscriptions(), 0);
}

#[test]
fn rename_refuses_existing_name() {
    let bus = Arc::new(EventBus::new());
    let font = Font::new(bus);
    let a = font.new_glyph("a").unwrap();
    font.add_glyph(GlyphData::new("b").with_contour(Contour::rect(0.0, 0.0, 1.0, 1.0)))
        .unwrap();

    assert!(matches!(a.rename("b"), Err(HostError::DuplicateGlyph(_))));
    a.rename("a.alt").unwrap();
    assert_eq!(font.glyph_names(), vec!["a.alt".to_string(), "b".to_string()]);
}
