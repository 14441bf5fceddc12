use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use fontext_core::events::{GlyphEvent, GroupsEvent, KerningEvent};
use fontext_core::{
    CacheConfig, Dependencies, EntryState, EventBus, Extensions, NotificationBus, Owner, OwnerId,
    OwnerKind, RegistryBuilder,
};
use parking_lot::RwLock;

struct TestGlyph(OwnerId);

impl Owner for TestGlyph {
    const KIND: OwnerKind = OwnerKind::Glyph;
    fn owner_id(&self) -> OwnerId {
        self.0
    }
}

struct TestGroups(OwnerId);

impl Owner for TestGroups {
    const KIND: OwnerKind = OwnerKind::Groups;
    fn owner_id(&self) -> OwnerId {
        self.0
    }
}

struct TestKerning {
    id: OwnerId,
    groups: RwLock<OwnerId>,
}

impl Owner for TestKerning {
    const KIND: OwnerKind = OwnerKind::Kerning;
    fn owner_id(&self) -> OwnerId {
        self.id
    }
}

#[test]
fn destroyed_owner_loses_entries_and_subscriptions() {
    let calls = Arc::new(AtomicUsize::new(0));
    let inner = calls.clone();
    let mut builder = RegistryBuilder::new();
    let anchors = builder
        .font_cached_property(
            "anchor_count",
            Dependencies::<TestGlyph>::new().on(GlyphEvent::AnchorsChanged),
            move |_, _| {
                inner.fetch_add(1, Ordering::SeqCst);
                Ok(2usize)
            },
        )
        .unwrap();
    let bus = Arc::new(EventBus::new());
    let ext = Extensions::new(Arc::new(builder.build()), bus.clone(), CacheConfig::default());

    let glyph = TestGlyph(OwnerId::fresh());
    bus.owner_created(glyph.0);
    anchors.get(&ext, &glyph).unwrap();
    anchors.get(&ext, &glyph).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(bus.subscription_count(glyph.0), 1);
    assert_eq!(ext.store().len(glyph.0), 1);

    bus.owner_destroyed(glyph.0);
    assert_eq!(bus.subscription_count(glyph.0), 0);
    assert_eq!(ext.store().len(glyph.0), 0);
    assert!(!ext.registrar().is_registered(glyph.0, anchors.id()));

    // Nothing is listening any more
    assert_eq!(bus.emit(glyph.0, GlyphEvent::AnchorsChanged.into()), 0);
    assert_eq!(ext.metrics().teardowns, 1);
}

#[test]
fn new_owners_start_empty() {
    let mut builder = RegistryBuilder::new();
    let anchors = builder
        .font_cached_property(
            "anchor_count",
            Dependencies::<TestGlyph>::new().on(GlyphEvent::AnchorsChanged),
            |_, _| Ok(0usize),
        )
        .unwrap();
    let bus = Arc::new(EventBus::new());
    let ext = Extensions::new(Arc::new(builder.build()), bus.clone(), CacheConfig::default());

    let glyph = TestGlyph(OwnerId::fresh());
    bus.owner_created(glyph.0);
    assert_eq!(anchors.state(&ext, &glyph), EntryState::Empty);
    assert_eq!(ext.store().owner_count(), 0);
}

#[test]
fn destroyed_related_owner_is_resolved_again() {
    let mut builder = RegistryBuilder::new();
    let flat = builder
        .font_cached_property(
            "flat",
            Dependencies::<TestKerning>::new()
                .on(KerningEvent::Changed)
                .on_related(GroupsEvent::Changed, "groups", |k: &TestKerning| {
                    Some(TestGroups(*k.groups.read()))
                }),
            |_, _| Ok(1u8),
        )
        .unwrap();
    let bus = Arc::new(EventBus::new());
    let ext = Extensions::new(Arc::new(builder.build()), bus.clone(), CacheConfig::default());

    let old_groups = OwnerId::fresh();
    let kerning = TestKerning {
        id: OwnerId::fresh(),
        groups: RwLock::new(old_groups),
    };
    flat.get(&ext, &kerning).unwrap();
    assert_eq!(bus.subscription_count(old_groups), 1);

    // The groups object is replaced and the old one destroyed
    let new_groups = OwnerId::fresh();
    *kerning.groups.write() = new_groups;
    bus.owner_destroyed(old_groups);
    assert_eq!(flat.state(&ext, &kerning), EntryState::Invalid);

    flat.get(&ext, &kerning).unwrap();
    assert_eq!(bus.subscription_count(new_groups), 1);
    bus.emit(new_groups, GroupsEvent::Changed.into());
    assert_eq!(flat.state(&ext, &kerning), EntryState::Invalid);
}

#[test]
fn dropping_the_context_cancels_its_subscriptions() {
    let mut builder = RegistryBuilder::new();
    let anchors = builder
        .font_cached_property(
            "anchor_count",
            Dependencies::<TestGlyph>::new().on(GlyphEvent::AnchorsChanged),
            |_, _| Ok(0usize),
        )
        .unwrap();
    let bus = Arc::new(EventBus::new());
    let ext = Extensions::new(Arc::new(builder.build()), bus.clone(), CacheConfig::default());
    let glyph = TestGlyph(OwnerId::fresh());
    anchors.get(&ext, &glyph).unwrap();

    let clone = ext.clone();
    drop(ext);
    assert_eq!(bus.total_subscriptions(), 1);
    drop(clone);
    assert_eq!(bus.total_subscriptions(), 0);
}

#[test]
fn forget_acts_like_destruction() {
    let mut builder = RegistryBuilder::new();
    let anchors = builder
        .font_cached_property(
            "anchor_count",
            Dependencies::<TestGlyph>::new().on(GlyphEvent::AnchorsChanged),
            |_, _| Ok(0usize),
        )
        .unwrap();
    let bus = Arc::new(EventBus::new());
    let ext = Extensions::new(Arc::new(builder.build()), bus.clone(), CacheConfig::default());
    let glyph = TestGlyph(OwnerId::fresh());

    anchors.get(&ext, &glyph).unwrap();
    ext.forget(glyph.0);
    assert_eq!(anchors.state(&ext, &glyph), EntryState::Empty);
    assert_eq!(bus.subscription_count(glyph.0), 0);
}
