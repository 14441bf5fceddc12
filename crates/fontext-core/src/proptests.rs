use super::*;
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Read { owner: usize, function: u32, arg: u8 },
    Invalidate { owner: usize, function: u32 },
    Teardown { owner: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..3usize, 0..3u32, 0..2u8).prop_map(|(owner, function, arg)| Op::Read { owner, function, arg }),
        2 => (0..3usize, 0..3u32).prop_map(|(owner, function)| Op::Invalidate { owner, function }),
        1 => (0..3usize).prop_map(|owner| Op::Teardown { owner }),
    ]
}

// Property: a read computes exactly when no valid value exists for its slot,
// and invalidation only ever touches the (owner, function) it names
proptest! {
    #[test]
    fn prop_store_matches_model(ops in proptest::collection::vec(op(), 1..64)) {
        let store = CacheStore::new();
        let owners: Vec<OwnerId> = (0..3).map(|_| OwnerId::fresh()).collect();
        let mut valid: HashSet<(usize, u32, u8)> = HashSet::new();

        for op in ops {
            match op {
                Op::Read { owner, function, arg } => {
                    let mut computed = false;
                    let value = store
                        .get_or_compute(owners[owner], FunctionId(function), "f", &arg, || {
                            computed = true;
                            Ok((owner, function, arg))
                        })
                        .unwrap();
                    prop_assert_eq!(value, (owner, function, arg));
                    prop_assert_eq!(computed, !valid.contains(&(owner, function, arg)));
                    valid.insert((owner, function, arg));
                }
                Op::Invalidate { owner, function } => {
                    store.invalidate(owners[owner], FunctionId(function));
                    valid.retain(|(o, f, _)| !(*o == owner && *f == function));
                }
                Op::Teardown { owner } => {
                    store.invalidate_all(owners[owner]);
                    valid.retain(|(o, _, _)| *o != owner);
                }
            }
        }

        for (index, owner) in owners.iter().enumerate() {
            let expected = valid.iter().filter(|(o, _, _)| *o == index).count();
            prop_assert_eq!(store.valid_len(*owner), expected);
        }
    }
}

// Property: events fired on one owner never invalidate another owner's entries
proptest! {
    #[test]
    fn prop_events_are_owner_scoped(fired in proptest::collection::vec((0..4usize, 0..Event::ALL.len()), 0..32)) {
        let bus = std::sync::Arc::new(EventBus::new());
        let store = std::sync::Arc::new(CacheStore::new());
        let registrar = Registrar::new(bus.clone(), store.clone());
        let owners: Vec<OwnerId> = (0..4).map(|_| OwnerId::fresh()).collect();
        let listened = Event::ALL[5];
        let f = FunctionId(0);

        for owner in &owners {
            registrar.register(*owner, f, "f", &[EventBinding::new(listened, *owner)]).unwrap();
            store.get_or_compute(*owner, f, "f", &(), || Ok(1u8)).unwrap();
        }

        let mut hit = HashSet::new();
        for (owner, event) in fired {
            let event = Event::ALL[event];
            bus.emit(owners[owner], event);
            if event == listened {
                hit.insert(owner);
            }
        }

        for (index, owner) in owners.iter().enumerate() {
            let expected = if hit.contains(&index) { EntryState::Invalid } else { EntryState::Valid };
            prop_assert_eq!(store.entry_state::<(), u8>(*owner, f, &()), expected);
        }
    }
}
