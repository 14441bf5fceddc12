//! The cache store: computed values, per owner
//!
//! Every owner gets its own table of slots keyed by extension and argument.
//! A slot is either valid (holds a value) or invalid (its value was thrown
//! away by a change event); a slot that was never filled does not exist.
//!
//! ```text
//! Empty --compute--> Valid --event--> Invalid --compute--> Valid ...
//!                      \__________teardown__________/--> Removed
//! ```
//!
//! No lock is held while a value is being computed, so computations can read
//! other cached values. A slot remembers which threads are computing it: the
//! same thread asking again is a re-entrant read and fails, while another
//! thread computes alongside and the first value stored wins.
//!
//! Each (owner, extension) pair carries a generation number that every
//! invalidation bumps; a value whose computation straddled an invalidation is
//! handed to its caller but never stored as valid.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::thread::{self, ThreadId};

use parking_lot::RwLock;

use crate::error::{ExtError, Result};
use crate::owner::OwnerId;

/// Identity of a declared extension inside its registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub(crate) u32);

impl FunctionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn{}", self.0)
    }
}

/// Observable state of one cache slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Empty,
    Valid,
    Invalid,
}

enum Slot<V> {
    Valid(V),
    Invalid,
}

struct Table<A, V> {
    slots: HashMap<A, Slot<V>>,
    in_flight: HashMap<A, Vec<ThreadId>>,
}

trait ErasedTable: Send + Sync {
    fn invalidate(&mut self) -> usize;
    fn len(&self) -> usize;
    fn valid_len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<A, V> ErasedTable for Table<A, V>
where
    A: Hash + Eq + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn invalidate(&mut self) -> usize {
        let mut count = 0;
        for slot in self.slots.values_mut() {
            if matches!(slot, Slot::Valid(_)) {
                *slot = Slot::Invalid;
                count += 1;
            }
        }
        count
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn valid_len(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot, Slot::Valid(_)))
            .count()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct FunctionSlots {
    generation: u64,
    table: Box<dyn ErasedTable>,
}

#[derive(Default)]
struct OwnerCache {
    functions: HashMap<FunctionId, FunctionSlots>,
}

impl OwnerCache {
    fn len(&self) -> usize {
        self.functions.values().map(|f| f.table.len()).sum()
    }
}

#[derive(Default)]
struct StoreState {
    owners: HashMap<OwnerId, OwnerCache>,
    next_generation: u64,
    metrics: CacheMetrics,
}

impl StoreState {
    fn bump_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }
}

fn table_mut<A, V>(
    state: &mut StoreState,
    owner: OwnerId,
    function: FunctionId,
) -> Option<(u64, &mut Table<A, V>)>
where
    A: 'static,
    V: 'static,
{
    let slots = state.owners.get_mut(&owner)?.functions.get_mut(&function)?;
    let generation = slots.generation;
    slots
        .table
        .as_any_mut()
        .downcast_mut::<Table<A, V>>()
        .map(|table| (generation, table))
}

/// Per-owner memo table shared by every extension of a registry
pub struct CacheStore {
    state: RwLock<StoreState>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Return the cached value for `(owner, function, arg)`, computing it if needed
    ///
    /// `label` names the extension in errors and logs. A computation error is
    /// returned as-is and leaves the slot exactly as it was.
    pub fn get_or_compute<A, V, F>(
        &self,
        owner: OwnerId,
        function: FunctionId,
        label: &str,
        arg: &A,
        compute: F,
    ) -> Result<V>
    where
        A: Hash + Eq + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
        F: FnOnce() -> Result<V>,
    {
        let thread = thread::current().id();
        let generation = {
            let mut guard = self.state.write();
            let state = &mut *guard;
            state.metrics.total_requests += 1;

            let fresh_generation = state.next_generation + 1;
            let slots = state
                .owners
                .entry(owner)
                .or_default()
                .functions
                .entry(function)
                .or_insert_with(|| FunctionSlots {
                    generation: fresh_generation,
                    table: Box::new(Table::<A, V> {
                        slots: HashMap::new(),
                        in_flight: HashMap::new(),
                    }),
                });
            if slots.generation == fresh_generation {
                state.next_generation = fresh_generation;
            }
            let generation = slots.generation;

            let table = slots
                .table
                .as_any_mut()
                .downcast_mut::<Table<A, V>>()
                .ok_or_else(|| ExtError::SlotTypeMismatch {
                    extension: label.to_string(),
                })?;

            if let Some(Slot::Valid(value)) = table.slots.get(arg) {
                let value = value.clone();
                state.metrics.hits += 1;
                return Ok(value);
            }

            let computing = table.in_flight.entry(arg.clone()).or_default();
            if computing.contains(&thread) {
                return Err(ExtError::Reentrant {
                    extension: label.to_string(),
                    owner,
                });
            }
            computing.push(thread);
            state.metrics.misses += 1;
            generation
        };

        let in_flight = InFlight::<A, V> {
            store: self,
            owner,
            function,
            arg: arg.clone(),
            thread,
            _value: PhantomData,
        };

        log::debug!("computing `{}` for {}", label, owner);
        let value = match compute() {
            Ok(value) => value,
            Err(err) => {
                self.state.write().metrics.failures += 1;
                return Err(err);
            }
        };
        drop(in_flight);

        let mut guard = self.state.write();
        let state = &mut *guard;
        state.metrics.computations += 1;
        match table_mut::<A, V>(state, owner, function) {
            Some((current, table)) if current == generation => {
                if let Some(Slot::Valid(stored)) = table.slots.get(arg) {
                    // Another thread finished first
                    return Ok(stored.clone());
                }
                table.slots.insert(arg.clone(), Slot::Valid(value.clone()));
            }
            Some(_) => {
                state.metrics.discarded += 1;
                log::warn!(
                    "`{}` on {} was invalidated while computing; result not cached",
                    label,
                    owner
                );
            }
            None => {
                state.metrics.discarded += 1;
                log::debug!("{} was torn down while computing `{}`", owner, label);
            }
        }
        Ok(value)
    }

    /// Invalidate every slot of one extension on one owner
    ///
    /// Returns the number of slots that went from valid to invalid. Missing
    /// entries are not an error.
    pub fn invalidate(&self, owner: OwnerId, function: FunctionId) -> usize {
        let mut guard = self.state.write();
        let state = &mut *guard;
        let generation = state.bump_generation();
        let Some(slots) = state
            .owners
            .get_mut(&owner)
            .and_then(|cache| cache.functions.get_mut(&function))
        else {
            return 0;
        };
        slots.generation = generation;
        let count = slots.table.invalidate();
        state.metrics.invalidations += count as u64;
        count
    }

    /// Remove every entry of an owner, returning how many slots were dropped
    pub fn invalidate_all(&self, owner: OwnerId) -> usize {
        let removed = {
            let mut guard = self.state.write();
            let state = &mut *guard;
            let removed = state.owners.remove(&owner);
            if removed.is_some() {
                state.metrics.teardowns += 1;
            }
            removed
        };
        // Values are dropped after the lock is released
        removed.map(|cache| cache.len()).unwrap_or(0)
    }

    /// Current state of a single slot
    pub fn entry_state<A, V>(&self, owner: OwnerId, function: FunctionId, arg: &A) -> EntryState
    where
        A: Hash + Eq + 'static,
        V: 'static,
    {
        let state = self.state.read();
        let table = state
            .owners
            .get(&owner)
            .and_then(|cache| cache.functions.get(&function))
            .and_then(|slots| slots.table.as_any().downcast_ref::<Table<A, V>>());
        match table.and_then(|table| table.slots.get(arg)) {
            Some(Slot::Valid(_)) => EntryState::Valid,
            Some(Slot::Invalid) => EntryState::Invalid,
            None => EntryState::Empty,
        }
    }

    /// Number of slots (valid or invalid) held for an owner
    pub fn len(&self, owner: OwnerId) -> usize {
        self.state
            .read()
            .owners
            .get(&owner)
            .map(OwnerCache::len)
            .unwrap_or(0)
    }

    /// Number of valid slots held for an owner
    pub fn valid_len(&self, owner: OwnerId) -> usize {
        self.state
            .read()
            .owners
            .get(&owner)
            .map(|cache| cache.functions.values().map(|f| f.table.valid_len()).sum())
            .unwrap_or(0)
    }

    /// Number of owners with at least one table
    pub fn owner_count(&self) -> usize {
        self.state.read().owners.len()
    }

    /// Drop every entry of every owner
    pub fn clear(&self) {
        let owners = std::mem::take(&mut self.state.write().owners);
        drop(owners);
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.state.read().metrics.clone()
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the in-flight marker of a slot, including when a computation panics
struct InFlight<'a, A, V>
where
    A: Hash + Eq + 'static,
    V: 'static,
{
    store: &'a CacheStore,
    owner: OwnerId,
    function: FunctionId,
    arg: A,
    thread: ThreadId,
    _value: PhantomData<fn() -> V>,
}

impl<A, V> Drop for InFlight<'_, A, V>
where
    A: Hash + Eq + 'static,
    V: 'static,
{
    fn drop(&mut self) {
        let mut guard = self.store.state.write();
        if let Some((_, table)) = table_mut::<A, V>(&mut guard, self.owner, self.function) {
            if let Some(computing) = table.in_flight.get_mut(&self.arg) {
                computing.retain(|id| *id != self.thread);
                if computing.is_empty() {
                    table.in_flight.remove(&self.arg);
                }
            }
        }
    }
}

/// Counters describing how the store has been used
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    pub total_requests: u64,
    pub hits: u64,
    pub misses: u64,
    pub computations: u64,
    pub failures: u64,
    pub invalidations: u64,
    pub discarded: u64,
    pub teardowns: u64,
}

impl CacheMetrics {
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.hits as f64 / self.total_requests as f64
        }
    }

    /// Human-readable summary
    pub fn report(&self) -> String {
        format!(
            "Cache Performance:\n\
             - Requests: {}\n\
             - Hit Rate: {:.2}%\n\
             - Computations: {} ({} failed, {} discarded)\n\
             - Invalidations: {}\n\
             - Owner Teardowns: {}",
            self.total_requests,
            self.hit_rate() * 100.0,
            self.computations,
            self.failures,
            self.discarded,
            self.invalidations,
            self.teardowns,
        )
    }
}
