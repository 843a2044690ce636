//! Generational handle registry.
//!
//! Native objects are never handed out by address. Each one is parked in a
//! slot and the caller receives a [`Handle`] naming the slot and the slot's
//! generation at insertion time. Releasing a slot bumps its generation, so a
//! handle kept past `remove` no longer matches and is reported as stale.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::error::CoreError;

/// Registry-issued identifier. Packs into a non-zero `u64` for the C ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Generation in the high half, slot index in the low half.
    /// Generations start at 1, so a live handle is never 0.
    pub fn to_raw(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    /// Decode a raw value. `0` (and any value with generation 0) is "no handle".
    pub fn from_raw(raw: u64) -> Option<Self> {
        let generation = (raw >> 32) as u32;
        if generation == 0 {
            return None;
        }
        Some(Self {
            index: raw as u32,
            generation,
        })
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot arena keyed by index. Freed indices are recycled with a bumped generation.
///
/// Closures passed to [`with`](Self::with) and [`with_mut`](Self::with_mut) run
/// under the slot's shard lock and must not call back into the same registry.
pub struct HandleRegistry<T> {
    kind: &'static str,
    slots: DashMap<u32, Slot<T>>,
    free: Mutex<Vec<u32>>,
    next_index: AtomicU32,
}

impl<T> HandleRegistry<T> {
    /// `kind` names the object type in error messages ("dataset", "booster").
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            slots: DashMap::new(),
            free: Mutex::new(Vec::new()),
            next_index: AtomicU32::new(0),
        }
    }

    /// Park a value and return its handle.
    pub fn insert(&self, value: T) -> Handle {
        if let Some(index) = self.free.lock().pop() {
            if let Some(mut slot) = self.slots.get_mut(&index) {
                slot.value = Some(value);
                return Handle {
                    index,
                    generation: slot.generation,
                };
            }
        }

        let index = self.next_index.fetch_add(1, Ordering::Relaxed);
        self.slots.insert(
            index,
            Slot {
                generation: 1,
                value: Some(value),
            },
        );
        Handle {
            index,
            generation: 1,
        }
    }

    /// Run `f` against the live value behind `handle`.
    pub fn with<R>(&self, handle: Handle, f: impl FnOnce(&T) -> R) -> Result<R, CoreError> {
        let slot = self.slots.get(&handle.index).ok_or(CoreError::HandleNotFound {
            kind: self.kind,
            handle,
        })?;
        match (&slot.value, slot.generation == handle.generation) {
            (Some(value), true) => Ok(f(value)),
            _ => Err(self.stale(handle, slot.generation)),
        }
    }

    /// Run `f` against the live value behind `handle`, mutably.
    pub fn with_mut<R>(
        &self,
        handle: Handle,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, CoreError> {
        let mut slot = self
            .slots
            .get_mut(&handle.index)
            .ok_or(CoreError::HandleNotFound {
                kind: self.kind,
                handle,
            })?;
        let current = slot.generation;
        match (&mut slot.value, current == handle.generation) {
            (Some(value), true) => Ok(f(value)),
            _ => Err(self.stale(handle, current)),
        }
    }

    /// Copy out the value behind `handle`.
    pub fn get(&self, handle: Handle) -> Result<T, CoreError>
    where
        T: Clone,
    {
        self.with(handle, T::clone)
    }

    /// Take the value out and retire the handle.
    pub fn remove(&self, handle: Handle) -> Result<T, CoreError> {
        let value = {
            let mut slot = self
                .slots
                .get_mut(&handle.index)
                .ok_or(CoreError::HandleNotFound {
                    kind: self.kind,
                    handle,
                })?;
            if slot.generation != handle.generation || slot.value.is_none() {
                let current = slot.generation;
                return Err(self.stale(handle, current));
            }
            slot.generation = next_generation(slot.generation);
            slot.value.take()
        };
        self.free.lock().push(handle.index);
        value.ok_or(CoreError::HandleNotFound {
            kind: self.kind,
            handle,
        })
    }

    /// Handles of every live slot, in no particular order.
    pub fn handles(&self) -> Vec<Handle> {
        self.slots
            .iter()
            .filter(|slot| slot.value.is_some())
            .map(|slot| Handle {
                index: *slot.key(),
                generation: slot.generation,
            })
            .collect()
    }

    /// Return number of live handles.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.value.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn stale(&self, handle: Handle, current: u32) -> CoreError {
        CoreError::StaleHandle {
            kind: self.kind,
            handle,
            current,
        }
    }
}

fn next_generation(generation: u32) -> u32 {
    match generation.wrapping_add(1) {
        0 => 1,
        g => g,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_round_trip_is_nonzero() {
        let registry = HandleRegistry::new("dataset");
        let handle = registry.insert(7u32);
        assert_ne!(handle.to_raw(), 0);
        assert_eq!(Handle::from_raw(handle.to_raw()), Some(handle));
        assert_eq!(Handle::from_raw(0), None);
    }

    #[test]
    fn removed_handle_is_stale_and_slot_is_reused() {
        let registry = HandleRegistry::new("booster");
        let first = registry.insert("a");
        assert_eq!(registry.remove(first).ok(), Some("a"));

        let second = registry.insert("b");
        assert_eq!(second.index(), first.index());
        assert_eq!(second.generation(), first.generation() + 1);

        match registry.get(first) {
            Err(CoreError::StaleHandle { current, .. }) => assert_eq!(current, 2),
            other => panic!("expected StaleHandle, got {:?}", other),
        }
        assert_eq!(registry.get(second).ok(), Some("b"));
        assert!(registry.remove(first).is_err());
    }

    #[test]
    fn unknown_index_is_not_found() {
        let registry: HandleRegistry<u8> = HandleRegistry::new("dataset");
        let bogus = Handle::from_raw((1u64 << 32) | 99).expect("non-zero");
        assert!(matches!(
            registry.get(bogus),
            Err(CoreError::HandleNotFound { kind: "dataset", .. })
        ));
    }

    #[test]
    fn with_mut_updates_in_place() {
        let registry = HandleRegistry::new("booster");
        let handle = registry.insert(vec![1, 2]);
        registry.with_mut(handle, |v| v.push(3)).expect("live");
        assert_eq!(registry.get(handle).expect("live"), vec![1, 2, 3]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.handles(), vec![handle]);
    }
}
