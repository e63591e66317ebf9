//! Fixed-capacity, handle-indexed object pool.
//!
//! A `Pool<T, H>` owns exactly `capacity` slots allocated once at creation.
//! Free slots form an intrusive singly-linked list threaded through the slot
//! storage itself; allocation pops the head, release pushes onto it. Storage
//! never grows or moves, so slot indices are stable for the pool's lifetime.
//!
//! Each slot carries a generation counter bumped on release. A handle records
//! the generation it was issued with, so a handle kept after its slot was
//! released (and possibly reused) is detected as stale instead of silently
//! aliasing the new occupant.

use std::marker::PhantomData;

use crate::error::{Error, Result};
use crate::memory::{Arena, PoolHandle};

enum Slot<T> {
    Free { next: Option<u32> },
    Live(T),
}

struct Entry<T> {
    generation: u32,
    slot: Slot<T>,
}

/// Handle-indexed pool of `T` values keyed by `H`
///
/// # Example
///
/// ```
/// use celeritas_engine::memory::Pool;
/// use celeritas_engine::celeritas::render::BufferHandle;
///
/// let mut pool: Pool<u64, BufferHandle> = Pool::new("sizes", 4)?;
/// let (handle, value) = pool.alloc().unwrap();
/// *value = 256;
/// assert_eq!(*pool.get(handle)?, 256);
/// pool.dealloc(handle)?;
/// assert!(pool.get(handle).is_err());
/// # Ok::<(), celeritas_engine::celeritas::Error>(())
/// ```
pub struct Pool<T, H: PoolHandle> {
    label: &'static str,
    entries: Box<[Entry<T>]>,
    free_head: Option<u32>,
    len: usize,
    _handle: PhantomData<fn() -> H>,
}

impl<T, H: PoolHandle> Pool<T, H> {
    /// Create a pool with room for exactly `capacity` values
    ///
    /// # Errors
    ///
    /// `InitializationFailed` if `capacity` is 0 or does not fit a handle index.
    pub fn new(label: &'static str, capacity: usize) -> Result<Self> {
        if capacity == 0 || capacity >= u32::MAX as usize {
            crate::engine_fail!(
                "celeritas::Pool",
                Error::InitializationFailed(format!(
                    "pool '{}' cannot hold {} {} slots",
                    label,
                    capacity,
                    H::KIND
                ))
            );
        }

        let entries: Box<[Entry<T>]> = (0..capacity)
            .map(|i| Entry {
                generation: 0,
                slot: Slot::Free {
                    next: if i + 1 < capacity { Some(i as u32 + 1) } else { None },
                },
            })
            .collect();

        crate::engine_debug!(
            "celeritas::Pool",
            "Created pool '{}' ({} x {} bytes)",
            label,
            capacity,
            std::mem::size_of::<T>()
        );

        Ok(Self {
            label,
            entries,
            free_head: Some(0),
            len: 0,
            _handle: PhantomData,
        })
    }

    /// Create a pool whose `capacity * entry_size()` bytes are carved from
    /// `arena`. The arena block is the pool's memory budget: a backend sizes
    /// one arena for a whole set of pools and exhausting it fails creation.
    ///
    /// # Errors
    ///
    /// `ArenaExhausted` if the arena cannot hold the slots (nothing is
    /// reserved in that case), otherwise as [`Pool::new`].
    pub fn new_in(arena: &mut Arena, label: &'static str, capacity: usize) -> Result<Self> {
        let bytes = capacity.checked_mul(Self::entry_size()).ok_or_else(|| {
            Error::InitializationFailed(format!("pool '{}' of {} slots overflows", label, capacity))
        })?;
        let pool = Self::new(label, capacity)?;
        let block = arena.alloc_align(bytes, std::mem::align_of::<Entry<T>>())?;

        crate::engine_debug!(
            "celeritas::Pool",
            "Pool '{}' reserved {} arena bytes at offset {}",
            label,
            block.size(),
            block.offset()
        );
        Ok(pool)
    }

    /// Bytes one slot occupies, free-list link and generation included
    pub fn entry_size() -> usize {
        std::mem::size_of::<Entry<T>>()
    }

    /// Take a free slot, reset it to `T::default()` and return its handle
    /// together with a mutable reference for initialization.
    ///
    /// Returns `None` when the pool is full; the pool is left unchanged.
    pub fn alloc(&mut self) -> Option<(H, &mut T)>
    where
        T: Default,
    {
        self.insert_with(T::default)
    }

    /// Move `value` into a free slot and return its handle.
    ///
    /// Returns `None` (dropping `value`) when the pool is full.
    pub fn insert(&mut self, value: T) -> Option<H> {
        self.insert_with(|| value).map(|(handle, _)| handle)
    }

    fn insert_with(&mut self, make: impl FnOnce() -> T) -> Option<(H, &mut T)> {
        let Some(index) = self.free_head else {
            crate::engine_warn!(
                "celeritas::Pool",
                "Pool '{}' exhausted ({} {} slots in use)",
                self.label,
                self.len,
                H::KIND
            );
            return None;
        };

        let entry = &mut self.entries[index as usize];
        let next = match entry.slot {
            Slot::Free { next } => next,
            Slot::Live(_) => {
                crate::engine_error!(
                    "celeritas::Pool",
                    "Pool '{}' free list points at live slot {}",
                    self.label,
                    index
                );
                return None;
            }
        };

        self.free_head = next;
        self.len += 1;
        entry.slot = Slot::Live(make());

        let handle = H::from_parts(index, entry.generation);
        match &mut entry.slot {
            Slot::Live(value) => Some((handle, value)),
            Slot::Free { .. } => None,
        }
    }

    /// Shared access to the value behind `handle`
    ///
    /// # Errors
    ///
    /// - `InvalidHandle` for the sentinel or an index beyond capacity
    /// - `StaleHandle` if the slot was released since the handle was issued
    pub fn get(&self, handle: H) -> Result<&T> {
        let index = self.check(handle)?;
        match &self.entries[index].slot {
            Slot::Live(value) => Ok(value),
            Slot::Free { .. } => Err(self.stale(handle)),
        }
    }

    /// Mutable access to the value behind `handle`
    pub fn get_mut(&mut self, handle: H) -> Result<&mut T> {
        let index = self.check(handle)?;
        if matches!(self.entries[index].slot, Slot::Free { .. }) {
            return Err(self.stale(handle));
        }
        match &mut self.entries[index].slot {
            Slot::Live(value) => Ok(value),
            Slot::Free { .. } => Err(Error::StaleHandle(handle.to_string())),
        }
    }

    /// Whether `handle` currently refers to a live value
    pub fn contains(&self, handle: H) -> bool {
        self.get(handle).is_ok()
    }

    /// Release the slot behind `handle` and hand back its value.
    ///
    /// The slot goes to the head of the free list and its generation is
    /// bumped, invalidating every copy of `handle`.
    pub fn dealloc(&mut self, handle: H) -> Result<T> {
        let index = match self.check(handle) {
            Ok(index) => index,
            Err(err) => crate::engine_fail!("celeritas::Pool", err),
        };
        if matches!(self.entries[index].slot, Slot::Free { .. }) {
            crate::engine_fail!("celeritas::Pool", self.stale(handle));
        }

        let entry = &mut self.entries[index];
        let old = std::mem::replace(&mut entry.slot, Slot::Free { next: self.free_head });
        entry.generation = entry.generation.wrapping_add(1);
        self.free_head = Some(index as u32);
        self.len -= 1;

        match old {
            Slot::Live(value) => Ok(value),
            Slot::Free { .. } => Err(Error::StaleHandle(handle.to_string())),
        }
    }

    /// Release every slot. Outstanding handles all become stale.
    pub fn free_all(&mut self) {
        let capacity = self.entries.len();
        for (i, entry) in self.entries.iter_mut().enumerate() {
            if matches!(entry.slot, Slot::Live(_)) {
                entry.generation = entry.generation.wrapping_add(1);
            }
            entry.slot = Slot::Free {
                next: if i + 1 < capacity { Some(i as u32 + 1) } else { None },
            };
        }
        self.free_head = Some(0);
        self.len = 0;
    }

    /// Live values with their handles, in slot order
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> {
        self.entries.iter().enumerate().filter_map(|(i, entry)| match &entry.slot {
            Slot::Live(value) => Some((H::from_parts(i as u32, entry.generation), value)),
            Slot::Free { .. } => None,
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (H, &mut T)> {
        self.entries.iter_mut().enumerate().filter_map(|(i, entry)| {
            let generation = entry.generation;
            match &mut entry.slot {
                Slot::Live(value) => Some((H::from_parts(i as u32, generation), value)),
                Slot::Free { .. } => None,
            }
        })
    }

    /// Handles of every live value, in slot order
    pub fn handles(&self) -> Vec<H> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Number of live values
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.free_head.is_none()
    }

    fn check(&self, handle: H) -> Result<usize> {
        let index = handle.index() as usize;
        if !handle.is_valid() || index >= self.entries.len() {
            return Err(Error::InvalidHandle(format!(
                "{} is out of range for pool '{}' (capacity {})",
                handle,
                self.label,
                self.entries.len()
            )));
        }
        if self.entries[index].generation != handle.generation() {
            return Err(self.stale(handle));
        }
        Ok(index)
    }

    fn stale(&self, handle: H) -> Error {
        Error::StaleHandle(format!("{} in pool '{}' was released", handle, self.label))
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
