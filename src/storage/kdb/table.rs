//! Append-only slot table with lock-free reads
//!
//! Slots live in a fixed-capacity segment published through `ArcSwap`.
//! Appends fill the next cell and bump `len`; when the segment is full the
//! writer copies the slot handles into a segment twice the size and publishes
//! it. Readers pin whichever segment is current and never block.
//!
//! ```text
//! current ─→ Segment { len: 3, slots: [s0, s1, s2, _, _, _, _, _] }
//!                                               ↑ next append
//! ```

use super::slot::Slot;
use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

const MIN_SEGMENT_CAPACITY: usize = 16;

struct Segment<V> {
    slots: Box<[OnceLock<Arc<Slot<V>>>]>,
    /// Cells below `len` are set
    len: AtomicUsize,
}

impl<V> Segment<V> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| OnceLock::new()).collect(),
            len: AtomicUsize::new(0),
        }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn get(&self, index: usize) -> Option<&Arc<Slot<V>>> {
        if index >= self.len.load(Ordering::Acquire) {
            return None;
        }
        self.slots[index].get()
    }
}

/// Growable table of slots addressed by index
pub struct SlotTable<V> {
    current: ArcSwap<Segment<V>>,
}

impl<V> SlotTable<V> {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_SEGMENT_CAPACITY);
        Self {
            current: ArcSwap::from_pointee(Segment::with_capacity(capacity)),
        }
    }

    /// Number of slots ever allocated
    pub fn len(&self) -> usize {
        self.current.load().len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot at `index`, if it has been allocated
    pub fn get(&self, index: usize) -> Option<Arc<Slot<V>>> {
        self.current.load().get(index).cloned()
    }

    /// Append a slot at the next index
    ///
    /// Appends must be serialized by the caller; the store only pushes while
    /// holding its writer lock.
    pub fn push(&self, slot: Slot<V>) -> Arc<Slot<V>> {
        let mut segment = self.current.load_full();
        let len = segment.len.load(Ordering::Acquire);
        debug_assert_eq!(slot.index(), len, "slot index must equal table length");

        if len == segment.capacity() {
            segment = self.grow(&segment, len);
        }

        let slot = Arc::new(slot);
        // cells at or past `len` are never set
        let set = segment.slots[len].set(Arc::clone(&slot));
        debug_assert!(set.is_ok(), "slot cell {} filled twice", len);
        segment.len.store(len + 1, Ordering::Release);
        slot
    }

    fn grow(&self, old: &Segment<V>, len: usize) -> Arc<Segment<V>> {
        let grown = Segment::with_capacity(old.capacity() * 2);
        for (cell, slot) in grown.slots.iter().zip(old.slots.iter()) {
            if let Some(slot) = slot.get() {
                let set = cell.set(Arc::clone(slot));
                debug_assert!(set.is_ok(), "fresh segment cell already filled");
            }
        }
        grown.len.store(len, Ordering::Release);

        let grown = Arc::new(grown);
        self.current.store(Arc::clone(&grown));
        grown
    }

    /// Slots in index order as of the moment of the call
    pub fn iter(&self) -> impl Iterator<Item = Arc<Slot<V>>> {
        let segment = self.current.load_full();
        let len = segment.len.load(Ordering::Acquire);
        (0..len).filter_map(move |index| segment.slots[index].get().cloned())
    }
}
