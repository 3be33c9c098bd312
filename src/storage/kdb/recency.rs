//! Recency heap for slot reuse
//!
//! Binary min-heap over slot indices ordered by last-write stamp. Each slot
//! keeps a row recording its stamp and its current position in the heap, so a
//! slot whose stamp changed can be re-sifted in place without a search.
//!
//! ```text
//! heap:  [2, 0, 1]            (slot indices, heap-ordered)
//! rows:  0 → { stamp: 10, position: 1 }
//!        1 → { stamp: 12, position: 2 }
//!        2 → { stamp:  0, position: 0 }   ← freed, next reuse candidate
//! ```
//!
//! There is no extract-min: freed slots stay in the heap and sort first.

/// Per-slot recency bookkeeping
#[derive(Debug, Clone, Copy)]
struct Row {
    stamp: i64,
    position: usize,
}

/// Min-heap of slots keyed by last-write stamp
#[derive(Debug, Default)]
pub struct RecencyHeap {
    /// Slot indices in heap order
    heap: Vec<usize>,
    /// Indexed by slot index
    rows: Vec<Row>,
}

impl RecencyHeap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            rows: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Add a brand-new slot
    ///
    /// Slot indices must arrive densely: `slot` is always the current length.
    pub fn push(&mut self, slot: usize, stamp: i64) {
        debug_assert_eq!(slot, self.rows.len(), "slots must be pushed in index order");
        let position = self.heap.len();
        self.rows.push(Row { stamp, position });
        self.heap.push(slot);
        self.up(position);
    }

    /// Least recently written slot, without removing it
    pub fn peek_min(&self) -> Option<usize> {
        self.heap.first().copied()
    }

    /// Last-write stamp of `slot`
    pub fn stamp(&self, slot: usize) -> Option<i64> {
        self.rows.get(slot).map(|row| row.stamp)
    }

    /// Current heap position of `slot`
    pub fn position(&self, slot: usize) -> Option<usize> {
        self.rows.get(slot).map(|row| row.position)
    }

    /// Change the stamp of `slot` and restore heap order around it
    ///
    /// Returns `false` for a slot the heap has never seen.
    pub fn set_stamp(&mut self, slot: usize, stamp: i64) -> bool {
        let Some(row) = self.rows.get_mut(slot) else {
            return false;
        };
        row.stamp = stamp;
        let position = row.position;
        self.fix(position);
        true
    }

    /// Re-establish ordering after the element at `position` changed its stamp
    fn fix(&mut self, position: usize) {
        if !self.down(position) {
            self.up(position);
        }
    }

    fn less(&self, i: usize, j: usize) -> bool {
        self.rows[self.heap[i]].stamp < self.rows[self.heap[j]].stamp
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.heap.swap(i, j);
        self.rows[self.heap[i]].position = i;
        self.rows[self.heap[j]].position = j;
    }

    fn up(&mut self, mut j: usize) {
        while j > 0 {
            let parent = (j - 1) / 2;
            if !self.less(j, parent) {
                break;
            }
            self.swap(parent, j);
            j = parent;
        }
    }

    /// Sift down from `start`; true if the element moved
    fn down(&mut self, start: usize) -> bool {
        let n = self.heap.len();
        let mut i = start;
        loop {
            let left = 2 * i + 1;
            if left >= n {
                break;
            }
            let mut child = left;
            let right = left + 1;
            if right < n && self.less(right, left) {
                child = right;
            }
            if !self.less(child, i) {
                break;
            }
            self.swap(i, child);
            i = child;
        }
        i > start
    }

    /// Check heap order and the position back-references
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        if self.heap.len() != self.rows.len() {
            return false;
        }
        let positions_ok = self
            .heap
            .iter()
            .enumerate()
            .all(|(position, &slot)| self.rows[slot].position == position);
        let order_ok = (1..self.heap.len()).all(|i| !self.less(i, (i - 1) / 2));
        positions_ok && order_ok
    }
}
