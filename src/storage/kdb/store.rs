//! The kdb store
//!
//! Combines SlotTable + key index + RecencyHeap behind one writer lock.
//!
//! # Consistency
//!
//! `upsert` and `delete` are serialized by a single `parking_lot::Mutex` that
//! owns the key index and the recency heap together. `read`, `readi` and
//! `list` never take that lock: they go straight to the slot table and to the
//! entry each slot publishes. A reader racing a writer on the same slot sees
//! either the old pair or the new one. `list` is not a snapshot; it may
//! observe some writes made while it runs and miss others.

use super::clock::{Clock, SystemClock};
use super::recency::RecencyHeap;
use super::slot::{Alias, Slot};
use super::table::SlotTable;
use crate::config::StoreConfig;
use crate::error::Result;
use crate::metrics::{StoreMetrics, UpsertOutcome};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Stamp given to freed slots so they sort ahead of every live one
const FREED_STAMP: i64 = 0;

/// State owned by the writer lock
struct Inner {
    /// key → slot index
    keys: HashMap<String, usize>,
    recency: RecencyHeap,
}

/// Concurrent key/value store with recycled slots and numeric aliases
///
/// Every stored value sits in a slot whose index never changes. `upsert`
/// returns that index as an alias; `read`/`readi` use it to skip hashing the
/// key. Deleted slots are reused, least recently written first, before the
/// table grows. Live entries are never evicted.
///
/// Writes are serialized; reads are lock-free and weakly consistent (see the
/// module docs).
pub struct Kdb<V> {
    name: String,
    inner: Mutex<Inner>,
    table: SlotTable<V>,
    clock: Arc<dyn Clock>,
    metrics: Option<StoreMetrics>,
}

impl<V> fmt::Debug for Kdb<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kdb")
            .field("name", &self.name)
            .field("slots", &self.table.len())
            .finish()
    }
}

impl<V> Default for Kdb<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Kdb<V> {
    /// Create an empty store with the default config
    pub fn new() -> Self {
        Self::build(StoreConfig::default(), Arc::new(SystemClock))
    }

    /// Create an empty store stamped by the system clock
    ///
    /// Fails if `config` does not pass [`StoreConfig::validate`].
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an empty store with an explicit time source
    ///
    /// Fails if `config` does not pass [`StoreConfig::validate`].
    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, clock))
    }

    fn build(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        let capacity = config.initial_capacity;
        let metrics = config.metrics.then(|| StoreMetrics::new(&config.name));

        info!(store = %config.name, capacity, metrics = config.metrics, "Opened kdb store");

        Self {
            name: config.name,
            inner: Mutex::new(Inner {
                keys: HashMap::with_capacity(capacity),
                recency: RecencyHeap::with_capacity(capacity),
            }),
            table: SlotTable::with_capacity(capacity),
            clock,
            metrics,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert or replace `value` under `key`, returning the alias as a string
    ///
    /// An empty key is rejected and yields an empty string.
    pub fn upsert(&self, key: &str, value: V) -> String {
        self.upsert_index(key, value)
            .map(|index| index.to_string())
            .unwrap_or_default()
    }

    /// Typed variant of [`upsert`](Self::upsert)
    pub fn upsert_alias(&self, key: &str, value: V) -> Option<Alias> {
        self.upsert_index(key, value).map(Alias::new)
    }

    /// Insert or replace `value` under `key`, returning the slot index
    pub fn upsert_index(&self, key: &str, value: V) -> Option<usize> {
        if key.is_empty() {
            self.record_upsert(UpsertOutcome::Rejected);
            return None;
        }

        let mut inner = self.inner.lock();
        let now = self.clock.now_unix();

        if let Some(&index) = inner.keys.get(key) {
            if inner.recency.stamp(index) != Some(now) {
                inner.recency.set_stamp(index, now);
            }
            if let Some(slot) = self.table.get(index) {
                slot.assign(key.to_string(), value);
            }
            trace!(store = %self.name, index, "Updated slot in place");
            self.record_upsert(UpsertOutcome::Updated);
            return Some(index);
        }

        // Only a free slot may be reused; an occupied minimum is left alone.
        let candidate = inner
            .recency
            .peek_min()
            .and_then(|index| self.table.get(index))
            .filter(|slot| slot.is_free());
        if let Some(slot) = candidate {
            let index = slot.index();
            slot.assign(key.to_string(), value);
            inner.recency.set_stamp(index, now);
            inner.keys.insert(key.to_string(), index);
            debug!(store = %self.name, index, key_len = key.len(), "Recycled free slot");
            self.record_upsert(UpsertOutcome::Recycled);
            return Some(index);
        }

        let index = self.table.len();
        self.table.push(Slot::new(index, key.to_string(), value));
        inner.recency.push(index, now);
        inner.keys.insert(key.to_string(), index);
        debug!(store = %self.name, index, key_len = key.len(), "Allocated slot");
        self.record_upsert(UpsertOutcome::Allocated);
        if let Some(metrics) = &self.metrics {
            metrics.set_slots(index + 1);
        }
        Some(index)
    }

    /// Free the slot owned by `key`
    ///
    /// No-op for an empty or unknown key. The slot keeps its index and becomes
    /// the next reuse candidate; aliases that pointed at it read as not found.
    pub fn delete(&self, key: &str) {
        if key.is_empty() {
            return;
        }

        let mut inner = self.inner.lock();
        let Some(index) = inner.keys.remove(key) else {
            self.record_delete(false);
            return;
        };
        if let Some(slot) = self.table.get(index) {
            slot.free();
        }
        inner.recency.set_stamp(index, FREED_STAMP);
        debug!(store = %self.name, index, key_len = key.len(), "Freed slot");
        self.record_delete(true);
    }

    /// Visit live entries in slot order until `visitor` returns `false`
    ///
    /// Lock-free; not a snapshot under concurrent writes.
    pub fn list<F>(&self, mut visitor: F)
    where
        F: FnMut(&str, &V) -> bool,
    {
        for slot in self.table.iter() {
            let Some(entry) = slot.entry() else {
                continue;
            };
            if !visitor(entry.key(), entry.value()) {
                break;
            }
        }
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.inner.lock().keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots ever allocated, live or free
    pub fn slot_count(&self) -> usize {
        self.table.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().keys.contains_key(key)
    }

    /// Slot and key counts, taken under the writer lock
    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.lock();
        let slots = self.table.len();
        let live = inner.keys.len();
        StoreStats {
            name: self.name.clone(),
            slots,
            live,
            free: slots.saturating_sub(live),
        }
    }

    fn record_upsert(&self, outcome: UpsertOutcome) {
        if let Some(metrics) = &self.metrics {
            metrics.record_upsert(outcome);
        }
    }

    fn record_delete(&self, removed: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_delete(removed);
        }
    }

    fn record_read(&self, hit: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_read(hit);
        }
    }
}

impl<V: Clone> Kdb<V> {
    /// Look up `key` through a string alias
    ///
    /// Unparseable, out-of-range and stale aliases all read as `None`.
    /// Lock-free.
    pub fn read(&self, key: &str, alias: &str) -> Option<V> {
        match alias.parse::<Alias>() {
            Ok(alias) => self.readi(key, alias.index()),
            Err(_) => {
                self.record_read(false);
                None
            }
        }
    }

    /// Look up `key` through a slot index. Lock-free.
    pub fn readi(&self, key: &str, index: usize) -> Option<V> {
        let value = self.table.get(index).and_then(|slot| slot.read(key));
        self.record_read(value.is_some());
        value
    }
}

/// Store statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub name: String,
    /// Slots ever allocated
    pub slots: usize,
    /// Slots owned by a key
    pub live: usize,
    /// Slots waiting to be recycled
    pub free: usize,
}
