//! Slot records and their numeric aliases

use crate::error::{Error, Result};
use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Compact handle for a stored value: the index of its slot
///
/// Rendered as a plain decimal string (`"0"`, `"17"`), which is the form
/// [`Kdb::upsert`](super::Kdb::upsert) hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Alias(usize);

impl Alias {
    /// Create an alias for a slot index
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Slot index this alias points at
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for Alias {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Alias {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<usize>()
            .map(Self)
            .map_err(|_| Error::InvalidAlias(s.to_string()))
    }
}

/// Key/value pair currently owning a slot
#[derive(Debug)]
pub struct Entry<V> {
    key: String,
    value: V,
}

impl<V> Entry<V> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

/// A storage cell in the slot table
///
/// The index is fixed for the lifetime of the store. The owning entry is
/// published atomically, so readers that skip the writer lock see either the
/// previous pair or the new one, never a mix. Recency bookkeeping (stamp and
/// heap row) lives in [`RecencyHeap`](super::recency::RecencyHeap) under the
/// writer lock.
#[derive(Debug)]
pub struct Slot<V> {
    index: usize,
    entry: ArcSwapOption<Entry<V>>,
}

impl<V> Slot<V> {
    /// Create an occupied slot
    pub fn new(index: usize, key: String, value: V) -> Self {
        Self {
            index,
            entry: ArcSwapOption::from_pointee(Entry { key, value }),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether no key owns this slot
    pub fn is_free(&self) -> bool {
        self.entry.load().is_none()
    }

    /// Current owner, if any
    pub fn entry(&self) -> Option<Arc<Entry<V>>> {
        self.entry.load_full()
    }

    /// Hand the slot to `key`, replacing whatever it held
    pub fn assign(&self, key: String, value: V) {
        self.entry.store(Some(Arc::new(Entry { key, value })));
    }

    /// Mark the slot free
    pub fn free(&self) {
        self.entry.store(None);
    }
}

impl<V: Clone> Slot<V> {
    /// Value stored under `key`, or `None` if the slot is free or owned by another key
    pub fn read(&self, key: &str) -> Option<V> {
        let guard = self.entry.load();
        match guard.as_deref() {
            Some(entry) if entry.key == key => Some(entry.value.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_parse() {
        assert_eq!("0".parse::<Alias>().unwrap(), Alias::new(0));
        assert_eq!("1024".parse::<Alias>().unwrap().index(), 1024);
        assert_eq!(Alias::from(7).to_string(), "7");
    }

    #[test]
    fn test_alias_rejects_garbage() {
        for bad in ["", "-1", "abc", "1.5", " 3", "0x10"] {
            let err = bad.parse::<Alias>().unwrap_err();
            assert!(matches!(err, Error::InvalidAlias(ref s) if s == bad));
        }
    }

    #[test]
    fn test_slot_lifecycle() {
        let slot = Slot::new(3, "k".to_string(), 10);
        assert_eq!(slot.index(), 3);
        assert!(!slot.is_free());
        assert_eq!(slot.read("k"), Some(10));
        assert_eq!(slot.read("other"), None);

        slot.free();
        assert!(slot.is_free());
        assert_eq!(slot.read("k"), None);
        assert!(slot.entry().is_none());

        slot.assign("j".to_string(), 20);
        assert_eq!(slot.index(), 3);
        assert_eq!(slot.read("j"), Some(20));
        assert_eq!(slot.read("k"), None);

        let entry = slot.entry().unwrap();
        assert_eq!(entry.key(), "j");
        assert_eq!(*entry.value(), 20);
    }
}
