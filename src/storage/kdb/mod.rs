//! Slot-recycling key/value store
//!
//! Values are addressed by key or by alias, the decimal index of the slot
//! holding them. Slots are never removed; deleted ones are handed to new keys
//! before the table grows.
//!
//! # Architecture
//!
//! ```text
//! Kdb
//!   ├─→ Mutex<Inner>                    (upsert / delete only)
//!   │     ├─→ keys:    "a" → 2, "b" → 1
//!   │     └─→ recency: min-heap of slots by last-write stamp
//!   │                  rows: slot → { stamp, heap position }
//!   └─→ SlotTable (lock-free reads)
//!         ├─→ 0: free          stamp 0  ← next reuse candidate
//!         ├─→ 1: "b" → value
//!         └─→ 2: "a" → value
//! ```
//!
//! Read paths (`read`, `readi`, `list`) never touch the mutex.

pub mod clock;
pub mod recency;
pub mod slot;
pub mod store;
pub mod table;

mod production_tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use recency::RecencyHeap;
pub use slot::{Alias, Entry, Slot};
pub use store::{Kdb, StoreStats};
pub use table::SlotTable;
