//! Storage layer
//!
//! The only engine is [`kdb::Kdb`], an in-memory store whose values can be
//! reached by key or by numeric alias.

pub mod kdb;

pub use kdb::{Alias, Kdb, StoreStats};
