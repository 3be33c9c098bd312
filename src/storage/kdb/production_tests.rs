//! Production scenario tests for the kdb store
//!
//! These tests drive Kdb through realistic workloads: session tables with
//! churn, alias caching by clients, and values larger than a word.

#[cfg(test)]
mod integration {
    use crate::storage::kdb::{Kdb, ManualClock};
    use crate::StoreConfig;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[test]
    fn test_production_basic_operations() {
        let store: Kdb<String> = Kdb::with_config(StoreConfig::with_name("prod_basic")).unwrap();

        // Write 100 key-value pairs
        let mut aliases = HashMap::new();
        for i in 0..100 {
            let key = format!("user:{}", i);
            let value = format!("{{\"id\":{},\"name\":\"User {}\"}}", i, i);
            aliases.insert(key.clone(), store.upsert(&key, value));
        }

        // Read back through the cached alias
        let value = store
            .read("user:42", &aliases["user:42"])
            .expect("User 42 should exist");
        assert!(value.contains("\"id\":42"));
        assert!(value.contains("User 42"));

        // Update keeps the alias
        let alias = store.upsert("user:42", "{\"id\":42,\"name\":\"Updated User\"}".into());
        assert_eq!(alias, aliases["user:42"]);
        let updated = store.read("user:42", &alias).expect("Updated user should exist");
        assert!(updated.contains("Updated User"));

        // Delete
        store.delete("user:0");
        assert!(store.read("user:0", &aliases["user:0"]).is_none());

        assert_eq!(store.len(), 99);
        assert_eq!(store.slot_count(), 100);
    }

    #[test]
    fn test_production_session_churn() {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let store: Kdb<u64> =
            Kdb::with_clock(StoreConfig::with_name("prod_churn"), clock.clone()).unwrap();

        // 50 sessions log in, one per second
        for i in 0..50u64 {
            store.upsert(&format!("session:{}", i), i);
            clock.advance(1);
        }

        // Half of them log out
        for i in (0..50u64).step_by(2) {
            store.delete(&format!("session:{}", i));
        }
        assert_eq!(store.stats().free, 25);

        // 25 new sessions fill the freed slots without growing the table
        for i in 50..75u64 {
            let index = store.upsert_index(&format!("session:{}", i), i).unwrap();
            assert!(index < 50 && index % 2 == 0, "session {} got slot {}", i, index);
            clock.advance(1);
        }
        assert_eq!(store.slot_count(), 50);
        assert_eq!(store.stats().free, 0);

        // The next one has to grow
        assert_eq!(store.upsert("session:75", 75), "50");
    }

    #[test]
    fn test_production_stale_alias_after_recycle() {
        let store: Kdb<&'static str> = Kdb::new();

        let old = store.upsert("cart:alice", "3 items");
        store.delete("cart:alice");
        let new = store.upsert("cart:bob", "1 item");

        // Bob inherited Alice's slot; Alice's cached alias must not leak Bob's cart
        assert_eq!(old, new);
        assert_eq!(store.read("cart:alice", &old), None);
        assert_eq!(store.read("cart:bob", &old), Some("1 item"));
    }

    #[test]
    fn test_production_large_values() {
        let store: Kdb<Arc<Vec<u8>>> = Kdb::new();

        for i in 0..20 {
            let size = 1024 * (i + 1); // 1KB to 20KB
            store.upsert(&format!("blob:{}", i), Arc::new(vec![b'A'; size]));
        }

        let large = store.readi("blob:19", 19).expect("Large value should exist");
        assert_eq!(large.len(), 20 * 1024);

        let mut total = 0;
        store.list(|_, blob| {
            total += blob.len();
            true
        });
        assert_eq!(total, (1..=20).map(|i| i * 1024).sum::<usize>());
    }
}
