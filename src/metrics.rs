//! Prometheus metrics for kdb stores
//!
//! Counters are labelled by store name (see [`StoreConfig::name`](crate::config::StoreConfig))
//! so several stores in one process stay distinguishable.

use prometheus::{
    Encoder, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder,
};
use tracing::{error, info};

lazy_static::lazy_static! {
    /// Global metrics registry
    pub static ref METRICS_REGISTRY: Registry = Registry::new();

    pub static ref UPSERTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("kdb_upserts_total", "Total upsert calls by outcome"),
        &["store", "outcome"]
    ).unwrap();

    pub static ref DELETES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("kdb_deletes_total", "Total delete calls by outcome"),
        &["store", "outcome"]
    ).unwrap();

    pub static ref READS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("kdb_reads_total", "Total alias reads by outcome"),
        &["store", "outcome"]
    ).unwrap();

    pub static ref SLOTS: IntGaugeVec = IntGaugeVec::new(
        Opts::new("kdb_slots", "Slots allocated in the table (live and free)"),
        &["store"]
    ).unwrap();
}

/// Register all kdb metrics with [`METRICS_REGISTRY`]
///
/// Safe to call more than once.
pub fn init_metrics() {
    METRICS_REGISTRY.register(Box::new(UPSERTS_TOTAL.clone())).ok();
    METRICS_REGISTRY.register(Box::new(DELETES_TOTAL.clone())).ok();
    METRICS_REGISTRY.register(Box::new(READS_TOTAL.clone())).ok();
    METRICS_REGISTRY.register(Box::new(SLOTS.clone())).ok();

    info!("kdb metrics registered");
}

/// Export all metrics in Prometheus text format
pub fn export_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|_| String::from("# Error converting metrics\n"))
}

/// What an upsert did with its key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Key already had a slot
    Updated,
    /// A freed slot was handed to the key
    Recycled,
    /// A new slot was appended
    Allocated,
    /// Empty key
    Rejected,
}

impl UpsertOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::Recycled => "recycled",
            Self::Allocated => "allocated",
            Self::Rejected => "rejected",
        }
    }
}

/// Counter handles resolved once per store
#[derive(Debug, Clone)]
pub struct StoreMetrics {
    updated: IntCounter,
    recycled: IntCounter,
    allocated: IntCounter,
    rejected: IntCounter,
    removed: IntCounter,
    missing: IntCounter,
    hits: IntCounter,
    misses: IntCounter,
    slots: IntGauge,
}

impl StoreMetrics {
    pub fn new(store: &str) -> Self {
        let upsert =
            |outcome: UpsertOutcome| UPSERTS_TOTAL.with_label_values(&[store, outcome.as_str()]);
        Self {
            updated: upsert(UpsertOutcome::Updated),
            recycled: upsert(UpsertOutcome::Recycled),
            allocated: upsert(UpsertOutcome::Allocated),
            rejected: upsert(UpsertOutcome::Rejected),
            removed: DELETES_TOTAL.with_label_values(&[store, "removed"]),
            missing: DELETES_TOTAL.with_label_values(&[store, "missing"]),
            hits: READS_TOTAL.with_label_values(&[store, "hit"]),
            misses: READS_TOTAL.with_label_values(&[store, "miss"]),
            slots: SLOTS.with_label_values(&[store]),
        }
    }

    pub fn record_upsert(&self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Updated => self.updated.inc(),
            UpsertOutcome::Recycled => self.recycled.inc(),
            UpsertOutcome::Allocated => self.allocated.inc(),
            UpsertOutcome::Rejected => self.rejected.inc(),
        }
    }

    pub fn record_delete(&self, removed: bool) {
        if removed {
            self.removed.inc();
        } else {
            self.missing.inc();
        }
    }

    pub fn record_read(&self, hit: bool) {
        if hit {
            self.hits.inc();
        } else {
            self.misses.inc();
        }
    }

    pub fn set_slots(&self, slots: usize) {
        self.slots.set(slots as i64);
    }
}
