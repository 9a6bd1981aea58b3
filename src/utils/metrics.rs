use std::collections::HashMap;
use std::sync::Arc;
use lazy_static::lazy_static;
use parking_lot::Mutex;

pub const VOTES_RECORDED: &str = "votes_recorded";
pub const BLOCKS_CONFIRMED: &str = "blocks_confirmed";
pub const LATE_CONFIRMATIONS_DROPPED: &str = "late_confirmations_dropped";
pub const BOOTSTRAP_ADOPTED: &str = "bootstrap_adopted";
pub const BOOTSTRAP_NO_MAJORITY: &str = "bootstrap_no_majority";
pub const BOOTSTRAP_MISMATCH: &str = "bootstrap_mismatch";
pub const TRACKER_RESETS: &str = "tracker_resets";
pub const CONFIRMED_HEIGHT: &str = "confirmed_height";

/// Metrics registry (simple, Prometheus-style)
#[derive(Clone, Default)]
pub struct MetricsRegistry {
    counters: Arc<Mutex<HashMap<String, u64>>>,
    gauges: Arc<Mutex<HashMap<String, f64>>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_counter(&self, name: &str) {
        self.add_counter(name, 1);
    }

    pub fn add_counter(&self, name: &str, by: u64) {
        if by == 0 {
            return;
        }
        let mut counters = self.counters.lock();
        let c = counters.entry(name.to_string()).or_insert(0);
        *c = c.saturating_add(by);
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.lock().get(name).copied().unwrap_or(0)
    }

    pub fn set_gauge(&self, name: &str, val: f64) {
        self.gauges.lock().insert(name.to_string(), val);
    }

    pub fn snapshot(&self) -> (HashMap<String, u64>, HashMap<String, f64>) {
        (self.counters.lock().clone(), self.gauges.lock().clone())
    }
}

lazy_static! {
    pub static ref METRICS: MetricsRegistry = MetricsRegistry::new();
}
