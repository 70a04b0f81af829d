//! Metric names recorded by the store and its hooks.

pub const METRIC_STORE_MUTATIONS: &str = "blogdeck_store_mutations_total";
pub const METRIC_PERSIST_FAILURES: &str = "blogdeck_persist_failures_total";
pub const METRIC_FETCH_FAILURES: &str = "blogdeck_fetch_failures_total";
