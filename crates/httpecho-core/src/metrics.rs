//! Request counter registry.
//!
//! Counters are keyed by their flattened, sorted label set and stored as
//! atomics inside a `DashMap`, so concurrent increments never lose updates and
//! never need a global lock. Rendering produces the Prometheus text
//! exposition format consumed by the `/metrics` endpoint.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Name of the per-identity request counter.
pub const REQS_COUNT: &str = "reqs_count";
/// Label carrying the server identity.
pub const SERVER_ID_LABEL: &str = "server_id";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut key: Vec<(String, String)> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value. Unseen label sets start at zero.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let key = label_key(labels);

        // Fast path: shared shard lock only.
        if let Some(counter) = self.map.get(&key) {
            counter.fetch_add(v, Ordering::Relaxed);
            return;
        }

        let counter = self.map.entry(key).or_insert_with(|| {
            tracing::debug!(?labels, "registering counter label set");
            AtomicU64::new(0)
        });
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for a label set (0 when never incremented).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", name, help);
        let _ = writeln!(out, "# TYPE {} counter", name);

        // DashMap iteration order is arbitrary; sort for stable scrapes.
        let mut rows: Vec<(String, u64)> = self
            .map
            .iter()
            .map(|r| {
                let label_str = r
                    .key()
                    .iter()
                    .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
                    .collect::<Vec<_>>()
                    .join(",");
                (label_str, r.value().load(Ordering::Relaxed))
            })
            .collect();
        rows.sort();

        for (label_str, val) in rows {
            if label_str.is_empty() {
                let _ = writeln!(out, "{} {}", name, val);
            } else {
                let _ = writeln!(out, "{}{{{}}} {}", name, label_str, val);
            }
        }
    }
}

/// Process-wide request metrics, shared by the echo and metrics handlers.
#[derive(Default)]
pub struct RequestMetrics {
    reqs_count: CounterVec,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one echo request for `server_id`.
    pub fn increment(&self, server_id: &str) {
        self.reqs_count.inc(&[(SERVER_ID_LABEL, server_id)]);
    }

    pub fn get(&self, server_id: &str) -> u64 {
        self.reqs_count.get(&[(SERVER_ID_LABEL, server_id)])
    }

    /// Render all registered metrics.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.reqs_count.render(
            REQS_COUNT,
            "The total number of received requests",
            &mut out,
        );
        out
    }
}
