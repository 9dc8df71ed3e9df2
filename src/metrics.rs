//! Performance metrics collector
//!
//! An explicitly constructed collector of timing samples keyed by operation
//! name. The server holds one in its state; the request-timing middleware and
//! the ideation pipeline feed it. Each operation keeps a bounded window of the
//! most recent samples, while its total count covers everything recorded
//! since the last reset.

use crate::utils::lock_mutex_recover;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_SAMPLES: usize = 1000;

#[derive(Debug, Default)]
struct OperationSamples {
    window: VecDeque<f64>,
    total_count: u64,
}

#[derive(Debug)]
struct CollectorState {
    operations: HashMap<String, OperationSamples>,
    since: DateTime<Utc>,
}

pub struct MetricsCollector {
    state: Mutex<CollectorState>,
    max_samples: usize,
}

/// Aggregated timings for one operation, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStats {
    pub count: u64,
    /// Samples the statistics below are computed over
    pub window: usize,
    pub min_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
    pub p95_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub since: DateTime<Utc>,
    pub taken_at: DateTime<Utc>,
    pub operations: BTreeMap<String, OperationStats>,
}

impl MetricsSnapshot {
    pub fn get(&self, operation: &str) -> Option<&OperationStats> {
        self.operations.get(operation)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn stats_for(samples: &OperationSamples) -> Option<OperationStats> {
    if samples.window.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = samples.window.iter().copied().collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    // Nearest-rank percentile
    let p95_index = ((0.95 * n as f64).ceil() as usize).clamp(1, n) - 1;
    Some(OperationStats {
        count: samples.total_count,
        window: n,
        min_ms: round2(sorted[0]),
        max_ms: round2(sorted[n - 1]),
        mean_ms: round2(sorted.iter().sum::<f64>() / n as f64),
        p95_ms: round2(sorted[p95_index]),
    })
}

impl MetricsCollector {
    pub fn new(max_samples: usize) -> Self {
        Self {
            state: Mutex::new(CollectorState {
                operations: HashMap::new(),
                since: Utc::now(),
            }),
            max_samples: max_samples.max(1),
        }
    }

    pub fn record(&self, operation: &str, duration: Duration) {
        self.record_ms(operation, duration.as_secs_f64() * 1000.0);
    }

    pub fn record_ms(&self, operation: &str, millis: f64) {
        let mut state = lock_mutex_recover(&self.state);
        let samples = state.operations.entry(operation.to_string()).or_default();
        if samples.window.len() == self.max_samples {
            samples.window.pop_front();
        }
        samples.window.push_back(millis.max(0.0));
        samples.total_count += 1;
    }

    /// Time a closure and record its duration under `operation`
    pub fn time<T>(&self, operation: &str, f: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let result = f();
        self.record(operation, started.elapsed());
        result
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let state = lock_mutex_recover(&self.state);
        let operations = state
            .operations
            .iter()
            .filter_map(|(name, samples)| stats_for(samples).map(|s| (name.clone(), s)))
            .collect();
        MetricsSnapshot {
            since: state.since,
            taken_at: Utc::now(),
            operations,
        }
    }

    pub fn reset(&self) {
        let mut state = lock_mutex_recover(&self.state);
        state.operations.clear();
        state.since = Utc::now();
        log::info!("Metrics reset");
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SAMPLES)
    }
}
