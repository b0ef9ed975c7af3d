//! Fetch health metrics
//!
//! Tracks latency percentiles and success rate for logical pair fetches
//! (all retry attempts of one call count as one sample).

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::RwLock;

/// Maximum number of samples to keep for metrics calculation
const MAX_SAMPLES: usize = 100;

/// Metrics snapshot for a data source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMetrics {
    /// Name of the source
    pub source_name: String,
    /// 50th percentile latency of successful fetches in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile latency of successful fetches in milliseconds
    pub latency_p99_ms: f64,
    /// Success rate (0.0 to 1.0)
    pub success_rate: f64,
    /// Total number of fetches that went upstream
    pub total_requests: u64,
    /// Number of failed fetches
    pub failed_requests: u64,
    /// Number of fetches answered from cache
    pub cache_hits: u64,
}

impl SourceMetrics {
    /// Creates metrics with no data
    pub fn empty(source_name: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            latency_p50_ms: 0.0,
            latency_p99_ms: 0.0,
            success_rate: 1.0,
            total_requests: 0,
            failed_requests: 0,
            cache_hits: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct LatencySample {
    duration_ms: f64,
    success: bool,
}

#[derive(Debug, Default)]
struct Counters {
    samples: VecDeque<LatencySample>,
    total_requests: u64,
    failed_requests: u64,
    cache_hits: u64,
}

/// Collects and computes metrics for a source
pub struct MetricsCollector {
    source_name: String,
    counters: RwLock<Counters>,
}

impl MetricsCollector {
    /// Creates a new metrics collector for a source
    pub fn new(source_name: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            counters: RwLock::new(Counters {
                samples: VecDeque::with_capacity(MAX_SAMPLES),
                ..Counters::default()
            }),
        }
    }

    /// Records an upstream fetch with its duration and success status
    pub async fn record_request(&self, duration: Duration, success: bool) {
        let duration_ms = duration.as_secs_f64() * 1000.0;
        let mut counters = self.counters.write().await;

        counters.total_requests += 1;
        if !success {
            counters.failed_requests += 1;
        }

        if counters.samples.len() >= MAX_SAMPLES {
            counters.samples.pop_front();
        }
        counters.samples.push_back(LatencySample {
            duration_ms,
            success,
        });
    }

    /// Records a fetch answered from cache
    pub async fn record_cache_hit(&self) {
        self.counters.write().await.cache_hits += 1;
    }

    /// Computes current metrics from collected samples
    pub async fn get_metrics(&self) -> SourceMetrics {
        let counters = self.counters.read().await;

        let mut latencies: Vec<f64> = counters
            .samples
            .iter()
            .filter(|s| s.success)
            .map(|s| s.duration_ms)
            .collect();
        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let success_rate = if counters.total_requests > 0 {
            (counters.total_requests - counters.failed_requests) as f64
                / counters.total_requests as f64
        } else {
            1.0
        };

        SourceMetrics {
            source_name: self.source_name.clone(),
            latency_p50_ms: percentile(&latencies, 50.0),
            latency_p99_ms: percentile(&latencies, 99.0),
            success_rate,
            total_requests: counters.total_requests,
            failed_requests: counters.failed_requests,
            cache_hits: counters.cache_hits,
        }
    }
}

/// Calculate percentile from sorted values
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_metrics_collector() {
        let collector = MetricsCollector::new("test");

        collector.record_request(Duration::from_millis(100), true).await;
        collector.record_request(Duration::from_millis(200), true).await;
        collector.record_request(Duration::from_millis(150), false).await;
        collector.record_cache_hit().await;

        let metrics = collector.get_metrics().await;

        assert_eq!(metrics.source_name, "test");
        assert_eq!(metrics.total_requests, 3);
        assert_eq!(metrics.failed_requests, 1);
        assert_eq!(metrics.cache_hits, 1);
        assert!(metrics.success_rate > 0.6 && metrics.success_rate < 0.7);
        assert_eq!(metrics.latency_p99_ms, 200.0);
    }

    #[tokio::test]
    async fn test_empty_metrics() {
        let metrics = MetricsCollector::new("dexscreener").get_metrics().await;
        assert_eq!(metrics, SourceMetrics::empty("dexscreener"));
    }

    #[test]
    fn test_percentile() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        // index 4.5 rounds up
        assert_eq!(percentile(&values, 50.0), 6.0);
        assert_eq!(percentile(&values, 99.0), 10.0);
    }
}
