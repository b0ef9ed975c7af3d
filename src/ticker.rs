//! Polling stats ticker
//!
//! Re-fetches one pair on a fixed interval and publishes the result as a
//! [`TickerState`] (for rendering) and as [`StatsEvent`]s (for anything that
//! wants a change feed). One fetch is in flight at a time.

use crate::{
    client::DexScreenerClient,
    config::TickerConfig,
    constants::{EVENT_CHANNEL_CAPACITY, STALE_THRESHOLD_SECS},
    error::FetchError,
    metrics::SourceMetrics,
    types::{ComponentHealth, HealthStatus, MarketStats, StatsEvent, TickerState},
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

struct TickerInner {
    client: Arc<DexScreenerClient>,
    config: TickerConfig,
    state_tx: watch::Sender<TickerState>,
    events_tx: broadcast::Sender<StatsEvent>,
    shutdown: CancellationToken,
    /// Held for a whole cycle so polls and manual refreshes never overlap
    cycle_guard: AsyncMutex<()>,
}

impl TickerInner {
    /// Runs one fetch and publishes its outcome, waiting for any cycle
    /// already in flight to finish first
    async fn run_cycle(&self) -> Result<MarketStats, FetchError> {
        let _cycle = self.cycle_guard.lock().await;
        self.state_tx.send_modify(|state| state.is_loading = true);

        let result = self
            .client
            .get_pair_stats_with_cancel(&self.config.chain_id, &self.config.pair_id, &self.shutdown)
            .await;

        match &result {
            Ok(stats) => {
                self.state_tx.send_modify(|state| {
                    state.stats = Some(stats.clone());
                    state.error = None;
                    state.is_loading = false;
                    state.last_success = Some(stats.last_updated);
                });
                // No subscribers is fine
                let _ = self.events_tx.send(StatsEvent::StatsUpdated {
                    id: Uuid::new_v4(),
                    chain_id: self.config.chain_id.clone(),
                    pair_id: self.config.pair_id.clone(),
                    stats: stats.clone(),
                    timestamp: Utc::now(),
                });
            }
            Err(FetchError::Cancelled) => {
                self.state_tx.send_modify(|state| state.is_loading = false);
            }
            Err(e) => {
                self.state_tx.send_modify(|state| {
                    state.error = Some(e.to_string());
                    state.is_loading = false;
                });
                let _ = self.events_tx.send(StatsEvent::FetchFailed {
                    id: Uuid::new_v4(),
                    chain_id: self.config.chain_id.clone(),
                    pair_id: self.config.pair_id.clone(),
                    kind: e.kind(),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
            }
        }

        result
    }
}

/// Polls a pair and publishes display state
///
/// The background task and any in-flight retry stop when [`StatsTicker::stop`]
/// is called or the ticker is dropped. A stopped ticker cannot be restarted.
///
/// # Example
/// ```no_run
/// use pair_stats_sdk::{DexScreenerClient, StatsTicker, TickerConfig};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Arc::new(DexScreenerClient::new()?);
/// let ticker = StatsTicker::new(client, TickerConfig::from_env()?);
/// ticker.start();
///
/// let mut state = ticker.subscribe_state();
/// while state.changed().await.is_ok() {
///     let current = state.borrow().clone();
///     if let Some(stats) = current.stats {
///         println!("{}", stats.formatted().price);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct StatsTicker {
    inner: Arc<TickerInner>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StatsTicker {
    /// Creates a ticker; nothing is fetched until [`Self::start`] or
    /// [`Self::refresh_now`]
    pub fn new(client: Arc<DexScreenerClient>, config: TickerConfig) -> Self {
        let (state_tx, _) = watch::channel(TickerState::default());
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            inner: Arc::new(TickerInner {
                client,
                config,
                state_tx,
                events_tx,
                shutdown: CancellationToken::new(),
                cycle_guard: AsyncMutex::new(()),
            }),
            task: Mutex::new(None),
        }
    }

    /// Starts the background polling task
    ///
    /// Fetches immediately, then waits `poll_interval` after each cycle.
    /// Calling this while the task is running does nothing.
    pub fn start(&self) {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let inner = self.inner.clone();
        *task = Some(tokio::spawn(async move {
            tracing::info!(
                chain_id = %inner.config.chain_id,
                pair_id = %inner.config.pair_id,
                poll_interval_ms = inner.config.poll_interval.as_millis() as u64,
                "Starting stats ticker"
            );

            while !inner.shutdown.is_cancelled() {
                if let Err(e) = inner.run_cycle().await {
                    tracing::warn!(error = %e, "Stats refresh failed");
                }

                tokio::select! {
                    () = inner.shutdown.cancelled() => break,
                    () = sleep(inner.config.poll_interval) => {}
                }
            }

            tracing::info!(pair_id = %inner.config.pair_id, "Stats ticker stopped");
        }));
    }

    /// Stops polling and cancels any in-flight fetch
    pub fn stop(&self) {
        self.inner.shutdown.cancel();
    }

    /// Returns true while the background task is alive
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Runs one fetch cycle immediately, outside the polling schedule
    ///
    /// If a polled fetch is in flight this waits for it to finish and then
    /// fetches again.
    pub async fn refresh_now(&self) -> Result<MarketStats, FetchError> {
        self.inner.run_cycle().await
    }

    /// Current display state
    pub fn state(&self) -> TickerState {
        self.inner.state_tx.borrow().clone()
    }

    /// Receiver that is notified on every state change
    pub fn subscribe_state(&self) -> watch::Receiver<TickerState> {
        self.inner.state_tx.subscribe()
    }

    /// Receiver for update / failure events
    pub fn subscribe_events(&self) -> broadcast::Receiver<StatsEvent> {
        self.inner.events_tx.subscribe()
    }

    /// The polled configuration
    pub fn config(&self) -> &TickerConfig {
        &self.inner.config
    }

    /// Fetch metrics of the underlying client
    pub async fn metrics(&self) -> SourceMetrics {
        self.inner.client.metrics().await
    }

    /// Perform a health check on the ticker
    ///
    /// # Returns
    /// ComponentHealth indicating whether fresh stats are available
    pub async fn health_check(&self) -> ComponentHealth {
        let state = self.state();
        let metrics = self.metrics().await;
        let mut details = HashMap::new();

        details.insert("chain_id".to_string(), serde_json::json!(self.inner.config.chain_id));
        details.insert("pair_id".to_string(), serde_json::json!(self.inner.config.pair_id));
        details.insert("source_name".to_string(), serde_json::json!(metrics.source_name));
        details.insert("success_rate".to_string(), serde_json::json!(metrics.success_rate));
        details.insert("running".to_string(), serde_json::json!(self.is_running()));

        let stale = state
            .stats
            .as_ref()
            .map(|stats| stats.is_stale(STALE_THRESHOLD_SECS));
        if let Some(stats) = &state.stats {
            details.insert("age_secs".to_string(), serde_json::json!(stats.age().as_secs()));
        }

        let (status, message) = match (&state.stats, &state.error, stale) {
            (None, Some(err), _) => (
                HealthStatus::Unhealthy,
                format!("No stats available, latest fetch failed: {}", err),
            ),
            (None, None, _) => (HealthStatus::Unhealthy, "No stats fetched yet".to_string()),
            (Some(_), Some(err), _) => (
                HealthStatus::Degraded,
                format!("Serving previous stats, latest fetch failed: {}", err),
            ),
            (Some(_), None, Some(true)) => (
                HealthStatus::Degraded,
                format!("Stats are older than {} seconds", STALE_THRESHOLD_SECS),
            ),
            (Some(_), None, _) => (
                HealthStatus::Healthy,
                "Stats ticker is operational with fresh data".to_string(),
            ),
        };

        ComponentHealth {
            name: "stats_ticker".to_string(),
            status,
            message: Some(message),
            details,
            last_checked: Utc::now(),
        }
    }
}

impl Drop for StatsTicker {
    fn drop(&mut self) {
        self.inner.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryPolicy;
    use crate::source::mock::MockSource;
    use serde_json::json;
    use std::time::Duration;

    fn pair_body(price: &str) -> String {
        json!({
            "pairs": [{
                "chainId": "solana",
                "dexId": "raydium",
                "url": "https://dexscreener.com/solana/abc",
                "pairAddress": "abc",
                "baseToken": { "address": "b", "name": "Bunt Coin", "symbol": "BUNT" },
                "quoteToken": { "address": "q", "name": "Wrapped SOL", "symbol": "SOL" },
                "priceUsd": price,
                "txns": { "h24": { "buys": 5, "sells": 3 } },
                "liquidity": { "usd": 2500 }
            }]
        })
        .to_string()
    }

    fn ticker_for(mock: &MockSource, policy: RetryPolicy) -> StatsTicker {
        let client = DexScreenerClient::with_source(Arc::new(mock.clone()))
            .with_retry_policy(policy)
            .without_cache();
        let config = TickerConfig::new("solana", "abc", Duration::from_secs(15)).unwrap();
        StatsTicker::new(Arc::new(client), config)
    }

    #[tokio::test]
    async fn test_refresh_publishes_state_and_event() {
        let mock = MockSource::new();
        mock.push(Ok(pair_body("0.5")));
        let ticker = ticker_for(&mock, RetryPolicy::no_retry());
        let mut events = ticker.subscribe_events();

        assert_eq!(ticker.state(), TickerState::default());

        let stats = ticker.refresh_now().await.unwrap();
        let state = ticker.state();

        assert_eq!(state.stats, Some(stats.clone()));
        assert!(!state.is_loading);
        assert_eq!(state.error, None);
        assert_eq!(state.last_success, Some(stats.last_updated));

        let event = events.recv().await.unwrap();
        assert_eq!(event.event_type(), "STATS_UPDATED");
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_stats_and_sets_error() {
        let mock = MockSource::new();
        mock.push(Ok(pair_body("0.5")));
        mock.push(Err(FetchError::http_status(500, "Internal Server Error")));
        let ticker = ticker_for(&mock, RetryPolicy::no_retry());
        let mut events = ticker.subscribe_events();

        let first = ticker.refresh_now().await.unwrap();
        assert!(ticker.refresh_now().await.is_err());

        let state = ticker.state();
        assert_eq!(state.stats, Some(first));
        assert_eq!(state.error.as_deref(), Some("HTTP 500: Internal Server Error"));
        assert!(!state.is_loading);

        assert_eq!(events.recv().await.unwrap().event_type(), "STATS_UPDATED");
        match events.recv().await.unwrap() {
            StatsEvent::FetchFailed { kind, .. } => {
                assert_eq!(kind, crate::error::ErrorKind::Transport)
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_clears_error() {
        let mock = MockSource::new();
        mock.push(Ok(r#"{"pairs": []}"#.to_string()));
        mock.push(Ok(pair_body("0.7")));
        let ticker = ticker_for(&mock, RetryPolicy::no_retry());

        assert!(ticker.refresh_now().await.is_err());
        assert_eq!(ticker.state().error.as_deref(), Some("No pair data found"));
        assert_eq!(ticker.state().stats, None);

        ticker.refresh_now().await.unwrap();
        assert_eq!(ticker.state().error, None);
        assert_eq!(
            ticker.state().stats.map(|s| s.price_usd),
            Some("0.7".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_on_interval_until_stopped() {
        let mock = MockSource::new();
        mock.set_fallback(Ok(pair_body("0.5")));
        let ticker = ticker_for(&mock, RetryPolicy::default());

        ticker.start();
        ticker.start();
        sleep(Duration::from_secs(31)).await;
        assert_eq!(mock.call_count(), 3);
        assert!(ticker.is_running());

        ticker.stop();
        sleep(Duration::from_secs(60)).await;
        assert_eq!(mock.call_count(), 3);
        assert!(!ticker.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_in_flight_retries() {
        let mock = MockSource::new();
        mock.set_fallback(Err(FetchError::transport("Request timeout")));
        let ticker = ticker_for(&mock, RetryPolicy::default());

        ticker.start();
        sleep(Duration::from_millis(500)).await;
        assert_eq!(mock.call_count(), 1);

        drop(ticker);
        sleep(Duration::from_secs(30)).await;
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_waits_for_polled_cycle() {
        let mock = MockSource::new();
        mock.set_fallback(Err(FetchError::transport("Request timeout")));
        let ticker = ticker_for(&mock, RetryPolicy::default());

        // Polled cycle attempts at 0s, 1s, 3s, 7s
        ticker.start();
        sleep(Duration::from_millis(500)).await;

        let observe = async {
            sleep(Duration::from_millis(6_800)).await;
            (mock.call_count(), ticker.state().is_loading)
        };
        let (refreshed, (calls_at_7_3s, loading_at_7_3s)) =
            tokio::join!(ticker.refresh_now(), observe);

        // The refresh only starts once the polled cycle gave up at 7s
        assert_eq!(calls_at_7_3s, 5);
        assert!(loading_at_7_3s);

        assert!(refreshed.is_err());
        assert_eq!(mock.call_count(), 8);
        assert!(!ticker.state().is_loading);

        let times = mock.call_times();
        assert!(times[4] - times[0] >= Duration::from_secs(7));
    }

    #[tokio::test]
    async fn test_health_check_transitions() {
        let mock = MockSource::new();
        mock.push(Ok(pair_body("0.5")));
        mock.push(Err(FetchError::transport("Network error: connection refused")));
        let ticker = ticker_for(&mock, RetryPolicy::no_retry());

        assert_eq!(ticker.health_check().await.status, HealthStatus::Unhealthy);

        ticker.refresh_now().await.unwrap();
        let health = ticker.health_check().await;
        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.details["pair_id"], "abc");

        let _ = ticker.refresh_now().await;
        assert_eq!(ticker.health_check().await.status, HealthStatus::Degraded);
    }
}
