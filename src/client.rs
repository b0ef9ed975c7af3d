//! DexScreener pair client
//!
//! Composes a [`PairDataSource`] with retry, validation, projection, an
//! optional read-through cache and fetch metrics.

use crate::{
    cache::PairCache,
    constants::{CACHE_TTL_SECS, DEXSCREENER_API_URL, DEXSCREENER_PAIRS_ENDPOINT},
    error::FetchError,
    metrics::{MetricsCollector, SourceMetrics},
    projector,
    retry::{retry_with_backoff, RetryPolicy},
    source::PairDataSource,
    sources::DexScreenerSource,
    types::{MarketStats, TradingPair},
    validator,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Client for DexScreener pair stats
///
/// # Example
/// ```no_run
/// use pair_stats_sdk::{format, DexScreenerClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = DexScreenerClient::new()?;
/// let stats = client
///     .get_pair_stats("solana", "8sLbNZoA1cfnvMJLPfp98ZLAnFSYCFApfJKMbiXNLwxj")
///     .await?;
/// println!("Price: {}", format::format_price(&stats.price_usd));
/// println!("Liquidity: {}", format::format_number(stats.liquidity_usd));
/// # Ok(())
/// # }
/// ```
pub struct DexScreenerClient {
    source: Arc<dyn PairDataSource>,
    base_url: String,
    policy: RetryPolicy,
    cache: Option<PairCache>,
    metrics: MetricsCollector,
}

impl DexScreenerClient {
    /// Creates a client backed by the public DexScreener API
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self::with_source(Arc::new(DexScreenerSource::new()?)))
    }

    /// Creates a client with a custom source
    ///
    /// This is primarily for testing with mock sources.
    pub fn with_source(source: Arc<dyn PairDataSource>) -> Self {
        let metrics = MetricsCollector::new(source.source_name());

        Self {
            source,
            base_url: DEXSCREENER_API_URL.to_string(),
            policy: RetryPolicy::default(),
            cache: Some(PairCache::new(Duration::from_secs(CACHE_TTL_SECS))),
            metrics,
        }
    }

    /// Overrides the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the retry policy
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Serves successful fetches from memory for `ttl`
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = Some(PairCache::new(ttl));
        self
    }

    /// Disables the read-through cache
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    /// Builds the endpoint URL for a pair
    pub fn pair_url(&self, chain_id: &str, pair_id: &str) -> String {
        format!(
            "{}{}/{}/{}",
            self.base_url, DEXSCREENER_PAIRS_ENDPOINT, chain_id, pair_id
        )
    }

    /// Fetches and validates a pair
    ///
    /// # Arguments
    /// * `chain_id` - Chain identifier, e.g. `solana`
    /// * `pair_id` - Pair address on that chain
    ///
    /// # Returns
    /// The first pair of the response, or the error of the last attempt
    pub async fn fetch_pair(
        &self,
        chain_id: &str,
        pair_id: &str,
    ) -> Result<TradingPair, FetchError> {
        self.fetch_pair_with_cancel(chain_id, pair_id, &CancellationToken::new())
            .await
    }

    /// Fetches and validates a pair, giving up as soon as `cancel` fires
    pub async fn fetch_pair_with_cancel(
        &self,
        chain_id: &str,
        pair_id: &str,
        cancel: &CancellationToken,
    ) -> Result<TradingPair, FetchError> {
        if let Some(cache) = &self.cache {
            if let Some(pair) = cache.get(chain_id, pair_id).await {
                tracing::debug!(chain_id = chain_id, pair_id = pair_id, "Serving pair from cache");
                self.metrics.record_cache_hit().await;
                return Ok(pair);
            }
        }

        let url = self.pair_url(chain_id, pair_id);
        let start = Instant::now();

        let result = retry_with_backoff(&self.policy, cancel, |attempt| {
            let source = self.source.clone();
            let url = url.clone();
            async move {
                tracing::debug!(
                    attempt = attempt,
                    source = source.source_name(),
                    "Requesting pair"
                );
                source.fetch_body(&url).await
            }
        })
        .await
        .and_then(|body| validator::parse_body(&body));

        match &result {
            Err(FetchError::Cancelled) => {
                tracing::debug!(chain_id = chain_id, pair_id = pair_id, "Pair fetch cancelled");
            }
            Err(e) => {
                self.metrics.record_request(start.elapsed(), false).await;
                tracing::warn!(
                    chain_id = chain_id,
                    pair_id = pair_id,
                    kind = %e.kind(),
                    error = %e,
                    "Failed to fetch pair"
                );
            }
            Ok(pair) => {
                self.metrics.record_request(start.elapsed(), true).await;
                tracing::debug!(
                    pair = %pair.display_name(),
                    dex = %pair.dex_id,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Successfully fetched pair"
                );
                if let Some(cache) = &self.cache {
                    cache.insert(chain_id, pair_id, pair.clone()).await;
                }
            }
        }

        result
    }

    /// Fetches a pair and projects it into display-ready stats
    ///
    /// # Example
    /// ```no_run
    /// # use pair_stats_sdk::DexScreenerClient;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = DexScreenerClient::new()?;
    /// let stats = client.get_pair_stats("solana", "pair-address").await?;
    /// println!("Market cap: {}", stats.formatted().market_cap);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_pair_stats(
        &self,
        chain_id: &str,
        pair_id: &str,
    ) -> Result<MarketStats, FetchError> {
        self.get_pair_stats_with_cancel(chain_id, pair_id, &CancellationToken::new())
            .await
    }

    /// Cancellable variant of [`Self::get_pair_stats`]
    pub async fn get_pair_stats_with_cancel(
        &self,
        chain_id: &str,
        pair_id: &str,
        cancel: &CancellationToken,
    ) -> Result<MarketStats, FetchError> {
        let pair = self.fetch_pair_with_cancel(chain_id, pair_id, cancel).await?;
        Ok(projector::project(&pair))
    }

    /// Returns the name of the underlying source
    pub fn source_name(&self) -> &str {
        self.source.source_name()
    }

    /// Gets fetch metrics including latency percentiles and success rates
    pub async fn metrics(&self) -> SourceMetrics {
        self.metrics.get_metrics().await
    }
}
