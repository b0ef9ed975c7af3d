//! Source abstraction for fetching raw pair responses

use crate::error::FetchError;
use async_trait::async_trait;

/// Trait for pair data sources
///
/// One call is exactly one outbound attempt. Retrying, validation and
/// caching happen in [`crate::client::DexScreenerClient`], so a source only
/// has to turn a URL into a response body or a transport error.
#[async_trait]
pub trait PairDataSource: Send + Sync {
    /// Performs a single GET and returns the body of a 2xx response
    ///
    /// # Arguments
    /// * `url` - Fully built endpoint URL
    ///
    /// # Returns
    /// The raw response body, or [`FetchError::Transport`] for non-2xx
    /// statuses, network failures and timeouts
    async fn fetch_body(&self, url: &str) -> Result<String, FetchError>;

    /// Returns the name of this source
    fn source_name(&self) -> &'static str;
}
