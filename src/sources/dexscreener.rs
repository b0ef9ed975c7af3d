//! DexScreener HTTP source implementation

use crate::{
    constants::{REQUEST_TIMEOUT_SECS, USER_AGENT},
    error::FetchError,
    source::PairDataSource,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use std::time::Duration;

/// DexScreener source backed by a reqwest client
pub struct DexScreenerSource {
    client: Client,
}

impl DexScreenerSource {
    /// Creates a new DexScreener source
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    /// Creates a source with a custom per-attempt timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PairDataSource for DexScreenerSource {
    async fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(url = url, "Fetching pair from DexScreener");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown Status"),
            ));
        }

        let body = response.text().await?;

        tracing::debug!(bytes = body.len(), "Received DexScreener response");

        Ok(body)
    }

    fn source_name(&self) -> &'static str {
        "dexscreener"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves one canned HTTP response on 127.0.0.1 and hands back the raw
    /// request head it received
    async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/pairs/solana/abc", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\n\
             content-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_lowercase()
        });

        (url, handle)
    }

    #[tokio::test]
    async fn test_success_passes_body_through_and_sends_headers() {
        let body = r#"{"schemaVersion":"1.0.0","pairs":[]}"#;
        let (url, server) = serve_once("200 OK", body).await;
        let source = DexScreenerSource::new().unwrap();

        let fetched = source.fetch_body(&url).await.unwrap();
        assert_eq!(fetched, body);

        let request = server.await.unwrap();
        assert!(request.starts_with("get /pairs/solana/abc http/1.1"));
        assert!(request.contains("accept: application/json"));
        assert!(request.contains("user-agent: yellowpup/1.0"));
    }

    #[tokio::test]
    async fn test_non_success_status_maps_to_http_error() {
        let (url, server) = serve_once("503 Service Unavailable", "").await;
        let source = DexScreenerSource::new().unwrap();

        let err = source.fetch_body(&url).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
        assert!(err.is_retryable());

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_not_found_maps_to_http_error() {
        let (url, server) = serve_once("404 Not Found", r#"{"error":"not found"}"#).await;
        let source = DexScreenerSource::new().unwrap();

        let err = source.fetch_body(&url).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP 404: Not Found");

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_without_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/pairs/solana/abc", listener.local_addr().unwrap());
        drop(listener);

        let source = DexScreenerSource::new().unwrap();
        let err = source.fetch_body(&url).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.status(), None);
        assert!(err.to_string().starts_with("Network error: "), "{}", err);
    }
}
