//! HTTP client for the outbreak feed.
//!
//! The client fetches a JSON array of outbreak records over HTTP,
//! tolerating both a bare array and an enveloped `{"outbreaks": [...]}`
//! response shape. Transient failures are retried with a short backoff.

use crate::models::OutbreakRecord;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from the outbreak feed client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or timed out.
    #[error("request to outbreak feed failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The feed answered with a non-success status.
    #[error("outbreak feed returned HTTP {status} for {url}")]
    Status {
        /// HTTP status code returned.
        status: u16,
        /// URL that was requested.
        url: String,
    },

    /// The response body was not a recognized outbreak payload.
    #[error("failed to decode outbreak feed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether retrying could plausibly succeed.
    ///
    /// Request errors (connect failures, timeouts) and 5xx statuses are
    /// transient; 4xx statuses and decode failures won't heal on retry.
    pub fn is_retriable(&self) -> bool {
        match self {
            ApiError::Request(_) => true,
            ApiError::Status { status, .. } => *status >= 500,
            ApiError::Decode(_) => false,
        }
    }
}

/// Configuration for the outbreak feed client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the feed (e.g. `https://api.example.org`).
    pub base_url: String,
    /// Endpoint path for the outbreak list.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Number of retries on transient failure.
    pub retries: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            endpoint: "/api/outbreaks".to_string(),
            timeout_seconds: 30,
            retries: 3,
        }
    }
}

impl ApiConfig {
    /// Full URL of the outbreak list endpoint.
    pub fn outbreaks_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        )
    }
}

/// Response shapes the feed is known to produce.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedResponse {
    Records(Vec<OutbreakRecord>),
    Envelope {
        #[serde(alias = "data")]
        outbreaks: Vec<OutbreakRecord>,
    },
}

/// Parse a feed response body into outbreak records.
pub fn parse_records(body: &str) -> Result<Vec<OutbreakRecord>, ApiError> {
    let response: FeedResponse = serde_json::from_str(body)?;
    Ok(match response {
        FeedResponse::Records(records) => records,
        FeedResponse::Envelope { outbreaks } => outbreaks,
    })
}

/// Client for the remote outbreak feed.
pub struct OutbreakClient {
    config: ApiConfig,
    http_client: reqwest::Client,
}

impl OutbreakClient {
    /// Create a new client with the configured timeout.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Fetch the outbreak list, retrying transient failures.
    ///
    /// A request error or 5xx status is retried up to the configured
    /// count with a short linear backoff; 4xx statuses fail immediately.
    pub async fn fetch_outbreaks(&self) -> Result<Vec<OutbreakRecord>, ApiError> {
        let url = self.config.outbreaks_url();
        let mut last_error: Option<ApiError> = None;

        for attempt in 0..=self.config.retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(500 * attempt as u64);
                debug!("Retrying in {:?} (attempt {})", backoff, attempt + 1);
                tokio::time::sleep(backoff).await;
            }

            match self.try_fetch(&url).await {
                Ok(records) => {
                    info!("Fetched {} outbreak records from {}", records.len(), url);
                    return Ok(records);
                }
                Err(e) if !e.is_retriable() => {
                    return Err(e);
                }
                Err(e) => {
                    warn!("Fetch attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.expect("at least one fetch attempt was made"))
    }

    async fn try_fetch(&self, url: &str) -> Result<Vec<OutbreakRecord>, ApiError> {
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        parse_records(&body)
    }
}

/// Load outbreak records from a local JSON fixture.
///
/// Accepts the same payload shapes as the remote feed.
pub fn load_fixture(path: &Path) -> Result<Vec<OutbreakRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixture: {}", path.display()))?;

    let records = parse_records(&content)
        .with_context(|| format!("Failed to parse fixture: {}", path.display()))?;

    info!(
        "Loaded {} outbreak records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    #[test]
    fn test_parse_bare_array() {
        let body = r#"[
            {"disease": "Dengue", "country": "India", "outbreak_count": 100, "risk_level": "moderate"},
            {"disease": "Dengue", "country": "Kenya", "cases": 20, "severity": "low"}
        ]"#;

        let records = parse_records(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].outbreak_count, 100);
        assert_eq!(records[0].risk_level, Severity::Moderate);
        assert_eq!(records[1].outbreak_count, 20);
    }

    #[test]
    fn test_parse_envelope() {
        let body = r#"{"outbreaks": [{"disease": "Cholera", "country": "Haiti", "cases": 7}]}"#;
        let records = parse_records(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].disease, "Cholera");

        let body = r#"{"data": [{"disease": "Cholera", "country": "Haiti"}]}"#;
        let records = parse_records(body).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_tolerates_null_fields() {
        // One record with explicit nulls must not abort the whole feed.
        let body = r#"[
            {"disease": "Dengue", "country": "India", "cases": null, "risk_level": null},
            {"disease": "Cholera", "country": "Haiti", "cases": 7, "risk_level": "high"}
        ]"#;

        let records = parse_records(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].outbreak_count, 0);
        assert_eq!(records[0].risk_level, Severity::Unknown);
        assert_eq!(records[1].outbreak_count, 7);
        assert_eq!(records[1].risk_level, Severity::High);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_records("not json").is_err());
        assert!(parse_records(r#"{"unexpected": true}"#).is_err());
    }

    #[test]
    fn test_outbreaks_url_joins_cleanly() {
        let config = ApiConfig {
            base_url: "https://api.example.org/".to_string(),
            endpoint: "/api/outbreaks".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.outbreaks_url(),
            "https://api.example.org/api/outbreaks"
        );
    }

    #[test]
    fn test_load_fixture_from_repo() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/outbreaks.json");
        let records = load_fixture(&path).unwrap();
        assert!(!records.is_empty());
    }

    #[test]
    fn test_error_classification() {
        let server_error = ApiError::Status {
            status: 500,
            url: "http://example.org".to_string(),
        };
        assert!(server_error.is_retriable());

        let unavailable = ApiError::Status {
            status: 503,
            url: "http://example.org".to_string(),
        };
        assert!(unavailable.is_retriable());

        let not_found = ApiError::Status {
            status: 404,
            url: "http://example.org".to_string(),
        };
        assert!(!not_found.is_retriable());

        let decode = parse_records("not json").unwrap_err();
        assert!(!decode.is_retriable());

        // A request that can't even be built carries a reqwest error.
        let request = ApiError::Request(
            reqwest::Client::new()
                .get("not-a-url")
                .build()
                .unwrap_err(),
        );
        assert!(request.is_retriable());
    }

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        )
    }

    /// Serve one canned response per accepted connection, counting hits.
    async fn serve_responses(
        listener: tokio::net::TcpListener,
        responses: Vec<String>,
        hits: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    ) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        for response in responses {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };
            hits.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response.as_bytes()).await;
        }
    }

    async fn stub_client(retries: usize, responses: Vec<String>) -> (OutbreakClient, std::sync::Arc<std::sync::atomic::AtomicUsize>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        tokio::spawn(serve_responses(listener, responses, hits.clone()));

        let config = ApiConfig {
            base_url: format!("http://{}", addr),
            endpoint: "/api/outbreaks".to_string(),
            timeout_seconds: 5,
            retries,
        };
        (OutbreakClient::new(config).unwrap(), hits)
    }

    #[tokio::test]
    async fn test_fetch_retries_transient_status() {
        let body = r#"[{"disease": "Dengue", "country": "India", "cases": 5}]"#;
        let responses = vec![
            http_response("500 Internal Server Error", ""),
            http_response("200 OK", body),
        ];
        let (client, hits) = stub_client(2, responses).await;

        let records = client.fetch_outbreaks().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].disease, "Dengue");
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_fails_fast_on_client_error() {
        // Retries are configured but a 404 must not consume them.
        let responses = vec![
            http_response("404 Not Found", ""),
            http_response("404 Not Found", ""),
        ];
        let (client, hits) = stub_client(3, responses).await;

        let err = client.fetch_outbreaks().await.unwrap_err();
        match err {
            ApiError::Status { status, .. } => assert_eq!(status, 404),
            other => panic!("expected status error, got: {}", other),
        }
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_exhausts_retries() {
        let responses = vec![
            http_response("500 Internal Server Error", ""),
            http_response("500 Internal Server Error", ""),
        ];
        let (client, hits) = stub_client(1, responses).await;

        let err = client.fetch_outbreaks().await.unwrap_err();
        match err {
            ApiError::Status { status, .. } => assert_eq!(status, 500),
            other => panic!("expected status error, got: {}", other),
        }
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
