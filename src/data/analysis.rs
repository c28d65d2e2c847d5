//! Remote analysis endpoint client
//!
//! Issues the single outbound request that produces a stock analysis report.
//! The remote operation is expensive and user-supervised, so there is exactly
//! one attempt per request: no retry, no backoff, no timeout beyond what the
//! transport itself enforces.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Default analysis endpoint, used when no override is configured
const DEFAULT_ENDPOINT: &str = "https://api.tickerdesk.io/analyze";

/// Environment variable overriding the analysis endpoint URL
pub const ENDPOINT_ENV_VAR: &str = "TICKERDESK_API_URL";

/// Errors that can occur when requesting an analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// HTTP request failed at the transport level
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The endpoint returned a non-success status
    #[error("analysis failed")]
    AnalysisFailed,

    /// Failed to parse the JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Request body sent to the analysis endpoint
#[derive(Debug, Serialize)]
struct AnalysisRequest<'a> {
    ticker: &'a str,
}

/// Response returned by the analysis endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisResponse {
    /// Ticker the report was produced for
    pub ticker: String,
    /// Markdown report body
    pub report: String,
    /// Locator for the generated PDF artifact
    pub pdf_url: String,
    /// Locator for the open-interest chart image, when one was produced
    #[serde(default)]
    pub oi_chart_url: Option<String>,
}

/// Client for the remote analysis service
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    client: Client,
    endpoint: String,
}

impl Default for AnalysisClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisClient {
    /// Creates a client using the configured endpoint
    ///
    /// The endpoint is taken from the `TICKERDESK_API_URL` environment
    /// variable when set, falling back to the hardcoded default.
    pub fn new() -> Self {
        let endpoint = env::var(ENDPOINT_ENV_VAR).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::with_endpoint(endpoint)
    }

    /// Creates a client pointed at a specific endpoint URL
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Requests a fresh analysis for the given ticker
    ///
    /// Sends one HTTP POST with the ticker as JSON payload and waits for the
    /// response. A non-success status yields `AnalysisError::AnalysisFailed`
    /// with no further detail; the caller surfaces it as a generic retryable
    /// error.
    ///
    /// # Arguments
    /// * `ticker` - Normalized ticker to analyze
    ///
    /// # Returns
    /// * `Ok(AnalysisResponse)` - The decoded report
    /// * `Err(AnalysisError)` - If the request, status, or parsing fails
    pub async fn fetch_analysis(&self, ticker: &str) -> Result<AnalysisResponse, AnalysisError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnalysisRequest { ticker })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AnalysisError::AnalysisFailed);
        }

        let text = response.text().await?;
        let decoded: AnalysisResponse = serde_json::from_str(&text)?;
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_analysis_decodes_success_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/analyze")
            .match_body(mockito::Matcher::Json(serde_json::json!({"ticker": "TSLA"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r##"{"ticker":"TSLA","report":"# TSLA\nLooks volatile.","pdf_url":"http://x/tsla.pdf","oi_chart_url":"http://x/tsla.png"}"##,
            )
            .create_async()
            .await;

        let client = AnalysisClient::with_endpoint(format!("{}/analyze", server.url()));
        let response = client
            .fetch_analysis("TSLA")
            .await
            .expect("Fetch should succeed");

        assert_eq!(response.ticker, "TSLA");
        assert!(response.report.starts_with("# TSLA"));
        assert_eq!(response.pdf_url, "http://x/tsla.pdf");
        assert_eq!(response.oi_chart_url.as_deref(), Some("http://x/tsla.png"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_analysis_tolerates_missing_chart_url() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/analyze")
            .with_status(200)
            .with_body(r##"{"ticker":"AAPL","report":"# AAPL","pdf_url":"http://x/aapl.pdf"}"##)
            .create_async()
            .await;

        let client = AnalysisClient::with_endpoint(format!("{}/analyze", server.url()));
        let response = client
            .fetch_analysis("AAPL")
            .await
            .expect("Fetch should succeed");

        assert!(response.oi_chart_url.is_none());
    }

    #[tokio::test]
    async fn test_fetch_analysis_fails_on_server_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/analyze")
            .with_status(500)
            .create_async()
            .await;

        let client = AnalysisClient::with_endpoint(format!("{}/analyze", server.url()));
        let result = client.fetch_analysis("ZZZZ").await;

        assert!(matches!(result, Err(AnalysisError::AnalysisFailed)));
        // Exactly one attempt, no retry
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_analysis_fails_on_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/analyze")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = AnalysisClient::with_endpoint(format!("{}/analyze", server.url()));
        let result = client.fetch_analysis("TSLA").await;

        assert!(matches!(result, Err(AnalysisError::ParseError(_))));
    }
}
