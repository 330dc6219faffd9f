//! HTTP client for the LAPIS aggregated endpoint.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::lapis::filter::LapisFilter;
use crate::observability::metrics;

/// Errors that can occur while querying LAPIS.
#[derive(Debug, Error)]
pub enum LapisError {
    /// Connection, timeout or body decoding failure.
    #[error("LAPIS request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// LAPIS answered with a non-success status.
    #[error("LAPIS returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Result type for LAPIS operations.
pub type LapisResult<T> = Result<T, LapisError>;

/// One row of an aggregated response: a count plus the grouping fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    pub count: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct AggregatedResponse {
    data: Vec<AggregatedRow>,
}

#[derive(Debug, Clone)]
pub struct LapisClient {
    client: reqwest::Client,
}

impl LapisClient {
    pub fn new(timeout: Duration) -> LapisResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Count sequences matching `filter`, grouped by `fields`.
    ///
    /// `organism` only labels logs and metrics.
    pub async fn aggregated(
        &self,
        organism: &str,
        lapis_url: &str,
        filter: &LapisFilter,
        fields: &[String],
    ) -> LapisResult<Vec<AggregatedRow>> {
        let start = Instant::now();
        let url = format!("{}/sample/aggregated", lapis_url.trim_end_matches('/'));

        let mut body = filter.clone().into_map();
        if !fields.is_empty() {
            body.insert(
                "fields".to_string(),
                Value::Array(fields.iter().cloned().map(Value::String).collect()),
            );
        }

        tracing::debug!(organism = %organism, url = %url, "Querying LAPIS");

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_lapis_request(organism, 0, start);
                tracing::warn!(organism = %organism, error = %e, "LAPIS unreachable");
                return Err(e.into());
            }
        };

        let status = response.status();
        metrics::record_lapis_request(organism, status.as_u16(), start);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(organism = %organism, status = %status, "LAPIS rejected request");
            return Err(LapisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AggregatedResponse = response.json().await?;
        Ok(parsed.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_keeps_grouping_fields() {
        let response: AggregatedResponse = serde_json::from_str(
            r#"{"data":[{"count":12,"date":"2024-01-01"},{"count":3,"date":null}],"info":{}}"#,
        )
        .unwrap();

        assert_eq!(response.data.len(), 2);
        assert_eq!(response.data[0].count, 12);
        assert_eq!(response.data[0].fields["date"], "2024-01-01");
        assert!(response.data[1].fields["date"].is_null());
    }

    #[test]
    fn test_error_display() {
        let err = LapisError::Status {
            status: 400,
            body: "bad filter".into(),
        };
        assert_eq!(err.to_string(), "LAPIS returned status 400: bad filter");
    }
}
