//! Upstream job listings client.
//!
//! One GET per `/jobs` request, no retries, no caching. The response is handed back as
//! loosely-typed JSON; per-record validation happens in `jobs::models::RawListing`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::USER_AGENT, Client};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Prefix for job ids built from this provider's records.
pub const SOURCE: &str = "remoteok";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {status}")]
    Status { status: u16 },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Expected a JSON array, got {0}")]
    UnexpectedShape(&'static str),
}

/// Source of raw listing records. Carried in `AppState` as `Arc<dyn JobSource>`.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch_listings(&self) -> Result<Vec<Value>, UpstreamError>;
}

/// RemoteOK public API client.
#[derive(Clone)]
pub struct RemoteOkClient {
    client: Client,
    url: String,
    user_agent: String,
}

impl RemoteOkClient {
    pub fn new(url: String, user_agent: String, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url,
            user_agent,
        })
    }
}

#[async_trait]
impl JobSource for RemoteOkClient {
    async fn fetch_listings(&self) -> Result<Vec<Value>, UpstreamError> {
        let response = self
            .client
            .get(&self.url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let listings = match serde_json::from_str::<Value>(&body)? {
            Value::Array(items) => items,
            other => return Err(UpstreamError::UnexpectedShape(json_kind(&other))),
        };

        debug!("Fetched {} raw listings from {}", listings.len(), self.url);
        Ok(listings)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, http::StatusCode, routing::get, Router};
    use serde_json::json;

    /// Serves `router` on an ephemeral local port and returns its base URL.
    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    fn client(url: String) -> RemoteOkClient {
        RemoteOkClient::new(url, "jobbot/1.0".to_string(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_array_as_is() {
        let url = spawn_upstream(Router::new().route(
            "/api",
            get(|| async { axum::Json(json!([{"legal": "notice"}, {"id": 1, "position": "Tech"}])) }),
        ))
        .await;

        let listings = client(url).fetch_listings().await.unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[1]["position"], "Tech");
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent() {
        let url = spawn_upstream(Router::new().route(
            "/api",
            get(|headers: HeaderMap| async move {
                let ua = headers
                    .get(axum::http::header::USER_AGENT)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                axum::Json(json!([{ "id": 1, "ua": ua }]))
            }),
        ))
        .await;

        let listings = client(url).fetch_listings().await.unwrap();
        assert_eq!(listings[0]["ua"], "jobbot/1.0");
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let url = spawn_upstream(Router::new().route(
            "/api",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        ))
        .await;

        let err = client(url).fetch_listings().await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status { status: 503 }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_malformed_json() {
        let url = spawn_upstream(Router::new().route("/api", get(|| async { "[{oops" }))).await;

        let err = client(url).fetch_listings().await.unwrap_err();
        assert!(matches!(err, UpstreamError::Parse(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_non_array_body() {
        let url = spawn_upstream(Router::new().route(
            "/api",
            get(|| async { axum::Json(json!({"jobs": []})) }),
        ))
        .await;

        let err = client(url).fetch_listings().await.unwrap_err();
        assert!(
            matches!(err, UpstreamError::UnexpectedShape("an object")),
            "got {err:?}"
        );
    }
}
