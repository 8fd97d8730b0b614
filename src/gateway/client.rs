use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::error::{Result, ToolError};
use crate::gateway::decode::decode;

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Path and query of one Snapshotter Core API call, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    segments: Vec<String>,
    trailing_slash: bool,
    query: Vec<(&'static str, String)>,
}

impl Endpoint {
    pub fn new(root: &str) -> Self {
        Endpoint {
            segments: vec![root.to_string()],
            trailing_slash: false,
            query: Vec::new(),
        }
    }

    pub fn segment(mut self, segment: impl ToString) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    pub fn segment_opt<T: ToString>(self, segment: Option<T>) -> Self {
        match segment {
            Some(segment) => self.segment(segment),
            None => self,
        }
    }

    pub fn with_trailing_slash(mut self) -> Self {
        self.trailing_slash = true;
        self
    }

    pub fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    /// Relative path for logging, e.g. `/pool/0xabc/metadata`.
    pub fn path(&self) -> String {
        let mut path = format!("/{}", self.segments.join("/"));
        if self.trailing_slash {
            path.push('/');
        }
        path
    }
}

/// Shared client for the Snapshotter Core API.
///
/// Cloning is cheap: all clones share one connection pool, built once at startup.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    request_timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config.api_base_url.parse::<Url>().map_err(|e| {
            ToolError::ConfigError(format!("Invalid API base URL {}: {}", config.api_base_url, e))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(ToolError::ConfigError(format!(
                "API base URL cannot carry a path: {}",
                config.api_base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("snapshotter-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ToolError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        debug!("Snapshotter API client ready: {}", base_url);

        Ok(ApiClient {
            inner: Arc::new(ApiClientInner {
                http,
                base_url,
                request_timeout: config.request_timeout,
            }),
        })
    }

    /// Resolve an endpoint against the base URL, percent-encoding each path segment.
    pub fn url_for(&self, endpoint: &Endpoint) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ToolError::ConfigError("API base URL cannot carry a path".to_string())
            })?;
            segments.pop_if_empty();
            segments.extend(endpoint.segments.iter());
            if endpoint.trailing_slash {
                segments.push("");
            }
        }

        if !endpoint.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(endpoint.query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        Ok(url)
    }

    /// Issue exactly one GET and decode the body into `T`.
    ///
    /// Dropping the returned future aborts the in-flight request.
    pub async fn fetch<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T> {
        let url = self.url_for(endpoint)?;
        debug!("GET {}", endpoint.path());

        let response = self
            .inner
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok().and_then(|text| upstream_message(&text));
            warn!(
                "Upstream returned {} for {}: {}",
                status.as_u16(),
                endpoint.path(),
                body.as_deref().unwrap_or("<empty>")
            );
            return Err(ToolError::UpstreamError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        decode(&body).map_err(|e| {
            warn!("Failed to decode response from {}: {}", endpoint.path(), e);
            e
        })
    }

    // Keep connection details in the log, not in the client-facing message.
    fn transport_error(&self, endpoint: &Endpoint, err: reqwest::Error) -> ToolError {
        warn!("Request to {} failed: {}", endpoint.path(), err);

        let timed_out = err.is_timeout();
        let message = if timed_out {
            format!(
                "request timed out after {}s",
                self.inner.request_timeout.as_secs_f64()
            )
        } else if err.is_connect() {
            "could not connect to the Snapshotter API".to_string()
        } else if err.is_body() || err.is_decode() {
            "connection dropped while reading the response".to_string()
        } else {
            "request to the Snapshotter API failed".to_string()
        };

        ToolError::TransportError { message, timed_out }
    }
}

/// Extract the upstream-provided error message: FastAPI `detail`, a `message`/`error` field,
/// or the trimmed text body.
fn upstream_message(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["detail", "message", "error"] {
            match value.get(key) {
                Some(serde_json::Value::String(s)) => return Some(truncate(s)),
                Some(serde_json::Value::Null) | None => {}
                Some(other) => return Some(truncate(&other.to_string())),
            }
        }
    }

    Some(truncate(trimmed))
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_ERROR_BODY_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{}...", cut)
    }
}
