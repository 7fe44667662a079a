//! Network seam used by the template loader and the generate controller.
//!
//! `Fetcher` abstracts a GET against the page origin. `HttpFetcher` is the
//! blocking `reqwest` implementation; it resolves paths against the configured
//! base URL and lets an `on_request` handler continue, fail or fulfill each
//! request before it reaches the network.

use crate::Result;
#[cfg(feature = "http")]
use crate::{ClientConfig, Error};

#[cfg(feature = "http")]
use reqwest::blocking::Client;
use std::collections::HashMap;
#[cfg(feature = "http")]
use std::sync::Arc;
#[cfg(feature = "http")]
use std::time::Duration;

/// A completed response: status code and body text
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues GET requests for page-relative paths such as `/api/quote`
pub trait Fetcher: Send + Sync {
    fn get(&self, path: &str) -> Result<FetchResponse>;
}

/// Information about an outgoing request, passed to `on_request` handlers
#[derive(Debug, Clone)]
pub struct RequestInfo {
    /// Path as requested by the caller
    pub path: String,
    /// Absolute URL after resolution against the base URL
    pub url: String,
    /// HTTP method
    pub method: String,
    /// Headers that will be sent
    pub headers: HashMap<String, String>,
}

/// Action to take when a request is observed by an `on_request` handler.
#[derive(Debug, Clone)]
pub enum RequestAction {
    /// Let the request proceed normally
    Continue,

    /// Fail the request with an error reason
    Fail { error_reason: String },

    /// Fulfill the request with a custom response
    Fulfill {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },
}

#[cfg(feature = "http")]
type OnRequestHandler = Arc<dyn Fn(&RequestInfo) -> RequestAction + Send + Sync>;

/// Blocking HTTP fetcher backed by `reqwest`
#[cfg(feature = "http")]
pub struct HttpFetcher {
    client: Client,
    base: url::Url,
    user_agent: String,
    headers: HashMap<String, String>,
    on_request: Option<OnRequestHandler>,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let base = url::Url::parse(&config.base_url)
            .map_err(|e| Error::ConfigError(format!("Invalid base URL {}: {}", config.base_url, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base,
            user_agent: config.user_agent.clone(),
            headers: config.headers.clone(),
            on_request: None,
        })
    }

    /// Register a handler invoked before every request
    pub fn on_request<F>(&mut self, cb: F)
    where
        F: Fn(&RequestInfo) -> RequestAction + Send + Sync + 'static,
    {
        self.on_request = Some(Arc::new(cb));
    }

    /// Remove a previously registered handler
    pub fn clear_on_request(&mut self) {
        self.on_request = None;
    }

    /// Resolve a page-relative path against the base URL
    pub fn resolve(&self, path: &str) -> Result<url::Url> {
        self.base
            .join(path)
            .map_err(|e| Error::NetworkError(format!("Cannot resolve {}: {}", path, e)))
    }
}

#[cfg(feature = "http")]
impl Fetcher for HttpFetcher {
    fn get(&self, path: &str) -> Result<FetchResponse> {
        let url = self.resolve(path)?;

        if let Some(cb) = &self.on_request {
            let mut headers = self.headers.clone();
            headers.insert("User-Agent".to_string(), self.user_agent.clone());
            let info = RequestInfo {
                path: path.to_string(),
                url: url.to_string(),
                method: "GET".to_string(),
                headers,
            };
            match cb(&info) {
                RequestAction::Continue => {}
                RequestAction::Fail { error_reason } => {
                    log::debug!("request to {} failed by handler: {}", url, error_reason);
                    return Err(Error::NetworkError(error_reason));
                }
                RequestAction::Fulfill { status, body } => {
                    log::debug!("request to {} fulfilled by handler ({})", url, status);
                    return Ok(FetchResponse { status, body });
                }
            }
        }

        log::debug!("GET {}", url);
        let mut req = self
            .client
            .get(url.clone())
            .header("User-Agent", self.user_agent.clone());
        for (k, v) in &self.headers {
            req = req.header(k.as_str(), v.as_str());
        }

        let resp = req
            .send()
            .map_err(|e| Error::NetworkError(format!("Failed to fetch {}: {}", url, e)))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| Error::NetworkError(format!("Failed to read response body: {}", e)))?;

        Ok(FetchResponse { status, body })
    }
}
