//! Quote Card Client
//!
//! A headless front end for the quote card service. It loads HTML components
//! (`<template>` fragments) on demand, shows a loading view while the quote API
//! works, and swaps in the generated card or surfaces the error.
//!
//! # Features
//!
//! - **Template Loader**: fetches components once and caches them per path
//! - **View Renderer**: full-replace rendering into an injected container
//! - **Generate Controller**: the submit → loader → API → card|error flow
//! - **Async session** (`http` feature): a worker-thread backed async facade
//!
//! # Example
//!
//! ```no_run
//! use quotecard::{ClientConfig, SubmitEvent, StderrNotifier};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig {
//!     base_url: "http://127.0.0.1:5001".to_string(),
//!     ..Default::default()
//! };
//!
//! let mut controller = quotecard::new_controller(&config, StderrNotifier)?;
//! controller.topic_input().set_value("  cats  ");
//! let state = controller.handle_submit(&mut SubmitEvent::new(quotecard::GENERATE_FORM_ID));
//! println!("{:?}", state);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

pub mod error;
pub use error::{Error, Result};

pub mod controller;
pub mod dom;
pub mod fetch;
pub mod template;
pub mod view;

// Async-friendly session API (worker-thread backed)
#[cfg(feature = "http")]
pub mod async_api;

pub use controller::{
    FlowState, FlowStateHandle, GenerateController, Notifier, RecordingNotifier, StderrNotifier,
    SubmitEvent, TopicInput,
};
pub use fetch::{FetchResponse, Fetcher, RequestAction, RequestInfo};
pub use template::{Template, TemplateCache, TemplateLoader};
pub use view::{ViewContainer, ViewKind, ViewRenderer};

#[cfg(feature = "http")]
pub use async_api::QuoteSession;
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;

/// Identifier of the region the views are rendered into
pub const CARD_CONTAINER_ID: &str = "card-container";
/// Identifier of the generate form
pub const GENERATE_FORM_ID: &str = "generate-form";
/// Identifier of the topic text input
pub const TOPIC_INPUT_ID: &str = "topic-input";

/// Quote API path
pub const QUOTE_API_PATH: &str = "/api/quote";
/// Loading view component
pub const LOADER_COMPONENT: &str = "/components/Loader.html";
/// Result card component
pub const QUOTE_CARD_COMPONENT: &str = "/components/QuoteCard.html";
/// Accessible description set on the generated image
pub const DEFAULT_IMAGE_ALT: &str = "Generated quote";

/// Paths of the components the renderer uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentPaths {
    pub loader: String,
    pub quote_card: String,
}

impl Default for ComponentPaths {
    fn default() -> Self {
        Self {
            loader: LOADER_COMPONENT.to_string(),
            quote_card: QUOTE_CARD_COMPONENT.to_string(),
        }
    }
}

/// Configuration for the quote card client
///
/// The defaults target a backend running locally on its standard port:
/// - `base_url` is `http://127.0.0.1:5001`
/// - component and API paths match the paths the backend serves
///
/// # Examples
///
/// ```
/// let cfg = quotecard::ClientConfig::default();
/// assert!(cfg.user_agent.contains("quotecard"));
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin that page-relative paths resolve against
    pub base_url: String,
    /// User agent string to send with requests
    pub user_agent: String,
    /// Timeout for each request in milliseconds
    pub timeout_ms: u64,
    /// Custom HTTP headers
    pub headers: HashMap<String, String>,
    /// Path of the quote endpoint
    pub api_path: String,
    /// Component paths
    pub components: ComponentPaths,
    /// Alt text set on the generated image
    pub image_alt: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5001".to_string(),
            user_agent: format!("quotecard/{}", env!("CARGO_PKG_VERSION")),
            timeout_ms: 30000,
            headers: HashMap::new(),
            api_path: QUOTE_API_PATH.to_string(),
            components: ComponentPaths::default(),
            image_alt: DEFAULT_IMAGE_ALT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Check the configuration before any client is built
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::ConfigError(format!("base_url {:?}: {}", self.base_url, e)))?;
        if self.timeout_ms == 0 {
            return Err(Error::ConfigError("timeout_ms must be greater than zero".into()));
        }
        if !self.api_path.starts_with('/') {
            return Err(Error::ConfigError(format!(
                "api_path must be absolute, got {:?}",
                self.api_path
            )));
        }
        Ok(())
    }
}

/// Build a controller wired to the default page handles and an HTTP fetcher
#[cfg(feature = "http")]
pub fn new_controller<N>(config: &ClientConfig, notifier: N) -> Result<GenerateController>
where
    N: Notifier + 'static,
{
    let fetcher = std::sync::Arc::new(HttpFetcher::new(config)?);
    Ok(GenerateController::with_fetcher(
        config,
        fetcher,
        ViewContainer::new(CARD_CONTAINER_ID),
        TopicInput::new(TOPIC_INPUT_ID),
        Box::new(notifier),
    ))
}
