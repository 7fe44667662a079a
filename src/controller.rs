//! The generate flow: form submission → loader view → quote API → card or error.

use std::sync::{Arc, Mutex};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use serde_json::Value;

use crate::fetch::Fetcher;
use crate::template::TemplateLoader;
use crate::view::{ViewContainer, ViewRenderer};
use crate::{ClientConfig, Error, Result};

// Characters left unescaped by a URI component encoder
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Presents a failure message to the user
pub trait Notifier: Send {
    fn notify(&self, message: &str);
}

/// Writes notifications to stderr
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Keeps every notification; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
    }
}

/// Handle to the topic text input
#[derive(Debug, Clone)]
pub struct TopicInput {
    id: String,
    value: Arc<Mutex<String>>,
}

impl TopicInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: Arc::new(Mutex::new(String::new())),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn value(&self) -> String {
        self.value.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_value(&self, value: impl Into<String>) {
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = value.into();
    }
}

/// A form submission
#[derive(Debug, Clone)]
pub struct SubmitEvent {
    form_id: String,
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new(form_id: impl Into<String>) -> Self {
        Self {
            form_id: form_id.into(),
            default_prevented: false,
        }
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    /// Suppress the default navigation of the submission
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Where the generate flow stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    Loading,
    Success { img_url: String },
    Error { message: String },
}

/// Shared view of a controller's `FlowState`; clones observe the same flow
#[derive(Debug, Clone, Default)]
pub struct FlowStateHandle {
    inner: Arc<Mutex<FlowState>>,
}

impl FlowStateHandle {
    pub fn get(&self) -> FlowState {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set(&self, state: FlowState) {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }
}

/// Body returned by the quote API.
///
/// Fields stay loosely typed so a payload-level `error` is reported even when
/// the other fields are malformed.
#[derive(Debug, Clone, Deserialize)]
pub struct QuotePayload {
    #[serde(default)]
    pub img_url: Option<Value>,
    #[serde(default)]
    pub quote: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl QuotePayload {
    /// The image URL, when present as a string
    pub fn img_url(&self) -> Option<&str> {
        self.img_url.as_ref().and_then(Value::as_str)
    }

    /// The `error` field as a message, when it is set to a truthy value
    pub fn error_message(&self) -> Option<String> {
        match &self.error {
            Some(v) if is_truthy(v) => Some(match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
            _ => None,
        }
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Build the request path for `topic`; the query is omitted for an empty topic
pub fn quote_request_path(api_path: &str, topic: &str) -> String {
    if topic.is_empty() {
        api_path.to_string()
    } else {
        format!("{}?topic={}", api_path, utf8_percent_encode(topic, URI_COMPONENT))
    }
}

/// Drives the generate flow and owns the current `FlowState`
pub struct GenerateController {
    renderer: ViewRenderer,
    fetcher: Arc<dyn Fetcher>,
    input: TopicInput,
    notifier: Box<dyn Notifier>,
    api_path: String,
    state: FlowStateHandle,
}

impl GenerateController {
    pub fn new(
        renderer: ViewRenderer,
        fetcher: Arc<dyn Fetcher>,
        input: TopicInput,
        notifier: Box<dyn Notifier>,
        api_path: impl Into<String>,
    ) -> Self {
        Self {
            renderer,
            fetcher,
            input,
            notifier,
            api_path: api_path.into(),
            state: FlowStateHandle::default(),
        }
    }

    /// Wire a renderer and controller over one shared fetcher
    pub fn with_fetcher(
        config: &ClientConfig,
        fetcher: Arc<dyn Fetcher>,
        container: ViewContainer,
        input: TopicInput,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let renderer = ViewRenderer::new(
            TemplateLoader::new(fetcher.clone()),
            container,
            config.components.clone(),
            config.image_alt.clone(),
        );
        Self::new(renderer, fetcher, input, notifier, config.api_path.clone())
    }

    pub fn state(&self) -> FlowState {
        self.state.get()
    }

    /// Handle for observing the flow from outside, e.g. while a request is in flight
    pub fn state_handle(&self) -> FlowStateHandle {
        self.state.clone()
    }

    pub fn container(&self) -> &ViewContainer {
        self.renderer.container()
    }

    pub fn topic_input(&self) -> &TopicInput {
        &self.input
    }

    pub fn renderer(&self) -> &ViewRenderer {
        &self.renderer
    }

    /// Fetch the loader and quote card components ahead of the first submission
    pub fn preload_components(&mut self) -> Result<()> {
        self.renderer.preload()
    }

    /// Handle a form submission. Never fails: errors are reported through the
    /// notifier and leave the container empty.
    pub fn handle_submit(&mut self, event: &mut SubmitEvent) -> FlowState {
        event.prevent_default();
        let topic = self.input.value().trim().to_string();

        self.state.set(FlowState::Loading);
        let state = match self.generate(&topic) {
            Ok(img_url) => {
                log::info!("quote generated: {}", img_url);
                FlowState::Success { img_url }
            }
            Err(e) => {
                let message = e.to_string();
                if e.is_template_error() {
                    log::warn!("component unavailable: {}", message);
                } else {
                    log::warn!("generate failed: {}", message);
                }
                self.notifier.notify(&message);
                self.renderer.clear();
                FlowState::Error { message }
            }
        };
        self.state.set(state.clone());
        state
    }

    fn generate(&mut self, topic: &str) -> Result<String> {
        self.renderer.render_loader()?;
        let img_url = self.request_quote(topic)?;
        self.renderer.render_quote(&img_url)?;
        Ok(img_url)
    }

    fn request_quote(&self, topic: &str) -> Result<String> {
        let path = quote_request_path(&self.api_path, topic);
        log::debug!("requesting quote: {}", path);

        let resp = self.fetcher.get(&path)?;
        if !resp.ok() {
            return Err(Error::ApiError(resp.body));
        }

        let payload: QuotePayload = serde_json::from_str(&resp.body)
            .map_err(|e| Error::ApiError(format!("Invalid quote response: {}", e)))?;
        if let Some(message) = payload.error_message() {
            return Err(Error::ApiError(message));
        }

        payload
            .img_url()
            .map(str::to_string)
            .ok_or_else(|| Error::ApiError("Quote response has no img_url".into()))
    }
}
