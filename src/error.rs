//! Error types for the quote card client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading components or running a generate flow
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to initialize the client
    #[error("Client initialization failed: {0}")]
    InitializationError(String),

    /// Failed to fetch a component resource
    #[error("Failed to load component {0}")]
    LoadError(String),

    /// The fetched component has no `<template>` root
    #[error("No <template> found in {0}")]
    TemplateMissing(String),

    /// The quote API reported a failure. The message is shown to the user as-is.
    #[error("{0}")]
    ApiError(String),

    /// Failed to bind data into a rendered view
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Transport failure talking to the quote API
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for the errors raised by the template loader.
    pub fn is_template_error(&self) -> bool {
        matches!(self, Error::LoadError(_) | Error::TemplateMissing(_))
    }
}
