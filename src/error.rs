//! Error types for Relatics web service operations

use thiserror::Error;

/// Result type alias for Relatics operations
pub type Result<T> = std::result::Result<T, RelaticsError>;

/// Errors that can occur while talking to the Relatics web services
#[derive(Error, Debug)]
pub enum RelaticsError {
    /// The endpoint URL (or the company name it is built from) is not usable
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Import payload was not a key-value mapping
    #[error("Invalid import data: {0}")]
    InvalidImportData(String),

    /// Login did not yield a session token
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// The service does not expose an operation with this name
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Payload length does not match the slots in the operation template
    #[error("Operation '{operation}' expects {expected} values, {supplied} supplied")]
    TemplateMismatch {
        operation: String,
        expected: usize,
        supplied: usize,
    },

    /// Operation template could not be extracted or is not well-formed
    #[error("Template error: {0}")]
    Template(String),

    /// Failed to write or read XML
    #[error("XML error: {0}")]
    Xml(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status and no SOAP fault
    #[error("Server returned status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Server answered with a SOAP fault
    #[error("SOAP fault {code}: {message}")]
    SoapFault { code: String, message: String },
}

impl RelaticsError {
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn xml(error: impl std::fmt::Display) -> Self {
        Self::Xml(error.to_string())
    }
}
