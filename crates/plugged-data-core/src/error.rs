use std::fmt;

use serde::Serialize;

/// Errors raised inside the client.
///
/// Only configuration errors cross the public boundary directly; everything
/// else is folded into an [`ErrorInfo`] inside a response envelope.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Local store error: {0}")]
    Store(String),
}

impl ClientError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        Self::Store(e.to_string())
    }
}

/// Category of a failure reported in a response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Network unreachable, connection reset, body read aborted.
    Transport,
    /// The remote API answered with a non-2xx status.
    UpstreamStatus,
    /// Authenticated, but not allowed to use the dashboard.
    Authorization,
    /// A payload or response could not be (de)serialized.
    Serialization,
    /// The request was refused before it was sent.
    InvalidRequest,
    /// Local durable state could not be read or written.
    Store,
}

/// Human-readable error carried by every response envelope.
///
/// UI code renders `message` directly, so it never contains the API key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            code: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(ErrorKind::UpstreamStatus, message)
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Replace every occurrence of `secret` in the message.
    pub fn redact(mut self, secret: &str) -> Self {
        if !secret.is_empty() && self.message.contains(secret) {
            self.message = self.message.replace(secret, "[redacted]");
        }
        self
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ErrorInfo {}

impl From<ClientError> for ErrorInfo {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) => Self::transport(e.to_string()),
            ClientError::Serialization(msg) => Self::serialization(msg),
            ClientError::Config(msg) => Self::invalid_request(msg),
            ClientError::Store(msg) => Self::new(ErrorKind::Store, msg),
        }
    }
}
