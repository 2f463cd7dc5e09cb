//! Error types for the media-server client.
//!
//! # Design
//! Every failure of a call surfaces as one `ApiError`, whichever stage
//! produced it: parameter validation and path expansion (before any I/O), the
//! transport, a non-2xx status, JSON decoding, or writing a download to disk.
//! Nothing is retried or swallowed here.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::http::Headers;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `ApiClient` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required parameter had no value. Reported as HTTP 400 without sending.
    #[error("Missing the required parameter '{param}' when calling {operation}")]
    MissingParameter {
        operation: &'static str,
        param: &'static str,
    },

    /// The operation's path template and its path parameters do not match.
    #[error("invalid request path for {operation}: {source}")]
    Template {
        operation: &'static str,
        #[source]
        source: TemplateError,
    },

    /// The request could not be sent or the response could not be read.
    #[error("{operation} transport failure: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: TransportError,
    },

    /// The server answered with a status outside 200-299.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        headers: Headers,
        body: Option<String>,
    },

    /// A 2xx body did not match the expected JSON shape.
    #[error("{operation} response could not be decoded: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A binary response could not be written to a temporary file.
    #[error("{operation} download failed: {source}")]
    Download {
        operation: &'static str,
        #[source]
        source: io::Error,
    },
}

impl ApiError {
    /// HTTP-equivalent status: the server status for `Status`, 400 for
    /// `MissingParameter`, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::MissingParameter { .. } => Some(400),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn headers(&self) -> Option<&Headers> {
        match self {
            ApiError::Status { headers, .. } => Some(headers),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Status { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ApiError::Transport {
                source: TransportError::Timeout,
                ..
            }
        )
    }
}

/// Failures reported by a `Transport`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("I/O error: {0}")]
    Io(#[source] io::Error),

    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        // Body readers from ureq wrap its own error, timeouts included.
        let wrapped_timeout = err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<ureq::Error>())
            .is_some_and(|inner| matches!(inner, ureq::Error::Timeout(_)));
        if wrapped_timeout || err.kind() == io::ErrorKind::TimedOut {
            TransportError::Timeout
        } else {
            TransportError::Io(err)
        }
    }
}

/// Mismatch between a path template and the supplied path parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("placeholder '{{{0}}}' was not resolved")]
    Unresolved(String),

    #[error("no placeholder '{{{0}}}' in the path template")]
    UnknownParameter(String),
}

/// Errors raised while loading or validating a `ClientConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid base URI '{0}': expected an http:// or https:// URL")]
    BaseUri(String),

    #[error("read_timeout_ms must be greater than zero; omit it for no timeout")]
    ZeroReadTimeout,

    #[error("invalid value '{value}' for {name}")]
    Env { name: &'static str, value: String },
}
