//! Error types for the Phare provider.
//!
//! Two layers of errors exist:
//!
//! - [`ClientError`]: failures talking to the Phare API (setup, request
//!   construction, transport, server-reported errors, response decoding).
//! - [`ProviderError`]: failures handling a resource operation, which may wrap
//!   a [`ClientError`] or report a local conversion problem.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Errors returned by [`PhareClient`](crate::client::PhareClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The client could not be constructed from the given settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request could not be built (bad URL, unserializable body).
    #[error("Failed to build request: {0}")]
    Request(String),

    /// The HTTP exchange failed (DNS, connection, timeout, body read).
    #[error("Failed to execute request: {0}")]
    Transport(#[source] reqwest::Error),

    /// The exchange was aborted through the client's cancellation token.
    #[error("Request cancelled")]
    Cancelled,

    /// The server answered with a status code of 400 or above.
    #[error("{0}")]
    Api(ApiError),

    /// A success response did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// One of the above, annotated with the operation that failed.
    #[error("Failed to {operation}: {source}")]
    Operation {
        /// The failed operation, e.g. `create monitor`.
        operation: &'static str,
        /// The underlying failure.
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// Annotate this error with the operation that produced it.
    pub fn during(self, operation: &'static str) -> Self {
        Self::Operation {
            operation,
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping operation annotations.
    pub fn root(&self) -> &ClientError {
        match self {
            Self::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// The HTTP status reported by the server, if this is an API error.
    pub fn status(&self) -> Option<u16> {
        match self.root() {
            Self::Api(api) => Some(api.status),
            _ => None,
        }
    }

    /// Returns `true` for network-level failures, cancellation included.
    pub fn is_transport(&self) -> bool {
        matches!(self.root(), Self::Transport(_) | Self::Cancelled)
    }

    /// Returns `true` if a success response could not be decoded.
    pub fn is_decode(&self) -> bool {
        matches!(self.root(), Self::Decode(_))
    }

    /// Returns `true` if the server reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// A server-reported error.
///
/// Built from the `{"message": ..., "errors": {field: [...]}}` envelope. When
/// the body does not match that envelope, `message` carries the raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The HTTP status code.
    pub status: u16,
    /// The top-level message (or raw body when undecodable).
    pub message: String,
    /// Per-field validation messages.
    pub errors: BTreeMap<String, Vec<String>>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    message: String,
    #[serde(default)]
    errors: BTreeMap<String, Vec<String>>,
}

impl ApiError {
    /// Build an error from a response status and body.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<ErrorEnvelope>(body) {
            Ok(envelope) => Self {
                status,
                message: envelope.message,
                errors: envelope.errors,
            },
            Err(_) => Self {
                status,
                message: String::from_utf8_lossy(body).into_owned(),
                errors: BTreeMap::new(),
            },
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error (status {}): {}", self.status, self.message)?;
        if !self.errors.is_empty() {
            write!(f, " - validation errors: ")?;
            for (i, (field, messages)) in self.errors.iter().enumerate() {
                if i > 0 {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, messages.join(", "))?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Errors that can occur while handling a resource or data source operation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider is not configured, or its configuration is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A declarative snapshot could not be converted to or from an entity.
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// A snapshot id could not be parsed as a numeric API id.
    #[error("Invalid id '{id}': {reason}")]
    InvalidId {
        /// The offending id.
        id: String,
        /// Why parsing failed.
        reason: String,
    },

    /// The API answered successfully but left out something required.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The requested resource or data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A snapshot could not be encoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The API call failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ProviderError {
    /// The client error behind this failure, if any.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Client(err) => Some(err),
            _ => None,
        }
    }

    /// Returns `true` if the failure was detected before any network call.
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Client(_) | Self::InvalidResponse(_))
    }
}
