//! Error types for sparql-export
//!
//! Every failure surfaced by the client is an [`Error`]. Errors are wrapped at
//! the point of detection with the endpoint they came from, and classified
//! into an [`ErrorKind`] so callers can branch on the category without
//! matching every variant:
//! - configuration problems detected at construction time
//! - invalid caller input (e.g. a malformed graph IRI)
//! - transport failures (connection, HTTP status)
//! - protocol failures (malformed or truncated response bodies)
//! - diagnostics the server reported in response trailers
//! - failures writing to the caller's output sink

use thiserror::Error;

/// Result type alias for sparql-export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error used for transport-level causes (reqwest, hyper body errors)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for sparql-export
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "endpoints")
        key: Option<String>,
    },

    /// Graph name supplied by the caller is not a valid IRI
    #[error("invalid graph name {name:?}: {reason}")]
    InvalidGraphName {
        /// The rejected graph name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// Connection or body transfer failure
    #[error("transport error on {endpoint}: {source}")]
    Transport {
        /// Endpoint the request was sent to
        endpoint: String,
        /// Underlying cause
        #[source]
        source: BoxError,
    },

    /// Endpoint answered with a non-success status
    #[error("HTTP {status} from {endpoint}: {message}")]
    Http {
        /// Endpoint the request was sent to
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// Server error message (decoded from the error document when possible)
        message: String,
    },

    /// Malformed or truncated response body
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Diagnostic recovered from response trailers, wrapping the failure that
    /// was observed locally
    #[error("server reported error: {diagnostic} ({source})")]
    ServerReported {
        /// Diagnostic text exactly as the server sent it
        diagnostic: String,
        /// The locally observed failure
        #[source]
        source: Box<Error>,
    },

    /// Failure writing to the output sink
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing configuration, detected before any network call
    Configuration,
    /// Caller supplied an unusable argument
    InvalidInput,
    /// Connection, transfer, or HTTP status failure
    Transport,
    /// Response could not be decoded
    Protocol,
    /// Server-supplied diagnostic recovered from trailers
    ServerReported,
    /// Output sink failure
    Sink,
}

impl Error {
    /// Build a configuration error for the given key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Wrap a transport-level cause with the endpoint it occurred on
    pub fn transport(endpoint: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Transport {
            endpoint: endpoint.into(),
            source: source.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. } => ErrorKind::Configuration,
            Error::InvalidGraphName { .. } => ErrorKind::InvalidInput,
            Error::Transport { .. } | Error::Http { .. } => ErrorKind::Transport,
            Error::Protocol(_) => ErrorKind::Protocol,
            Error::ServerReported { .. } => ErrorKind::ServerReported,
            Error::Io(_) => ErrorKind::Sink,
        }
    }

    /// Get the machine-readable error code
    pub fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidGraphName { .. } => "invalid_graph_name",
            Error::Transport { .. } => "transport_error",
            Error::Http { .. } => "http_error",
            Error::Protocol(_) => "protocol_error",
            Error::ServerReported { .. } => "server_reported_error",
            Error::Io(_) => "output_error",
        }
    }

    /// Diagnostic text recovered from the server, if any
    pub fn server_diagnostic(&self) -> Option<&str> {
        match self {
            Error::ServerReported { diagnostic, .. } => Some(diagnostic),
            _ => None,
        }
    }
}
