//! Error types for the HTTP socket client

use thiserror::Error;

/// Broad classification of a failed connect attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The endpoint string is not a usable URL
    Input,
    /// Network failure, timeout, or a non-200 status
    Transport,
    /// The reply is not the expected handshake document
    Protocol,
    /// The dispatcher could not schedule the attempt
    Resource,
}

/// The dispatcher cannot run submitted work
#[derive(Debug, Error)]
pub enum DispatchError {
    /// `dispose` has already been called
    #[error("dispatcher has been disposed")]
    Disposed,

    /// The worker pool could not be created
    #[error("failed to start worker pool: {0}")]
    Spawn(#[from] std::io::Error),
}

/// The handshake reply is not a valid `connection` document
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Body is not well-formed XML
    #[error("malformed response document: {0}")]
    MalformedDocument(String),

    /// Root element has the wrong name
    #[error("unexpected root node name: {0}")]
    UnexpectedRoot(String),

    /// Root element has no `id` attribute
    #[error("connection element has no id attribute")]
    MissingId,

    /// `id` attribute is not a valid identifier
    #[error("malformed connection id {value:?}: {reason}")]
    MalformedId { value: String, reason: String },
}

/// A connect attempt failed
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Endpoint could not be parsed, or is not an HTTP(S) URL
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Connection, timeout, or body read failure
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with something other than 200 OK
    #[error("unexpected response code: {status}")]
    UnexpectedStatus { status: u16 },

    /// Reply could not be understood
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Attempt could not be scheduled
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The owning context was closed before the socket could be registered
    #[error("socket context is closed")]
    ContextClosed,
}

impl ConnectError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConnectError::InvalidEndpoint { .. } => ErrorKind::Input,
            ConnectError::Transport(_) | ConnectError::UnexpectedStatus { .. } => {
                ErrorKind::Transport
            }
            ConnectError::Protocol(_) => ErrorKind::Protocol,
            ConnectError::Dispatch(_) | ConnectError::ContextClosed => ErrorKind::Resource,
        }
    }

    /// The HTTP status code, if the server answered with an unexpected one
    pub fn status(&self) -> Option<u16> {
        match self {
            ConnectError::UnexpectedStatus { status } => Some(*status),
            ConnectError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True if the attempt failed because a connect or read deadline passed
    pub fn is_timeout(&self) -> bool {
        matches!(self, ConnectError::Transport(e) if e.is_timeout())
    }
}

/// Configuration loading failed
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for connect attempts
pub type Result<T> = std::result::Result<T, ConnectError>;
