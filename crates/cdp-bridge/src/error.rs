// Error types for cdp-bridge

use thiserror::Error;

/// Result type alias for cdp-bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Marker text thrown by element templates when a selector matches nothing.
///
/// Runtime exceptions whose description contains this text are reported as
/// [`Error::NotFound`].
pub const NOT_FOUND_MARKER: &str = "element(s) not found";

/// Errors that can occur when driving a remote target
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level error (the protocol round trip itself failed)
    ///
    /// Raised by the connection when the session is lost or a request could not
    /// be delivered. Never retried by this crate.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Channel closed unexpectedly
    #[error("Channel closed unexpectedly")]
    ChannelClosed,

    /// Protocol-level error (response had an unexpected shape)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Remote compilation failed or did not produce a script id
    #[error("Compile error: {0}")]
    Compile(String),

    /// Element(s) not found
    ///
    /// The executed expression threw an exception carrying [`NOT_FOUND_MARKER`].
    #[error("{}", NOT_FOUND_MARKER)]
    NotFound,

    /// The executed expression threw inside the remote target
    #[error("Unexpected error: {0}")]
    Unexpected(String),

    /// Invalid argument provided to method
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation is not valid for the target
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A required collaborator has not been configured
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// A weak frame reference no longer resolves
    ///
    /// Occurs after the frame navigated away or the registry was dropped.
    #[error("Detached: {0}")]
    Detached(String),

    /// The operation was cancelled by its caller
    #[error("Operation cancelled")]
    Cancelled,

    /// Timeout waiting for operation
    ///
    /// Contains context about what timed out. Distinct from [`Error::NotFound`]:
    /// the condition simply never became true in time.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error with additional context
    #[error("{0}: {1}")]
    Context(String, #[source] Box<Error>),
}

impl Error {
    /// Adds context to the error
    pub fn context(self, msg: impl Into<String>) -> Self {
        Error::Context(msg.into(), Box::new(self))
    }

    /// Rebuilds an equivalent error from a shared one.
    ///
    /// JSON errors carry no public constructor and come back as
    /// [`Error::Protocol`] with the same message.
    pub(crate) fn replay(&self) -> Self {
        match self {
            Error::Transport(msg) => Error::Transport(msg.clone()),
            Error::ChannelClosed => Error::ChannelClosed,
            Error::Protocol(msg) => Error::Protocol(msg.clone()),
            Error::Compile(msg) => Error::Compile(msg.clone()),
            Error::NotFound => Error::NotFound,
            Error::Unexpected(msg) => Error::Unexpected(msg.clone()),
            Error::InvalidArgument(msg) => Error::InvalidArgument(msg.clone()),
            Error::InvalidOperation(msg) => Error::InvalidOperation(msg.clone()),
            Error::NotImplemented(msg) => Error::NotImplemented(msg.clone()),
            Error::Detached(msg) => Error::Detached(msg.clone()),
            Error::Cancelled => Error::Cancelled,
            Error::Timeout(msg) => Error::Timeout(msg.clone()),
            Error::Json(err) => Error::Protocol(err.to_string()),
            Error::Context(msg, inner) => Error::Context(msg.clone(), Box::new(inner.replay())),
        }
    }

    /// Returns true if this error (or the error it wraps) is [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound => true,
            Error::Context(_, inner) => inner.is_not_found(),
            _ => false,
        }
    }

    /// Returns true for cancellation and timeout errors.
    pub fn is_cancellation(&self) -> bool {
        match self {
            Error::Cancelled | Error::Timeout(_) => true,
            Error::Context(_, inner) => inner.is_cancellation(),
            _ => false,
        }
    }
}
