//! Error types for occlusion selection sessions.

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Why a session could not be started.
///
/// Neither condition is ever surfaced to the user; the controller logs it and
/// lets the triggering input pass through.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No eligible view, or a session is already running on it.
    #[error("invalid context: {0}")]
    InvalidContext(&'static str),

    /// The host refused to start its box/lasso drag.
    #[error("host refused to start drag selection: {0}")]
    HostDelegationFailure(String),
}

/// The host could not start an interactive drag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct DragRefused(pub String);

/// The host could not provide a repeating timer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("timer unavailable: {0}")]
pub struct TimerUnavailable(pub String);

/// Why settings could not be written.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("no config directory on this platform")]
    NoConfigDir,

    #[error("serialization failed: {0}")]
    Serialize(#[from] ron::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
