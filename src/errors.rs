use thiserror::Error;

/// Errors raised by the store, the command registry and command handlers.
///
/// The session engine's dispatch step is the only place these are caught;
/// each variant maps to at most one line sent back to the caller (see
/// [`BbsError::user_message`]).
#[derive(Debug, Error)]
pub enum BbsError {
    /// Unrecognized verb or malformed argument set.
    #[error("parse error: {0}")]
    Parse(String),

    /// A message (or user) that the caller asked for does not exist or is not visible.
    #[error("not found: {0}")]
    NotFound(String),

    /// The target exists but is not addressed to the caller.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Wrapper around SQLite failures (disk, lock contention, corruption).
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// An external utility (station log, uptime) or the info text is missing or failed.
    #[error("collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// Caller supplied a value that cannot be stored (e.g. a malformed callsign).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// End of the input stream while a nested prompt was waiting for a line.
    #[error("caller disconnected")]
    Disconnected,

    /// Failure writing to (or reading from) the caller's link.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BbsError>;

impl BbsError {
    /// The single line reported to the remote caller, or `None` when the error
    /// is swallowed (parse errors) or ends the session (disconnects, link I/O).
    pub fn user_message(&self) -> Option<String> {
        match self {
            BbsError::Parse(_) | BbsError::Disconnected | BbsError::Io(_) => None,
            BbsError::NotFound(msg)
            | BbsError::Permission(msg)
            | BbsError::CollaboratorUnavailable(msg)
            | BbsError::InvalidInput(msg) => Some(msg.clone()),
            BbsError::Storage(_) => {
                Some("Error accessing the message store. Contact the sysop for assistance.".to_string())
            }
        }
    }

    /// True when the caller's link is gone and the session must end.
    pub fn ends_session(&self) -> bool {
        matches!(self, BbsError::Disconnected | BbsError::Io(_))
    }
}
