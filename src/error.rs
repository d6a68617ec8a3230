//! Error taxonomy for the wallet client core.
//!
//! Nothing here is fatal: every variant degrades one displayed value or
//! aborts one user action. Rejected amount keystrokes are not errors at all;
//! they stay inside the numeric engine as [`crate::numeric::InputOutcome`].

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Client creation failed before the agent was usable (trust bootstrap
    /// included). Callers show "not ready", never this message directly.
    #[error("trust bootstrap failed: {0}")]
    Bootstrap(String),

    /// HTTP-level failure talking to the gateway.
    #[error("transport: {0}")]
    Transport(String),

    /// The custody service rejected the call. The message is surfaced to the
    /// user verbatim, so Display carries nothing but the service's own text.
    #[error("{0}")]
    Remote(String),

    /// Identity provider failure (handle creation, login, logout).
    #[error("auth provider: {0}")]
    Auth(String),

    /// The gateway answered but the payload did not decode.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}
