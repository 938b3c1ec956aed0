//! Error types shared by every layer of the crate.
//!
//! Transport failures (VXI-11/RPC/socket), faults reported by the instrument's
//! own error queue, malformed replies and unparseable values are kept apart so
//! callers can decide which ones end a run.

/// The error type for all scopelab operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The link to the instrument failed (RPC rejection, VXI-11 error code, lost connection).
    #[error("transport error: {0}")]
    Transport(String),

    /// The instrument did not answer within the configured timeout.
    #[error("timeout waiting for instrument")]
    Timeout,

    /// The instrument's error queue reported a non-zero code after `command`.
    #[error("device error {code} after `{command}`: {message}")]
    Device {
        command: String,
        code: i32,
        message: String,
    },

    /// A reply had the wrong shape: arity, framing, coded values or length.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A reply could not be converted to the requested type.
    #[error("parse error: {0}")]
    Parse(String),

    /// A caller-supplied value was rejected before anything was sent.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors that originate below the SCPI layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Timeout | Error::Io(_))
    }
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
