//! Errors surfaced by the Slate client.
//!
//! Failures are never swallowed or retried inside the command layer: they
//! are logged once at error level and propagated to the caller. There is no
//! automatic rollback of side effects already committed remotely.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlateError {
    /// Could not reach the service at all.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request went out but no response arrived in time.
    #[error("timed out after {timeout:?} waiting for {operation}")]
    Timeout { operation: String, timeout: Duration },

    /// Non-200 HTTP status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// HTTP 200, but the response envelope reported failure.
    #[error("{status}: {message}")]
    Api { status: i64, message: String },

    /// The response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("no module named '{0}'")]
    UnknownModule(String),

    #[error("module '{module}' has no operation '{operation}'")]
    UnknownOperation { module: String, operation: String },

    /// Argument binding failed before any network I/O.
    #[error(transparent)]
    Arguments(#[from] slateproto::BindError),

    /// A payload value had the wrong shape for its operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Upload source could not be read.
    #[error("failed to read upload file {path}: {source}")]
    UploadRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl SlateError {
    /// Classify a reqwest failure; timeouts get their own kind.
    pub(crate) fn from_reqwest(operation: &str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                operation: operation.to_string(),
                timeout,
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}
