use std::io;
use thiserror::Error;

/// Errors the bridge raises to its caller
///
/// Anything the child process does after it has been launched (non-zero exit,
/// thrown exceptions, malformed output) is reported as a
/// [`Response::Failure`](crate::Response::Failure) instead.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Runtime '{runtime}' is not available: {reason}")]
    RuntimeUnavailable { runtime: String, reason: String },

    #[error("Failed to prepare script file: {0}")]
    Resource(#[source] io::Error),

    #[error("Failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl BridgeError {
    pub(crate) fn unavailable(runtime: impl Into<String>, reason: impl Into<String>) -> Self {
        BridgeError::RuntimeUnavailable {
            runtime: runtime.into(),
            reason: reason.into(),
        }
    }
}
