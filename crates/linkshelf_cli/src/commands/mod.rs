//! Shell command implementations.

pub mod seed;
pub mod shell;

use linkshelf_backend::BackendError;
use linkshelf_sync_engine::EngineError;
use thiserror::Error;

/// Result type for shell operations.
pub type ShellResult<T> = Result<T, ShellError>;

/// Errors raised by the shell.
#[derive(Error, Debug)]
pub enum ShellError {
    /// A command line could not be parsed.
    #[error("usage: {0}")]
    Usage(String),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A seed file was not valid JSON.
    #[error("invalid seed file: {0}")]
    Seed(#[from] serde_json::Error),

    /// A change event could not be encoded.
    #[error("encoding error: {0}")]
    Encode(serde_json::Error),

    /// The backend refused a request.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// The engine rejected an intent.
    #[error("{0}")]
    Engine(#[from] EngineError),
}
