use crate::error::ResolveError;
use std::path::PathBuf;
use thiserror::Error;

/// Tagged failure returned by a compile capability.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl CompileError {
    /// Create a new Failed error
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// Error while processing a single file of a bundle. Logged and swallowed by
/// the runner so one bad file never aborts the rest of the run.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("compile failed for {path}: {source}")]
    Compile { path: PathBuf, source: CompileError },

    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Fatal failure for a whole bundle run.
#[derive(Error, Debug)]
pub enum BundleError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Result type alias for bundle operations
pub type BundleResult<T> = Result<T, BundleError>;
