use crate::error::BundleError;
use thiserror::Error;

/// Watcher installation failures.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("invalid watch pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("failed to install watcher: {0}")]
    Notify(#[from] notify::Error),
}

/// Live-reload server failures.
#[derive(Error, Debug)]
pub enum LiveReloadError {
    #[error("failed to bind live-reload server on {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
}

/// Orchestrator-level failures. Per-file compile and I/O problems are
/// isolated inside the runner and never surface here.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error(transparent)]
    LiveReload(#[from] LiveReloadError),

    #[error("bundle task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
