use thiserror::Error;

/// Source resolution failures. These are fatal to the bundle run that
/// requested the resolution.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("failed to expand '{pattern}': {source}")]
    Expand {
        pattern: String,
        source: glob::GlobError,
    },
}

/// Result type alias for resolution operations
pub type ResolveResult<T> = Result<T, ResolveError>;
