/// Centralized error handling for kiln
pub mod build;
pub mod bundle;
pub mod resolve;

pub use build::{BuildError, LiveReloadError, WatchError};
pub use bundle::{BundleError, BundleResult, CompileError, FileError};
pub use resolve::{ResolveError, ResolveResult};
