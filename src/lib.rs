pub mod builder;
pub mod bundle;
pub mod cli;
pub mod compilers;
pub mod config;
pub mod error;
pub mod filter;
pub mod livereload;
pub mod source;
pub mod watch;

// Re-export commonly used types
pub use builder::{BuildEnv, BuildOptions};
pub use bundle::runner::BundleSummary;
pub use bundle::{BundleSpec, CompileJob, CompileOutput, CompileStats, Compiler};
pub use config::Config;
pub use livereload::{LiveReload, LiveReloadHandle, LiveReloadSettings};
