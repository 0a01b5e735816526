/// Bundle specifications and the compile capability contract
pub mod runner;

use crate::error::CompileError;
use crate::filter::PathFilter;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One compile invocation: the source path plus its contents when the spec reads them
#[derive(Clone, Copy)]
pub struct CompileJob<'a> {
    pub contents: Option<&'a str>,
    pub file_path: &'a Path,
}

/// Size statistics reported alongside compiled output
#[derive(Clone, Copy, Debug, Default)]
pub struct CompileStats {
    pub size: Option<usize>,
    pub min_size: Option<usize>,
}

impl CompileStats {
    pub fn sized(size: usize) -> Self {
        Self {
            size: Some(size),
            min_size: None,
        }
    }

    pub fn minified(size: usize, min_size: usize) -> Self {
        Self {
            size: Some(size),
            min_size: Some(min_size),
        }
    }
}

/// Compiled content with an optional source map
#[derive(Clone, Debug)]
pub struct CompileOutput {
    pub output: String,
    pub source_map: Option<String>,
    pub stats: CompileStats,
}

impl CompileOutput {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            source_map: None,
            stats: CompileStats::default(),
        }
    }

    pub fn with_source_map(mut self, map: impl Into<String>) -> Self {
        self.source_map = Some(map.into());
        self
    }

    pub fn with_stats(mut self, stats: CompileStats) -> Self {
        self.stats = stats;
        self
    }
}

/// Compile capability for strategy pattern
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Transform one source file's contents into output content
    async fn compile(
        &self,
        spec: &BundleSpec,
        job: CompileJob<'_>,
    ) -> Result<CompileOutput, CompileError>;
}

/// Configuration for one family of source files and how to transform them
#[derive(Clone)]
pub struct BundleSpec {
    /// Glob pattern selecting the source files
    pub src: String,
    /// Directory the output namespace is computed relative to
    pub bundle_root: PathBuf,
    /// Root for compiler-resolved imports
    pub import_root: PathBuf,
    /// Output directory; empty means process without persisting
    pub output_root: PathBuf,
    /// Extension for derived output files
    pub ext: String,
    pub compiler: Arc<dyn Compiler>,
    /// Load file contents before compiling
    pub read: bool,
    /// Persist compiler output
    pub write: bool,
    pub filter: Option<Arc<dyn PathFilter>>,
}

impl BundleSpec {
    pub fn new(src: impl Into<String>, compiler: Arc<dyn Compiler>) -> Self {
        Self {
            src: src.into(),
            bundle_root: PathBuf::new(),
            import_root: PathBuf::new(),
            output_root: PathBuf::new(),
            ext: String::new(),
            compiler,
            read: true,
            write: true,
            filter: None,
        }
    }

    pub fn bundle_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.bundle_root = path.into();
        self
    }

    pub fn import_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.import_root = path.into();
        self
    }

    pub fn output_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_root = path.into();
        self
    }

    pub fn ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = ext.into();
        self
    }

    pub fn read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    pub fn write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    pub fn filter(mut self, filter: Arc<dyn PathFilter>) -> Self {
        self.filter = Some(filter);
        self
    }
}
