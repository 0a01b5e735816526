use crate::bundle::{BundleSpec, CompileJob, CompileOutput, CompileStats, Compiler};
use crate::error::CompileError;
use async_trait::async_trait;

/// Pass-through compiler: output equals input, stats report the byte size
pub struct CopyCompiler;

#[async_trait]
impl Compiler for CopyCompiler {
    async fn compile(
        &self,
        _spec: &BundleSpec,
        job: CompileJob<'_>,
    ) -> Result<CompileOutput, CompileError> {
        let contents = job.contents.ok_or_else(|| {
            CompileError::failed(format!(
                "copy compiler requires read contents for {}",
                job.file_path.display()
            ))
        })?;

        Ok(CompileOutput::new(contents).with_stats(CompileStats::sized(contents.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    fn spec() -> BundleSpec {
        BundleSpec::new("*.txt", Arc::new(CopyCompiler))
    }

    #[tokio::test]
    async fn passes_contents_through() {
        let spec = spec();
        let job = CompileJob {
            contents: Some("hello"),
            file_path: Path::new("a.txt"),
        };

        let out = CopyCompiler.compile(&spec, job).await.unwrap();
        assert_eq!(out.output, "hello");
        assert_eq!(out.stats.size, Some(5));
        assert!(out.source_map.is_none());
    }

    #[tokio::test]
    async fn rejects_missing_contents() {
        let spec = spec();
        let job = CompileJob {
            contents: None,
            file_path: Path::new("a.txt"),
        };

        assert!(CopyCompiler.compile(&spec, job).await.is_err());
    }
}
