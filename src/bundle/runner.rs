//! Sequential per-file execution of one bundle specification

use super::{BundleSpec, CompileJob, CompileStats};
use crate::error::{BundleResult, FileError};
use crate::source;
use glob::MatchOptions;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Outcome of one bundle run
#[derive(Clone, Copy, Debug, Default)]
pub struct BundleSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Run one bundle specification to completion
///
/// Files are processed strictly in resolved order. A failing file is logged
/// and counted, never aborting the rest of the run.
pub async fn run(spec: &BundleSpec) -> BundleResult<BundleSummary> {
    let mut files = source::resolve(std::slice::from_ref(&spec.src), MatchOptions::new(), &[])?;

    if let Some(filter) = &spec.filter {
        files.retain(|path| filter.should_include(path));
    }
    debug!("Pattern {} matched {} files", spec.src, files.len());

    let mut summary = BundleSummary::default();

    for file_path in &files {
        match process_file(spec, file_path).await {
            Ok(()) => summary.processed += 1,
            Err(err) => {
                error!("{}", err);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

/// Full cycle for one file: optional read, compile, optional write, progress line
async fn process_file(spec: &BundleSpec, file_path: &Path) -> Result<(), FileError> {
    let started = Instant::now();
    let output_path = output_file_name(spec, file_path, &spec.ext);

    let contents = if spec.read {
        let raw = tokio::fs::read_to_string(file_path)
            .await
            .map_err(|source| FileError::Read {
                path: file_path.to_path_buf(),
                source,
            })?;
        Some(raw)
    } else {
        None
    };

    let job = CompileJob {
        contents: contents.as_deref(),
        file_path,
    };
    let compiled = spec
        .compiler
        .compile(spec, job)
        .await
        .map_err(|source| FileError::Compile {
            path: file_path.to_path_buf(),
            source,
        })?;

    let persisted = spec.write && !output_path.as_os_str().is_empty();

    if persisted {
        write_output(&output_path, &compiled.output).await?;

        if let Some(map) = &compiled.source_map {
            let map_path = output_file_name(spec, file_path, &format!("{}.map", spec.ext));
            write_output(&map_path, map).await?;
        }
    }

    let verb = if persisted { "rendered" } else { "processed" };
    let shown = if output_path.as_os_str().is_empty() {
        file_path
    } else {
        output_path.as_path()
    };
    info!(
        "{} {} {} | {}",
        verb,
        shown.display(),
        size_report(compiled.stats),
        format_duration(started.elapsed())
    );

    Ok(())
}

/// Derive the output path: output_root/namespace under bundle_root/stem + ext
///
/// An empty output_root yields an empty path, meaning nothing is persisted.
fn output_file_name(spec: &BundleSpec, file_path: &Path, ext: &str) -> PathBuf {
    if spec.output_root.as_os_str().is_empty() {
        return PathBuf::new();
    }

    let file_dir = file_path.parent().unwrap_or_else(|| Path::new(""));
    let namespace = file_dir.strip_prefix(&spec.bundle_root).unwrap_or_else(|_| {
        debug!(
            "{} lies outside {}, emitting into the output root",
            file_path.display(),
            spec.bundle_root.display()
        );
        Path::new("")
    });

    let mut name = file_path.file_stem().map(OsString::from).unwrap_or_default();
    name.push(ext);
    spec.output_root.join(namespace).join(name)
}

async fn write_output(path: &Path, contents: &str) -> Result<(), FileError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| FileError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(path, contents)
        .await
        .map_err(|source| FileError::Write {
            path: path.to_path_buf(),
            source,
        })
}

fn size_report(stats: CompileStats) -> String {
    match (stats.size, stats.min_size) {
        (Some(size), Some(min_size)) if min_size < size => {
            let save = ((size - min_size) as f64 / size as f64 * 100.0) as u64;
            format!("{:.2}KB {}% minified", min_size as f64 / 1024.0, save)
        }
        (Some(size), _) => format!("{:.2}KB", size as f64 / 1024.0),
        (None, _) => "(size unknown)".to_string(),
    }
}

/// Format duration for display
fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}
