//! Glob pattern resolution for bundle sources

use crate::error::{ResolveError, ResolveResult};
use glob::{MatchOptions, Pattern, glob_with};
use indexmap::IndexSet;
use std::path::PathBuf;

/// Check whether a pattern contains glob metacharacters
pub fn has_magic(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Expand patterns into a deduplicated, exclusion-filtered file list
///
/// Literal patterns (no metacharacters) are passed through verbatim without
/// an existence check. Expanded results keep pattern order, duplicates keep
/// their first occurrence, and entries matching any exclude pattern are
/// removed.
pub fn resolve(
    patterns: &[String],
    options: MatchOptions,
    exclude: &[String],
) -> ResolveResult<Vec<PathBuf>> {
    let mut found: IndexSet<PathBuf> = IndexSet::new();

    for pattern in patterns {
        if !has_magic(pattern) {
            found.insert(PathBuf::from(pattern));
            continue;
        }

        let paths = glob_with(pattern, options).map_err(|source| ResolveError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;

        for entry in paths {
            let path = entry.map_err(|source| ResolveError::Expand {
                pattern: pattern.clone(),
                source,
            })?;
            found.insert(path);
        }
    }

    let excludes = exclude
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|source| ResolveError::Pattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect::<ResolveResult<Vec<_>>>()?;

    Ok(found
        .into_iter()
        .filter(|path| !excludes.iter().any(|ex| ex.matches_path_with(path, options)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &std::path::Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, "x").unwrap();
        path
    }

    #[test]
    fn detects_metacharacters() {
        assert!(has_magic("pages/**/*.styl"));
        assert!(has_magic("pages/?.styl"));
        assert!(has_magic("pages/[ab].styl"));
        assert!(!has_magic("pages/index.styl"));
    }

    #[test]
    fn literal_pattern_passes_through_unchanged() {
        let result = resolve(
            &["does/not/exist.styl".to_string()],
            MatchOptions::new(),
            &[],
        )
        .unwrap();
        assert_eq!(result, vec![PathBuf::from("does/not/exist.styl")]);
    }

    #[test]
    fn expands_wildcard_patterns() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.styl");
        touch(temp.path(), "sub/b.styl");
        touch(temp.path(), "c.txt");

        let pattern = format!("{}/**/*.styl", temp.path().display());
        let result = resolve(&[pattern], MatchOptions::new(), &[]).unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|p| p.extension().unwrap() == "styl"));
    }

    #[test]
    fn overlapping_patterns_deduplicate_keeping_first_occurrence() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.styl");
        touch(temp.path(), "b.styl");

        let all = format!("{}/*.styl", temp.path().display());
        let just_b = format!("{}/b.styl", temp.path().display());
        let result = resolve(&[all, just_b], MatchOptions::new(), &[]).unwrap();

        assert_eq!(result.len(), 2);
        assert!(result[0].ends_with("a.styl"));
        assert!(result[1].ends_with("b.styl"));
    }

    #[test]
    fn excludes_remove_matching_entries_preserving_order() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.styl");
        touch(temp.path(), "skip/b.styl");
        touch(temp.path(), "c.styl");

        let pattern = format!("{}/**/*.styl", temp.path().display());
        let exclude = format!("{}/skip/**", temp.path().display());
        let result = resolve(&[pattern], MatchOptions::new(), &[exclude]).unwrap();

        assert_eq!(result.len(), 2);
        assert!(result[0].ends_with("a.styl"));
        assert!(result[1].ends_with("c.styl"));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let result = resolve(&["[".to_string()], MatchOptions::new(), &[]);
        assert!(result.is_err());
    }
}
