/// Path filter implementations
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Path filter trait
pub trait PathFilter: Send + Sync {
    fn should_include(&self, path: &Path) -> bool;
}

/// Allowlist filter restricting a run to named unit directories
///
/// A path passes when its absolute form, or its parent directory, exactly
/// matches one of the allowed roots.
pub struct AllowList {
    allowed: HashSet<PathBuf>,
    cwd: PathBuf,
}

impl AllowList {
    /// Build the allowlist for the given unit names across every root directory
    pub fn for_units(cwd: &Path, roots: &[PathBuf], units: &[String]) -> Self {
        let mut allowed = HashSet::new();
        for unit in units {
            for root in roots {
                allowed.insert(absolute(cwd, &root.join(unit)));
            }
        }

        Self {
            allowed,
            cwd: cwd.to_path_buf(),
        }
    }
}

impl PathFilter for AllowList {
    fn should_include(&self, path: &Path) -> bool {
        let abs = absolute(&self.cwd, path);
        if self.allowed.contains(&abs) {
            return true;
        }
        abs.parent().is_some_and(|dir| self.allowed.contains(dir))
    }
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
