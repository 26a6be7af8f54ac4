//! Glyph source resolution and dependency discovery.
//!
//! Each `files` entry is either a literal path or a glob pattern:
//!
//! ```text
//! "logo.svg"      → files: <base>/logo.svg     watched_files: "logo.svg"
//! "icons/*.svg"   → files: <base>/icons/a.svg  watched_directories: <base>/icons
//!                          <base>/icons/b.svg
//! ```
//!
//! Literal entries are watched by their pattern text, so the host can track
//! a reference before the file exists. Glob entries watch their parent
//! directory, so adding or removing a matching file re-triggers resolution.

use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::error::{Error, Result};

/// How duplicate entries in the resolved file list are handled.
///
/// Overlapping patterns (`"a.svg"` plus `"*.svg"`) resolve the same file
/// twice. Upstream behavior keeps both entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Pass duplicates through unchanged.
    #[default]
    Keep,
    /// Drop later occurrences, keeping first-seen order.
    Dedup,
    /// Fail with [`Error::DuplicateFile`].
    Reject,
}

/// Result of resolving a list of patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFileSet {
    /// Absolute glyph source paths, in pattern declaration order.
    pub files: Vec<PathBuf>,
    /// Literal patterns, exactly as written.
    pub watched_files: Vec<PathBuf>,
    /// Absolute directories whose contents feed a glob.
    pub watched_directories: Vec<PathBuf>,
}

impl ResolvedFileSet {
    /// Check if no glyph source was found.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Apply a duplicate policy to `files`.
    pub fn apply_policy(&mut self, policy: DuplicatePolicy) -> Result<()> {
        if policy == DuplicatePolicy::Keep {
            if has_duplicates(&self.files) {
                log::warn!("resolved glyph list contains duplicate files; keeping them");
            }
            return Ok(());
        }

        let mut seen: FxHashSet<PathBuf> = FxHashSet::default();
        let mut unique = Vec::with_capacity(self.files.len());
        for file in self.files.drain(..) {
            if seen.insert(file.clone()) {
                unique.push(file);
            } else if policy == DuplicatePolicy::Reject {
                return Err(Error::DuplicateFile { path: file });
            }
        }
        self.files = unique;
        Ok(())
    }
}

fn has_duplicates(files: &[PathBuf]) -> bool {
    let mut seen: FxHashSet<&Path> = FxHashSet::default();
    files.iter().any(|f| !seen.insert(f.as_path()))
}

/// Check whether a pattern contains glob metacharacters.
pub fn is_glob(pattern: &str) -> bool {
    Pattern::escape(pattern) != pattern
}

/// Resolve patterns against `base` into a [`ResolvedFileSet`].
///
/// A pattern matching nothing is not an error here; an empty aggregate is
/// reported by the pipeline before rasterization.
pub fn resolve_files<S: AsRef<str>>(patterns: &[S], base: &Path) -> Result<ResolvedFileSet> {
    let base = absolute(base);
    let mut set = ResolvedFileSet::default();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        if is_glob(pattern) {
            add_by_glob(&mut set, pattern, &base)?;
        } else {
            set.watched_files.push(PathBuf::from(pattern));
            set.files.push(join_normalized(&base, Path::new(pattern)));
        }
    }

    log::debug!(
        "resolved {} pattern(s) in {} to {} file(s)",
        patterns.len(),
        base.display(),
        set.files.len()
    );
    Ok(set)
}

fn add_by_glob(set: &mut ResolvedFileSet, pattern: &str, base: &Path) -> Result<()> {
    let matches = glob_paths(base, pattern)?;
    if matches.is_empty() {
        log::warn!("pattern '{pattern}' matched no files in {}", base.display());
    }
    set.files.extend(matches.into_iter().filter(|p| p.is_file()));

    match Path::new(pattern).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            let dirs = glob_paths(base, &parent.to_string_lossy())?;
            set.watched_directories
                .extend(dirs.into_iter().filter(|p| p.is_dir()));
        }
        _ => set.watched_directories.push(base.to_path_buf()),
    }
    Ok(())
}

/// Expand `pattern` relative to `base`; results are absolute and normalized.
fn glob_paths(base: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full = if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        let escaped_base = Pattern::escape(&base.to_string_lossy());
        format!("{}/{}", escaped_base.trim_end_matches('/'), pattern)
    };

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };
    let paths = glob::glob_with(&full, options).map_err(|source| Error::Glob {
        pattern: pattern.to_string(),
        source,
    })?;

    // Unreadable entries are skipped, like a directory walk that lost a race.
    Ok(paths
        .filter_map(|entry| entry.ok())
        .map(|p| join_normalized(base, &p))
        .collect())
}

/// Make `path` absolute against the current directory.
fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        std::env::current_dir().map_or_else(|_| normalize(path), |cwd| join_normalized(&cwd, path))
    }
}

/// Join and lexically normalize (`.` and `..` removed), without touching disk.
pub(crate) fn join_normalized(base: &Path, path: &Path) -> PathBuf {
    normalize(&base.join(path))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
