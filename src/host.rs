//! Host build tool interface.
//!
//! The pipeline never touches the host's dependency graph or output
//! directory directly; it goes through [`BuildHost`].
//!
//! # Shared Outputs
//!
//! ```text
//! AssetStore (shared across units, Arc<RwLock<..>>)
//! └── FxHashMap<String, Vec<u8>>   emitted name → content
//!
//! MemoryHost (one per unit)
//! ├── context / root_context / public_path
//! ├── file + directory dependencies
//! └── AssetStore handle
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::hash::{DEFAULT_HASH_LENGTH, hash_bytes};

// =============================================================================
// Host Trait
// =============================================================================

/// Services a host build tool provides to one unit's pipeline run.
pub trait BuildHost {
    /// Directory of the unit being processed.
    fn context(&self) -> &Path;

    /// Root directory of the build, used when interpolating names.
    fn root_context(&self) -> &Path {
        self.context()
    }

    /// Public URL base configured in the host, if any.
    fn public_path(&self) -> Option<&str> {
        None
    }

    /// Declare a file the unit depends on.
    fn add_dependency(&mut self, path: &Path);

    /// Declare a directory whose contents the unit depends on.
    fn add_context_dependency(&mut self, dir: &Path);

    /// Emit a build output.
    fn emit_file(&mut self, name: &str, content: &[u8]);

    /// Substitute host tokens into an output file name.
    fn interpolate_name(&self, template: &str, content: &[u8]) -> String {
        interpolate_name(template, content)
    }
}

/// Replace content-hash tokens in an output name.
///
/// Supported tokens: `[hash]`, `[contenthash]`, and their length-limited
/// forms `[hash:N]`, `[contenthash:N]`. Every occurrence is replaced.
pub fn interpolate_name(template: &str, content: &[u8]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('[') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail.find(']').and_then(|end| hash_token(&tail[1..end]).map(|len| (end, len))) {
            Some((end, len)) => {
                out.push_str(&hash_bytes(content, len));
                rest = &tail[end + 1..];
            }
            None => {
                out.push('[');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parse `hash`, `contenthash`, `hash:N`, `contenthash:N` into a length.
fn hash_token(token: &str) -> Option<usize> {
    let (name, len) = match token.split_once(':') {
        Some((name, len)) => (name, len.parse().ok()?),
        None => (token, DEFAULT_HASH_LENGTH),
    };
    matches!(name, "hash" | "contenthash").then_some(len)
}

// =============================================================================
// In-memory Host
// =============================================================================

/// Emitted outputs, shareable between units processed in parallel.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    files: Arc<RwLock<FxHashMap<String, Vec<u8>>>>,
}

impl AssetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an output, returning `true` if the name was already taken.
    pub fn insert(&self, name: &str, content: &[u8]) -> bool {
        self.files
            .write()
            .insert(name.to_string(), content.to_vec())
            .is_some()
    }

    /// Get a copy of an emitted output.
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.files.read().get(name).cloned()
    }

    /// Sorted names of all emitted outputs.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.files.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of emitted outputs.
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Check if nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

/// A [`BuildHost`] that records everything in memory.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    context: PathBuf,
    root_context: PathBuf,
    public_path: Option<String>,
    dependencies: Vec<PathBuf>,
    context_dependencies: Vec<PathBuf>,
    store: AssetStore,
}

impl MemoryHost {
    /// Create a host for a unit located in `context`.
    pub fn new(context: impl Into<PathBuf>) -> Self {
        let context = context.into();
        Self {
            root_context: context.clone(),
            context,
            public_path: None,
            dependencies: Vec::new(),
            context_dependencies: Vec::new(),
            store: AssetStore::new(),
        }
    }

    /// Set the build root.
    pub fn with_root_context(mut self, root: impl Into<PathBuf>) -> Self {
        self.root_context = root.into();
        self
    }

    /// Set the host's public URL base.
    pub fn with_public_path(mut self, public_path: impl Into<String>) -> Self {
        self.public_path = Some(public_path.into());
        self
    }

    /// Emit into a shared store.
    pub fn with_store(mut self, store: AssetStore) -> Self {
        self.store = store;
        self
    }

    /// Declared file dependencies, in declaration order.
    pub fn dependencies(&self) -> &[PathBuf] {
        &self.dependencies
    }

    /// Declared directory dependencies, in declaration order.
    pub fn context_dependencies(&self) -> &[PathBuf] {
        &self.context_dependencies
    }

    /// The store receiving emitted outputs.
    pub fn store(&self) -> &AssetStore {
        &self.store
    }
}

impl BuildHost for MemoryHost {
    fn context(&self) -> &Path {
        &self.context
    }

    fn root_context(&self) -> &Path {
        &self.root_context
    }

    fn public_path(&self) -> Option<&str> {
        self.public_path.as_deref()
    }

    fn add_dependency(&mut self, path: &Path) {
        if !self.dependencies.iter().any(|p| p == path) {
            self.dependencies.push(path.to_path_buf());
        }
    }

    fn add_context_dependency(&mut self, dir: &Path) {
        if !self.context_dependencies.iter().any(|p| p == dir) {
            self.context_dependencies.push(dir.to_path_buf());
        }
    }

    fn emit_file(&mut self, name: &str, content: &[u8]) {
        if self.store.insert(name, content) {
            log::warn!("output '{name}' emitted more than once; last write wins");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_passthrough() {
        assert_eq!(interpolate_name("icons.woff", b"x"), "icons.woff");
        assert_eq!(interpolate_name("[name].woff", b"x"), "[name].woff");
        assert_eq!(interpolate_name("a[b", b"x"), "a[b");
    }

    #[test]
    fn test_interpolate_hash_tokens() {
        let name = interpolate_name("icons.[hash:8].woff", b"font");
        assert_eq!(name, format!("icons.{}.woff", hash_bytes(b"font", 8)));

        let name = interpolate_name("[contenthash]-[contenthash:4]", b"font");
        assert_eq!(
            name,
            format!("{}-{}", hash_bytes(b"font", DEFAULT_HASH_LENGTH), hash_bytes(b"font", 4))
        );
    }

    #[test]
    fn test_memory_host_dedups_dependencies() {
        let mut host = MemoryHost::new("/unit");
        host.add_dependency(Path::new("a.svg"));
        host.add_dependency(Path::new("a.svg"));
        host.add_context_dependency(Path::new("/unit/icons"));
        assert_eq!(host.dependencies().len(), 1);
        assert_eq!(host.context_dependencies().len(), 1);
    }

    #[test]
    fn test_shared_store() {
        let store = AssetStore::new();
        let mut a = MemoryHost::new("/a").with_store(store.clone());
        let mut b = MemoryHost::new("/b").with_store(store.clone());
        a.emit_file("a.woff", b"1");
        b.emit_file("b.woff", b"2");
        assert_eq!(store.names(), ["a.woff", "b.woff"]);
        assert_eq!(store.get("b.woff").unwrap(), b"2");
    }
}
