//! Dependency session for one unit.
//!
//! Declares every input the unit reads to the host before rasterization, so
//! a failure further down still leaves correct invalidation state.

use std::path::PathBuf;

use crate::host::BuildHost;
use crate::plan::GenerationPlan;
use crate::resolve::ResolvedFileSet;

/// Files and directories declared to the host for one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    /// File dependencies: literal patterns, resolved sources, templates.
    pub files: Vec<PathBuf>,
    /// Directory dependencies feeding glob patterns.
    pub directories: Vec<PathBuf>,
}

/// Records dependencies while forwarding them to the host.
///
/// # Example
///
/// ```ignore
/// let mut session = DependencySession::new(&mut host);
/// session.declare_files(&resolved);
/// session.declare_templates(&plan);
/// let deps = session.finish();
/// ```
pub struct DependencySession<'h, H: BuildHost + ?Sized> {
    host: &'h mut H,
    deps: Dependencies,
}

impl<'h, H: BuildHost + ?Sized> DependencySession<'h, H> {
    /// Start a session against `host`.
    pub fn new(host: &'h mut H) -> Self {
        Self {
            host,
            deps: Dependencies::default(),
        }
    }

    /// Declare literal patterns, resolved sources and glob directories.
    pub fn declare_files(&mut self, resolved: &ResolvedFileSet) {
        for file in resolved.watched_files.iter().chain(&resolved.files) {
            self.file(file.clone());
        }
        for dir in &resolved.watched_directories {
            self.host.add_context_dependency(dir);
            if !self.deps.directories.contains(dir) {
                self.deps.directories.push(dir.clone());
            }
        }
    }

    /// Declare template files referenced by the plan.
    pub fn declare_templates(&mut self, plan: &GenerationPlan) {
        for path in plan.template_dependencies() {
            self.file(path.to_path_buf());
        }
    }

    /// Finish and return what was declared.
    pub fn finish(self) -> Dependencies {
        self.deps
    }

    fn file(&mut self, path: PathBuf) {
        self.host.add_dependency(&path);
        if !self.deps.files.contains(&path) {
            self.deps.files.push(path);
        }
    }
}
