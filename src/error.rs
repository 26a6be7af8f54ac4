//! Error type for icon font generation.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error reported by a [`Rasterizer`](crate::raster::Rasterizer).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for a failed generation run.
///
/// Every variant is fatal for the unit being processed: nothing is retried and
/// no further outputs are produced after the first error.
///
/// # Example
///
/// ```ignore
/// match loader.run(config, &mut host) {
///     Ok(output) => { /* success */ }
///     Err(Error::NoFiles { patterns }) => {
///         eprintln!("nothing matched {patterns:?}");
///     }
///     Err(Error::Rasterization(err)) => eprintln!("rasterizer failed: {err}"),
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration text is not a valid font configuration.
    #[error("invalid font configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A `files` entry is not a valid glob pattern.
    #[error("invalid glob pattern '{pattern}': {source}")]
    Glob {
        /// The offending pattern.
        pattern: String,
        /// Parser error from the glob crate.
        source: glob::PatternError,
    },

    /// Every pattern in `files` matched nothing.
    #[error("no files to process (patterns: {patterns:?})")]
    NoFiles {
        /// The patterns that were resolved.
        patterns: Vec<String>,
    },

    /// The same glyph source was resolved twice under a rejecting policy.
    #[error("file resolved more than once: {}", path.display())]
    DuplicateFile {
        /// The duplicated absolute path.
        path: PathBuf,
    },

    /// The rasterizer reported a failure. Propagated verbatim.
    #[error(transparent)]
    Rasterization(BoxError),

    /// The rasterizer succeeded but omitted a requested format.
    #[error("rasterizer produced no output for format '{0}'")]
    MissingFormat(&'static str),

    /// A stylesheet template could not be read, or its destination written.
    #[error("stylesheet template I/O on {}: {source}", path.display())]
    TemplateIo {
        /// The template or destination path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A stylesheet template failed to compile.
    #[error("template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    /// A stylesheet template failed to render.
    #[error("template render error: {0}")]
    Render(#[from] handlebars::RenderError),

    /// Other file I/O error.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The path being read or written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl Error {
    /// Create an I/O error annotated with its path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a template I/O error annotated with its path.
    pub fn template_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::TemplateIo {
            path: path.into(),
            source,
        }
    }

    /// Wrap an arbitrary rasterizer failure.
    pub fn rasterization(err: impl Into<BoxError>) -> Self {
        Self::Rasterization(err.into())
    }

    /// Check if this error came from the rasterizer.
    pub fn is_rasterization(&self) -> bool {
        matches!(self, Self::Rasterization(_) | Self::MissingFormat(_))
    }
}
