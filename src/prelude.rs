//! Prelude module for convenient imports.
//!
//! ```ignore
//! use iconfont_batch::prelude::*;
//! ```

// Pipeline
pub use crate::process::{Dependencies, Loader, LoaderOutput};
#[cfg(feature = "batch")]
pub use crate::process::Batcher;

// Configuration
pub use crate::config::{BuildOptions, FontConfig, FontSettings, Rename};
pub use crate::format::FontFormat;
pub use crate::plan::GenerationPlan;
pub use crate::resolve::DuplicatePolicy;

// Collaborators
pub use crate::css::DefaultCss;
pub use crate::host::{AssetStore, BuildHost, MemoryHost};
pub use crate::raster::{CssGenerator, RasterOutput, Rasterizer, UrlMap};

// Outputs & errors
pub use crate::error::{BoxError, Error, Result};
pub use crate::publish::{AssetLocation, FormatOutput};
