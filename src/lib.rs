//! # iconfont-batch
//!
//! Build-time icon font generation from a declarative configuration unit.
//!
//! A unit names a set of SVG glyph sources (literal paths or globs) plus naming
//! and format options. Running it:
//!
//! 1. Resolves the sources and declares file/directory dependencies to the host
//! 2. Merges build-wide options, unit settings and defaults into a plan
//! 3. Hands the plan to a [`Rasterizer`](raster::Rasterizer)
//! 4. Emits one font per format (or inlines it as a data URI), with
//!    content-hashed file names
//! 5. Renders the primary stylesheet, and optionally a secondary SCSS file
//!
//! ## Quick Start
//!
//! ```ignore
//! use iconfont_batch::prelude::*;
//!
//! let loader = Loader::new(&my_rasterizer)
//!     .with_options(BuildOptions::builder().public_path("/assets/").build());
//!
//! let mut host = MemoryHost::new("src/icons");
//! let output = loader.run_json(
//!     r#"{ "files": ["*.svg"], "fontName": "icons", "types": ["woff2", "woff"] }"#,
//!     &mut host,
//! )?;
//!
//! std::fs::write("icons.css", &output.css)?;
//! for name in host.store().names() {
//!     std::fs::write(&name, host.store().get(&name).unwrap())?;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Unit configuration and build-wide options
//! - [`resolve`]: Glob resolution and dependency discovery
//! - [`plan`]: Layered merge into a [`GenerationPlan`](plan::GenerationPlan)
//! - [`hash`]: Content hash for cache-busting names
//! - [`raster`]: Rasterizer interface
//! - [`publish`]: Emitting fonts or building data URIs
//! - [`stylesheet`]: Secondary stylesheet rendering
//! - [`css`]: Default primary stylesheet
//! - [`host`]: Host build tool interface
//! - [`process`]: Single-unit and batch pipelines

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod css;
pub mod error;
pub mod format;
pub mod hash;
pub mod host;
pub mod plan;
pub mod prelude;
pub mod process;
pub mod publish;
pub mod raster;
pub mod resolve;
pub mod stylesheet;

// =============================================================================
// High-Level API
// =============================================================================

pub use process::{Dependencies, Loader, LoaderOutput};
#[cfg(feature = "batch")]
pub use process::Batcher;

// =============================================================================
// Configuration
// =============================================================================

pub use config::{BuildOptions, BuildOptionsBuilder, FontConfig, FontConfigBuilder, FontSettings, Rename};
pub use format::FontFormat;
pub use plan::GenerationPlan;
pub use resolve::{DuplicatePolicy, ResolvedFileSet};

// =============================================================================
// Collaborators & Outputs
// =============================================================================

pub use error::{BoxError, Error, Result};
pub use host::{AssetStore, BuildHost, MemoryHost};
pub use publish::{AssetLocation, FormatOutput};
pub use raster::{CssGenerator, RasterOutput, Rasterizer, UrlMap};

/// handlebars crate, for custom template tooling.
pub use handlebars;
