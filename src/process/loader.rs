//! Single-unit icon font pipeline.
//!
//! # Example
//!
//! ```ignore
//! use iconfont_batch::prelude::*;
//!
//! let options = BuildOptions::builder().public_path("/assets/").build();
//! let loader = Loader::new(&my_rasterizer).with_options(options);
//!
//! // Declarative unit
//! let mut host = MemoryHost::new("src/icons");
//! let output = loader.run_json(r#"{"files": ["*.svg"], "fontName": "icons"}"#, &mut host)?;
//!
//! // Programmatic unit with a custom rename strategy
//! let config = FontConfig::builder()
//!     .files(["*.svg"])
//!     .rename(|path| format!("ui-{}", path.file_stem().unwrap().to_string_lossy()))
//!     .build();
//! let output = loader.run(&config, &mut host)?;
//! println!("{}", output.css);
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::{BuildOptions, FontConfig};
use crate::error::Result;
use crate::host::BuildHost;
use crate::plan::{GenerationPlan, file_patterns};
use crate::publish::{FormatOutput, publish_assets};
use crate::raster::{Rasterizer, rasterize};
use crate::resolve::resolve_files;
use crate::stylesheet::{StylesheetContext, write_stylesheet};

use super::session::{Dependencies, DependencySession};

/// Runs the pipeline for one configuration unit at a time.
///
/// Holds no per-unit state; one loader can process any number of units,
/// sequentially or through [`Batcher`](super::batch::Batcher).
pub struct Loader<'a, R: Rasterizer + ?Sized> {
    rasterizer: &'a R,
    options: BuildOptions,
}

impl<'a, R: Rasterizer + ?Sized> Loader<'a, R> {
    /// Create a loader with default build options.
    pub fn new(rasterizer: &'a R) -> Self {
        Self {
            rasterizer,
            options: BuildOptions::default(),
        }
    }

    /// Set build-wide options.
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Build-wide options in effect.
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Convert to batch mode.
    #[cfg(feature = "batch")]
    pub fn into_batch(self) -> super::batch::Batcher<'a, R> {
        super::batch::Batcher::from_loader(self)
    }

    /// Parse a declarative JSON unit and run it.
    pub fn run_json<H: BuildHost + ?Sized>(&self, text: &str, host: &mut H) -> Result<LoaderOutput> {
        self.run(&FontConfig::from_json(text)?, host)
    }

    /// Run the pipeline for `config`, using `host` for dependencies and outputs.
    ///
    /// Returns the primary stylesheet along with everything published. Stops at
    /// the first error; dependencies declared before it stay declared.
    pub fn run<H: BuildHost + ?Sized>(&self, config: &FontConfig, host: &mut H) -> Result<LoaderOutput> {
        let context = host.context().to_path_buf();
        let patterns = file_patterns(&self.options, config);

        let mut resolved = resolve_files(patterns, &context)?;
        let mut session = DependencySession::new(host);
        session.declare_files(&resolved);

        resolved.apply_policy(self.options.duplicates)?;
        let plan = GenerationPlan::merge(&self.options, config, &resolved, &context);
        session.declare_templates(&plan);
        let dependencies = session.finish();

        let raster = rasterize(self.rasterizer, &plan, patterns)?;
        let (assets, urls) = publish_assets(&plan, &raster, host)?;

        let codepoints = if raster.codepoints.is_empty() {
            plan.codepoints.clone()
        } else {
            raster.codepoints.clone()
        };

        let stylesheet = match &plan.stylesheet {
            Some(target) => {
                write_stylesheet(target, &StylesheetContext::new(&plan.font_name, &codepoints))?;
                Some(target.dest.clone())
            }
            None => None,
        };

        let css = raster.generate_css(&urls)?;

        log::info!(
            "generated '{}' from {} glyph(s) in {}: {} format(s){}",
            plan.font_name,
            plan.files.len(),
            context.display(),
            assets.len(),
            if plan.output.embed { " (embedded)" } else { "" }
        );

        Ok(LoaderOutput {
            css,
            assets,
            codepoints,
            stylesheet,
            dependencies,
        })
    }
}

/// Result of a successful unit run.
#[derive(Debug, Clone)]
pub struct LoaderOutput {
    /// Primary stylesheet text, the unit's transformed content.
    pub css: String,
    /// Published fonts in format order.
    pub assets: Vec<FormatOutput>,
    /// Final glyph → codepoint table.
    pub codepoints: BTreeMap<String, u32>,
    /// Path of the secondary stylesheet, if one was written.
    pub stylesheet: Option<PathBuf>,
    /// Dependencies declared to the host.
    pub dependencies: Dependencies,
}
