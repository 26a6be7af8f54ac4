//! Rasterizer interface.
//!
//! Vector-to-font conversion is delegated to a [`Rasterizer`]. It receives the
//! merged [`GenerationPlan`] and returns one binary per requested format plus
//! a callback that renders the primary stylesheet once URLs are known.

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashMap;

use crate::error::{BoxError, Error, Result};
use crate::format::FontFormat;
use crate::plan::GenerationPlan;

/// Public location of each generated format: a URL or a data URI.
pub type UrlMap = BTreeMap<FontFormat, String>;

/// Renders the primary stylesheet from the final font locations.
pub trait CssGenerator: Send + Sync {
    /// Render stylesheet text. `urls` covers every requested format.
    fn generate_css(&self, urls: &UrlMap) -> Result<String, BoxError>;
}

impl<F> CssGenerator for F
where
    F: Fn(&UrlMap) -> Result<String, BoxError> + Send + Sync,
{
    fn generate_css(&self, urls: &UrlMap) -> Result<String, BoxError> {
        self(urls)
    }
}

/// Successful rasterization result.
pub struct RasterOutput {
    /// Font binary per generated format.
    pub fonts: FxHashMap<FontFormat, Vec<u8>>,
    /// Final glyph → codepoint table, including rasterizer-assigned entries.
    pub codepoints: BTreeMap<String, u32>,
    /// Primary stylesheet callback.
    pub css: Box<dyn CssGenerator>,
}

impl RasterOutput {
    /// Font binary for `format`.
    pub fn font(&self, format: FontFormat) -> Result<&[u8]> {
        self.fonts
            .get(&format)
            .map(Vec::as_slice)
            .ok_or(Error::MissingFormat(format.id()))
    }

    /// Render the primary stylesheet.
    pub fn generate_css(&self, urls: &UrlMap) -> Result<String> {
        self.css.generate_css(urls).map_err(Error::Rasterization)
    }
}

impl fmt::Debug for RasterOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterOutput")
            .field("formats", &self.fonts.keys().collect::<Vec<_>>())
            .field("codepoints", &self.codepoints)
            .finish_non_exhaustive()
    }
}

/// Converts glyph sources into font binaries.
///
/// Implementations may fail on malformed glyph data or unsupported formats;
/// the error is surfaced to the caller unchanged.
pub trait Rasterizer: Send + Sync {
    /// Rasterize every file in `plan` into every format in `plan.types`.
    fn rasterize(&self, plan: &GenerationPlan) -> Result<RasterOutput, BoxError>;
}

/// Run the rasterizer for `plan`.
///
/// Fails with [`Error::NoFiles`] before calling the rasterizer when the plan
/// has no glyph sources. Rasterizer errors are not retried.
pub fn rasterize<R: Rasterizer + ?Sized>(
    rasterizer: &R,
    plan: &GenerationPlan,
    patterns: &[String],
) -> Result<RasterOutput> {
    if plan.files.is_empty() {
        return Err(Error::NoFiles {
            patterns: patterns.to_vec(),
        });
    }

    log::debug!("rasterizing {} glyph(s) for '{}'", plan.files.len(), plan.font_name);
    let output = rasterizer.rasterize(plan).map_err(Error::Rasterization)?;

    for format in &plan.types {
        output.font(*format)?;
    }
    Ok(output)
}
