//! Configuration inputs for icon font generation.
//!
//! Two statically distinct entry points produce the same [`FontConfig`]:
//!
//! - [`FontConfig::from_json`] for a unit's declarative JSON text
//! - [`FontConfig::builder`] for programmatic configuration, including a
//!   custom [`Rename`] strategy
//!
//! Build-wide defaults live in [`BuildOptions`]. Both are merged into a
//! [`GenerationPlan`](crate::plan::GenerationPlan) by the plan module.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::format::{FontFormat, deserialize_types};
use crate::resolve::DuplicatePolicy;

// =============================================================================
// Rename Strategy
// =============================================================================

type RenameFn = dyn Fn(&Path) -> String + Send + Sync;

/// Strategy mapping a resolved glyph source path to its glyph name.
///
/// The default strips a trailing `.svg` from the file name. A custom
/// strategy replaces it entirely.
#[derive(Clone)]
pub struct Rename(Arc<RenameFn>);

impl Rename {
    /// Create a rename strategy from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Path) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// The default strategy: base name without the `.svg` extension.
    pub fn strip_svg() -> Self {
        Self::new(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match name.strip_suffix(".svg") {
                Some(stem) => stem.to_string(),
                None => name,
            }
        })
    }

    /// Compute the glyph name for a source file.
    pub fn apply(&self, path: &Path) -> String {
        (self.0)(path)
    }
}

impl Default for Rename {
    fn default() -> Self {
        Self::strip_svg()
    }
}

impl fmt::Debug for Rename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Rename(..)")
    }
}

// =============================================================================
// Shared Settings
// =============================================================================

/// Data fields that may be set either per unit or build-wide.
///
/// Every field is optional; unset fields fall through to the next layer
/// during merging.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSettings {
    /// Glyph source paths or glob patterns, relative to the unit directory.
    pub files: Option<Vec<String>>,
    /// Font family name.
    pub font_name: Option<String>,
    /// Formats to generate, in order. A single identifier is accepted.
    #[serde(default, deserialize_with = "deserialize_types")]
    pub types: Option<Vec<FontFormat>>,
    /// Output font height.
    pub font_height: Option<f64>,
    /// Fixed glyph name to codepoint assignments.
    pub codepoints: Option<BTreeMap<String, u32>>,
    /// Selector for the shared icon rule.
    pub base_selector: Option<String>,
    /// Prefix for per-glyph class names.
    pub class_prefix: Option<String>,
    /// Output file name template (`[chunkhash]`, `[fontname]`, `[ext]`).
    pub file_name: Option<String>,
    /// Also write font binaries next to the unit.
    pub write_files: Option<bool>,
    /// Inline fonts as data URIs instead of emitting files.
    pub embed: Option<bool>,
    /// Destination of the secondary (SCSS) stylesheet.
    pub scss_dest: Option<PathBuf>,
    /// Template for the secondary stylesheet.
    pub scss_template: Option<PathBuf>,
    /// Per-format options forwarded verbatim to the rasterizer.
    pub format_options: Option<Map<String, Value>>,
    /// Rasterizer: give every glyph the same advance width.
    pub fixed_width: Option<bool>,
    /// Rasterizer: center glyphs horizontally.
    pub center_horizontally: Option<bool>,
    /// Rasterizer: scale glyphs to the font height.
    pub normalize: Option<bool>,
    /// Rasterizer: coordinate rounding precision.
    pub round: Option<f64>,
    /// Rasterizer: font descent.
    pub descent: Option<f64>,
}

// =============================================================================
// Unit Config
// =============================================================================

/// Per-unit font configuration.
#[derive(Debug, Clone, Default)]
pub struct FontConfig {
    /// Data settings, highest precedence during merging.
    pub settings: FontSettings,
    /// Custom primary stylesheet template (unit-only).
    pub css_template: Option<PathBuf>,
    /// Font path used by the primary stylesheet (unit-only).
    pub css_fonts_path: Option<PathBuf>,
    /// Custom rename strategy (unit-only).
    pub rename: Option<Rename>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FontConfigData {
    #[serde(flatten)]
    settings: FontSettings,
    css_template: Option<PathBuf>,
    css_fonts_path: Option<PathBuf>,
}

impl FontConfig {
    /// Parse a unit's declarative JSON configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use iconfont_batch::config::FontConfig;
    ///
    /// let config = FontConfig::from_json(r#"{
    ///     "files": ["icons/*.svg"],
    ///     "fontName": "icons",
    ///     "types": "woff2"
    /// }"#).unwrap();
    /// assert_eq!(config.settings.font_name.as_deref(), Some("icons"));
    /// ```
    pub fn from_json(text: &str) -> Result<Self> {
        let data: FontConfigData = serde_json::from_str(text)?;
        Ok(Self {
            settings: data.settings,
            css_template: data.css_template,
            css_fonts_path: data.css_fonts_path,
            rename: None,
        })
    }

    /// Start a programmatic configuration.
    pub fn builder() -> FontConfigBuilder {
        FontConfigBuilder::default()
    }
}

/// Builder for [`FontConfig`].
///
/// # Example
///
/// ```
/// use iconfont_batch::config::FontConfig;
/// use iconfont_batch::format::FontFormat;
///
/// let config = FontConfig::builder()
///     .files(["icons/*.svg"])
///     .font_name("icons")
///     .types([FontFormat::Woff2, FontFormat::Woff])
///     .rename(|path| path.file_stem().unwrap().to_string_lossy().to_uppercase())
///     .build();
/// assert!(config.rename.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FontConfigBuilder {
    config: FontConfig,
}

impl FontConfigBuilder {
    /// Set the glyph source patterns.
    pub fn files<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.settings.files = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the font family name.
    pub fn font_name(mut self, name: impl Into<String>) -> Self {
        self.config.settings.font_name = Some(name.into());
        self
    }

    /// Set the formats to generate.
    pub fn types(mut self, types: impl IntoIterator<Item = FontFormat>) -> Self {
        self.config.settings.types = Some(types.into_iter().collect());
        self
    }

    /// Set the font height.
    pub fn font_height(mut self, height: f64) -> Self {
        self.config.settings.font_height = Some(height);
        self
    }

    /// Pin a glyph to a codepoint.
    pub fn codepoint(mut self, glyph: impl Into<String>, codepoint: u32) -> Self {
        self.config
            .settings
            .codepoints
            .get_or_insert_with(BTreeMap::new)
            .insert(glyph.into(), codepoint);
        self
    }

    /// Set the shared icon selector.
    pub fn base_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.settings.base_selector = Some(selector.into());
        self
    }

    /// Set the per-glyph class prefix.
    pub fn class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.settings.class_prefix = Some(prefix.into());
        self
    }

    /// Set the output file name template.
    pub fn file_name(mut self, template: impl Into<String>) -> Self {
        self.config.settings.file_name = Some(template.into());
        self
    }

    /// Also write font binaries to disk.
    pub fn write_files(mut self, write: bool) -> Self {
        self.config.settings.write_files = Some(write);
        self
    }

    /// Inline fonts as data URIs.
    pub fn embed(mut self, embed: bool) -> Self {
        self.config.settings.embed = Some(embed);
        self
    }

    /// Render a secondary stylesheet to `dest`.
    pub fn scss_dest(mut self, dest: impl Into<PathBuf>) -> Self {
        self.config.settings.scss_dest = Some(dest.into());
        self
    }

    /// Use a custom template for the secondary stylesheet.
    pub fn scss_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.config.settings.scss_template = Some(template.into());
        self
    }

    /// Use a custom primary stylesheet template.
    pub fn css_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.config.css_template = Some(template.into());
        self
    }

    /// Set the font path used by the primary stylesheet.
    pub fn css_fonts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.css_fonts_path = Some(path.into());
        self
    }

    /// Use a custom glyph naming strategy.
    pub fn rename<F>(mut self, f: F) -> Self
    where
        F: Fn(&Path) -> String + Send + Sync + 'static,
    {
        self.config.rename = Some(Rename::new(f));
        self
    }

    /// Replace all data settings at once.
    pub fn settings(mut self, settings: FontSettings) -> Self {
        self.config.settings = settings;
        self
    }

    /// Finish the configuration.
    pub fn build(self) -> FontConfig {
        self.config
    }
}

// =============================================================================
// Build-wide Options
// =============================================================================

/// Options shared by every unit in a build.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    /// Base for public font URLs.
    pub public_path: Option<String>,
    /// Length of the `[chunkhash]` value.
    pub hash_length: Option<usize>,
    /// How duplicate resolved files are treated.
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
    /// Defaults for unit settings.
    #[serde(flatten)]
    pub defaults: FontSettings,
}

impl BuildOptions {
    /// Parse build-wide options from JSON.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Start a programmatic build configuration.
    pub fn builder() -> BuildOptionsBuilder {
        BuildOptionsBuilder::default()
    }
}

/// Builder for [`BuildOptions`].
#[derive(Debug, Clone, Default)]
pub struct BuildOptionsBuilder {
    options: BuildOptions,
}

impl BuildOptionsBuilder {
    /// Set the public URL base.
    pub fn public_path(mut self, path: impl Into<String>) -> Self {
        self.options.public_path = Some(path.into());
        self
    }

    /// Set the `[chunkhash]` length.
    pub fn hash_length(mut self, len: usize) -> Self {
        self.options.hash_length = Some(len);
        self
    }

    /// Set the duplicate file policy.
    pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.options.duplicates = policy;
        self
    }

    /// Set the default file name template.
    pub fn file_name(mut self, template: impl Into<String>) -> Self {
        self.options.defaults.file_name = Some(template.into());
        self
    }

    /// Set the default class prefix.
    pub fn class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.defaults.class_prefix = Some(prefix.into());
        self
    }

    /// Set the default base selector.
    pub fn base_selector(mut self, selector: impl Into<String>) -> Self {
        self.options.defaults.base_selector = Some(selector.into());
        self
    }

    /// Set the default formats.
    pub fn types(mut self, types: impl IntoIterator<Item = FontFormat>) -> Self {
        self.options.defaults.types = Some(types.into_iter().collect());
        self
    }

    /// Inline fonts by default.
    pub fn embed(mut self, embed: bool) -> Self {
        self.options.defaults.embed = Some(embed);
        self
    }

    /// Replace all default settings at once.
    pub fn defaults(mut self, settings: FontSettings) -> Self {
        self.options.defaults = settings;
        self
    }

    /// Finish the options.
    pub fn build(self) -> BuildOptions {
        self.options
    }
}
