//! Merged generation plan.
//!
//! Layers, lowest to highest precedence:
//!
//! ```text
//! hard defaults  <  BuildOptions::defaults  <  FontConfig::settings
//! ```
//!
//! `rename`, `css_template` and `css_fonts_path` come from the unit only.
//! Path-valued fields are resolved against the unit directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::{BuildOptions, FontConfig, FontSettings, Rename};
use crate::format::FontFormat;
use crate::hash::DEFAULT_HASH_LENGTH;
use crate::resolve::{ResolvedFileSet, join_normalized};

/// Default font family name.
pub const DEFAULT_FONT_NAME: &str = "iconfont";
/// Default output font height.
pub const DEFAULT_FONT_HEIGHT: f64 = 1000.0;
/// Default shared icon selector.
pub const DEFAULT_BASE_SELECTOR: &str = ".icon";
/// Default per-glyph class prefix.
pub const DEFAULT_CLASS_PREFIX: &str = "icon-";
/// Default output file name template.
pub const DEFAULT_FILE_NAME: &str = "[chunkhash]-[fontname].[ext]";
/// Default public URL base.
pub const DEFAULT_PUBLIC_PATH: &str = "/";

/// Selector settings consumed by stylesheet templates.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateOptions {
    /// Selector for the shared icon rule.
    pub base_selector: String,
    /// Prefix for per-glyph class names.
    pub class_prefix: String,
}

/// Rasterizer tuning knobs, passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterTuning {
    /// Give every glyph the same advance width.
    pub fixed_width: bool,
    /// Center glyphs horizontally.
    pub center_horizontally: bool,
    /// Scale glyphs to the font height.
    pub normalize: bool,
    /// Coordinate rounding precision.
    pub round: f64,
    /// Font descent.
    pub descent: f64,
}

impl Default for RasterTuning {
    fn default() -> Self {
        Self {
            fixed_width: false,
            center_horizontally: false,
            normalize: false,
            round: 10e12,
            descent: 0.0,
        }
    }
}

/// Secondary stylesheet target.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryStylesheet {
    /// Absolute output path.
    pub dest: PathBuf,
    /// Absolute template path, or `None` for the built-in template.
    pub template: Option<PathBuf>,
}

/// Output naming and placement.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputOptions {
    /// File name template.
    pub file_name: String,
    /// Length of `[chunkhash]`.
    pub hash_length: usize,
    /// Public URL base, if set build-wide. The host's value applies otherwise.
    pub public_path: Option<String>,
    /// Inline fonts as data URIs.
    pub embed: bool,
    /// Also write font binaries under the unit directory.
    pub write_files: bool,
}

/// Fully resolved configuration for one unit.
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    /// Absolute glyph sources, in resolution order.
    pub files: Vec<PathBuf>,
    /// Font family name.
    pub font_name: String,
    /// Formats to generate, in output order.
    pub types: Vec<FontFormat>,
    /// Output font height.
    pub font_height: f64,
    /// Fixed codepoints; the rasterizer assigns the rest.
    pub codepoints: BTreeMap<String, u32>,
    /// Selector settings.
    pub template_options: TemplateOptions,
    /// Per-format rasterizer options.
    pub format_options: Map<String, Value>,
    /// Rasterizer tuning.
    pub tuning: RasterTuning,
    /// Glyph naming strategy.
    pub rename: Rename,
    /// Absolute primary stylesheet template.
    pub css_template: Option<PathBuf>,
    /// Absolute font path for the primary stylesheet.
    pub css_fonts_path: Option<PathBuf>,
    /// Secondary stylesheet, if requested.
    pub stylesheet: Option<SecondaryStylesheet>,
    /// Output naming.
    pub output: OutputOptions,
    /// Unit directory all relative paths were resolved against.
    pub context: PathBuf,
}

impl GenerationPlan {
    /// Merge build-wide options and a unit config into a plan.
    ///
    /// `resolved` supplies the file list; `context` is the unit directory.
    pub fn merge(
        options: &BuildOptions,
        config: &FontConfig,
        resolved: &ResolvedFileSet,
        context: &Path,
    ) -> Self {
        let unit = &config.settings;
        let build = &options.defaults;

        // Unit value, else build-wide value.
        fn pick<'a, T>(
            unit: &'a FontSettings,
            build: &'a FontSettings,
            field: impl Fn(&'a FontSettings) -> Option<&'a T>,
        ) -> Option<&'a T> {
            field(unit).or_else(|| field(build))
        }

        let types = pick(unit, build, |s| s.types.as_ref())
            .cloned()
            .unwrap_or_else(|| FontFormat::ALL.to_vec());
        let resolve = |p: &PathBuf| join_normalized(context, p);

        let stylesheet = pick(unit, build, |s| s.scss_dest.as_ref()).map(|dest| SecondaryStylesheet {
            dest: resolve(dest),
            template: pick(unit, build, |s| s.scss_template.as_ref()).map(resolve),
        });

        let tuning = {
            let defaults = RasterTuning::default();
            RasterTuning {
                fixed_width: unit.fixed_width.or(build.fixed_width).unwrap_or(defaults.fixed_width),
                center_horizontally: unit
                    .center_horizontally
                    .or(build.center_horizontally)
                    .unwrap_or(defaults.center_horizontally),
                normalize: unit.normalize.or(build.normalize).unwrap_or(defaults.normalize),
                round: unit.round.or(build.round).unwrap_or(defaults.round),
                descent: unit.descent.or(build.descent).unwrap_or(defaults.descent),
            }
        };

        let plan = Self {
            files: resolved.files.clone(),
            font_name: pick(unit, build, |s| s.font_name.as_ref())
                .cloned()
                .unwrap_or_else(|| DEFAULT_FONT_NAME.to_string()),
            types,
            font_height: unit
                .font_height
                .or(build.font_height)
                .unwrap_or(DEFAULT_FONT_HEIGHT),
            codepoints: pick(unit, build, |s| s.codepoints.as_ref())
                .cloned()
                .unwrap_or_default(),
            template_options: TemplateOptions {
                base_selector: pick(unit, build, |s| s.base_selector.as_ref())
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_BASE_SELECTOR.to_string()),
                class_prefix: pick(unit, build, |s| s.class_prefix.as_ref())
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_CLASS_PREFIX.to_string()),
            },
            format_options: pick(unit, build, |s| s.format_options.as_ref())
                .cloned()
                .unwrap_or_default(),
            tuning,
            rename: config.rename.clone().unwrap_or_default(),
            css_template: config.css_template.as_ref().map(resolve),
            css_fonts_path: config.css_fonts_path.as_ref().map(resolve),
            stylesheet,
            output: OutputOptions {
                file_name: pick(unit, build, |s| s.file_name.as_ref())
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
                hash_length: options.hash_length.unwrap_or(DEFAULT_HASH_LENGTH),
                public_path: options.public_path.clone(),
                embed: unit.embed.or(build.embed).unwrap_or(false),
                write_files: unit.write_files.or(build.write_files).unwrap_or(false),
            },
            context: context.to_path_buf(),
        };

        log::debug!(
            "plan '{}': {} file(s), formats [{}], embed={}",
            plan.font_name,
            plan.files.len(),
            plan.types.iter().map(|t| t.id()).collect::<Vec<_>>().join(", "),
            plan.output.embed
        );
        plan
    }

    /// Glyph names in file order, computed with the rename strategy.
    pub fn glyph_names(&self) -> Vec<String> {
        self.files.iter().map(|f| self.rename.apply(f)).collect()
    }

    /// Template files the plan reads, for dependency tracking.
    pub fn template_dependencies(&self) -> Vec<&Path> {
        let scss = self.stylesheet.as_ref().and_then(|s| s.template.as_deref());
        [self.css_template.as_deref(), self.css_fonts_path.as_deref(), scss]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Patterns to resolve: the unit's `files`, else the build-wide ones.
pub fn file_patterns<'a>(options: &'a BuildOptions, config: &'a FontConfig) -> &'a [String] {
    config
        .settings
        .files
        .as_deref()
        .or(options.defaults.files.as_deref())
        .unwrap_or(&[])
}
