//! Default primary stylesheet.
//!
//! Rasterizers that do not render CSS themselves can return a [`DefaultCss`]
//! as their [`CssGenerator`]. It renders the unit's `cssTemplate`, or a
//! built-in `@font-face` template, with this context:
//!
//! | key            | value                                           |
//! |----------------|-------------------------------------------------|
//! | `fontName`     | font family name                                |
//! | `src`          | `url(..) format(..)` list in format order       |
//! | `baseSelector` | shared icon selector                            |
//! | `classPrefix`  | per-glyph class prefix                          |
//! | `fontsPath`    | `cssFontsPath`, if set                          |
//! | `codepoints`   | glyph name → hex codepoint                      |
//! | `glyphs`       | `[{ name, codepoint, content }]`, sorted by name |

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{BoxError, Result};
use crate::format::FontFormat;
use crate::plan::GenerationPlan;
use crate::raster::{CssGenerator, UrlMap};
use crate::stylesheet::{read_template, render_template};

/// Built-in primary stylesheet template.
pub const DEFAULT_CSS_TEMPLATE: &str = include_str!("../templates/css.hbs");

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CssContext<'a> {
    font_name: &'a str,
    src: String,
    base_selector: &'a str,
    class_prefix: &'a str,
    fonts_path: Option<String>,
    codepoints: BTreeMap<&'a str, String>,
    glyphs: Vec<Glyph<'a>>,
}

#[derive(Serialize)]
struct Glyph<'a> {
    name: &'a str,
    codepoint: String,
    content: String,
}

/// Template-driven primary stylesheet generator.
#[derive(Debug, Clone)]
pub struct DefaultCss {
    template: String,
    font_name: String,
    base_selector: String,
    class_prefix: String,
    fonts_path: Option<String>,
    order: Vec<FontFormat>,
    codepoints: BTreeMap<String, u32>,
}

impl DefaultCss {
    /// Prepare a generator for `plan` with the final codepoint table.
    ///
    /// Reads `plan.css_template` eagerly, so a missing template fails here
    /// rather than after fonts were published.
    pub fn new(plan: &GenerationPlan, codepoints: BTreeMap<String, u32>) -> Result<Self> {
        let template = match &plan.css_template {
            Some(path) => read_template(path)?,
            None => DEFAULT_CSS_TEMPLATE.to_string(),
        };
        Ok(Self {
            template,
            font_name: plan.font_name.clone(),
            base_selector: plan.template_options.base_selector.clone(),
            class_prefix: plan.template_options.class_prefix.clone(),
            fonts_path: plan
                .css_fonts_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            order: plan.types.clone(),
            codepoints,
        })
    }

    /// Render the stylesheet for `urls`.
    pub fn render(&self, urls: &UrlMap) -> Result<String> {
        let ctx = CssContext {
            font_name: &self.font_name,
            src: font_src(urls, &self.order, &self.font_name),
            base_selector: &self.base_selector,
            class_prefix: &self.class_prefix,
            fonts_path: self.fonts_path.clone(),
            codepoints: self
                .codepoints
                .iter()
                .map(|(name, cp)| (name.as_str(), format!("{cp:x}")))
                .collect(),
            glyphs: self
                .codepoints
                .iter()
                .map(|(name, cp)| Glyph {
                    name,
                    codepoint: format!("{cp:x}"),
                    content: format!("\\{cp:x}"),
                })
                .collect(),
        };
        render_template(&self.template, &ctx)
    }
}

impl CssGenerator for DefaultCss {
    fn generate_css(&self, urls: &UrlMap) -> Result<String, BoxError> {
        self.render(urls).map_err(Into::into)
    }
}

/// Build the `src` descriptor of an `@font-face` rule.
///
/// Formats missing from `urls` are skipped.
pub fn font_src(urls: &UrlMap, order: &[FontFormat], font_name: &str) -> String {
    order
        .iter()
        .filter_map(|format| {
            let url = urls.get(format)?;
            let url = match format {
                FontFormat::Eot => format!("{url}?#iefix"),
                FontFormat::Svg => format!("{url}#{font_name}"),
                _ => url.clone(),
            };
            Some(format!("url(\"{url}\") format(\"{}\")", format.css_format()))
        })
        .collect::<Vec<_>>()
        .join(",\n\t\t")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildOptions, FontConfig};
    use crate::resolve::ResolvedFileSet;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn plan(config: &FontConfig) -> GenerationPlan {
        GenerationPlan::merge(
            &BuildOptions::default(),
            config,
            &ResolvedFileSet::default(),
            Path::new("/unit"),
        )
    }

    #[test]
    fn test_font_src_order_and_hints() {
        let mut urls = UrlMap::new();
        urls.insert(FontFormat::Woff, "/f.woff".into());
        urls.insert(FontFormat::Eot, "/f.eot".into());
        urls.insert(FontFormat::Svg, "/f.svg".into());

        let src = font_src(&urls, &FontFormat::ALL, "icons");
        assert_eq!(
            src,
            "url(\"/f.eot?#iefix\") format(\"embedded-opentype\"),\n\t\t\
             url(\"/f.woff\") format(\"woff\"),\n\t\t\
             url(\"/f.svg#icons\") format(\"svg\")"
        );
    }

    #[test]
    fn test_default_template() {
        let config = FontConfig::builder().font_name("icons").class_prefix("i-").build();
        let mut codepoints = BTreeMap::new();
        codepoints.insert("home".to_string(), 0xf101);
        let css = DefaultCss::new(&plan(&config), codepoints).unwrap();

        let mut urls = UrlMap::new();
        urls.insert(FontFormat::Woff2, "/icons.woff2".into());
        let text = css.render(&urls).unwrap();

        assert!(text.contains("font-family: \"icons\";"));
        assert!(text.contains("url(\"/icons.woff2\") format(\"woff2\")"));
        assert!(text.contains(".icon:before"));
        assert!(text.contains(".i-home:before"));
        assert!(text.contains("content: \"\\f101\";"));
    }

    #[test]
    fn test_custom_template() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("css.hbs");
        fs::write(&template, "{{fontName}}|{{{src}}}").unwrap();

        let config = FontConfig::builder()
            .font_name("x")
            .css_template(template.to_string_lossy().into_owned())
            .build();
        let css = DefaultCss::new(&plan(&config), BTreeMap::new()).unwrap();

        let mut urls = UrlMap::new();
        urls.insert(FontFormat::Ttf, "a.ttf".into());
        assert_eq!(css.render(&urls).unwrap(), "x|url(\"a.ttf\") format(\"truetype\")");
    }

    #[test]
    fn test_missing_custom_template() {
        let config = FontConfig::builder().css_template("/nonexistent/css.hbs").build();
        assert!(DefaultCss::new(&plan(&config), BTreeMap::new()).is_err());
    }
}
