//! Secondary stylesheet rendering.
//!
//! Renders a Handlebars template (built-in SCSS by default) against the font
//! name and codepoint table, then writes it to the configured destination.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::plan::SecondaryStylesheet;

/// Built-in secondary stylesheet template.
pub const DEFAULT_SCSS_TEMPLATE: &str = include_str!("../templates/scss.hbs");

/// Template context for the secondary stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StylesheetContext {
    /// Font family name.
    pub font_name: String,
    /// Glyph name → lowercase hex codepoint, without prefix.
    pub codepoints: BTreeMap<String, String>,
}

impl StylesheetContext {
    /// Build a context from integer codepoints.
    pub fn new(font_name: impl Into<String>, codepoints: &BTreeMap<String, u32>) -> Self {
        Self {
            font_name: font_name.into(),
            codepoints: codepoints
                .iter()
                .map(|(name, cp)| (name.clone(), format!("{cp:x}")))
                .collect(),
        }
    }
}

/// Render a Handlebars template without HTML escaping.
pub(crate) fn render_template<T: Serialize>(source: &str, ctx: &T) -> Result<String> {
    let mut registry = Handlebars::new();
    registry.register_escape_fn(handlebars::no_escape);
    Ok(registry.render_template(source, ctx)?)
}

/// Read a template file, mapping failures to [`Error::TemplateIo`].
pub(crate) fn read_template(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::template_io(path, e))
}

/// Render the secondary stylesheet text.
///
/// `template` overrides the built-in template.
pub fn render_stylesheet(template: Option<&Path>, ctx: &StylesheetContext) -> Result<String> {
    match template {
        Some(path) => render_template(&read_template(path)?, ctx),
        None => render_template(DEFAULT_SCSS_TEMPLATE, ctx),
    }
}

/// Render and write the secondary stylesheet, creating parent directories.
pub fn write_stylesheet(target: &SecondaryStylesheet, ctx: &StylesheetContext) -> Result<()> {
    let text = render_stylesheet(target.template.as_deref(), ctx)?;
    write_file(&target.dest, text.as_bytes()).map_err(|e| Error::template_io(&target.dest, e))?;
    log::debug!("wrote stylesheet {}", target.dest.display());
    Ok(())
}

/// Write `content` to `dest`, creating missing parent directories.
pub(crate) fn write_file(dest: &Path, content: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn context() -> StylesheetContext {
        let mut codepoints = BTreeMap::new();
        codepoints.insert("home".to_string(), 0xF101);
        codepoints.insert("arrow".to_string(), 0xE000);
        StylesheetContext::new("icons", &codepoints)
    }

    #[test]
    fn test_hex_codepoints() {
        let ctx = context();
        assert_eq!(ctx.codepoints["home"], "f101");
        assert_eq!(ctx.codepoints["arrow"], "e000");
    }

    #[test]
    fn test_default_template() {
        let text = render_stylesheet(None, &context()).unwrap();
        assert!(text.contains("$icons-font-family: \"icons\";"));
        assert!(text.contains("\"home\": \"f101\","));
        assert!(text.contains("\"arrow\": \"e000\","));
    }

    #[test]
    fn test_render_is_idempotent() {
        let ctx = context();
        assert_eq!(
            render_stylesheet(None, &ctx).unwrap(),
            render_stylesheet(None, &ctx).unwrap()
        );
    }

    #[test]
    fn test_custom_template_and_nested_dest() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("tpl.hbs");
        fs::write(&template, "{{fontName}}:{{#each codepoints}}{{@key}}={{this}};{{/each}}").unwrap();

        let target = SecondaryStylesheet {
            dest: dir.path().join("out/deep/_icons.scss"),
            template: Some(template),
        };
        write_stylesheet(&target, &context()).unwrap();

        let written = fs::read_to_string(&target.dest).unwrap();
        assert_eq!(written, "icons:arrow=e000;home=f101;");
    }

    #[test]
    fn test_missing_template_is_fatal() {
        let target = SecondaryStylesheet {
            dest: PathBuf::from("/tmp/never-written.scss"),
            template: Some(PathBuf::from("/nonexistent/tpl.hbs")),
        };
        assert!(matches!(
            write_stylesheet(&target, &context()),
            Err(Error::TemplateIo { .. })
        ));
    }

    #[test]
    fn test_malformed_template_keeps_cause() {
        use std::error::Error as _;

        let dir = TempDir::new().unwrap();
        let template = dir.path().join("broken.hbs");
        fs::write(&template, "{{#each codepoints}}{{@key}}").unwrap();

        let err = render_stylesheet(Some(&template), &context()).unwrap_err();
        assert!(matches!(err, Error::Render(_)));
        assert!(err.source().is_some());
    }
}
