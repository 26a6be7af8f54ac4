//! Font asset publishing.
//!
//! For each format in plan order:
//!
//! ```text
//! template ──substitute──▶ file name ──embed?──┬─ no ─▶ host.interpolate_name ─▶ emit ─▶ URL
//!                                              └─ yes ─▶ data:<mime>;charset=utf-8;base64,...
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use url::Url;

use crate::error::{Error, Result};
use crate::format::FontFormat;
use crate::hash::hash_files;
use crate::host::BuildHost;
use crate::plan::{DEFAULT_PUBLIC_PATH, GenerationPlan};
use crate::raster::{RasterOutput, UrlMap};
use crate::stylesheet::write_file;

// =============================================================================
// File Name Template
// =============================================================================

/// Output file name template with `[chunkhash]`, `[fontname]` and `[ext]`.
///
/// Only the first occurrence of each token is substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNameTemplate<'a>(&'a str);

impl<'a> FileNameTemplate<'a> {
    /// Cache-bust token.
    pub const CHUNKHASH: &'static str = "[chunkhash]";
    /// Font name token.
    pub const FONTNAME: &'static str = "[fontname]";
    /// Extension token.
    pub const EXT: &'static str = "[ext]";

    /// Wrap a template string.
    pub fn new(template: &'a str) -> Self {
        Self(template)
    }

    /// Check if the cache-bust token is present.
    pub fn needs_hash(&self) -> bool {
        self.0.contains(Self::CHUNKHASH)
    }

    /// Substitute all tokens.
    pub fn render(&self, chunkhash: &str, font_name: &str, format: FontFormat) -> String {
        self.0
            .replacen(Self::CHUNKHASH, chunkhash, 1)
            .replacen(Self::FONTNAME, font_name, 1)
            .replacen(Self::EXT, format.extension(), 1)
    }
}

// =============================================================================
// Outputs
// =============================================================================

/// Where a published font can be loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    /// Emitted file with its public URL.
    Url(String),
    /// Inline data URI.
    DataUri(String),
}

impl AssetLocation {
    /// The URL or data URI as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Url(s) | Self::DataUri(s) => s,
        }
    }
}

/// One published font format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOutput {
    /// The format.
    pub format: FontFormat,
    /// Font binary.
    pub blob: Vec<u8>,
    /// Emitted file name; `None` when embedded.
    pub file_name: Option<String>,
    /// URL or data URI.
    pub location: AssetLocation,
}

impl FormatOutput {
    /// Public URL, if the font was emitted.
    pub fn url(&self) -> Option<&str> {
        match &self.location {
            AssetLocation::Url(url) => Some(url),
            AssetLocation::DataUri(_) => None,
        }
    }

    /// Data URI, if the font was embedded.
    pub fn data_uri(&self) -> Option<&str> {
        match &self.location {
            AssetLocation::DataUri(uri) => Some(uri),
            AssetLocation::Url(_) => None,
        }
    }
}

/// Encode a font as a base64 data URI.
pub fn data_uri(format: FontFormat, blob: &[u8]) -> String {
    format!(
        "data:{};charset=utf-8;base64,{}",
        format.mime_type(),
        STANDARD.encode(blob)
    )
}

/// Origin used to resolve root-relative bases; stripped from the result.
const PATH_ORIGIN: &str = "http://path.invalid";

/// Resolve `name` against a public base path with relative-URL rules.
///
/// Absolute (`https://cdn/fonts/`), protocol-relative (`//cdn/fonts/`) and
/// root-relative (`/assets/`) bases are joined like a browser would: `name`
/// replaces the last path segment, `..` segments are collapsed, and
/// absolute or root-relative names win. A relative base such as `assets/`
/// only has its last segment replaced.
pub fn resolve_public_url(base: &str, name: &str) -> String {
    if let Ok(base) = Url::parse(base) {
        return join_url(&base, name, "");
    }
    if name.starts_with("//") {
        return name.to_string();
    }
    if let Some(authority) = base.strip_prefix("//") {
        return match Url::parse(&format!("http://{authority}")) {
            Ok(base) => join_url(&base, name, "http:"),
            Err(_) => name.to_string(),
        };
    }
    if base.starts_with('/') {
        return match Url::parse(PATH_ORIGIN).and_then(|origin| origin.join(base)) {
            Ok(base) => join_url(&base, name, PATH_ORIGIN),
            Err(_) => name.to_string(),
        };
    }
    if name.starts_with('/') || Url::parse(name).is_ok() {
        return name.to_string();
    }
    match base.rfind('/') {
        Some(idx) => format!("{}{name}", &base[..=idx]),
        None => name.to_string(),
    }
}

/// Join `name` onto `base`, dropping `strip` from the front when the result
/// stayed on the same origin.
fn join_url(base: &Url, name: &str, strip: &str) -> String {
    match base.join(name) {
        Ok(joined) if joined.origin() == base.origin() => {
            let joined = joined.as_str();
            joined.strip_prefix(strip).unwrap_or(joined).to_string()
        }
        Ok(joined) => joined.into(),
        Err(_) => name.to_string(),
    }
}

// =============================================================================
// Publishing
// =============================================================================

/// Publish every requested format and collect the URL map.
///
/// The `[chunkhash]` value is only computed when the template uses it.
pub fn publish_assets<H: BuildHost + ?Sized>(
    plan: &GenerationPlan,
    raster: &RasterOutput,
    host: &mut H,
) -> Result<(Vec<FormatOutput>, UrlMap)> {
    let template = FileNameTemplate::new(&plan.output.file_name);
    let chunkhash = if template.needs_hash() {
        hash_files(&plan.files, Some(plan.output.hash_length))?
    } else {
        String::new()
    };
    let public_path = plan
        .output
        .public_path
        .as_deref()
        .filter(|path| !path.is_empty())
        .or_else(|| host.public_path().filter(|path| !path.is_empty()))
        .unwrap_or(DEFAULT_PUBLIC_PATH)
        .to_string();

    let mut outputs = Vec::with_capacity(plan.types.len());
    let mut urls = UrlMap::new();

    for &format in &plan.types {
        let blob = raster.font(format)?;
        let file_name = template.render(&chunkhash, &plan.font_name, format);

        if plan.output.write_files {
            let dest = plan.context.join(&file_name);
            write_file(&dest, blob).map_err(|e| Error::io(&dest, e))?;
        }

        let output = if plan.output.embed {
            FormatOutput {
                format,
                blob: blob.to_vec(),
                file_name: None,
                location: AssetLocation::DataUri(data_uri(format, blob)),
            }
        } else {
            let name = host.interpolate_name(&file_name, blob).replace('\\', "/");
            host.emit_file(&name, blob);
            let url = resolve_public_url(&public_path, &name);
            log::debug!("emitted {name} ({} bytes) at {url}", blob.len());
            FormatOutput {
                format,
                blob: blob.to_vec(),
                file_name: Some(name),
                location: AssetLocation::Url(url),
            }
        };

        urls.insert(format, output.location.as_str().to_string());
        outputs.push(output);
    }

    Ok((outputs, urls))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildOptions, FontConfig};
    use crate::error::BoxError;
    use crate::host::MemoryHost;
    use crate::resolve::ResolvedFileSet;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn raster(formats: &[FontFormat]) -> RasterOutput {
        RasterOutput {
            fonts: formats
                .iter()
                .map(|f| (*f, format!("{f}-bytes").into_bytes()))
                .collect(),
            codepoints: BTreeMap::new(),
            css: Box::new(|_: &UrlMap| Ok::<_, BoxError>(String::new())),
        }
    }

    fn plan(options: &BuildOptions, config: &FontConfig, files: Vec<PathBuf>, context: &Path) -> GenerationPlan {
        let resolved = ResolvedFileSet {
            files,
            ..Default::default()
        };
        GenerationPlan::merge(options, config, &resolved, context)
    }

    #[test]
    fn test_template_first_occurrence_only() {
        let template = FileNameTemplate::new("[fontname]-[fontname].[ext]");
        assert_eq!(template.render("", "icons", FontFormat::Ttf), "icons-[fontname].ttf");
        assert!(!template.needs_hash());
        assert!(FileNameTemplate::new("[chunkhash].[ext]").needs_hash());
    }

    #[test]
    fn test_resolve_public_url() {
        assert_eq!(resolve_public_url("/assets/", "icons.ttf"), "/assets/icons.ttf");
        assert_eq!(resolve_public_url("/", "icons.ttf"), "/icons.ttf");
        assert_eq!(resolve_public_url("/assets/x", "icons.ttf"), "/assets/icons.ttf");
        assert_eq!(
            resolve_public_url("https://cdn.example.com/f/", "a/icons.ttf"),
            "https://cdn.example.com/f/a/icons.ttf"
        );
        assert_eq!(resolve_public_url("/assets/", "/abs.ttf"), "/abs.ttf");
        assert_eq!(resolve_public_url("", "icons.ttf"), "icons.ttf");
        assert_eq!(resolve_public_url("assets/", "icons.ttf"), "assets/icons.ttf");
    }

    #[test]
    fn test_resolve_public_url_authority_only() {
        assert_eq!(
            resolve_public_url("https://cdn.example.com", "icons.ttf"),
            "https://cdn.example.com/icons.ttf"
        );
        assert_eq!(
            resolve_public_url("//cdn.example.com", "icons.ttf"),
            "//cdn.example.com/icons.ttf"
        );
        assert_eq!(
            resolve_public_url("//cdn.example.com/fonts/", "icons.ttf"),
            "//cdn.example.com/fonts/icons.ttf"
        );
        assert_eq!(
            resolve_public_url("https://cdn.example.com/f/", "/abs.ttf"),
            "https://cdn.example.com/abs.ttf"
        );
        assert_eq!(
            resolve_public_url("https://cdn.example.com/f/", "//other.example.com/x.ttf"),
            "https://other.example.com/x.ttf"
        );
    }

    #[test]
    fn test_resolve_public_url_parent_segments() {
        assert_eq!(resolve_public_url("/assets/", "../x.ttf"), "/x.ttf");
        assert_eq!(resolve_public_url("/a/b/", "../fonts/x.ttf"), "/a/fonts/x.ttf");
        assert_eq!(
            resolve_public_url("https://cdn.example.com/f/", "../x.ttf"),
            "https://cdn.example.com/x.ttf"
        );
        assert_eq!(
            resolve_public_url("/assets/", "https://other.example.com/x.ttf"),
            "https://other.example.com/x.ttf"
        );
        assert_eq!(
            resolve_public_url("//cdn.example.com/f/", "//other.example.com/x.ttf"),
            "//other.example.com/x.ttf"
        );
    }

    #[test]
    fn test_empty_public_path_falls_back() {
        let options = BuildOptions::builder().public_path("").build();
        let config = FontConfig::builder()
            .font_name("icons")
            .file_name("[fontname].[ext]")
            .types([FontFormat::Ttf])
            .build();
        let plan = plan(&options, &config, vec!["/unit/a.svg".into()], Path::new("/unit"));

        let mut host = MemoryHost::new("/unit");
        let (outputs, _) = publish_assets(&plan, &raster(&[FontFormat::Ttf]), &mut host).unwrap();
        assert_eq!(outputs[0].url(), Some("/icons.ttf"));

        let mut host = MemoryHost::new("/unit").with_public_path("");
        let (outputs, _) = publish_assets(&plan, &raster(&[FontFormat::Ttf]), &mut host).unwrap();
        assert_eq!(outputs[0].url(), Some("/icons.ttf"));

        let mut host = MemoryHost::new("/unit").with_public_path("/static/");
        let (outputs, _) = publish_assets(&plan, &raster(&[FontFormat::Ttf]), &mut host).unwrap();
        assert_eq!(outputs[0].url(), Some("/static/icons.ttf"));
    }

    #[test]
    fn test_emit_mode_url() {
        let options = BuildOptions::builder().public_path("/assets/").build();
        let config = FontConfig::builder()
            .font_name("icons")
            .file_name("[fontname].[ext]")
            .types([FontFormat::Ttf])
            .build();
        let plan = plan(&options, &config, vec!["/unit/a.svg".into()], Path::new("/unit"));
        let mut host = MemoryHost::new("/unit");

        let (outputs, urls) = publish_assets(&plan, &raster(&[FontFormat::Ttf]), &mut host).unwrap();

        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].file_name.as_deref(), Some("icons.ttf"));
        assert_eq!(outputs[0].url(), Some("/assets/icons.ttf"));
        assert!(outputs[0].data_uri().is_none());
        assert_eq!(urls[&FontFormat::Ttf], "/assets/icons.ttf");
        assert_eq!(host.store().get("icons.ttf").unwrap(), b"ttf-bytes");
    }

    #[test]
    fn test_embed_mode_data_uri() {
        let config = FontConfig::builder()
            .file_name("[fontname].[ext]")
            .types([FontFormat::Woff])
            .embed(true)
            .build();
        let plan = plan(&BuildOptions::default(), &config, vec!["/unit/a.svg".into()], Path::new("/unit"));
        let mut host = MemoryHost::new("/unit");

        let (outputs, urls) = publish_assets(&plan, &raster(&[FontFormat::Woff]), &mut host).unwrap();

        assert!(host.store().is_empty());
        let uri = outputs[0].data_uri().unwrap();
        let prefix = "data:application/font-woff;charset=utf-8;base64,";
        assert!(uri.starts_with(prefix));
        let decoded = STANDARD.decode(&uri[prefix.len()..]).unwrap();
        assert_eq!(decoded, b"woff-bytes");
        assert_eq!(urls[&FontFormat::Woff], uri);
        assert!(outputs[0].file_name.is_none());
    }

    #[test]
    fn test_chunkhash_from_sources() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.svg");
        fs::write(&a, "<svg/>").unwrap();

        let options = BuildOptions::builder().hash_length(8).build();
        let config = FontConfig::builder().font_name("icons").types([FontFormat::Woff2]).build();
        let plan = plan(&options, &config, vec![a.clone()], dir.path());
        let mut host = MemoryHost::new(dir.path());

        let (outputs, _) = publish_assets(&plan, &raster(&[FontFormat::Woff2]), &mut host).unwrap();
        let expected = format!("{}-icons.woff2", hash_files(&[&a], Some(8)).unwrap());
        assert_eq!(outputs[0].file_name.as_deref(), Some(expected.as_str()));
        assert_eq!(outputs[0].url(), Some(format!("/{expected}").as_str()));
    }

    #[test]
    fn test_host_public_path_and_interpolation() {
        let config = FontConfig::builder()
            .file_name("fonts/[fontname].[contenthash:6].[ext]")
            .font_name("i")
            .types([FontFormat::Svg])
            .build();
        let plan = plan(&BuildOptions::default(), &config, vec!["/u/a.svg".into()], Path::new("/u"));
        let mut host = MemoryHost::new("/u").with_public_path("/static/");

        let (outputs, _) = publish_assets(&plan, &raster(&[FontFormat::Svg]), &mut host).unwrap();
        let name = outputs[0].file_name.clone().unwrap();
        assert!(name.starts_with("fonts/i."));
        assert!(name.ends_with(".svg"));
        assert_eq!(name.len(), "fonts/i.".len() + 6 + ".svg".len());
        assert_eq!(outputs[0].url(), Some(format!("/static/{name}").as_str()));
    }

    #[test]
    fn test_write_files() {
        let dir = TempDir::new().unwrap();
        let config = FontConfig::builder()
            .file_name("out/[fontname].[ext]")
            .font_name("icons")
            .types([FontFormat::Ttf, FontFormat::Woff])
            .write_files(true)
            .embed(true)
            .build();
        let plan = plan(&BuildOptions::default(), &config, vec![dir.path().join("a.svg")], dir.path());
        let mut host = MemoryHost::new(dir.path());

        publish_assets(&plan, &raster(&[FontFormat::Ttf, FontFormat::Woff]), &mut host).unwrap();
        assert_eq!(fs::read(dir.path().join("out/icons.ttf")).unwrap(), b"ttf-bytes");
        assert_eq!(fs::read(dir.path().join("out/icons.woff")).unwrap(), b"woff-bytes");
    }

    #[test]
    fn test_format_order_follows_plan() {
        let config = FontConfig::builder()
            .file_name("[fontname].[ext]")
            .types([FontFormat::Woff2, FontFormat::Eot])
            .build();
        let plan = plan(&BuildOptions::default(), &config, vec!["/u/a.svg".into()], Path::new("/u"));
        let mut host = MemoryHost::new("/u");

        let (outputs, _) =
            publish_assets(&plan, &raster(&[FontFormat::Eot, FontFormat::Woff2]), &mut host).unwrap();
        let formats: Vec<_> = outputs.iter().map(|o| o.format).collect();
        assert_eq!(formats, [FontFormat::Woff2, FontFormat::Eot]);
    }
}
