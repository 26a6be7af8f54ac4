//! Supported font formats.
//!
//! Single source of truth for format identifiers, file extensions, MIME types
//! and CSS `format()` hints, shared by config parsing and asset publishing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A font format the rasterizer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontFormat {
    /// Embedded OpenType.
    Eot,
    /// WOFF 1.0.
    Woff,
    /// WOFF 2.0.
    Woff2,
    /// TrueType.
    Ttf,
    /// SVG font.
    Svg,
}

impl FontFormat {
    /// All formats, in the default generation order.
    pub const ALL: [FontFormat; 5] = [Self::Eot, Self::Woff, Self::Woff2, Self::Ttf, Self::Svg];

    /// Format identifier as used in configs (`"woff2"`).
    pub const fn id(self) -> &'static str {
        match self {
            Self::Eot => "eot",
            Self::Woff => "woff",
            Self::Woff2 => "woff2",
            Self::Ttf => "ttf",
            Self::Svg => "svg",
        }
    }

    /// File extension substituted for `[ext]`.
    ///
    /// Identical to the identifier for every supported format.
    pub const fn extension(self) -> &'static str {
        self.id()
    }

    /// MIME type used for data URIs.
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Eot => "application/vnd.ms-fontobject",
            Self::Svg => "image/svg+xml",
            Self::Ttf => "application/x-font-ttf",
            Self::Woff => "application/font-woff",
            Self::Woff2 => "font/woff2",
        }
    }

    /// Value for the CSS `format()` hint in `@font-face` rules.
    pub const fn css_format(self) -> &'static str {
        match self {
            Self::Eot => "embedded-opentype",
            Self::Woff => "woff",
            Self::Woff2 => "woff2",
            Self::Ttf => "truetype",
            Self::Svg => "svg",
        }
    }
}

impl fmt::Display for FontFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error for an unrecognized format identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown font format '{0}' (expected one of eot, woff, woff2, ttf, svg)")]
pub struct UnknownFormat(pub String);

impl FromStr for FontFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.id() == s)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

impl Serialize for FontFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for FontFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Format list accepting either a single identifier or a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany {
    One(FontFormat),
    Many(Vec<FontFormat>),
}

impl From<OneOrMany> for Vec<FontFormat> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(format) => vec![format],
            OneOrMany::Many(formats) => formats,
        }
    }
}

/// Deserialize `types`, wrapping a lone identifier into a one-element list.
pub(crate) fn deserialize_types<'de, D>(deserializer: D) -> Result<Option<Vec<FontFormat>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<OneOrMany>::deserialize(deserializer).map(|v| v.map(Into::into))
}
