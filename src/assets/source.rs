use std::{fmt, path::PathBuf, str::FromStr, sync::Arc};

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::{
    error::{StoryframeError, StoryframeResult},
    math::fnv1a64,
};

/// Where an image comes from: a file, an in-memory buffer, or a `data:` URL.
#[derive(Clone, PartialEq, Eq)]
pub enum AssetSource {
    /// Filesystem path (`file://` prefixes are stripped when parsing).
    Path(PathBuf),
    /// RFC 2397 data URL, kept verbatim.
    DataUrl(String),
    /// Already-loaded encoded image bytes.
    Bytes(Arc<[u8]>),
}

impl AssetSource {
    /// Parse a source string the way a host hands it over.
    pub fn parse(s: &str) -> StoryframeResult<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(StoryframeError::validation("asset source must not be empty"));
        }
        if trimmed.starts_with("data:") {
            return Ok(Self::DataUrl(trimmed.to_string()));
        }
        let path = trimmed.strip_prefix("file://").unwrap_or(trimmed);
        Ok(Self::Path(PathBuf::from(path)))
    }

    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Stable identity used to skip reprocessing an already loaded source.
    pub fn cache_key(&self) -> String {
        match self {
            Self::Path(p) => format!("file:{}", p.display()),
            Self::DataUrl(url) => url.clone(),
            Self::Bytes(b) => format!("bytes:{:016x}:{}", fnv1a64(b), b.len()),
        }
    }

    /// Load the encoded image bytes.
    pub fn read_bytes(&self) -> StoryframeResult<Arc<[u8]>> {
        match self {
            Self::Path(p) => {
                let bytes = std::fs::read(p)
                    .with_context(|| format!("read image '{}'", p.display()))?;
                Ok(bytes.into())
            }
            Self::DataUrl(url) => Ok(decode_data_url(url)?.into()),
            Self::Bytes(b) => Ok(Arc::clone(b)),
        }
    }
}

impl FromStr for AssetSource {
    type Err = StoryframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Self::DataUrl(url) => {
                let head: String = url.chars().take(32).collect();
                f.debug_struct("DataUrl")
                    .field("head", &head)
                    .field("len", &url.len())
                    .finish()
            }
            Self::Bytes(b) => f.debug_struct("Bytes").field("len", &b.len()).finish(),
        }
    }
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::DataUrl(url) => write!(f, "data URL ({} bytes)", url.len()),
            Self::Bytes(b) => write!(f, "in-memory image ({} bytes)", b.len()),
        }
    }
}

/// Decode the payload of a `data:[<mime>][;base64],<payload>` URL.
pub fn decode_data_url(url: &str) -> StoryframeResult<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| StoryframeError::decode("data URL must start with 'data:'"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| StoryframeError::decode("data URL is missing the ',' separator"))?;

    if meta.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(cleaned.as_bytes())
            .context("decode base64 data URL payload")?;
        return Ok(bytes);
    }
    // malformed escapes are kept verbatim
    Ok(percent_encoding::percent_decode_str(payload).collect())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
