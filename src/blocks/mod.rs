//! One renderer per block type.
//!
//! Every renderer is a pure function from block data to an HTML fragment.
//! Site-relative URLs are emitted with the `{{basePath}}` token; the build
//! substitutes it after the whole page is rendered.

pub mod chrome;
pub mod form;
pub mod html_content;
pub mod icons;
pub mod layout;
pub mod links;
pub mod listing;
pub mod media;
pub mod orcid;
pub mod text;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::inline::{InlineOptions, format_inline};

/// Filesystem roots for the blocks that read from disk
/// (`html-content`, `content-collection`, `content-carousel`).
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// The site directory (where `config.toml` lives)
    pub site_root: PathBuf,
    /// Content documents, relative to `site_root`
    pub content_dir: PathBuf,
}

impl RenderContext {
    pub fn new(site_root: impl Into<PathBuf>, content_dir: impl Into<PathBuf>) -> Self {
        Self {
            site_root: site_root.into(),
            content_dir: content_dir.into(),
        }
    }

    pub fn content_root(&self) -> PathBuf {
        self.site_root.join(&self.content_dir)
    }

    pub fn site_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.site_root.join(relative)
    }
}

/// Trimmed, non-empty text from an optional field.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `<figcaption>` with label formatting, or nothing.
pub(crate) fn figcaption(caption: Option<&str>) -> Result<String> {
    Ok(non_empty(caption)
        .map(|c| format_inline(c, &InlineOptions::label()))
        .transpose()?
        .map(|c| format!("<figcaption>{c}</figcaption>"))
        .unwrap_or_default())
}

/// ` style="..."` when there is a declaration, otherwise nothing.
pub(crate) fn style_attr(declaration: Option<String>) -> String {
    declaration
        .map(|d| format!(" style=\"{d}\""))
        .unwrap_or_default()
}

/// A finite, strictly positive number.
pub(crate) fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}
