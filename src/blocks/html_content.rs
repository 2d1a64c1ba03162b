//! `html-content`: inline a trusted HTML fragment from disk, unescaped.

use std::path::PathBuf;

use tracing::debug;

use crate::blocks::RenderContext;
use crate::error::{FolioError, FolioResultExt, Result};
use crate::html::block_classes;
use crate::model::{Block, HtmlContentData};
use crate::url::ensure_no_traversal;

/// Where the fragment lives: the path as written, or under `src/` for
/// `content/...` paths that were authored relative to the source root.
pub fn resolve_fragment_path(ctx: &RenderContext, url: &str) -> Result<PathBuf> {
    let relative = url.trim().trim_start_matches('/');
    if relative.is_empty() {
        return Err(FolioError::missing_field("html-content", "url"));
    }
    ensure_no_traversal(relative)?;

    let primary = ctx.site_path(relative);
    if primary.is_file() {
        return Ok(primary);
    }
    if relative.starts_with("content/") {
        let mapped = ctx.site_path("src").join(relative);
        if mapped.is_file() {
            return Ok(mapped);
        }
    }
    Err(FolioError::HtmlContentMissing {
        path: relative.into(),
    })
}

pub fn render_html_content(block: &Block, data: &HtmlContentData, ctx: &RenderContext) -> Result<String> {
    let path = resolve_fragment_path(ctx, &data.url)?;
    debug!(path = %path.display(), "Inlining HTML fragment");
    let fragment = std::fs::read_to_string(&path).with_file_read(&path)?;

    Ok(format!(
        "<div class=\"{}\">{}</div>\n",
        block_classes(&["html-content", "block-html-content"], &block.style),
        fragment.replace("\r\n", "\n")
    ))
}
