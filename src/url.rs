//! URL and asset path resolution.
//!
//! Renderers never know the deployed URL prefix. Every site-relative link is
//! written with the [`BASE_PATH_TOKEN`] placeholder in front, and the build
//! substitutes it once per page after rendering.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{FolioError, Result};

/// Placeholder replaced by the site's deployed prefix after rendering.
pub const BASE_PATH_TOKEN: &str = "{{basePath}}";

static ABSOLUTE_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z\d+\-.]*:").expect("valid regex"));
static UNSAFE_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(javascript|vbscript|data):").expect("valid regex"));
static EXTERNAL_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(https?:|mailto:|tel:)").expect("valid regex"));
static PASSTHROUGH_ASSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(https?://|data:)").expect("valid regex"));

/// Whether a link leaves the site (`//host`, `http(s):`, `mailto:`, `tel:`).
pub fn is_external_url(url: &str) -> bool {
    let value = url.trim();
    if value.is_empty() {
        return false;
    }
    value.starts_with("//") || EXTERNAL_SCHEME.is_match(value)
}

/// Whether a link is a project-relative path that still needs the base-path prefix.
pub fn is_relative_url(url: &str) -> bool {
    let value = url.trim();
    if value.is_empty()
        || value.starts_with("{{")
        || value.starts_with("//")
        || value.starts_with('#')
    {
        return false;
    }
    !ABSOLUTE_SCHEME.is_match(value)
}

/// How [`resolve_href`] treats relative paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Relative {
    /// Prefix with the base-path token
    #[default]
    Site,
    /// Leave as written (the target is known to live elsewhere)
    AsIs,
}

/// Turn an authored href into a safe one.
///
/// Empty input and `javascript:`/`vbscript:`/`data:` schemes produce `default`.
/// Already-prefixed values are returned untouched, so resolving twice never
/// double-prefixes. A relative path with a `..` segment is an error.
pub fn resolve_href(url: &str, default: &str, relative: Relative) -> Result<String> {
    let value = url.trim();
    if value.is_empty() || UNSAFE_SCHEME.is_match(value) {
        return Ok(default.to_string());
    }
    if value.starts_with("{{") {
        return Ok(value.to_string());
    }
    if is_relative_url(value) {
        ensure_no_traversal(path_part(value))?;
        if relative == Relative::Site {
            return Ok(prefix_base_path(value));
        }
    }
    Ok(value.to_string())
}

/// The path of a link, without its query string or fragment.
fn path_part(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

/// Prefix a site path with the base-path token, stripping leading slashes first.
pub fn prefix_base_path(path: &str) -> String {
    let value = path.trim();
    if value.starts_with(BASE_PATH_TOKEN) {
        return value.to_string();
    }
    format!("{BASE_PATH_TOKEN}/{}", value.trim_start_matches('/'))
}

/// Map an authoring-time asset path to its publish-time href.
///
/// Remote URLs, `data:` URIs and placeholder-prefixed values pass through.
/// Everything else loses leading slashes and a `src/` root marker, then gets
/// the base-path token. A `..` segment is an error.
pub fn normalize_asset_src(src: &str) -> Result<String> {
    let value = src.trim();
    if value.is_empty() {
        return Ok(String::new());
    }
    if PASSTHROUGH_ASSET.is_match(value) || value.starts_with("{{") {
        return Ok(value.to_string());
    }
    let stripped = value.trim_start_matches('/');
    let stripped = stripped.strip_prefix("src/").unwrap_or(stripped);
    ensure_no_traversal(path_part(stripped))?;
    Ok(format!("{BASE_PATH_TOKEN}/{stripped}"))
}

/// Reject paths with parent-directory segments.
pub fn ensure_no_traversal(path: &str) -> Result<()> {
    if path.replace('\\', "/").split('/').any(|segment| segment == "..") {
        return Err(FolioError::PathTraversal { path: path.into() });
    }
    Ok(())
}

/// Replace every base-path token in rendered HTML with the real prefix.
pub fn apply_base_path(html: &str, base_path: &str) -> String {
    html.replace(BASE_PATH_TOKEN, &normalize_base_path(base_path))
}

/// `"portfolio/"` and `"/portfolio"` both become `"/portfolio"`; empty stays empty.
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
