use std::path::Path;

use minify_html::{Cfg, minify};

use crate::config::BuildConfig;

/// Whether generated HTML and copied CSS get minified
#[derive(Debug, Clone, Copy)]
pub struct MinifyConfig {
    pub enabled: bool,
}

impl MinifyConfig {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Minify a copied asset in place of its raw bytes, when it is a stylesheet.
    pub fn asset_contents(&self, path: &Path, bytes: Vec<u8>) -> Vec<u8> {
        if !self.enabled || !is_css(path) {
            return bytes;
        }
        match String::from_utf8(bytes) {
            Ok(css) => minify_css_content(&css, self).into_bytes(),
            Err(e) => e.into_bytes(),
        }
    }
}

impl From<&BuildConfig> for MinifyConfig {
    fn from(build: &BuildConfig) -> Self {
        Self::new(build.minify)
    }
}

fn is_css(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("css"))
}

/// Minify a full HTML document. Inline `<script>` bodies are left alone.
pub fn minify_html_content(html: &str, config: &MinifyConfig) -> String {
    if !config.enabled {
        return html.to_string();
    }

    let cfg = Cfg {
        minify_css: true,
        minify_js: false,
        keep_closing_tags: true,
        keep_html_and_head_opening_tags: true,
        ..Cfg::default()
    };

    let minified = minify(html.as_bytes(), &cfg);
    String::from_utf8(minified).unwrap_or_else(|_| html.to_string())
}

/// Minify a stylesheet by running it through the `<style>` path of the HTML minifier.
pub fn minify_css_content(css: &str, config: &MinifyConfig) -> String {
    if !config.enabled {
        return css.to_string();
    }

    let wrapped = format!("<style>{css}</style>");
    let cfg = Cfg {
        minify_css: true,
        ..Cfg::default()
    };

    let minified = minify(wrapped.as_bytes(), &cfg);
    let result = String::from_utf8(minified).unwrap_or_else(|_| css.to_string());

    result
        .strip_prefix("<style>")
        .and_then(|s| s.strip_suffix("</style>"))
        .unwrap_or(&result)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_is_identity() {
        let config = MinifyConfig::new(false);
        let html = "<p>\n  hello   world\n</p>";
        assert_eq!(minify_html_content(html, &config), html);
        assert_eq!(minify_css_content("a { color: red; }", &config), "a { color: red; }");
    }

    #[test]
    fn test_html_whitespace_collapses() {
        let config = MinifyConfig::new(true);
        let html = "<!DOCTYPE html><html><head><title>x</title></head><body><p>\n  hello   world\n</p></body></html>";
        let out = minify_html_content(html, &config);
        assert!(out.len() < html.len());
        assert!(out.contains("hello world"));
    }

    #[test]
    fn test_css_minified() {
        let config = MinifyConfig::new(true);
        let out = minify_css_content("body {\n  color: red;\n}\n", &config);
        assert!(!out.contains('\n'));
        assert!(out.contains("color:red"));
    }

    #[test]
    fn test_asset_contents_only_touches_css() {
        let config = MinifyConfig::from(&BuildConfig::default());
        let js = b"let  x = 1;\n".to_vec();
        assert_eq!(config.asset_contents(Path::new("a/app.js"), js.clone()), js);

        let css = b"a {\n  color: blue;\n}\n".to_vec();
        let out = config.asset_contents(Path::new("a/site.CSS"), css.clone());
        assert!(out.len() < css.len());
    }
}
