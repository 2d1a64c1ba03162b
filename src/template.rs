//! Page shells.
//!
//! A template is a directory under `templates/<name>/` holding a
//! `template-config.json` manifest, the shell HTML it names, and an `assets/`
//! tree published to `assets/templates/<name>/assets/`. The `default` template
//! ships inside the binary and is used whenever the site doesn't provide its own.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use chrono::{Datelike, Utc};
use include_dir::{Dir, DirEntry, include_dir};
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::blocks::icons::icon_svg;
use crate::config::{ScriptEntry, SiteConfig, TemplatesConfig};
use crate::error::{FolioError, FolioResultExt, Result};
use crate::html::escape_html;
use crate::model::Presentation;
use crate::url::{ensure_no_traversal, normalize_base_path};

static DEFAULT_TEMPLATE: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/src/templates/default");

const MANIFEST_FILE: &str = "template-config.json";
pub const DEFAULT_TEMPLATE_NAME: &str = "default";

static TEMPLATE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("valid regex"));
static HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("valid regex"));

#[derive(Debug, Deserialize)]
struct TemplateManifest {
    html: Option<String>,
    #[serde(default)]
    styles: Vec<String>,
    #[serde(default)]
    scripts: Vec<ScriptEntry>,
}

/// Where a template's files come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// `templates/<name>/` under the site root
    Site(PathBuf),
    /// Compiled into the binary
    Embedded,
}

#[derive(Debug, Clone)]
pub struct TemplateDefinition {
    pub name: String,
    pub source: TemplateSource,
    /// Shell file, relative to the template directory
    pub html_path: String,
    pub html: String,
    pub styles: Vec<String>,
    pub scripts: Vec<ScriptEntry>,
}

/// Template definitions loaded during one build, keyed by name.
#[derive(Debug)]
pub struct TemplateCache {
    template_root: PathBuf,
    default_name: String,
    definitions: BTreeMap<String, Arc<TemplateDefinition>>,
}

impl TemplateCache {
    pub fn new(site_root: &Path, config: &TemplatesConfig) -> Self {
        Self {
            template_root: site_root.join("templates"),
            default_name: config.default.clone(),
            definitions: BTreeMap::new(),
        }
    }

    /// The definition for a page's requested template, or the site default.
    pub fn resolve(&mut self, requested: Option<&str>) -> Result<Arc<TemplateDefinition>> {
        let name = requested
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.default_name);
        let name = validate_name(name)?;

        if let Some(definition) = self.definitions.get(&name) {
            return Ok(Arc::clone(definition));
        }

        let definition = Arc::new(self.load(&name)?);
        debug!(template = %name, source = ?definition.source, "Loaded template");
        self.definitions.insert(name, Arc::clone(&definition));
        Ok(definition)
    }

    /// Every template resolved so far, by name.
    pub fn used(&self) -> impl Iterator<Item = &TemplateDefinition> {
        self.definitions.values().map(Arc::as_ref)
    }

    fn load(&self, name: &str) -> Result<TemplateDefinition> {
        let dir = self.template_root.join(name);
        let manifest_path = dir.join(MANIFEST_FILE);

        if manifest_path.exists() {
            let content = std::fs::read_to_string(&manifest_path).with_file_read(&manifest_path)?;
            let (html_path, manifest) = parse_manifest(&manifest_path, &content)?;
            let html_file = dir.join(&html_path);
            let html = std::fs::read_to_string(&html_file).with_file_read(&html_file)?;
            return Ok(TemplateDefinition {
                name: name.to_string(),
                source: TemplateSource::Site(dir),
                html_path,
                html,
                styles: manifest.styles,
                scripts: manifest.scripts,
            });
        }

        if name == DEFAULT_TEMPLATE_NAME {
            return embedded_default(&manifest_path);
        }

        Err(FolioError::TemplateNotFound {
            name: name.into(),
            expected: (&manifest_path).into(),
        })
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if TEMPLATE_NAME.is_match(name) {
        Ok(name.to_string())
    } else {
        Err(FolioError::InvalidTemplateName { name: name.into() })
    }
}

fn parse_manifest(path: &Path, content: &str) -> Result<(String, TemplateManifest)> {
    let manifest: TemplateManifest =
        serde_json::from_str(content).map_err(|e| FolioError::TemplateConfig {
            path: path.into(),
            reason: e.to_string(),
        })?;
    let html = manifest
        .html
        .as_deref()
        .map(str::trim)
        .filter(|html| !html.is_empty())
        .ok_or_else(|| FolioError::TemplateConfig {
            path: path.into(),
            reason: "the required `html` entry is missing".to_string(),
        })?;
    let html_path = relative_template_path(html).map_err(|reason| FolioError::TemplateConfig {
        path: path.into(),
        reason,
    })?;
    Ok((html_path, manifest))
}

fn embedded_default(expected: &Path) -> Result<TemplateDefinition> {
    let not_found = || FolioError::TemplateNotFound {
        name: DEFAULT_TEMPLATE_NAME.into(),
        expected: expected.into(),
    };
    let manifest_path = Path::new("templates/default").join(MANIFEST_FILE);
    let content = DEFAULT_TEMPLATE
        .get_file(MANIFEST_FILE)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(not_found)?;
    let (html_path, manifest) = parse_manifest(&manifest_path, content)?;
    let html = DEFAULT_TEMPLATE
        .get_file(&html_path)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(not_found)?;

    Ok(TemplateDefinition {
        name: DEFAULT_TEMPLATE_NAME.to_string(),
        source: TemplateSource::Embedded,
        html_path,
        html: html.to_string(),
        styles: manifest.styles,
        scripts: manifest.scripts,
    })
}

/// Template-internal paths stay inside the template directory.
fn relative_template_path(path: &str) -> std::result::Result<String, String> {
    let normalized = path.trim().replace('\\', "/");
    if normalized.is_empty() || ensure_no_traversal(&normalized).is_err() {
        return Err(format!("\"{path}\" isn't a valid template path"));
    }
    if normalized.starts_with('/') {
        return Err(format!("template paths must be relative, got \"{path}\""));
    }
    Ok(normalized)
}

impl TemplateDefinition {
    fn label(&self) -> String {
        format!("templates/{}/{}", self.name, self.html_path)
    }

    /// Href for a style or script listed in the manifest.
    fn asset_href(&self, path: &str, base_path: &str) -> Result<String> {
        let normalized = path.trim().replace('\\', "/");
        if HTTP_URL.is_match(&normalized) || normalized.starts_with('/') {
            return asset_href(&normalized, base_path);
        }
        let relative = relative_template_path(&normalized).map_err(|_| FolioError::PathTraversal {
            path: path.into(),
        })?;
        asset_href(&format!("assets/templates/{}/{relative}", self.name), base_path)
    }

    /// Render the shell around a page.
    pub fn render(&self, context: &ShellContext<'_>) -> Result<String> {
        let label = self.label();
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_undefined_behavior(UndefinedBehavior::Lenient);

        env.add_template(&label, &self.html)
            .map_err(|e| FolioError::template_render(&label, &self.html, &e))?;
        let template = env
            .get_template(&label)
            .map_err(|e| FolioError::template_render(&label, &self.html, &e))?;
        template
            .render(context)
            .map_err(|e| FolioError::template_render(&label, &self.html, &e))
    }

    /// Publish this template's `assets/` tree into the output directory.
    pub async fn copy_assets(&self, output_root: &Path) -> Result<usize> {
        let target = output_root
            .join("assets")
            .join("templates")
            .join(&self.name)
            .join("assets");
        match &self.source {
            TemplateSource::Site(dir) => copy_tree(&dir.join("assets"), &target).await,
            TemplateSource::Embedded => match DEFAULT_TEMPLATE.get_dir("assets") {
                Some(assets) => extract_dir(assets, &target).await,
                None => Ok(0),
            },
        }
    }
}

/// Publish-time href for a site asset path. Remote URLs pass through.
pub fn asset_href(path: &str, base_path: &str) -> Result<String> {
    let normalized = path.trim().replace('\\', "/");
    ensure_no_traversal(&normalized)?;
    if HTTP_URL.is_match(&normalized) {
        return Ok(normalized);
    }
    let base = normalize_base_path(base_path);
    if normalized.starts_with('/') {
        Ok(format!("{base}{normalized}"))
    } else {
        Ok(format!("{base}/{normalized}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub src: String,
    pub module: bool,
}

/// Stylesheets and scripts for one page, in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageAssets {
    pub stylesheets: Vec<String>,
    pub scripts: Vec<ScriptTag>,
}

impl PageAssets {
    /// Template entries first, then site-wide custom assets, then the page's extras.
    pub fn resolve(
        template: &TemplateDefinition,
        config: &SiteConfig,
        presentation: &Presentation,
        base_path: &str,
    ) -> Result<Self> {
        let mut assets = PageAssets::default();
        let mut seen_styles = HashSet::new();
        let mut seen_scripts = HashSet::new();

        let mut add_style = |href: String, assets: &mut PageAssets| {
            if seen_styles.insert(href.clone()) {
                assets.stylesheets.push(href);
            }
        };
        for style in template.styles.iter().filter(|s| !s.trim().is_empty()) {
            add_style(template.asset_href(style, base_path)?, &mut assets);
        }
        for style in config
            .custom
            .styles
            .iter()
            .chain(&presentation.extra_styles)
            .filter(|s| !s.trim().is_empty())
        {
            add_style(asset_href(style, base_path)?, &mut assets);
        }

        let mut add_script = |tag: ScriptTag, assets: &mut PageAssets| {
            if seen_scripts.insert((tag.src.clone(), tag.module)) {
                assets.scripts.push(tag);
            }
        };
        for entry in template.scripts.iter().filter(|e| !e.src().trim().is_empty()) {
            let src = template.asset_href(entry.src(), base_path)?;
            add_script(ScriptTag { src, module: entry.is_module() }, &mut assets);
        }
        for entry in config
            .custom
            .scripts
            .iter()
            .chain(&presentation.extra_scripts)
            .filter(|e| !e.src().trim().is_empty())
        {
            let src = asset_href(entry.src(), base_path)?;
            add_script(ScriptTag { src, module: entry.is_module() }, &mut assets);
        }

        Ok(assets)
    }

    pub fn stylesheet_tags(&self) -> String {
        self.stylesheets
            .iter()
            .map(|href| format!("  <link rel=\"stylesheet\" href=\"{}\" />", escape_html(href)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn script_tags(&self) -> String {
        self.scripts
            .iter()
            .map(|tag| {
                let kind = if tag.module { "module" } else { "text/javascript" };
                format!("<script type=\"{kind}\" src=\"{}\"></script>", escape_html(&tag.src))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Shell values shared by every page of a build.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteChrome {
    pub base_path: String,
    pub site_title: String,
    pub favicon_href: String,
    pub logo_src: String,
    pub logo_alt: String,
    pub navigation: String,
    pub year: i32,
    pub last_modified: String,
    pub footer_social_links: String,
    pub footer_contact_summary: String,
}

impl SiteChrome {
    pub fn new(config: &SiteConfig, base_path: &str, navigation: String) -> Result<Self> {
        let branding = &config.site.branding;
        let today = Utc::now().date_naive();
        Ok(Self {
            base_path: normalize_base_path(base_path),
            site_title: config.site.title.clone(),
            favicon_href: escape_html(&asset_href(&branding.favicon, base_path)?),
            logo_src: escape_html(&asset_href(&branding.logo_src, base_path)?),
            logo_alt: escape_html(&config.logo_alt()),
            navigation,
            year: today.year(),
            last_modified: today.format("%Y-%m-%d").to_string(),
            footer_social_links: footer_social_links(config),
            footer_contact_summary: footer_contact_summary(config),
        })
    }
}

/// Everything a shell template can reference.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellContext<'a> {
    #[serde(flatten)]
    pub chrome: &'a SiteChrome,
    pub title: String,
    pub breadcrumb: String,
    pub content: String,
    pub related_pages: String,
    pub stylesheets: String,
    pub scripts: String,
    pub body_class: String,
    pub language: String,
    pub head_meta: String,
}

/// Icon links to the configured social profiles.
pub fn footer_social_links(config: &SiteConfig) -> String {
    config
        .site
        .contact
        .socials
        .iter()
        .map(|social| {
            let label = [social.label.trim(), social.key.trim()]
                .into_iter()
                .find(|l| !l.is_empty())
                .unwrap_or("Social");
            let href = if social.url.trim().is_empty() { "#" } else { social.url.trim() };
            format!(
                "<a class=\"footer-social-link\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" aria-label=\"{}\">{}</a>",
                escape_html(href),
                escape_html(label),
                icon_svg(&social.key)
            )
        })
        .collect()
}

/// Institutional email and phone numbers, separated by `|`.
pub fn footer_contact_summary(config: &SiteConfig) -> String {
    let contact = &config.site.contact;
    let mut parts = Vec::new();
    let email = contact.emails.institutional.trim();
    if !email.is_empty() {
        let email = escape_html(email);
        parts.push(format!("<a href=\"mailto:{email}\">{email}</a>"));
    }
    for phone in &contact.phones {
        let tel: String = phone.split_whitespace().collect();
        if tel.is_empty() {
            continue;
        }
        parts.push(format!(
            "<a href=\"tel:{}\">{}</a>",
            escape_html(&tel),
            escape_html(phone)
        ));
    }
    parts.join(" | ")
}

async fn copy_tree(source: &Path, target: &Path) -> Result<usize> {
    if !source.is_dir() {
        return Ok(0);
    }
    let mut count = 0;
    for entry in WalkDir::new(source)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let relative = path.strip_prefix(source).unwrap_or(path);
        let dest = target.join(relative);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FolioError::CreateDir {
                    path: parent.into(),
                    cause: e,
                })?;
        }
        tokio::fs::copy(path, &dest)
            .await
            .map_err(|e| FolioError::CopyFile {
                src: path.into(),
                dest: (&dest).into(),
                cause: e,
            })?;
        count += 1;
    }
    Ok(count)
}

async fn extract_dir(dir: &Dir<'_>, target: &Path) -> Result<usize> {
    tokio::fs::create_dir_all(target)
        .await
        .map_err(|e| FolioError::CreateDir {
            path: target.into(),
            cause: e,
        })?;

    let mut count = 0;
    for entry in dir.entries() {
        let Some(file_name) = entry.path().file_name() else {
            continue;
        };
        let dest = target.join(file_name);
        match entry {
            DirEntry::Dir(subdir) => {
                count += Box::pin(extract_dir(subdir, &dest)).await?;
            }
            DirEntry::File(file) => {
                tokio::fs::write(&dest, file.contents())
                    .await
                    .map_err(|e| FolioError::FileWrite {
                        path: (&dest).into(),
                        cause: e,
                    })?;
                count += 1;
            }
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config(toml: &str) -> SiteConfig {
        SiteConfig::parse(Path::new("config.toml"), toml).unwrap()
    }

    fn site_template(root: &Path, name: &str, manifest: &str, html: &str) {
        let dir = root.join("templates").join(name);
        fs::create_dir_all(dir.join("assets/css")).unwrap();
        fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
        fs::write(dir.join("shell.html"), html).unwrap();
        fs::write(dir.join("assets/css/theme.css"), "body { color: red; }").unwrap();
    }

    #[test]
    fn test_embedded_default_template() {
        let dir = TempDir::new().unwrap();
        let mut cache = TemplateCache::new(dir.path(), &TemplatesConfig::default());
        let template = cache.resolve(None).unwrap();
        assert_eq!(template.name, "default");
        assert_eq!(template.source, TemplateSource::Embedded);
        assert!(template.html.contains("{{ content }}"));
        assert!(!template.styles.is_empty());
    }

    #[test]
    fn test_site_template_is_cached() {
        let dir = TempDir::new().unwrap();
        site_template(
            dir.path(),
            "minimal",
            r#"{ "html": "shell.html", "styles": ["assets/css/theme.css"] }"#,
            "<title>{{ title }}</title>",
        );
        let mut cache = TemplateCache::new(dir.path(), &TemplatesConfig::default());
        let first = cache.resolve(Some("minimal")).unwrap();
        let second = cache.resolve(Some(" minimal ")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.used().count(), 1);
        assert!(matches!(first.source, TemplateSource::Site(_)));
    }

    #[test]
    fn test_template_errors() {
        let dir = TempDir::new().unwrap();
        let mut cache = TemplateCache::new(dir.path(), &TemplatesConfig::default());
        assert!(matches!(
            cache.resolve(Some("Bad_Name")).unwrap_err(),
            FolioError::InvalidTemplateName { .. }
        ));
        assert!(matches!(
            cache.resolve(Some("missing")).unwrap_err(),
            FolioError::TemplateNotFound { .. }
        ));

        site_template(dir.path(), "nohtml", r#"{ "styles": [] }"#, "");
        assert!(matches!(
            cache.resolve(Some("nohtml")).unwrap_err(),
            FolioError::TemplateConfig { .. }
        ));
        site_template(dir.path(), "escape", r#"{ "html": "../shell.html" }"#, "");
        assert!(matches!(
            cache.resolve(Some("escape")).unwrap_err(),
            FolioError::TemplateConfig { .. }
        ));
    }

    #[test]
    fn test_page_assets_order_and_dedup() {
        let dir = TempDir::new().unwrap();
        site_template(
            dir.path(),
            "minimal",
            r#"{ "html": "shell.html", "styles": ["assets/css/theme.css", "https://cdn.example/x.css"], "scripts": [{ "src": "assets/js/app.js", "module": true }] }"#,
            "",
        );
        let mut cache = TemplateCache::new(dir.path(), &TemplatesConfig::default());
        let template = cache.resolve(Some("minimal")).unwrap();
        let config = config("[custom]\nstyles = [\"/assets/css/custom.css\"]\nscripts = [\"assets/js/custom.js\"]\n");
        let presentation: Presentation = serde_json::from_value(serde_json::json!({
            "extraStyles": ["assets/css/custom.css", "assets/css/page.css"],
            "extraScripts": ["assets/js/custom.js", { "src": "assets/js/custom.js", "module": true }]
        }))
        .unwrap();

        let assets = PageAssets::resolve(&template, &config, &presentation, "portfolio/").unwrap();
        assert_eq!(
            assets.stylesheets,
            vec![
                "/portfolio/assets/templates/minimal/assets/css/theme.css",
                "https://cdn.example/x.css",
                "/portfolio/assets/css/custom.css",
                "/portfolio/assets/css/page.css",
            ]
        );
        assert_eq!(assets.scripts.len(), 3);
        assert_eq!(assets.scripts[0].src, "/portfolio/assets/templates/minimal/assets/js/app.js");
        assert!(assets.scripts[0].module);
        assert!(!assets.scripts[1].module);
        assert!(assets.scripts[2].module);

        let tags = assets.script_tags();
        assert!(tags.contains("<script type=\"module\" src=\"/portfolio/assets/templates/minimal/assets/js/app.js\"></script>"));
        assert!(tags.contains("type=\"text/javascript\""));
        assert!(assets.stylesheet_tags().starts_with("  <link rel=\"stylesheet\""));
    }

    #[test]
    fn test_asset_href_rejects_traversal() {
        assert_eq!(asset_href("assets/a.css", "").unwrap(), "/assets/a.css");
        assert_eq!(asset_href("/assets/a.css", "/site").unwrap(), "/site/assets/a.css");
        assert!(matches!(
            asset_href("../secret.css", "").unwrap_err(),
            FolioError::PathTraversal { .. }
        ));
    }

    #[test]
    fn test_render_shell() {
        let dir = TempDir::new().unwrap();
        site_template(
            dir.path(),
            "minimal",
            r#"{ "html": "shell.html" }"#,
            "<html lang=\"{{ language }}\"><title>{{ title }} | {{ siteTitle }}</title>{{ content }}<p>{{ unknownValue }}</p><a href=\"{{ basePath }}/\">home</a></html>",
        );
        let mut cache = TemplateCache::new(dir.path(), &TemplatesConfig::default());
        let template = cache.resolve(Some("minimal")).unwrap();
        let config = config("[site]\ntitle = \"Ada\"\n");
        let chrome = SiteChrome::new(&config, "/portfolio", String::new()).unwrap();

        let html = template
            .render(&ShellContext {
                chrome: &chrome,
                title: "About".into(),
                breadcrumb: String::new(),
                content: "<main>raw & unescaped</main>".into(),
                related_pages: String::new(),
                stylesheets: String::new(),
                scripts: String::new(),
                body_class: String::new(),
                language: "en".into(),
                head_meta: String::new(),
            })
            .unwrap();
        assert_eq!(
            html,
            "<html lang=\"en\"><title>About | Ada</title><main>raw & unescaped</main><p></p><a href=\"/portfolio/\">home</a></html>"
        );
    }

    #[test]
    fn test_render_error_points_at_template() {
        let dir = TempDir::new().unwrap();
        site_template(dir.path(), "broken", r#"{ "html": "shell.html" }"#, "{{ title ");
        let mut cache = TemplateCache::new(dir.path(), &TemplatesConfig::default());
        let template = cache.resolve(Some("broken")).unwrap();
        let chrome = SiteChrome::new(&SiteConfig::default(), "", String::new()).unwrap();
        let err = template
            .render(&ShellContext {
                chrome: &chrome,
                title: String::new(),
                breadcrumb: String::new(),
                content: String::new(),
                related_pages: String::new(),
                stylesheets: String::new(),
                scripts: String::new(),
                body_class: String::new(),
                language: String::new(),
                head_meta: String::new(),
            })
            .unwrap_err();
        assert!(matches!(err, FolioError::TemplateRender { .. }));
    }

    #[test]
    fn test_footer_fragments() {
        let config = config(
            r#"
[site.contact]
phones = ["+34 600 000 000"]
socials = [{ key = "github", label = "GitHub", url = "https://github.com/ada" }, { key = "blog", label = "", url = "" }]

[site.contact.emails]
institutional = "ada@uni.edu"
"#,
        );
        let links = footer_social_links(&config);
        assert!(links.contains("href=\"https://github.com/ada\""));
        assert!(links.contains("aria-label=\"GitHub\""));
        assert!(links.contains("href=\"#\" target=\"_blank\" rel=\"noopener noreferrer\" aria-label=\"blog\""));
        assert_eq!(
            footer_contact_summary(&config),
            "<a href=\"mailto:ada@uni.edu\">ada@uni.edu</a> | <a href=\"tel:+34600000000\">+34 600 000 000</a>"
        );
    }

    #[tokio::test]
    async fn test_copy_assets() {
        let site = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        site_template(site.path(), "minimal", r#"{ "html": "shell.html" }"#, "");
        let mut cache = TemplateCache::new(site.path(), &TemplatesConfig::default());
        cache.resolve(Some("minimal")).unwrap();
        cache.resolve(None).unwrap();

        for template in cache.used() {
            assert!(template.copy_assets(out.path()).await.unwrap() > 0);
        }
        assert!(out.path().join("assets/templates/minimal/assets/css/theme.css").exists());
        assert!(out.path().join("assets/templates/default/assets/css/site.css").exists());
    }
}
