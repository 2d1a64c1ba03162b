use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::blocks::RenderContext;
use crate::config::SiteConfig;
use crate::console;
use crate::error::{FolioError, FolioResultExt, Result};
use crate::html::escape_html;
use crate::minify::{MinifyConfig, minify_html_content};
use crate::render::render_page;
use crate::seo::build_head;
use crate::site::{SiteGraph, load_pages};
use crate::template::{PageAssets, ShellContext, SiteChrome, TemplateCache, TemplateDefinition};
use crate::url::{apply_base_path, ensure_no_traversal, normalize_base_path};

static ASSET_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:href|src)\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});
static HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("valid regex"));

/// What a build run was asked to do
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub site_path: PathBuf,
    /// Defaults to `build.output_dir` under the site
    pub output_path: Option<PathBuf>,
    /// Render only this content document
    pub page: Option<String>,
    /// Overrides `build.base_path`
    pub base_path: Option<String>,
    pub no_minify: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub pages: usize,
    pub assets: usize,
    pub warnings: usize,
}

/// Collected warnings during the build process
#[derive(Default)]
struct BuildWarnings {
    warnings: Vec<FolioError>,
}

impl BuildWarnings {
    fn add(&mut self, error: FolioError) {
        self.warnings.push(error);
    }

    fn len(&self) -> usize {
        self.warnings.len()
    }

    /// Display all collected warnings using miette's fancy formatting
    fn display(&mut self) {
        if self.warnings.is_empty() {
            return;
        }

        eprintln!();
        console::warn(format!(
            "Build completed with {}",
            console::plural(self.warnings.len(), "warning", "warnings")
        ));
        eprintln!();

        for warning in self.warnings.drain(..) {
            eprintln!("{:?}", miette::Report::new(warning));
        }
    }
}

/// Everything the page tasks share.
struct BuildData {
    config: SiteConfig,
    graph: SiteGraph,
    chrome: SiteChrome,
    render_ctx: RenderContext,
    base_path: String,
    output_path: PathBuf,
    minify: MinifyConfig,
}

pub async fn run_build(options: BuildOptions) -> Result<BuildSummary> {
    console::start_build();
    let site_path = options.site_path.clone();
    let config = SiteConfig::load(&site_path).await?;

    let base_path = normalize_base_path(
        options
            .base_path
            .as_deref()
            .unwrap_or(&config.build.base_path),
    );
    let output_path = options
        .output_path
        .clone()
        .unwrap_or_else(|| site_path.join(&config.build.output_dir));
    let minify = MinifyConfig::new(config.build.minify && !options.no_minify);

    console::status(
        "Building",
        format!("{} ({})", config.site.title, site_path.display()),
    );
    info!(
        site = %site_path.display(),
        output = %output_path.display(),
        base_path = %base_path,
        "Building site"
    );

    let content_root = site_path.join(&config.build.content_dir);
    let pages = load_pages(&content_root, &config)?;
    info!(count = pages.len(), "Loaded content pages");
    let graph = SiteGraph::new(pages);

    let selected = select_pages(&graph, options.page.as_deref(), &site_path, &content_root)?;
    if selected.len() != graph.pages.len() {
        console::status_cyan("Rendering", "single page");
    }

    let mut templates = TemplateCache::new(&site_path, &config.templates);
    let mut page_templates = Vec::with_capacity(selected.len());
    for &index in &selected {
        let page = &graph.pages[index];
        let template = templates
            .resolve(page.page.presentation.template.as_deref())
            .map_err(|e| e.in_page(&page.file))?;
        page_templates.push((index, template));
    }

    let chrome = SiteChrome::new(&config, &base_path, graph.navigation(&base_path))?;
    let render_ctx = RenderContext::new(&site_path, &config.build.content_dir);
    let data = Arc::new(BuildData {
        config,
        graph,
        chrome,
        render_ctx,
        base_path,
        output_path: output_path.clone(),
        minify,
    });

    clean_output_directory(&output_path).await?;

    let (page_count, referenced) = render_all_pages(Arc::clone(&data), page_templates).await?;

    let mut warnings = BuildWarnings::default();
    let mut asset_count = 0;
    for template in templates.used() {
        let copied = template.copy_assets(&output_path).await?;
        debug!(template = %template.name, count = copied, "Copied template assets");
        asset_count += copied;
    }
    asset_count +=
        copy_referenced_assets(&site_path, &output_path, &referenced, &minify, &mut warnings)
            .await?;

    info!(
        pages = page_count,
        assets = asset_count,
        "Build complete! {} pages, {} assets",
        page_count,
        asset_count
    );
    console::finished(format!(
        "{}, {}",
        console::plural(page_count, "page", "pages"),
        console::plural(asset_count, "asset", "assets")
    ));

    let summary = BuildSummary {
        pages: page_count,
        assets: asset_count,
        warnings: warnings.len(),
    };
    warnings.display();
    Ok(summary)
}

/// Indices of the pages to render: all of them, or the one `--page` names.
fn select_pages(
    graph: &SiteGraph,
    requested: Option<&str>,
    site_path: &Path,
    content_root: &Path,
) -> Result<Vec<usize>> {
    let Some(requested) = requested.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok((0..graph.pages.len()).collect());
    };

    let wanted = normalize_fs_path(Path::new(requested));
    let is_requested = |file: &Path| {
        [Some(file), file.strip_prefix(site_path).ok(), file.strip_prefix(content_root).ok()]
            .into_iter()
            .flatten()
            .any(|candidate| normalize_fs_path(candidate) == wanted)
    };

    match graph.pages.iter().position(|page| is_requested(&page.file)) {
        Some(index) => {
            info!(file = %graph.pages[index].file.display(), "Single-page build");
            Ok(vec![index])
        }
        None => Err(FolioError::PageNotFound {
            page: requested.into(),
        }),
    }
}

fn normalize_fs_path(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    let text = text.trim_start_matches("./");
    text.trim_end_matches('/').to_string()
}

async fn clean_output_directory(output_path: &Path) -> Result<()> {
    if output_path.exists() {
        info!("Cleaning output directory...");
        tokio::fs::remove_dir_all(output_path)
            .await
            .map_err(|e| FolioError::CreateDir {
                path: output_path.into(),
                cause: e,
            })?;
    }
    tokio::fs::create_dir_all(output_path)
        .await
        .map_err(|e| FolioError::CreateDir {
            path: output_path.into(),
            cause: e,
        })?;
    Ok(())
}

async fn render_all_pages(
    data: Arc<BuildData>,
    pages: Vec<(usize, Arc<TemplateDefinition>)>,
) -> Result<(usize, BTreeSet<String>)> {
    let page_count = pages.len();
    info!(count = page_count, "Rendering pages...");

    let mut join_set: JoinSet<Result<BTreeSet<String>>> = JoinSet::new();

    for (index, template) in pages {
        let data = Arc::clone(&data);
        join_set.spawn(async move {
            let page = &data.graph.pages[index];
            let html = render_shell(&data, index, &template).map_err(|e| e.in_page(&page.file))?;
            let referenced = referenced_assets(&html, &data.base_path);
            let final_html = minify_html_content(&html, &data.minify);

            let output_file = data.output_path.join(data.graph.output_path(page));
            if let Some(parent) = output_file.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| FolioError::CreateDir {
                        path: parent.into(),
                        cause: e,
                    })?;
            }

            info!(
                source = %page.file.display(),
                output = %output_file.display(),
                template = %template.name,
                "Rendered page"
            );
            tokio::fs::write(&output_file, final_html)
                .await
                .map_err(|e| FolioError::FileWrite {
                    path: (&output_file).into(),
                    cause: e,
                })?;

            Ok(referenced)
        });
    }

    let mut referenced = BTreeSet::new();
    while let Some(result) = join_set.join_next().await {
        // Propagate both JoinError (task panic) and render errors
        let assets = result.map_err(|e| FolioError::TaskJoin {
            reason: e.to_string(),
        })??;
        referenced.extend(assets);
    }

    Ok((page_count, referenced))
}

/// Body, base-path substitution, head metadata, then the template shell.
fn render_shell(data: &BuildData, index: usize, template: &TemplateDefinition) -> Result<String> {
    let source = &data.graph.pages[index];
    let page = &source.page;

    let body = render_page(page, &data.render_ctx)?;
    let content = apply_base_path(&body, &data.base_path);
    let assets = PageAssets::resolve(template, &data.config, &page.presentation, &data.base_path)?;
    let seo = build_head(page, &data.config, &data.graph.output_path(source));

    let context = ShellContext {
        chrome: &data.chrome,
        title: escape_html(page.title().unwrap_or(&data.config.site.title)),
        breadcrumb: data.graph.breadcrumb(source, &data.base_path),
        content,
        related_pages: data.graph.related_pages(source, &data.base_path),
        stylesheets: assets.stylesheet_tags(),
        scripts: assets.script_tags(),
        body_class: escape_html(page.presentation.body_class.as_deref().unwrap_or("").trim()),
        language: seo.language,
        head_meta: seo.head_meta,
    };
    template.render(&context)
}

/// Site asset paths (`assets/...`) referenced by `href`/`src` attributes.
fn referenced_assets(html: &str, base_path: &str) -> BTreeSet<String> {
    ASSET_ATTR
        .captures_iter(html)
        .filter_map(|caps| asset_path_from_href(&caps[1], base_path))
        .collect()
}

fn asset_path_from_href(href: &str, base_path: &str) -> Option<String> {
    let href = href.trim().replace('\\', "/");
    if href.is_empty() || HTTP_URL.is_match(&href) || href.starts_with("//") {
        return None;
    }

    let mut pathname = if href.starts_with('/') {
        href
    } else {
        format!("/{href}")
    };
    let prefix = normalize_base_path(base_path);
    if !prefix.is_empty() {
        if let Some(rest) = pathname.strip_prefix(&format!("{prefix}/")) {
            pathname = format!("/{rest}");
        } else if pathname == prefix {
            pathname = "/".to_string();
        }
    }

    let path = pathname.strip_prefix("/assets/")?;
    let path = path.split(['?', '#']).next().unwrap_or(path);
    if path.is_empty() || ensure_no_traversal(path).is_err() {
        return None;
    }
    Some(format!("assets/{path}"))
}

/// Where a referenced asset lives in the project.
fn asset_source(site_path: &Path, asset: &str) -> Option<PathBuf> {
    if asset.starts_with("assets/templates/") {
        return None;
    }
    if let Some(rest) = asset.strip_prefix("assets/css/") {
        Some(site_path.join("src/css").join(rest))
    } else if let Some(rest) = asset.strip_prefix("assets/js/") {
        Some(site_path.join("src/js").join(rest))
    } else {
        asset
            .strip_prefix("assets/")
            .map(|rest| site_path.join("src/assets").join(rest))
    }
}

async fn copy_referenced_assets(
    site_path: &Path,
    output_path: &Path,
    referenced: &BTreeSet<String>,
    minify: &MinifyConfig,
    warnings: &mut BuildWarnings,
) -> Result<usize> {
    let mut count = 0;

    for asset in referenced {
        let Some(source) = asset_source(site_path, asset) else {
            continue;
        };
        if !source.is_file() {
            warn!(asset = %asset, source = %source.display(), "Referenced asset is missing");
            warnings.add(FolioError::AssetMissing {
                path: (&source).into(),
            });
            continue;
        }

        let dest = output_path.join(asset);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FolioError::CreateDir {
                    path: parent.into(),
                    cause: e,
                })?;
        }

        let bytes = tokio::fs::read(&source).await.with_file_read(&source)?;
        tokio::fs::write(&dest, minify.asset_contents(&source, bytes))
            .await
            .map_err(|e| FolioError::CopyFile {
                src: (&source).into(),
                dest: (&dest).into(),
                cause: e,
            })?;
        count += 1;
    }

    if count > 0 {
        info!(count, "Copied static assets");
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, path: &str, content: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "config.toml",
            r#"
[site]
title = "Ada Lovelace"
branding = { favicon = "assets/icons/favicon.svg", logo_src = "assets/images/logo.svg" }

[build]
base_path = "/portfolio"

[custom]
styles = ["assets/css/custom.css"]
scripts = []
"#,
        );
        write(
            root,
            "src/content/1-home.json",
            r#"{
  "header": { "title": "Home", "lead": "Welcome to {{cfg:site.title}}" },
  "body": [
    { "type": "paragraph", "data": { "text": "See [about]({{basePath}}/1-about/1-me.html)" } },
    { "type": "media-image", "data": { "src": "assets/images/me.png", "alt": "Me" } }
  ]
}"#,
        );
        write(
            root,
            "src/content/1-about/1-me.json",
            r#"{ "header": { "title": "About me" }, "body": [] }"#,
        );
        write(root, "src/css/custom.css", "body {\n  color: black;\n}\n");
        write(root, "src/assets/icons/favicon.svg", "<svg></svg>");
        write(root, "src/assets/images/me.png", "png");
        dir
    }

    #[tokio::test]
    async fn test_full_build() {
        let site = site();
        let summary = run_build(BuildOptions {
            site_path: site.path().to_path_buf(),
            ..Default::default()
        })
        .await
        .unwrap();

        assert_eq!(summary.pages, 2);
        // logo.svg is referenced but missing
        assert_eq!(summary.warnings, 1);

        let out = site.path().join("public");
        let index = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(index.contains("/portfolio/1-about/1-me.html"));
        assert!(index.contains("Welcome to Ada Lovelace"));
        assert!(!index.contains("{{basePath}}"));
        assert!(index.contains("/portfolio/assets/templates/default/assets/css/site.css"));

        assert!(out.join("1-about/1-me.html").exists());
        assert!(out.join("assets/templates/default/assets/css/site.css").exists());
        assert!(out.join("assets/icons/favicon.svg").exists());
        assert!(out.join("assets/images/me.png").exists());
        assert!(!out.join("assets/images/logo.svg").exists());

        let css = fs::read_to_string(out.join("assets/css/custom.css")).unwrap();
        assert!(!css.contains('\n'));
    }

    #[tokio::test]
    async fn test_single_page_and_overrides() {
        let site = site();
        let out = TempDir::new().unwrap();
        let summary = run_build(BuildOptions {
            site_path: site.path().to_path_buf(),
            output_path: Some(out.path().join("dist")),
            page: Some("src/content/1-about/1-me.json".into()),
            base_path: Some("".into()),
            no_minify: true,
        })
        .await
        .unwrap();

        assert_eq!(summary.pages, 1);
        let html = fs::read_to_string(out.path().join("dist/1-about/1-me.html")).unwrap();
        assert!(html.contains("href=\"/assets/templates/default/assets/css/site.css\""));
        assert!(html.contains('\n'));
        assert!(!out.path().join("dist/index.html").exists());
    }

    #[tokio::test]
    async fn test_unknown_page_fails() {
        let site = site();
        let err = run_build(BuildOptions {
            site_path: site.path().to_path_buf(),
            page: Some("src/content/nope.json".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
        assert!(matches!(err, FolioError::PageNotFound { .. }));
    }

    #[tokio::test]
    async fn test_render_errors_name_the_page() {
        let site = site();
        write(
            site.path(),
            "src/content/2-broken.json",
            r#"{ "body": [{ "type": "table", "data": { "rows": [] } }] }"#,
        );
        let err = run_build(BuildOptions {
            site_path: site.path().to_path_buf(),
            ..Default::default()
        })
        .await
        .unwrap_err();
        assert!(matches!(err, FolioError::PageRender { .. }));
    }

    #[test]
    fn test_asset_path_from_href() {
        assert_eq!(
            asset_path_from_href("/portfolio/assets/css/a.css?v=2", "/portfolio"),
            Some("assets/css/a.css".into())
        );
        assert_eq!(asset_path_from_href("assets/js/a.js", ""), Some("assets/js/a.js".into()));
        assert_eq!(asset_path_from_href("https://cdn/assets/a.css", ""), None);
        assert_eq!(asset_path_from_href("//cdn/assets/a.css", ""), None);
        assert_eq!(asset_path_from_href("/portfolio/about.html", "/portfolio"), None);
        assert_eq!(asset_path_from_href("/assets/../secret", ""), None);
        assert_eq!(
            asset_path_from_href("/assets/v1..2.pdf", ""),
            Some("assets/v1..2.pdf".to_string())
        );
    }

    #[test]
    fn test_asset_source_mapping() {
        let root = Path::new("/site");
        assert_eq!(asset_source(root, "assets/css/a.css"), Some(root.join("src/css/a.css")));
        assert_eq!(asset_source(root, "assets/js/a.js"), Some(root.join("src/js/a.js")));
        assert_eq!(
            asset_source(root, "assets/images/a.png"),
            Some(root.join("src/assets/images/a.png"))
        );
        assert_eq!(asset_source(root, "assets/templates/default/x.css"), None);
    }

    #[test]
    fn test_referenced_assets_deduplicates() {
        let html = r#"<link href="/assets/css/a.css"><img src='/assets/a.png'><a href="/assets/css/a.css">"#;
        let assets = referenced_assets(html, "");
        assert_eq!(assets.len(), 2);
    }
}
