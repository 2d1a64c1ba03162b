//! The content tree: loading documents, output paths and navigation.
//!
//! Pages are grouped by their directory under the content root. The first
//! document of a directory (in natural name order) is its *main* page and
//! stands for the directory in the menu and in breadcrumbs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::collection::natural_cmp;
use crate::config::SiteConfig;
use crate::error::{FolioResultExt, Result};
use crate::html::escape_html;
use crate::model::Page;
use crate::resolve::resolve_config_tokens;

/// A parsed content document and where it came from.
#[derive(Debug, Clone)]
pub struct SourcePage {
    /// Path on disk
    pub file: PathBuf,
    /// Directory relative to the content root, `/`-separated, `""` for the root
    pub dir: String,
    /// File name, e.g. `1-post.json`
    pub name: String,
    pub page: Page,
}

impl SourcePage {
    /// Read, resolve config references and parse one document.
    pub fn load(content_root: &Path, file: &Path, config: &SiteConfig) -> Result<Self> {
        let content = std::fs::read_to_string(file).with_file_read(file)?;
        let value = Page::parse_document(file, &content)?;
        let page = Page::from_value(resolve_config_tokens(value, config)).map_err(|e| e.in_page(file))?;

        let relative = file.strip_prefix(content_root).unwrap_or(file);
        let dir = relative
            .parent()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default();
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(SourcePage {
            file: file.to_owned(),
            dir: dir.trim_matches('/').to_string(),
            name,
            page,
        })
    }

    /// Menu and breadcrumb label: the page title, or the file stem.
    pub fn label(&self) -> String {
        self.page
            .title()
            .map(str::to_string)
            .unwrap_or_else(|| self.name.trim_end_matches(".json").to_string())
    }
}

/// Every `*.json` file under the content root, in natural path order.
pub fn discover_documents(content_root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(content_root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        .map(|e| e.into_path())
        .collect();
    files.sort_by(|a, b| natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));
    files
}

pub fn load_pages(content_root: &Path, config: &SiteConfig) -> Result<Vec<SourcePage>> {
    let pages = discover_documents(content_root)
        .iter()
        .map(|file| SourcePage::load(content_root, file, config))
        .collect::<Result<Vec<_>>>()?;
    debug!(root = %content_root.display(), pages = pages.len(), "Loaded content documents");
    Ok(pages)
}

/// Pages grouped by directory.
#[derive(Debug)]
pub struct SiteGraph {
    pub pages: Vec<SourcePage>,
    /// Directory to page indices, main page first
    by_dir: BTreeMap<String, Vec<usize>>,
}

impl SiteGraph {
    pub fn new(pages: Vec<SourcePage>) -> Self {
        let mut by_dir: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (index, page) in pages.iter().enumerate() {
            by_dir.entry(page.dir.clone()).or_default().push(index);
        }
        for indices in by_dir.values_mut() {
            indices.sort_by(|a, b| natural_cmp(&pages[*a].name, &pages[*b].name));
        }
        SiteGraph { pages, by_dir }
    }

    pub fn main_page(&self, dir: &str) -> Option<&SourcePage> {
        self.by_dir
            .get(dir)
            .and_then(|indices| indices.first())
            .map(|i| &self.pages[*i])
    }

    fn is_main(&self, page: &SourcePage) -> bool {
        self.main_page(&page.dir).is_some_and(|main| main.file == page.file)
    }

    /// `index.html` for the root's main page, `<dir>/<basename>.html` otherwise.
    pub fn output_path(&self, page: &SourcePage) -> String {
        if page.dir.is_empty() && self.is_main(page) {
            return "index.html".to_string();
        }
        let file = format!("{}.html", page.page.output_basename(&page.name));
        if page.dir.is_empty() {
            file
        } else {
            format!("{}/{file}", page.dir)
        }
    }

    /// `<base_path>/<output path>` with repeated slashes collapsed.
    pub fn url_for(&self, page: &SourcePage, base_path: &str) -> String {
        collapse_slashes(&format!("{base_path}/{}", self.output_path(page)))
    }

    /// Directories directly below `parent`, in natural order.
    fn child_dirs(&self, parent: &str) -> Vec<&str> {
        let mut dirs: Vec<&str> = self
            .by_dir
            .keys()
            .map(String::as_str)
            .filter(|dir| !dir.is_empty() && parent_dir(dir) == parent)
            .collect();
        dirs.sort_by(|a, b| natural_cmp(a, b));
        dirs
    }

    /// `ul.menu.menu-root`: Home, then one item per top-level directory.
    pub fn navigation(&self, base_path: &str) -> String {
        let Some(root) = self.main_page("") else {
            return String::new();
        };

        let mut html = String::from("<ul class=\"menu menu-root\">");
        html.push_str(&format!(
            "<li class=\"menu-item\"><a class=\"menu-link\" href=\"{}\">Home</a></li>",
            escape_html(&self.url_for(root, base_path))
        ));

        for dir in self.child_dirs("") {
            let Some(main) = self.main_page(dir) else {
                continue;
            };
            let children = if main.page.meta.gen_sub_menus == Some(false) {
                Vec::new()
            } else {
                self.child_dirs(dir)
            };

            let class = if children.is_empty() {
                "menu-item"
            } else {
                "menu-item has-submenu"
            };
            html.push_str(&format!(
                "<li class=\"{class}\"><a class=\"menu-link\" href=\"{}\">{}</a>",
                escape_html(&self.url_for(main, base_path)),
                escape_html(&main.label())
            ));

            if !children.is_empty() {
                html.push_str("<ul class=\"submenu\">");
                for child in children.iter().filter_map(|d| self.main_page(d)) {
                    html.push_str(&format!(
                        "<li class=\"submenu-item\"><a class=\"submenu-link\" href=\"{}\">{}</a></li>",
                        escape_html(&self.url_for(child, base_path)),
                        escape_html(&child.label())
                    ));
                }
                html.push_str("</ul>");
            }
            html.push_str("</li>");
        }

        html.push_str("</ul>");
        html
    }

    /// `nav.breadcrumb-nav`: Home, then the main page of each ancestor directory.
    pub fn breadcrumb(&self, page: &SourcePage, base_path: &str) -> String {
        let mut crumbs = vec![("Home".to_string(), format!("{base_path}/"))];

        let mut dir = String::new();
        for part in page.dir.split('/').filter(|p| !p.is_empty()) {
            if !dir.is_empty() {
                dir.push('/');
            }
            dir.push_str(part);
            if let Some(main) = self.main_page(&dir) {
                crumbs.push((main.label(), self.url_for(main, base_path)));
            }
        }

        let last = crumbs.len() - 1;
        let items: String = crumbs
            .iter()
            .enumerate()
            .map(|(index, (label, href))| {
                if index == last {
                    format!(
                        "<li class=\"breadcrumb-item active\" aria-current=\"page\"><span>{}</span></li>",
                        escape_html(label)
                    )
                } else {
                    format!(
                        "<li class=\"breadcrumb-item\"><a class=\"breadcrumb-link\" href=\"{}\">{}</a></li>",
                        escape_html(href),
                        escape_html(label)
                    )
                }
            })
            .collect();

        format!("<nav class=\"breadcrumb-nav\" aria-label=\"Breadcrumb\"><ol class=\"breadcrumb-list\">{items}</ol></nav>")
    }

    /// Other pages inside this page's directory, when the page asks for them.
    pub fn related_pages(&self, page: &SourcePage, base_path: &str) -> String {
        if !page.page.meta.gen_related_pages {
            return String::new();
        }

        let links: String = self
            .pages
            .iter()
            .filter(|other| other.file != page.file && is_within(&other.dir, &page.dir))
            .map(|other| {
                format!(
                    "<li class=\"related-pages-item\"><a class=\"related-pages-link\" href=\"{}\">{}</a></li>",
                    escape_html(&self.url_for(other, base_path)),
                    escape_html(&other.label())
                )
            })
            .collect();
        if links.is_empty() {
            return String::new();
        }

        format!(
            "<section class=\"related-pages\">\n<div class=\"related-pages-inner\">\n<h2>Related Pages</h2>\n<ul>{links}</ul>\n</div>\n</section>\n"
        )
    }
}

fn parent_dir(dir: &str) -> &str {
    dir.rsplit_once('/').map_or("", |(parent, _)| parent)
}

/// Whether `dir` is `ancestor` or below it.
fn is_within(dir: &str, ancestor: &str) -> bool {
    ancestor.is_empty()
        || dir == ancestor
        || dir.strip_prefix(ancestor).is_some_and(|rest| rest.starts_with('/'))
}

fn collapse_slashes(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for ch in url.chars() {
        if ch == '/' && out.ends_with('/') {
            continue;
        }
        out.push(ch);
    }
    out
}
