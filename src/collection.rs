//! Listing content documents as summary entries.
//!
//! Scans a folder of page documents, derives a [`ContentEntry`] per document
//! and sorts them. The collection and carousel blocks both render from this;
//! `folio collect` prints it as JSON.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use walkdir::WalkDir;

use crate::blocks::RenderContext;
use crate::error::{FolioError, FolioResultExt, Result};
use crate::model::{Page, PageMeta, PublishStatus, RawBlock, RawPage, output_basename};
use crate::url::{BASE_PATH_TOKEN, ensure_no_traversal, normalize_asset_src};

pub const DEFAULT_EXCERPT_LENGTH: usize = 180;
pub const MIN_EXCERPT_LENGTH: usize = 80;
pub const MAX_EXCERPT_LENGTH: usize = 420;

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid regex"));
static BARE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Summary of one content document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntry {
    pub title: String,
    pub excerpt: String,
    pub image: String,
    pub href: String,
    pub tags: Vec<String>,
    pub date_iso: String,
    pub date_label: String,
    /// Milliseconds since the epoch; 0 when undated
    pub date_order: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    DateDesc,
    DateAsc,
    TitleAsc,
    TitleDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::DateDesc,
        SortKey::DateAsc,
        SortKey::TitleAsc,
        SortKey::TitleDesc,
    ];

    /// Case-insensitive; anything unrecognised is `date-desc`.
    pub fn from_key(key: Option<&str>) -> Self {
        let key = key.unwrap_or("").trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == key)
            .unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::DateDesc => "date-desc",
            SortKey::DateAsc => "date-asc",
            SortKey::TitleAsc => "title-asc",
            SortKey::TitleDesc => "title-desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::DateDesc => "Newest first",
            SortKey::DateAsc => "Oldest first",
            SortKey::TitleAsc => "Title A-Z",
            SortKey::TitleDesc => "Title Z-A",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub source: String,
    /// Count documents directly inside `source`, not just nested ones
    pub include_root_files: bool,
    pub published_only: bool,
    /// Relative paths or bare file names
    pub exclude: Vec<String>,
    pub excerpt_length: usize,
    pub sort: SortKey,
    /// Applied after sorting
    pub limit: Option<usize>,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            source: String::new(),
            include_root_files: false,
            published_only: true,
            exclude: Vec::new(),
            excerpt_length: DEFAULT_EXCERPT_LENGTH,
            sort: SortKey::default(),
            limit: None,
        }
    }
}

/// Collect, filter, sort and limit the entries under `options.source`.
pub fn collect(ctx: &RenderContext, options: &CollectOptions) -> Result<Vec<ContentEntry>> {
    let source_root = resolve_source_root(ctx, &options.source)?;
    let excerpt_length = options
        .excerpt_length
        .clamp(MIN_EXCERPT_LENGTH, MAX_EXCERPT_LENGTH);
    let exclude: Vec<String> = options
        .exclude
        .iter()
        .map(|e| normalize_relative(e))
        .collect();

    let mut files: Vec<(PathBuf, String)> = WalkDir::new(&source_root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(&source_root).ok()?;
            let relative = normalize_relative(&relative.to_string_lossy());
            Some((entry.path().to_owned(), relative))
        })
        .filter(|(_, relative)| options.include_root_files || relative.contains('/'))
        .filter(|(_, relative)| {
            let basename = relative.rsplit('/').next().unwrap_or(relative);
            !exclude.iter().any(|e| e == relative || e == basename)
        })
        .collect();
    files.sort_by(|a, b| natural_cmp(&a.1, &b.1));

    let content_root = ctx.content_root();
    let mut entries = Vec::with_capacity(files.len());
    for (path, _) in &files {
        let page = read_raw_page(path)?;
        if options.published_only && page.meta.publish_status() == PublishStatus::Draft {
            continue;
        }
        entries.push(to_entry(path, &page, &content_root, &source_root, excerpt_length)?);
    }

    sort_entries(&mut entries, options.sort);
    if let Some(limit) = options.limit.filter(|l| *l > 0) {
        entries.truncate(limit);
    }

    debug!(
        source = %source_root.display(),
        documents = files.len(),
        entries = entries.len(),
        "Collected content entries"
    );
    Ok(entries)
}

/// Accepts `news`, `content/news`, `src/content/news` or any existing site-relative path.
pub fn resolve_source_root(ctx: &RenderContext, source: &str) -> Result<PathBuf> {
    let normalized = normalize_relative(source.trim());
    let normalized = normalized.trim_end_matches('/');
    if normalized.is_empty() {
        return Err(FolioError::missing_field("content-collection", "source"));
    }
    ensure_no_traversal(normalized)?;

    let as_written = ctx.site_path(normalized);
    let candidate = if as_written.is_dir() {
        as_written
    } else {
        let inside_content = normalized.strip_prefix("content/").unwrap_or(normalized);
        ctx.content_root().join(inside_content)
    };

    if candidate.is_dir() {
        Ok(candidate)
    } else {
        Err(FolioError::CollectionSourceNotFound {
            path: normalized.into(),
        })
    }
}

fn read_raw_page(path: &Path) -> Result<RawPage> {
    let content = std::fs::read_to_string(path).with_file_read(path)?;
    let value = Page::parse_document(path, &content)?;
    serde_json::from_value(value)
        .map_err(|e| FolioError::InvalidDocument { reason: e.to_string() }.in_page(path))
}

fn to_entry(
    path: &Path,
    page: &RawPage,
    content_root: &Path,
    source_root: &Path,
    excerpt_length: usize,
) -> Result<ContentEntry> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.strip_suffix(".json").unwrap_or(&file_name);

    let title = [
        page.meta.title.as_deref(),
        page.header.as_ref().map(|h| h.title.as_str()),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|t| !t.is_empty())
    .unwrap_or(stem)
    .to_string();

    let date = DateInfo::from_meta(&page.meta);
    Ok(ContentEntry {
        title,
        excerpt: excerpt(page, excerpt_length),
        image: preview_image(page).map_err(|e| e.in_page(path))?,
        href: content_href(path, page, content_root, source_root, &file_name),
        tags: page
            .meta
            .tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        date_iso: date.iso,
        date_label: date.label,
        date_order: date.order,
    })
}

/// `{{basePath}}/<dir>/<basename>.html`, relative to the content root.
fn content_href(
    path: &Path,
    page: &RawPage,
    content_root: &Path,
    source_root: &Path,
    file_name: &str,
) -> String {
    let relative = path
        .strip_prefix(content_root)
        .or_else(|_| path.strip_prefix(source_root))
        .unwrap_or(path);
    let dir = relative
        .parent()
        .map(|p| normalize_relative(&p.to_string_lossy()))
        .unwrap_or_default();
    let basename = output_basename(file_name, &page.meta, page.header.as_ref());
    if dir.is_empty() {
        format!("{BASE_PATH_TOKEN}/{basename}.html")
    } else {
        format!("{BASE_PATH_TOKEN}/{dir}/{basename}.html")
    }
}

fn block_text<'a>(block: &'a RawBlock, field: &str) -> Option<&'a str> {
    block.data.get(field).and_then(Value::as_str)
}

fn excerpt(page: &RawPage, max_length: usize) -> String {
    let first_paragraph = page
        .body
        .iter()
        .filter(|b| b.block_type == "paragraph")
        .find_map(|b| block_text(b, "text").filter(|t| !t.is_empty()));
    let first_list_item = page
        .body
        .iter()
        .find(|b| b.block_type == "list" && b.data.get("items").is_some_and(Value::is_array))
        .and_then(|b| b.data.get("items"))
        .and_then(|items| items.get(0))
        .and_then(Value::as_str);

    [
        page.meta.description.as_deref(),
        page.header.as_ref().and_then(|h| h.lead.as_deref()),
        first_paragraph,
        first_list_item,
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|t| !t.is_empty())
    .map(|text| truncate(&strip_inline_links(text), max_length))
    .unwrap_or_default()
}

/// `[label](target)` becomes `label`; whitespace runs collapse to one space.
pub fn strip_inline_links(text: &str) -> String {
    collapse_whitespace(&MARKDOWN_LINK.replace_all(text, "$1"))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut to `max` characters, the last one given over to `...`.
pub fn truncate(text: &str, max: usize) -> String {
    let normalized = collapse_whitespace(text);
    let chars: Vec<char> = normalized.chars().collect();
    if chars.len() <= max {
        return normalized;
    }
    let kept: String = chars[..max.saturating_sub(1)].iter().collect();
    format!("{}...", kept.trim())
}

/// First image in document order: meta, header, then image-bearing blocks.
fn preview_image(page: &RawPage) -> Result<String> {
    if let Some(image) = page.meta.image.as_deref().filter(|i| !i.trim().is_empty()) {
        return normalize_asset_src(image);
    }
    if let Some(image) = page
        .header
        .as_ref()
        .and_then(|h| h.image.as_ref())
        .filter(|i| !i.src.trim().is_empty())
    {
        return normalize_asset_src(&image.src);
    }

    for block in &page.body {
        let src = match block.block_type.as_str() {
            "feature-image" | "profile-image" | "media-image" => block_text(block, "src"),
            "image-gallery" => block
                .data
                .get("images")
                .and_then(|images| images.get(0))
                .and_then(|first| first.get("src"))
                .and_then(Value::as_str),
            _ => None,
        };
        if let Some(src) = src.filter(|s| !s.trim().is_empty()) {
            return normalize_asset_src(src);
        }
    }
    Ok(String::new())
}

#[derive(Debug, Default, PartialEq)]
struct DateInfo {
    iso: String,
    label: String,
    order: i64,
}

impl DateInfo {
    /// `publishedTime`, then `lastUpdated`, then `modifiedTime`.
    fn from_meta(meta: &PageMeta) -> Self {
        let raw = [&meta.published_time, &meta.last_updated, &meta.modified_time]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .map(str::trim)
            .find(|v| !v.is_empty());
        raw.map(Self::parse).unwrap_or_default()
    }

    fn parse(raw: &str) -> Self {
        if BARE_DATE.is_match(raw) {
            return NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| Self::from_datetime(dt.and_utc(), raw.to_string()))
                .unwrap_or_default();
        }

        match parse_datetime(raw) {
            Some(dt) => Self::from_datetime(dt, dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => Self::default(),
        }
    }

    fn from_datetime(dt: DateTime<Utc>, iso: String) -> Self {
        DateInfo {
            iso,
            label: dt.format("%d %b %Y").to_string(),
            order: dt.timestamp_millis(),
        }
    }
}

/// Timestamps as authors tend to write them; zone-less values are UTC.
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }
    for format in ["%Y/%m/%d", "%d %B %Y", "%d %b %Y", "%B %d, %Y", "%b %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    // Bare year or year-month
    let mut parts = raw.splitn(2, '-');
    let year: i32 = parts.next()?.parse().ok().filter(|y: &i32| (1000..=9999).contains(y))?;
    let month: u32 = match parts.next() {
        Some(m) if m.len() == 2 => m.parse().ok()?,
        Some(_) => return None,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, 1)?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
}

fn sort_entries(entries: &mut [ContentEntry], sort: SortKey) {
    match sort {
        SortKey::DateDesc => entries.sort_by(|a, b| {
            b.date_order
                .cmp(&a.date_order)
                .then_with(|| natural_cmp(&a.title, &b.title))
        }),
        SortKey::DateAsc => entries.sort_by(|a, b| {
            a.date_order
                .cmp(&b.date_order)
                .then_with(|| natural_cmp(&a.title, &b.title))
        }),
        SortKey::TitleAsc => entries.sort_by(|a, b| natural_cmp(&a.title, &b.title)),
        SortKey::TitleDesc => entries.sort_by(|a, b| natural_cmp(&b.title, &a.title)),
    }
}

/// Case- and accent-insensitive comparison where digit runs compare by value
/// (`2-x` < `10-x`, `Émile` == `emile`).
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = fold_base_letters(a).peekable();
    let mut b = fold_base_letters(b).peekable();

    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let left = take_digits(&mut a);
                let right = take_digits(&mut b);
                let ordering = compare_digit_runs(&left, &right);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a.next();
                b.next();
            }
        }
    }
}

fn fold_base_letters(text: &str) -> impl Iterator<Item = char> + '_ {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn take_digits(chars: &mut std::iter::Peekable<impl Iterator<Item = char>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn normalize_relative(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches('/').to_string()
}
