use std::fmt;
use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

// ANSI color codes for styled error output
const BOLD_CYAN: &str = "\x1b[1;36m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// A path that displays with cyan highlighting
#[derive(Debug, Clone)]
pub struct StyledPath(pub String);

impl fmt::Display for StyledPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{BOLD_CYAN}{}{RESET}", self.0)
    }
}

impl From<&Path> for StyledPath {
    fn from(p: &Path) -> Self {
        StyledPath(p.display().to_string())
    }
}

impl From<String> for StyledPath {
    fn from(s: String) -> Self {
        StyledPath(s)
    }
}

impl From<&str> for StyledPath {
    fn from(s: &str) -> Self {
        StyledPath(s.to_string())
    }
}

impl From<std::path::PathBuf> for StyledPath {
    fn from(p: std::path::PathBuf) -> Self {
        StyledPath(p.display().to_string())
    }
}

impl From<&std::path::PathBuf> for StyledPath {
    fn from(p: &std::path::PathBuf) -> Self {
        StyledPath(p.display().to_string())
    }
}

/// A name/identifier that displays with yellow highlighting
#[derive(Debug, Clone)]
pub struct StyledName(pub String);

impl fmt::Display for StyledName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{YELLOW}{}{RESET}", self.0)
    }
}

impl From<String> for StyledName {
    fn from(s: String) -> Self {
        StyledName(s)
    }
}

impl From<&str> for StyledName {
    fn from(s: &str) -> Self {
        StyledName(s.to_string())
    }
}

/// A number that displays with bold highlighting
#[derive(Debug, Clone, Copy)]
pub struct StyledNum<T: fmt::Display>(pub T);

impl<T: fmt::Display> fmt::Display for StyledNum<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{BOLD}{}{RESET}", self.0)
    }
}

impl<T: fmt::Display> From<T> for StyledNum<T> {
    fn from(v: T) -> Self {
        StyledNum(v)
    }
}

/// The primary error type for all folio operations
#[derive(Error, Diagnostic, Debug)]
pub enum FolioError {
    // === Config Errors ===
    #[error("I couldn't parse your {path} file", path = StyledPath::from("config.toml"))]
    #[diagnostic(
        code(folio::config::parse),
        help("I had trouble understanding your TOML syntax. Common issues include missing quotes around strings or unclosed brackets.")
    )]
    ConfigParse {
        #[source_code]
        src: NamedSource<String>,
        #[label("the error is around here")]
        span: SourceSpan,
        reason: String,
    },

    #[error("I couldn't read the config file at {path}")]
    #[diagnostic(
        code(folio::config::read),
        help("Make sure the file exists and you have permission to read it.")
    )]
    ConfigRead {
        path: StyledPath,
        #[source]
        cause: std::io::Error,
    },

    // === Content Errors ===
    #[error("I couldn't parse the content document {file}")]
    #[diagnostic(
        code(folio::content::parse),
        help("Content documents are JSON. Check for trailing commas, missing quotes or unclosed brackets.")
    )]
    ContentParse {
        file: StyledPath,
        #[source_code]
        src: NamedSource<String>,
        #[label("{reason}")]
        span: SourceSpan,
        reason: String,
    },

    #[error("This document doesn't look like a page: {reason}")]
    #[diagnostic(
        code(folio::content::document),
        help("A page has a `body` array of blocks plus optional `header`, `footer`, `meta` and `presentation` objects.")
    )]
    InvalidDocument { reason: String },

    #[error("I don't know how to render a block of type {block_type}")]
    #[diagnostic(code(folio::content::unknown_block), help("{help_text}"))]
    UnknownBlockType {
        block_type: StyledName,
        help_text: String,
    },

    #[error("The {block_type} block has data I couldn't understand: {reason}")]
    #[diagnostic(
        code(folio::content::block_data),
        help("Compare the block's `data` object against the fields this block type supports.")
    )]
    InvalidBlockData {
        block_type: StyledName,
        reason: String,
    },

    #[error("The {block_type} block is missing its required `{field}` field")]
    #[diagnostic(
        code(folio::content::missing_field),
        help("Add `data.{field}` to the block. I can't render it without one.")
    )]
    MissingField {
        block_type: StyledName,
        field: &'static str,
    },

    #[error("Heading level {level} is out of range")]
    #[diagnostic(
        code(folio::content::heading_level),
        help("Headings use `data.level` from 1 to 6.")
    )]
    InvalidHeadingLevel { level: StyledNum<i64> },

    #[error("A {name} block needs at least one row", name = StyledName::from("table"))]
    #[diagnostic(
        code(folio::content::empty_table),
        help("Add at least one entry to `data.rows`, or remove the table.")
    )]
    EmptyTable,

    #[error("An {name} block needs at least one image", name = StyledName::from("image-gallery"))]
    #[diagnostic(
        code(folio::content::empty_gallery),
        help("Add at least one entry to `data.images`, or remove the gallery.")
    )]
    EmptyGallery,

    #[error("Gallery image {index} is missing its `src`")]
    #[diagnostic(code(folio::content::gallery_item))]
    GalleryItemMissingSrc { index: StyledNum<usize> },

    #[error("A layout row holds {count} components, but I can fit at most {max}")]
    #[diagnostic(
        code(folio::content::layout_row_too_wide),
        help("Split the components across several rows with `data.rows`.")
    )]
    LayoutRowTooWide {
        count: StyledNum<usize>,
        max: StyledNum<usize>,
    },

    #[error("A layout row has {widths} widths for {components} components")]
    #[diagnostic(
        code(folio::content::layout_widths_mismatch),
        help("Give one width per component, or leave `widths` out for equal columns.")
    )]
    LayoutWidthsMismatch {
        widths: StyledNum<usize>,
        components: StyledNum<usize>,
    },

    #[error("Layout row width {value} isn't a positive number")]
    #[diagnostic(
        code(folio::content::layout_width),
        help("Widths can be numbers like `2` or percentage strings like `\"40%\"`.")
    )]
    InvalidLayoutWidth { value: StyledName },

    #[error("I couldn't find the HTML fragment at {path}")]
    #[diagnostic(
        code(folio::content::html_fragment),
        help("I looked at the path as written and under `src/`. Check `data.url` on the html-content block.")
    )]
    HtmlContentMissing { path: StyledPath },

    #[error("I couldn't find the content source {path}")]
    #[diagnostic(
        code(folio::collection::source_not_found),
        help("Collection sources are folders under your content directory, like `news` or `content/news`.")
    )]
    CollectionSourceNotFound { path: StyledPath },

    #[error("The path {path} reaches outside the site")]
    #[diagnostic(
        code(folio::path::traversal),
        help("Paths in content documents can't contain `..` segments.")
    )]
    PathTraversal { path: StyledPath },

    #[error("I couldn't render {file}")]
    #[diagnostic(code(folio::content::page))]
    PageRender {
        file: StyledPath,
        #[source]
        cause: Box<FolioError>,
    },

    // === Template Errors ===
    #[error("The template name {name} isn't valid")]
    #[diagnostic(
        code(folio::template::name),
        help("Template names use lowercase letters, numbers, and '-'.")
    )]
    InvalidTemplateName { name: StyledName },

    #[error("I couldn't find the {name} template")]
    #[diagnostic(
        code(folio::template::not_found),
        help("I expected a template-config.json at {expected}.")
    )]
    TemplateNotFound {
        name: StyledName,
        expected: StyledPath,
    },

    #[error("I couldn't understand the template config at {path}")]
    #[diagnostic(
        code(folio::template::config),
        help("template-config.json needs an `html` entry and optional `styles` and `scripts` lists.")
    )]
    TemplateConfig { path: StyledPath, reason: String },

    #[error("I ran into a problem while rendering the template {file}")]
    #[diagnostic(
        code(folio::template::render),
        help("Template placeholders look like {{{{ title }}}}. Check that every tag is closed.")
    )]
    TemplateRender {
        file: StyledPath,
        #[source_code]
        src: NamedSource<String>,
        #[label("{reason}")]
        span: SourceSpan,
        reason: String,
    },

    // === File Errors ===
    #[error("I couldn't find the file at {path}")]
    #[diagnostic(
        code(folio::file::not_found),
        help("Make sure the file exists and the path is correct.")
    )]
    FileNotFound { path: StyledPath },

    #[error("I couldn't read the file at {path}")]
    #[diagnostic(code(folio::file::read))]
    FileRead {
        path: StyledPath,
        #[source]
        cause: std::io::Error,
    },

    #[error("I couldn't write to {path}")]
    #[diagnostic(code(folio::file::write))]
    FileWrite {
        path: StyledPath,
        #[source]
        cause: std::io::Error,
    },

    // === Build Errors ===
    #[error("I couldn't find {page} among your content documents")]
    #[diagnostic(
        code(folio::build::page_not_found),
        help("Single-page builds take a content JSON path such as `src/content/1-news/1-post.json`.")
    )]
    PageNotFound { page: StyledPath },

    #[error("The referenced asset {path} doesn't exist")]
    #[diagnostic(
        code(folio::build::asset_missing),
        help("A page links to this file, but I couldn't find it in src/assets, src/css or src/js.")
    )]
    AssetMissing { path: StyledPath },

    #[error("A background task failed: {reason}")]
    #[diagnostic(
        code(folio::build::task_join),
        help("A parallel task panicked or was cancelled during the build.")
    )]
    TaskJoin { reason: String },

    #[error("I couldn't create the output directory at {path}")]
    #[diagnostic(code(folio::build::create_dir))]
    CreateDir {
        path: StyledPath,
        #[source]
        cause: std::io::Error,
    },

    #[error("I couldn't copy the file from {src} to {dest}")]
    #[diagnostic(code(folio::build::copy_file))]
    CopyFile {
        src: StyledPath,
        dest: StyledPath,
        #[source]
        cause: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, FolioError>;

impl FolioError {
    /// Create a config parse error with source span from a TOML error
    pub fn config_parse(path: &Path, content: &str, error: toml::de::Error) -> Self {
        let span = error
            .span()
            .map(|r| SourceSpan::new(r.start.into(), (r.end - r.start).max(1)))
            .unwrap_or_else(|| SourceSpan::from((0_usize, 1_usize)));

        FolioError::ConfigParse {
            src: NamedSource::new(path.display().to_string(), content.to_string()),
            span,
            reason: error.message().to_string(),
        }
    }

    /// Create a content parse error pointing at the line/column serde_json reported
    pub fn content_parse(path: &Path, content: &str, error: &serde_json::Error) -> Self {
        let offset = line_column_offset(content, error.line(), error.column());
        let len = content[offset.min(content.len())..]
            .chars()
            .next()
            .map(char::len_utf8)
            .unwrap_or(1);

        FolioError::ContentParse {
            file: StyledPath::from(path),
            src: NamedSource::new(path.display().to_string(), content.to_string()),
            span: SourceSpan::new(offset.into(), len),
            reason: error.to_string(),
        }
    }

    /// Create an unknown block type error, suggesting the closest known type
    pub fn unknown_block_type(block_type: &str, known: &[&str]) -> Self {
        let candidates: Vec<String> = known.iter().map(|s| s.to_string()).collect();
        let mut help_text = String::new();
        if let Some(suggestion) = find_best_match(block_type, &candidates) {
            help_text.push_str(&format!("Hint: Did you mean `{}`?\n\n", suggestion));
        }
        help_text.push_str(&format!("Block types I can render: {}", known.join(", ")));

        FolioError::UnknownBlockType {
            block_type: StyledName::from(block_type),
            help_text,
        }
    }

    pub fn invalid_block_data(block_type: &str, error: impl fmt::Display) -> Self {
        FolioError::InvalidBlockData {
            block_type: StyledName::from(block_type),
            reason: error.to_string(),
        }
    }

    pub fn missing_field(block_type: &str, field: &'static str) -> Self {
        FolioError::MissingField {
            block_type: StyledName::from(block_type),
            field,
        }
    }

    /// Create a template render error from a MiniJinja error
    pub fn template_render(name: &str, content: &str, error: &minijinja::Error) -> Self {
        FolioError::TemplateRender {
            file: StyledPath::from(name),
            src: NamedSource::new(name.to_string(), content.to_string()),
            span: extract_template_span(error, content),
            reason: error
                .detail()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string()),
        }
    }

    /// Attach the source document to an error raised while rendering it
    pub fn in_page(self, file: &Path) -> Self {
        match self {
            already @ FolioError::PageRender { .. } => already,
            other => FolioError::PageRender {
                file: StyledPath::from(file),
                cause: Box::new(other),
            },
        }
    }
}

fn line_column_offset(content: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start: usize = content
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(content.len())
}

/// Extract source span from MiniJinja error
/// Uses byte range if available (debug feature), otherwise falls back to line number
fn extract_template_span(error: &minijinja::Error, content: &str) -> SourceSpan {
    if let Some(range) = error.range() {
        let start = range.start.min(content.len());
        let end = range.end.min(content.len());
        return SourceSpan::new(start.into(), (end.saturating_sub(start)).max(1));
    }

    if let Some(line_num) = error.line() {
        let offset = line_column_offset(content, line_num, 1);
        let line_len = content
            .lines()
            .nth(line_num.saturating_sub(1))
            .map(|l| l.len().max(1))
            .unwrap_or(1);
        return SourceSpan::new(offset.into(), line_len);
    }

    SourceSpan::from((0_usize, 1_usize))
}

/// Calculate edit distance between two strings (Levenshtein distance)
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.to_lowercase().chars().collect();
    let b_chars: Vec<char> = b.to_lowercase().chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut dp = vec![vec![0; n + 1]; m + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        dp[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
        }
    }

    dp[m][n]
}

/// Find the best fuzzy match from a list of candidates
fn find_best_match<'a>(name: &str, candidates: &'a [String]) -> Option<&'a str> {
    let max_distance = (name.len() / 2).max(2);

    candidates
        .iter()
        .filter_map(|candidate| {
            let distance = edit_distance(name, candidate);
            (distance <= max_distance && distance > 0).then_some((candidate.as_str(), distance))
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Extension trait for adding folio error context to IO operations
pub trait FolioResultExt<T> {
    /// Add file read context to an error
    fn with_file_read(self, path: &Path) -> Result<T>;
}

impl<T> FolioResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_file_read(self, path: &Path) -> Result<T> {
        self.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FolioError::FileNotFound {
                    path: StyledPath::from(path),
                }
            } else {
                FolioError::FileRead {
                    path: StyledPath::from(path),
                    cause: e,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("table", "table"), 0);
        assert_eq!(edit_distance("tabel", "table"), 2);
        assert_eq!(edit_distance("", "map"), 3);
    }

    #[test]
    fn test_unknown_block_type_suggests_closest() {
        let err = FolioError::unknown_block_type("paragrph", &["paragraph", "heading", "list"]);
        match err {
            FolioError::UnknownBlockType { help_text, .. } => {
                assert!(help_text.contains("Did you mean `paragraph`?"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_block_type_without_close_match() {
        let err = FolioError::unknown_block_type("carousel-3d-spinner", &["map", "list"]);
        match err {
            FolioError::UnknownBlockType { help_text, .. } => {
                assert!(!help_text.contains("Did you mean"));
                assert!(help_text.contains("map, list"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_line_column_offset() {
        let content = "{\n  \"a\": 1,\n}";
        assert_eq!(line_column_offset(content, 1, 1), 0);
        assert_eq!(line_column_offset(content, 2, 3), 4);
        assert_eq!(line_column_offset(content, 0, 0), 0);
    }

    #[test]
    fn test_in_page_wraps_once() {
        let err = FolioError::EmptyTable.in_page(Path::new("a.json"));
        let err = err.in_page(Path::new("b.json"));
        match err {
            FolioError::PageRender { file, cause } => {
                assert_eq!(file.0, "a.json");
                assert!(matches!(*cause, FolioError::EmptyTable));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
