//! The page document model.
//!
//! Documents are JSON. They are read in stages: text to a `serde_json::Value`
//! (so parse errors can point at a line), config-token resolution on that
//! tree, then into [`Page`]. Blocks first land as [`RawBlock`]s keyed by their
//! `type` string and are converted into the closed [`BlockContent`] sum type;
//! an unknown `type` fails the conversion.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blocks::orcid::OrcidData;
use crate::config::ScriptEntry;
use crate::error::{FolioError, Result};
use crate::html::slugify_title;

/// Every block `type` a document may use, in the order they're listed in help text.
pub const BLOCK_TYPES: &[&str] = &[
    "paragraph",
    "heading",
    "list",
    "timeline",
    "link",
    "link-groups",
    "card-grid",
    "asset",
    "form",
    "table",
    "code-block",
    "map",
    "embed",
    "image-gallery",
    "media-image",
    "feature-image",
    "profile-image",
    "content-collection",
    "content-carousel",
    "html-content",
    "layout-row",
    "orcid",
];

#[derive(Debug, Clone)]
pub struct Page {
    pub header: Option<Header>,
    pub body: Vec<Block>,
    pub footer: Option<Footer>,
    pub meta: PageMeta,
    pub presentation: Presentation,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Header {
    pub title: String,
    pub subtitle: Option<String>,
    pub lead: Option<String>,
    pub image: Option<HeaderImage>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderImage {
    pub src: String,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Footer {
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub canonical: Option<String>,
    pub image: Option<String>,
    pub robots: Option<String>,
    pub language: Option<String>,
    pub social: SocialMeta,
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
    pub last_updated: Option<String>,
    pub published: Option<bool>,
    pub status: Option<String>,
    pub visibility: Option<String>,
    pub slug_from_title: bool,
    pub gen_sub_menus: Option<bool>,
    pub gen_related_pages: bool,
}

/// Open Graph / Twitter overrides
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SocialMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub card: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStatus {
    Published,
    Draft,
}

impl PageMeta {
    /// `published` wins, then `status`, then `visibility` (private means draft).
    pub fn publish_status(&self) -> PublishStatus {
        if let Some(published) = self.published {
            return if published {
                PublishStatus::Published
            } else {
                PublishStatus::Draft
            };
        }

        match self.status.as_deref().map(|s| s.trim().to_lowercase()).as_deref() {
            Some("published") => return PublishStatus::Published,
            Some("draft") => return PublishStatus::Draft,
            _ => {}
        }

        match self.visibility.as_deref().map(|v| v.trim().to_lowercase()).as_deref() {
            Some("private") => PublishStatus::Draft,
            _ => PublishStatus::Published,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Presentation {
    pub template: Option<String>,
    pub body_class: Option<String>,
    pub extra_styles: Vec<String>,
    pub extra_scripts: Vec<ScriptEntry>,
}

/// File name (without `.html`) a document is published under.
///
/// The file stem, unless `meta.slugFromTitle` asks for a slug of the title.
pub fn output_basename(file_name: &str, meta: &PageMeta, header: Option<&Header>) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    if !meta.slug_from_title {
        return stem;
    }

    let title = meta
        .title
        .as_deref()
        .or(header.map(|h| h.title.as_str()))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(&stem);
    let slug = slugify_title(title);
    if slug.is_empty() { stem } else { slug }
}

/// A page exactly as written, before block types are checked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPage {
    pub header: Option<Header>,
    pub body: Vec<RawBlock>,
    pub footer: Option<Footer>,
    pub meta: PageMeta,
    pub presentation: Presentation,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub style: Vec<String>,
    #[serde(default)]
    pub data: Value,
}

impl Page {
    /// Parse document text into a JSON tree, reporting syntax errors with a span.
    pub fn parse_document(path: &Path, content: &str) -> Result<Value> {
        serde_json::from_str(content).map_err(|e| FolioError::content_parse(path, content, &e))
    }

    /// Build a typed page from a (config-resolved) JSON tree.
    pub fn from_value(value: Value) -> Result<Page> {
        let raw: RawPage = serde_json::from_value(value)
            .map_err(|e| FolioError::InvalidDocument { reason: e.to_string() })?;
        raw.try_into()
    }

    pub fn output_basename(&self, file_name: &str) -> String {
        output_basename(file_name, &self.meta, self.header.as_ref())
    }

    /// Page title for the shell and navigation: meta title, then header title.
    pub fn title(&self) -> Option<&str> {
        self.meta
            .title
            .as_deref()
            .or(self.header.as_ref().map(|h| h.title.as_str()))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

impl TryFrom<RawPage> for Page {
    type Error = FolioError;

    fn try_from(raw: RawPage) -> Result<Page> {
        let body = raw
            .body
            .into_iter()
            .map(Block::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page {
            header: raw.header,
            body,
            footer: raw.footer,
            meta: raw.meta,
            presentation: raw.presentation,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    pub id: Option<String>,
    pub style: Vec<String>,
    pub content: BlockContent,
}

#[derive(Debug, Clone)]
pub enum BlockContent {
    Paragraph(ParagraphData),
    Heading(HeadingData),
    List(ListData),
    Timeline(TimelineData),
    Link(LinkData),
    LinkGroups(LinkGroupsData),
    CardGrid(CardGridData),
    Asset(AssetData),
    Form(FormData),
    Table(TableData),
    CodeBlock(CodeBlockData),
    Map(MapData),
    Embed(EmbedData),
    ImageGallery(ImageGalleryData),
    MediaImage(MediaImageData),
    /// Also written as `profile-image`
    FeatureImage(FeatureImageData),
    ContentCollection(ContentCollectionData),
    ContentCarousel(ContentCarouselData),
    HtmlContent(HtmlContentData),
    LayoutRow(LayoutRowData),
    Orcid(OrcidData),
}

impl Block {
    /// Canonical type name; `profile-image` blocks report `feature-image`.
    pub fn type_name(&self) -> &'static str {
        match &self.content {
            BlockContent::Paragraph(_) => "paragraph",
            BlockContent::Heading(_) => "heading",
            BlockContent::List(_) => "list",
            BlockContent::Timeline(_) => "timeline",
            BlockContent::Link(_) => "link",
            BlockContent::LinkGroups(_) => "link-groups",
            BlockContent::CardGrid(_) => "card-grid",
            BlockContent::Asset(_) => "asset",
            BlockContent::Form(_) => "form",
            BlockContent::Table(_) => "table",
            BlockContent::CodeBlock(_) => "code-block",
            BlockContent::Map(_) => "map",
            BlockContent::Embed(_) => "embed",
            BlockContent::ImageGallery(_) => "image-gallery",
            BlockContent::MediaImage(_) => "media-image",
            BlockContent::FeatureImage(_) => "feature-image",
            BlockContent::ContentCollection(_) => "content-collection",
            BlockContent::ContentCarousel(_) => "content-carousel",
            BlockContent::HtmlContent(_) => "html-content",
            BlockContent::LayoutRow(_) => "layout-row",
            BlockContent::Orcid(_) => "orcid",
        }
    }
}

fn block_data<T: DeserializeOwned>(block_type: &str, data: Value) -> Result<T> {
    let data = if data.is_null() {
        Value::Object(Default::default())
    } else {
        data
    };
    serde_json::from_value(data).map_err(|e| FolioError::invalid_block_data(block_type, e))
}

impl TryFrom<RawBlock> for Block {
    type Error = FolioError;

    fn try_from(raw: RawBlock) -> Result<Block> {
        let RawBlock {
            block_type,
            id,
            style,
            data,
        } = raw;
        let name = block_type.as_str();

        let content = match name {
            "paragraph" => BlockContent::Paragraph(block_data(name, data)?),
            "heading" => BlockContent::Heading(block_data(name, data)?),
            "list" => BlockContent::List(block_data(name, data)?),
            "timeline" => BlockContent::Timeline(block_data(name, data)?),
            "link" => BlockContent::Link(block_data(name, data)?),
            "link-groups" => BlockContent::LinkGroups(block_data(name, data)?),
            "card-grid" => BlockContent::CardGrid(block_data(name, data)?),
            "asset" => BlockContent::Asset(block_data(name, data)?),
            "form" => BlockContent::Form(block_data(name, data)?),
            "table" => BlockContent::Table(block_data(name, data)?),
            "code-block" => BlockContent::CodeBlock(block_data(name, data)?),
            "map" => BlockContent::Map(block_data(name, data)?),
            "embed" => BlockContent::Embed(block_data(name, data)?),
            "image-gallery" => BlockContent::ImageGallery(block_data(name, data)?),
            "media-image" => BlockContent::MediaImage(block_data(name, data)?),
            "feature-image" | "profile-image" => {
                BlockContent::FeatureImage(block_data(name, data)?)
            }
            "content-collection" => BlockContent::ContentCollection(block_data(name, data)?),
            "content-carousel" => BlockContent::ContentCarousel(block_data(name, data)?),
            "html-content" => BlockContent::HtmlContent(block_data(name, data)?),
            "layout-row" => {
                let raw: RawLayoutRowData = block_data(name, data)?;
                BlockContent::LayoutRow(raw.try_into()?)
            }
            "orcid" => BlockContent::Orcid(block_data(name, data)?),
            other => return Err(FolioError::unknown_block_type(other, BLOCK_TYPES)),
        };

        Ok(Block { id, style, content })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParagraphData {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeadingData {
    #[serde(default)]
    pub text: String,
    pub level: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListData {
    pub ordered: bool,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TimelineData {
    pub items: Vec<TimelineItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TimelineItem {
    pub period: String,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LinkData {
    pub label: String,
    pub url: String,
    pub external: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LinkGroupsData {
    pub title: Option<String>,
    pub columns: Option<i64>,
    pub groups: Vec<LinkGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LinkGroup {
    pub title: Option<String>,
    pub links: Vec<GroupLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GroupLink {
    pub label: Option<String>,
    pub url: String,
    pub icon: Option<String>,
    /// Links are external unless this is explicitly `false`
    pub external: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CardGridData {
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Card {
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
    pub link_label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssetData {
    pub kind: String,
    pub src: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormData {
    pub provider: Option<String>,
    pub endpoint: String,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub input_type: Option<String>,
    pub required: bool,
    pub help_text: Option<String>,
    pub placeholder: Option<String>,
    pub autocomplete: Option<String>,
    pub validation: FieldValidation,
    pub messages: FieldMessages,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldValidation {
    pub min_length: Option<i64>,
    pub max_length: Option<i64>,
    pub pattern: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

/// Per-constraint error messages, keyed like the browser's `ValidityState`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldMessages {
    pub required: Option<String>,
    pub type_mismatch: Option<String>,
    pub pattern_mismatch: Option<String>,
    pub too_short: Option<String>,
    pub too_long: Option<String>,
    pub range_underflow: Option<String>,
    pub range_overflow: Option<String>,
}

impl FieldMessages {
    pub fn entries(&self) -> [(&'static str, Option<&str>); 7] {
        [
            ("required", self.required.as_deref()),
            ("typeMismatch", self.type_mismatch.as_deref()),
            ("patternMismatch", self.pattern_mismatch.as_deref()),
            ("tooShort", self.too_short.as_deref()),
            ("tooLong", self.too_long.as_deref()),
            ("rangeUnderflow", self.range_underflow.as_deref()),
            ("rangeOverflow", self.range_overflow.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TableData {
    pub headers: Vec<Value>,
    /// Each row is an array of cells; anything else is a one-cell row
    pub rows: Vec<Value>,
    pub caption: Option<String>,
    pub compact: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CodeBlockData {
    pub code: String,
    pub language: Option<String>,
    pub caption: Option<String>,
    pub line_numbers: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapData {
    pub title: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub height: Option<f64>,
    pub provider: Option<String>,
    pub embed_url: Option<String>,
    pub link_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmbedData {
    pub src: String,
    pub kind: Option<String>,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub ratio: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageGalleryData {
    pub title: Option<String>,
    pub layout: Option<String>,
    pub zoom: Option<bool>,
    pub carousel: Option<bool>,
    pub gap: Option<f64>,
    pub images: Vec<GalleryImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GalleryImage {
    pub src: String,
    pub alt: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaImageData {
    pub src: String,
    pub alt: Option<String>,
    pub caption: Option<String>,
    pub legend: Option<String>,
    pub zoom: bool,
    pub width: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureImageData {
    pub src: String,
    pub alt: Option<String>,
    pub shape: Option<String>,
    pub load_effect: Option<String>,
    pub shadow: bool,
    pub zoom: bool,
    pub size: Option<f64>,
}

/// Options shared by the collection and carousel blocks
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectionSource {
    pub source: String,
    pub include_root_files: bool,
    pub published_only: Option<bool>,
    pub exclude: Vec<String>,
    pub excerpt_length: Option<f64>,
    pub default_sort: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentCollectionData {
    #[serde(flatten)]
    pub source: CollectionSource,
    pub title: Option<String>,
    pub intro: Option<String>,
    pub max_columns: Option<f64>,
    pub enable_sort: bool,
    pub enable_filter: bool,
    pub empty_message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentCarouselData {
    #[serde(flatten)]
    pub source: CollectionSource,
    pub title: Option<String>,
    pub intro: Option<String>,
    pub empty_message: Option<String>,
    pub card_min_width: Option<f64>,
    pub view_more_url: Option<String>,
    pub view_more_label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HtmlContentData {
    pub url: String,
}

/// One or more rows of nested blocks.
#[derive(Debug, Clone, Default)]
pub struct LayoutRowData {
    pub rows: Vec<LayoutRowSpec>,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutRowSpec {
    pub components: Vec<Block>,
    /// Numbers or `"N%"` strings, one per component
    pub widths: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawLayoutRowData {
    components: Vec<RawBlock>,
    widths: Vec<Value>,
    rows: Vec<RawLayoutRow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawLayoutRow {
    components: Vec<RawBlock>,
    widths: Vec<Value>,
}

impl TryFrom<RawLayoutRow> for LayoutRowSpec {
    type Error = FolioError;

    fn try_from(raw: RawLayoutRow) -> Result<LayoutRowSpec> {
        Ok(LayoutRowSpec {
            components: raw
                .components
                .into_iter()
                .map(Block::try_from)
                .collect::<Result<Vec<_>>>()?,
            widths: raw.widths,
        })
    }
}

impl TryFrom<RawLayoutRowData> for LayoutRowData {
    type Error = FolioError;

    /// The implicit row (top-level `components`) comes first, then `rows` in order.
    fn try_from(raw: RawLayoutRowData) -> Result<LayoutRowData> {
        let implicit = RawLayoutRow {
            components: raw.components,
            widths: raw.widths,
        };
        let rows = std::iter::once(implicit)
            .chain(raw.rows)
            .filter(|row| !row.components.is_empty())
            .map(LayoutRowSpec::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(LayoutRowData { rows })
    }
}

/// Plain-text form of a JSON scalar, as a document author would read it.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n
            .as_f64()
            .map(crate::html::format_number)
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}
