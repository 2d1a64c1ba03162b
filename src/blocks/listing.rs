//! `content-collection` and `content-carousel`: listings of other documents.
//!
//! Both scan their source folder through [`crate::collection::collect`] on
//! every render. The collection adds static sort/search/tag controls; the
//! carousel adds scroll buttons and a "view more" link.

use crate::blocks::{RenderContext, non_empty};
use crate::collection::{
    CollectOptions, ContentEntry, DEFAULT_EXCERPT_LENGTH, MAX_EXCERPT_LENGTH, MIN_EXCERPT_LENGTH,
    SortKey, collect, natural_cmp,
};
use crate::error::Result;
use crate::html::{block_classes, escape_html};
use crate::inline::{InlineOptions, format_inline};
use crate::model::{Block, CollectionSource, ContentCarouselData, ContentCollectionData};
use crate::url::{Relative, resolve_href};

const DEFAULT_EMPTY_MESSAGE: &str = "No published content yet.";
const DEFAULT_COLUMNS: usize = 3;
const CAROUSEL_LIMIT: usize = 6;
const CAROUSEL_EXCERPT_LENGTH: usize = 150;
const CAROUSEL_CARD_WIDTH: f64 = 300.0;

const PREV_ICON: &str = r#"<svg viewBox="0 0 24 24" aria-hidden="true"><path d="M14.7 5.3a1 1 0 0 1 0 1.4L10.41 11l4.3 4.3a1 1 0 0 1-1.42 1.4l-5-5a1 1 0 0 1 0-1.4l5-5a1 1 0 0 1 1.4 0z"/></svg>"#;
const NEXT_ICON: &str = r#"<svg viewBox="0 0 24 24" aria-hidden="true"><path d="M9.29 18.7a1 1 0 0 1 0-1.41L13.58 13l-4.3-4.29a1 1 0 1 1 1.42-1.42l5 5a1 1 0 0 1 0 1.42l-5 5a1 1 0 0 1-1.41 0z"/></svg>"#;

/// Round a finite number and clamp it; anything else is `default`.
fn clamp_round(value: Option<f64>, default: usize, min: usize, max: usize) -> usize {
    match value.filter(|v| v.is_finite()) {
        Some(v) => v.round().clamp(min as f64, max as f64) as usize,
        None => default,
    }
}

/// A whole number, as opposed to one that merely rounds to one.
fn whole(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && v.fract() == 0.0)
}

fn collect_options(source: &CollectionSource, excerpt_length: usize, limit: Option<usize>) -> CollectOptions {
    CollectOptions {
        source: source.source.clone(),
        include_root_files: source.include_root_files,
        published_only: source.published_only.unwrap_or(true),
        exclude: source.exclude.clone(),
        excerpt_length,
        sort: SortKey::from_key(source.default_sort.as_deref()),
        limit,
    }
}

fn empty_message(message: Option<&str>) -> String {
    escape_html(non_empty(message).unwrap_or(DEFAULT_EMPTY_MESSAGE))
}

fn title_and_intro(prefix: &str, title: Option<&str>, intro: Option<&str>) -> Result<String> {
    let mut html = String::new();
    if let Some(title) = non_empty(title) {
        html.push_str(&format!(
            "<h2 class=\"{prefix}-title\">{}</h2>\n",
            format_inline(title, &InlineOptions::single_line())?
        ));
    }
    if let Some(intro) = non_empty(intro) {
        html.push_str(&format!(
            "<p class=\"{prefix}-intro\">{}</p>\n",
            format_inline(intro, &InlineOptions::default())?
        ));
    }
    Ok(html)
}

/// The link body shared by collection and carousel cards.
fn card_link(prefix: &str, entry: &ContentEntry) -> Result<String> {
    let media = if entry.image.is_empty() {
        String::new()
    } else {
        format!(
            "<div class=\"{prefix}-card-media\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\" decoding=\"async\" /></div>\n",
            escape_html(&entry.image),
            escape_html(&entry.title)
        )
    };
    let date = if entry.date_label.is_empty() {
        String::new()
    } else {
        format!(
            "<time class=\"{prefix}-date\" datetime=\"{}\">{}</time>\n",
            escape_html(&entry.date_iso),
            escape_html(&entry.date_label)
        )
    };
    let excerpt = if entry.excerpt.is_empty() {
        String::new()
    } else {
        format!(
            "<p class=\"{prefix}-card-excerpt\">{}</p>\n",
            format_inline(&entry.excerpt, &InlineOptions::no_links())?
        )
    };
    let tags = if entry.tags.is_empty() {
        String::new()
    } else {
        let items: String = entry
            .tags
            .iter()
            .map(|tag| format!("<li>{}</li>", escape_html(tag)))
            .collect();
        format!("<ul class=\"{prefix}-tags\">{items}</ul>\n")
    };

    Ok(format!(
        "<a class=\"{prefix}-card-link\" href=\"{}\">\n{media}<div class=\"{prefix}-card-body\">\n{date}\
         <h3 class=\"{prefix}-card-title\">{}</h3>\n{excerpt}{tags}</div>\n</a>\n",
        escape_html(&entry.href),
        format_inline(&entry.title, &InlineOptions::label())?,
    ))
}

pub fn render_content_collection(
    block: &Block,
    data: &ContentCollectionData,
    ctx: &RenderContext,
) -> Result<String> {
    let columns = clamp_round(data.max_columns, DEFAULT_COLUMNS, 2, 4);
    let excerpt_length = clamp_round(
        data.source.excerpt_length,
        DEFAULT_EXCERPT_LENGTH,
        MIN_EXCERPT_LENGTH,
        MAX_EXCERPT_LENGTH,
    );
    let limit = data.source.limit.filter(|l| *l > 0).map(|l| l as usize);
    let options = collect_options(&data.source, excerpt_length, limit);
    let entries = collect(ctx, &options)?;

    let controls = if data.enable_sort || data.enable_filter {
        collection_controls(data, options.sort, &collection_tags(&entries))
    } else {
        String::new()
    };
    let body = if entries.is_empty() {
        format!(
            "<p class=\"content-collection-empty\">{}</p>\n",
            empty_message(data.empty_message.as_deref())
        )
    } else {
        let cards = entries.iter().map(collection_card).collect::<Result<String>>()?;
        format!("<div class=\"content-collection-grid\" data-collection-grid>\n{cards}</div>\n")
    };

    Ok(format!(
        "<section class=\"{}\" style=\"--content-collection-columns: {columns};\" data-content-collection data-default-sort=\"{}\">\n\
         {}{controls}{body}</section>\n",
        block_classes(&["content-collection", "block-content-collection"], &block.style),
        options.sort.as_str(),
        title_and_intro(
            "content-collection",
            data.title.as_deref(),
            data.intro.as_deref()
        )?,
    ))
}

/// Every distinct tag, sorted case-insensitively.
fn collection_tags(entries: &[ContentEntry]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in entries.iter().flat_map(|e| &e.tags) {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    tags.sort_by(|a, b| natural_cmp(a, b));
    tags
}

fn collection_controls(data: &ContentCollectionData, selected: SortKey, tags: &[String]) -> String {
    let mut html = String::from("<div class=\"content-collection-controls\" data-collection-controls>\n");

    if data.enable_sort {
        let options: String = SortKey::ALL
            .into_iter()
            .map(|sort| {
                let marker = if sort == selected { " selected=\"selected\"" } else { "" };
                format!("<option value=\"{}\"{marker}>{}</option>", sort.as_str(), sort.label())
            })
            .collect();
        html.push_str(&format!(
            "<label class=\"content-collection-control\"><span>Sort</span><select data-collection-sort>{options}</select></label>\n"
        ));
    }

    if data.enable_filter {
        html.push_str(
            "<label class=\"content-collection-control content-collection-search\"><span>Search</span>\
             <input type=\"search\" placeholder=\"Search titles and summaries...\" data-collection-search /></label>\n",
        );
        if !tags.is_empty() {
            let options: String = tags
                .iter()
                .map(|tag| {
                    format!(
                        "<label class=\"content-collection-tag-option\"><input type=\"checkbox\" value=\"{}\" /><span>{}</span></label>\n",
                        escape_html(&tag.to_lowercase()),
                        escape_html(tag)
                    )
                })
                .collect();
            html.push_str(&format!(
                "<details class=\"content-collection-tags-dropdown\">\n\
                 <summary><span>Tags</span><span class=\"content-collection-tags-count\">{}</span></summary>\n\
                 <fieldset class=\"content-collection-tags-filter\" data-collection-tags>\n\
                 <legend class=\"sr-only\">Tags</legend>\n{options}</fieldset>\n</details>\n",
                tags.len()
            ));
        }
    }

    html.push_str("</div>\n");
    html
}

fn collection_card(entry: &ContentEntry) -> Result<String> {
    let tags: Vec<String> = entry.tags.iter().map(|t| t.to_lowercase()).collect();
    let search = format!("{} {} {}", entry.title, entry.excerpt, entry.tags.join(" ")).to_lowercase();

    Ok(format!(
        "<article class=\"content-collection-card\" data-collection-item data-title=\"{}\" data-excerpt=\"{}\" \
         data-search=\"{}\" data-tags=\"{}\" data-date-order=\"{}\">\n{}</article>\n",
        escape_html(&entry.title.to_lowercase()),
        escape_html(&entry.excerpt.to_lowercase()),
        escape_html(&search),
        escape_html(&tags.join("|")),
        entry.date_order,
        card_link("content-collection", entry)?,
    ))
}

pub fn render_content_carousel(
    block: &Block,
    data: &ContentCarouselData,
    ctx: &RenderContext,
) -> Result<String> {
    let limit = data
        .source
        .limit
        .filter(|l| *l > 0)
        .map_or(CAROUSEL_LIMIT, |l| l as usize);
    let excerpt_length = whole(data.source.excerpt_length)
        .map_or(CAROUSEL_EXCERPT_LENGTH, |l| {
            l.clamp(MIN_EXCERPT_LENGTH as f64, MAX_EXCERPT_LENGTH as f64) as usize
        });
    let card_width = data
        .card_min_width
        .filter(|w| w.is_finite() && *w > 200.0)
        .map_or(CAROUSEL_CARD_WIDTH, |w| w.round().min(420.0));

    let entries = collect(ctx, &collect_options(&data.source, excerpt_length, Some(limit)))?;

    let body = if entries.is_empty() {
        format!(
            "<p class=\"content-carousel-empty\">{}</p>\n",
            empty_message(data.empty_message.as_deref())
        )
    } else {
        let cards = entries
            .iter()
            .map(|entry| -> Result<String> {
                Ok(format!(
                    "<article class=\"content-carousel-card\">\n{}</article>\n",
                    card_link("content-carousel", entry)?
                ))
            })
            .collect::<Result<String>>()?;
        format!(
            "{}<div class=\"content-carousel-track\" data-carousel-track style=\"--content-carousel-card-width: {card_width}px;\">\n{cards}</div>\n",
            carousel_controls(data)?
        )
    };

    Ok(format!(
        "<section class=\"{}\" data-content-carousel>\n{}{body}</section>\n",
        block_classes(&["content-carousel", "block-content-carousel"], &block.style),
        title_and_intro("content-carousel", data.title.as_deref(), data.intro.as_deref())?,
    ))
}

fn carousel_controls(data: &ContentCarouselData) -> Result<String> {
    let view_more = match non_empty(data.view_more_url.as_deref()) {
        Some(url) => format!(
            "<a class=\"content-carousel-view-more\" href=\"{}\">{}</a>\n",
            escape_html(&resolve_href(url, "#", Relative::Site)?),
            format_inline(
                non_empty(data.view_more_label.as_deref()).unwrap_or("View more"),
                &InlineOptions::label()
            )?
        ),
        None => String::new(),
    };

    Ok(format!(
        "<div class=\"content-carousel-controls\">\n<div class=\"content-carousel-nav\">\n\
         <button type=\"button\" class=\"content-carousel-btn is-prev\" data-carousel-prev aria-label=\"Previous items\">{PREV_ICON}</button>\n\
         <button type=\"button\" class=\"content-carousel-btn is-next\" data-carousel-next aria-label=\"Next items\">{NEXT_ICON}</button>\n\
         </div>\n{view_more}</div>\n"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockContent, ParagraphData};
    use serde_json::{Value, json};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn block() -> Block {
        Block {
            id: None,
            style: vec![],
            content: BlockContent::Paragraph(ParagraphData::default()),
        }
    }

    fn write_doc(root: &Path, relative: &str, doc: Value) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, doc.to_string()).unwrap();
    }

    /// Two items: a published "Item A" and a draft "Item B".
    fn news_site() -> (TempDir, RenderContext) {
        let dir = TempDir::new().unwrap();
        let ctx = RenderContext::new(dir.path(), "src/content");
        let root = ctx.content_root();
        write_doc(&root, "news/items/a.json", json!({
            "meta": {
                "title": "Item A",
                "published": true,
                "publishedTime": "2024-01-01",
                "tags": ["Research", "ai"],
                "description": "About A"
            },
            "body": []
        }));
        write_doc(&root, "news/items/b.json", json!({
            "meta": { "title": "Item B", "published": false, "tags": ["Zeta"] },
            "body": []
        }));
        (dir, ctx)
    }

    fn collection_data(extra: Value) -> ContentCollectionData {
        let mut data = json!({ "source": "news" });
        if let (Some(target), Some(extra)) = (data.as_object_mut(), extra.as_object()) {
            target.extend(extra.clone());
        }
        serde_json::from_value(data).unwrap()
    }

    #[test]
    fn test_collection_shows_published_only() {
        let (_dir, ctx) = news_site();
        let html = render_content_collection(&block(), &collection_data(json!({})), &ctx).unwrap();
        assert!(html.contains("Item A"));
        assert!(!html.contains("Item B"));
        assert!(html.contains("style=\"--content-collection-columns: 3;\""));
        assert!(html.contains("data-default-sort=\"date-desc\""));
        assert!(html.contains("<time class=\"content-collection-date\" datetime=\"2024-01-01\">01 Jan 2024</time>"));
        assert!(html.contains("href=\"{{basePath}}/news/items/a.html\""));
        assert!(html.contains("data-tags=\"research|ai\""));
        assert!(html.contains("data-search=\"item a about a research ai\""));
        assert!(!html.contains("data-collection-controls"));
    }

    #[test]
    fn test_collection_with_drafts_and_controls() {
        let (_dir, ctx) = news_site();
        let data = collection_data(json!({
            "publishedOnly": false,
            "enableSort": true,
            "enableFilter": true,
            "defaultSort": "title-desc",
            "maxColumns": 9
        }));
        let html = render_content_collection(&block(), &data, &ctx).unwrap();
        assert!(html.contains("Item B"));
        assert!(html.find("Item B").unwrap() < html.find("Item A").unwrap());
        assert!(html.contains("--content-collection-columns: 4;"));
        assert!(html.contains("<option value=\"title-desc\" selected=\"selected\">Title Z-A</option>"));
        assert!(html.contains("data-collection-search"));
        assert!(html.contains("<span class=\"content-collection-tags-count\">3</span>"));
        let ai = html.find("value=\"ai\"").unwrap();
        let research = html.find("value=\"research\"").unwrap();
        let zeta = html.find("value=\"zeta\"").unwrap();
        assert!(ai < research && research < zeta);
    }

    #[test]
    fn test_collection_empty_message() {
        let (_dir, ctx) = news_site();
        let data = collection_data(json!({ "exclude": ["a.json"], "emptyMessage": "Nothing <yet>" }));
        let html = render_content_collection(&block(), &data, &ctx).unwrap();
        assert!(html.contains("<p class=\"content-collection-empty\">Nothing &lt;yet&gt;</p>"));
        assert!(!html.contains("data-collection-grid"));
    }

    #[test]
    fn test_carousel() {
        let (_dir, ctx) = news_site();
        let data: ContentCarouselData = serde_json::from_value(json!({
            "source": "news",
            "title": "Latest",
            "cardMinWidth": 512.4,
            "viewMoreUrl": "news/index.html"
        }))
        .unwrap();
        let html = render_content_carousel(&block(), &data, &ctx).unwrap();
        assert!(html.contains("<h2 class=\"content-carousel-title\">Latest</h2>"));
        assert!(html.contains("data-carousel-prev aria-label=\"Previous items\""));
        assert!(html.contains("--content-carousel-card-width: 420px;"));
        assert!(html.contains(
            "<a class=\"content-carousel-view-more\" href=\"{{basePath}}/news/index.html\">View more</a>"
        ));
        assert!(html.contains("<article class=\"content-carousel-card\">"));
        assert!(html.contains("Item A"));
        assert!(!html.contains("Item B"));
    }

    #[test]
    fn test_carousel_defaults_and_empty() {
        let (_dir, ctx) = news_site();
        let data: ContentCarouselData = serde_json::from_value(json!({
            "source": "news",
            "cardMinWidth": 150,
            "exclude": ["a.json"]
        }))
        .unwrap();
        let html = render_content_carousel(&block(), &data, &ctx).unwrap();
        assert!(html.contains("<p class=\"content-carousel-empty\">No published content yet.</p>"));
        assert!(!html.contains("data-carousel-track"));
    }

    #[test]
    fn test_missing_source_fails() {
        let (_dir, ctx) = news_site();
        let data = collection_data(json!({ "source": "archive" }));
        assert!(render_content_collection(&block(), &data, &ctx).is_err());
    }

    #[test]
    fn test_clamp_round() {
        assert_eq!(clamp_round(None, 3, 2, 4), 3);
        assert_eq!(clamp_round(Some(2.6), 3, 2, 4), 3);
        assert_eq!(clamp_round(Some(1.0), 3, 2, 4), 2);
        assert_eq!(clamp_round(Some(f64::NAN), 180, 80, 420), 180);
    }
}
