//! Block dispatch and page body assembly.

use crate::blocks::chrome::{render_footer, render_header};
use crate::blocks::form::render_form;
use crate::blocks::html_content::render_html_content;
use crate::blocks::layout::render_layout_row;
use crate::blocks::links::{render_asset, render_card_grid, render_link, render_link_groups};
use crate::blocks::listing::{render_content_carousel, render_content_collection};
use crate::blocks::media::{
    render_embed, render_feature_image, render_image_gallery, render_map, render_media_image,
};
use crate::blocks::orcid::render_orcid;
use crate::blocks::text::{
    render_code_block, render_heading, render_list, render_paragraph, render_table,
    render_timeline,
};
use crate::blocks::RenderContext;
use crate::error::Result;
use crate::model::{Block, BlockContent, Page};

/// Render one block. Layout rows recurse back through here for their cells.
pub fn render_block(block: &Block, ctx: &RenderContext) -> Result<String> {
    let html = match &block.content {
        BlockContent::Paragraph(data) => render_paragraph(block, data)?,
        BlockContent::Heading(data) => render_heading(block, data)?,
        BlockContent::List(data) => render_list(block, data)?,
        BlockContent::Timeline(data) => render_timeline(block, data)?,
        BlockContent::Link(data) => render_link(block, data)?,
        BlockContent::LinkGroups(data) => render_link_groups(block, data)?,
        BlockContent::CardGrid(data) => render_card_grid(block, data)?,
        BlockContent::Asset(data) => render_asset(block, data)?,
        BlockContent::Form(data) => render_form(block, data)?,
        BlockContent::Table(data) => render_table(block, data)?,
        BlockContent::CodeBlock(data) => render_code_block(block, data)?,
        BlockContent::Map(data) => render_map(block, data)?,
        BlockContent::Embed(data) => render_embed(block, data)?,
        BlockContent::ImageGallery(data) => render_image_gallery(block, data)?,
        BlockContent::MediaImage(data) => render_media_image(block, data)?,
        BlockContent::FeatureImage(data) => render_feature_image(block, data)?,
        BlockContent::ContentCollection(data) => render_content_collection(block, data, ctx)?,
        BlockContent::ContentCarousel(data) => render_content_carousel(block, data, ctx)?,
        BlockContent::HtmlContent(data) => render_html_content(block, data, ctx)?,
        BlockContent::LayoutRow(data) => {
            render_layout_row(block, data, &|nested| render_block(nested, ctx))?
        }
        BlockContent::Orcid(data) => render_orcid(block, data),
    };
    Ok(html)
}

/// Header, `<main>` with every body block in order, then footer.
pub fn render_page(page: &Page, ctx: &RenderContext) -> Result<String> {
    let mut html = String::new();
    if let Some(header) = &page.header {
        html.push_str(&render_header(header)?);
    }

    html.push_str("<main class=\"content\">\n");
    for block in &page.body {
        html.push_str(&render_block(block, ctx)?);
    }
    html.push_str("</main>\n");

    if let Some(footer) = &page.footer {
        html.push_str(&render_footer(footer)?);
    }
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FolioError;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn ctx() -> (TempDir, RenderContext) {
        let dir = TempDir::new().unwrap();
        let ctx = RenderContext::new(dir.path(), "src/content");
        (dir, ctx)
    }

    #[test]
    fn test_page_keeps_body_order() {
        let (_dir, ctx) = ctx();
        let page = Page::from_value(json!({
            "header": { "title": "Home" },
            "body": [
                { "type": "heading", "data": { "text": "First", "level": 2 } },
                { "type": "paragraph", "data": { "text": "Second" } },
                { "type": "list", "data": { "items": ["Third"] } }
            ],
            "footer": { "notes": "Bye" }
        }))
        .unwrap();

        let html = render_page(&page, &ctx).unwrap();
        let header = html.find("<h1>Home</h1>").unwrap();
        let main = html.find("<main class=\"content\">").unwrap();
        let first = html.find("First").unwrap();
        let second = html.find("Second").unwrap();
        let third = html.find("Third").unwrap();
        let footer = html.find("page-footer").unwrap();
        assert!(header < main && main < first && first < second && second < third);
        assert!(third < footer);
    }

    #[test]
    fn test_nested_layout_rows_use_dispatcher() {
        let (_dir, ctx) = ctx();
        let page = Page::from_value(json!({
            "body": [{
                "type": "layout-row",
                "data": { "components": [
                    { "type": "paragraph", "data": { "text": "outer" } },
                    { "type": "layout-row", "data": { "components": [
                        { "type": "heading", "data": { "text": "inner", "level": 3 } }
                    ] } }
                ] }
            }]
        }))
        .unwrap();

        let html = render_page(&page, &ctx).unwrap();
        assert_eq!(html.matches("data-columns=").count(), 2);
        assert!(html.contains("<h3"));
        assert!(html.contains("inner"));
    }

    #[test]
    fn test_block_errors_stop_the_page() {
        let (_dir, ctx) = ctx();
        let page = Page::from_value(json!({
            "body": [
                { "type": "paragraph", "data": { "text": "ok" } },
                { "type": "table", "data": { "rows": [] } }
            ]
        }))
        .unwrap();
        let err = render_page(&page, &ctx).unwrap_err();
        assert!(matches!(err, FolioError::EmptyTable));
    }

    #[test]
    fn test_disk_backed_blocks() {
        let (dir, ctx) = ctx();
        fs::create_dir_all(dir.path().join("fragments")).unwrap();
        fs::write(dir.path().join("fragments/x.html"), "<em>raw</em>").unwrap();

        let page = Page::from_value(json!({
            "body": [{ "type": "html-content", "data": { "url": "fragments/x.html" } }]
        }))
        .unwrap();
        let html = render_page(&page, &ctx).unwrap();
        assert!(html.contains("<em>raw</em>"));
    }

    #[test]
    fn test_parent_segments_fail_the_page() {
        let (_dir, ctx) = ctx();
        let inline_link = Page::from_value(json!({
            "body": [{ "type": "paragraph", "data": { "text": "see [x](../../secret.html)" } }]
        }))
        .unwrap();
        let err = render_page(&inline_link, &ctx).unwrap_err();
        assert!(matches!(err, FolioError::PathTraversal { .. }));

        let image = Page::from_value(json!({
            "body": [{ "type": "media-image", "data": { "src": "../../etc/passwd.png" } }]
        }))
        .unwrap();
        let err = render_page(&image, &ctx).unwrap_err();
        assert!(matches!(err, FolioError::PathTraversal { .. }));

        let nested = Page::from_value(json!({
            "body": [{
                "type": "layout-row",
                "data": { "components": [
                    { "type": "feature-image", "data": { "src": "assets/../../x.png" } }
                ] }
            }]
        }))
        .unwrap();
        assert!(render_page(&nested, &ctx).is_err());
    }
}
