use crate::blocks::non_empty;
use crate::error::Result;
use crate::html::escape_html;
use crate::inline::{InlineOptions, format_inline};
use crate::model::{Footer, Header};
use crate::url::normalize_asset_src;

pub fn render_header(header: &Header) -> Result<String> {
    let mut html = String::from("<section class=\"page-header\">\n");
    html.push_str(&format!(
        "<h1>{}</h1>\n",
        format_inline(&header.title, &InlineOptions::single_line())?
    ));
    if let Some(subtitle) = non_empty(header.subtitle.as_deref()) {
        html.push_str(&format!(
            "<h2>{}</h2>\n",
            format_inline(subtitle, &InlineOptions::single_line())?
        ));
    }
    if let Some(lead) = non_empty(header.lead.as_deref()) {
        html.push_str(&format!(
            "<p class=\"lead\">{}</p>\n",
            format_inline(lead, &InlineOptions::default())?
        ));
    }
    if let Some(image) = header.image.as_ref().filter(|i| !i.src.trim().is_empty()) {
        html.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\" />\n",
            escape_html(&normalize_asset_src(&image.src)?),
            escape_html(image.alt.as_deref().unwrap_or(""))
        ));
    }
    html.push_str("</section>\n");
    Ok(html)
}

pub fn render_footer(footer: &Footer) -> Result<String> {
    let notes = non_empty(footer.notes.as_deref())
        .map(|n| format_inline(n, &InlineOptions::default()))
        .transpose()?
        .map(|n| format!("<p>{n}</p>\n"))
        .unwrap_or_default();
    Ok(format!("<section class=\"page-footer\">\n{notes}</section>\n"))
}
