//! Text-shaped blocks: paragraph, heading, list, timeline, table and code-block.

use crate::blocks::{figcaption, non_empty};
use crate::error::{FolioError, Result};
use crate::html::{block_classes, escape_html};
use crate::inline::{InlineOptions, format_inline};
use crate::model::{
    Block, CodeBlockData, HeadingData, ListData, ParagraphData, TableData, TimelineData, value_text,
};

pub fn render_paragraph(block: &Block, data: &ParagraphData) -> Result<String> {
    Ok(format!(
        "<p class=\"{}\">{}</p>\n",
        block_classes(&["block-paragraph"], &block.style),
        format_inline(&data.text, &InlineOptions::default())?
    ))
}

pub fn render_heading(block: &Block, data: &HeadingData) -> Result<String> {
    if !(1..=6).contains(&data.level) {
        return Err(FolioError::InvalidHeadingLevel {
            level: data.level.into(),
        });
    }
    let level = data.level;
    Ok(format!(
        "<h{level} class=\"{}\">{}</h{level}>\n",
        block_classes(&["block-heading"], &block.style),
        format_inline(&data.text, &InlineOptions::single_line())?
    ))
}

pub fn render_list(block: &Block, data: &ListData) -> Result<String> {
    let tag = if data.ordered { "ol" } else { "ul" };
    let items = data
        .items
        .iter()
        .map(|item| -> Result<String> {
            Ok(format!("<li>{}</li>", format_inline(item, &InlineOptions::default())?))
        })
        .collect::<Result<String>>()?;
    Ok(format!(
        "<{tag} class=\"{}\">{items}</{tag}>\n",
        block_classes(&["block-list"], &block.style)
    ))
}

pub fn render_timeline(block: &Block, data: &TimelineData) -> Result<String> {
    let items = data
        .items
        .iter()
        .map(|item| -> Result<String> {
            let description = non_empty(item.description.as_deref())
                .map(|d| format_inline(d, &InlineOptions::default()))
                .transpose()?
                .map(|d| format!("<p>{d}</p>"))
                .unwrap_or_default();
            Ok(format!(
                "<div class=\"timeline-item\">\
                 <div class=\"timeline-period\">{}</div>\
                 <div class=\"timeline-content\"><strong>{}</strong>{description}</div>\
                 </div>\n",
                format_inline(&item.period, &InlineOptions::label())?,
                format_inline(&item.title, &InlineOptions::single_line())?,
            ))
        })
        .collect::<Result<String>>()?;

    Ok(format!(
        "<section class=\"{}\">\n{items}</section>\n",
        block_classes(&["timeline", "block-timeline"], &block.style)
    ))
}

pub fn render_table(block: &Block, data: &TableData) -> Result<String> {
    if data.rows.is_empty() {
        return Err(FolioError::EmptyTable);
    }

    let compact = if data.compact { "is-compact" } else { "" };
    let classes = block_classes(&["table-block", "block-table", compact], &block.style);

    let head = if data.headers.is_empty() {
        String::new()
    } else {
        let cells = data
            .headers
            .iter()
            .map(|header| -> Result<String> {
                Ok(format!(
                    "<th scope=\"col\">{}</th>",
                    format_inline(&value_text(header), &InlineOptions::default())?
                ))
            })
            .collect::<Result<String>>()?;
        format!("<thead><tr>{cells}</tr></thead>")
    };

    let body = data
        .rows
        .iter()
        .map(|row| -> Result<String> {
            let cells = match row {
                serde_json::Value::Array(cells) => cells.as_slice(),
                single => std::slice::from_ref(single),
            };
            let cells = cells
                .iter()
                .map(|cell| -> Result<String> {
                    Ok(format!(
                        "<td>{}</td>",
                        format_inline(&value_text(cell), &InlineOptions::default())?
                    ))
                })
                .collect::<Result<String>>()?;
            Ok(format!("<tr>{cells}</tr>"))
        })
        .collect::<Result<String>>()?;

    Ok(format!(
        "<figure class=\"{classes}\">\n{}<div class=\"table-wrap\"><table>{head}<tbody>{body}</tbody></table></div>\n</figure>\n",
        figcaption(data.caption.as_deref())?,
    ))
}

/// Code is escaped verbatim; it is never treated as rich text.
pub fn render_code_block(block: &Block, data: &CodeBlockData) -> Result<String> {
    let language = non_empty(data.language.as_deref())
        .unwrap_or("text")
        .to_lowercase();
    let classes = block_classes(&["code-block", "block-code-block"], &block.style);
    let code = if data.line_numbers {
        numbered_lines(&data.code)
    } else {
        escape_html(&data.code)
    };
    let pre_class = if data.line_numbers {
        "code-block-pre has-line-numbers"
    } else {
        "code-block-pre"
    };

    Ok(format!(
        "<figure class=\"{classes}\">\n{}<pre class=\"{pre_class}\"><code class=\"language-{}\">{code}</code></pre>\n</figure>\n",
        figcaption(data.caption.as_deref())?,
        escape_html(&language),
    ))
}

fn numbered_lines(code: &str) -> String {
    code.replace("\r\n", "\n")
        .split('\n')
        .enumerate()
        .map(|(index, line)| {
            let line = if line.is_empty() { " " } else { line };
            format!(
                "<span class=\"code-block-line\" data-line=\"{}\">{}</span>",
                index + 1,
                escape_html(line)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
