//! `layout-row`: nested blocks side by side.
//!
//! Cells are rendered through the same dispatcher as the page body, so a row
//! can hold any block type, including another layout row.

use serde_json::Value;

use crate::error::{FolioError, Result};
use crate::html::{block_classes, format_decimal};
use crate::model::{Block, LayoutRowData, LayoutRowSpec};

pub const MAX_COMPONENTS_PER_ROW: usize = 6;

/// Render every row of the block; a block with no components renders nothing.
pub fn render_layout_row(
    block: &Block,
    data: &LayoutRowData,
    render_nested: &dyn Fn(&Block) -> Result<String>,
) -> Result<String> {
    let classes = block_classes(&["layout-row", "block-layout-row"], &block.style);
    let mut html = String::new();
    for row in &data.rows {
        html.push_str(&render_row(&classes, row, render_nested)?);
    }
    Ok(html)
}

fn render_row(
    classes: &str,
    row: &LayoutRowSpec,
    render_nested: &dyn Fn(&Block) -> Result<String>,
) -> Result<String> {
    let count = row.components.len();
    if count == 0 {
        return Ok(String::new());
    }
    if count > MAX_COMPONENTS_PER_ROW {
        return Err(FolioError::LayoutRowTooWide {
            count: count.into(),
            max: MAX_COMPONENTS_PER_ROW.into(),
        });
    }

    let widths = column_widths(&row.widths, count)?;
    let mut cells = String::new();
    for (component, width) in row.components.iter().zip(&widths) {
        let width = format_decimal(*width, 4);
        cells.push_str(&format!(
            "<div class=\"layout-row-item\" style=\"flex-basis: {width}%; max-width: {width}%;\">\n{}</div>\n",
            render_nested(component)?
        ));
    }

    Ok(format!(
        "<section class=\"{classes}\" data-columns=\"{count}\">\n{cells}</section>\n"
    ))
}

/// Percentages summing to 100: equal shares, or the given widths scaled proportionally.
pub fn column_widths(widths: &[Value], count: usize) -> Result<Vec<f64>> {
    if widths.is_empty() {
        return Ok(vec![round4(100.0 / count as f64); count]);
    }
    if widths.len() != count {
        return Err(FolioError::LayoutWidthsMismatch {
            widths: widths.len().into(),
            components: count.into(),
        });
    }

    let parsed = widths
        .iter()
        .map(|value| {
            parse_width(value)
                .filter(|w| w.is_finite() && *w > 0.0)
                .ok_or_else(|| FolioError::InvalidLayoutWidth {
                    value: crate::model::value_text(value).into(),
                })
        })
        .collect::<Result<Vec<f64>>>()?;

    let total: f64 = parsed.iter().sum();
    Ok(parsed.iter().map(|w| round4(w / total * 100.0)).collect())
}

/// A bare number, or a string like `"40"` or `"40%"`.
fn parse_width(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let raw = s.trim();
            raw.strip_suffix('%').unwrap_or(raw).trim().parse().ok()
        }
        _ => None,
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
