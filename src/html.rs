//! Small HTML helpers shared by every renderer.

/// Escape the five HTML-significant characters.
///
/// This is the only escaping pass applied to author text; everything that
/// reaches the output from a document goes through here exactly once.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Join class tokens with spaces, skipping empty ones.
pub fn class_list<'a>(classes: impl IntoIterator<Item = &'a str>) -> String {
    classes
        .into_iter()
        .map(str::trim)
        .filter(|class| !class.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Class attribute for a block: base classes first, then the block's own style tokens.
/// The result is escaped for use inside a quoted attribute.
pub fn block_classes(base: &[&str], style: &[String]) -> String {
    escape_html(&class_list(
        base.iter().copied().chain(style.iter().map(String::as_str)),
    ))
}

/// Derive a stable DOM id fragment from freeform text.
///
/// Lowercases, collapses every run of non `[a-z0-9]` characters into one
/// hyphen and trims hyphens from both ends. Used for lightbox and zoom
/// group keys, so collisions only affect grouping.
pub fn slugify_id(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Slug used for page file names when a document asks for one from its title.
pub fn slugify_title(title: &str) -> String {
    slug::slugify(title.replace('&', " and "))
}

/// Format a number with at most `places` decimals and no trailing zeros
/// (`75`, `33.3333`).
pub fn format_decimal(value: f64, places: usize) -> String {
    let fixed = format!("{value:.places$}");
    if fixed.contains('.') {
        let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
        if trimmed == "-0" {
            return "0".to_string();
        }
        trimmed.to_string()
    } else {
        fixed
    }
}

/// Render a JSON number the way it reads in the document (`12`, `0.5`).
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
