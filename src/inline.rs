//! Inline rich-text formatting.
//!
//! Author text goes through three stages:
//!
//! 1. `[label](target)` links are split out of the raw text first; targets go
//!    through [`resolve_href`], labels are formatted on a single line.
//! 2. Every other segment is escaped once, then bracket tokens
//!    (`[color=..]`, `[font=..]`, `[size=..]`, `[b]`, `[i]`, `[u]`, `[mark]`,
//!    `[code]`, `[s]`) are resolved by a single left-to-right scan with an
//!    explicit stack, so nesting resolves inside-out and the scan always
//!    terminates at the end of the input.
//! 3. Markdown-style emphasis is applied in a fixed order: code spans first,
//!    then `**strong**`, `__underline__`, `~~strike~~` and `*em*`. Code span
//!    contents are never reinterpreted.
//!
//! Output is terminal: formatting already-formatted HTML is not supported.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::Result;
use crate::html::escape_html;
use crate::url::{Relative, is_external_url, resolve_href};

static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static MD_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n][\s\S]*?)`").expect("valid code regex"));
static MD_STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*][\s\S]*?)\*\*").expect("valid strong regex"));
static MD_UNDERLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__([^_][\s\S]*?)__").expect("valid underline regex"));
static MD_STRIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~~([^~][\s\S]*?)~~").expect("valid strike regex"));
static MD_EM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\n][\s\S]*?)\*").expect("valid em regex"));
const SLOT_OPEN: char = '\u{E000}';
const SLOT_CLOSE: char = '\u{E001}';
static CODE_SLOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{SLOT_OPEN}(\\d+){SLOT_CLOSE}")).expect("valid slot regex")
});

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([0-9a-f]{3}|[0-9a-f]{6}|[0-9a-f]{8})$").expect("valid hex regex")
});
static FUNCTION_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(rgb|rgba|hsl|hsla)\(\s*[-+0-9.%\s,]+\)$").expect("valid color fn regex")
});
static NAMED_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{3,20}$").expect("valid named color regex"));
static FONT_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?(px|rem|em|%)$").expect("valid size regex"));

/// Knobs for [`format_inline`].
#[derive(Debug, Clone, Copy)]
pub struct InlineOptions<'a> {
    /// Turn `\n` into `<br />`
    pub convert_line_breaks: bool,
    /// Recognise `[label](target)` links
    pub parse_links: bool,
    /// Class attribute for generated anchors
    pub link_class: &'a str,
}

impl Default for InlineOptions<'_> {
    fn default() -> Self {
        Self {
            convert_line_breaks: true,
            parse_links: true,
            link_class: "",
        }
    }
}

impl<'a> InlineOptions<'a> {
    /// Links allowed, no hard breaks (titles, link labels)
    pub fn single_line() -> Self {
        Self {
            convert_line_breaks: false,
            ..Self::default()
        }
    }

    /// Plain styled text: no links, no hard breaks (button and caption labels)
    pub fn label() -> Self {
        Self {
            convert_line_breaks: false,
            parse_links: false,
            link_class: "",
        }
    }

    /// Multi-line text without link parsing (help texts, excerpts)
    pub fn no_links() -> Self {
        Self {
            parse_links: false,
            ..Self::default()
        }
    }

    pub fn with_link_class(self, link_class: &'a str) -> Self {
        Self { link_class, ..self }
    }
}

/// Format author text into safe inline HTML.
///
/// Fails when a link target is a relative path with a `..` segment.
pub fn format_inline(text: &str, options: &InlineOptions<'_>) -> Result<String> {
    if !options.parse_links {
        return Ok(format_segment(text, options.convert_line_breaks));
    }

    let link_class = options.link_class.trim();
    let mut html = String::with_capacity(text.len() + 16);
    let mut last = 0;

    for caps in LINK.captures_iter(text) {
        let (Some(whole), Some(label), Some(target)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        html.push_str(&format_segment(&text[last..whole.start()], options.convert_line_breaks));

        let href = resolve_href(target.as_str(), "#", Relative::Site)?;
        html.push_str("<a href=\"");
        html.push_str(&escape_html(&href));
        html.push('"');
        if !link_class.is_empty() {
            html.push_str(&format!(" class=\"{}\"", escape_html(link_class)));
        }
        if is_external_url(&href) {
            html.push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
        }
        html.push('>');
        html.push_str(&format_segment(label.as_str(), false));
        html.push_str("</a>");

        last = whole.end();
    }

    html.push_str(&format_segment(&text[last..], options.convert_line_breaks));
    Ok(html)
}

fn format_segment(segment: &str, convert_line_breaks: bool) -> String {
    // The private-use slot markers belong to apply_markdown.
    let segment = segment.replace([SLOT_OPEN, SLOT_CLOSE], "");
    let escaped = escape_html(&segment);
    let tokens = resolve_bracket_tokens(&escaped);
    let html = apply_markdown(&tokens);
    if convert_line_breaks {
        html.replace('\n', "<br />")
    } else {
        html
    }
}

/// Bracket token names, lowercased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Color,
    Font,
    Size,
    Bold,
    Italic,
    Underline,
    Mark,
    Code,
    Strike,
}

impl Tag {
    fn parse(name: &str) -> Option<Tag> {
        match name.to_ascii_lowercase().as_str() {
            "color" => Some(Tag::Color),
            "font" => Some(Tag::Font),
            "size" => Some(Tag::Size),
            "b" => Some(Tag::Bold),
            "i" => Some(Tag::Italic),
            "u" => Some(Tag::Underline),
            "mark" => Some(Tag::Mark),
            "code" => Some(Tag::Code),
            "s" => Some(Tag::Strike),
            _ => None,
        }
    }

    fn takes_value(self) -> bool {
        matches!(self, Tag::Color | Tag::Font | Tag::Size)
    }

    fn semantic_element(self) -> &'static str {
        match self {
            Tag::Bold => "strong",
            Tag::Italic => "em",
            Tag::Underline => "u",
            Tag::Mark => "mark",
            Tag::Code => "code",
            Tag::Strike => "s",
            Tag::Color | Tag::Font | Tag::Size => "span",
        }
    }
}

enum Token<'t> {
    Open { tag: Tag, value: &'t str },
    Close(Tag),
}

/// Try to read a bracket token at the start of `input` (which begins with `[`).
/// Returns the token and its byte length.
fn read_token(input: &str) -> Option<(Token<'_>, usize)> {
    let end = input.find(']')?;
    let inner = &input[1..end];
    let len = end + 1;

    if let Some(name) = inner.strip_prefix('/') {
        return Tag::parse(name).map(|tag| (Token::Close(tag), len));
    }

    match inner.split_once('=') {
        Some((name, value)) => {
            let tag = Tag::parse(name)?;
            (tag.takes_value() && !value.is_empty()).then_some((Token::Open { tag, value }, len))
        }
        None => {
            let tag = Tag::parse(inner)?;
            (!tag.takes_value()).then_some((Token::Open { tag, value: "" }, len))
        }
    }
}

struct Frame<'t> {
    tag: Tag,
    value: &'t str,
    opener: &'t str,
    buf: String,
}

/// Resolve bracket tokens with a single left-to-right scan.
///
/// Closers match the nearest open token with the same name. Tokens left open
/// when an outer token closes, or at the end of input, are emitted literally,
/// as are closers with no matching opener.
fn resolve_bracket_tokens(text: &str) -> String {
    let mut root = String::with_capacity(text.len());
    let mut stack: Vec<Frame<'_>> = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        let Some(offset) = rest.find('[') else {
            current_buf(&mut root, &mut stack).push_str(rest);
            break;
        };
        current_buf(&mut root, &mut stack).push_str(&rest[..offset]);
        let at = pos + offset;

        match read_token(&text[at..]) {
            Some((Token::Open { tag, value }, len)) => {
                stack.push(Frame {
                    tag,
                    value,
                    opener: &text[at..at + len],
                    buf: String::new(),
                });
                pos = at + len;
            }
            Some((Token::Close(tag), len)) => {
                match stack.iter().rposition(|frame| frame.tag == tag) {
                    Some(index) => {
                        while stack.len() > index + 1 {
                            if let Some(unclosed) = stack.pop() {
                                let parent = current_buf(&mut root, &mut stack);
                                parent.push_str(unclosed.opener);
                                parent.push_str(&unclosed.buf);
                            }
                        }
                        if let Some(frame) = stack.pop() {
                            let wrapped = wrap(&frame);
                            current_buf(&mut root, &mut stack).push_str(&wrapped);
                        }
                    }
                    None => current_buf(&mut root, &mut stack).push_str(&text[at..at + len]),
                }
                pos = at + len;
            }
            None => {
                current_buf(&mut root, &mut stack).push('[');
                pos = at + 1;
            }
        }
    }

    while let Some(unclosed) = stack.pop() {
        let parent = current_buf(&mut root, &mut stack);
        parent.push_str(unclosed.opener);
        parent.push_str(&unclosed.buf);
    }

    root
}

fn current_buf<'s>(root: &'s mut String, stack: &'s mut [Frame<'_>]) -> &'s mut String {
    match stack.last_mut() {
        Some(frame) => &mut frame.buf,
        None => root,
    }
}

fn wrap(frame: &Frame<'_>) -> String {
    let style = match frame.tag {
        Tag::Color => normalize_color(frame.value).map(|c| format!("color: {};", escape_html(&c))),
        Tag::Font => normalize_font(frame.value).map(|f| format!("font-family: {};", escape_html(f))),
        Tag::Size => normalize_font_size(frame.value).map(|s| format!("font-size: {};", escape_html(&s))),
        simple => {
            let element = simple.semantic_element();
            return format!("<{element}>{}</{element}>", frame.buf);
        }
    };

    match style {
        Some(style) => format!("<span style=\"{style}\">{}</span>", frame.buf),
        // Invalid cosmetic values drop the wrapper, never the content
        None => frame.buf.clone(),
    }
}

fn normalize_color(value: &str) -> Option<String> {
    let color = value.trim().to_lowercase();
    (HEX_COLOR.is_match(&color) || FUNCTION_COLOR.is_match(&color) || NAMED_COLOR.is_match(&color))
        .then_some(color)
}

fn normalize_font(value: &str) -> Option<&'static str> {
    match value.trim().to_lowercase().as_str() {
        "sans" => Some("var(--font-sans)"),
        "serif" => Some(r#""Merriweather", Georgia, "Times New Roman", serif"#),
        "mono" => Some(
            r#"ui-monospace, "Cascadia Code", "JetBrains Mono", Menlo, Monaco, Consolas, monospace"#,
        ),
        "heading" => Some("var(--font-heading)"),
        _ => None,
    }
}

fn normalize_font_size(value: &str) -> Option<String> {
    let size = value.trim().to_lowercase();
    FONT_SIZE.is_match(&size).then_some(size)
}

fn apply_markdown(html: &str) -> String {
    let mut code_spans: Vec<String> = Vec::new();
    let protected = MD_CODE.replace_all(html, |caps: &Captures<'_>| {
        code_spans.push(format!("<code>{}</code>", &caps[1]));
        format!("{SLOT_OPEN}{}{SLOT_CLOSE}", code_spans.len() - 1)
    });

    let html = MD_STRONG.replace_all(&protected, "<strong>$1</strong>");
    let html = MD_UNDERLINE.replace_all(&html, "<u>$1</u>");
    let html = MD_STRIKE.replace_all(&html, "<s>$1</s>");
    let html = MD_EM.replace_all(&html, "<em>$1</em>");

    if code_spans.is_empty() {
        return html.into_owned();
    }
    CODE_SLOT
        .replace_all(&html, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| code_spans.get(index).cloned())
                .unwrap_or_default()
        })
        .into_owned()
}
