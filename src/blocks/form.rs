//! Contact forms with native validation attributes.
//!
//! Messages for each failed constraint travel as `data-error-*` attributes;
//! the page script reads them when the browser reports an invalid field.

use crate::blocks::non_empty;
use crate::error::Result;
use crate::html::{block_classes, escape_html, format_number};
use crate::inline::{InlineOptions, format_inline};
use crate::model::{Block, FormData, FormField};

/// Extra inputs formspree expects, plus a honeypot it discards on its side.
const FORMSPREE_HIDDEN: &str = "<input type=\"hidden\" name=\"_subject\" value=\"New contact form submission from portfolio\" />\n\
<input type=\"hidden\" name=\"_language\" value=\"en\" />\n\
<input type=\"text\" name=\"_gotcha\" class=\"form-bottrap\" tabindex=\"-1\" autocomplete=\"off\" aria-hidden=\"true\" />\n";

/// Operand range for the arithmetic challenge. The page script picks the
/// numbers; the answer never appears in the markup.
const CAPTCHA_MIN: u8 = 1;
const CAPTCHA_MAX: u8 = 8;

pub fn render_form(block: &Block, data: &FormData) -> Result<String> {
    let provider = data.provider.as_deref().unwrap_or("").trim().to_lowercase();
    let is_formspree = provider == "formspree";

    let fields = data
        .fields
        .iter()
        .enumerate()
        .map(|(index, field)| render_field(field, index))
        .collect::<Result<String>>()?;

    let hidden = if is_formspree { FORMSPREE_HIDDEN } else { "" };
    let captcha = if is_formspree { captcha_fieldset()? } else { String::new() };

    Ok(format!(
        "<form class=\"{}\" method=\"POST\" action=\"{}\" accept-charset=\"UTF-8\" data-form-provider=\"{}\">\n\
         {hidden}{fields}{captcha}<button type=\"submit\">{}</button>\n</form>\n",
        block_classes(&["form-block", "block-form"], &block.style),
        escape_html(&data.endpoint),
        escape_html(&provider),
        format_inline("Send", &InlineOptions::single_line())?,
    ))
}

fn captcha_fieldset() -> Result<String> {
    Ok(format!(
        "<fieldset class=\"captcha-fieldset\" data-simple-captcha data-captcha-min=\"{CAPTCHA_MIN}\" data-captcha-max=\"{CAPTCHA_MAX}\">\n\
         <legend>{}</legend>\n\
         <p class=\"captcha-hint\">{}</p>\n\
         <label><span class=\"captcha-question\">Loading challenge...</span>\
         <input type=\"text\" class=\"captcha-input\" inputmode=\"numeric\" required /></label>\n\
         </fieldset>\n",
        format_inline("Human Verification", &InlineOptions::single_line())?,
        format_inline("Solve this quick challenge to continue.", &InlineOptions::single_line())?,
    ))
}

/// Lowercase, with runs outside `[a-z0-9-_]` collapsed to `-` and trimmed.
fn normalize_field_name(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_' {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }
    out.trim_matches('-').to_string()
}

fn field_id(field: &FormField, index: usize) -> String {
    let name = match non_empty(Some(field.name.as_str())) {
        Some(name) => name.to_string(),
        None => format!("field-{index}"),
    };
    format!("field-{}-{index}", escape_html(&normalize_field_name(&name)))
}

fn render_field(field: &FormField, index: usize) -> Result<String> {
    let id = field_id(field, index);
    let help = non_empty(field.help_text.as_deref());

    let mut described_by = Vec::with_capacity(2);
    if help.is_some() {
        described_by.push(format!("{id}-help"));
    }
    described_by.push(format!("{id}-error"));

    let required = if field.required { " required" } else { "" };
    let mut attrs = format!(
        "{required} aria-describedby=\"{}\"",
        described_by.join(" ")
    );
    for attr in validation_attributes(field) {
        attrs.push(' ');
        attrs.push_str(&attr);
    }

    let input_type = non_empty(field.input_type.as_deref()).unwrap_or("text");
    let name = escape_html(&field.name);
    let control = if input_type == "textarea" {
        format!("<textarea id=\"{id}\" name=\"{name}\"{attrs}></textarea>")
    } else {
        format!(
            "<input id=\"{id}\" type=\"{}\" name=\"{name}\"{attrs} />",
            escape_html(input_type)
        )
    };

    let required_marks = if field.required {
        "<span class=\"form-required\" aria-hidden=\"true\">*</span><span class=\"sr-only\">(required)</span>"
    } else {
        ""
    };
    let help = help
        .map(|text| format_inline(text, &InlineOptions::no_links()))
        .transpose()?
        .map(|text| format!("<p id=\"{id}-help\" class=\"form-help\">{text}</p>\n"))
        .unwrap_or_default();

    Ok(format!(
        "<div class=\"form-field\">\n\
         <label for=\"{id}\" class=\"form-label\"><span class=\"form-label-text\">{}</span>{required_marks}</label>\n\
         {control}\n\
         {help}<p id=\"{id}-error\" class=\"form-error\" aria-live=\"polite\" hidden></p>\n\
         </div>\n",
        format_inline(&field.label, &InlineOptions::label())?,
    ))
}

fn validation_attributes(field: &FormField) -> Vec<String> {
    let mut attrs = Vec::new();
    let rules = &field.validation;

    if let Some(placeholder) = non_empty(field.placeholder.as_deref()) {
        attrs.push(format!("placeholder=\"{}\"", escape_html(placeholder)));
    }
    if let Some(autocomplete) = non_empty(field.autocomplete.as_deref()) {
        attrs.push(format!("autocomplete=\"{}\"", escape_html(autocomplete)));
    }
    if let Some(min_length) = rules.min_length {
        attrs.push(format!("minlength=\"{min_length}\""));
    }
    if let Some(max_length) = rules.max_length {
        attrs.push(format!("maxlength=\"{max_length}\""));
    }
    if let Some(pattern) = rules.pattern.as_deref().filter(|p| !p.is_empty()) {
        attrs.push(format!("pattern=\"{}\"", escape_html(pattern)));
    }
    for (name, value) in [("min", rules.min), ("max", rules.max), ("step", rules.step)] {
        if let Some(value) = value.filter(|v| v.is_finite()) {
            attrs.push(format!("{name}=\"{}\"", format_number(value)));
        }
    }
    for (key, message) in field.messages.entries() {
        if let Some(message) = non_empty(message) {
            attrs.push(format!("data-error-{key}=\"{}\"", escape_html(message)));
        }
    }

    attrs.push("data-validation-target=\"true\"".to_string());
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockContent, FieldMessages, FieldValidation, ParagraphData};

    fn block() -> Block {
        Block {
            id: None,
            style: vec!["narrow".into()],
            content: BlockContent::Paragraph(ParagraphData::default()),
        }
    }

    fn contact_form(provider: Option<&str>) -> FormData {
        FormData {
            provider: provider.map(str::to_string),
            endpoint: "/contact".into(),
            fields: vec![
                FormField {
                    name: "email".into(),
                    label: "Email".into(),
                    input_type: Some("email".into()),
                    required: true,
                    validation: FieldValidation {
                        min_length: Some(6),
                        ..Default::default()
                    },
                    messages: FieldMessages {
                        required: Some("Email is required.".into()),
                        ..Default::default()
                    },
                    ..Default::default()
                },
                FormField {
                    name: "message".into(),
                    label: "Message".into(),
                    input_type: Some("textarea".into()),
                    help_text: Some("Keep it short".into()),
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_formspree_form() {
        let html = render_form(&block(), &contact_form(Some("Formspree"))).unwrap();
        assert!(html.starts_with("<form class=\"form-block block-form narrow\" method=\"POST\" action=\"/contact\""));
        assert!(html.contains("data-form-provider=\"formspree\""));
        assert!(html.contains("name=\"_subject\""));
        assert!(html.contains("name=\"_gotcha\""));
        assert!(html.contains("data-simple-captcha data-captcha-min=\"1\" data-captcha-max=\"8\""));
        assert!(html.contains("<span class=\"captcha-question\">Loading challenge...</span>"));
        assert!(html.contains("<button type=\"submit\">Send</button>"));
    }

    #[test]
    fn test_fields_and_validation() {
        let html = render_form(&block(), &contact_form(None)).unwrap();
        assert!(!html.contains("_subject"));
        assert!(!html.contains("captcha"));

        assert!(html.contains(
            "<input id=\"field-email-0\" type=\"email\" name=\"email\" required aria-describedby=\"field-email-0-error\" minlength=\"6\" data-error-required=\"Email is required.\" data-validation-target=\"true\" />"
        ));
        assert!(html.contains("class=\"form-required\""));
        assert!(html.contains(
            "<textarea id=\"field-message-1\" name=\"message\" aria-describedby=\"field-message-1-help field-message-1-error\" data-validation-target=\"true\"></textarea>"
        ));
        assert!(html.contains("<p id=\"field-message-1-help\" class=\"form-help\">Keep it short</p>"));
        assert!(html.contains("<p id=\"field-email-0-error\" class=\"form-error\" aria-live=\"polite\" hidden></p>"));
    }

    #[test]
    fn test_numeric_constraints_and_placeholder() {
        let field = FormField {
            name: "Guests Count".into(),
            label: "Guests".into(),
            input_type: Some("number".into()),
            placeholder: Some("e.g. \"2\"".into()),
            validation: FieldValidation {
                min: Some(1.0),
                max: Some(10.0),
                step: Some(0.5),
                pattern: Some(String::new()),
                ..Default::default()
            },
            ..Default::default()
        };
        let html = render_field(&field, 3).unwrap();
        assert!(html.contains("id=\"field-guests-count-3\""));
        assert!(html.contains("placeholder=\"e.g. &quot;2&quot;\""));
        assert!(html.contains("min=\"1\" max=\"10\" step=\"0.5\""));
        assert!(!html.contains("pattern="));
    }

    #[test]
    fn test_field_id_without_name() {
        let field = FormField::default();
        assert_eq!(field_id(&field, 2), "field-field-2-2");
        assert_eq!(normalize_field_name("--Your E-mail!--"), "your-e-mail");
    }
}
