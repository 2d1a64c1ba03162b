//! `{{cfg:...}}` and `{{hook:...}}` references inside content documents.
//!
//! Runs on the raw JSON tree before it is typed, so a reference can stand in
//! for any value: a string that is exactly one token takes the referenced
//! value as-is (number, array, object), while tokens embedded in longer text
//! are replaced by their string form. `{{basePath}}` is not a reference and
//! passes through untouched.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::config::{Contact, SiteConfig};
use crate::html::format_number;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(cfg|hook):([^}]+?)\s*\}\}").expect("valid regex"));
static HOOK_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-zA-Z0-9_.-]+)(?:\((.*)\))?$").expect("valid regex"));
static NUMBER_ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("valid regex"));

/// Resolve every reference in a document tree.
pub fn resolve_config_tokens(value: Value, config: &SiteConfig) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| resolve_config_tokens(item, config))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, resolve_config_tokens(value, config)))
                .collect(),
        ),
        Value::String(text) => resolve_string(text, config),
        other => other,
    }
}

fn resolve_string(text: String, config: &SiteConfig) -> Value {
    if !text.contains("{{") {
        return Value::String(text);
    }

    // (kind, expression, whether the token is the whole string)
    let tokens: Vec<(String, String, bool)> = TOKEN
        .captures_iter(&text)
        .map(|caps| (caps[1].to_string(), caps[2].to_string(), &caps[0] == text.trim()))
        .collect();
    match tokens.as_slice() {
        [] => Value::String(text),
        [(kind, expression, true)] => match evaluate(kind, expression, config) {
            Value::Null => Value::String(String::new()),
            value => value,
        },
        _ => Value::String(
            TOKEN
                .replace_all(&text, |caps: &Captures| {
                    string_form(&evaluate(&caps[1], &caps[2], config))
                })
                .into_owned(),
        ),
    }
}

fn evaluate(kind: &str, expression: &str, config: &SiteConfig) -> Value {
    match kind {
        "cfg" => lookup(&config.raw, expression).cloned().unwrap_or(Value::Null),
        "hook" => run_hook(expression.trim(), config),
        _ => Value::Null,
    }
}

/// Dotted path into the config tree; numeric steps index arrays.
fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.trim()
        .split('.')
        .filter(|step| !step.is_empty())
        .try_fold(root, |current, step| match current {
            Value::Array(items) => step.parse::<usize>().ok().and_then(|i| items.get(i)),
            Value::Object(map) => map.get(step),
            _ => None,
        })
}

fn string_form(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        Value::Array(items) => items.iter().map(string_form).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

fn parse_args(raw: &str, config: &SiteConfig) -> Vec<Value> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',')
        .map(str::trim)
        .map(|arg| {
            if NUMBER_ARG.is_match(arg) {
                return arg
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number);
            }
            let quoted = arg.len() >= 2
                && ((arg.starts_with('\'') && arg.ends_with('\''))
                    || (arg.starts_with('"') && arg.ends_with('"')));
            if quoted {
                return Value::String(arg[1..arg.len() - 1].to_string());
            }
            if let Some(path) = arg.strip_prefix("cfg.") {
                return lookup(&config.raw, path).cloned().unwrap_or(Value::Null);
            }
            Value::String(arg.to_string())
        })
        .collect()
}

/// Positional index argument, 0 when absent or not a number.
fn index_arg(args: &[Value], position: usize) -> usize {
    match args.get(position) {
        Some(Value::Number(n)) => n.as_f64().filter(|v| *v >= 0.0).map_or(0, |v| v as usize),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn text_arg(args: &[Value], position: usize) -> Option<String> {
    args.get(position).map(string_form)
}

fn run_hook(expression: &str, config: &SiteConfig) -> Value {
    let Some(call) = HOOK_CALL.captures(expression) else {
        return Value::Null;
    };
    let args = parse_args(call.get(2).map_or("", |m| m.as_str()), config);
    let contact = &config.site.contact;

    let result = match &call[1] {
        "contact.phoneDisplay" => phone(contact, index_arg(&args, 0)).to_string(),
        "contact.phoneTelUrl" => format!("tel:{}", compact_phone(contact, index_arg(&args, 0))),
        "contact.whatsappUrl" => format!(
            "https://wa.me/{}",
            compact_phone(contact, index_arg(&args, 0)).trim_start_matches('+')
        ),
        "contact.emailMailto" => {
            let kind = text_arg(&args, 0).unwrap_or_else(|| "institutional".into());
            let index = index_arg(&args, 1);
            let address = match kind.as_str() {
                "institutional" => Some(contact.emails.institutional.as_str()),
                "personal" => contact.emails.personal.get(index).map(String::as_str),
                "professional" => contact.emails.professional.get(index).map(String::as_str),
                _ => None,
            };
            format!("mailto:{}", address.unwrap_or(""))
        }
        "contact.socialUrl" => social(contact, &args).map(|s| s.url.clone()).unwrap_or_default(),
        "contact.socialLabel" => social(contact, &args).map(|s| s.label.clone()).unwrap_or_default(),
        "contact.profileLine" => [
            &contact.role,
            &contact.institution,
            &contact.department,
            &contact.postal_address,
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", "),
        "contact.officeLine" => {
            let coordinates = contact.coordinates.map(|c| {
                format!(
                    "Coordinates: {}, {}",
                    format_number(c.latitude),
                    format_number(c.longitude)
                )
            });
            [Some(contact.office.clone()), coordinates]
                .into_iter()
                .flatten()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(". ")
        }
        _ => return Value::Null,
    };
    Value::String(result)
}

fn phone(contact: &Contact, index: usize) -> &str {
    contact.phones.get(index).map_or("", String::as_str)
}

fn compact_phone(contact: &Contact, index: usize) -> String {
    phone(contact, index).split_whitespace().collect()
}

fn social<'a>(contact: &'a Contact, args: &[Value]) -> Option<&'a crate::config::Social> {
    let key = text_arg(args, 0)?;
    contact.socials.iter().find(|s| s.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn config() -> SiteConfig {
        SiteConfig::parse(
            Path::new("config.toml"),
            r#"
[site]
title = "Dr. Ada"
keywords = ["math", "engines"]

[site.contact]
role = "Professor"
institution = "Analytical University"
office = "Room 12"
coordinates = { latitude = 40.4168, longitude = -3.7038 }
phones = ["+34 600 000 000"]
socials = [{ key = "github", label = "GitHub", url = "https://github.com/ada" }]

[site.contact.emails]
institutional = "ada@uni.edu"
personal = ["ada@home.net"]

[extra]
count = 3
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_whole_string_token_keeps_type() {
        let config = config();
        let resolved = resolve_config_tokens(
            json!({ "a": "{{cfg:extra.count}}", "b": " {{ cfg:site.keywords }} ", "c": "{{cfg:missing.key}}" }),
            &config,
        );
        assert_eq!(resolved["a"], json!(3));
        assert_eq!(resolved["b"], json!(["math", "engines"]));
        assert_eq!(resolved["c"], json!(""));
    }

    #[test]
    fn test_embedded_tokens_become_text() {
        let config = config();
        let resolved = resolve_config_tokens(
            json!(["Welcome to {{cfg:site.title}} ({{cfg:extra.count}})", "{{basePath}}/about.html"]),
            &config,
        );
        assert_eq!(resolved[0], "Welcome to Dr. Ada (3)");
        assert_eq!(resolved[1], "{{basePath}}/about.html");
    }

    #[test]
    fn test_lookup_indexes_arrays() {
        let config = config();
        let resolved = resolve_config_tokens(json!("{{cfg:site.contact.socials.0.label}}"), &config);
        assert_eq!(resolved, json!("GitHub"));
    }

    #[test]
    fn test_contact_hooks() {
        let config = config();
        let resolve = |text: &str| resolve_config_tokens(json!(text), &config);

        assert_eq!(resolve("{{hook:contact.phoneDisplay(0)}}"), json!("+34 600 000 000"));
        assert_eq!(resolve("{{hook:contact.phoneTelUrl()}}"), json!("tel:+34600000000"));
        assert_eq!(resolve("{{hook:contact.whatsappUrl(0)}}"), json!("https://wa.me/34600000000"));
        assert_eq!(resolve("{{hook:contact.emailMailto}}"), json!("mailto:ada@uni.edu"));
        assert_eq!(
            resolve("{{hook:contact.emailMailto('personal', 0)}}"),
            json!("mailto:ada@home.net")
        );
        assert_eq!(resolve("{{hook:contact.socialUrl(\"github\")}}"), json!("https://github.com/ada"));
        assert_eq!(resolve("{{hook:contact.socialLabel(github)}}"), json!("GitHub"));
        assert_eq!(
            resolve("{{hook:contact.profileLine()}}"),
            json!("Professor, Analytical University")
        );
        assert_eq!(
            resolve("{{hook:contact.officeLine()}}"),
            json!("Room 12. Coordinates: 40.4168, -3.7038")
        );
    }

    #[test]
    fn test_hook_args_from_config_and_unknown_hooks() {
        let config = config();
        let resolved = resolve_config_tokens(
            json!(["{{hook:contact.phoneDisplay(cfg.extra.missing)}}", "x {{hook:nope()}} y"]),
            &config,
        );
        assert_eq!(resolved[0], "+34 600 000 000");
        assert_eq!(resolved[1], "x  y");
    }

    #[test]
    fn test_non_strings_untouched() {
        let config = config();
        let input = json!({ "n": 1, "b": true, "z": null });
        assert_eq!(resolve_config_tokens(input.clone(), &config), input);
    }
}
