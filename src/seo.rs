//! `<head>` metadata: description, canonical link, Open Graph, Twitter and JSON-LD.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};

use crate::collection::truncate;
use crate::config::SiteConfig;
use crate::html::escape_html;
use crate::model::Page;

const DESCRIPTION_LENGTH: usize = 160;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static HTTP_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("valid regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct SeoHead {
    /// Value for `<html lang>`
    pub language: String,
    /// Meta and link tags plus the JSON-LD script, one per line
    pub head_meta: String,
}

/// Build the head metadata for a page published at `output_path` (relative to the site).
pub fn build_head(page: &Page, config: &SiteConfig, output_path: &str) -> SeoHead {
    let seo = &config.seo;
    let site = &config.site;
    let meta = &page.meta;
    let social = &meta.social;

    let page_path = format!("/{}", output_path.replace('\\', "/").trim_start_matches('/'));
    let site_url = seo.site_url.trim();
    let canonical = absolute_url(
        non_empty(meta.canonical.as_deref()).unwrap_or(&page_path),
        site_url,
    );

    let title = page.title().unwrap_or(&site.title).to_string();
    let description = trim_description(
        [
            meta.description.as_deref(),
            page.header.as_ref().and_then(|h| h.lead.as_deref()),
            Some(site.description.as_str()),
        ]
        .into_iter()
        .flatten()
        .find(|d| !d.trim().is_empty())
        .unwrap_or(""),
    );
    let image = [
        social.image.as_deref(),
        meta.image.as_deref(),
        Some(seo.default_image.as_str()),
        Some(site.branding.favicon.as_str()),
    ]
    .into_iter()
    .flatten()
    .find(|i| !i.trim().is_empty())
    .map(|i| absolute_url(i, site_url))
    .unwrap_or_default();

    let og_type = non_empty(social.kind.as_deref()).unwrap_or(&seo.default_type);
    let robots = non_empty(meta.robots.as_deref()).unwrap_or(&seo.default_robots);
    let keywords = if meta.tags.is_empty() {
        site.keywords.join(", ")
    } else {
        meta.tags.join(", ")
    };
    let language = non_empty(meta.language.as_deref())
        .or(non_empty(Some(site.language.as_str())))
        .unwrap_or("en")
        .to_string();
    let social_title = non_empty(social.title.as_deref()).unwrap_or(&title);
    let social_description = non_empty(social.description.as_deref()).unwrap_or(&description);
    let twitter_card = non_empty(social.card.as_deref()).unwrap_or(if image.is_empty() {
        "summary"
    } else {
        "summary_large_image"
    });
    let published = non_empty(meta.published_time.as_deref());
    let modified = non_empty(meta.modified_time.as_deref());

    let mut tags = Vec::new();
    if !description.is_empty() {
        tags.push(meta_tag("name", "description", &description));
    }
    if !keywords.is_empty() {
        tags.push(meta_tag("name", "keywords", &keywords));
    }
    if !site.author.is_empty() {
        tags.push(meta_tag("name", "author", &site.author));
    }
    if !robots.is_empty() {
        tags.push(meta_tag("name", "robots", robots));
    }
    tags.push(format!("<link rel=\"canonical\" href=\"{}\" />", escape_html(&canonical)));

    tags.push(meta_tag("property", "og:title", social_title));
    if !description.is_empty() {
        tags.push(meta_tag("property", "og:description", social_description));
    }
    tags.push(meta_tag("property", "og:type", og_type));
    tags.push(meta_tag("property", "og:url", &canonical));
    tags.push(meta_tag("property", "og:site_name", &site.title));
    tags.push(meta_tag("property", "og:locale", &seo.default_locale));
    if !image.is_empty() {
        tags.push(meta_tag("property", "og:image", &image));
    }
    if let Some(published) = published {
        tags.push(meta_tag("property", "article:published_time", published));
    }
    if let Some(modified) = modified {
        tags.push(meta_tag("property", "article:modified_time", modified));
    }

    tags.push(meta_tag("name", "twitter:card", twitter_card));
    tags.push(meta_tag("name", "twitter:title", social_title));
    if !description.is_empty() {
        tags.push(meta_tag("name", "twitter:description", social_description));
    }
    if !image.is_empty() {
        tags.push(meta_tag("name", "twitter:image", &image));
    }
    if !seo.twitter_handle.is_empty() {
        tags.push(meta_tag("name", "twitter:site", &seo.twitter_handle));
    }

    let json_ld = json_ld(&title, &description, &canonical, &language, modified, config);
    tags.push(format!("<script type=\"application/ld+json\">{json_ld}</script>"));

    SeoHead {
        language,
        head_meta: tags.join("\n"),
    }
}

fn json_ld(
    title: &str,
    description: &str,
    url: &str,
    language: &str,
    modified: Option<&str>,
    config: &SiteConfig,
) -> String {
    let mut web_page = json!({
        "@context": "https://schema.org",
        "@type": "WebPage",
        "inLanguage": language,
        "name": title,
        "description": description,
        "url": url,
    });
    if let Some(modified) = modified {
        web_page["dateModified"] = json!(modified);
    }

    let person_name = non_empty(Some(config.seo.organization_name.as_str()))
        .or(non_empty(Some(config.site.author.as_str())));
    let document = match person_name {
        Some(name) => {
            let mut person = json!({
                "@context": "https://schema.org",
                "@type": "Person",
                "name": name,
            });
            let same_as: Vec<&str> = config
                .seo
                .same_as
                .iter()
                .map(String::as_str)
                .filter(|s| !s.is_empty())
                .collect();
            if !same_as.is_empty() {
                person["sameAs"] = json!(same_as);
            }
            json!({ "@context": "https://schema.org", "@graph": [web_page, person] })
        }
        None => web_page,
    };

    serde_json::to_string(&document)
        .unwrap_or_else(|_| Value::Null.to_string())
        .replace("</script>", "<\\/script>")
}

fn meta_tag(attr: &str, key: &str, content: &str) -> String {
    format!("<meta {attr}=\"{key}\" content=\"{}\" />", escape_html(content))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Plain text, at most 160 characters.
fn trim_description(value: &str) -> String {
    truncate(&TAG.replace_all(value, " "), DESCRIPTION_LENGTH)
}

/// Prefix site-relative hrefs with the configured site URL.
fn absolute_url(href: &str, site_url: &str) -> String {
    let href = href.trim();
    if href.is_empty() || HTTP_URL.is_match(href) || site_url.is_empty() {
        return href.to_string();
    }
    let base = site_url.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{base}{href}")
    } else {
        format!("{base}/{href}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn page(doc: Value) -> Page {
        Page::from_value(doc).unwrap()
    }

    fn config(toml: &str) -> SiteConfig {
        SiteConfig::parse(Path::new("config.toml"), toml).unwrap()
    }

    #[test]
    fn test_basic_head() {
        let config = config("[site]\ntitle = \"Ada\"\nkeywords = [\"math\"]\n");
        let head = build_head(
            &page(json!({ "header": { "title": "About", "lead": "I <b>build</b> engines." }, "body": [] })),
            &config,
            "about/1-me.html",
        );
        assert_eq!(head.language, "en");
        let meta = &head.head_meta;
        assert!(meta.contains("<meta name=\"description\" content=\"I build engines.\" />"));
        assert!(meta.contains("<meta name=\"keywords\" content=\"math\" />"));
        assert!(meta.contains("<link rel=\"canonical\" href=\"/about/1-me.html\" />"));
        assert!(meta.contains("<meta property=\"og:title\" content=\"About\" />"));
        assert!(meta.contains("<meta property=\"og:site_name\" content=\"Ada\" />"));
        assert!(meta.contains("<meta property=\"og:image\" content=\"assets/icons/favicon.svg\" />"));
        assert!(meta.contains("<meta name=\"twitter:card\" content=\"summary_large_image\" />"));
        assert!(meta.contains("\"@type\":\"WebPage\""));
        assert!(!meta.contains("@graph"));
    }

    #[test]
    fn test_site_url_and_person_graph() {
        let config = config(
            "[site]\nauthor = \"Ada Lovelace\"\n[seo]\nsite_url = \"https://ada.dev/\"\nsame_as = [\"https://github.com/ada\"]\n",
        );
        let head = build_head(
            &page(json!({
                "meta": {
                    "title": "Notes</script>",
                    "tags": ["a", "b"],
                    "image": "assets/images/card.png",
                    "modifiedTime": "2024-02-01",
                    "language": "es",
                    "social": { "title": "Shared", "card": "summary" }
                },
                "body": []
            })),
            &config,
            "index.html",
        );
        let meta = &head.head_meta;
        assert_eq!(head.language, "es");
        assert!(meta.contains("<link rel=\"canonical\" href=\"https://ada.dev/index.html\" />"));
        assert!(meta.contains("content=\"https://ada.dev/assets/images/card.png\""));
        assert!(meta.contains("<meta name=\"keywords\" content=\"a, b\" />"));
        assert!(meta.contains("<meta name=\"author\" content=\"Ada Lovelace\" />"));
        assert!(meta.contains("<meta property=\"og:title\" content=\"Shared\" />"));
        assert!(meta.contains("<meta name=\"twitter:card\" content=\"summary\" />"));
        assert!(meta.contains("article:modified_time"));
        assert!(meta.contains("\"@graph\""));
        assert!(meta.contains("\"sameAs\":[\"https://github.com/ada\"]"));
        assert!(meta.contains("Notes<\\/script>"));
    }

    #[test]
    fn test_description_is_trimmed() {
        let long = "word ".repeat(60);
        let trimmed = trim_description(&long);
        assert_eq!(trimmed.chars().count(), 162);
        assert!(trimmed.ends_with("..."));
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(absolute_url("/a.png", "https://x.org/"), "https://x.org/a.png");
        assert_eq!(absolute_url("https://cdn/a.png", "https://x.org"), "https://cdn/a.png");
        assert_eq!(absolute_url("a.png", ""), "a.png");
    }
}
