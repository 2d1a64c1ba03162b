//! Link-shaped blocks: link, link-groups, card-grid and asset.

use crate::blocks::icons::{icon_svg, infer_icon_key};
use crate::blocks::non_empty;
use crate::error::Result;
use crate::html::{block_classes, escape_html};
use crate::inline::{InlineOptions, format_inline};
use crate::model::{AssetData, Block, CardGridData, LinkData, LinkGroupsData};
use crate::url::{
    BASE_PATH_TOKEN, Relative, is_relative_url, normalize_asset_src, prefix_base_path,
    resolve_href,
};

const NEW_TAB: &str = " target=\"_blank\" rel=\"noopener noreferrer\"";

pub fn render_link(block: &Block, data: &LinkData) -> Result<String> {
    let (href, target) = if data.external {
        (resolve_href(&data.url, "#", Relative::AsIs)?, "_blank")
    } else {
        (internal_href(&data.url)?, "_self")
    };
    let rel = if data.external {
        " rel=\"noopener noreferrer\""
    } else {
        ""
    };

    Ok(format!(
        "<a href=\"{}\" target=\"{target}\"{rel} class=\"{}\">{}</a>\n",
        escape_html(&href),
        block_classes(&["link", "block-link"], &block.style),
        format_inline(&data.label, &InlineOptions::label())?
    ))
}

/// Site link for a `link` block; an empty URL points at the site root.
fn internal_href(url: &str) -> Result<String> {
    let value = url.trim();
    if value.is_empty() {
        return Ok(format!("{BASE_PATH_TOKEN}/"));
    }
    let resolved = resolve_href(value, "", Relative::AsIs)?;
    if resolved.is_empty() {
        Ok("#".to_string())
    } else {
        Ok(prefix_base_path(&resolved))
    }
}

pub fn render_link_groups(block: &Block, data: &LinkGroupsData) -> Result<String> {
    let columns = data.columns.map(|c| c.clamp(1, 4)).unwrap_or(2);

    let groups = data
        .groups
        .iter()
        .map(|group| -> Result<String> {
            let links = group
                .links
                .iter()
                .map(|link| -> Result<String> {
                    let external = link.external != Some(false);
                    let href = group_link_href(&link.url, external)?;
                    let icon = non_empty(link.icon.as_deref())
                        .unwrap_or_else(|| infer_icon_key(&link.url));
                    let label = non_empty(link.label.as_deref()).unwrap_or(link.url.trim());
                    Ok(format!(
                        "<li class=\"link-groups-item\"><a class=\"link-groups-link\" href=\"{}\"{}>\
                         <span class=\"link-groups-icon\">{}</span>\
                         <span class=\"link-groups-label\">{}</span></a></li>\n",
                        escape_html(&href),
                        if external { NEW_TAB } else { "" },
                        icon_svg(icon),
                        format_inline(label, &InlineOptions::label())?
                    ))
                })
                .collect::<Result<String>>()?;

            let title = non_empty(group.title.as_deref())
                .map(|t| format_inline(t, &InlineOptions::label()))
                .transpose()?
                .map(|t| format!("<h3>{t}</h3>"))
                .unwrap_or_default();
            Ok(format!(
                "<article class=\"link-group\">{title}<ul class=\"link-groups-list\">\n{links}</ul></article>\n"
            ))
        })
        .collect::<Result<String>>()?;

    let title = non_empty(data.title.as_deref())
        .map(|t| format_inline(t, &InlineOptions::single_line()))
        .transpose()?
        .map(|t| format!("<h2>{t}</h2>\n"))
        .unwrap_or_default();

    Ok(format!(
        "<section class=\"{}\" style=\"--link-group-columns: {columns};\">\n{title}<div class=\"link-groups-grid\">\n{groups}</div>\n</section>\n",
        block_classes(&["link-groups", "block-link-groups"], &block.style)
    ))
}

/// Only internal relative links get the base path; external ones are left as written.
fn group_link_href(url: &str, external: bool) -> Result<String> {
    let resolved = resolve_href(url, "#", Relative::AsIs)?;
    if !external && is_relative_url(&resolved) {
        Ok(prefix_base_path(&resolved))
    } else {
        Ok(resolved)
    }
}

pub fn render_card_grid(block: &Block, data: &CardGridData) -> Result<String> {
    let cards = data
        .cards
        .iter()
        .map(|card| -> Result<String> {
            let image = non_empty(card.image.as_deref())
                .map(normalize_asset_src)
                .transpose()?
                .map(|src| format!("<img src=\"{}\" alt=\"\">", escape_html(&src)))
                .unwrap_or_default();
            let description = non_empty(card.description.as_deref())
                .map(|d| format_inline(d, &InlineOptions::default()))
                .transpose()?
                .map(|d| format!("<p>{d}</p>"))
                .unwrap_or_default();
            let link = match non_empty(card.link.as_deref()) {
                Some(href) => {
                    let label = non_empty(card.link_label.as_deref()).unwrap_or("Learn more");
                    format!(
                        "<a href=\"{}\">{}</a>",
                        escape_html(&resolve_href(href, "#", Relative::Site)?),
                        format_inline(label, &InlineOptions::label())?
                    )
                }
                None => String::new(),
            };

            Ok(format!(
                "<div class=\"card\">{image}<h3>{}</h3>{description}{link}</div>\n",
                format_inline(&card.title, &InlineOptions::single_line())?
            ))
        })
        .collect::<Result<String>>()?;

    Ok(format!(
        "<section class=\"{}\">\n{cards}</section>\n",
        block_classes(&["card-grid", "block-card-grid"], &block.style)
    ))
}

pub fn render_asset(block: &Block, data: &AssetData) -> Result<String> {
    let kind_class = non_empty(Some(data.kind.as_str())).map(|kind| format!("asset-{}", kind.to_lowercase()));
    let label = non_empty(data.label.as_deref()).unwrap_or("Download");
    Ok(format!(
        "<div class=\"{}\"><a href=\"{}\" target=\"_blank\">{}</a></div>\n",
        block_classes(
            &["asset", kind_class.as_deref().unwrap_or(""), "block-asset"],
            &block.style
        ),
        escape_html(&normalize_asset_src(&data.src)?),
        format_inline(label, &InlineOptions::label())?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FolioError;
    use crate::model::{BlockContent, Card, GroupLink, LinkGroup, ParagraphData};

    fn block() -> Block {
        Block {
            id: None,
            style: vec![],
            content: BlockContent::Paragraph(ParagraphData::default()),
        }
    }

    #[test]
    fn test_internal_link() {
        let html = render_link(
            &block(),
            &LinkData {
                label: "About".into(),
                url: "/about.html".into(),
                external: false,
            },
        )
        .unwrap();
        assert_eq!(
            html,
            "<a href=\"{{basePath}}/about.html\" target=\"_self\" class=\"link block-link\">About</a>\n"
        );
    }

    #[test]
    fn test_internal_link_edge_cases() {
        assert_eq!(internal_href("").unwrap(), "{{basePath}}/");
        assert_eq!(internal_href("{{basePath}}/x.html").unwrap(), "{{basePath}}/x.html");
        assert_eq!(internal_href("javascript:alert(1)").unwrap(), "#");
        assert!(matches!(
            internal_href("../outside.html"),
            Err(FolioError::PathTraversal { .. })
        ));
    }

    #[test]
    fn test_external_link() {
        let html = render_link(
            &block(),
            &LinkData {
                label: "Docs & more".into(),
                url: "https://example.com".into(),
                external: true,
            },
        )
        .unwrap();
        assert!(html.contains("href=\"https://example.com\""));
        assert!(html.contains("target=\"_blank\" rel=\"noopener noreferrer\""));
        assert!(html.contains(">Docs &amp; more</a>"));
    }

    fn link(url: &str, external: Option<bool>) -> GroupLink {
        GroupLink {
            label: None,
            url: url.into(),
            icon: None,
            external,
        }
    }

    #[test]
    fn test_link_groups() {
        let data = LinkGroupsData {
            title: Some("Find me".into()),
            columns: Some(9),
            groups: vec![LinkGroup {
                title: Some("Social".into()),
                links: vec![
                    link("https://github.com/ada", None),
                    link("6-contact/contact.html", Some(false)),
                    link("{{basePath}}/cv.pdf", Some(false)),
                ],
            }],
        };
        let html = render_link_groups(&block(), &data).unwrap();
        assert!(html.contains("style=\"--link-group-columns: 4;\""));
        assert!(html.contains("<h2>Find me</h2>"));
        assert!(html.contains("<h3>Social</h3>"));
        assert!(html.contains(
            "href=\"https://github.com/ada\" target=\"_blank\" rel=\"noopener noreferrer\">"
        ));
        assert!(html.contains(&icon_svg("github").to_string()));
        assert!(html.contains("href=\"{{basePath}}/6-contact/contact.html\">"));
        assert!(html.contains(icon_svg("contact")));
        // Prefixed exactly once
        assert!(html.contains("href=\"{{basePath}}/cv.pdf\">"));
        assert!(!html.contains("{{basePath}}/{{basePath}}"));
        assert!(html.contains("<span class=\"link-groups-label\">https://github.com/ada</span>"));
    }

    #[test]
    fn test_link_groups_default_columns_and_explicit_icon() {
        let data = LinkGroupsData {
            groups: vec![LinkGroup {
                title: None,
                links: vec![GroupLink {
                    label: Some("Mail".into()),
                    url: "".into(),
                    icon: Some("email".into()),
                    external: None,
                }],
            }],
            ..Default::default()
        };
        let html = render_link_groups(&block(), &data).unwrap();
        assert!(html.contains("--link-group-columns: 2;"));
        assert!(html.contains("href=\"#\""));
        assert!(html.contains(icon_svg("email")));
        assert!(!html.contains("<h3>"));
    }

    #[test]
    fn test_card_grid() {
        let data = CardGridData {
            cards: vec![
                Card {
                    title: "Project *X*".into(),
                    description: Some("About [it](x.html)".into()),
                    image: Some("assets/x.png".into()),
                    link: Some("projects/x.html".into()),
                    link_label: None,
                },
                Card {
                    title: "Bare".into(),
                    link: Some("javascript:void(0)".into()),
                    ..Default::default()
                },
            ],
        };
        let html = render_card_grid(&block(), &data).unwrap();
        assert!(html.starts_with("<section class=\"card-grid block-card-grid\">"));
        assert!(html.contains("<img src=\"{{basePath}}/assets/x.png\" alt=\"\">"));
        assert!(html.contains("<h3>Project <em>X</em></h3>"));
        assert!(html.contains("<p>About <a href=\"{{basePath}}/x.html\">it</a></p>"));
        assert!(html.contains("<a href=\"{{basePath}}/projects/x.html\">Learn more</a>"));
        assert!(html.contains("<a href=\"#\">Learn more</a>"));
    }

    #[test]
    fn test_asset() {
        let data = AssetData {
            kind: "PDF".into(),
            src: "assets/cv.pdf".into(),
            label: None,
        };
        let html = render_asset(&block(), &data).unwrap();
        assert_eq!(
            html,
            "<div class=\"asset asset-pdf block-asset\"><a href=\"{{basePath}}/assets/cv.pdf\" target=\"_blank\">Download</a></div>\n"
        );
    }

    #[test]
    fn test_parent_segments_in_link_targets_are_errors() {
        let card = CardGridData {
            cards: vec![Card {
                title: "X".into(),
                image: Some("../../etc/passwd.png".into()),
                ..Default::default()
            }],
        };
        assert!(matches!(
            render_card_grid(&block(), &card),
            Err(FolioError::PathTraversal { .. })
        ));

        let asset = AssetData {
            kind: "pdf".into(),
            src: "assets/../../cv.pdf".into(),
            label: None,
        };
        assert!(render_asset(&block(), &asset).is_err());

        let groups = LinkGroupsData {
            groups: vec![LinkGroup {
                title: None,
                links: vec![link("../private.html", Some(false))],
            }],
            ..Default::default()
        };
        assert!(render_link_groups(&block(), &groups).is_err());
    }
}
