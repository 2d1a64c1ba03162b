//! Image and embedded-media blocks.
//!
//! Zoomable images need a DOM id that stays the same across rebuilds, so
//! group keys are derived from the block `id` (or the image source) with
//! [`slugify_id`].

use crate::blocks::{figcaption, non_empty, positive, style_attr};
use crate::error::{FolioError, Result};
use crate::html::{block_classes, escape_html, format_number, slugify_id};
use crate::inline::{InlineOptions, format_inline};
use crate::model::{Block, EmbedData, FeatureImageData, ImageGalleryData, MapData, MediaImageData};
use crate::url::{Relative, normalize_asset_src, resolve_href};

const SHAPES: &[&str] = &["square", "rounded", "circle", "octagon", "hexagon", "diamond"];
const LOAD_EFFECTS: &[&str] = &[
    "none",
    "slide-ltr",
    "slide-rtl",
    "slide-ttb",
    "slide-btt",
    "fade-in",
    "blink",
];
const GALLERY_LAYOUTS: &[&str] = &["masonry", "photo", "justified", "moodboard", "photomontage"];

/// Lowercased `value` if it's one of `allowed`, otherwise `fallback`.
fn closed_set(value: Option<&str>, allowed: &[&'static str], fallback: &'static str) -> &'static str {
    let key = value.unwrap_or("").trim().to_lowercase();
    allowed
        .iter()
        .copied()
        .find(|candidate| *candidate == key)
        .unwrap_or(fallback)
}

/// `<prefix>-<slug of id or seed>`, with `empty` when the slug comes out blank.
fn group_id(prefix: &str, block: &Block, seed: &str, empty: &str) -> String {
    let base = slugify_id(block.id.as_deref().unwrap_or(seed));
    if base.is_empty() {
        format!("{prefix}-{empty}")
    } else {
        format!("{prefix}-{base}")
    }
}

fn lazy_img(src: &str, alt: &str, class: Option<&str>) -> String {
    let class = class
        .map(|c| format!(" class=\"{c}\""))
        .unwrap_or_default();
    format!(
        "<img{class} src=\"{}\" alt=\"{}\" loading=\"lazy\" decoding=\"async\" />",
        escape_html(src),
        escape_html(alt)
    )
}

pub fn render_feature_image(block: &Block, data: &FeatureImageData) -> Result<String> {
    let raw_src = data.src.trim();
    if raw_src.is_empty() {
        return Err(FolioError::missing_field("feature-image", "src"));
    }

    let src = normalize_asset_src(raw_src)?;
    let alt = non_empty(data.alt.as_deref()).unwrap_or("Feature image");
    let shape = format!("shape-{}", closed_set(data.shape.as_deref(), SHAPES, "square"));
    let effect = format!(
        "effect-{}",
        closed_set(data.load_effect.as_deref(), LOAD_EFFECTS, "none")
    );
    let classes = block_classes(
        &[
            "feature-image",
            "block-feature-image",
            &shape,
            &effect,
            if data.shadow { "has-shadow" } else { "" },
            if data.zoom { "is-zoomable" } else { "" },
        ],
        &block.style,
    );
    let style = style_attr(
        positive(data.size).map(|size| format!("--feature-image-size: {}px;", format_number(size))),
    );

    if !data.zoom {
        return Ok(format!(
            "<figure class=\"{classes}\"{style}>\n<div class=\"feature-image-frame\">{}</div>\n</figure>\n",
            lazy_img(&src, alt, None)
        ));
    }

    // A checkbox and two labels bound to it toggle the overlay without script.
    let zoom_id = group_id("feature-image-zoom", block, raw_src, "item");
    Ok(format!(
        "<figure class=\"{classes}\"{style}>\n\
         <input id=\"{zoom_id}\" class=\"feature-image-zoom-toggle\" type=\"checkbox\" />\n\
         <label class=\"feature-image-frame\" for=\"{zoom_id}\" role=\"button\" aria-label=\"Open enlarged image\">{}</label>\n\
         <label class=\"feature-image-zoom-overlay\" for=\"{zoom_id}\" aria-label=\"Close enlarged image\">{}</label>\n\
         </figure>\n",
        lazy_img(&src, alt, None),
        lazy_img(&src, alt, Some("feature-image-zoom-image")),
    ))
}

pub fn render_media_image(block: &Block, data: &MediaImageData) -> Result<String> {
    let raw_src = data.src.trim();
    if raw_src.is_empty() {
        return Err(FolioError::missing_field("media-image", "src"));
    }

    let src = normalize_asset_src(raw_src)?;
    let alt = [&data.alt, &data.caption, &data.legend]
        .into_iter()
        .find_map(|v| non_empty(v.as_deref()))
        .unwrap_or("Image");
    let caption = non_empty(data.legend.as_deref()).or(non_empty(data.caption.as_deref()));
    let classes = block_classes(
        &[
            "media-image",
            "block-media-image",
            if data.zoom { "is-zoomable" } else { "" },
        ],
        &block.style,
    );
    let style = style_attr(
        positive(data.width).map(|w| format!("--media-image-max-width: {}px;", format_number(w))),
    );

    let image = lazy_img(&src, alt, None);
    let body = if data.zoom {
        let caption_attr = caption
            .map(|c| format!(" data-lightbox-caption=\"{}\"", escape_html(c)))
            .unwrap_or_default();
        format!(
            "<button type=\"button\" class=\"media-image-trigger\" data-lightbox-group=\"{}\" \
             data-lightbox-index=\"0\" data-lightbox-src=\"{}\" data-lightbox-alt=\"{}\"{caption_attr} \
             aria-label=\"Open image\">{image}</button>",
            group_id("media-image", block, raw_src, "item"),
            escape_html(&src),
            escape_html(alt),
        )
    } else {
        image
    };

    Ok(format!(
        "<figure class=\"{classes}\"{style}>\n{body}\n{}</figure>\n",
        figcaption(caption)?
    ))
}

pub fn render_image_gallery(block: &Block, data: &ImageGalleryData) -> Result<String> {
    if data.images.is_empty() {
        return Err(FolioError::EmptyGallery);
    }

    let layout = format!(
        "layout-{}",
        closed_set(data.layout.as_deref(), GALLERY_LAYOUTS, "photo")
    );
    let zoom = data.zoom != Some(false);
    let carousel = data.carousel != Some(false);
    let seed = non_empty(Some(data.images[0].src.as_str())).unwrap_or("gallery");
    let group = group_id("image-gallery", block, seed, "items");

    let classes = block_classes(
        &[
            "image-gallery",
            "block-image-gallery",
            &layout,
            if zoom { "is-zoomable" } else { "" },
            if carousel { "has-carousel" } else { "" },
        ],
        &block.style,
    );
    let style = style_attr(
        positive(data.gap).map(|gap| format!("--image-gallery-gap: {}px;", format_number(gap))),
    );

    let mut items = String::new();
    for (index, image) in data.images.iter().enumerate() {
        let src = normalize_asset_src(&image.src)?;
        if src.is_empty() {
            return Err(FolioError::GalleryItemMissingSrc {
                index: (index + 1).into(),
            });
        }

        let fallback_alt = format!("Gallery image {}", index + 1);
        let alt = non_empty(image.alt.as_deref())
            .or(non_empty(image.caption.as_deref()))
            .unwrap_or(&fallback_alt);
        let caption = non_empty(image.caption.as_deref());
        let img = lazy_img(&src, alt, None);

        let body = if zoom {
            let caption_attr = caption
                .map(|c| format!(" data-lightbox-caption=\"{}\"", escape_html(c)))
                .unwrap_or_default();
            format!(
                "<button type=\"button\" class=\"image-gallery-trigger\" data-lightbox-group=\"{group}\" \
                 data-lightbox-index=\"{index}\" data-lightbox-src=\"{}\" data-lightbox-alt=\"{}\"{caption_attr} \
                 aria-label=\"Open image {}\">{img}</button>",
                escape_html(&src),
                escape_html(alt),
                index + 1
            )
        } else {
            img
        };

        items.push_str(&format!(
            "<figure class=\"image-gallery-item\">{body}{}</figure>\n",
            figcaption(caption)?
        ));
    }

    let title = non_empty(data.title.as_deref())
        .map(|t| format_inline(t, &InlineOptions::single_line()))
        .transpose()?
        .map(|t| format!("<h3 class=\"image-gallery-title\">{t}</h3>\n"))
        .unwrap_or_default();

    Ok(format!(
        "<section class=\"{classes}\"{style}>\n{title}<div class=\"image-gallery-grid\">\n{items}</div>\n</section>\n"
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EmbedKind {
    Iframe,
    Video,
}

impl EmbedKind {
    fn resolve(kind: Option<&str>, src: &str) -> Self {
        match kind.unwrap_or("").trim().to_lowercase().as_str() {
            "iframe" => EmbedKind::Iframe,
            "video" => EmbedKind::Video,
            _ => {
                let lower = src.to_lowercase();
                if [".mp4", ".webm", ".ogg"].iter().any(|ext| lower.ends_with(ext)) {
                    EmbedKind::Video
                } else {
                    EmbedKind::Iframe
                }
            }
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            EmbedKind::Iframe => "iframe",
            EmbedKind::Video => "video",
        }
    }
}

/// `N / M` aspect ratio with whitespace collapsed; anything else is 16 / 9.
fn embed_ratio(value: Option<&str>) -> String {
    static RATIO: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
        regex::Regex::new(r"^\d+(\.\d+)?\s*/\s*\d+(\.\d+)?$").expect("valid ratio regex")
    });

    match non_empty(value) {
        Some(ratio) if RATIO.is_match(ratio) => ratio.split_whitespace().collect::<Vec<_>>().join(" "),
        _ => "16 / 9".to_string(),
    }
}

pub fn render_embed(block: &Block, data: &EmbedData) -> Result<String> {
    let raw_src = data.src.trim();
    if raw_src.is_empty() {
        return Err(FolioError::missing_field("embed", "src"));
    }

    let kind = EmbedKind::resolve(data.kind.as_deref(), raw_src);
    let kind_class = format!("kind-{}", kind.as_str());
    let classes = block_classes(&["embed-block", "block-embed", &kind_class], &block.style);
    let title = non_empty(data.title.as_deref()).unwrap_or("Embedded content");
    let ratio = embed_ratio(data.ratio.as_deref());

    let media = match kind {
        EmbedKind::Video => format!(
            "<video controls preload=\"metadata\" src=\"{}\"></video>",
            escape_html(&normalize_asset_src(raw_src)?)
        ),
        EmbedKind::Iframe => format!(
            "<iframe src=\"{}\" title=\"{}\" loading=\"lazy\" \
             referrerpolicy=\"strict-origin-when-cross-origin\" allowfullscreen></iframe>",
            escape_html(&resolve_href(raw_src, "#", Relative::AsIs)?),
            escape_html(title)
        ),
    };

    Ok(format!(
        "<figure class=\"{classes}\" style=\"--embed-ratio: {ratio};\">\n<div class=\"embed-frame\">{media}</div>\n{}</figure>\n",
        figcaption(data.caption.as_deref())?
    ))
}

#[derive(Debug, Default, PartialEq)]
struct MapUrls {
    embed: String,
    link: String,
}

/// A hand-written map URL, with unsafe schemes mapped to `#`.
fn manual_map_url(value: Option<&str>) -> Result<String> {
    match non_empty(value) {
        Some(url) => resolve_href(url, "#", Relative::AsIs),
        None => Ok(String::new()),
    }
}

fn map_urls(data: &MapData) -> Result<MapUrls> {
    let manual_embed = manual_map_url(data.embed_url.as_deref())?;
    let manual_link = manual_map_url(data.link_url.as_deref())?;

    let (Some(lat), Some(lon)) = (data.latitude, data.longitude) else {
        return Ok(MapUrls {
            embed: manual_embed,
            link: manual_link,
        });
    };

    let provider = data
        .provider
        .as_deref()
        .unwrap_or("openstreetmap")
        .trim()
        .to_lowercase();
    let derived = if provider == "googlemaps" {
        let query = format!("{lat},{lon}");
        MapUrls {
            embed: format!("https://www.google.com/maps?q={query}&output=embed"),
            link: format!("https://www.google.com/maps?q={query}"),
        }
    } else {
        let min_lon = format!("{:.6}", lon - 0.002275);
        let min_lat = format!("{:.6}", lat - 0.001299);
        let max_lon = format!("{:.6}", lon + 0.002325);
        let max_lat = format!("{:.6}", lat + 0.001301);
        MapUrls {
            embed: format!(
                "https://www.openstreetmap.org/export/embed.html?bbox={min_lon}%2C{min_lat}%2C{max_lon}%2C{max_lat}&layer=mapnik&marker={lat}%2C{lon}"
            ),
            link: format!("https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map=18/{lat}/{lon}"),
        }
    };

    Ok(MapUrls {
        embed: if manual_embed.is_empty() { derived.embed } else { manual_embed },
        link: if manual_link.is_empty() { derived.link } else { manual_link },
    })
}

pub fn render_map(block: &Block, data: &MapData) -> Result<String> {
    let classes = block_classes(&["map-block", "block-map"], &block.style);
    let title = non_empty(data.title.as_deref()).unwrap_or("Location map");
    let height = data
        .height
        .filter(|h| h.is_finite())
        .map(|h| h.max(220.0))
        .unwrap_or(360.0);
    let urls = map_urls(data)?;

    let frame = if urls.embed.is_empty() {
        String::new()
    } else {
        format!(
            "<iframe class=\"map-frame\" src=\"{}\" title=\"{}\" loading=\"lazy\" \
             referrerpolicy=\"no-referrer-when-downgrade\" style=\"height: {}px;\"></iframe>\n",
            escape_html(&urls.embed),
            escape_html(title),
            format_number(height)
        )
    };
    let address = non_empty(data.address.as_deref())
        .map(|a| format_inline(a, &InlineOptions::default()))
        .transpose()?
        .map(|a| format!("<p class=\"map-address\">{a}</p>"))
        .unwrap_or_default();
    let coordinates = match (data.latitude, data.longitude) {
        (Some(lat), Some(lon)) => format!(
            "<p class=\"map-coordinates\">Coordinates: {}</p>",
            escape_html(&format!("{lat}, {lon}"))
        ),
        _ => String::new(),
    };
    let link = if urls.link.is_empty() {
        String::new()
    } else {
        format!(
            "<a class=\"map-open-link\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Open map</a>",
            escape_html(&urls.link)
        )
    };

    Ok(format!(
        "<section class=\"{classes}\" aria-label=\"{}\">\n{frame}<div class=\"map-meta\">{address}{coordinates}{link}</div>\n</section>\n",
        escape_html(title)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockContent, GalleryImage, ParagraphData};

    fn block(id: Option<&str>) -> Block {
        Block {
            id: id.map(str::to_string),
            style: vec![],
            content: BlockContent::Paragraph(ParagraphData::default()),
        }
    }

    fn feature(src: &str) -> FeatureImageData {
        FeatureImageData {
            src: src.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_feature_image_requires_src() {
        let err = render_feature_image(&block(None), &feature("  ")).unwrap_err();
        assert!(matches!(err, FolioError::MissingField { field: "src", .. }));
    }

    #[test]
    fn test_feature_image_defaults() {
        let mut data = feature("/src/assets/me.jpg");
        data.shape = Some("blob".into());
        data.load_effect = Some("spin".into());
        let html = render_feature_image(&block(None), &data).unwrap();
        assert!(html.contains("class=\"feature-image block-feature-image shape-square effect-none\""));
        assert!(html.contains("src=\"{{basePath}}/assets/me.jpg\" alt=\"Feature image\""));
        assert!(!html.contains("style="));
        assert!(!html.contains("checkbox"));
    }

    #[test]
    fn test_feature_image_shape_effect_and_size() {
        let mut data = feature("assets/me.jpg");
        data.shape = Some(" Circle ".into());
        data.load_effect = Some("fade-in".into());
        data.shadow = true;
        data.size = Some(240.0);
        let html = render_feature_image(&block(None), &data).unwrap();
        assert!(html.contains("shape-circle effect-fade-in has-shadow"));
        assert!(html.contains("style=\"--feature-image-size: 240px;\""));
    }

    #[test]
    fn test_feature_image_zoom_pair() {
        let mut data = feature("assets/Me Portrait.JPG");
        data.zoom = true;
        let html = render_feature_image(&block(None), &data).unwrap();
        let id = "feature-image-zoom-assets-me-portrait-jpg";
        assert!(html.contains(&format!("<input id=\"{id}\" class=\"feature-image-zoom-toggle\" type=\"checkbox\" />")));
        assert_eq!(html.matches(&format!("for=\"{id}\"")).count(), 2);
        assert!(html.contains("feature-image-zoom-image"));

        // Stable across renders, and the block id wins over the source
        assert_eq!(html, render_feature_image(&block(None), &data).unwrap());
        let html = render_feature_image(&block(Some("Hero Shot")), &data).unwrap();
        assert!(html.contains("id=\"feature-image-zoom-hero-shot\""));
    }

    #[test]
    fn test_media_image_alt_and_caption_fallbacks() {
        let data = MediaImageData {
            src: "assets/lab.jpg".into(),
            caption: Some("The lab".into()),
            legend: Some("Lab, 2024".into()),
            width: Some(480.0),
            ..Default::default()
        };
        let html = render_media_image(&block(None), &data).unwrap();
        assert!(html.contains("alt=\"The lab\""));
        assert!(html.contains("<figcaption>Lab, 2024</figcaption>"));
        assert!(html.contains("style=\"--media-image-max-width: 480px;\""));
        assert!(!html.contains("is-zoomable"));

        let bare = MediaImageData {
            src: "a.jpg".into(),
            ..Default::default()
        };
        let html = render_media_image(&block(None), &bare).unwrap();
        assert!(html.contains("alt=\"Image\""));
        assert!(!html.contains("figcaption"));
    }

    #[test]
    fn test_media_image_zoom_trigger() {
        let data = MediaImageData {
            src: "assets/lab.jpg".into(),
            caption: Some("Lab".into()),
            zoom: true,
            ..Default::default()
        };
        let html = render_media_image(&block(Some("lab")), &data).unwrap();
        assert!(html.contains("class=\"media-image block-media-image is-zoomable\""));
        assert!(html.contains("data-lightbox-group=\"media-image-lab\""));
        assert!(html.contains("data-lightbox-index=\"0\""));
        assert!(html.contains("data-lightbox-caption=\"Lab\""));
    }

    #[test]
    fn test_media_image_requires_src() {
        let err = render_media_image(&block(None), &MediaImageData::default()).unwrap_err();
        assert!(matches!(err, FolioError::MissingField { .. }));
    }

    fn image(src: &str) -> GalleryImage {
        GalleryImage {
            src: src.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_gallery_requires_images() {
        let err = render_image_gallery(&block(None), &ImageGalleryData::default()).unwrap_err();
        assert!(matches!(err, FolioError::EmptyGallery));
    }

    #[test]
    fn test_gallery_item_without_src() {
        let data = ImageGalleryData {
            images: vec![image("a.jpg"), image(" ")],
            ..Default::default()
        };
        let err = render_image_gallery(&block(None), &data).unwrap_err();
        match err {
            FolioError::GalleryItemMissingSrc { index } => assert_eq!(index.0, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_gallery_indexes_and_group() {
        let data = ImageGalleryData {
            title: Some("Fieldwork".into()),
            layout: Some("Masonry".into()),
            gap: Some(12.0),
            images: vec![image("assets/a.jpg"), image("assets/b.jpg")],
            ..Default::default()
        };
        let html = render_image_gallery(&block(None), &data).unwrap();
        assert!(html.contains(
            "class=\"image-gallery block-image-gallery layout-masonry is-zoomable has-carousel\""
        ));
        assert!(html.contains("style=\"--image-gallery-gap: 12px;\""));
        assert!(html.contains("<h3 class=\"image-gallery-title\">Fieldwork</h3>"));
        assert!(html.contains("data-lightbox-index=\"0\""));
        assert!(html.contains("data-lightbox-index=\"1\""));
        assert!(html.contains("aria-label=\"Open image 2\""));
        assert!(html.contains("alt=\"Gallery image 2\""));
        assert_eq!(html.matches("data-lightbox-group=\"image-gallery-assets-a-jpg\"").count(), 2);
    }

    #[test]
    fn test_gallery_without_zoom() {
        let data = ImageGalleryData {
            zoom: Some(false),
            carousel: Some(false),
            layout: Some("grid".into()),
            images: vec![GalleryImage {
                src: "a.jpg".into(),
                alt: None,
                caption: Some("Caption".into()),
            }],
            ..Default::default()
        };
        let html = render_image_gallery(&block(None), &data).unwrap();
        assert!(html.contains("class=\"image-gallery block-image-gallery layout-photo\""));
        assert!(!html.contains("<button"));
        assert!(html.contains("alt=\"Caption\""));
        assert!(html.contains("<figcaption>Caption</figcaption>"));
    }

    #[test]
    fn test_embed_iframe_defaults() {
        let data = EmbedData {
            src: "https://www.youtube.com/embed/x".into(),
            ..Default::default()
        };
        let html = render_embed(&block(None), &data).unwrap();
        assert!(html.contains("class=\"embed-block block-embed kind-iframe\""));
        assert!(html.contains("style=\"--embed-ratio: 16 / 9;\""));
        assert!(html.contains("title=\"Embedded content\""));
        assert!(html.contains("referrerpolicy=\"strict-origin-when-cross-origin\" allowfullscreen"));
    }

    #[test]
    fn test_embed_video_inferred() {
        let data = EmbedData {
            src: "src/assets/talk.MP4".into(),
            ratio: Some("4  /   3".into()),
            caption: Some("Talk".into()),
            ..Default::default()
        };
        let html = render_embed(&block(None), &data).unwrap();
        assert!(html.contains("kind-video"));
        assert!(html.contains("<video controls preload=\"metadata\" src=\"{{basePath}}/assets/talk.MP4\"></video>"));
        assert!(html.contains("--embed-ratio: 4 / 3;"));
        assert!(html.contains("<figcaption>Talk</figcaption>"));
    }

    #[test]
    fn test_embed_rejects_bad_ratio_and_requires_src() {
        assert_eq!(embed_ratio(Some("wide")), "16 / 9");
        assert_eq!(embed_ratio(Some("21/9")), "21/9");
        let err = render_embed(&block(None), &EmbedData::default()).unwrap_err();
        assert!(matches!(err, FolioError::MissingField { .. }));
    }

    #[test]
    fn test_map_openstreetmap_urls() {
        let data = MapData {
            latitude: Some(40.4168),
            longitude: Some(-3.7038),
            ..Default::default()
        };
        let urls = map_urls(&data).unwrap();
        assert_eq!(
            urls.embed,
            "https://www.openstreetmap.org/export/embed.html?bbox=-3.706075%2C40.415501%2C-3.701475%2C40.418101&layer=mapnik&marker=40.4168%2C-3.7038"
        );
        assert_eq!(
            urls.link,
            "https://www.openstreetmap.org/?mlat=40.4168&mlon=-3.7038#map=18/40.4168/-3.7038"
        );
    }

    #[test]
    fn test_map_google_and_manual_urls() {
        let mut data = MapData {
            latitude: Some(1.5),
            longitude: Some(2.0),
            provider: Some("GoogleMaps".into()),
            ..Default::default()
        };
        assert_eq!(map_urls(&data).unwrap().embed, "https://www.google.com/maps?q=1.5,2&output=embed");

        data.link_url = Some("https://maps.example/x".into());
        assert_eq!(map_urls(&data).unwrap().link, "https://maps.example/x");

        let no_coords = MapData::default();
        assert_eq!(map_urls(&no_coords).unwrap(), MapUrls::default());
    }

    #[test]
    fn test_map_markup() {
        let data = MapData {
            title: Some("Office".into()),
            address: Some("1 Main St\nTown".into()),
            latitude: Some(1.0),
            longitude: Some(2.0),
            height: Some(100.0),
            ..Default::default()
        };
        let html = render_map(&block(None), &data).unwrap();
        assert!(html.contains("aria-label=\"Office\""));
        assert!(html.contains("style=\"height: 220px;\""));
        assert!(html.contains("<p class=\"map-address\">1 Main St<br />Town</p>"));
        assert!(html.contains("<p class=\"map-coordinates\">Coordinates: 1, 2</p>"));
        assert!(html.contains("class=\"map-open-link\""));

        let html = render_map(&block(None), &MapData::default()).unwrap();
        assert!(!html.contains("<iframe"));
        assert!(html.contains("aria-label=\"Location map\""));
    }

    #[test]
    fn test_map_manual_urls_are_resolved() {
        let data = MapData {
            embed_url: Some("javascript:alert(1)".into()),
            link_url: Some(" vbscript:x ".into()),
            ..Default::default()
        };
        let urls = map_urls(&data).unwrap();
        assert_eq!(urls.embed, "#");
        assert_eq!(urls.link, "#");
        let html = render_map(&block(None), &data).unwrap();
        assert!(html.contains("<iframe class=\"map-frame\" src=\"#\""));
        assert!(!html.contains("javascript:"));

        let with_coords = MapData {
            latitude: Some(1.0),
            longitude: Some(2.0),
            embed_url: Some("data:text/html,x".into()),
            ..Default::default()
        };
        assert_eq!(map_urls(&with_coords).unwrap().embed, "#");
    }

    #[test]
    fn test_image_sources_with_parent_segments_are_errors() {
        let err = render_feature_image(&block(None), &feature("../../etc/passwd.png")).unwrap_err();
        assert!(matches!(err, FolioError::PathTraversal { .. }));

        let media = MediaImageData {
            src: "assets/../../x.jpg".into(),
            ..Default::default()
        };
        assert!(matches!(
            render_media_image(&block(None), &media),
            Err(FolioError::PathTraversal { .. })
        ));

        let gallery = ImageGalleryData {
            images: vec![image("assets/a.jpg"), image("../b.jpg")],
            ..Default::default()
        };
        assert!(matches!(
            render_image_gallery(&block(None), &gallery),
            Err(FolioError::PathTraversal { .. })
        ));

        let embed = EmbedData {
            src: "../talk.mp4".into(),
            ..Default::default()
        };
        assert!(render_embed(&block(None), &embed).is_err());
    }

    #[test]
    fn test_dotted_file_names_are_not_traversal() {
        let html = render_media_image(
            &block(None),
            &MediaImageData {
                src: "assets/scan..v2.jpg".into(),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(html.contains("src=\"{{basePath}}/assets/scan..v2.jpg\""));
    }
}
