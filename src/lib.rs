//! # Folio
//!
//! A static site compiler for personal academic and professional portfolio
//! sites. Pages are authored as JSON documents under `src/content/`; each one
//! holds an optional header, an ordered list of typed content blocks, and an
//! optional footer. The build turns every document into a complete HTML page
//! wrapped in a template shell, with navigation, breadcrumbs, SEO metadata and
//! the assets the pages reference.
//!
//! # Pipeline
//!
//! ```text
//! config.toml ─┐
//!              ├─ load + resolve {{cfg:..}} / {{hook:..}} ─ Page ─ render blocks
//! content/*.json ┘                                                      │
//!                      {{basePath}} substitution ─ shell template ─ minify ─ public/
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`build`] | Orchestrates a build run: load, render in parallel, write, copy assets |
//! | [`config`] | `config.toml` loading with defaults; the raw tree for `{{cfg:..}}` |
//! | [`resolve`] | `{{cfg:..}}` and `{{hook:..}}` references inside content documents |
//! | [`model`] | Typed page documents and block data |
//! | [`blocks`] | One renderer per block type |
//! | [`render`] | Block dispatch and page body assembly |
//! | [`inline`] | Inline markup: emphasis, code, links, line breaks |
//! | [`collection`] | Content collections: scan, filter, sort and excerpt sibling pages |
//! | [`site`] | The content tree: output paths, navigation, breadcrumbs, related pages |
//! | [`template`] | Template shells, asset lists, the embedded default template |
//! | [`seo`] | `<head>` metadata and JSON-LD |
//! | [`url`] | Base-path token, href safety and asset path mapping |
//! | [`html`] | Escaping, class lists, slugs and number formatting |
//! | [`minify`] | HTML and CSS minification |
//! | [`console`] | Cargo-style status lines |
//! | [`error`] | Diagnostics |

pub mod blocks;
pub mod build;
pub mod collection;
pub mod config;
pub mod console;
pub mod error;
pub mod html;
pub mod inline;
pub mod minify;
pub mod model;
pub mod render;
pub mod resolve;
pub mod seo;
pub mod site;
pub mod template;
pub mod url;
