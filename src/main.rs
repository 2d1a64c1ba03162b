use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::blocks::RenderContext;
use folio::build::{BuildOptions, run_build};
use folio::collection::{CollectOptions, DEFAULT_EXCERPT_LENGTH, SortKey, collect};
use folio::config::SiteConfig;
use folio::render::render_page;
use folio::site::SourcePage;
use folio::url::{apply_base_path, normalize_base_path};

#[derive(Parser, Debug)]
#[command(
    about = "A static site compiler for JSON-authored portfolio sites",
    after_help = "I turn the JSON pages under src/content into a ready-to-serve site. Run `folio <command> --help` for more info on a specific command.",
    subcommand_help_heading = "What can I do for you",
    disable_help_subcommand = true,
    disable_help_flag = true,
)]
struct Args {
    /// Show this help message
    #[arg(short, long, action = clap::ArgAction::Help, global = true)]
    help: (),

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// I'll build your site
    Build {
        /// Path to the site directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output directory (defaults to `build.output_dir` from config.toml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only render this content document, e.g. src/content/1-news/1-post.json
        #[arg(long)]
        page: Option<String>,

        /// URL prefix the site is served under, e.g. /portfolio
        #[arg(long)]
        base_path: Option<String>,

        /// Leave HTML and CSS as written
        #[arg(long)]
        no_minify: bool,
    },
    /// I'll list the entries a content collection would show, as JSON
    Collect {
        /// Path to the site directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Directory to collect from, relative to the content directory
        #[arg(short, long)]
        source: String,

        /// date-desc, date-asc, title-asc or title-desc
        #[arg(long)]
        sort: Option<String>,

        /// Keep at most this many entries
        #[arg(long)]
        limit: Option<usize>,

        /// Also count documents directly inside the source directory
        #[arg(long)]
        include_root_files: bool,

        /// Include unpublished and draft pages too
        #[arg(long)]
        all: bool,

        /// Paths or file names to leave out (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        /// Excerpt length in characters
        #[arg(long, default_value_t = DEFAULT_EXCERPT_LENGTH)]
        excerpt_length: usize,

        /// URL prefix used in the entry links
        #[arg(long)]
        base_path: Option<String>,
    },
    /// I'll render one content document's body and print the HTML
    Render {
        /// The content document to render
        file: PathBuf,

        /// Site directory, for config and disk-backed blocks
        #[arg(long, default_value = ".")]
        site: PathBuf,

        /// URL prefix substituted for {{basePath}}
        #[arg(long)]
        base_path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .context_lines(3)
                .rgb_colors(miette::RgbColors::Preferred)
                .color(true)
                .with_syntax_highlighting(miette::highlighters::SyntectHighlighter::default())
                .build(),
        )
    }))
    .expect("Failed to set miette hook");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match args.command {
        Command::Build {
            path,
            output,
            page,
            base_path,
            no_minify,
        } => {
            run_build(BuildOptions {
                site_path: path,
                output_path: output,
                page,
                base_path,
                no_minify,
            })
            .await?;
        }
        Command::Collect {
            path,
            source,
            sort,
            limit,
            include_root_files,
            all,
            exclude,
            excerpt_length,
            base_path,
        } => {
            let config = SiteConfig::load(&path).await?;
            let ctx = RenderContext::new(&path, &config.build.content_dir);
            let base_path = base_path.unwrap_or_else(|| config.build.base_path.clone());
            let mut entries = collect(
                &ctx,
                &CollectOptions {
                    source,
                    include_root_files,
                    published_only: !all,
                    exclude,
                    excerpt_length,
                    sort: SortKey::from_key(sort.as_deref()),
                    limit,
                },
            )?;
            for entry in &mut entries {
                entry.href = apply_base_path(&entry.href, &base_path);
                entry.image = apply_base_path(&entry.image, &base_path);
            }
            println!("{}", serde_json::to_string_pretty(&entries).into_diagnostic()?);
        }
        Command::Render {
            file,
            site,
            base_path,
        } => {
            let config = SiteConfig::load(&site).await?;
            let content_root = site.join(&config.build.content_dir);
            let page = SourcePage::load(&content_root, &file, &config)?;
            let ctx = RenderContext::new(&site, &config.build.content_dir);
            let html = render_page(&page.page, &ctx).map_err(|e| e.in_page(&file))?;
            let base_path =
                normalize_base_path(base_path.as_deref().unwrap_or(&config.build.base_path));
            print!("{}", apply_base_path(&html, &base_path));
        }
    }

    Ok(())
}
