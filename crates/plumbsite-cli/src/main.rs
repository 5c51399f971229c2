mod lookup;
mod preview;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use plumbsite_core::{HydrationOptions, IdentifierMode};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "plumbsite")]
#[command(about = "Hydrate plumber site templates from the shared business dataset")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Hydrate a template the way a browser would and write the result
    Preview(PreviewArgs),
    /// Resolve a query string to its business record and print it as JSON
    Lookup {
        /// Page query string, e.g. `?place_id=abc`
        query: String,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Print the slug a site name resolves to
    Slug { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Raw,
    Slug,
}

impl From<ModeArg> for IdentifierMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Raw => IdentifierMode::Raw,
            ModeArg::Slug => IdentifierMode::Slug,
        }
    }
}

/// Overrides layered on top of the environment configuration.
#[derive(Debug, Clone, Default, clap::Args)]
struct PipelineArgs {
    /// Business dataset URL (overrides PLUMBSITE_DATASET_URL)
    #[arg(long)]
    dataset_url: Option<String>,
    /// Photo content URL (overrides PLUMBSITE_PHOTO_URL)
    #[arg(long)]
    photo_url: Option<String>,
    /// How the page identifies its business
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Do not fetch or merge the photo document
    #[arg(long)]
    no_photos: bool,
}

impl PipelineArgs {
    fn apply(&self, config: &mut plumbsite_core::AppConfig) {
        if let Some(url) = &self.dataset_url {
            config.dataset_url.clone_from(url);
        }
        if let Some(url) = &self.photo_url {
            config.photo_url.clone_from(url);
        }
        if let Some(mode) = self.mode {
            config.hydration.identifier_mode = mode.into();
        }
        if self.no_photos {
            config.hydration.merge_photos = false;
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
struct PreviewArgs {
    /// HTML template to hydrate
    template: PathBuf,
    /// Page query string, e.g. `?place_id=abc`
    #[arg(long)]
    query: String,
    #[command(flatten)]
    pipeline: PipelineArgs,
    /// Start every widget at load instead of on first visibility
    #[arg(long)]
    eager: bool,
    /// Replace `{fieldName}` tokens in the template
    #[arg(long)]
    tokens: bool,
    /// Viewport height in pixels
    #[arg(long, default_value_t = 800.0)]
    viewport_height: f64,
    /// Height given to each `section[id]` when laying out the page
    #[arg(long, default_value_t = 800.0)]
    section_height: f64,
    /// Scroll positions to visit after load, in order
    #[arg(long = "scroll-to", value_delimiter = ',')]
    scroll_to: Vec<f64>,
    /// Seconds to let the carousels run before writing the page
    #[arg(long, default_value_t = 0)]
    run_for: u64,
    /// Treat every image URL as loadable instead of requesting it
    #[arg(long)]
    offline_images: bool,
    /// Write the hydrated page here instead of stdout
    #[arg(long, short)]
    out: Option<PathBuf>,
}

impl PreviewArgs {
    fn options(&self, base: &HydrationOptions) -> HydrationOptions {
        HydrationOptions {
            lazy_widgets: base.lazy_widgets && !self.eager,
            placeholder_tokens: base.placeholder_tokens || self.tokens,
            ..base.clone()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let mut config = plumbsite_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Preview(args) => {
            args.pipeline.apply(&mut config);
            tokio::task::LocalSet::new()
                .run_until(preview::run_preview(&config, &args))
                .await?;
        }
        Commands::Lookup { query, pipeline } => {
            pipeline.apply(&mut config);
            lookup::run_lookup(&config, &query).await?;
        }
        Commands::Slug { name } => println!("{}", plumbsite_core::slugify(&name)),
    }

    Ok(())
}
