use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tipjar_core::image::ImageKind;
use tipjar_infrastructure::{ConfigService, SecretServiceImpl, TipjarPaths};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "tipjar")]
#[command(about = "tipjar - creator tipping client tools", long_about = None)]
struct Cli {
    /// Directory holding config.toml and secret.json
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Normalize a handle the way the claim form does
    Handle { input: String },
    /// Fetch the current exchange rate
    Price,
    /// Resize an image to avatar or banner bounds
    Resize {
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = KindArg::Avatar)]
        kind: KindArg,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Resize an image and pin it to the content store
    Upload {
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = KindArg::Avatar)]
        kind: KindArg,
    },
    /// Claim a handle, tip it and withdraw, all against an in-memory ledger
    Demo {
        #[arg(long, default_value = "alice")]
        handle: String,
        #[arg(long, default_value_t = 3)]
        tips: usize,
        /// Convert tips at the live rate instead of the fallback
        #[arg(long)]
        live_price: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Write the default configuration
    Init {
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Avatar,
    Banner,
}

impl From<KindArg> for ImageKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Avatar => ImageKind::Avatar,
            KindArg::Banner => ImageKind::Banner,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = TipjarPaths::new(cli.config_dir.as_deref());
    let config_service = ConfigService::with_path(paths.config_file()?);
    let config = config_service.get_config();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config_service)?,
            ConfigAction::Path => commands::config::path(&config_service),
            ConfigAction::Init { force } => commands::config::init(&config_service, force)?,
        },
        Commands::Handle { input } => commands::handle::normalize(&input),
        Commands::Price => commands::price::fetch(&config.price_feed).await?,
        Commands::Resize {
            input,
            kind,
            output,
        } => commands::image::resize(&config.images, &input, kind.into(), &output)?,
        Commands::Upload { input, kind } => {
            let secrets = SecretServiceImpl::with_path(paths.secret_file()?);
            commands::image::upload(&config, &secrets, &input, kind.into()).await?
        }
        Commands::Demo {
            handle,
            tips,
            live_price,
        } => commands::demo::run(&config, &handle, tips, live_price).await?,
    }

    Ok(())
}
