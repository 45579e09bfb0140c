use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thumbcache_core::{
    Background, ColorMode, CropMode, SizeSpec, ThumbnailConfig, ThumbnailOptions, ThumbnailRef,
    ThumbnailService, DEFAULT_QUALITY,
};
use thumbcache_storage::StorageRegistry;
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "thumbcache")]
#[command(about = "Generate and cache thumbnails keyed by their parameters")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the reference of a thumbnail, generating it on first request
    Thumbnail {
        /// Original image, relative to the media root
        original: String,

        /// Target size: N or WxH
        #[arg(short, long)]
        size: SizeSpec,

        /// "fit" to crop to the exact size, anything else to fit inside it
        #[arg(long, default_value = "fit")]
        crop: CropMode,

        /// Pad to a square; optional color as #rrggbb
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        background: Option<String>,

        /// Encoder quality (1-100)
        #[arg(short, long, default_value_t = DEFAULT_QUALITY)]
        quality: u8,

        /// Output format (png, jpg, webp, ...)
        #[arg(short, long)]
        format: Option<String>,

        /// Color mode: rgb, rgba, gray or grayalpha
        #[arg(long, default_value = "rgb")]
        color_mode: ColorMode,
    },
    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.debug);

    // Load configuration
    let config = load_config(cli.config.as_deref()).map_err(ThumbcacheError::Config)?;

    // Execute command
    match cli.command {
        Commands::Thumbnail {
            original,
            size,
            crop,
            background,
            quality,
            format,
            color_mode,
        } => {
            let background = match background {
                Some(value) => Background::parse(&value)?,
                None => None,
            };
            let options = ThumbnailOptions {
                crop,
                background,
                quality,
                format,
                color_mode,
            };
            thumbnail_command(config, original, size, options).await?;
        }
        Commands::Config => {
            config_command(&config)?;
        }
    }

    Ok(())
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Logs go to stderr so stdout carries only the reference.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(config_path: Option<&std::path::Path>) -> Result<ThumbnailConfig, ConfigError> {
    use figment::{
        providers::{Env, Format, Serialized, Toml},
        Figment,
    };

    let mut figment = Figment::from(Serialized::defaults(ThumbnailConfig::default()));

    // Load from config file if provided
    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    } else {
        // Try default config locations
        figment = figment
            .merge(Toml::file("thumbcache.toml"))
            .merge(Toml::file("config/thumbcache.toml"));
    }

    // Override with environment variables
    figment = figment.merge(Env::prefixed("THUMBCACHE_").split("__"));

    figment.extract().map_err(ConfigError::Figment)
}

async fn thumbnail_command(
    config: ThumbnailConfig,
    original: String,
    size: SizeSpec,
    options: ThumbnailOptions,
) -> Result<(), ThumbcacheError> {
    let registry = StorageRegistry::with_defaults();
    let service = ThumbnailService::from_config(&config, &registry)?;

    debug!(
        "Requesting thumbnail of {} at {} with {:?}",
        original, size, options
    );

    let reference = service.get_thumbnail(&original, &size, &options).await?;

    if let ThumbnailRef::Fallback {
        original_path,
        original_url,
    } = &reference
    {
        warn!(
            "Returning original {} ({}) because it could not be decoded",
            original_path, original_url
        );
    }

    println!("{}", reference);

    Ok(())
}

fn config_command(config: &ThumbnailConfig) -> Result<(), ThumbcacheError> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

// Error types
#[derive(Debug, thiserror::Error)]
pub enum ThumbcacheError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Thumbnail error: {0}")]
    Thumbnail(#[from] thumbcache_core::ThumbnailError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Figment error: {0}")]
    Figment(#[from] figment::Error),
}
