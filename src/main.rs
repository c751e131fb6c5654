use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod engine;
mod engines;
mod error;
mod preprocessing;
mod server;

use preprocessing::Preset;

#[derive(Parser, Debug)]
#[command(name = "mathsnap")]
#[command(about = "Convert photos of handwritten or printed equations to LaTeX")]
#[command(version)]
pub struct Args {
    /// Recognition engine to use ("pix2tex" or "fixed")
    #[arg(long, env = "MATHSNAP_ENGINE", default_value = "pix2tex")]
    pub engine: String,

    /// URL of the pix2tex inference endpoint
    #[arg(
        long,
        env = "MATHSNAP_MODEL_URL",
        default_value = "http://127.0.0.1:8502/predict"
    )]
    pub model_url: String,

    /// Preprocessing preset (none, gentle, aggressive)
    #[arg(long, env = "MATHSNAP_PRESET", default_value = "gentle")]
    pub preset: String,

    /// Override the preset's resize target width in pixels
    #[arg(long, env = "MATHSNAP_TARGET_WIDTH")]
    pub target_width: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server with the browser client
    Serve {
        /// Host address to bind to
        #[arg(long, env = "MATHSNAP_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, env = "MATHSNAP_PORT", default_value = "5001")]
        port: u16,

        /// Maximum upload size in bytes (default: 16MB)
        #[arg(long, env = "MATHSNAP_MAX_UPLOAD", default_value = "16777216")]
        max_upload: usize,
    },
    /// Recognize a single image file and write the LaTeX result
    Recognize {
        /// Path to the equation image
        image: PathBuf,

        /// File to write the LaTeX result to
        #[arg(long, short, default_value = "output.tex")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let preset = Preset::from_str(&args.preset)
        .ok_or_else(|| anyhow::anyhow!("Unknown preset: {}", args.preset))?;

    match args.command {
        Command::Serve {
            ref host,
            port,
            max_upload,
        } => {
            let config = config::Config {
                host: host.clone(),
                port,
                max_upload,
                engine: args.engine.clone(),
                model_url: args.model_url.clone(),
                preset,
                target_width: args.target_width,
            };

            tracing::info!("Starting mathsnap v{}", env!("CARGO_PKG_VERSION"));
            tracing::info!("Binding to {}:{}", config.host, config.port);

            server::run(config).await
        }
        Command::Recognize {
            ref image,
            ref output,
        } => {
            let config = config::Config {
                host: String::new(),
                port: 0,
                max_upload: 0,
                engine: args.engine.clone(),
                model_url: args.model_url.clone(),
                preset,
                target_width: args.target_width,
            };

            cli::run(&config, image, output)
        }
    }
}
