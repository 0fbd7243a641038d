//! TerraFuse (terrafuse) - Main entry point
//!
//! Fuses a reading snapshot and a vision assessment for one coordinate and
//! prints the consensus as JSON on stdout. Logs go to stderr.
//!
//! Exit status: 0 on success, 2 for an invalid request (bad coordinates or
//! out-of-range input values), 1 for any other failure.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use terrafuse_engine::config::TomlConfig;
use terrafuse_engine::providers::{
    JsonReadingProvider, JsonVisionProvider, TraditionalReadingProvider, UnavailableProvider,
    VisionAssessmentProvider,
};
use terrafuse_engine::AssessmentService;

/// Command-line arguments for terrafuse
#[derive(Parser, Debug)]
#[command(name = "terrafuse")]
#[command(about = "Consensus fusion of traditional and vision environmental assessments")]
#[command(version)]
struct Args {
    /// Latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Reading snapshot (JSON); omitted means the traditional source is unavailable
    #[arg(long, env = "TERRAFUSE_READING")]
    reading: Option<PathBuf>,

    /// Vision assessment (JSON); omitted means the vision source is unavailable
    #[arg(long, env = "TERRAFUSE_VISION")]
    vision: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ranked recommendations to keep
    #[arg(long, env = "TERRAFUSE_TOP_K")]
    top_k: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let mut config =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(top_k) = args.top_k {
        config.fusion.top_k = top_k;
        config
            .fusion
            .validate()
            .context("Invalid --top-k override")?;
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!config.logging.plain),
        )
        .init();

    let traditional: Arc<dyn TraditionalReadingProvider> = match &args.reading {
        Some(path) => Arc::new(JsonReadingProvider::new(path)),
        None => Arc::new(UnavailableProvider::new("no reading snapshot supplied")),
    };
    let vision: Arc<dyn VisionAssessmentProvider> = match &args.vision {
        Some(path) => Arc::new(JsonVisionProvider::new(path)),
        None => Arc::new(UnavailableProvider::new("no vision assessment supplied")),
    };

    info!(
        top_k = config.fusion.top_k,
        traditional_timeout_ms = config.fusion.traditional_timeout_ms,
        vision_timeout_ms = config.fusion.vision_timeout_ms,
        "Configuration resolved"
    );

    let service = AssessmentService::new(traditional, vision, &config.fusion);

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let assessment = match service.assess(args.lat, args.lon, &cancel).await {
        Ok(assessment) => assessment,
        Err(e) if e.is_validation() => {
            error!(error = %e, "Rejected request");
            eprintln!("error: {}", e);
            return Ok(ExitCode::from(2));
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Assessment failed for ({}, {})", args.lat, args.lon))
        }
    };

    let output = if args.pretty {
        serde_json::to_string_pretty(&assessment)
    } else {
        serde_json::to_string(&assessment)
    }
    .context("Failed to serialize assessment")?;
    println!("{}", output);

    Ok(ExitCode::SUCCESS)
}

/// Cancel the in-flight request on Ctrl+C
async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl+C, cancelling assessment");
        cancel.cancel();
    }
}
