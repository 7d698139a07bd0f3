//! lumigrid sender — entry point.
//!
//! ```text
//! lumigrid-sender                     Run with defaults
//! lumigrid-sender --config <path>     Load a custom config TOML
//! lumigrid-sender --target <h:p>      Override the display address
//! lumigrid-sender --gen-config        Write default config to stdout
//! ```
//!
//! Capture → encode → send, one frame per tick, forever. A failed
//! send drops that frame silently; the next capture supersedes it.

mod config;
mod source;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use lumigrid_core::{FrameEncoder, FrameSender};

use crate::config::SenderConfig;
use crate::source::{DepthSource, SyntheticSource};

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "lumigrid-sender", about = "lumigrid depth-frame sender")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "lumigrid-sender.toml")]
    config: PathBuf,

    /// Override the display address (host:port).
    #[arg(short, long)]
    target: Option<String>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&SenderConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let config = SenderConfig::load(&cli.config);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let target = cli.target.unwrap_or_else(|| config.target_addr());
    info!("lumigrid-sender v{}", env!("CARGO_PKG_VERSION"));
    info!("target: {target}");
    info!(
        "grid: {}x{}, keep_fraction: {}, on_threshold: {}",
        config.encoder.target_rows,
        config.encoder.target_cols,
        config.encoder.keep_fraction,
        config.encoder.on_threshold,
    );

    let encoder = FrameEncoder::new(
        config.encoder.keep_fraction,
        config.encoder.on_threshold,
        config.encoder.target_rows,
        config.encoder.target_cols,
    );
    let sender = FrameSender::new(target)
        .with_io_timeout(Duration::from_millis(config.target.io_timeout_ms));
    let mut source = SyntheticSource::new(config.capture.source_rows, config.capture.source_cols);

    // Ctrl-C handler.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Ctrl-C received — shutting down");
        running_clone.store(false, Ordering::SeqCst);
    });

    let frame_interval = Duration::from_secs_f64(1.0 / config.capture.fps.max(1) as f64);
    let mut ticker = tokio::time::interval(frame_interval);
    let mut sent: u64 = 0;
    let mut dropped: u64 = 0;

    while running.load(Ordering::SeqCst) {
        ticker.tick().await;

        let depth = match source.capture() {
            Ok(d) => d,
            Err(e) => {
                error!("capture failed: {e}");
                break;
            }
        };

        let frame = encoder.encode(&depth);
        if sender.send(&frame).await {
            sent += 1;
            debug!("frame {} sent ({} cells lit)", sent, frame.count_on());
        } else {
            dropped += 1;
        }
    }

    info!("sender stopped: {sent} frames sent, {dropped} dropped");
    Ok(())
}
