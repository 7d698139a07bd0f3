//! lumigrid display — entry point.
//!
//! ```text
//! lumigrid-display                    Run with defaults (0.0.0.0:8888)
//! lumigrid-display --config <path>    Load a custom config TOML
//! lumigrid-display --listen <h:p>     Override the listen address
//! lumigrid-display --gen-config       Write default config to stdout
//! ```

mod config;
mod term;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lumigrid_core::FrameServer;

use crate::config::DisplayConfig;
use crate::term::TerminalDisplay;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "lumigrid-display", about = "lumigrid display node")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "lumigrid-display.toml")]
    config: PathBuf,

    /// Override the listen address (host:port).
    #[arg(short, long)]
    listen: Option<String>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&DisplayConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let config = DisplayConfig::load(&cli.config);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut server_config = config.to_server_config();
    if let Some(listen) = cli.listen {
        server_config.listen_addr = listen;
    }

    info!("lumigrid-display v{}", env!("CARGO_PKG_VERSION"));
    info!("listen: {}", server_config.listen_addr);
    info!("grid: {}x{}", server_config.rows, server_config.cols);

    let driver = TerminalDisplay::new(server_config.rows, server_config.cols)?;

    // Bind failure is fatal: report and exit before any serve loop.
    let server = FrameServer::bind(server_config, driver).await?;
    let stop = server.stop_handle();

    // Ctrl-C handler: the serve loop sees the flag on its next tick
    // and runs its cleanup path (listener closed, panel cleared).
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Ctrl-C received — shutting down");
        stop.store(false, std::sync::atomic::Ordering::SeqCst);
    });

    server.run().await?;
    Ok(())
}
