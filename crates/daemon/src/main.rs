//! cirelay daemon entry point.
//!
//! Loads configuration, initializes logging and the Telegram notifier,
//! serves the webhook endpoint, and shuts down on SIGINT/SIGTERM.

mod signals;

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cirelay_core::config::AppConfig;
use cirelay_core::dispatch::WebhookDispatcher;
use cirelay_web::WebServer;

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

/// Relays GitHub Actions failures to a Telegram chat.
#[derive(Parser, Debug)]
#[command(
    name = "cirelay",
    version,
    about = "GitHub Actions failure alerts for Telegram"
)]
struct Args {
    /// Optional TOML configuration file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Configuration decides the final log level, so loading runs under a
    // temporary info-level subscriber.
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("info"))
        .with_target(true)
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || {
        load_config(&args, |name| std::env::var(name).ok())
    })?;

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.server.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .init();

    let dispatcher =
        WebhookDispatcher::from_config(&config).context("failed to initialize webhook relay")?;

    let port = config.server.port;
    let target = config
        .github
        .target_repository()
        .unwrap_or("All repositories")
        .to_string();
    let signatures = if config.github.webhook_secret().is_some() {
        "enabled"
    } else {
        "DISABLED"
    };

    // Startup banner
    info!("========================================");
    info!("  cirelay v{}", env!("CARGO_PKG_VERSION"));
    info!("========================================");
    info!("Webhook endpoint : http://localhost:{}/webhook", port);
    info!("Health endpoint  : http://localhost:{}/health", port);
    info!("Target repo      : {}", target);
    info!("Signatures       : {}", signatures);
    info!("Telegram chat    : {}", config.telegram.chat_id);
    info!("========================================");

    let server = WebServer::new(config, dispatcher);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    server
        .start(addr, signals::wait_for_shutdown())
        .await
        .context("web server error")?;

    info!("cirelay stopped.");
    Ok(())
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Optional config file, then environment, then command-line overrides.
fn load_config<F>(args: &Args, lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match args.config {
        Some(ref path) => {
            AppConfig::load_from_file(path).context("failed to load configuration file")?
        }
        None => AppConfig::default(),
    };
    config
        .apply_env(lookup)
        .context("failed to read configuration from environment")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref level) = args.log_level {
        config.server.log_level = level.clone();
    }
    Ok(config)
}
