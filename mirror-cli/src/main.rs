mod terminal_status;
mod track_stats;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mirror_viewer::{LaunchContext, SessionController, StatusSink};

use crate::terminal_status::TerminalStatus;
use crate::track_stats::TrackStats;

#[derive(Parser)]
#[command(name = "mirror-view")]
#[command(about = "Watch a shared screen from the terminal")]
struct Cli {
    /// Viewer link, e.g. `https://mirror.example/view?room=ABC123`.
    #[arg(conflicts_with_all = ["room", "host"])]
    link: Option<String>,

    #[arg(short, long)]
    room: Option<String>,

    /// Host the viewer pretends to be served from; picks the relay.
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Overrides the relay chosen from the host.
    #[arg(long)]
    relay: Option<String>,

    #[arg(long, default_value_t = 3000)]
    reconnect_delay_ms: u64,
}

impl Cli {
    fn launch_context(&self) -> Result<LaunchContext> {
        match &self.link {
            Some(link) => LaunchContext::from_url(link).context("Invalid viewer link"),
            None => Ok(LaunchContext::new(&self.host, self.room.clone())),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let launch = cli.launch_context()?;

    let status: Arc<dyn StatusSink> = Arc::new(TerminalStatus::new());
    let render = Arc::new(TrackStats::new());

    let Ok(mut config) = SessionController::configure(&launch, &status) else {
        std::process::exit(2);
    };
    if let Some(relay) = cli.relay {
        config = config.with_relay_url(relay);
    }
    config = config.with_reconnect_delay(Duration::from_millis(cli.reconnect_delay_ms));

    println!(
        "{} room {} via {}",
        "Viewing".green().bold(),
        config.room_id.as_str().bold(),
        config.relay_url.dimmed()
    );

    let session = SessionController::start(config, status, render.clone());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Ctrl-C received");

    session.shutdown().await;
    println!("{} {}", "Stopped.".yellow(), render.summary());
    Ok(())
}
