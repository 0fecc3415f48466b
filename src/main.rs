use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecr_enhanced_scanning::run_enablement;
use ecr_enhanced_scanning::scanning::LifecycleEvent;
use ecr_enhanced_scanning::settings::Settings;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enable enhanced scanning with the configured scope
    Enable,
    /// Handle a deployment lifecycle event
    HandleEvent {
        /// Path to the event JSON (reads stdin when omitted)
        #[arg(long)]
        event_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = match Settings::new() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let event = match cli.command {
        Commands::Enable => LifecycleEvent::create(),
        Commands::HandleEvent { event_file } => read_event(event_file.as_deref())?,
    };

    let response = match run_enablement(&settings, &event).await {
        Ok(response) => response,
        Err(e) => {
            // Reached when the failure policy is set to propagate
            tracing::error!("Failed to enable enhanced scanning: {}", e);
            std::process::exit(1);
        }
    };
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn read_event(path: Option<&std::path::Path>) -> Result<LifecycleEvent> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read event from stdin")?;
            buffer
        }
    };

    serde_json::from_str(&raw).context("Failed to parse lifecycle event")
}
