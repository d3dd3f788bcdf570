//! pdac-autocomplete - PDOK address autocomplete from the command line
//!
//! Drives the selection controller against the live locatieserver with a
//! console presenter: suggestions are printed as a numbered list and
//! widget events as JSON lines.

use anyhow::Result;
use clap::{Parser, Subcommand};
use pdac_autocomplete::{build_controller, Presenter, SuggestionItem, WidgetSettings};
use pdac_common::config::resolve_toml_config;
use pdac_common::WILDCARD_TOPIC;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "pdac-autocomplete")]
#[command(about = "Dutch address autocomplete using the PDOK locatieserver")]
#[command(version)]
struct Args {
    /// Locatieserver API root
    #[arg(long)]
    api_root: Option<String>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fill missing postal codes from sibling records during verification
    #[arg(long)]
    backfill_postal: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print suggestions for a partial address
    Suggest {
        text: String,
    },
    /// Fetch suggestions, pick one and verify it
    Pick {
        text: String,
        index: usize,
    },
    /// Find the nearest address for a coordinate
    Locate {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },
}

/// Prints presenter calls to the terminal
struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn render(&self, items: &[SuggestionItem]) {
        if items.is_empty() {
            println!("(no suggestions)");
        }
        for (index, item) in items.iter().enumerate() {
            println!(
                "[{}] {:<12} {}",
                index,
                format!("{:?}", item.record_type()).to_lowercase(),
                item.address().formatted()
            );
        }
    }

    fn start_loader(&self) {
        debug!("Loading");
    }

    fn stop_loader(&self) {
        debug!("Loaded");
    }

    fn check(&self) {
        println!("address confirmed");
    }

    fn uncheck(&self) {
        debug!("Address unchecked");
    }

    fn warn(&self, message: &str) {
        println!("warning: {}", message);
    }

    fn set_input(&self, text: &str) {
        println!("input: {:?}", text);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = resolve_toml_config(args.config.as_deref())?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml_config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting pdac-autocomplete {}", env!("CARGO_PKG_VERSION"));

    let mut settings = WidgetSettings::from_toml(&toml_config, args.api_root.as_deref());
    settings.backfill_postal |= args.backfill_postal;
    info!("API root: {}", settings.api_root);

    let controller = build_controller(settings, Arc::new(ConsolePresenter))?;
    controller.on(WILDCARD_TOPIC, |_topic, event| {
        match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!("Failed to serialize event: {}", e),
        }
    });

    match args.command {
        Command::Suggest { text } => {
            controller.on_input(&text).await;
        }
        Command::Pick { text, index } => {
            controller.on_input(&text).await;
            controller.select(index).await;
            controller.on_blur();
        }
        Command::Locate { lat, lon } => {
            controller.locate(lat, lon).await;
        }
    }

    info!("Final state: {:?}", controller.state());
    Ok(())
}
