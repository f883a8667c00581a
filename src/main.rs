//! Herald - event-to-notification dispatcher
//!
//! Boots the dispatch engine from configuration and fires host triggers
//! given on the command line or replayed from a JSON-lines stream.

use anyhow::{Context, Result};
use clap::Parser;
use herald::{
    app::App,
    cli::{Cli, Command},
    config::Config,
    core::{Outcome, TriggerArgs},
};
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// One line of a replay stream.
#[derive(Debug, Deserialize)]
struct ReplayEvent {
    trigger: String,
    #[serde(default)]
    args: Vec<Value>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load(&cli).unwrap_or_else(|err| {
        init_tracing("info");
        error!("Failed to load configuration: {}", err);
        std::process::exit(1);
    });

    init_tracing(&config.log_level);

    info!("Herald starting up...");
    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!("Destination Store: {}", config.store.path.display());
    info!("Notified Post Types: {}", config.events.post_types.join(", "));
    info!("Admin URL: {}", config.events.admin_url);
    info!(
        "Achievements Extension: {}",
        if config.extensions.achievements {
            "Enabled"
        } else {
            "Disabled"
        }
    );
    info!("Notifier: {}", config.notifier.kind);
    info!("-------------------------------------------------------");

    let app = App::builder(config).build()?;

    match cli.command {
        Command::Events => print_events(&app),
        Command::Destinations => print_destinations(&app),
        Command::Fire { trigger, args } => {
            let args: Vec<Value> =
                serde_json::from_str(&args).context("Trigger arguments must be a JSON array")?;
            let outcomes = app.fire(&trigger, TriggerArgs::new(args))?;
            print_outcomes(&trigger, &outcomes);
        }
        Command::Replay { file } => replay(&app, file.as_deref())?,
    }

    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A second call (after a configuration error) is a no-op.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn print_events(app: &App) {
    for (id, event) in app.registry().list_events() {
        println!(
            "{:<24} {:<28} priority={:<4} default={:<5} {}",
            id, event.trigger, event.priority, event.default_enabled, event.description
        );
    }
}

fn print_destinations(app: &App) {
    for destination in app.destinations() {
        let events: Vec<&str> = destination.enabled_event_ids().collect();
        println!("{:<24} {}", destination.name, events.join(", "));
    }
}

fn print_outcomes(trigger: &str, outcomes: &[Outcome]) {
    if outcomes.is_empty() {
        println!("{}: no handlers", trigger);
    }
    for outcome in outcomes {
        match outcome {
            Outcome::Delivered(payload) => println!(
                "{}: delivered to {}: {}",
                trigger,
                payload.field_str("channel").unwrap_or("(default channel)"),
                payload.text
            ),
            Outcome::Suppressed => println!("{}: suppressed", trigger),
        }
    }
}

fn replay(app: &App, file: Option<&Path>) -> Result<()> {
    let reader: Box<dyn BufRead> = match file {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let (mut delivered, mut suppressed) = (0usize, 0usize);
    for (number, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read replay input")?;
        if line.trim().is_empty() {
            continue;
        }

        let event: ReplayEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line = number + 1, error = %e, "Skipping malformed replay line");
                continue;
            }
        };

        let outcomes = app.fire(&event.trigger, TriggerArgs::new(event.args))?;
        print_outcomes(&event.trigger, &outcomes);
        for outcome in &outcomes {
            match outcome {
                Outcome::Delivered(_) => delivered += 1,
                Outcome::Suppressed => suppressed += 1,
            }
        }
    }

    info!(delivered, suppressed, "Replay finished");
    Ok(())
}
