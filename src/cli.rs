//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using the
//! `clap` crate. The global flags are merged over the `herald.toml` file and
//! environment variables by acting as a `figment` provider.

use clap::{Parser, Subcommand};
use figment::{
    value::{Dict, Map, Tag, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Dispatches host events to chat notification destinations.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the YAML file holding the destination records.
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log payloads instead of sending them.
    #[arg(long)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List every dispatchable event.
    Events,
    /// List the active destinations and the events they listen to.
    Destinations,
    /// Fire a single trigger.
    Fire {
        /// The trigger name, e.g. `transition_post_status`.
        trigger: String,
        /// The positional arguments as a JSON array.
        #[arg(default_value = "[]")]
        args: String,
    },
    /// Fire every trigger read from a JSON-lines file, or stdin when omitted.
    Replay {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        if let Some(path) = &self.store {
            insert_nested(
                &mut dict,
                "store",
                "path",
                Value::from(path.display().to_string()),
            );
        }

        // Only an explicit flag overrides; absence leaves the configured notifier alone.
        if self.dry_run {
            insert_nested(&mut dict, "notifier", "kind", Value::from("log"));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}

fn insert_nested(dict: &mut Dict, section: &str, key: &str, value: Value) {
    let entry = dict
        .entry(section.to_string())
        .or_insert_with(|| Value::Dict(Tag::Default, Dict::new()));
    if let Value::Dict(_, inner) = entry {
        inner.insert(key.to_string(), value);
    }
}
