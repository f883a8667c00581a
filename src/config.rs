//! Configuration management for Herald
//!
//! This module defines the main `Config` struct and its sub-structs. It uses
//! the `figment` crate to layer defaults, a `herald.toml` file, environment
//! variables and command-line overrides.

use crate::cli::Cli;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "herald.toml";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Where destination records are read from.
    pub store: StoreConfig,
    /// Options for the built-in events.
    pub events: EventsConfig,
    /// Optional event packs.
    pub extensions: ExtensionsConfig,
    /// Outbound delivery settings.
    pub notifier: NotifierConfig,
}

/// Configuration for the destination store.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StoreConfig {
    /// Path to the YAML file holding the destination records.
    pub path: PathBuf,
}

/// Options for the built-in events.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct EventsConfig {
    /// Post types whose status transitions are notified.
    pub post_types: Vec<String>,
    /// Post types whose new comments are notified.
    pub comment_post_types: Vec<String>,
    /// Base URL of the site's admin area, used for edit links.
    pub admin_url: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            post_types: vec!["post".to_string()],
            comment_post_types: vec!["post".to_string()],
            admin_url: "http://localhost/wp-admin/".to_string(),
        }
    }
}

/// Toggles for the optional event packs.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ExtensionsConfig {
    /// Registers the `award_achievement` event.
    pub achievements: bool,
}

/// Which notifier delivers payloads.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    /// POST each payload to a Slack incoming webhook.
    Slack,
    /// Log each payload instead of sending it.
    Log,
}

impl fmt::Display for NotifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifierKind::Slack => write!(f, "slack"),
            NotifierKind::Log => write!(f, "log"),
        }
    }
}

/// Configuration for outbound delivery.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NotifierConfig {
    pub kind: NotifierKind,
    /// HTTP timeout for a single webhook request.
    pub timeout_ms: u64,
    /// Webhook used when a destination does not carry its own `service_url`.
    pub default_webhook_url: Option<String>,
}

impl Config {
    /// Loads the configuration by layering defaults, the TOML file,
    /// `HERALD_` environment variables and the command-line arguments.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let config = Self::figment(&config_path).merge(cli.clone()).extract()?;
        Ok(config)
    }

    /// Loads the configuration from a file and the environment only.
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        let config = Self::figment(config_path).extract()?;
        Ok(config)
    }

    fn figment(config_path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            // e.g. HERALD_NOTIFIER__TIMEOUT_MS=2000
            .merge(Env::prefixed("HERALD_").split("__"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            store: StoreConfig {
                path: PathBuf::from("destinations.yml"),
            },
            events: EventsConfig::default(),
            extensions: ExtensionsConfig::default(),
            notifier: NotifierConfig {
                kind: NotifierKind::Slack,
                timeout_ms: 10_000,
                default_webhook_url: None,
            },
        }
    }
}
