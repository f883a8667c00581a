//! Sources of destination records.

use crate::settings::DestinationRecord;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Provides the destination records at boot. Queried once.
pub trait DestinationStore {
    fn load(&self) -> Result<Vec<DestinationRecord>>;
}

impl DestinationStore for Vec<DestinationRecord> {
    fn load(&self) -> Result<Vec<DestinationRecord>> {
        Ok(self.clone())
    }
}

/// Reads destination records from a YAML file holding a list of mappings.
///
/// ```yaml
/// - name: newsroom
///   active: true
///   service_url: https://hooks.slack.com/services/T000/B000/XXXX
///   channel: "#news"
///   events:
///     post_published: true
/// ```
#[derive(Debug, Clone)]
pub struct YamlFileStore {
    path: PathBuf,
}

impl YamlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DestinationStore for YamlFileStore {
    fn load(&self) -> Result<Vec<DestinationRecord>> {
        let file_content = fs::read_to_string(&self.path).with_context(|| {
            format!("Failed to read destination file: {}", self.path.display())
        })?;

        if file_content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let entries: Vec<serde_yml::Value> = serde_yml::from_str(&file_content)
            .with_context(|| {
                format!(
                    "Failed to parse YAML from destination file: {}",
                    self.path.display()
                )
            })?;

        // A malformed entry only loses that destination.
        let records: Vec<DestinationRecord> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                match serde_yml::from_value::<DestinationRecord>(entry) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(
                            path = %self.path.display(),
                            index,
                            error = %e,
                            "Skipping malformed destination record"
                        );
                        None
                    }
                }
            })
            .collect();

        debug!(path = %self.path.display(), count = records.len(), "Loaded destination records");
        Ok(records)
    }
}
