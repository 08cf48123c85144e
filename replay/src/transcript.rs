use std::path::Path;

use anyhow::Context;
use customines_core::{CellRows, ChangeBatch, Coord2, Screen, SessionConfig};
use serde::Deserialize;

/// Recorded engine answers plus the intents that produced them.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Transcript {
    pub(crate) config: Option<SessionConfig>,
    pub(crate) boards: Vec<CellRows>,
    pub(crate) batches: Vec<ChangeBatch>,
    pub(crate) intents: Vec<Intent>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Intent {
    Reveal(Coord2),
    Mark(Coord2),
    Navigate(Screen),
}

impl Transcript {
    pub(crate) fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Could not parse transcript")
    }

    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read transcript {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Configuration to play with: an explicit file wins over the one embedded in the transcript.
    pub(crate) fn session_config(&self, config_file: Option<&Path>) -> anyhow::Result<SessionConfig> {
        match config_file {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Could not read config {}", path.display()))?;
                toml::from_str(&text).with_context(|| format!("Invalid config in {}", path.display()))
            }
            None => Ok(self.config.unwrap_or_default()),
        }
    }
}
