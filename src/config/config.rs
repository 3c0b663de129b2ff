use std::collections::HashMap;

use config::{Config, ConfigError, File};
use serde::Deserialize;

/// Balance snapshot trigger configuration.
///
/// A snapshot is written when a balance moves to or from zero, moves by at
/// least `change_threshold_bps` of its previous value, or crosses one of the
/// round `boundaries`.
#[derive(Debug, Deserialize, Clone)]
pub struct SnapshotSettings {
    /// Relative change threshold in basis points (10 = 0.10%).
    /// `None` disables the percentage rule.
    #[serde(default = "default_change_threshold_bps")]
    pub change_threshold_bps: Option<u64>,
    /// Round balances in whole tokens, scaled by `10^decimals` per token.
    #[serde(default = "default_boundaries")]
    pub boundaries: Vec<u64>,
    #[serde(default = "default_decimals")]
    pub default_decimals: u8,
    /// Decimals per token address (lowercase).
    #[serde(default)]
    pub token_decimals: HashMap<String, u8>,
}

fn default_change_threshold_bps() -> Option<u64> {
    Some(10)
}

fn default_boundaries() -> Vec<u64> {
    vec![10_000, 100_000, 1_000_000, 10_000_000]
}

fn default_decimals() -> u8 {
    18
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            change_threshold_bps: default_change_threshold_bps(),
            boundaries: default_boundaries(),
            default_decimals: default_decimals(),
            token_decimals: HashMap::new(),
        }
    }
}

impl SnapshotSettings {
    pub fn decimals_for(&self, token: &str) -> u8 {
        self.token_decimals
            .get(token)
            .copied()
            .unwrap_or(self.default_decimals)
    }
}

/// Partition worker configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct WorkerSettings {
    /// Capacity of each chain worker's event queue.
    #[serde(default = "default_channel_size")]
    pub channel_size: usize,
}

fn default_channel_size() -> usize {
    1_024
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            channel_size: default_channel_size(),
        }
    }
}

/// Event feed replayed by the binary.
#[derive(Debug, Deserialize, Clone)]
pub struct FeedSettings {
    /// Newline-delimited JSON file of [`TokenEvent`](crate::worker::TokenEvent)s.
    pub path: String,
}

/// Root application configuration.
///
/// Loaded from `config.yaml` at startup.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub snapshot: SnapshotSettings,
    #[serde(default)]
    pub worker: WorkerSettings,
    #[serde(default)]
    pub feed: Option<FeedSettings>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_file("config")
    }

    /// Load from an explicit path; the extension may be omitted.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(yaml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = parse("feed:\n  path: events.jsonl\n");
        assert_eq!(settings.snapshot.change_threshold_bps, Some(10));
        assert_eq!(settings.snapshot.boundaries, vec![10_000, 100_000, 1_000_000, 10_000_000]);
        assert_eq!(settings.snapshot.default_decimals, 18);
        assert_eq!(settings.worker.channel_size, 1_024);
        assert_eq!(settings.feed.unwrap().path, "events.jsonl");
    }

    #[test]
    fn test_token_decimals_override() {
        let settings = parse(
            "snapshot:\n  change_threshold_bps: 25\n  token_decimals:\n    \"0xusdc\": 6\n",
        );
        assert_eq!(settings.snapshot.change_threshold_bps, Some(25));
        assert_eq!(settings.snapshot.decimals_for("0xusdc"), 6);
        assert_eq!(settings.snapshot.decimals_for("0xweth"), 18);
    }
}
