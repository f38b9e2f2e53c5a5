use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "memoria.json";

/// Pacing of playback and round transitions, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay between the starts of consecutive notes during playback.
    pub note_interval_ms: u64,
    /// Pause after a completed round before achievements are checked.
    pub achievement_delay_ms: u64,
    /// Pause after a completed round before the next round is played.
    pub next_round_delay_ms: u64,
    /// Pause after a wrong note before the retry or game over.
    pub failure_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            note_interval_ms: 400,
            achievement_delay_ms: 500,
            next_round_delay_ms: 1500,
            failure_delay_ms: 1000,
        }
    }
}

impl TimingConfig {
    pub fn note_interval_us(&self) -> i64 {
        ms_to_us(self.note_interval_ms)
    }

    pub fn achievement_delay_us(&self) -> i64 {
        ms_to_us(self.achievement_delay_ms)
    }

    pub fn next_round_delay_us(&self) -> i64 {
        ms_to_us(self.next_round_delay_ms)
    }

    pub fn failure_delay_us(&self) -> i64 {
        ms_to_us(self.failure_delay_ms)
    }
}

fn ms_to_us(ms: u64) -> i64 {
    i64::try_from(ms.saturating_mul(1000)).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub starting_lives: u32,
    pub timing: TimingConfig,
    /// Where the JSON progress record is kept.
    pub save_path: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            timing: TimingConfig::default(),
            save_path: "memoria_save.json".to_string(),
        }
    }
}

impl GameConfig {
    /// Clamp values that would break the round pacing.
    pub fn validate(&mut self) {
        self.starting_lives = self.starting_lives.clamp(1, 99);
        self.timing.note_interval_ms = self.timing.note_interval_ms.clamp(1, 10_000);
        self.timing.achievement_delay_ms = self.timing.achievement_delay_ms.min(60_000);
        self.timing.failure_delay_ms = self.timing.failure_delay_ms.min(60_000);
        // The next round replaces the target, so it must not fire before
        // achievements have been evaluated against the finished one.
        self.timing.next_round_delay_ms = self
            .timing
            .next_round_delay_ms
            .clamp(self.timing.achievement_delay_ms, 60_000);
        if self.save_path.is_empty() {
            self.save_path = "memoria_save.json".to_string();
        }
    }

    /// Read config from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config: GameConfig = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate();
        Ok(config)
    }

    /// Reads `path`, or returns defaults when the file does not exist.
    pub fn read_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::read(path)
    }

    /// Write config to a JSON file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }
}
