//! Runtime configuration read from the process environment.
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::errors::validation::MAX_DIFFICULTY;

#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Root holding `saves/` and `worlds/`.
    pub data_dir: PathBuf,
    pub difficulty: u8,
    /// How long the console renderer "animates" an event before acknowledging it.
    pub event_pace_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            difficulty: 0,
            event_pace_ms: 300,
        }
    }
}

impl GameConfig {
    /// Environment variables:
    /// - `CARD_DUNGEON_DATA_DIR` - save root (default: current directory)
    /// - `CARD_DUNGEON_DIFFICULTY` - 0 to 10 (default: 0)
    /// - `CARD_DUNGEON_EVENT_PACE_MS` - renderer delay per event (default: 300)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("CARD_DUNGEON_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(difficulty) = read_env::<u8>("CARD_DUNGEON_DIFFICULTY") {
            config.difficulty = difficulty.min(MAX_DIFFICULTY);
        }
        if let Some(pace) = read_env::<u64>("CARD_DUNGEON_EVENT_PACE_MS") {
            config.event_pace_ms = pace;
        }

        config
    }
}

/// Log filter from `RUST_LOG`-style directives, `info` when absent or unparseable.
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
