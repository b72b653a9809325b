//! Runtime configuration structures and loaders.
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use monster_core::{GameConfig, Position};

/// Configuration shared by the session and the binary that drives it.
///
/// Game rules come from `config.toml` in the content directory; everything
/// here is about how the session is hosted.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    /// Directory holding `config.toml`, `catalog/`, `locale/` and `maps/`.
    pub content_dir: PathBuf,
    pub start_map: String,
    pub start_tile: Position,
    pub locale: String,
    pub player_name: String,
    /// Species and level of the monster the player starts with.
    pub starter: String,
    pub starter_level: u32,
    /// Fixed seed for reproducible runs. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Evaluate every event condition and keep a trace.
    pub debug_conditions: bool,
    /// Upper bound on ticks for headless runs.
    pub max_ticks: u64,
}

impl RuntimeConfig {
    pub const DEFAULT_TICK_RATE: u32 = 30;
    pub const DEFAULT_MAX_TICKS: u64 = 20_000;

    /// Construct configuration from process environment variables.
    ///
    /// - `MONSTER_CONTENT_DIR`
    /// - `MONSTER_START_MAP` / `MONSTER_LOCALE`
    /// - `MONSTER_PLAYER_NAME` / `MONSTER_STARTER` / `MONSTER_STARTER_LEVEL`
    /// - `MONSTER_SEED`
    /// - `MONSTER_TICK_RATE` / `MONSTER_MAX_TICKS`
    /// - `MONSTER_DEBUG_CONDITIONS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`RuntimeConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("MONSTER_CONTENT_DIR") {
            config.content_dir = PathBuf::from(dir);
        }
        if let Some(map) = lookup("MONSTER_START_MAP") {
            config.start_map = map;
        }
        if let Some(locale) = lookup("MONSTER_LOCALE") {
            config.locale = locale;
        }
        if let Some(name) = lookup("MONSTER_PLAYER_NAME") {
            config.player_name = name;
        }
        if let Some(starter) = lookup("MONSTER_STARTER") {
            config.starter = starter;
        }
        if let Some(level) = read_env::<u32>(&lookup, "MONSTER_STARTER_LEVEL") {
            config.starter_level = level.clamp(1, GameConfig::MAX_LEVEL);
        }
        config.seed = read_env::<u64>(&lookup, "MONSTER_SEED");

        if let Some(rate) = read_env::<u32>(&lookup, "MONSTER_TICK_RATE") {
            config.tick_rate = rate.max(1);
        }
        if let Some(ticks) = read_env::<u64>(&lookup, "MONSTER_MAX_TICKS") {
            config.max_ticks = ticks;
        }
        if let Some(debug) = read_env_bool(&lookup, "MONSTER_DEBUG_CONDITIONS") {
            config.debug_conditions = debug;
        }

        config
    }

    /// Seconds simulated by one tick.
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            content_dir: PathBuf::from("content"),
            start_map: "route_1".to_owned(),
            start_tile: Position::new(2, 8),
            locale: "en_US".to_owned(),
            player_name: "Red".to_owned(),
            starter: "rockitten".to_owned(),
            starter_level: 8,
            seed: None,
            tick_rate: Self::DEFAULT_TICK_RATE,
            debug_conditions: false,
            max_ticks: Self::DEFAULT_MAX_TICKS,
        }
    }
}

fn read_env<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
{
    lookup(key)?.parse().ok()
}

fn read_env_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    let value = lookup(key)?;
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_keeps_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[]));
        assert_eq!(config.tick_rate, RuntimeConfig::DEFAULT_TICK_RATE);
        assert_eq!(config.seed, None);
        assert!(!config.debug_conditions);
        assert_eq!(config.content_dir, PathBuf::from("content"));
    }

    #[test]
    fn variables_override_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("MONSTER_CONTENT_DIR", "/srv/content"),
            ("MONSTER_SEED", "42"),
            ("MONSTER_TICK_RATE", "0"),
            ("MONSTER_DEBUG_CONDITIONS", "Yes"),
            ("MONSTER_START_MAP", "town"),
            ("MONSTER_STARTER_LEVEL", "5000"),
        ]));
        assert_eq!(config.content_dir, PathBuf::from("/srv/content"));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.tick_rate, 1);
        assert!(config.debug_conditions);
        assert_eq!(config.start_map, "town");
        assert_eq!(config.starter_level, GameConfig::MAX_LEVEL);
    }

    #[test]
    fn unparsable_values_are_ignored() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("MONSTER_SEED", "soon"),
            ("MONSTER_DEBUG_CONDITIONS", "maybe"),
        ]));
        assert_eq!(config.seed, None);
        assert!(!config.debug_conditions);
    }
}
