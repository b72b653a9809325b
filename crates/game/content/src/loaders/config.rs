//! Game configuration loader.

use std::path::Path;

use monster_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for game configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys keep their [`GameConfig::default`] values.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file containing GameConfig
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "walk_rate = 4.5\nexperience_method = \"xp_transmitter\"\n\n[combat]\naction = 1.5"
        )
        .unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        let defaults = GameConfig::default();
        assert_eq!(config.walk_rate, 4.5);
        assert_eq!(config.experience_method, "xp_transmitter");
        assert_eq!(config.combat.action, 1.5);
        assert_eq!(config.combat.intro, defaults.combat.intro);
        assert_eq!(config.party_limit, defaults.party_limit);
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(ConfigLoader::parse("walk_rate = \"fast\"").is_err());
    }
}
