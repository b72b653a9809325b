//! Content factory for loading everything from a data directory.

use std::path::{Path, PathBuf};

use monster_core::{ContentCatalog, GameConfig, Localizer};

use crate::loaders::{CatalogLoader, ConfigLoader, LoadResult, LocaleLoader, MapData, MapLoader};

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── catalog/
/// │   ├── monsters.ron
/// │   └── items.ron
/// ├── locale/
/// │   └── en_US.ron
/// └── maps/
///     └── route_1.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load game configuration from `config.toml`, or defaults when absent.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(GameConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load every `.ron` file under `catalog/` in file name order.
    pub fn load_catalog(&self) -> LoadResult<ContentCatalog> {
        let dir = self.data_dir.join("catalog");
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
            .collect();
        files.sort();

        let mut catalog = ContentCatalog::new();
        for path in &files {
            CatalogLoader::load_into(&mut catalog, path)?;
        }
        tracing::info!(
            files = files.len(),
            monsters = catalog.monster_count(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Load `locale/{locale}.ron`. A missing file yields an empty localizer.
    pub fn load_locale(&self, locale: &str) -> LoadResult<Localizer> {
        let path = self.data_dir.join("locale").join(format!("{}.ron", locale));
        if !path.exists() {
            tracing::warn!(locale, "locale file missing, messages show their keys");
            return Ok(Localizer::new(locale));
        }
        LocaleLoader::load(&path, locale)
    }

    /// Load a map from `maps/{map_name}.ron`.
    pub fn load_map(&self, map_name: &str) -> LoadResult<MapData> {
        let path = self.data_dir.join("maps").join(format!("{}.ron", map_name));
        MapLoader::load(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
