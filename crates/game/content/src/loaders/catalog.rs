//! Content catalog loader.

use std::path::Path;

use monster_core::env::{Environment, MonsterTemplate};
use monster_core::{ContentCatalog, ItemDef, Status, Technique};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Catalog tables for RON files. Every table is optional so content can be
/// split across several files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogData {
    pub monsters: Vec<MonsterTemplate>,
    pub techniques: Vec<Technique>,
    pub items: Vec<ItemDef>,
    pub statuses: Vec<Status>,
    pub environments: Vec<Environment>,
}

/// Loader for content catalogs from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load a catalog from a single RON file.
    pub fn load(path: &Path) -> LoadResult<ContentCatalog> {
        let mut catalog = ContentCatalog::new();
        Self::load_into(&mut catalog, path)?;
        Ok(catalog)
    }

    /// Adds the tables of `path` to `catalog`. Later entries replace earlier
    /// ones with the same slug.
    pub fn load_into(catalog: &mut ContentCatalog, path: &Path) -> LoadResult<()> {
        let content = read_file(path)?;
        let data = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse catalog {}: {}", path.display(), e))?;
        tracing::debug!(
            path = %path.display(),
            monsters = data.monsters.len(),
            techniques = data.techniques.len(),
            items = data.items.len(),
            "catalog file loaded"
        );
        Self::merge(catalog, data);
        Ok(())
    }

    pub fn parse(content: &str) -> LoadResult<CatalogData> {
        let data: CatalogData = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse catalog RON: {}", e))?;
        Ok(data)
    }

    pub fn merge(catalog: &mut ContentCatalog, data: CatalogData) {
        data.monsters
            .into_iter()
            .for_each(|monster| catalog.insert_monster(monster));
        data.techniques
            .into_iter()
            .for_each(|technique| catalog.insert_technique(technique));
        data.items.into_iter().for_each(|item| catalog.insert_item(item));
        data.statuses
            .into_iter()
            .for_each(|status| catalog.insert_status(status));
        data.environments
            .into_iter()
            .for_each(|environment| catalog.insert_environment(environment));
    }
}

#[cfg(test)]
mod tests {
    use monster_core::MonsterId;
    use monster_core::monster::{ItemEffect, MethodSort};

    use super::*;

    const CATALOG: &str = r#"(
        techniques: [
            (slug: "ram", power: 1.2, effects: [damage]),
        ],
        monsters: [
            (
                slug: "rockitten",
                types: [earth],
                base_stats: (hp: 8, attack: 6, defense: 7, speed: 5),
                catch_rate: 90,
                moveset: [(level_learned: 1, technique: "ram")],
            ),
        ],
        items: [
            (slug: "tuxeball", effects: [capture(power: 1.0)], target: "ENEMY_MONSTER"),
        ],
    )"#;

    #[test]
    fn tables_feed_the_catalog() {
        let mut catalog = ContentCatalog::new();
        CatalogLoader::merge(&mut catalog, CatalogLoader::parse(CATALOG).unwrap());

        let monster = catalog
            .create_monster("rockitten", 5, MonsterId(1))
            .unwrap();
        assert_eq!(monster.catch_rate, 90);
        assert!(monster.knows("ram"));

        let ball = catalog.item("tuxeball").unwrap();
        assert_eq!(ball.sort, MethodSort::Item);
        assert_eq!(ball.effects, vec![ItemEffect::Capture { power: 1.0 }]);
    }

    #[test]
    fn later_files_override_earlier_ones() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.ron");
        let second = dir.path().join("b.ron");
        std::fs::write(&first, r#"(techniques: [(slug: "ram", power: 1.0)])"#).unwrap();
        std::fs::write(&second, r#"(techniques: [(slug: "ram", power: 2.0)])"#).unwrap();

        let mut catalog = CatalogLoader::load(&first).unwrap();
        CatalogLoader::load_into(&mut catalog, &second).unwrap();
        assert_eq!(catalog.technique("ram").unwrap().power, 2.0);
    }

    #[test]
    fn missing_file_reports_the_path() {
        let error = CatalogLoader::load(Path::new("/nonexistent/catalog.ron")).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/catalog.ron"));
    }
}
