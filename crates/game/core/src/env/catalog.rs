//! Static content: monster templates, techniques, items, statuses, environments.
//!
//! The catalog is loaded once at startup and shared by handle with every
//! engine that needs lookups. Nothing in it changes after loading.

use std::collections::HashMap;

use super::error::CatalogError;
use crate::config::GameConfig;
use crate::monster::{
    Element, Evolution, GrowthProfile, ItemDef, Monster, MovesetEntry, StatBlock, Status,
    Technique, scale_stats,
};
use crate::state::MonsterId;

/// Technique unlocked at a level, by slug.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemplateMove {
    pub level_learned: u32,
    pub technique: String,
}

/// Species data a monster is created from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterTemplate {
    pub slug: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub shape: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub types: Vec<Element>,
    pub base_stats: StatBlock,
    #[cfg_attr(feature = "serde", serde(default))]
    pub growth: GrowthProfile,
    #[cfg_attr(feature = "serde", serde(default = "default_catch_rate"))]
    pub catch_rate: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub moveset: Vec<TemplateMove>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub evolutions: Vec<Evolution>,
    #[cfg_attr(feature = "serde", serde(default = "one_u32"))]
    pub experience_required_modifier: u32,
    #[cfg_attr(feature = "serde", serde(default = "one_f32"))]
    pub money_modifier: f32,
}

#[cfg(feature = "serde")]
fn default_catch_rate() -> u32 {
    MonsterTemplate::DEFAULT_CATCH_RATE
}

#[cfg(feature = "serde")]
fn one_u32() -> u32 {
    1
}

#[cfg(feature = "serde")]
fn one_f32() -> f32 {
    1.0
}

impl MonsterTemplate {
    pub const DEFAULT_CATCH_RATE: u32 = 125;

    pub fn new(slug: impl Into<String>, base_stats: StatBlock) -> Self {
        Self {
            slug: slug.into(),
            name: None,
            category: String::new(),
            shape: String::new(),
            types: Vec::new(),
            base_stats,
            growth: GrowthProfile::default(),
            catch_rate: Self::DEFAULT_CATCH_RATE,
            moveset: Vec::new(),
            evolutions: Vec::new(),
            experience_required_modifier: 1,
            money_modifier: 1.0,
        }
    }
}

/// Battle presentation for an encounter location.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Environment {
    pub slug: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub battle_music: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub battle_graphics: String,
}

/// Read-only content database.
#[derive(Clone, Debug, Default)]
pub struct ContentCatalog {
    monsters: HashMap<String, MonsterTemplate>,
    techniques: HashMap<String, Technique>,
    items: HashMap<String, ItemDef>,
    statuses: HashMap<String, Status>,
    environments: HashMap<String, Environment>,
}

impl ContentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_monster(&mut self, template: MonsterTemplate) {
        self.monsters.insert(template.slug.clone(), template);
    }

    pub fn insert_technique(&mut self, technique: Technique) {
        self.techniques.insert(technique.slug.clone(), technique);
    }

    pub fn insert_item(&mut self, item: ItemDef) {
        self.items.insert(item.slug.clone(), item);
    }

    pub fn insert_status(&mut self, status: Status) {
        self.statuses.insert(status.slug.clone(), status);
    }

    pub fn insert_environment(&mut self, environment: Environment) {
        self.environments.insert(environment.slug.clone(), environment);
    }

    pub fn monster_template(&self, slug: &str) -> Result<&MonsterTemplate, CatalogError> {
        self.monsters
            .get(slug)
            .ok_or_else(|| CatalogError::UnknownMonster(slug.to_owned()))
    }

    /// Fresh copy of a technique template.
    pub fn technique(&self, slug: &str) -> Result<Technique, CatalogError> {
        self.techniques
            .get(slug)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownTechnique(slug.to_owned()))
    }

    pub fn item(&self, slug: &str) -> Result<&ItemDef, CatalogError> {
        self.items
            .get(slug)
            .ok_or_else(|| CatalogError::UnknownItem(slug.to_owned()))
    }

    /// Fresh copy of a status template.
    pub fn status(&self, slug: &str) -> Result<Status, CatalogError> {
        self.statuses
            .get(slug)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownStatus(slug.to_owned()))
    }

    pub fn environment(&self, slug: &str) -> Result<&Environment, CatalogError> {
        self.environments
            .get(slug)
            .ok_or_else(|| CatalogError::UnknownEnvironment(slug.to_owned()))
    }

    pub fn monster_count(&self) -> usize {
        self.monsters.len()
    }

    /// Builds a monster of `slug` at `level`.
    ///
    /// The move list holds the most recent moveset entries at or below the
    /// level, up to [`GameConfig::MAX_MOVES`]. Experience starts at the
    /// amount required for the level.
    pub fn create_monster(
        &self,
        slug: &str,
        level: u32,
        id: MonsterId,
    ) -> Result<Monster, CatalogError> {
        let template = self.monster_template(slug)?;
        let level = level.clamp(1, GameConfig::MAX_LEVEL);

        let mut moveset = Vec::with_capacity(template.moveset.len());
        for entry in &template.moveset {
            moveset.push(MovesetEntry {
                level_learned: entry.level_learned,
                technique: self.technique(&entry.technique)?,
            });
        }
        moveset.sort_by_key(|entry| entry.level_learned);

        let stats = scale_stats(&template.base_stats, &template.growth, level);
        let mut monster = Monster::new(id, template.slug.clone(), level);
        monster.name = template.name.clone().unwrap_or_else(|| template.slug.clone());
        monster.category = template.category.clone();
        monster.shape = template.shape.clone();
        monster.types = template.types.clone();
        monster.base_stats = template.base_stats;
        monster.growth = template.growth;
        monster.stats = stats;
        monster.current_hp = stats.hp;
        monster.catch_rate = template.catch_rate;
        monster.evolutions = template.evolutions.clone();
        monster.experience_required_modifier = template.experience_required_modifier;
        monster.money_modifier = template.money_modifier;
        monster.total_experience = monster.experience_required(0);

        let known: Vec<&MovesetEntry> = moveset
            .iter()
            .filter(|entry| entry.level_learned <= level)
            .collect();
        let skip = known.len().saturating_sub(GameConfig::MAX_MOVES);
        for entry in known.into_iter().skip(skip) {
            monster.learn(entry.technique.clone());
        }
        monster.moveset = moveset;
        Ok(monster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ContentCatalog {
        let mut catalog = ContentCatalog::new();
        for slug in ["ram", "bite", "claw", "roar", "blast"] {
            catalog.insert_technique(Technique::new(slug));
        }
        let mut template = MonsterTemplate::new("rockitten", StatBlock::uniform(2));
        template.moveset = [("ram", 1), ("bite", 3), ("claw", 5), ("roar", 7), ("blast", 9)]
            .into_iter()
            .map(|(technique, level_learned)| TemplateMove {
                level_learned,
                technique: technique.to_owned(),
            })
            .collect();
        catalog.insert_monster(template);
        catalog
    }

    #[test]
    fn created_monster_knows_latest_moves() {
        let monster = catalog().create_monster("rockitten", 10, MonsterId(4)).unwrap();
        let slugs: Vec<&str> = monster.moves.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, ["bite", "claw", "roar", "blast"]);
        assert_eq!(monster.current_hp, monster.hp());
        assert_eq!(monster.total_experience, 1000);
        assert_eq!(monster.id, MonsterId(4));
    }

    #[test]
    fn unknown_slugs_are_reported() {
        let catalog = catalog();
        assert_eq!(
            catalog.create_monster("nope", 5, MonsterId(1)).unwrap_err(),
            CatalogError::UnknownMonster("nope".to_owned())
        );
        assert!(catalog.item("potion").is_err());
    }
}
