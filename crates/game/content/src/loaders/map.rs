//! Map data loader.
//!
//! A map file holds the static collision layers, the NPCs placed on load and
//! the scripted events of the map.

use std::path::Path;

use monster_core::entity::{AiKind, Controller};
use monster_core::map::RegionProperties;
use monster_core::{
    CollisionMap, ContentCatalog, Direction, EntityId, MapEvent, Npc, Position, World,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Map data structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MapDataRon {
    #[serde(default)]
    dimensions: Option<(u32, u32)>,
    #[serde(default)]
    blocked: Vec<(i32, i32)>,
    /// One-way lines: leaving `(x, y)` in the direction is blocked.
    #[serde(default)]
    lines: Vec<(i32, i32, Direction)>,
    /// Two-way walls on the edge of `(x, y)`.
    #[serde(default)]
    walls: Vec<(i32, i32, Direction)>,
    #[serde(default)]
    regions: Vec<RegionRon>,
    #[serde(default)]
    npcs: Vec<NpcSpawn>,
    #[serde(default)]
    events: Vec<MapEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegionRon {
    x: i32,
    y: i32,
    #[serde(default)]
    enter_from: Option<String>,
    #[serde(default)]
    exit_from: Option<String>,
    #[serde(default)]
    endure: Option<String>,
    #[serde(default)]
    key: Option<String>,
}

/// A party member created from the catalog when the NPC spawns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyMember {
    pub monster: String,
    pub level: u32,
}

/// NPC placed on the map when it loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcSpawn {
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
    pub tile: Position,
    #[serde(default = "facing_down")]
    pub facing: Direction,
    #[serde(default = "simple_ai")]
    pub controller: Controller,
    #[serde(default)]
    pub money: u64,
    #[serde(default)]
    pub party: Vec<PartyMember>,
    #[serde(default)]
    pub items: Vec<(String, u32)>,
}

fn facing_down() -> Direction {
    Direction::Down
}

fn simple_ai() -> Controller {
    Controller::Ai(AiKind::Simple)
}

/// A loaded map.
#[derive(Debug, Clone)]
pub struct MapData {
    pub collision: CollisionMap,
    pub npcs: Vec<NpcSpawn>,
    pub events: Vec<MapEvent>,
}

impl MapData {
    /// Places every NPC of the map into `world`, building parties from the catalog.
    pub fn spawn_npcs(&self, world: &mut World, catalog: &ContentCatalog) -> LoadResult<Vec<EntityId>> {
        let mut spawned = Vec::with_capacity(self.npcs.len());
        for spawn in &self.npcs {
            let mut monsters = Vec::with_capacity(spawn.party.len());
            for member in &spawn.party {
                let id = world.allocate_monster_id();
                let monster = catalog
                    .create_monster(&member.monster, member.level, id)
                    .map_err(|e| anyhow::anyhow!("NPC '{}': {}", spawn.slug, e))?;
                monsters.push(monster);
            }

            let id = world.allocate_entity_id();
            let mut npc = Npc::new(id, spawn.slug.clone(), spawn.tile)
                .with_controller(spawn.controller)
                .with_facing(spawn.facing);
            if let Some(name) = &spawn.name {
                npc.name = name.clone();
            }
            npc.money = spawn.money;
            for (item, quantity) in &spawn.items {
                npc.inventory.add(item.clone(), *quantity);
            }
            for monster in monsters {
                npc.add_monster(monster);
            }
            spawned.push(world.add_npc(npc));
        }
        Ok(spawned)
    }
}

/// Loader for map data from RON files.
pub struct MapLoader;

impl MapLoader {
    /// Load map data from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing the map
    pub fn load(path: &Path) -> LoadResult<MapData> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<MapData> {
        let data: MapDataRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse map RON: {}", e))?;

        let mut collision = match data.dimensions {
            Some((width, height)) => CollisionMap::with_bounds(width, height),
            None => CollisionMap::new(),
        };
        for (x, y) in data.blocked {
            collision.set_blocked(Position::new(x, y));
        }
        for (x, y, direction) in data.lines {
            collision.add_line(Position::new(x, y), direction);
        }
        for (x, y, direction) in data.walls {
            collision.add_wall(Position::new(x, y), direction);
        }
        for region in data.regions {
            let properties = RegionProperties::from_properties(
                region.enter_from.as_deref(),
                region.exit_from.as_deref(),
                region.endure.as_deref(),
                region.key.as_deref(),
            );
            let pos = Position::new(region.x, region.y);
            match properties {
                Some(properties) => collision.set_region(pos, properties),
                None => tracing::warn!(%pos, "region without properties ignored"),
            }
        }

        Ok(MapData {
            collision,
            npcs: data.npcs,
            events: data.events,
        })
    }
}
