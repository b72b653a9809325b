//! Overworld state: the current map and every NPC standing on it.
//!
//! The world owns NPCs between encounters. When a battle starts the runtime
//! takes the participants out with [`World::take_npc`] and gives them back
//! with [`World::return_npc`] once the combat is over, so a party is only
//! ever owned in one place.

use std::collections::{BTreeMap, HashMap};

use crate::engine::CombatType;
use crate::entity::{MovementEvent, Npc};
use crate::map::{CollisionMap, Passability, RegionProperties, SearchArea};
use crate::state::{Direction, EntityId, MonsterId, Position};

/// One side of a requested encounter.
#[derive(Clone, Debug)]
pub enum Participant {
    /// An NPC that lives in the world.
    Npc(EntityId),
    /// A wild monster wrapped in a throwaway holder.
    Wild(Box<Npc>),
}

/// Battle requested by the event engine, started by the runtime.
#[derive(Clone, Debug)]
pub struct CombatRequest {
    pub participants: Vec<Participant>,
    pub combat_type: CombatType,
    pub environment: String,
}

/// Where an NPC stands and the tile it is stepping to, if any.
type HeldTiles = [Option<Position>; 2];

fn held_tiles(npc: &Npc) -> HeldTiles {
    let here = npc.tile();
    let step = npc.mover.move_destination().filter(|step| *step != here);
    [Some(here), step]
}

/// Count of NPCs holding each tile.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Occupancy {
    holders: HashMap<Position, u32>,
}

impl Occupancy {
    fn add(&mut self, tiles: HeldTiles) {
        for tile in tiles.into_iter().flatten() {
            *self.holders.entry(tile).or_insert(0) += 1;
        }
    }

    fn remove(&mut self, tiles: HeldTiles) {
        for tile in tiles.into_iter().flatten() {
            if let Some(count) = self.holders.get_mut(&tile) {
                *count -= 1;
                if *count == 0 {
                    self.holders.remove(&tile);
                }
            }
        }
    }

    pub fn holders(&self, tile: Position) -> u32 {
        self.holders.get(&tile).copied().unwrap_or(0)
    }
}

/// Borrowed collision view one mover walks on.
///
/// Tiles held by anyone but the viewer are blocked, and so is everything
/// past the map bounds.
#[derive(Clone, Copy, Debug)]
pub struct WorldGrid<'a> {
    map: &'a CollisionMap,
    occupancy: &'a Occupancy,
    own: HeldTiles,
}

impl<'a> WorldGrid<'a> {
    fn new(map: &'a CollisionMap, occupancy: &'a Occupancy, own: HeldTiles) -> Self {
        Self {
            map,
            occupancy,
            own,
        }
    }

    fn is_held(&self, tile: Position) -> bool {
        let own = self.own.iter().filter(|held| **held == Some(tile)).count() as u32;
        self.occupancy.holders(tile) > own
    }
}

impl Passability for WorldGrid<'_> {
    fn is_blocked(&self, from: Position, direction: Direction) -> bool {
        let to = from.step(direction);
        !self.map.in_bounds(to)
            || self.is_held(from)
            || self.is_held(to)
            || self.map.is_blocked(from, direction)
    }

    fn region(&self, pos: Position) -> Option<&RegionProperties> {
        self.map.region(pos)
    }

    fn search_area(&self, origin: Position, destination: Position) -> SearchArea {
        self.map.search_area(origin, destination)
    }
}

#[derive(Clone, Debug)]
pub struct World {
    map_name: String,
    map: CollisionMap,
    npcs: BTreeMap<EntityId, Npc>,
    next_entity: u32,
    next_monster: u32,
    pending_combat: Option<CombatRequest>,
}

impl World {
    pub fn new(map_name: impl Into<String>, map: CollisionMap, player: Npc) -> Self {
        let mut world = Self {
            map_name: map_name.into(),
            map,
            npcs: BTreeMap::new(),
            next_entity: 1,
            next_monster: 1,
            pending_combat: None,
        };
        world.insert(player);
        world
    }

    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    pub fn map(&self) -> &CollisionMap {
        &self.map
    }

    /// Switches to another map. Everyone but the player is left behind.
    pub fn load_map(&mut self, map_name: impl Into<String>, map: CollisionMap) {
        self.map_name = map_name.into();
        self.map = map;
        self.npcs.retain(|id, _| id.is_player());
    }

    // ========================================================================
    // NPCs
    // ========================================================================

    pub fn player(&self) -> Option<&Npc> {
        self.npcs.get(&EntityId::PLAYER)
    }

    pub fn player_mut(&mut self) -> Option<&mut Npc> {
        self.npcs.get_mut(&EntityId::PLAYER)
    }

    pub fn npc(&self, id: EntityId) -> Option<&Npc> {
        self.npcs.get(&id)
    }

    pub fn npc_mut(&mut self, id: EntityId) -> Option<&mut Npc> {
        self.npcs.get_mut(&id)
    }

    pub fn npc_by_slug(&self, slug: &str) -> Option<&Npc> {
        self.npcs.values().find(|npc| npc.slug == slug)
    }

    pub fn npc_id_by_slug(&self, slug: &str) -> Option<EntityId> {
        self.npc_by_slug(slug).map(|npc| npc.id)
    }

    pub fn npcs(&self) -> impl Iterator<Item = &Npc> {
        self.npcs.values()
    }

    /// Adds an NPC, giving it a fresh id when its own is taken.
    pub fn add_npc(&mut self, mut npc: Npc) -> EntityId {
        if npc.is_player() || self.npcs.contains_key(&npc.id) {
            npc.id = self.allocate_entity_id();
        }
        self.insert(npc)
    }

    /// Creates an empty NPC at `tile`.
    pub fn spawn_npc(&mut self, slug: &str, tile: Position) -> EntityId {
        let id = self.allocate_entity_id();
        self.insert(Npc::new(id, slug, tile))
    }

    pub fn remove_npc(&mut self, id: EntityId) -> Option<Npc> {
        if id.is_player() {
            return None;
        }
        self.npcs.remove(&id)
    }

    /// Moves an NPC out of the world, e.g. into a combat.
    pub fn take_npc(&mut self, id: EntityId) -> Option<Npc> {
        self.npcs.remove(&id)
    }

    /// Puts back an NPC taken with [`World::take_npc`].
    pub fn return_npc(&mut self, npc: Npc) {
        self.insert(npc);
    }

    fn insert(&mut self, npc: Npc) -> EntityId {
        let id = npc.id;
        self.next_entity = self.next_entity.max(id.0 + 1);
        let highest = npc
            .party
            .monsters()
            .iter()
            .chain(npc.party.storage())
            .map(|monster| monster.id.0)
            .max();
        if let Some(highest) = highest {
            self.next_monster = self.next_monster.max(highest + 1);
        }
        self.npcs.insert(id, npc);
        id
    }

    pub fn allocate_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    pub fn allocate_monster_id(&mut self) -> MonsterId {
        let id = MonsterId(self.next_monster);
        self.next_monster += 1;
        id
    }

    // ========================================================================
    // Collision
    // ========================================================================

    /// Every NPC's held tiles, counted once per holder.
    pub fn occupancy(&self) -> Occupancy {
        let mut occupancy = Occupancy::default();
        for npc in self.npcs.values() {
            occupancy.add(held_tiles(npc));
        }
        occupancy
    }

    /// Movement view for `viewer`: map bounds, static collision and every
    /// other NPC in `occupancy`.
    pub fn grid_for<'a>(&'a self, occupancy: &'a Occupancy, viewer: EntityId) -> WorldGrid<'a> {
        let own = self.npcs.get(&viewer).map(held_tiles).unwrap_or_default();
        WorldGrid::new(&self.map, occupancy, own)
    }

    /// Snapshot with every held tile blocked, for callers outside the tick.
    pub fn collision_map(&self) -> CollisionMap {
        let held = self.npcs.values().flat_map(|npc| held_tiles(npc).into_iter().flatten());
        self.map.with_occupants(held)
    }

    /// Neighbours of `tile` that can be entered, ignoring whoever stands on it.
    pub fn get_exits(&self, tile: Position) -> Vec<Position> {
        let occupancy = self.occupancy();
        WorldGrid::new(&self.map, &occupancy, [Some(tile), None]).get_exits(tile)
    }

    // ========================================================================
    // Movement
    // ========================================================================

    /// Starts `id` walking to `destination`.
    pub fn pathfind(&mut self, id: EntityId, destination: Position) -> Vec<MovementEvent> {
        let occupancy = self.occupancy();
        let mut events = Vec::new();
        if let Some(npc) = self.npcs.get_mut(&id) {
            let grid = WorldGrid::new(&self.map, &occupancy, held_tiles(npc));
            npc.mover.pathfind(destination, &grid, &mut events);
        }
        events
    }

    /// Advances every mover; events are tagged with the NPC they came from.
    ///
    /// One occupancy table serves the whole tick and follows each mover as
    /// it picks up a new step.
    pub fn update_movement(&mut self, dt: f32) -> Vec<(EntityId, MovementEvent)> {
        let mut occupancy = self.occupancy();
        let mut events = Vec::new();
        for (id, npc) in &mut self.npcs {
            let before = held_tiles(npc);
            let grid = WorldGrid::new(&self.map, &occupancy, before);
            let moved = npc.mover.update(dt, &grid);
            let after = held_tiles(npc);
            if after != before {
                occupancy.remove(before);
                occupancy.add(after);
            }
            events.extend(moved.into_iter().map(|event| (*id, event)));
        }
        events
    }

    pub fn is_moving(&self) -> bool {
        self.npcs.values().any(|npc| npc.mover.is_moving())
    }

    // ========================================================================
    // Encounters
    // ========================================================================

    /// Queues a battle for the runtime to start after this tick.
    pub fn enqueue_combat(
        &mut self,
        participants: Vec<Participant>,
        combat_type: CombatType,
        environment: impl Into<String>,
    ) {
        self.pending_combat = Some(CombatRequest {
            participants,
            combat_type,
            environment: environment.into(),
        });
    }

    pub fn has_pending_combat(&self) -> bool {
        self.pending_combat.is_some()
    }

    pub fn take_pending_combat(&mut self) -> Option<CombatRequest> {
        self.pending_combat.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monster::Monster;

    fn world() -> World {
        let player = Npc::player("Red", Position::new(1, 1));
        World::new("route_1", CollisionMap::with_bounds(5, 5), player)
    }

    #[test]
    fn npcs_block_each_other_but_not_themselves() {
        let mut world = world();
        let guard = world.spawn_npc("guard", Position::new(2, 1));

        let occupancy = world.occupancy();
        let for_player = world.grid_for(&occupancy, EntityId::PLAYER);
        assert!(for_player.is_blocked(Position::new(1, 1), Direction::Right));
        let for_guard = world.grid_for(&occupancy, guard);
        assert!(!for_guard.is_blocked(Position::new(2, 1), Direction::Down));

        let exits = world.get_exits(Position::new(1, 1));
        assert!(!exits.contains(&Position::new(2, 1)));
        assert!(exits.contains(&Position::new(1, 2)));

        let snapshot = world.collision_map();
        assert!(snapshot.is_blocked(Position::new(1, 2), Direction::Up));
        assert!(snapshot.is_blocked(Position::new(3, 1), Direction::Left));
    }

    #[test]
    fn map_bounds_stop_walkers_at_the_edge() {
        let mut world = world();
        let occupancy = world.occupancy();
        let grid = world.grid_for(&occupancy, EntityId::PLAYER);
        assert!(grid.is_blocked(Position::new(0, 0), Direction::Up));
        assert!(grid.is_blocked(Position::new(4, 2), Direction::Right));
        assert!(!grid.is_blocked(Position::new(1, 1), Direction::Up));

        world.pathfind(EntityId::PLAYER, Position::new(-1, 1));
        for _ in 0..100 {
            world.update_movement(0.05);
        }
        let tile = world.player().map(Npc::tile);
        assert!(tile.is_some_and(|tile| world.map().in_bounds(tile)));
    }

    #[test]
    fn stepping_npcs_hold_both_tiles() {
        let mut world = world();
        let guard = world.spawn_npc("guard", Position::new(3, 1));
        world.pathfind(guard, Position::new(3, 3));
        world.update_movement(0.01);

        let occupancy = world.occupancy();
        assert_eq!(occupancy.holders(Position::new(3, 1)), 1);
        assert_eq!(occupancy.holders(Position::new(3, 2)), 1);
        let for_player = world.grid_for(&occupancy, EntityId::PLAYER);
        assert!(for_player.is_blocked(Position::new(2, 2), Direction::Right));
        let for_guard = world.grid_for(&occupancy, guard);
        assert!(!for_guard.is_blocked(Position::new(3, 1), Direction::Down));
    }

    #[test]
    fn added_npcs_get_unique_ids() {
        let mut world = world();
        let first = world.add_npc(Npc::new(EntityId(4), "nurse", Position::ORIGIN));
        let second = world.add_npc(Npc::new(EntityId(4), "clerk", Position::ORIGIN));
        assert_eq!(first, EntityId(4));
        assert_ne!(first, second);
        assert_eq!(world.npc_id_by_slug("clerk"), Some(second));
    }

    #[test]
    fn monster_ids_skip_existing_ones() {
        let mut player = Npc::player("Red", Position::ORIGIN);
        player.add_monster(Monster::new(MonsterId(8), "rockitten", 5));
        let mut world = World::new("home", CollisionMap::new(), player);
        assert_eq!(world.allocate_monster_id(), MonsterId(9));
    }

    #[test]
    fn walking_reports_arrival() {
        let mut world = world();
        let events = world.pathfind(EntityId::PLAYER, Position::new(3, 1));
        assert!(events.is_empty());

        let mut arrivals = Vec::new();
        for _ in 0..100 {
            arrivals.extend(world.update_movement(0.05));
        }
        assert_eq!(world.player().map(Npc::tile), Some(Position::new(3, 1)));
        assert!(arrivals.contains(&(
            EntityId::PLAYER,
            MovementEvent::Arrived {
                tile: Position::new(3, 1)
            }
        )));
    }

    #[test]
    fn pending_combat_is_taken_once() {
        let mut world = world();
        world.enqueue_combat(
            vec![Participant::Npc(EntityId::PLAYER)],
            CombatType::Wild,
            "grass",
        );
        assert!(world.has_pending_combat());
        assert!(world.take_pending_combat().is_some());
        assert!(world.take_pending_combat().is_none());
    }
}
