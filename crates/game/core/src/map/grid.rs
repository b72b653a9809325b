//! Collision model of a map.
//!
//! Three kinds of blockers combine:
//!
//! - **Tile collision**: a tile is either fully blocked or a conditional
//!   region with direction sets for entering and leaving.
//! - **Collision lines**: one-way wall segments keyed by `(tile, direction)`.
//!   A wall between two tiles is simply both halves registered.
//! - **Occupancy**: NPC positions overlaid as blocked tiles on demand.
//!
//! The model has no notion of the map edge: a neighbour outside the bounds
//! is not blocked here. The world applies bounds when it builds the view
//! movers walk on.

use std::collections::{HashMap, HashSet};

use crate::config::GameConfig;
use crate::state::{Direction, DirectionSet, Position};

/// Map size in tiles; valid coordinates are `0..width` by `0..height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapBounds {
    pub width: u32,
    pub height: u32,
}

impl MapBounds {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }
}

/// Inclusive rectangle searched by the pathfinder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchArea {
    pub min: Position,
    pub max: Position,
}

impl SearchArea {
    pub const fn contains(&self, pos: Position) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.y >= self.min.y && pos.y <= self.max.y
    }

    fn include(&mut self, pos: Position) {
        self.min.x = self.min.x.min(pos.x);
        self.min.y = self.min.y.min(pos.y);
        self.max.x = self.max.x.max(pos.x);
        self.max.y = self.max.y.max(pos.y);
    }
}

/// Conditional movement rules of a tile.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionProperties {
    /// Sides the tile may be entered from.
    pub enter_from: DirectionSet,
    /// Directions the tile may be left in.
    pub exit_from: DirectionSet,
    /// Forced continuation; a single direction pins the only exit.
    pub endure: DirectionSet,
    /// Free-form label such as `"slide"`.
    pub key: Option<String>,
}

impl RegionProperties {
    /// Label that makes a tile fully passable with endless continuation.
    pub const SLIDE: &'static str = "slide";

    /// Builds region rules from map-editor style properties.
    ///
    /// - no properties at all: `None` (plain tile)
    /// - exits without enters: enterable from every side not listed as an exit
    /// - no exits: every direction may be used to leave
    /// - `key = "slide"`: every set is full
    pub fn from_properties(
        enter_from: Option<&str>,
        exit_from: Option<&str>,
        endure: Option<&str>,
        key: Option<&str>,
    ) -> Option<Self> {
        if enter_from.is_none() && exit_from.is_none() && endure.is_none() && key.is_none() {
            return None;
        }
        let mut enter = enter_from.map(DirectionSet::parse_list).unwrap_or_default();
        let mut exit = exit_from.map(DirectionSet::parse_list).unwrap_or_default();
        let mut endure = endure.map(DirectionSet::parse_list).unwrap_or_default();

        if !exit.is_empty() && enter.is_empty() {
            enter = DirectionSet::all().difference(exit);
        }
        if exit.is_empty() {
            exit = DirectionSet::all();
        }
        if key == Some(Self::SLIDE) {
            enter = DirectionSet::all();
            exit = DirectionSet::all();
            endure = DirectionSet::all();
        }
        Some(Self {
            enter_from: enter,
            exit_from: exit,
            endure,
            key: key.map(str::to_owned),
        })
    }

    /// Fully passable region.
    pub fn open() -> Self {
        Self {
            enter_from: DirectionSet::all(),
            exit_from: DirectionSet::all(),
            endure: DirectionSet::empty(),
            key: None,
        }
    }

    /// The single forced exit, if `endure` names exactly one direction.
    pub fn forced_exit(&self) -> Option<Direction> {
        let mut directions = self.endure.directions();
        match (directions.next(), directions.next()) {
            (Some(direction), None) => Some(direction),
            _ => None,
        }
    }
}

/// Collision data of a single tile.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileCollision {
    /// Impassable from every side.
    Blocked,
    /// Passable under direction rules.
    Region(RegionProperties),
}

/// Read access to movement rules, shared by the pathfinder and movers.
pub trait Passability {
    fn is_blocked(&self, from: Position, direction: Direction) -> bool;

    fn region(&self, pos: Position) -> Option<&RegionProperties>;

    /// Rectangle a search between the two tiles may explore.
    fn search_area(&self, origin: Position, destination: Position) -> SearchArea;

    /// Neighbours reachable in one step, in down/right/up/left order.
    fn get_exits(&self, pos: Position) -> Vec<Position> {
        Direction::ALL
            .into_iter()
            .filter(|direction| !self.is_blocked(pos, *direction))
            .map(|direction| pos.step(direction))
            .collect()
    }
}

/// Static collision data plus optional bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionMap {
    bounds: Option<MapBounds>,
    tiles: HashMap<Position, TileCollision>,
    lines: HashSet<(Position, Direction)>,
    search_margin: i32,
}

impl Default for CollisionMap {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionMap {
    /// Unbounded, empty map.
    pub fn new() -> Self {
        Self {
            bounds: None,
            tiles: HashMap::new(),
            lines: HashSet::new(),
            search_margin: GameConfig::DEFAULT_PATHFIND_MARGIN,
        }
    }

    pub fn with_bounds(width: u32, height: u32) -> Self {
        Self {
            bounds: Some(MapBounds::new(width, height)),
            ..Self::new()
        }
    }

    pub fn set_search_margin(&mut self, margin: i32) {
        self.search_margin = margin.max(0);
    }

    pub fn bounds(&self) -> Option<MapBounds> {
        self.bounds
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        self.bounds.is_none_or(|bounds| bounds.contains(pos))
    }

    pub fn set_blocked(&mut self, pos: Position) {
        self.tiles.insert(pos, TileCollision::Blocked);
    }

    pub fn set_region(&mut self, pos: Position, region: RegionProperties) {
        self.tiles.insert(pos, TileCollision::Region(region));
    }

    pub fn clear_tile(&mut self, pos: Position) {
        self.tiles.remove(&pos);
    }

    /// Blocks leaving `pos` in `direction` only.
    pub fn add_line(&mut self, pos: Position, direction: Direction) {
        self.lines.insert((pos, direction));
    }

    /// Blocks the edge between `pos` and its neighbour in both directions.
    pub fn add_wall(&mut self, pos: Position, direction: Direction) {
        self.lines.insert((pos, direction));
        self.lines.insert((pos.step(direction), direction.opposite()));
    }

    pub fn tile(&self, pos: Position) -> Option<&TileCollision> {
        self.tiles.get(&pos)
    }

    pub fn region(&self, pos: Position) -> Option<&RegionProperties> {
        match self.tiles.get(&pos) {
            Some(TileCollision::Region(region)) => Some(region),
            _ => None,
        }
    }

    pub fn has_line(&self, pos: Position, direction: Direction) -> bool {
        self.lines.contains(&(pos, direction))
    }

    /// Whether moving one tile from `from` in `direction` is forbidden.
    ///
    /// Blocked when any of these holds:
    /// - `from` is fully blocked, forbids leaving in `direction`, or forces another exit
    /// - a collision line sits on `(from, direction)`
    /// - the neighbour is fully blocked or cannot be entered from this side
    pub fn is_blocked(&self, from: Position, direction: Direction) -> bool {
        match self.tiles.get(&from) {
            Some(TileCollision::Blocked) => return true,
            Some(TileCollision::Region(region)) => {
                if !region.exit_from.contains_direction(direction) {
                    return true;
                }
                if region.forced_exit().is_some_and(|forced| forced != direction) {
                    return true;
                }
            }
            None => {}
        }

        if self.lines.contains(&(from, direction)) {
            return true;
        }

        let neighbor = from.step(direction);
        match self.tiles.get(&neighbor) {
            Some(TileCollision::Blocked) => true,
            Some(TileCollision::Region(region)) => {
                !region.enter_from.contains_direction(direction.opposite())
            }
            None => false,
        }
    }

    /// Neighbours reachable in one step, in down/right/up/left order.
    pub fn get_exits(&self, pos: Position) -> Vec<Position> {
        Passability::get_exits(self, pos)
    }

    /// Copy of this map with every occupied tile marked blocked.
    ///
    /// Occupants override tile data: a tile holding an NPC is impassable
    /// regardless of its region rules.
    pub fn with_occupants(&self, occupied: impl IntoIterator<Item = Position>) -> Self {
        let mut overlay = self.clone();
        for pos in occupied {
            overlay.tiles.insert(pos, TileCollision::Blocked);
        }
        overlay
    }

    /// Rectangle the pathfinder may explore between `origin` and `destination`.
    ///
    /// Bounded maps use their bounds. Unbounded maps use the box around all
    /// collision data and both endpoints, grown by the search margin.
    pub fn search_area(&self, origin: Position, destination: Position) -> SearchArea {
        if let Some(bounds) = self.bounds {
            return SearchArea {
                min: Position::ORIGIN,
                max: Position::new(bounds.width as i32 - 1, bounds.height as i32 - 1),
            };
        }
        let mut area = SearchArea {
            min: origin,
            max: origin,
        };
        area.include(destination);
        for pos in self.tiles.keys() {
            area.include(*pos);
        }
        for (pos, _) in &self.lines {
            area.include(*pos);
        }
        let margin = self.search_margin;
        area.min = Position::new(area.min.x - margin, area.min.y - margin);
        area.max = Position::new(area.max.x + margin, area.max.y + margin);
        area
    }
}

impl Passability for CollisionMap {
    fn is_blocked(&self, from: Position, direction: Direction) -> bool {
        CollisionMap::is_blocked(self, from, direction)
    }

    fn region(&self, pos: Position) -> Option<&RegionProperties> {
        CollisionMap::region(self, pos)
    }

    fn search_area(&self, origin: Position, destination: Position) -> SearchArea {
        CollisionMap::search_area(self, origin, destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exits_without_enters_open_the_other_sides() {
        let region = RegionProperties::from_properties(None, Some("up"), None, None).unwrap();
        assert_eq!(
            region.enter_from,
            DirectionSet::DOWN | DirectionSet::LEFT | DirectionSet::RIGHT
        );
        assert_eq!(region.exit_from, DirectionSet::UP);
        assert!(RegionProperties::from_properties(None, None, None, None).is_none());
    }

    #[test]
    fn region_entry_is_checked_from_the_arrival_side() {
        let mut map = CollisionMap::new();
        let region = RegionProperties::from_properties(Some("down"), None, None, None).unwrap();
        map.set_region(Position::new(1, 1), region);
        // Arriving from below means moving up into the tile.
        assert!(!map.is_blocked(Position::new(1, 2), Direction::Up));
        assert!(map.is_blocked(Position::new(1, 0), Direction::Down));
        assert!(map.is_blocked(Position::new(0, 1), Direction::Right));
    }

    #[test]
    fn one_way_line_blocks_a_single_direction() {
        let mut map = CollisionMap::new();
        map.add_line(Position::new(5, 5), Direction::Up);
        assert!(map.is_blocked(Position::new(5, 5), Direction::Up));
        assert!(!map.is_blocked(Position::new(5, 4), Direction::Down));
        map.add_wall(Position::new(2, 2), Direction::Right);
        assert!(map.is_blocked(Position::new(3, 2), Direction::Left));
    }

    #[test]
    fn exits_skip_blocked_tiles() {
        let mut map = CollisionMap::new();
        map.set_blocked(Position::new(1, 0));
        let exits = map.get_exits(Position::new(0, 0));
        assert_eq!(
            exits,
            vec![Position::new(0, 1), Position::new(0, -1), Position::new(-1, 0)]
        );
    }

    #[test]
    fn forced_exit_pins_direction() {
        let mut map = CollisionMap::new();
        let region = RegionProperties::from_properties(None, None, Some("left"), None).unwrap();
        map.set_region(Position::new(2, 2), RegionProperties {
            enter_from: DirectionSet::all(),
            ..region
        });
        assert_eq!(map.get_exits(Position::new(2, 2)), vec![Position::new(1, 2)]);
    }

    #[test]
    fn map_edge_is_left_to_the_caller() {
        let map = CollisionMap::with_bounds(3, 3);
        assert!(!map.is_blocked(Position::new(0, 0), Direction::Up));
        assert!(!map.in_bounds(Position::new(0, -1)));
        assert_eq!(map.get_exits(Position::new(0, 0)).len(), 4);
    }

    #[test]
    fn occupants_overlay_blocks_tiles() {
        let map = CollisionMap::new();
        let overlay = map.with_occupants([Position::new(0, 1)]);
        assert!(overlay.is_blocked(Position::new(0, 0), Direction::Down));
        assert!(!map.is_blocked(Position::new(0, 0), Direction::Down));
    }
}
