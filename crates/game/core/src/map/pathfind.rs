//! Breadth-first pathfinding over any [`Passability`] view.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::error;

use super::grid::Passability;
use crate::state::Position;

/// A route stored destination-first.
///
/// The origin is never included. The next tile to walk to is at the end of
/// the backing list, so [`Path::pop`] consumes the route in walking order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    steps: Vec<Position>,
}

impl Path {
    /// Builds a path from tiles listed in walking order.
    pub fn from_walk_order(mut tiles: Vec<Position>) -> Self {
        tiles.reverse();
        Self { steps: tiles }
    }

    /// Single-step path.
    pub fn single(tile: Position) -> Self {
        Self { steps: vec![tile] }
    }

    /// Tile the walker should head to next.
    pub fn next(&self) -> Option<Position> {
        self.steps.last().copied()
    }

    /// Removes and returns the next tile.
    pub fn pop(&mut self) -> Option<Position> {
        self.steps.pop()
    }

    /// Final tile of the route.
    pub fn destination(&self) -> Option<Position> {
        self.steps.first().copied()
    }

    /// Tiles in destination-first order.
    pub fn as_slice(&self) -> &[Position] {
        &self.steps
    }

    /// Tiles in walking order.
    pub fn walk_order(&self) -> impl Iterator<Item = Position> + '_ {
        self.steps.iter().rev().copied()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }
}

/// Shortest route from `origin` to `destination`.
///
/// Neighbours expand in down/right/up/left order, so among equally short
/// routes the first found in that order wins. `origin == destination`
/// yields an empty path. An unreachable destination logs an error and
/// returns `None`.
pub fn find_path(
    origin: Position,
    destination: Position,
    grid: &dyn Passability,
) -> Option<Path> {
    if origin == destination {
        return Some(Path::default());
    }

    let area = grid.search_area(origin, destination);
    let mut visited: HashSet<Position> = HashSet::from([origin]);
    let mut parents: HashMap<Position, Position> = HashMap::new();
    let mut frontier: VecDeque<Position> = VecDeque::from([origin]);

    while let Some(node) = frontier.pop_front() {
        if node == destination {
            return Some(reconstruct(origin, destination, &parents));
        }
        for next in grid.get_exits(node) {
            if !area.contains(next) || !visited.insert(next) {
                continue;
            }
            parents.insert(next, node);
            frontier.push_back(next);
        }
    }

    error!(%origin, %destination, "pathfinding failed to find a path");
    None
}

fn reconstruct(
    origin: Position,
    destination: Position,
    parents: &HashMap<Position, Position>,
) -> Path {
    let mut steps = vec![destination];
    let mut current = destination;
    while let Some(parent) = parents.get(&current).copied() {
        if parent == origin {
            break;
        }
        steps.push(parent);
        current = parent;
    }
    Path { steps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{CollisionMap, RegionProperties};
    use crate::state::Direction;

    #[test]
    fn same_tile_is_an_empty_path() {
        let grid = CollisionMap::with_bounds(4, 4);
        let path = find_path(Position::new(1, 1), Position::new(1, 1), &grid).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn path_excludes_origin_and_ends_at_destination() {
        let grid = CollisionMap::with_bounds(5, 1);
        let mut path = find_path(Position::new(0, 0), Position::new(3, 0), &grid).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.destination(), Some(Position::new(3, 0)));
        assert_eq!(path.pop(), Some(Position::new(1, 0)));
        assert_eq!(path.pop(), Some(Position::new(2, 0)));
        assert_eq!(path.pop(), Some(Position::new(3, 0)));
        assert_eq!(path.pop(), None);
    }

    #[test]
    fn routes_around_a_one_way_wall() {
        let mut grid = CollisionMap::with_bounds(6, 8);
        grid.add_line(Position::new(5, 5), Direction::Up);
        let path = find_path(Position::new(5, 5), Position::new(5, 3), &grid).unwrap();
        let walk: Vec<Position> = path.walk_order().collect();
        assert_eq!(
            walk,
            vec![
                Position::new(4, 5),
                Position::new(4, 4),
                Position::new(5, 4),
                Position::new(5, 3),
            ]
        );
    }

    #[test]
    fn round_trip_around_a_wall_has_equal_length() {
        let mut grid = CollisionMap::with_bounds(6, 6);
        for y in 0..5 {
            grid.set_blocked(Position::new(2, y));
        }
        let a = Position::new(0, 0);
        let b = Position::new(4, 0);

        let there = find_path(a, b, &grid).unwrap();
        let back = find_path(b, a, &grid).unwrap();
        // Down to the gap in the bottom row, across, and back up.
        assert_eq!(there.len(), 14);
        assert_eq!(back.len(), there.len());
        assert!(there.walk_order().any(|tile| tile == Position::new(2, 5)));
        assert!(back.walk_order().any(|tile| tile == Position::new(2, 5)));
        assert_eq!(there.destination(), Some(b));
        assert_eq!(back.destination(), Some(a));
    }

    #[test]
    fn unreachable_destination_returns_none() {
        let mut grid = CollisionMap::with_bounds(3, 3);
        grid.set_blocked(Position::new(2, 2));
        assert!(find_path(Position::new(0, 0), Position::new(2, 2), &grid).is_none());

        let mut enclosed = CollisionMap::new();
        for direction in Direction::ALL {
            enclosed.add_line(Position::new(0, 0), direction);
        }
        assert!(find_path(Position::new(0, 0), Position::new(4, 4), &enclosed).is_none());
    }

    #[test]
    fn enter_rules_shape_the_route() {
        let mut grid = CollisionMap::with_bounds(3, 2);
        let gate = RegionProperties::from_properties(Some("left"), None, None, None).unwrap();
        grid.set_region(Position::new(1, 0), gate);
        // The gate only admits arrivals from the left.
        let path = find_path(Position::new(0, 0), Position::new(2, 0), &grid).unwrap();
        let walk: Vec<Position> = path.walk_order().collect();
        assert_eq!(walk, vec![Position::new(1, 0), Position::new(2, 0)]);
    }
}
