//! Tile-to-tile movement controller.
//!
//! A [`Mover`] keeps a continuous position that slides between tile
//! centres. Each call to [`Mover::update`] integrates velocity, checks
//! whether the active waypoint was reached and, if so, snaps onto it and
//! starts the next one. Arrivals are reported as [`MovementEvent`]s so the
//! caller can fire tile events or sync positions.

use tracing::{debug, error};

use crate::config::GameConfig;
use crate::map::{Passability, Path, find_path};
use crate::state::{Direction, Position};

/// Continuous world position measured in tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub x: f32,
    pub y: f32,
}

impl Coord {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Tile containing this point.
    pub fn tile(self) -> Position {
        Position::new(self.x.floor() as i32, self.y.floor() as i32)
    }
}

impl From<Position> for Coord {
    fn from(pos: Position) -> Self {
        Self::new(pos.x as f32, pos.y as f32)
    }
}

/// Coarse movement state used by renderers and conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementState {
    Idle,
    FollowingPath,
    InTransit,
}

/// Something that happened during a movement update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementEvent {
    /// Snapped onto a waypoint.
    Arrived { tile: Position },
    /// The next waypoint could not be entered.
    Blocked { tile: Position },
    /// No route to the pathfinding target exists.
    PathFailed { destination: Position },
}

#[derive(Clone, Debug)]
pub struct Mover {
    position: Coord,
    velocity: Coord,
    path: Path,
    path_origin: Option<Position>,
    pathfinding: Option<Position>,
    move_direction: Option<Direction>,
    facing: Direction,
    running: bool,
    walk_rate: f32,
    run_rate: f32,
    ignore_collisions: bool,
}

impl Mover {
    pub fn new(tile: Position) -> Self {
        Self {
            position: tile.into(),
            velocity: Coord::default(),
            path: Path::default(),
            path_origin: None,
            pathfinding: None,
            move_direction: None,
            facing: Direction::Down,
            running: false,
            walk_rate: GameConfig::DEFAULT_WALK_RATE,
            run_rate: GameConfig::DEFAULT_RUN_RATE,
            ignore_collisions: false,
        }
    }

    pub fn with_rates(mut self, walk_rate: f32, run_rate: f32) -> Self {
        self.walk_rate = walk_rate;
        self.run_rate = run_rate;
        self
    }

    pub fn with_facing(mut self, facing: Direction) -> Self {
        self.facing = facing;
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn position(&self) -> Coord {
        self.position
    }

    pub fn tile(&self) -> Position {
        self.position.tile()
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn set_facing(&mut self, facing: Direction) {
        self.facing = facing;
    }

    pub fn is_moving(&self) -> bool {
        self.velocity != Coord::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn set_ignore_collisions(&mut self, ignore: bool) {
        self.ignore_collisions = ignore;
    }

    /// Tiles per second at the current gait.
    pub fn move_rate(&self) -> f32 {
        if self.running { self.run_rate } else { self.walk_rate }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Tile currently being walked to.
    pub fn move_destination(&self) -> Option<Position> {
        self.path.next()
    }

    pub fn pathfinding_target(&self) -> Option<Position> {
        self.pathfinding
    }

    pub fn state(&self) -> MovementState {
        if self.path_origin.is_some() && self.is_moving() {
            MovementState::InTransit
        } else if !self.path.is_empty() {
            MovementState::FollowingPath
        } else {
            MovementState::Idle
        }
    }

    /// Sprite animation name; walking variants while in motion.
    pub fn animation_name(&self) -> &'static str {
        match (self.is_moving(), self.facing) {
            (true, Direction::Up) => "back_walk",
            (true, Direction::Down) => "front_walk",
            (true, Direction::Left) => "left_walk",
            (true, Direction::Right) => "right_walk",
            (false, Direction::Up) => "back",
            (false, Direction::Down) => "front",
            (false, Direction::Left) => "left",
            (false, Direction::Right) => "right",
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Holds a direction; the mover keeps stepping that way on each update
    /// until the direction is released or the path is cancelled.
    pub fn set_move_direction(&mut self, direction: Option<Direction>) {
        self.move_direction = direction;
    }

    /// Queues a single step.
    ///
    /// Returns `false` and only turns to face `direction` when the step is
    /// blocked.
    pub fn move_one_tile(&mut self, direction: Direction, grid: &dyn Passability) -> bool {
        let from = self.tile();
        if !self.ignore_collisions && grid.is_blocked(from, direction) {
            self.facing = direction;
            return false;
        }
        self.path = Path::single(from.step(direction));
        true
    }

    /// Computes a route to `destination` and starts walking it.
    ///
    /// The target is remembered so the route is recomputed when a waypoint
    /// becomes blocked mid-walk.
    pub fn pathfind(
        &mut self,
        destination: Position,
        grid: &dyn Passability,
        events: &mut Vec<MovementEvent>,
    ) -> bool {
        let origin = self.tile();
        if origin == destination {
            self.pathfinding = None;
            return true;
        }
        self.pathfinding = Some(destination);
        match find_path(origin, destination, grid) {
            Some(path) => {
                self.path = path;
                self.next_waypoint(grid, events);
                true
            }
            None => {
                self.pathfinding = None;
                events.push(MovementEvent::PathFailed { destination });
                false
            }
        }
    }

    /// Walks a fixed route; the first step starts on the next update.
    ///
    /// Blocked waypoints are not routed around.
    pub fn follow(&mut self, path: Path) {
        self.pathfinding = None;
        self.path = path;
    }

    /// Drops the route; a held direction stays in effect.
    pub fn cancel_path(&mut self) {
        self.path.clear();
        self.pathfinding = None;
        self.path_origin = None;
    }

    /// Stops at the next tile boundary.
    ///
    /// A step that has just started is discarded, a step in progress is
    /// finished, anything else stops immediately.
    pub fn cancel_movement(&mut self) {
        self.move_direction = None;
        let at_origin = self
            .path_origin
            .is_some_and(|origin| Coord::from(origin) == self.position);
        if at_origin {
            self.abort_movement();
        } else if self.is_moving() {
            if let Some(next) = self.path.next() {
                self.path = Path::single(next);
                self.pathfinding = None;
            } else {
                self.stop_moving();
                self.cancel_path();
            }
        } else {
            self.stop_moving();
            self.cancel_path();
        }
    }

    /// Stops and returns to the tile the current step started from.
    pub fn abort_movement(&mut self) {
        if let Some(origin) = self.path_origin {
            self.position = origin.into();
        }
        self.move_direction = None;
        self.stop_moving();
        self.cancel_path();
    }

    /// Places the mover on a tile, dropping any movement.
    pub fn teleport(&mut self, tile: Position) {
        self.stop_moving();
        self.cancel_path();
        self.move_direction = None;
        self.position = tile.into();
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    /// Advances the mover by `dt` seconds.
    pub fn update(&mut self, dt: f32, grid: &dyn Passability) -> Vec<MovementEvent> {
        let mut events = Vec::new();
        self.position.x += self.velocity.x * dt;
        self.position.y += self.velocity.y * dt;

        if self.path.is_empty() {
            if let Some(destination) = self.pathfinding {
                self.pathfind(destination, grid, &mut events);
            }
        }

        if !self.path.is_empty() {
            if self.path_origin.is_some() {
                self.check_waypoint(grid, &mut events);
            } else {
                self.next_waypoint(grid, &mut events);
            }
        }

        if let Some(direction) = self.move_direction {
            if !self.path.is_empty() && !self.is_moving() {
                self.cancel_path();
            }
            if self.path.is_empty() && self.move_one_tile(direction, grid) {
                self.next_waypoint(grid, &mut events);
            }
        }

        if self.path.is_empty() {
            self.cancel_movement();
        }
        events
    }

    fn stop_moving(&mut self) {
        self.velocity = Coord::default();
    }

    fn valid_movement(&self, target: Position, grid: &dyn Passability) -> bool {
        self.ignore_collisions || grid.get_exits(self.tile()).contains(&target)
    }

    /// Starts the step toward the next tile of the path.
    fn next_waypoint(&mut self, grid: &dyn Passability, events: &mut Vec<MovementEvent>) {
        let Some(target) = self.path.next() else {
            return;
        };
        let here = self.tile();
        let direction = Direction::between(here, target);
        if let Some(direction) = direction {
            self.facing = direction;
        }

        if direction.is_none() || self.valid_movement(target, grid) {
            self.path_origin = Some(here);
            let (dx, dy) = direction.map(Direction::delta).unwrap_or((0, 0));
            let rate = self.move_rate();
            self.velocity = Coord::new(dx as f32 * rate, dy as f32 * rate);
            return;
        }

        self.stop_moving();
        events.push(MovementEvent::Blocked { tile: target });
        if let Some(destination) = self.pathfinding {
            error!(%destination, "waypoint blocked, finding new path");
            self.path.clear();
            self.pathfind(destination, grid, events);
        }
    }

    /// Snaps onto the waypoint once the distance covered reaches the step length.
    fn check_waypoint(&mut self, grid: &dyn Passability, events: &mut Vec<MovementEvent>) {
        let (Some(target), Some(origin)) = (self.path.next(), self.path_origin) else {
            return;
        };
        let expected = Coord::from(origin).distance(target.into());
        let traveled = self.position.distance(origin.into());
        if traveled < expected {
            return;
        }

        self.position = target.into();
        self.path.pop();
        self.path_origin = None;
        debug!(tile = %target, "arrived at waypoint");
        events.push(MovementEvent::Arrived { tile: target });

        let forced = grid.region(target).and_then(|region| region.forced_exit());
        if let Some(direction) = forced {
            self.path.clear();
            self.move_one_tile(direction, grid);
        }
        if !self.path.is_empty() {
            self.next_waypoint(grid, events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{CollisionMap, RegionProperties};
    use crate::state::DirectionSet;

    fn run(
        mover: &mut Mover,
        grid: &dyn Passability,
        ticks: usize,
        dt: f32,
    ) -> Vec<MovementEvent> {
        (0..ticks).flat_map(|_| mover.update(dt, grid)).collect()
    }

    #[test]
    fn single_step_arrives_and_stops() {
        let grid = CollisionMap::with_bounds(5, 5);
        let mut mover = Mover::new(Position::new(1, 1)).with_rates(4.0, 8.0);
        assert!(mover.move_one_tile(Direction::Right, &grid));

        let events = run(&mut mover, &grid, 10, 0.1);
        assert_eq!(
            events,
            vec![MovementEvent::Arrived {
                tile: Position::new(2, 1)
            }]
        );
        assert_eq!(mover.tile(), Position::new(2, 1));
        assert_eq!(mover.position(), Coord::new(2.0, 1.0));
        assert!(!mover.is_moving());
        assert_eq!(mover.state(), MovementState::Idle);
        assert_eq!(mover.facing(), Direction::Right);
    }

    #[test]
    fn blocked_step_only_turns() {
        let mut grid = CollisionMap::with_bounds(5, 5);
        grid.set_blocked(Position::new(1, 0));
        let mut mover = Mover::new(Position::new(1, 1));

        assert!(!mover.move_one_tile(Direction::Up, &grid));
        assert_eq!(mover.facing(), Direction::Up);
        assert!(mover.path().is_empty());
    }

    #[test]
    fn running_covers_path_faster() {
        let grid = CollisionMap::with_bounds(10, 1);
        let mut walker = Mover::new(Position::ORIGIN).with_rates(2.0, 4.0);
        let mut runner = walker.clone();
        runner.set_running(true);
        let mut sink = Vec::new();
        walker.pathfind(Position::new(4, 0), &grid, &mut sink);
        runner.pathfind(Position::new(4, 0), &grid, &mut sink);

        run(&mut walker, &grid, 10, 0.1);
        run(&mut runner, &grid, 10, 0.1);
        assert!(runner.tile().x > walker.tile().x);

        run(&mut runner, &grid, 20, 0.1);
        assert_eq!(runner.tile(), Position::new(4, 0));
        assert!(!runner.is_moving());
    }

    #[test]
    fn pathfind_reports_each_arrival_in_order() {
        let grid = CollisionMap::with_bounds(4, 4);
        let mut mover = Mover::new(Position::ORIGIN).with_rates(10.0, 10.0);
        let mut sink = Vec::new();
        assert!(mover.pathfind(Position::new(0, 3), &grid, &mut sink));
        assert_eq!(mover.state(), MovementState::InTransit);

        let arrived: Vec<_> = run(&mut mover, &grid, 40, 0.05)
            .into_iter()
            .filter_map(|event| match event {
                MovementEvent::Arrived { tile } => Some(tile),
                _ => None,
            })
            .collect();
        assert_eq!(
            arrived,
            vec![Position::new(0, 1), Position::new(0, 2), Position::new(0, 3)]
        );
    }

    #[test]
    fn unreachable_target_reports_failure() {
        let mut grid = CollisionMap::with_bounds(3, 3);
        grid.set_blocked(Position::new(2, 2));
        let mut mover = Mover::new(Position::ORIGIN);
        let mut events = Vec::new();

        assert!(!mover.pathfind(Position::new(2, 2), &grid, &mut events));
        assert_eq!(
            events,
            vec![MovementEvent::PathFailed {
                destination: Position::new(2, 2)
            }]
        );
        assert_eq!(mover.pathfinding_target(), None);
    }

    #[test]
    fn endure_tile_carries_mover_onward() {
        let mut grid = CollisionMap::with_bounds(5, 1);
        let mut ice = RegionProperties::open();
        ice.endure = DirectionSet::RIGHT;
        grid.set_region(Position::new(1, 0), ice);

        let mut mover = Mover::new(Position::ORIGIN).with_rates(10.0, 10.0);
        mover.move_one_tile(Direction::Right, &grid);
        run(&mut mover, &grid, 20, 0.05);
        assert_eq!(mover.tile(), Position::new(2, 0));
    }

    #[test]
    fn abort_returns_to_step_origin() {
        let grid = CollisionMap::with_bounds(5, 5);
        let mut mover = Mover::new(Position::new(2, 2)).with_rates(2.0, 2.0);
        mover.move_one_tile(Direction::Down, &grid);
        mover.update(0.1, &grid);
        assert!(mover.is_moving());

        mover.abort_movement();
        assert_eq!(mover.position(), Coord::new(2.0, 2.0));
        assert_eq!(mover.state(), MovementState::Idle);
    }

    #[test]
    fn animation_follows_facing_and_motion() {
        let grid = CollisionMap::with_bounds(5, 5);
        let mut mover = Mover::new(Position::new(2, 2));
        assert_eq!(mover.animation_name(), "front");
        mover.move_one_tile(Direction::Up, &grid);
        mover.update(0.01, &grid);
        assert_eq!(mover.animation_name(), "back_walk");
    }
}
