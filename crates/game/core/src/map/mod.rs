//! Map collision model and pathfinding.
pub mod grid;
pub mod pathfind;

pub use grid::{CollisionMap, MapBounds, Passability, RegionProperties, SearchArea, TileCollision};
pub use pathfind::{Path, find_path};
