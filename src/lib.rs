//! **mazes** generates cell grid mazes and searches them for routes between start and end cells.
//!
//! A maze is a [`grid::Grid`] of [`cells::CellKind`]s. Mazes are carved by the
//! [`generators`], searched by the [`pathing`] algorithms and persisted with [`snapshots`].

pub mod cells;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod patching;
pub mod pathing;
pub mod snapshots;
pub mod units;
mod utils;
