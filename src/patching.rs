use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::cells::{CellKind, Coordinate};
use crate::grid::{CoordinateSmallVec, Grid};

/// Make sure every target touches the corridor network.
///
/// Carving on a distance 2 lattice cannot reach cells of the other parity, so a declared start
/// or end cell can be left boxed in by walls. For each target with no `Channel` neighbour one of
/// its neighbours that does touch a `Channel` is picked at random and carved, which may leave a
/// one cell dead end stub.
pub fn connect_to_channels<R: Rng>(grid: &mut Grid, targets: &[Coordinate], rng: &mut R) {
    for &target in targets {
        if grid.count_neighbours_of_kind(target, CellKind::Channel) > 0 {
            continue;
        }

        let candidates = grid.neighbours(target)
            .into_iter()
            .filter(|n| grid.count_neighbours_of_kind(*n, CellKind::Channel) >= 1)
            .collect::<CoordinateSmallVec>();

        if let Some(&link) = candidates.choose(rng) {
            grid.put(link, CellKind::Channel);
        } else {
            warn!("Unable to connect {} to any channel", target);
        }
    }
}
