//! Multi-source, multi-target path search over a cell grid.
//!
//! All searches work on a private copy of the caller's grid, marking cells `Visited` (and
//! `NextVisit` once queued) as they go so that a progress callback can render the search live.
//! A cell can be stepped onto if it is a `Channel` or an `End`; sources are entered whatever
//! their kind.
//!
//! A search stops at whichever comes first: `max_paths` paths recorded, `max_steps` cells
//! visited, or nothing left to visit. Running out of budget is not an error, it just yields an
//! empty or short list of paths. Invalid input (no sources or targets, coordinates outside the
//! grid) is an `Err`.
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::hash::BuildHasher;

use log::debug;

use crate::cells::{CellKind, CompassPrimary, Coordinate};
use crate::errors::*;
use crate::grid::{report_progress, Grid, Progress};
use crate::units::{MaxPaths, MaxSteps};
use crate::utils::{self, FnvHashSet};

/// Cells from a source to a target, both included.
pub type Path = Vec<Coordinate>;

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum SearchAlgorithm {
    BreadthFirst,
    DepthFirst,
    /// Best-first search ordered purely by the Manhattan distance to the nearest target.
    GreedyBestFirst,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct SearchLimits {
    pub max_steps: MaxSteps,
    pub max_paths: MaxPaths,
}

impl SearchLimits {
    pub fn new(max_steps: MaxSteps, max_paths: MaxPaths) -> SearchLimits {
        SearchLimits { max_steps, max_paths }
    }

    /// Default budget for an algorithm: one path, within 20000 steps for breadth-first search and
    /// 50000 for the others.
    pub fn for_algorithm(algorithm: SearchAlgorithm) -> SearchLimits {
        let steps = match algorithm {
            SearchAlgorithm::BreadthFirst => 20_000,
            SearchAlgorithm::DepthFirst | SearchAlgorithm::GreedyBestFirst => 50_000,
        };
        SearchLimits::new(MaxSteps(steps), MaxPaths(1))
    }

    #[inline]
    fn spent(&self, steps: usize, paths: usize) -> bool {
        paths >= self.max_paths.0 || steps >= self.max_steps.0
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.max_paths.0 == 0 || self.max_steps.0 == 0
    }
}

pub fn search(algorithm: SearchAlgorithm,
              grid: &Grid,
              sources: &[Coordinate],
              targets: &[Coordinate],
              limits: SearchLimits,
              progress: Progress)
              -> Result<Vec<Path>> {
    match algorithm {
        SearchAlgorithm::BreadthFirst => breadth_first(grid, sources, targets, limits, progress),
        SearchAlgorithm::DepthFirst => depth_first(grid, sources, targets, limits, progress),
        SearchAlgorithm::GreedyBestFirst => greedy_best_first(grid, sources, targets, limits, progress),
    }
}

/// Breadth-first search. Each path found is a shortest path (by step count) to the first
/// reached instance of its target.
pub fn breadth_first(grid: &Grid,
                     sources: &[Coordinate],
                     targets: &[Coordinate],
                     limits: SearchLimits,
                     progress: Progress)
                     -> Result<Vec<Path>> {
    let frontier = FifoFrontier(VecDeque::with_capacity(grid.size()));
    frontier_search(grid, sources, targets, limits, progress, frontier)
}

/// Greedy best-first search, always expanding the queued cell closest to any target.
///
/// This is the search exposed to users as "A*", but the priority is only the Manhattan distance
/// to the nearest target with no cost-so-far term, so the paths it finds are not guaranteed to
/// be shortest.
pub fn greedy_best_first(grid: &Grid,
                         sources: &[Coordinate],
                         targets: &[Coordinate],
                         limits: SearchLimits,
                         progress: Progress)
                         -> Result<Vec<Path>> {
    let frontier = NearestTargetFrontier {
        heap: BinaryHeap::with_capacity(grid.size()),
        targets,
    };
    frontier_search(grid, sources, targets, limits, progress, frontier)
}

/// The pending cells of a breadth-first style search.
trait Frontier {
    fn push(&mut self, coord: Coordinate);
    fn pop(&mut self) -> Option<Coordinate>;

    fn seed(&mut self, source: Coordinate) {
        self.push(source);
    }
}

struct FifoFrontier(VecDeque<Coordinate>);

impl Frontier for FifoFrontier {
    fn push(&mut self, coord: Coordinate) {
        self.0.push_back(coord);
    }

    fn pop(&mut self) -> Option<Coordinate> {
        self.0.pop_front()
    }
}

// Equal distances pop in coordinate order.
struct NearestTargetFrontier<'t> {
    heap: BinaryHeap<Reverse<(usize, Coordinate)>>,
    targets: &'t [Coordinate],
}

impl<'t> Frontier for NearestTargetFrontier<'t> {
    fn push(&mut self, coord: Coordinate) {
        let distance = nearest_target_distance(coord, self.targets);
        self.heap.push(Reverse((distance, coord)));
    }

    fn pop(&mut self) -> Option<Coordinate> {
        self.heap.pop().map(|Reverse((_, coord))| coord)
    }

    fn seed(&mut self, source: Coordinate) {
        self.heap.push(Reverse((0, source)));
    }
}

fn nearest_target_distance(coord: Coordinate, targets: &[Coordinate]) -> usize {
    targets.iter()
        .map(|target| coord.manhattan_distance(*target))
        .min()
        .unwrap_or(0)
}

fn frontier_search<F: Frontier>(grid: &Grid,
                                sources: &[Coordinate],
                                targets: &[Coordinate],
                                limits: SearchLimits,
                                mut progress: Progress,
                                mut frontier: F)
                                -> Result<Vec<Path>> {
    grid.check_coordinates(sources, "source")?;
    grid.check_coordinates(targets, "target")?;
    if limits.is_zero() {
        return Ok(vec![]);
    }

    let mut cells = grid.clone();
    let source_cells = utils::fnv_hashset_of(sources);
    let target_cells = utils::fnv_hashset_of(targets);
    let mut predecessors = utils::fnv_hashmap(cells.size());
    let mut paths = vec![];
    let mut steps = 0;

    for source in sources {
        frontier.seed(*source);
    }

    while let Some(current) = frontier.pop() {
        steps += 1;
        cells.put(current, CellKind::Visited);
        report_progress(&mut progress, &cells);

        // Targets stay live after a hit, another route may reach them again.
        if target_cells.contains(&current) {
            paths.push(backtrace(&predecessors, &source_cells, current));
        } else {
            for next in cells.neighbours(current) {
                if cells.kind_at(next).is_traversable() {
                    // Claim it now so it is queued only once.
                    cells.put(next, CellKind::NextVisit);
                    predecessors.entry(next).or_insert(current);
                    frontier.push(next);
                }
            }
        }

        if limits.spent(steps, paths.len()) {
            break;
        }
    }

    debug!("Search took {} steps and found {} paths", steps, paths.len());
    Ok(paths)
}

/// Rebuild the path to `hit` by following predecessor links back to any source.
///
/// A hit on a source cell is the single cell path `[hit]`.
pub fn backtrace<S, T>(predecessors: &HashMap<Coordinate, Coordinate, S>,
                       sources: &HashSet<Coordinate, T>,
                       hit: Coordinate)
                       -> Path
    where S: BuildHasher,
          T: BuildHasher
{
    let mut path = vec![hit];
    let mut current = hit;
    while !sources.contains(&current) {
        match predecessors.get(&current) {
            Some(&previous) => {
                path.push(previous);
                current = previous;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug)]
struct SearchFrame {
    coord: Coordinate,
    prior: CellKind,
    next_direction: usize,
}

/// Recover the route a player walked by hand: the shortest way from a start to an end that only
/// steps on `Visited`, `Start` and `End` cells. `None` if the walk does not join them.
pub fn retrace_walked_route(grid: &Grid) -> Result<Option<Path>> {
    let route = grid.walked_route();
    let paths = breadth_first(&route,
                              &grid.starts(),
                              &grid.ends(),
                              SearchLimits::for_algorithm(SearchAlgorithm::BreadthFirst),
                              None)?;
    Ok(paths.into_iter().next())
}

/// Depth-first search, trying neighbours up, down, left, right.
///
/// Cells are only marked `Visited` while they are on the active branch; backing out of a cell
/// restores its previous kind, so different branches may pass through the same cell. This can
/// find several distinct paths to one target but the paths are not shortest.
pub fn depth_first(grid: &Grid,
                   sources: &[Coordinate],
                   targets: &[Coordinate],
                   limits: SearchLimits,
                   mut progress: Progress)
                   -> Result<Vec<Path>> {
    grid.check_coordinates(sources, "source")?;
    grid.check_coordinates(targets, "target")?;
    if limits.is_zero() {
        return Ok(vec![]);
    }

    let mut run = DepthFirstRun {
        cells: grid.clone(),
        targets: utils::fnv_hashset_of(targets),
        limits,
        steps: 0,
        paths: vec![],
        active: Vec::with_capacity(grid.size()),
        stack: Vec::with_capacity(grid.size()),
    };

    for source in sources {
        if !run.explore_from(*source, &mut progress) {
            break;
        }
    }

    debug!("Depth-first search took {} steps and found {} paths", run.steps, run.paths.len());
    Ok(run.paths)
}

struct DepthFirstRun {
    cells: Grid,
    targets: FnvHashSet<Coordinate>,
    limits: SearchLimits,
    steps: usize,
    paths: Vec<Path>,
    active: Path,
    stack: Vec<SearchFrame>,
}

impl DepthFirstRun {
    /// Walk every branch from `source`. Returns false once the budget is spent.
    fn explore_from(&mut self, source: Coordinate, progress: &mut Progress) -> bool {
        if !self.enter(source, progress) {
            return false;
        }

        while let Some(frame) = self.stack.last_mut() {
            if frame.next_direction == CompassPrimary::ALL.len() {
                let SearchFrame { coord, prior, .. } = *frame;
                self.stack.pop();
                self.leave(coord, prior);
                continue;
            }
            let dir = CompassPrimary::ALL[frame.next_direction];
            frame.next_direction += 1;
            let from = frame.coord;

            let next = self.cells
                .neighbour_at_direction(from, dir, 1)
                .filter(|n| self.cells.kind_at(*n).is_traversable());
            if let Some(next) = next {
                if !self.enter(next, progress) {
                    return false;
                }
            }
        }
        true
    }

    fn enter(&mut self, coord: Coordinate, progress: &mut Progress) -> bool {
        let prior = self.cells.kind_at(coord);
        self.cells.put(coord, CellKind::Visited);
        self.steps += 1;
        self.active.push(coord);

        if self.limits.spent(self.steps, self.paths.len()) {
            return false;
        }
        report_progress(progress, &self.cells);

        if self.targets.contains(&coord) {
            self.paths.push(self.active.clone());
            self.leave(coord, prior);
        } else {
            self.stack.push(SearchFrame {
                coord,
                prior,
                next_direction: 0,
            });
        }
        true
    }

    fn leave(&mut self, coord: Coordinate, prior: CellKind) {
        self.active.pop();
        self.cells.put(coord, prior);
    }
}
