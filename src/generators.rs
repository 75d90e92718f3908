use bit_set::BitSet;
use log::debug;
use rand::seq::SliceRandom;
use rand::{self, Rng};

use crate::cells::{CellKind, Coordinate};
use crate::errors::*;
use crate::grid::{report_progress, CoordinateSmallVec, Grid, Progress};
use crate::patching::connect_to_channels;
use crate::units::{ColumnsCount, RowsCount};
use crate::utils::{self, FnvHashSet};

/// Carving moves two cells at a time so that corridors stay separated by a one cell wall lattice.
const CARVE_STRIDE: usize = 2;

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum MazeAlgorithm {
    DepthFirst,
    RandomGrowth,
}

/// Generate a new maze grid with the thread local random number generator.
pub fn generate(algorithm: MazeAlgorithm,
                rows: RowsCount,
                columns: ColumnsCount,
                starts: &[Coordinate],
                ends: &[Coordinate],
                progress: Progress)
                -> Result<Grid> {
    let mut rng = rand::thread_rng();
    match algorithm {
        MazeAlgorithm::DepthFirst => depth_first(&mut rng, rows, columns, starts, ends, progress),
        MazeAlgorithm::RandomGrowth => random_growth(&mut rng, rows, columns, starts, ends, progress),
    }
}

struct CarveFrame {
    coord: Coordinate,
    candidates: CoordinateSmallVec,
    next: usize,
}

/// Depth-first (recursive backtracker) maze carving.
///
/// Starting from a walled grid and the first start cell: carve the current cell, then try the
/// cells two steps away in a random order. A candidate is taken if it is unvisited and still has
/// a wall beside it; the single cell between the two is carved and carving continues from the
/// candidate. When a branch runs out of candidates it backs up to the previous cell. End cells
/// are carved but never branched out of.
///
/// The result has one dominant path with little branching. Start and end cells that the lattice
/// did not reach are then patched onto it, and finally all starts and ends are stamped.
///
/// The backtracking uses an explicit stack sized to the grid area, so large grids do not
/// depend on the call stack depth.
pub fn depth_first<R: Rng>(rng: &mut R,
                           rows: RowsCount,
                           columns: ColumnsCount,
                           starts: &[Coordinate],
                           ends: &[Coordinate],
                           mut progress: Progress)
                           -> Result<Grid> {
    let mut grid = walled_grid(rows, columns, starts, ends)?;
    let end_cells = utils::fnv_hashset_of(ends);
    let mut visited = BitSet::with_capacity(grid.size());
    let mut stack: Vec<CarveFrame> = Vec::with_capacity(grid.size());

    let first_frame = carve_into(&mut grid, &mut visited, &end_cells, starts[0], rng, &mut progress);
    stack.extend(first_frame);

    while let Some(frame) = stack.last_mut() {
        if frame.next >= frame.candidates.len() {
            stack.pop();
            continue;
        }
        let current = frame.coord;
        let candidate = frame.candidates[frame.next];
        frame.next += 1;

        if visited.contains(cell_index(&grid, candidate)) ||
           grid.count_neighbours_of_kind(candidate, CellKind::Wall) == 0 {
            continue;
        }

        let between = current.midpoint(candidate);
        grid.put(between, CellKind::Channel);
        visited.insert(cell_index(&grid, between));

        let next_frame = carve_into(&mut grid, &mut visited, &end_cells, candidate, rng, &mut progress);
        stack.extend(next_frame);
    }
    debug!("Depth-first carving of {}X{} visited {} cells", rows.0, columns.0, visited.len());

    // Starts and ends off the first start's lattice parity are not reachable yet.
    let mut unreached = starts[1..].to_vec();
    unreached.extend_from_slice(ends);
    connect_to_channels(&mut grid, &unreached, rng);

    stamp_starts_and_ends(&mut grid, starts, ends);
    Ok(grid)
}

fn carve_into<R: Rng>(grid: &mut Grid,
                      visited: &mut BitSet,
                      end_cells: &FnvHashSet<Coordinate>,
                      coord: Coordinate,
                      rng: &mut R,
                      progress: &mut Progress)
                      -> Option<CarveFrame> {
    visited.insert(cell_index(grid, coord));
    grid.put(coord, CellKind::Channel);
    report_progress(progress, grid);

    // Goal cells are reached but not widened any further.
    if end_cells.contains(&coord) {
        return None;
    }

    let mut candidates = grid.neighbours_at_distance(coord, CARVE_STRIDE);
    candidates.shuffle(rng);
    Some(CarveFrame {
        coord,
        candidates,
        next: 0,
    })
}

/// Randomized growth (Prim style) maze carving.
///
/// A work list is seeded with every start cell. Each round removes an entry chosen uniformly at
/// random rather than the newest or oldest one, which is what gives the maze many organic
/// branches instead of a single main path. An entry whose cell no longer has any wall beside it
/// is dropped, as carving it would only rejoin existing corridors and make a loop. Otherwise the
/// cell is carved together with the cell between it and the cell that queued it, and its still
/// walled cells two steps away are queued. A cell is only ever queued once.
///
/// Every carved cell is joined to a start by construction, so only the end cells are patched
/// before the starts and ends are stamped.
pub fn random_growth<R: Rng>(rng: &mut R,
                             rows: RowsCount,
                             columns: ColumnsCount,
                             starts: &[Coordinate],
                             ends: &[Coordinate],
                             mut progress: Progress)
                             -> Result<Grid> {
    let mut grid = walled_grid(rows, columns, starts, ends)?;
    let mut queued = BitSet::with_capacity(grid.size());
    let mut work: Vec<(Coordinate, Option<Coordinate>)> = starts.iter().map(|s| (*s, None)).collect();
    let mut carved = 0;

    while !work.is_empty() {
        let pick = rng.gen_range(0..work.len());
        let (current, predecessor) = work.swap_remove(pick);

        if grid.count_neighbours_of_kind(current, CellKind::Wall) == 0 {
            continue;
        }
        grid.put(current, CellKind::Channel);
        queued.insert(cell_index(&grid, current));
        if let Some(previous) = predecessor {
            grid.put(previous.midpoint(current), CellKind::Channel);
        }
        carved += 1;
        report_progress(&mut progress, &grid);

        for next in grid.neighbours_at_distance(current, CARVE_STRIDE) {
            let index = cell_index(&grid, next);
            if grid.kind_at(next) == CellKind::Wall && !queued.contains(index) {
                work.push((next, Some(current)));
                queued.insert(index);
            }
        }
    }
    debug!("Random growth carving of {}X{} carved {} lattice cells", rows.0, columns.0, carved);

    connect_to_channels(&mut grid, ends, rng);

    stamp_starts_and_ends(&mut grid, starts, ends);
    Ok(grid)
}

fn walled_grid(rows: RowsCount,
               columns: ColumnsCount,
               starts: &[Coordinate],
               ends: &[Coordinate])
               -> Result<Grid> {
    let grid = Grid::new(rows, columns, CellKind::Wall)?;
    grid.check_coordinates(starts, "start")?;
    grid.check_coordinates(ends, "end")?;
    Ok(grid)
}

fn stamp_starts_and_ends(grid: &mut Grid, starts: &[Coordinate], ends: &[Coordinate]) {
    for start in starts {
        grid.put(*start, CellKind::Start);
    }
    for end in ends {
        grid.put(*end, CellKind::End);
    }
}

#[inline]
fn cell_index(grid: &Grid, coord: Coordinate) -> usize {
    coord.row * grid.columns().0 + coord.col
}


#[cfg(test)]
mod tests {

    use std::collections::VecDeque;

    use quickcheck::{quickcheck, TestResult};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::pathing::{self, SearchLimits};

    type Generator = fn(&mut StdRng, RowsCount, ColumnsCount, &[Coordinate], &[Coordinate], Progress)
                        -> Result<Grid>;
    const GENERATORS: [Generator; 2] = [depth_first, random_growth];

    fn gc(row: usize, col: usize) -> Coordinate {
        Coordinate::new(row, col)
    }

    fn is_open(kind: CellKind) -> bool {
        kind == CellKind::Channel || kind == CellKind::Start || kind == CellKind::End
    }

    // Every open cell reachable from `from` by orthogonal steps over open cells.
    fn flood_fill(grid: &Grid, from: Coordinate) -> Vec<Coordinate> {
        let mut seen = vec![false; grid.size()];
        let mut queue = VecDeque::new();
        let mut reached = vec![];
        seen[cell_index(grid, from)] = true;
        queue.push_back(from);
        while let Some(cell) = queue.pop_front() {
            reached.push(cell);
            for n in grid.neighbours(cell) {
                let index = cell_index(grid, n);
                if !seen[index] && is_open(grid.kind_at(n)) {
                    seen[index] = true;
                    queue.push_back(n);
                }
            }
        }
        reached
    }

    fn open_cells(grid: &Grid) -> Vec<Coordinate> {
        grid.iter().filter(|c| is_open(grid.kind_at(*c))).collect()
    }

    #[test]
    fn invalid_input_is_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        for generator in GENERATORS.iter() {
            assert!(generator(&mut rng, RowsCount(3), ColumnsCount(3), &[], &[gc(2, 2)], None).is_err());
            assert!(generator(&mut rng, RowsCount(3), ColumnsCount(3), &[gc(0, 0)], &[], None).is_err());
            assert!(generator(&mut rng, RowsCount(3), ColumnsCount(3), &[gc(0, 0)], &[gc(3, 0)], None).is_err());
            assert!(generator(&mut rng, RowsCount(3), ColumnsCount(3), &[gc(0, 9)], &[gc(2, 2)], None).is_err());
            assert!(generator(&mut rng, RowsCount(0), ColumnsCount(3), &[gc(0, 0)], &[gc(0, 0)], None).is_err());
        }
    }

    #[test]
    fn small_depth_first_maze_is_solvable() {
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let g = depth_first(&mut rng, RowsCount(3), ColumnsCount(3), &[gc(0, 0)], &[gc(2, 2)], None)
                .unwrap();
            assert_eq!(g.starts(), vec![gc(0, 0)]);
            assert_eq!(g.ends(), vec![gc(2, 2)]);
            let paths = pathing::breadth_first(&g,
                                               &[gc(0, 0)],
                                               &[gc(2, 2)],
                                               SearchLimits::for_algorithm(pathing::SearchAlgorithm::BreadthFirst),
                                               None)
                .unwrap();
            assert!(!paths.is_empty());
        }
    }

    #[test]
    fn small_random_growth_maze_is_solvable() {
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let g = random_growth(&mut rng, RowsCount(3), ColumnsCount(3), &[gc(0, 0)], &[gc(2, 2)], None)
                .unwrap();
            assert_eq!(g.starts(), vec![gc(0, 0)]);
            assert_eq!(g.ends(), vec![gc(2, 2)]);
            let paths = pathing::greedy_best_first(&g,
                                                   &[gc(0, 0)],
                                                   &[gc(2, 2)],
                                                   SearchLimits::for_algorithm(pathing::SearchAlgorithm::GreedyBestFirst),
                                                   None)
                .unwrap();
            assert!(!paths.is_empty());
        }
    }

    #[test]
    fn first_progress_frame_is_the_first_start() {
        let mut frames = vec![];
        {
            let mut record = |g: &Grid| frames.push(g.to_string());
            let mut rng = StdRng::seed_from_u64(11);
            depth_first(&mut rng, RowsCount(3), ColumnsCount(3), &[gc(0, 0)], &[gc(2, 2)], Some(&mut record))
                .unwrap();
        }
        assert!(frames.len() >= 2);
        assert_eq!(frames[0], "3X3:\nC W W\nW W W\nW W W");
    }

    #[test]
    fn random_growth_reports_every_carved_cell() {
        let mut frames = 0;
        {
            let mut count = |_: &Grid| frames += 1;
            let mut rng = StdRng::seed_from_u64(5);
            random_growth(&mut rng, RowsCount(7), ColumnsCount(7), &[gc(0, 0)], &[gc(6, 6)], Some(&mut count))
                .unwrap();
        }
        // The 4x4 lattice of even cells.
        assert_eq!(frames, 16);
    }

    #[test]
    fn carving_on_an_odd_grid_makes_a_spanning_tree() {
        // A 7x7 grid holds a 4x4 lattice of even cells. A spanning tree over it carves those 16
        // cells plus 15 connecting cells, and both corners lie on the lattice so no patch runs.
        for generator in GENERATORS.iter() {
            for seed in 0..10 {
                let mut rng = StdRng::seed_from_u64(seed);
                let g = generator(&mut rng, RowsCount(7), ColumnsCount(7), &[gc(0, 0)], &[gc(6, 6)], None)
                    .unwrap();
                assert_eq!(open_cells(&g).len(), 31);
                for coord in g.iter().filter(|c| c.row % 2 == 0 && c.col % 2 == 0) {
                    assert!(is_open(g.kind_at(coord)), "{} should be carved in\n{}", coord, g);
                }
                for coord in g.iter().filter(|c| c.row % 2 == 1 && c.col % 2 == 1) {
                    assert_eq!(g.kind_at(coord), CellKind::Wall);
                }
            }
        }
    }

    #[test]
    fn depth_first_stops_at_an_end_in_a_corridor() {
        for seed in 0..10 {
            let mut frames = vec![];
            let g = {
                let mut record = |g: &Grid| frames.push(g.to_string());
                let mut rng = StdRng::seed_from_u64(seed);
                depth_first(&mut rng, RowsCount(1), ColumnsCount(7), &[gc(0, 0)], &[gc(0, 2)], Some(&mut record))
                    .unwrap()
            };
            assert_eq!(frames, vec!["1X7:\nC W W W W W W", "1X7:\nC C C W W W W"]);
            assert_eq!(g.to_string(), "1X7:\nS C E W W W W");
        }
    }

    #[test]
    fn depth_first_end_on_the_lattice_is_a_leaf() {
        // Every neighbour of (0, 2) is a connecting cell, one per tree edge touching the end.
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let g = depth_first(&mut rng, RowsCount(5), ColumnsCount(5), &[gc(0, 0)], &[gc(0, 2)], None)
                .unwrap();
            let open = g.neighbours(gc(0, 2))
                .into_iter()
                .filter(|n| is_open(g.kind_at(*n)))
                .count();
            assert_eq!(open, 1, "end branched out in\n{}", g);
        }
    }

    #[test]
    fn odd_parity_end_is_patched_on() {
        for generator in GENERATORS.iter() {
            for seed in 0..10 {
                let mut rng = StdRng::seed_from_u64(seed);
                let g = generator(&mut rng, RowsCount(6), ColumnsCount(6), &[gc(0, 0)], &[gc(5, 5)], None)
                    .unwrap();
                assert!(flood_fill(&g, gc(0, 0)).contains(&gc(5, 5)), "unreachable end in\n{}", g);
            }
        }
    }

    #[test]
    fn extra_starts_are_stamped_and_reachable() {
        let starts = [gc(0, 0), gc(3, 4)];
        let ends = [gc(6, 6)];
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let g = depth_first(&mut rng, RowsCount(7), ColumnsCount(7), &starts, &ends, None).unwrap();
            assert_eq!(g.starts(), starts.to_vec());
            assert_eq!(g.ends(), ends.to_vec());
            let reached = flood_fill(&g, gc(0, 0));
            assert!(reached.contains(&gc(3, 4)));
            assert!(reached.contains(&gc(6, 6)));
        }
    }

    #[test]
    fn single_cell_grid() {
        let mut rng = StdRng::seed_from_u64(0);
        for generator in GENERATORS.iter() {
            let g = generator(&mut rng, RowsCount(1), ColumnsCount(1), &[gc(0, 0)], &[gc(0, 0)], None)
                .unwrap();
            assert_eq!(g.to_string(), "1X1:\nE");
        }
    }

    #[test]
    fn generate_dispatches() {
        for algorithm in &[MazeAlgorithm::DepthFirst, MazeAlgorithm::RandomGrowth] {
            let g = generate(*algorithm, RowsCount(9), ColumnsCount(11), &[gc(0, 0)], &[gc(8, 10)], None)
                .unwrap();
            assert_eq!(g.rows(), RowsCount(9));
            assert_eq!(g.columns(), ColumnsCount(11));
            assert_eq!(g.starts(), vec![gc(0, 0)]);
            assert_eq!(g.ends(), vec![gc(8, 10)]);
        }
    }

    #[test]
    fn quickcheck_every_open_cell_is_reachable_from_the_start() {
        fn p(seed: u64, rows: u8, columns: u8, start: (u8, u8), end: (u8, u8), growth: bool) -> TestResult {
            let rows = rows as usize % 15 + 2;
            let columns = columns as usize % 15 + 2;
            let start = gc(start.0 as usize % rows, start.1 as usize % columns);
            let end = gc(end.0 as usize % rows, end.1 as usize % columns);
            if start == end {
                return TestResult::discard();
            }

            let mut rng = StdRng::seed_from_u64(seed);
            let generator: Generator = if growth { random_growth } else { depth_first };
            let g = generator(&mut rng, RowsCount(rows), ColumnsCount(columns), &[start], &[end], None)
                .unwrap();

            let mut reached = flood_fill(&g, start);
            reached.sort();
            TestResult::from_bool(reached == open_cells(&g))
        }
        quickcheck(p as fn(u64, u8, u8, (u8, u8), (u8, u8), bool) -> TestResult)
    }
}
