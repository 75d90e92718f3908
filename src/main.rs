use docopt::Docopt;
use serde_derive::Deserialize;
use mazes::{
    cells::{CellKind, Coordinate},
    generators::{self, MazeAlgorithm},
    grid::{Grid, Progress},
    pathing::{self, SearchAlgorithm, SearchLimits},
    snapshots,
    units::{ColumnsCount, MaxPaths, MaxSteps, RowsCount},
};

const USAGE: &str = "Maze Search

Usage:
    maze_search_driver -h | --help
    maze_search_driver generate (depth-first|random-growth) [--rows=<r> --columns=<c>] [--start-row=<sr> --start-column=<sc>] [--end-row=<er> --end-column=<ec>] [--text-out=<path>] [--binary-out=<path>] [--show-progress]
    maze_search_driver solve (bfs|dfs|greedy) <map> [--binary] [--max-steps=<n>] [--max-paths=<n>] [--show-progress]
    maze_search_driver check <map> [--binary]
    maze_search_driver walk <map> [--binary]

Options:
    -h --help              Show this screen.
    --rows=<r>             Number of rows in the maze [default: 21].
    --columns=<c>          Number of columns in the maze [default: 21].
    --start-row=<sr>       Row of the start cell, the top left cell if not specified.
    --start-column=<sc>    Column of the start cell.
    --end-row=<er>         Row of the end cell, the bottom right cell if not specified.
    --end-column=<ec>      Column of the end cell.
    --text-out=<path>      Save the maze as a JSON text snapshot.
    --binary-out=<path>    Save the maze as a binary snapshot.
    --show-progress        Print every intermediate grid while generating or searching.
    --binary               The map is a binary snapshot rather than a JSON text snapshot.
    --max-steps=<n>        Give up searching after visiting n cells. Defaults depend on the search.
    --max-paths=<n>        Stop searching after finding n paths [default: 1].
";
#[derive(Debug, Deserialize)]
struct MazeArgs {
    cmd_generate: bool,
    cmd_depth_first: bool,
    cmd_random_growth: bool,
    cmd_solve: bool,
    cmd_bfs: bool,
    cmd_dfs: bool,
    cmd_greedy: bool,
    cmd_check: bool,
    cmd_walk: bool,
    arg_map: String,
    flag_rows: usize,
    flag_columns: usize,
    flag_start_row: Option<usize>,
    flag_start_column: Option<usize>,
    flag_end_row: Option<usize>,
    flag_end_column: Option<usize>,
    flag_text_out: String,
    flag_binary_out: String,
    flag_show_progress: bool,
    flag_binary: bool,
    flag_max_steps: Option<usize>,
    flag_max_paths: usize,
}

mod errors {
    use error_chain::*;
    error_chain! {

        links {
            Maze(::mazes::errors::Error, ::mazes::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {
    env_logger::init();

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    if args.cmd_generate {
        generate_maze(&args)
    } else if args.cmd_solve {
        solve_maze(&args)
    } else if args.cmd_check {
        check_maze(&args)
    } else if args.cmd_walk {
        walk_maze(&args)
    } else {
        Ok(())
    }
}

fn print_frame(grid: &Grid) {
    println!("{}\n", grid);
}

fn generate_maze(maze_args: &MazeArgs) -> Result<()> {
    let rows = RowsCount(maze_args.flag_rows);
    let columns = ColumnsCount(maze_args.flag_columns);
    let start = Coordinate::new(maze_args.flag_start_row.unwrap_or(0),
                                maze_args.flag_start_column.unwrap_or(0));
    let end = Coordinate::new(maze_args.flag_end_row.unwrap_or_else(|| rows.0.saturating_sub(1)),
                              maze_args.flag_end_column.unwrap_or_else(|| columns.0.saturating_sub(1)));

    let algorithm = if maze_args.cmd_random_growth {
        MazeAlgorithm::RandomGrowth
    } else {
        MazeAlgorithm::DepthFirst
    };

    let mut show = print_frame;
    let progress: Progress = if maze_args.flag_show_progress {
        Some(&mut show)
    } else {
        None
    };
    let maze = generators::generate(algorithm, rows, columns, &[start], &[end], progress)?;

    let mut saved = false;
    if !maze_args.flag_text_out.is_empty() {
        snapshots::save_text(&maze, &maze_args.flag_text_out)
            .chain_err(|| format!("Failed to save maze to {}", maze_args.flag_text_out))?;
        saved = true;
    }
    if !maze_args.flag_binary_out.is_empty() {
        snapshots::save_binary(&maze, &maze_args.flag_binary_out)
            .chain_err(|| format!("Failed to save maze to {}", maze_args.flag_binary_out))?;
        saved = true;
    }
    if !saved {
        println!("{}", maze);
    }

    Ok(())
}

fn load_maze(maze_args: &MazeArgs) -> Result<Grid> {
    let maze = if maze_args.flag_binary {
        snapshots::load_binary(&maze_args.arg_map)
    } else {
        snapshots::load_text(&maze_args.arg_map)
    };
    maze.chain_err(|| format!("Failed to load maze {}", maze_args.arg_map))
}

fn solve_maze(maze_args: &MazeArgs) -> Result<()> {
    let maze = load_maze(maze_args)?;

    let algorithm = if maze_args.cmd_dfs {
        SearchAlgorithm::DepthFirst
    } else if maze_args.cmd_greedy {
        SearchAlgorithm::GreedyBestFirst
    } else {
        SearchAlgorithm::BreadthFirst
    };
    let defaults = SearchLimits::for_algorithm(algorithm);
    let limits = SearchLimits::new(maze_args.flag_max_steps.map(MaxSteps).unwrap_or(defaults.max_steps),
                                   MaxPaths(maze_args.flag_max_paths));

    let mut show = print_frame;
    let progress: Progress = if maze_args.flag_show_progress {
        Some(&mut show)
    } else {
        None
    };
    let paths = pathing::search(algorithm, &maze, &maze.starts(), &maze.ends(), limits, progress)?;

    if let Some(path) = paths.first() {
        println!("{}", maze.with_path(path));
        println!("Found {} path(s), the first is {} cells long", paths.len(), path.len());
    } else {
        println!("{}", maze);
        println!("No path found within {} steps", limits.max_steps.0);
    }

    Ok(())
}

fn check_maze(maze_args: &MazeArgs) -> Result<()> {
    let maze = load_maze(maze_args)?;
    let paths = pathing::greedy_best_first(&maze,
                                           &maze.starts(),
                                           &maze.ends(),
                                           SearchLimits::for_algorithm(SearchAlgorithm::GreedyBestFirst),
                                           None)?;
    if paths.is_empty() {
        println!("{} is not solvable", maze_args.arg_map);
    } else {
        println!("{} is solvable", maze_args.arg_map);
    }
    Ok(())
}

/// Replay a map on which a route was walked by hand (the `Visited` cells) and show the shortest
/// route along the walked cells.
fn walk_maze(maze_args: &MazeArgs) -> Result<()> {
    let maze = load_maze(maze_args)?;
    if let Some(route) = pathing::retrace_walked_route(&maze)? {
        let mut cleared = maze.clone();
        for coord in maze.coordinates_of(CellKind::Visited) {
            cleared.set(coord, CellKind::Channel)?;
        }
        println!("{}", cleared.with_path(&route));
        println!("Walked from start to end in {} cells", route.len());
    } else {
        println!("{}", maze);
        println!("The walk does not reach an end yet");
    }
    Ok(())
}
