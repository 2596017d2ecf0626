use docopt::Docopt;
use serde_derive::Deserialize;
use mazegen::{
    cells::{CoordinateSmallVec, GridCoordinate},
    generators,
    grid::{Grid, GridDisplay},
    pathing,
    positions::{wall_segments, WorldPosition},
    units::{CellScale, Height, Width},
};
use std::{
    cmp,
    io,
    io::prelude::*,
    fs::File,
    rc::Rc
};

const USAGE: &str = "Mazegen

Usage:
    mazegen_driver -h | --help
    mazegen_driver [--grid-width=<w> --grid-height=<h>] [--seed=<s>] [--start-x=<x> --start-z=<z>] [--finish-x=<x> --finish-z=<z>] [--cell-scale=<c>] [--text-out=<path>] [(--mark-start-end|--show-distances|--show-path)] [--save-walls=<path>] [--check]

Options:
    -h --help            Show this screen.
    --grid-width=<w>     The grid width in cells [default: 10].
    --grid-height=<h>    The grid height in cells [default: 10].
    --seed=<s>           Maze seed. Seed 0 derives a fresh seed from system entropy every run [default: 0].
    --start-x=<x>        x coordinate of the start cell.
    --start-z=<z>        z coordinate of the start cell.
    --finish-x=<x>       x coordinate of the finish cell (the carving root).
    --finish-z=<z>       z coordinate of the finish cell.
    --cell-scale=<c>     Corridor width in world units, scales the wall spacing [default: 1].
    --text-out=<path>    Output file path for a textual rendering of the maze.
    --mark-start-end     Draw an 'S' (start) and 'E' (finish) marker on the rendering.
    --show-distances     Show the distance from the start cell to every reachable cell.
    --show-path          Show the route from the start cell to the finish cell.
    --save-walls=<path>  Export wall sections for a renderer: line 1 is the section count, then one 'cellx cellz direction x y z orientation' line per wall.
    --check              Verify the maze is fully connected and acyclic and report the result.
";

#[derive(Debug, Deserialize)]
struct MazeArgs {
    flag_grid_width: usize,
    flag_grid_height: usize,
    flag_seed: i64,
    flag_start_x: Option<u32>,
    flag_start_z: Option<u32>,
    flag_finish_x: Option<u32>,
    flag_finish_z: Option<u32>,
    flag_cell_scale: f32,
    flag_text_out: String,
    flag_mark_start_end: bool,
    flag_show_distances: bool,
    flag_show_path: bool,
    flag_save_walls: String,
    flag_check: bool,
}

// We'll put our errors in an `errors` module, and other modules in
// this crate will `use errors::*;` to get access to everything
// `error_chain!` creates.
mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types
    use error_chain::*;
    error_chain! {

        foreign_links {
            DocOptFailure(::docopt::Error);
            GridFailure(::mazegen::grid::GridError);
            GeneratorFailure(::mazegen::generators::GeneratorError);
            IoFailure(::std::io::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {
    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    let width = Width(args.flag_grid_width);
    let height = Height(args.flag_grid_height);
    let mut maze_grid = Grid::new(width, height)?;

    let (start, finish) = start_and_finish_cells(&args, width, height);
    generators::recursive_backtracker(&mut maze_grid, start, finish, args.flag_seed)?;

    if !args.flag_save_walls.is_empty() {
        save_wall_segments(&maze_grid,
                           CellScale(args.flag_cell_scale),
                           &args.flag_save_walls)?;
    }

    if args.flag_check {
        report_maze_check(&maze_grid, finish);
    }

    set_maze_griddisplay(&mut maze_grid, &args, start, finish);

    if args.flag_text_out.is_empty() {
        println!("{}", maze_grid);
    } else {
        write_text_to_file(&format!("{}", maze_grid), &args.flag_text_out)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
    }

    Ok(())
}

/// Start and finish default to opposite sides of the grid, 3 up/down from
/// the corner, clamped into bounds for small grids.
fn start_and_finish_cells(args: &MazeArgs, width: Width, height: Height) -> (GridCoordinate, GridCoordinate) {
    let start = match (args.flag_start_x, args.flag_start_z) {
        (Some(x), Some(z)) => GridCoordinate::new(x, z),
        _ => GridCoordinate::new(0, cmp::min(2, height.0 as u32 - 1)),
    };
    let finish = match (args.flag_finish_x, args.flag_finish_z) {
        (Some(x), Some(z)) => GridCoordinate::new(x, z),
        _ => {
            GridCoordinate::new(width.0 as u32 - 1,
                                height.0.saturating_sub(3) as u32)
        }
    };
    (start, finish)
}

/// Wade through the driver arguments and decide how the grid should display
/// cell bodies as text:
/// - Nothing in the cells
/// - Start and End point markers
/// - Distances from the start cell to all other cells
/// - The route between the start and finish cells
/// Falls back to plain start/end markers when no route exists (an incomplete
/// maze after budget exhaustion).
fn set_maze_griddisplay(maze_grid: &mut Grid,
                        maze_args: &MazeArgs,
                        start: GridCoordinate,
                        finish: GridCoordinate) {
    if maze_args.flag_show_distances || maze_args.flag_show_path {
        let distances = Rc::new(
            pathing::Distances::<u32>::new(maze_grid, start)
                .expect("start cell was validated by the generator"));

        if maze_args.flag_show_distances {
            maze_grid.set_grid_display(Some(distances as Rc<dyn GridDisplay>));
        } else if let Some(path) = pathing::shortest_path(maze_grid, &distances, finish) {
            let display_path = Rc::new(pathing::PathDisplay::new(&path));
            maze_grid.set_grid_display(Some(display_path as Rc<dyn GridDisplay>));
        } else {
            // Somehow there is no route, maze generation failed to make a
            // perfect maze.
            let display_start_end_points = start_end_points_display(start, finish);
            maze_grid.set_grid_display(Some(display_start_end_points as Rc<dyn GridDisplay>));
        }
    } else if maze_args.flag_mark_start_end {
        let display_start_end_points = start_end_points_display(start, finish);
        maze_grid.set_grid_display(Some(display_start_end_points as Rc<dyn GridDisplay>));
    }
}

fn start_end_points_display(start: GridCoordinate,
                            finish: GridCoordinate)
                            -> Rc<pathing::StartEndPointsDisplay> {
    let as_coordinate_smallvec =
        |coord: GridCoordinate| [coord].iter().cloned().collect::<CoordinateSmallVec>();
    Rc::new(pathing::StartEndPointsDisplay::new(as_coordinate_smallvec(start),
                                                as_coordinate_smallvec(finish)))
}

fn report_maze_check(maze_grid: &Grid, finish: GridCoordinate) {
    let reachable = pathing::reachable_cell_count(maze_grid, finish);
    if pathing::is_perfect_maze(maze_grid) {
        println!("perfect maze: all {} cells connected, {} passages",
                 reachable,
                 maze_grid.passage_count());
    } else {
        println!("incomplete maze: reached {} of {} cells; regenerate with a fresh seed",
                 reachable,
                 maze_grid.size());
    }
}

fn save_wall_segments(maze_grid: &Grid, scale: CellScale, file_path: &str) -> Result<()> {
    let segments = wall_segments(maze_grid, scale, WorldPosition::ZERO);

    let mut segment_data = String::new();
    segment_data.push_str(&segments.len().to_string());
    segment_data.push('\n');
    for segment in &segments {
        segment_data.push_str(&format!("{} {} {:?} {} {} {} {:?}\n",
                                       segment.cell.x,
                                       segment.cell.z,
                                       segment.direction,
                                       segment.position.x,
                                       segment.position.y,
                                       segment.position.z,
                                       segment.orientation));
    }

    write_text_to_file(&segment_data, file_path)
        .chain_err(|| format!("Failed to write wall sections to text file {}", file_path))?;

    Ok(())
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}
