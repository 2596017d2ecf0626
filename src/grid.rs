use petgraph::graph::NodeIndex;
use petgraph::{Graph, Undirected};
use std::fmt;
use std::rc::Rc;

use crate::cells::{offset_coordinate, CoordinateSmallVec, GridCoordinate, WallDirection, WallSet};
use crate::units::{EdgesCount, Height, NodesCount, Width};

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum GridError {
    InvalidDimensions,
    OutOfBounds,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            GridError::InvalidDimensions => {
                write!(f, "grid dimensions must be at least 1 x 1")
            }
            GridError::OutOfBounds => write!(f, "cell coordinate outside the grid"),
        }
    }
}

impl ::std::error::Error for GridError {}

/// One grid unit. The `visited` flag is only meaningful while a generator is
/// carving; the wall flags are the maze topology afterwards.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct MazeCell {
    pub coords: GridCoordinate,
    pub walls: WallSet,
    pub visited: bool,
}

impl MazeCell {
    fn new(coords: GridCoordinate) -> MazeCell {
        MazeCell {
            coords,
            walls: WallSet::ALL,
            visited: false,
        }
    }
}

/// Render the contents of a grid cell as text.
/// The String should be 3 glyphs long, padded if required.
pub trait GridDisplay {
    fn render_cell_body(&self, _: GridCoordinate) -> String {
        String::from("   ")
    }
}

/// A rectangular grid of cells stored as a flat row-major vector
/// (`z * width + x` addressing). The grid exclusively owns its cells.
pub struct Grid {
    cells: Vec<MazeCell>,
    width: Width,
    height: Height,
    grid_display: Option<Rc<dyn GridDisplay>>,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Grid :: width: {:?}, height: {:?}, cells: {:?}",
            self.width, self.height, self.cells
        )
    }
}

impl Grid {
    /// Allocate a `width x height` grid of fully walled, unvisited cells,
    /// each holding coordinates matching its position.
    pub fn new(width: Width, height: Height) -> Result<Grid, GridError> {
        if width.0 < 1 || height.0 < 1 {
            return Err(GridError::InvalidDimensions);
        }

        let mut cells = Vec::with_capacity(width.0 * height.0);
        for z in 0..height.0 {
            for x in 0..width.0 {
                cells.push(MazeCell::new(GridCoordinate::new(x as u32, z as u32)));
            }
        }

        Ok(Grid {
            cells,
            width,
            height,
            grid_display: None,
        })
    }

    #[inline]
    pub fn set_grid_display(&mut self, grid_display: Option<Rc<dyn GridDisplay>>) {
        self.grid_display = grid_display;
    }

    #[inline]
    pub fn grid_display(&self) -> &Option<Rc<dyn GridDisplay>> {
        &self.grid_display
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.width.0 * self.height.0
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.width
    }

    #[inline]
    pub fn height(&self) -> Height {
        self.height
    }

    /// Node and edge capacity hints for graph views of the maze topology.
    pub fn graph_size(&self) -> (NodesCount, EdgesCount) {
        (NodesCount(self.size()), EdgesCount(self.passage_count()))
    }

    #[inline]
    pub fn is_valid_coordinate(&self, coord: GridCoordinate) -> bool {
        (coord.x as usize) < self.width.0 && (coord.z as usize) < self.height.0
    }

    /// Convert a grid coordinate to a one dimensional index in the range
    /// 0..grid.size(). Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn grid_coordinate_to_index(&self, coord: GridCoordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.z as usize * self.width.0 + coord.x as usize)
        } else {
            None
        }
    }

    pub fn cell_at(&self, coord: GridCoordinate) -> Result<&MazeCell, GridError> {
        self.grid_coordinate_to_index(coord)
            .map(|index| &self.cells[index])
            .ok_or(GridError::OutOfBounds)
    }

    /// Clear the wall on the shared edge between a cell and its neighbour in
    /// the given direction, on both sides atomically. Refuses to open a
    /// passage pointing outside the grid.
    pub fn carve_passage(
        &mut self,
        coord: GridCoordinate,
        direction: WallDirection,
    ) -> Result<(), GridError> {
        let cell_index = self
            .grid_coordinate_to_index(coord)
            .ok_or(GridError::OutOfBounds)?;
        let neighbour = self
            .neighbour_at_direction(coord, direction)
            .ok_or(GridError::OutOfBounds)?;
        let neighbour_index = self
            .grid_coordinate_to_index(neighbour)
            .ok_or(GridError::OutOfBounds)?;

        self.cells[cell_index].walls.remove(direction);
        self.cells[neighbour_index].walls.remove(direction.opposite());
        Ok(())
    }

    /// Is the edge of a cell an open passage? Out of bounds queries are
    /// closed walls.
    pub fn is_wall_open(&self, coord: GridCoordinate, direction: WallDirection) -> bool {
        self.cell_at(coord)
            .map(|cell| !cell.walls.contains(direction))
            .unwrap_or(false)
    }

    /// Cells that are Up, Down, Right or Left of a particular cell, whether
    /// or not a passage links them.
    pub fn neighbours(&self, coord: GridCoordinate) -> CoordinateSmallVec {
        WallDirection::ALL
            .iter()
            .filter_map(|&direction| self.neighbour_at_direction(coord, direction))
            .collect()
    }

    pub fn neighbour_at_direction(
        &self,
        coord: GridCoordinate,
        direction: WallDirection,
    ) -> Option<GridCoordinate> {
        let neighbour_coord = offset_coordinate(coord, direction)?;
        if self.is_valid_coordinate(neighbour_coord) {
            Some(neighbour_coord)
        } else {
            None
        }
    }

    /// Cells linked to a particular cell by an open passage.
    pub fn open_neighbours(&self, coord: GridCoordinate) -> CoordinateSmallVec {
        WallDirection::ALL
            .iter()
            .filter(|&&direction| self.is_wall_open(coord, direction))
            .filter_map(|&direction| self.neighbour_at_direction(coord, direction))
            .collect()
    }

    pub fn is_visited(&self, coord: GridCoordinate) -> bool {
        self.cell_at(coord).map(|cell| cell.visited).unwrap_or(false)
    }

    pub fn mark_visited(&mut self, coord: GridCoordinate) {
        if let Some(index) = self.grid_coordinate_to_index(coord) {
            self.cells[index].visited = true;
        }
    }

    /// Restore every cell to the fully walled, unvisited starting state.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.walls = WallSet::ALL;
            cell.visited = false;
        }
    }

    /// The number of carved passages. Each open edge is counted once even
    /// though both adjoining cells record it.
    pub fn passage_count(&self) -> usize {
        let open_edge_ends: usize = self.cells.iter().map(|cell| cell.walls.open_count()).sum();
        open_edge_ends / 2
    }

    /// An undirected graph view of the carved topology: one node per cell in
    /// row-major order, one edge per open passage. Useful for running graph
    /// algorithms over the maze.
    pub fn passage_graph(&self) -> Graph<(), (), Undirected> {
        let (NodesCount(nodes), EdgesCount(edges)) = self.graph_size();
        let mut graph = Graph::with_capacity(nodes, edges);
        for _ in 0..nodes {
            let _ = graph.add_node(());
        }

        // Checking only Up and Right visits every interior edge exactly once.
        for (index, cell) in self.cells.iter().enumerate() {
            if !cell.walls.contains(WallDirection::Up)
                && (cell.coords.z as usize) + 1 < self.height.0
            {
                let _ = graph.update_edge(
                    NodeIndex::new(index),
                    NodeIndex::new(index + self.width.0),
                    (),
                );
            }
            if !cell.walls.contains(WallDirection::Right)
                && (cell.coords.x as usize) + 1 < self.width.0
            {
                let _ = graph.update_edge(NodeIndex::new(index), NodeIndex::new(index + 1), ());
            }
        }

        graph
    }

    pub fn iter(&self) -> CellIter {
        CellIter {
            current_cell_number: 0,
            row_length: self.width.0,
            cells_count: self.size(),
        }
    }

    pub fn iter_row(&self) -> BatchIter {
        BatchIter {
            iter_type: BatchIterType::Row,
            current_index: 0,
            width: self.width.0,
            height: self.height.0,
        }
    }

    pub fn iter_column(&self) -> BatchIter {
        BatchIter {
            iter_type: BatchIterType::Column,
            current_index: 0,
            width: self.width.0,
            height: self.height.0,
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const WALL_L: &str = "╴";
        const WALL_R: &str = "╶";
        const WALL_U: &str = "╵";
        const WALL_D: &str = "╷";
        const WALL_LR_3: &str = "───";
        const WALL_LR: &str = "─";
        const WALL_UD: &str = "│";
        const WALL_LD: &str = "┐";
        const WALL_RU: &str = "└";
        const WALL_LU: &str = "┘";
        const WALL_RD: &str = "┌";
        const WALL_LRU: &str = "┴";
        const WALL_LRD: &str = "┬";
        const WALL_LRUD: &str = "┼";
        const WALL_RUD: &str = "├";
        const WALL_LUD: &str = "┤";

        let columns_count = self.width.0;
        let rows_count = self.height.0;

        // Cells are rendered with +z pointing up the screen, so the text
        // starts with the z = height - 1 row and its outer boundary.
        let top_z = (rows_count - 1) as u32;
        let mut output = String::from(WALL_RD);
        for x in 0..columns_count {
            output.push_str(WALL_LR_3);
            let coord = GridCoordinate::new(x as u32, top_z);
            let right_open = self.is_wall_open(coord, WallDirection::Right);
            if right_open {
                output.push_str(WALL_LR);
            } else {
                let is_last_cell = x == columns_count - 1;
                if is_last_cell {
                    output.push_str(WALL_LD);
                } else {
                    output.push_str(WALL_LRD);
                }
            }
        }
        output.push('\n');

        for (screen_row, z) in (0..rows_count).rev().enumerate() {
            let is_last_row = screen_row == rows_count - 1;

            // The west most boundary of the row is always a wall; the top
            // section of each cell was drawn by the row above it.
            let mut row_middle_section_render = String::from(WALL_UD);
            let mut row_bottom_section_render = String::new();

            for x in 0..columns_count {
                let cell_coord = GridCoordinate::new(x as u32, z as u32);
                let is_first_column = x == 0;
                let is_last_column = x == columns_count - 1;
                let right_open = self.is_wall_open(cell_coord, WallDirection::Right);
                let down_open = self.is_wall_open(cell_coord, WallDirection::Down);

                let body = match self.grid_display {
                    Some(ref display) => display.render_cell_body(cell_coord),
                    None => String::from("   "),
                };
                row_middle_section_render.push_str(&body);
                row_middle_section_render.push_str(if right_open { " " } else { WALL_UD });

                if is_first_column {
                    row_bottom_section_render = if is_last_row {
                        String::from(WALL_RU)
                    } else if down_open {
                        String::from(WALL_UD)
                    } else {
                        String::from(WALL_RUD)
                    };
                }
                row_bottom_section_render.push_str(if down_open { "   " } else { WALL_LR_3 });

                let corner = match (is_last_row, is_last_column) {
                    (true, true) => WALL_LU,
                    (true, false) => {
                        if right_open {
                            WALL_LR
                        } else {
                            WALL_LRU
                        }
                    }
                    (false, true) => {
                        if down_open {
                            WALL_UD
                        } else {
                            WALL_LUD
                        }
                    }
                    (false, false) => {
                        // The corner glyph between this cell and the one
                        // diagonally at (x + 1, z - 1); both lookups are in
                        // bounds away from the last row and column.
                        let east_coord = GridCoordinate::new(cell_coord.x + 1, cell_coord.z);
                        let south_coord = GridCoordinate::new(cell_coord.x, cell_coord.z - 1);
                        let corner_open_from_east =
                            self.is_wall_open(east_coord, WallDirection::Down);
                        let corner_open_from_south =
                            self.is_wall_open(south_coord, WallDirection::Right);
                        let show_right_section = !corner_open_from_east;
                        let show_down_section = !corner_open_from_south;
                        let show_up_section = !right_open;
                        let show_left_section = !down_open;

                        match (
                            show_left_section,
                            show_right_section,
                            show_up_section,
                            show_down_section,
                        ) {
                            (true, true, true, true) => WALL_LRUD,
                            (true, true, true, false) => WALL_LRU,
                            (true, true, false, true) => WALL_LRD,
                            (true, false, true, true) => WALL_LUD,
                            (false, true, true, true) => WALL_RUD,
                            (true, true, false, false) => WALL_LR,
                            (false, false, true, true) => WALL_UD,
                            (false, true, true, false) => WALL_RU,
                            (true, false, false, true) => WALL_LD,
                            (true, false, true, false) => WALL_LU,
                            (false, true, false, true) => WALL_RD,
                            (true, false, false, false) => WALL_L,
                            (false, true, false, false) => WALL_R,
                            (false, false, true, false) => WALL_U,
                            (false, false, false, true) => WALL_D,
                            _ => " ",
                        }
                    }
                };

                row_bottom_section_render.push_str(corner);
            }

            output.push_str(&row_middle_section_render);
            output.push('\n');
            output.push_str(&row_bottom_section_render);
            output.push('\n');
        }

        write!(f, "{}", output)
    }
}

#[derive(Debug, Copy, Clone)]
pub struct CellIter {
    current_cell_number: usize,
    row_length: usize,
    cells_count: usize,
}

impl Iterator for CellIter {
    type Item = GridCoordinate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let coord = coordinate_from_index(self.row_length, self.current_cell_number);
            self.current_cell_number += 1;
            Some(coord)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let lower_bound = self.cells_count - self.current_cell_number;
        let upper_bound = lower_bound;
        (lower_bound, Some(upper_bound))
    }
}
impl ExactSizeIterator for CellIter {} // default impl using size_hint()

// Converting the Grid into an iterator (CellIter - the default most sensible)
impl<'a> IntoIterator for &'a Grid {
    type Item = GridCoordinate;
    type IntoIter = CellIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Copy, Clone)]
enum BatchIterType {
    Row,
    Column,
}

#[derive(Debug, Copy, Clone)]
pub struct BatchIter {
    iter_type: BatchIterType,
    current_index: usize,
    width: usize,
    height: usize,
}

impl Iterator for BatchIter {
    type Item = Vec<GridCoordinate>;
    fn next(&mut self) -> Option<Self::Item> {
        let (batches_count, batch_length) = match self.iter_type {
            BatchIterType::Row => (self.height, self.width),
            BatchIterType::Column => (self.width, self.height),
        };

        if self.current_index < batches_count {
            let coords = (0..batch_length)
                .map(|i| {
                    if let BatchIterType::Row = self.iter_type {
                        GridCoordinate::new(i as u32, self.current_index as u32)
                    } else {
                        GridCoordinate::new(self.current_index as u32, i as u32)
                    }
                })
                .collect();
            self.current_index += 1;
            Some(coords)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let batches_count = match self.iter_type {
            BatchIterType::Row => self.height,
            BatchIterType::Column => self.width,
        };
        let lower_bound = batches_count - self.current_index;
        let upper_bound = lower_bound;
        (lower_bound, Some(upper_bound))
    }
}
impl ExactSizeIterator for BatchIter {} // default impl using size_hint()

fn coordinate_from_index(row_length: usize, one_dimensional_index: usize) -> GridCoordinate {
    let z = one_dimensional_index / row_length;
    let x = one_dimensional_index - (z * row_length);
    GridCoordinate {
        x: x as u32,
        z: z as u32,
    }
}
