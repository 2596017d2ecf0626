use std::fmt::{Debug, Display, LowerHex};
use std::ops::Add;

use bit_set::BitSet;
use fnv::{FnvHashMap, FnvHashSet};
use itertools::Itertools;
use num::traits::{Bounded, One, Unsigned, Zero};
use petgraph::algo::{connected_components, is_cyclic_undirected};
use smallvec::SmallVec;

use crate::cells::{CoordinateSmallVec, GridCoordinate};
use crate::grid::{Grid, GridDisplay};

// Trait (hack) used purely as a generic type parameter alias because it looks
// ugly to type this out each time. Note generic parameter type aliases are
// not in the language; `type X = Y;` only works with concrete types.
pub trait MaxDistance
    : Zero + One + Bounded + Unsigned + Add + Debug + Clone + Copy + Display + LowerHex + Ord
    {
}
impl<T: Zero + One + Bounded + Unsigned + Add + Debug + Clone + Copy + Display + LowerHex + Ord> MaxDistance for T {}

/// Flood fill distances from a start coordinate to every cell reachable from
/// it through open passages. Cells separated from the start by walls have no
/// recorded distance.
#[derive(Debug, Clone)]
pub struct Distances<MaxDistanceT = u32> {
    start_coordinate: GridCoordinate,
    distances: FnvHashMap<GridCoordinate, MaxDistanceT>,
    max_distance: MaxDistanceT,
}

impl<MaxDistanceT> Distances<MaxDistanceT>
    where MaxDistanceT: MaxDistance
{
    pub fn new(grid: &Grid, start_coordinate: GridCoordinate) -> Option<Distances<MaxDistanceT>> {
        if !grid.is_valid_coordinate(start_coordinate) {
            return None;
        }

        // No weights on the passages to consider - every step is one from
        // the previous cell, so the first distance written for a cell is
        // already the shortest and the map doubles as the visited set.
        let mut max = Zero::zero();
        let mut distances =
            FnvHashMap::with_capacity_and_hasher(grid.size(), Default::default());
        distances.insert(start_coordinate, Zero::zero());

        let mut frontier = vec![start_coordinate];
        while !frontier.is_empty() {
            let mut new_frontier = vec![];
            for cell_coord in &frontier {
                let distance_to_cell: MaxDistanceT = *distances
                    .get(cell_coord)
                    .expect("frontier cells always have a recorded distance");
                if distance_to_cell > max {
                    max = distance_to_cell;
                }

                for link_coordinate in &*grid.open_neighbours(*cell_coord) {
                    if !distances.contains_key(link_coordinate) {
                        distances.insert(*link_coordinate, distance_to_cell + One::one());
                        new_frontier.push(*link_coordinate);
                    }
                }
            }
            frontier = new_frontier;
        }

        Some(Distances {
            start_coordinate,
            distances,
            max_distance: max,
        })
    }

    #[inline(always)]
    pub fn start(&self) -> GridCoordinate {
        self.start_coordinate
    }

    #[inline(always)]
    pub fn max(&self) -> MaxDistanceT {
        self.max_distance
    }

    #[inline(always)]
    pub fn distance_from_start_to(&self, coord: GridCoordinate) -> Option<MaxDistanceT> {
        self.distances.get(&coord).cloned()
    }

    pub fn furthest_points_on_grid(&self) -> SmallVec<[GridCoordinate; 8]> {
        let mut furthest = SmallVec::<[GridCoordinate; 8]>::new();
        let furthest_distance = self.max();

        for (coord, distance) in self.distances.iter() {
            if *distance == furthest_distance {
                furthest.push(*coord);
            }
        }
        furthest
    }
}

impl<MaxDistanceT> GridDisplay for Distances<MaxDistanceT>
    where MaxDistanceT: MaxDistance
{
    fn render_cell_body(&self, coord: GridCoordinate) -> String {
        if let Some(d) = self.distances.get(&coord) {
            // centre align, padding 3, lowercase hexadecimal
            format!("{:^3x}", d)
        } else {
            String::from("   ")
        }
    }
}

#[derive(Debug)]
pub struct StartEndPointsDisplay {
    start_coordinates: CoordinateSmallVec,
    end_coordinates: CoordinateSmallVec,
}

impl StartEndPointsDisplay {
    pub fn new(starts: CoordinateSmallVec, ends: CoordinateSmallVec) -> StartEndPointsDisplay {
        StartEndPointsDisplay {
            start_coordinates: starts,
            end_coordinates: ends,
        }
    }
}

impl GridDisplay for StartEndPointsDisplay {
    fn render_cell_body(&self, coord: GridCoordinate) -> String {
        let contains_coordinate =
            |coordinates: &CoordinateSmallVec| coordinates.iter().any(|&c| c == coord);

        if contains_coordinate(&self.start_coordinates) {
            String::from(" S ")
        } else if contains_coordinate(&self.end_coordinates) {
            String::from(" E ")
        } else {
            String::from("   ")
        }
    }
}

#[derive(Debug)]
pub struct PathDisplay {
    on_path_coordinates: FnvHashSet<GridCoordinate>,
}

impl PathDisplay {
    pub fn new(path: &[GridCoordinate]) -> Self {
        PathDisplay { on_path_coordinates: path.iter().cloned().collect() }
    }
}

impl GridDisplay for PathDisplay {
    fn render_cell_body(&self, coord: GridCoordinate) -> String {
        if self.on_path_coordinates.contains(&coord) {
            String::from(" . ")
        } else {
            String::from("   ")
        }
    }
}

/// The shortest route from the distances' start to `end_point`, walking the
/// distance gradient downhill. None when no open route exists.
pub fn shortest_path<MaxDistanceT>(grid: &Grid,
                                   distances_from_start: &Distances<MaxDistanceT>,
                                   end_point: GridCoordinate)
                                   -> Option<Vec<GridCoordinate>>
    where MaxDistanceT: MaxDistance
{
    if distances_from_start.distance_from_start_to(end_point).is_none() {
        // The end point is not reachable from start.
        return None;
    }

    let mut path = vec![end_point];
    let start = distances_from_start.start();
    let mut current_coord = end_point;

    while current_coord != start {
        let current_distance_to_start = distances_from_start
            .distance_from_start_to(current_coord)
            .expect("cells on the walked path always have a distance");

        let linked_neighbours = grid.open_neighbours(current_coord);
        let neighbour_distances = &linked_neighbours
            .iter()
            .map(|coord| {
                (*coord,
                 distances_from_start
                     .distance_from_start_to(*coord)
                     .expect("open neighbours share the start's connected component"))
            })
            .collect::<SmallVec<[(GridCoordinate, MaxDistanceT); 4]>>();
        let closest_to_start: Option<(GridCoordinate, MaxDistanceT)> = neighbour_distances
            .iter()
            .cloned()
            .fold1(|closest_accumulator, closest_candidate| {
                if closest_candidate.1 < closest_accumulator.1 {
                    closest_candidate
                } else {
                    closest_accumulator
                }
            });

        if let Some((closer_coord, closer_distance)) = closest_to_start {
            if closer_distance >= current_distance_to_start {
                // We have not got any closer to the final goal, so there is
                // no path there.
                return None;
            }

            current_coord = closer_coord;
            path.push(current_coord);
        } else {
            // There are no linked neighbours - this input data is broken.
            return None;
        }
    }

    path.reverse();
    Some(path)
}

/// How many cells an open-passage flood fill starting at `from` can reach,
/// `from` included. A fully connected maze reaches `grid.size()`.
pub fn reachable_cell_count(grid: &Grid, from: GridCoordinate) -> usize {
    if !grid.is_valid_coordinate(from) {
        return 0;
    }

    let mut visited = BitSet::with_capacity(grid.size());
    let mut cell_stack = vec![from];
    let mut count = 0;

    while let Some(coord) = cell_stack.pop() {
        let bit_index = grid
            .grid_coordinate_to_index(coord)
            .expect("flood fill only walks in-bounds cells");
        if visited.contains(bit_index) {
            continue;
        }
        visited.insert(bit_index);
        count += 1;

        for linked_coord in &*grid.open_neighbours(coord) {
            let linked_index = grid
                .grid_coordinate_to_index(*linked_coord)
                .expect("open neighbours are always in bounds");
            if !visited.contains(linked_index) {
                cell_stack.push(*linked_coord);
            }
        }
    }

    count
}

/// Is the carved grid a perfect maze - one connected component and no cycle
/// among the open passages?
pub fn is_perfect_maze(grid: &Grid) -> bool {
    let graph = grid.passage_graph();
    connected_components(&graph) == 1 && !is_cyclic_undirected(&graph)
}

#[cfg(test)]
mod tests {

    use quickcheck::quickcheck;
    use std::u32;

    use super::*;
    use crate::cells::WallDirection;
    use crate::generators;
    use crate::grid::Grid;
    use crate::units::{Height, Width};

    type SmallDistances = Distances<u32>;

    static OUT_OF_GRID_COORDINATE: GridCoordinate = GridCoordinate {
        x: u32::MAX,
        z: u32::MAX,
    };

    fn open_2x2_grid() -> Grid {
        let mut g = Grid::new(Width(2), Height(2)).unwrap();
        let gc = |x, z| GridCoordinate::new(x, z);
        g.carve_passage(gc(0, 0), WallDirection::Right).expect("carve failed");
        g.carve_passage(gc(0, 0), WallDirection::Up).expect("carve failed");
        g.carve_passage(gc(1, 0), WallDirection::Up).expect("carve failed");
        g.carve_passage(gc(0, 1), WallDirection::Right).expect("carve failed");
        g
    }

    #[test]
    fn distances_construction_requires_valid_start_coordinate() {
        let g = Grid::new(Width(3), Height(3)).unwrap();
        let distances = SmallDistances::new(&g, OUT_OF_GRID_COORDINATE);
        assert!(distances.is_none());
    }

    #[test]
    fn start() {
        let g = Grid::new(Width(3), Height(3)).unwrap();
        let start_coordinate = GridCoordinate::new(1, 1);
        let distances = SmallDistances::new(&g, start_coordinate).unwrap();
        assert_eq!(start_coordinate, distances.start());
    }

    #[test]
    fn distances_to_unreachable_cells_is_none() {
        let g = Grid::new(Width(3), Height(3)).unwrap();
        let start_coordinate = GridCoordinate::new(0, 0);
        let distances = SmallDistances::new(&g, start_coordinate).unwrap();
        for coord in g.iter() {
            let d = distances.distance_from_start_to(coord);

            if coord != start_coordinate {
                assert!(d.is_none());
            } else {
                assert_eq!(d, Some(0));
            }
        }
    }

    #[test]
    fn distance_to_invalid_coordinate_is_none() {
        let g = Grid::new(Width(3), Height(3)).unwrap();
        let start_coordinate = GridCoordinate::new(0, 0);
        let distances = SmallDistances::new(&g, start_coordinate).unwrap();
        assert_eq!(distances.distance_from_start_to(OUT_OF_GRID_COORDINATE),
                   None);
    }

    #[test]
    fn distances_on_open_grid() {
        let g = open_2x2_grid();
        let gc = |x, z| GridCoordinate::new(x, z);

        let distances = SmallDistances::new(&g, gc(0, 0)).unwrap();
        assert_eq!(distances.distance_from_start_to(gc(0, 0)), Some(0));
        assert_eq!(distances.distance_from_start_to(gc(1, 0)), Some(1));
        assert_eq!(distances.distance_from_start_to(gc(0, 1)), Some(1));
        assert_eq!(distances.distance_from_start_to(gc(1, 1)), Some(2));
    }

    #[test]
    fn max_distance() {
        let g = open_2x2_grid();
        let distances = SmallDistances::new(&g, GridCoordinate::new(0, 0)).unwrap();
        assert_eq!(distances.max(), 2);
    }

    #[test]
    fn furthest_points() {
        let g = open_2x2_grid();
        let distances = SmallDistances::new(&g, GridCoordinate::new(0, 0)).unwrap();
        let furthest = distances.furthest_points_on_grid();
        assert_eq!(&*furthest, &[GridCoordinate::new(1, 1)]);
    }

    #[test]
    fn shortest_path_on_generated_maze() {
        let start = GridCoordinate::new(0, 2);
        let finish = GridCoordinate::new(9, 7);
        let g = generators::generate(Width(10), Height(10), start, finish, 42).unwrap();

        let distances = SmallDistances::new(&g, start).unwrap();
        let path = shortest_path(&g, &distances, finish).expect("perfect maze has a route");

        assert_eq!(*path.first().unwrap(), start);
        assert_eq!(*path.last().unwrap(), finish);
        // Each step moves to an adjacent cell through an open passage.
        for pair in path.windows(2) {
            assert!(g.open_neighbours(pair[0]).iter().any(|&c| c == pair[1]));
        }
        // A path through a perfect maze never revisits a cell.
        assert_eq!(path.len() as u32,
                   distances.distance_from_start_to(finish).unwrap() + 1);
    }

    #[test]
    fn no_path_through_walls() {
        let g = Grid::new(Width(2), Height(1)).unwrap();
        let start = GridCoordinate::new(0, 0);
        let distances = SmallDistances::new(&g, start).unwrap();
        assert_eq!(shortest_path(&g, &distances, GridCoordinate::new(1, 0)),
                   None);
    }

    #[test]
    fn reachability_on_uncarved_and_carved_grids() {
        let uncarved = Grid::new(Width(4), Height(4)).unwrap();
        assert_eq!(reachable_cell_count(&uncarved, GridCoordinate::new(0, 0)), 1);
        assert_eq!(reachable_cell_count(&uncarved, OUT_OF_GRID_COORDINATE), 0);

        let start = GridCoordinate::new(0, 0);
        let finish = GridCoordinate::new(3, 3);
        let g = generators::generate(Width(4), Height(4), start, finish, 11).unwrap();
        assert_eq!(reachable_cell_count(&g, finish), 16);
    }

    #[test]
    fn perfect_maze_validation() {
        let uncarved = Grid::new(Width(2), Height(2)).unwrap();
        assert!(!is_perfect_maze(&uncarved)); // four components

        let looped = open_2x2_grid();
        assert!(!is_perfect_maze(&looped)); // connected but cyclic

        let start = GridCoordinate::new(0, 0);
        let finish = GridCoordinate::new(7, 5);
        let g = generators::generate(Width(8), Height(6), start, finish, 23).unwrap();
        assert!(is_perfect_maze(&g));
    }

    #[test]
    fn start_end_markers_render_in_cell_bodies() {
        use std::rc::Rc;

        let mut g = Grid::new(Width(2), Height(1)).unwrap();
        let start: CoordinateSmallVec = [GridCoordinate::new(0, 0)].iter().cloned().collect();
        let end: CoordinateSmallVec = [GridCoordinate::new(1, 0)].iter().cloned().collect();
        g.set_grid_display(Some(Rc::new(StartEndPointsDisplay::new(start, end))
            as Rc<dyn GridDisplay>));

        assert_eq!(format!("{}", g), "┌───┬───┐\n│ S │ E │\n└───┴───┘\n");
    }

    #[test]
    fn quickcheck_reachable_count_never_exceeds_grid_size() {
        fn prop(w: u8, h: u8, seed: i64) -> bool {
            let width = Width((w % 8) as usize + 1);
            let height = Height((h % 8) as usize + 1);
            let finish =
                GridCoordinate::new(width.0 as u32 - 1, height.0 as u32 - 1);
            let g = generators::generate(width,
                                         height,
                                         GridCoordinate::new(0, 0),
                                         finish,
                                         seed)
                .expect("in-bounds start and finish");
            reachable_cell_count(&g, finish) <= g.size()
        }
        quickcheck(prop as fn(u8, u8, i64) -> bool);
    }
}
