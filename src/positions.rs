use std::ops::{Add, Mul, Sub};

use crate::cells::{GridCoordinate, WallDirection};
use crate::grid::Grid;
use crate::units::{CellScale, Height, Width};

/// A point in world space. A plain numeric triple - these are only ever used
/// for arithmetic, never identity.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WorldPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPosition {
    pub const ZERO: WorldPosition = WorldPosition {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> WorldPosition {
        WorldPosition { x, y, z }
    }
}

impl Add for WorldPosition {
    type Output = WorldPosition;
    fn add(self, other: WorldPosition) -> WorldPosition {
        WorldPosition::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for WorldPosition {
    type Output = WorldPosition;
    fn sub(self, other: WorldPosition) -> WorldPosition {
        WorldPosition::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f32> for WorldPosition {
    type Output = WorldPosition;
    fn mul(self, scalar: f32) -> WorldPosition {
        WorldPosition::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

/// Map a cell coordinate to the world position of the cell's centre.
///
/// The grid is centred around the origin by shifting the coordinate by half
/// the grid dimensions (floored, matching integer division), nudged half a
/// cell so the position names the centre rather than the corner, scaled by
/// the corridor width when it differs from 1, and finally translated by the
/// position of the containing structure.
pub fn cell_position(
    coord: GridCoordinate,
    width: Width,
    height: Height,
    scale: CellScale,
    origin: WorldPosition,
) -> WorldPosition {
    let mut position = WorldPosition::new(coord.x as f32, 0.0, coord.z as f32);
    position = position
        + WorldPosition::new(-((width.0 / 2) as f32), 0.0, -((height.0 / 2) as f32));
    position = position + WorldPosition::new(0.5, 0.0, 0.5);
    if scale.0 != 1.0 {
        position = position * scale.0;
    }
    position + origin
}

/// Which axis a wall section runs along. `Up`/`Down` walls lie along x,
/// `Right`/`Left` walls along z.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum WallOrientation {
    AlongX,
    AlongZ,
}

/// One wall section for a renderer to place: the owning cell and edge, the
/// section's centre in world space and the axis it runs along.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WallSegment {
    pub cell: GridCoordinate,
    pub direction: WallDirection,
    pub position: WorldPosition,
    pub orientation: WallOrientation,
}

/// The wall sections needed to render a carved grid without duplicate
/// geometry on interior shared edges: each cell emits only its `Up` and
/// `Right` walls, except that the bottom row also emits `Down` and the
/// leftmost column also emits `Left`, which completes the outer boundary.
pub fn wall_segments(grid: &Grid, scale: CellScale, origin: WorldPosition) -> Vec<WallSegment> {
    let width = grid.width();
    let height = grid.height();
    let half_corridor = scale.0 / 2.0;

    let mut segments = Vec::with_capacity(2 * grid.size() + width.0 + height.0);
    for coord in grid.iter() {
        let cell = grid
            .cell_at(coord)
            .expect("iterated coordinates are always in bounds");

        let mut walls_to_emit = cell.walls;
        if coord.x > 0 {
            walls_to_emit.remove(WallDirection::Left);
        }
        if coord.z > 0 {
            walls_to_emit.remove(WallDirection::Down);
        }

        let centre = cell_position(coord, width, height, scale, origin);
        for &direction in &WallDirection::ALL {
            if !walls_to_emit.contains(direction) {
                continue;
            }
            let (offset, orientation) = match direction {
                WallDirection::Up => (
                    WorldPosition::new(0.0, 0.0, half_corridor),
                    WallOrientation::AlongX,
                ),
                WallDirection::Down => (
                    WorldPosition::new(0.0, 0.0, -half_corridor),
                    WallOrientation::AlongX,
                ),
                WallDirection::Right => (
                    WorldPosition::new(half_corridor, 0.0, 0.0),
                    WallOrientation::AlongZ,
                ),
                WallDirection::Left => (
                    WorldPosition::new(-half_corridor, 0.0, 0.0),
                    WallOrientation::AlongZ,
                ),
            };
            segments.push(WallSegment {
                cell: coord,
                direction,
                position: centre + offset,
                orientation,
            });
        }
    }

    segments
}
