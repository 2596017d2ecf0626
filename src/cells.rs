use smallvec::SmallVec;
use std::convert::From;
use std::fmt;

pub type CoordinateSmallVec = SmallVec<[GridCoordinate; 4]>;

/// A cell location on the grid. `x` is the column, `z` the row.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct GridCoordinate {
    pub x: u32,
    pub z: u32,
}

impl GridCoordinate {
    pub fn new(x: u32, z: u32) -> GridCoordinate {
        GridCoordinate { x, z }
    }
}

impl From<(u32, u32)> for GridCoordinate {
    fn from(x_z_pair: (u32, u32)) -> GridCoordinate {
        GridCoordinate::new(x_z_pair.0, x_z_pair.1)
    }
}

/// The four edges of a cell. `Up` points towards +z, `Right` towards +x.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum WallDirection {
    Up,
    Down,
    Right,
    Left,
}

impl WallDirection {
    pub const ALL: [WallDirection; 4] = [
        WallDirection::Up,
        WallDirection::Down,
        WallDirection::Right,
        WallDirection::Left,
    ];

    /// The flag bit backing this direction in a `WallSet`.
    pub fn bit(self) -> u8 {
        match self {
            WallDirection::Up => 0x1,
            WallDirection::Down => 0x2,
            WallDirection::Right => 0x4,
            WallDirection::Left => 0x8,
        }
    }

    /// The direction of the same edge as seen from the adjacent cell.
    pub fn opposite(self) -> WallDirection {
        match self {
            WallDirection::Up => WallDirection::Down,
            WallDirection::Down => WallDirection::Up,
            WallDirection::Right => WallDirection::Left,
            WallDirection::Left => WallDirection::Right,
        }
    }
}

/// Which edges of a cell are walls. Flags are set for walls and cleared for
/// open passages, so a freshly created cell is `WallSet::ALL`.
#[derive(Eq, PartialEq, Copy, Clone)]
pub struct WallSet(u8);

impl WallSet {
    pub const ALL: WallSet = WallSet(0xF);
    pub const NONE: WallSet = WallSet(0x0);

    pub fn contains(self, direction: WallDirection) -> bool {
        self.0 & direction.bit() == direction.bit()
    }

    pub fn insert(&mut self, direction: WallDirection) {
        self.0 |= direction.bit();
    }

    pub fn remove(&mut self, direction: WallDirection) {
        self.0 &= !direction.bit();
    }

    pub fn wall_count(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn open_count(self) -> usize {
        4 - self.wall_count()
    }
}

impl fmt::Debug for WallSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "WallSet(")?;
        let mut first = true;
        for &direction in &WallDirection::ALL {
            if self.contains(direction) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{:?}", direction)?;
                first = false;
            }
        }
        if first {
            write!(f, "None")?;
        }
        write!(f, ")")
    }
}

/// Creates a new `GridCoordinate` offset 1 cell away in the given direction.
/// Returns None if the coordinate is not representable.
pub fn offset_coordinate(coord: GridCoordinate, direction: WallDirection) -> Option<GridCoordinate> {
    let (x, z) = (coord.x, coord.z);
    match direction {
        WallDirection::Up => Some(GridCoordinate { x, z: z + 1 }),
        WallDirection::Down => {
            if z > 0 {
                Some(GridCoordinate { x, z: z - 1 })
            } else {
                None
            }
        }
        WallDirection::Right => Some(GridCoordinate { x: x + 1, z }),
        WallDirection::Left => {
            if x > 0 {
                Some(GridCoordinate { x: x - 1, z })
            } else {
                None
            }
        }
    }
}
