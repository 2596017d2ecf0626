//! **mazegen** is a perfect maze generation library: it carves a spanning
//! tree over a rectangular grid of cells and exposes per-cell wall bitmasks
//! plus a grid-to-world coordinate mapping for renderers to place geometry.

pub mod cells;
pub mod generators;
pub mod grid;
pub mod lifecycle;
pub mod pathing;
pub mod positions;
pub mod units;
