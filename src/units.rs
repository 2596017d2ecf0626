#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Width(pub usize);
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Height(pub usize);

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct NodesCount(pub usize);
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct EdgesCount(pub usize);

/// Corridor width in world units - the spacing multiplier applied by the
/// coordinate mapper when it differs from 1.
#[derive(PartialEq, Copy, Clone, Debug)]
pub struct CellScale(pub f32);
