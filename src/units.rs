#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub struct RowsCount(pub usize);
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub struct ColumnsCount(pub usize);

/// Upper bound on the number of cells a search may visit.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct MaxSteps(pub usize);
/// Upper bound on the number of paths a search records before stopping.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct MaxPaths(pub usize);
