use thiserror::Error;

use crate::geometry::GridPos;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathPlannerError {
    #[error("no path found")]
    NoPathFound, // Frontier exhausted before reaching the goal
    #[error("parent chain broken at node {0}")]
    BrokenParentChain(usize),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid has no cells")]
    EmptyGrid,
    #[error("grid of {width}x{height} cells is too large")]
    TooLarge { width: usize, height: usize },
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRows { row: usize, expected: usize, found: usize },
    #[error("position {0} is outside the grid")]
    OutOfBounds(GridPos),
    #[error("position {0} is a wall")]
    Blocked(GridPos),
}
