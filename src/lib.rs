//! Graph-search A* over user supplied search spaces.
//!
//! Nodes are deduplicated by state. A cheaper path to a node that was already
//! expanded is propagated to everything generated from it. The goal may also
//! move while the search runs, see [`GoalMode`].

pub mod errors;
pub mod geometry;
pub mod graph_algos;
pub mod grid;
mod collections;

pub use errors::{GridError, PathPlannerError};
pub use geometry::GridPos;
pub use graph_algos::{
    AStar, GoalMode, GoalMotion, Heuristic, Manhattan, Node, NodeId, NodeStatus, Outcome,
    PredictiveManhattan, Registry, Search, SearchSpace, SearchStats,
};
pub use grid::{GridMap, RecedingGoal};
