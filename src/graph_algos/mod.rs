pub mod a_star;
pub mod heuristic;
pub mod node;
pub mod registry;
pub mod space;
mod propagation;
mod shortest_path;

use shortest_path::shortest_path;

pub use a_star::{AStar, GoalMode, Outcome, Search, SearchStats};
pub use heuristic::{Heuristic, Manhattan, PredictiveManhattan};
pub use node::{Node, NodeId, NodeStatus};
pub use registry::Registry;
pub use space::{GoalMotion, SearchSpace};
