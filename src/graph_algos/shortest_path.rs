use crate::errors::PathPlannerError;
use super::node::NodeId;
use super::registry::Registry;

use std::{fmt::Debug, hash::Hash};
use num_traits::{SaturatingAdd, Zero};

/// Construct the path from the start node to `goal_index` by following parent links
/// Returns the ordered path as a vector of states from start to goal
pub(crate) fn shortest_path<N, C>(registry: &Registry<N, C>, goal_index: NodeId) -> Result<Vec<N>, PathPlannerError>
where
    N: Eq + Hash + Clone + Debug,
    C: Zero + SaturatingAdd + Ord + Copy + Debug,
{

    let mut path = Vec::new();
    let mut current_index = Some(goal_index);

    // Trace back from goal to start
    while let Some(index) = current_index {
        // A parent chain longer than the registry has a cycle in it
        if path.len() > registry.len() {
            return Err(PathPlannerError::BrokenParentChain(index));
        }
        match (registry.state(index), registry.node(index)) {
            (Some(state), Some(node)) => {
                path.push(state.clone());
                current_index = node.parent();
            }
            _ => return Err(PathPlannerError::BrokenParentChain(index)),
        }
    }

    // The path is in reverse order, so reverse it
    path.reverse();

    if path.is_empty() {
        return Err(PathPlannerError::NoPathFound);
    }

    Ok(path)
}
