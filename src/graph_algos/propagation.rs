use num_traits::SaturatingAdd;
use super::node::NodeId;
use super::registry::Registry;
use super::space::SearchSpace;

use log::trace;


/// Push a cost improvement at `root` down through every child generated from it
/// Walks the recorded child edges with an explicit stack until no child can be
/// made cheaper. Open children that improve are re-keyed on the frontier.
/// Returns the number of nodes that were relaxed.
pub(crate) fn propagate<S: SearchSpace>(
    space: &S,
    registry: &mut Registry<S::State, S::Cost>,
    root: NodeId,
) -> usize {
    let mut relaxed = 0;
    let mut stack = vec![root];

    while let Some(parent) = stack.pop() {
        let Some(node) = registry.node(parent) else {
            continue;
        };
        let parent_g = node.g();
        // children only grow while their parent is being expanded, never here
        let children = node.children().to_vec();

        for child in children {
            let (Some(state), Some(child_node)) = (registry.state(child), registry.node(child)) else {
                continue;
            };
            let new_cost = parent_g.saturating_add(&space.cell_cost(state));
            if new_cost >= child_node.g() {
                continue;
            }
            let was_open = child_node.is_open();

            trace!("propagate {:?}: {:?} -> {:?}", state, child_node.g(), new_cost);
            if let Some(child_node) = registry.node_mut(child) {
                child_node.relax(parent, new_cost);
            }
            if was_open {
                registry.insert_open(child);
            }
            relaxed += 1;
            stack.push(child);
        }
    }

    relaxed
}
