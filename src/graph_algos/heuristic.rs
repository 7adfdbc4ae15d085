use crate::geometry::GridPos;


/// Estimated cost from a node's state to the goal state
pub trait Heuristic<N, C> {
    fn estimate(&self, node: &N, goal: &N) -> C;
}

/// Any `Fn(&N, &N) -> C` works as a heuristic
impl<N, C, F> Heuristic<N, C> for F
where
    F: Fn(&N, &N) -> C,
{
    fn estimate(&self, node: &N, goal: &N) -> C {
        self(node, goal)
    }
}


/// Manhattan distance to the goal
/// Admissible and consistent on a 4-connected grid where every cell costs at least 1
#[derive(Clone, Copy, Debug, Default)]
pub struct Manhattan;

impl<C: From<u32>> Heuristic<GridPos, C> for Manhattan {
    fn estimate(&self, node: &GridPos, goal: &GridPos) -> C {
        C::from(saturate(node.manhattan(*goal)))
    }
}


/// Manhattan distance to where a receding goal is predicted to be
/// Assumes the goal drifts in -x at a quarter of the agent's pace, so after the
/// agent covers distance d the goal sits at (goal.x - d, goal.y). Not admissible.
#[derive(Clone, Copy, Debug, Default)]
pub struct PredictiveManhattan;

impl<C: From<u32>> Heuristic<GridPos, C> for PredictiveManhattan {
    fn estimate(&self, node: &GridPos, goal: &GridPos) -> C {
        let d = node.manhattan(*goal);
        let predicted_x = i64::from(goal.x) - d as i64;
        let dx = (i64::from(node.x) - predicted_x).unsigned_abs();
        let dy = (i64::from(node.y) - i64::from(goal.y)).unsigned_abs();
        C::from(saturate(dx + dy))
    }
}

fn saturate(distance: u64) -> u32 {
    u32::try_from(distance).unwrap_or(u32::MAX)
}
