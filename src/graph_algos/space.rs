use std::{fmt::Debug, hash::Hash};
use num_traits::{SaturatingAdd, Zero};


/// The world the planner searches through
/// Implementors decide what is passable: blocked states are either never returned
/// from `successors` or given an effectively infinite cost such as `u32::MAX`.
/// Path costs saturate, so such a state is simply never preferred.
pub trait SearchSpace {
    type State: Eq + Hash + Clone + Debug;
    type Cost: Zero + SaturatingAdd + Ord + Copy + Debug;

    fn start_position(&self) -> Self::State;

    fn goal_position(&self) -> Self::State;

    /// Cost of entering `state`
    fn cell_cost(&self, state: &Self::State) -> Self::Cost;

    /// States reachable from `state` in one step
    fn successors(&self, state: &Self::State) -> Vec<Self::State>;
}


/// Time-stepped source of goal positions for moving-goal searches
/// The planner calls `advance_goal` exactly once per iteration
pub trait GoalMotion<N> {
    fn advance_goal(&mut self) -> N;
}

impl<N, F> GoalMotion<N> for F
where
    F: FnMut() -> N,
{
    fn advance_goal(&mut self) -> N {
        self()
    }
}
