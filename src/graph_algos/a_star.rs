use crate::errors::PathPlannerError;
use super::heuristic::Heuristic;
use super::node::{Node, NodeId, NodeStatus};
use super::propagation::propagate;
use super::registry::Registry;
use super::shortest_path;
use super::space::{GoalMotion, SearchSpace};

use std::{fmt::Debug, hash::Hash};
use log::{debug, trace};
use num_traits::{SaturatingAdd, Zero};


/// How the goal behaves while the search runs
pub enum GoalMode<'m, N> {
    /// Goal stays at `goal_position()`
    Static,
    /// Goal is re-read from the source once per iteration, before the frontier is popped
    Moving(&'m mut dyn GoalMotion<N>),
}


/// Terminal state of a search
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Succeeded(NodeId), // the goal node
    Failed,            // frontier exhausted
}


/// Counters collected over one run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub iterations: usize,  // outer loop passes, equal to goal advances in moving mode
    pub expansions: usize,  // nodes whose successors were generated
    pub relaxations: usize, // already-seen nodes reattached to a cheaper parent
    pub propagated: usize,  // descendants improved by propagation
}


/// Result of a search: the outcome plus the full search graph
#[derive(Debug)]
pub struct Search<N, C> {
    registry: Registry<N, C>,
    outcome: Outcome,
    goal: N, // goal position when the search stopped
    stats: SearchStats,
}

impl<N, C> Search<N, C>
where
    N: Eq + Hash + Clone + Debug,
    C: Zero + SaturatingAdd + Ord + Copy + Debug,
{
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Succeeded(_))
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Goal position at the moment the search stopped
    pub fn goal(&self) -> &N {
        &self.goal
    }

    pub fn goal_node(&self) -> Option<&Node<C>> {
        match self.outcome {
            Outcome::Succeeded(index) => self.registry.node(index),
            Outcome::Failed => None,
        }
    }

    /// Total path cost, the g of the goal node
    pub fn cost(&self) -> Option<C> {
        self.goal_node().map(Node::g)
    }

    /// States from start to goal
    /// A failed search is `NoPathFound`, a parent chain that does not lead back to
    /// the start is `BrokenParentChain`
    pub fn path(&self) -> Result<Vec<N>, PathPlannerError> {
        match self.outcome {
            Outcome::Succeeded(index) => shortest_path(&self.registry, index),
            Outcome::Failed => Err(PathPlannerError::NoPathFound),
        }
    }

    /// Node registered for `state`, if the search ever generated it
    pub fn node(&self, state: &N) -> Option<&Node<C>> {
        self.registry.get(state)
    }

    /// State of the current best parent of `state`
    pub fn parent_of(&self, state: &N) -> Option<&N> {
        self.node(state)
            .and_then(Node::parent)
            .and_then(|index| self.registry.state(index))
    }

    pub fn registry(&self) -> &Registry<N, C> {
        &self.registry
    }
}


/// A* graph search
/// https://en.wikipedia.org/wiki/A*_search_algorithm
/// Every state maps to a single node. When a cheaper path to an already seen node
/// turns up, the node is reattached and, if it was already expanded, the
/// improvement is pushed down to everything generated from it.
pub struct AStar<H> {
    heuristic: H,
}

impl<H> AStar<H> {

    pub fn new(heuristic: H) -> Self {
        Self { heuristic }
    }

    pub fn heuristic(&self) -> &H {
        &self.heuristic
    }

    /// From the space's start node, search until the goal node is expanded
    /// Returns the path from start to goal
    pub fn plan<S>(&self, space: &S) -> Result<Vec<S::State>, PathPlannerError>
    where
        S: SearchSpace,
        H: Heuristic<S::State, S::Cost>,
    {
        self.search(space).path()
    }

    /// Search towards a fixed goal
    pub fn search<S>(&self, space: &S) -> Search<S::State, S::Cost>
    where
        S: SearchSpace,
        H: Heuristic<S::State, S::Cost>,
    {
        self.build_graph(space, GoalMode::Static)
    }

    /// Search towards a goal that `motion` moves once per iteration
    pub fn search_moving<S, M>(&self, space: &S, motion: &mut M) -> Search<S::State, S::Cost>
    where
        S: SearchSpace,
        H: Heuristic<S::State, S::Cost>,
        M: GoalMotion<S::State>,
    {
        self.build_graph(space, GoalMode::Moving(motion))
    }

    pub fn search_with<S>(&self, space: &S, mode: GoalMode<'_, S::State>) -> Search<S::State, S::Cost>
    where
        S: SearchSpace,
        H: Heuristic<S::State, S::Cost>,
    {
        self.build_graph(space, mode)
    }

    /// Main loop: pop the cheapest open node, stop on the goal, otherwise expand it
    fn build_graph<S>(&self, space: &S, mut mode: GoalMode<'_, S::State>) -> Search<S::State, S::Cost>
    where
        S: SearchSpace,
        H: Heuristic<S::State, S::Cost>,
    {
        let mut registry: Registry<S::State, S::Cost> = Registry::new();
        let mut stats = SearchStats::default();
        let mut goal = space.goal_position();

        let start = space.start_position();
        let start_h = self.heuristic.estimate(&start, &goal);
        debug!("search from {:?} to {:?}", start, goal);

        let start_index = registry.canonicalize(start);
        if let Some(node) = registry.node_mut(start_index) {
            node.set_root(start_h);
        }
        registry.insert_open(start_index);

        let outcome = loop {
            if let GoalMode::Moving(motion) = &mut mode {
                goal = motion.advance_goal();
            }
            stats.iterations += 1;

            let Some(current) = registry.pop_min() else {
                break Outcome::Failed;
            };
            registry.move_to_closed(current);

            let (Some(current_state), Some(current_g)) = (
                registry.state(current).cloned(),
                registry.node(current).map(Node::g),
            ) else {
                break Outcome::Failed;
            };

            if current_state == goal {
                break Outcome::Succeeded(current);
            }

            trace!("expand {:?} g={:?}", current_state, current_g);
            stats.expansions += 1;

            for successor in space.successors(&current_state) {
                let index = registry.canonicalize(successor);
                if let Some(node) = registry.node_mut(current) {
                    node.add_child(index);
                }

                let (Some(state), Some(node)) = (registry.state(index), registry.node(index)) else {
                    continue;
                };
                let new_cost = current_g.saturating_add(&space.cell_cost(state));

                match node.status() {
                    NodeStatus::Fresh => {
                        let h = self.heuristic.estimate(state, &goal);
                        if let Some(node) = registry.node_mut(index) {
                            node.attach(current, new_cost, h);
                        }
                        registry.insert_open(index);
                    }
                    status if new_cost < node.g() => {
                        trace!("relax {:?}: {:?} -> {:?}", state, node.g(), new_cost);
                        let h = self.heuristic.estimate(state, &goal);
                        if let Some(node) = registry.node_mut(index) {
                            node.attach(current, new_cost, h);
                        }
                        stats.relaxations += 1;

                        if status == NodeStatus::Closed {
                            stats.propagated += propagate(space, &mut registry, index);
                        } else {
                            // still open, re-key it so the frontier sees the new f
                            registry.insert_open(index);
                        }
                    }
                    _ => {}
                }
            }
        };

        debug!(
            "search {} after {} iterations: {} nodes, {} expanded, {} relaxed, {} propagated",
            if matches!(outcome, Outcome::Succeeded(_)) { "succeeded" } else { "failed" },
            stats.iterations,
            registry.len(),
            stats.expansions,
            stats.relaxations,
            stats.propagated,
        );

        Search { registry, outcome, goal, stats }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridPos;
    use crate::graph_algos::heuristic::{Manhattan, PredictiveManhattan};
    use crate::grid::{GridMap, RecedingGoal};

    use std::collections::{BinaryHeap, HashMap, HashSet};
    use std::cmp::Reverse;
    use ntest::timeout;
    use quickcheck_macros::quickcheck;
    use rand::{SeedableRng, rngs::StdRng};

    /// Small hand-built graph: adjacency list plus entry cost per state
    struct TableSpace {
        edges: HashMap<&'static str, Vec<&'static str>>,
        costs: HashMap<&'static str, u32>,
        start: &'static str,
        goal: &'static str,
    }

    impl TableSpace {
        fn new(start: &'static str, goal: &'static str, edges: &[(&'static str, &[&'static str])], costs: &[(&'static str, u32)]) -> Self {
            Self {
                edges: edges.iter().map(|(k, v)| (*k, v.to_vec())).collect(),
                costs: costs.iter().copied().collect(),
                start,
                goal,
            }
        }
    }

    impl SearchSpace for TableSpace {
        type State = &'static str;
        type Cost = u32;

        fn start_position(&self) -> Self::State { self.start }
        fn goal_position(&self) -> Self::State { self.goal }
        fn cell_cost(&self, state: &Self::State) -> u32 { self.costs[state] }
        fn successors(&self, state: &Self::State) -> Vec<Self::State> {
            self.edges.get(state).cloned().unwrap_or_default()
        }
    }

    /// Independent Dijkstra over the grid, for checking optimal costs
    fn dijkstra_cost(grid: &GridMap) -> Option<u32> {
        let goal = grid.goal_position();
        let mut best: HashMap<GridPos, u32> = HashMap::from([(grid.start_position(), 0)]);
        let mut queue = BinaryHeap::from([Reverse((0u32, grid.start_position()))]);

        while let Some(Reverse((cost, pos))) = queue.pop() {
            if pos == goal {
                return Some(cost);
            }
            if cost > best[&pos] {
                continue;
            }
            for next in grid.successors(&pos) {
                let next_cost = cost + grid.cell_cost(&next);
                if best.get(&next).is_none_or(|&c| next_cost < c) {
                    best.insert(next, next_cost);
                    queue.push(Reverse((next_cost, next)));
                }
            }
        }
        None
    }

    fn assert_f_invariant<N, C>(search: &Search<N, C>)
    where
        N: Eq + Hash + Clone + Debug,
        C: Zero + SaturatingAdd + Ord + Copy + Debug,
    {
        for (state, node) in search.registry().iter() {
            assert_eq!(node.f(), node.g().saturating_add(&node.h()), "f != g + h at {:?}", state);
        }
    }

    fn path_cost(grid: &GridMap, path: &[GridPos]) -> u32 {
        path.iter().skip(1).map(|p| grid.cell_cost(p)).sum()
    }

    #[test]
    fn test_open_grid() {
        let grid = GridMap::uniform(5, 5, 1).unwrap();
        let search = AStar::new(Manhattan).search(&grid);

        assert!(search.succeeded());
        assert_eq!(search.cost(), Some(8));

        let path = search.path().unwrap();
        assert_eq!(path.len(), 9);
        assert_eq!(path.first(), Some(&GridPos::new(0, 0)));
        assert_eq!(path.last(), Some(&GridPos::new(4, 4)));
        // every step moves to a 4-neighbour
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan(pair[1]), 1);
        }
        assert_f_invariant(&search);
    }

    #[test]
    fn test_detours_around_expensive_cell() {
        let mut grid = GridMap::uniform(5, 5, 1).unwrap();
        grid.set_cost(GridPos::new(2, 2), 9).unwrap();

        let search = AStar::new(Manhattan).search(&grid);
        let path = search.path().unwrap();

        assert!(search.cost().unwrap() < 9 + 7);
        assert_eq!(search.cost(), Some(8));
        assert!(!path.contains(&GridPos::new(2, 2)));
        assert_eq!(path_cost(&grid, &path), 8);
    }

    #[test]
    fn test_start_is_goal() {
        let grid = GridMap::uniform(3, 3, 1).unwrap()
            .with_goal(GridPos::new(0, 0)).unwrap();
        let search = AStar::new(Manhattan).search(&grid);

        assert_eq!(search.cost(), Some(0));
        assert_eq!(search.path(), Ok(vec![GridPos::new(0, 0)]));
        assert_eq!(search.stats().expansions, 0);
        assert_eq!(search.registry().len(), 1);
    }

    #[test]
    #[timeout(1000)]
    fn test_walled_off_goal_fails() {
        let grid = GridMap::from_rows(&[
            vec![1, 1, 1, 1],
            vec![1, 1, -1, 1],
            vec![1, -1, 1, -1],
            vec![1, 1, -1, 1],
        ]).unwrap()
            .with_goal(GridPos::new(2, 2)).unwrap();

        let search = AStar::new(Manhattan).search(&grid);

        assert_eq!(search.outcome(), Outcome::Failed);
        assert_eq!(search.path(), Err(PathPlannerError::NoPathFound));
        assert_eq!(search.cost(), None);
        assert!(search.node(&GridPos::new(2, 2)).is_none());
        // every reachable cell was expanded before giving up
        assert_eq!(search.stats().expansions, 10);
        assert!(search.registry().iter().all(|(_, node)| node.is_closed()));
    }

    #[test]
    fn test_plan_returns_path_or_error() {
        let grid = GridMap::uniform(3, 1, 2).unwrap();
        let path = AStar::new(Manhattan).plan(&grid).unwrap();
        assert_eq!(path, vec![GridPos::new(0, 0), GridPos::new(1, 0), GridPos::new(2, 0)]);

        let blocked = GridMap::from_rows(&[vec![1, -1, 1]]).unwrap();
        assert_eq!(AStar::new(Manhattan).plan(&blocked), Err(PathPlannerError::NoPathFound));
    }

    #[test]
    fn test_infinite_cost_successor_is_avoided() {
        // W is listed as a successor but marked impassable with the maximum cost
        let space = TableSpace::new(
            "S",
            "G",
            &[("S", &["A"]), ("A", &["W", "G"]), ("W", &["G"])],
            &[("S", 0), ("A", 1), ("W", u32::MAX), ("G", 1)],
        );
        let search = AStar::new(|_: &&'static str, _: &&'static str| 0u32).search(&space);

        assert_eq!(search.cost(), Some(2));
        assert_eq!(search.path(), Ok(vec!["S", "A", "G"]));

        let w = search.node(&"W").unwrap();
        assert!(w.is_open());
        assert_eq!((w.g(), w.f()), (u32::MAX, u32::MAX));
        assert_f_invariant(&search);
    }

    #[test]
    fn test_path_reports_broken_parent_chain() {
        let mut registry: Registry<&'static str, u32> = Registry::new();
        let a = registry.canonicalize("A");
        let b = registry.canonicalize("B");
        registry.node_mut(a).unwrap().attach(b, 1, 0);
        registry.node_mut(b).unwrap().attach(a, 1, 0);

        let search = Search {
            registry,
            outcome: Outcome::Succeeded(a),
            goal: "A",
            stats: SearchStats::default(),
        };
        assert!(matches!(search.path(), Err(PathPlannerError::BrokenParentChain(_))));
    }

    #[test]
    fn test_cheaper_path_found_after_close() {
        // S -> A -> X and S -> B -> X, A is cheaper but its heuristic hides it
        // until X and its descendant Y are already expanded through B
        let space = TableSpace::new(
            "S",
            "G",
            &[("S", &["A", "B"]), ("A", &["X"]), ("B", &["X"]), ("X", &["Y"]), ("Y", &["G"])],
            &[("S", 0), ("A", 1), ("B", 4), ("X", 1), ("Y", 2), ("G", 2)],
        );
        let heuristic = |state: &&'static str, _: &&'static str| -> u32 { if *state == "A" { 7 } else { 0 } };
        let search = AStar::new(heuristic).search(&space);

        assert_eq!(search.cost(), Some(6));
        assert_eq!(search.path(), Ok(vec!["S", "A", "X", "Y", "G"]));

        // X was closed through B, then relaxed through A
        let x = search.node(&"X").unwrap();
        assert!(x.is_closed());
        assert_eq!(x.g(), 2);
        assert_eq!(search.parent_of(&"X"), Some(&"A"));

        // Y was already expanded and picked up the improvement via propagation
        let y = search.node(&"Y").unwrap();
        assert!(y.is_closed());
        assert_eq!(y.g(), 4);
        assert_eq!(search.parent_of(&"Y"), Some(&"X"));

        let stats = search.stats();
        assert_eq!(stats.relaxations, 1);
        assert_eq!(stats.propagated, 2); // Y and G
        assert_f_invariant(&search);
    }

    #[test]
    fn test_open_node_is_rekeyed_on_relaxation() {
        // D is first reached through C (f 14) and is still open when B offers a
        // cheaper route (f 10). E sits in between at f 13 and must not be expanded.
        let space = TableSpace::new(
            "S",
            "G",
            &[("S", &["C", "B", "E"]), ("C", &["D"]), ("B", &["D"]), ("D", &["G"])],
            &[("S", 0), ("C", 6), ("B", 2), ("E", 13), ("D", 8), ("G", 1)],
        );
        let heuristic = |state: &&'static str, _: &&'static str| -> u32 { if *state == "B" { 10 } else { 0 } };
        let search = AStar::new(heuristic).search(&space);

        assert_eq!(search.cost(), Some(11));
        assert_eq!(search.path(), Ok(vec!["S", "B", "D", "G"]));
        assert_eq!(search.parent_of(&"D"), Some(&"B"));
        assert!(search.node(&"E").unwrap().is_open());

        let stats = search.stats();
        assert_eq!(stats.expansions, 4); // S, C, B, D
        assert_eq!(stats.relaxations, 1);
        assert_eq!(stats.propagated, 0);
        assert_f_invariant(&search);
    }

    #[test]
    fn test_duplicate_successors_share_a_node() {
        // both A and B generate C, and A lists it twice
        let space = TableSpace::new(
            "S",
            "C",
            &[("S", &["A", "B"]), ("A", &["C", "C"]), ("B", &["C"])],
            &[("S", 0), ("A", 1), ("B", 1), ("C", 1)],
        );
        let search = AStar::new(|_: &&'static str, _: &&'static str| 0u32).search(&space);

        assert_eq!(search.cost(), Some(2));
        assert_eq!(search.registry().len(), 4);

        let c = search.registry().index_of(&"C").unwrap();
        let a = search.node(&"A").unwrap();
        assert_eq!(a.children(), &[c, c]);
    }

    #[test]
    #[timeout(2000)]
    fn test_cycles_terminate() {
        let space = TableSpace::new(
            "A",
            "Z",
            &[("A", &["B"]), ("B", &["C", "A"]), ("C", &["A", "B"])],
            &[("A", 0), ("B", 0), ("C", 0)],
        );
        let search = AStar::new(|_: &&'static str, _: &&'static str| 0u32).search(&space);
        assert_eq!(search.outcome(), Outcome::Failed);
        assert_eq!(search.stats().expansions, 3);
    }

    #[test]
    fn test_moving_goal_is_caught() {
        // corridor: one cell expanded per iteration, the goal steps left every fourth
        // tick, so they meet at x = 9 on the tenth iteration
        let grid = GridMap::uniform(12, 1, 1).unwrap();
        let mut goal = RecedingGoal::leftward(grid.goal_position());

        let search = AStar::new(PredictiveManhattan).search_moving(&grid, &mut goal);

        assert!(search.succeeded());
        assert_eq!(goal.position(), GridPos::new(9, 0));
        assert_eq!(search.goal(), &goal.position());
        assert_eq!(search.cost(), Some(9));
        assert_eq!(search.path().unwrap().last(), Some(&GridPos::new(9, 0)));
        // one goal tick per iteration
        assert_eq!(search.stats().iterations, 10);
        assert_eq!(goal.ticks(), 10);
        assert_f_invariant(&search);
    }

    #[test]
    #[timeout(1000)]
    fn test_goal_receding_off_grid_fails() {
        let grid = GridMap::uniform(5, 5, 1).unwrap()
            .with_start(GridPos::new(4, 4)).unwrap()
            .with_goal(GridPos::new(1, 0)).unwrap();
        let mut goal = RecedingGoal::new(grid.goal_position(), (-1, 0), 1);

        let search = AStar::new(PredictiveManhattan).search_moving(&grid, &mut goal);

        assert_eq!(search.outcome(), Outcome::Failed);
        assert!(!grid.contains(goal.position()));
        assert_eq!(search.stats().expansions, 25);
        assert_eq!(search.stats().iterations, 26);
    }

    #[test]
    fn test_search_with_closure_motion() {
        let grid = GridMap::uniform(4, 4, 1).unwrap();
        let mut ticks = 0;
        let mut motion = || {
            ticks += 1;
            GridPos::new(3, 3)
        };
        let motion: &mut dyn GoalMotion<GridPos> = &mut motion;
        let search = AStar::new(Manhattan).search_with(&grid, GoalMode::Moving(motion));
        assert_eq!(search.cost(), Some(6));
        let iterations = search.stats().iterations;
        assert_eq!(ticks, iterations);
    }

    #[quickcheck]
    fn prop_static_search_is_optimal(seed: u64) -> bool {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut grid = GridMap::random(8, 8, 9, &mut rng).unwrap();
        // sprinkle walls, never on the corners
        for i in 0..10 {
            let pos = GridPos::new(((seed >> (i * 3)) % 8) as i32, ((seed >> (i * 5)) % 8) as i32);
            let _ = grid.set_wall(pos);
        }

        let search = AStar::new(Manhattan).search(&grid);
        let invariant = search.registry().iter().all(|(_, n)| n.f() == n.g() + n.h());

        let consistent_path = match search.path() {
            Ok(path) => path_cost(&grid, &path) == search.cost().unwrap_or(u32::MAX),
            Err(error) => error == PathPlannerError::NoPathFound && !search.succeeded(),
        };
        invariant && consistent_path && search.cost() == dijkstra_cost(&grid)
    }

    #[quickcheck]
    fn prop_states_resolve_to_single_nodes(seed: u64) -> bool {
        let mut rng = StdRng::seed_from_u64(seed);
        let grid = GridMap::random(6, 6, 4, &mut rng).unwrap();
        let search = AStar::new(Manhattan).search(&grid);

        let states: HashSet<&GridPos> = search.registry().iter().map(|(s, _)| s).collect();
        states.len() == search.registry().len()
            && search.registry().iter().all(|(s, _)| search.registry().index_of(s).is_some())
    }
}
