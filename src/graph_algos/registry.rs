use crate::collections::FxIndexMap;
use super::node::{Node, NodeId, NodeStatus};

use std::{
    collections::BinaryHeap,
    hash::Hash,
    fmt::Debug,
    cmp::Ordering,
};
use num_traits::{SaturatingAdd, Zero};


/// Entry on the frontier heap
/// An entry is live only while its stamp matches the node's stamp, which lets an
/// open node be re-keyed by pushing a new entry instead of searching the heap
#[derive(Debug)]
struct FrontierEntry<C> {
    index: NodeId,
    f_cost: C,
    stamp: u64,
}

impl<T: Ord> Ord for FrontierEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // min-heap on f, earlier insertions win ties
        other.f_cost.cmp(&self.f_cost)
            .then_with(|| other.stamp.cmp(&self.stamp))
    }
}
impl<T: Ord> PartialOrd for FrontierEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T: PartialEq> PartialEq for FrontierEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.f_cost == other.f_cost && self.stamp == other.stamp
    }
}
impl<T: PartialEq> Eq for FrontierEntry<T> {}


/// Owns every node of a search, one per distinct state
/// Tracks which nodes are open (frontier, ordered by f) and which are closed
#[derive(Debug)]
pub struct Registry<N, C> {
    nodes: FxIndexMap<N, Node<C>>,
    frontier: BinaryHeap<FrontierEntry<C>>,
    next_stamp: u64,
    open_len: usize,
}

impl<N, C> Default for Registry<N, C>
where
    N: Eq + Hash + Clone + Debug,
    C: Zero + SaturatingAdd + Ord + Copy + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, C> Registry<N, C>
where
    N: Eq + Hash + Clone + Debug,
    C: Zero + SaturatingAdd + Ord + Copy + Debug,
{
    pub fn new() -> Self {
        Self {
            nodes: FxIndexMap::default(),
            frontier: BinaryHeap::new(),
            next_stamp: 0,
            open_len: 0,
        }
    }

    /// Resolve `state` to its canonical node
    /// Returns the existing node (open or closed) if the state was seen before,
    /// otherwise registers a fresh node that is in neither set
    pub fn canonicalize(&mut self, state: N) -> NodeId {
        let entry = self.nodes.entry(state);
        let index = entry.index();
        entry.or_insert_with(Node::fresh);
        index
    }

    /// Put a node on the frontier, or re-key it if it is already open
    pub fn insert_open(&mut self, index: NodeId) {
        let stamp = self.next_stamp;
        self.next_stamp += 1;

        let Some((_, node)) = self.nodes.get_index_mut(index) else {
            return;
        };
        match node.status {
            NodeStatus::Fresh => self.open_len += 1,
            NodeStatus::Open => {},
            NodeStatus::Closed => return,
        }
        node.status = NodeStatus::Open;
        node.stamp = stamp;
        self.frontier.push(FrontierEntry {
            index,
            f_cost: node.f(),
            stamp,
        });
    }

    /// Remove and return an open node with the smallest f
    /// Stale heap entries left behind by re-keying are skipped
    pub fn pop_min(&mut self) -> Option<NodeId> {
        while let Some(FrontierEntry { index, stamp, .. }) = self.frontier.pop() {
            let node = &self.nodes[index];
            if node.is_open() && node.stamp == stamp {
                return Some(index);
            }
        }
        None
    }

    /// Move an open node to the closed set
    pub fn move_to_closed(&mut self, index: NodeId) {
        if let Some((_, node)) = self.nodes.get_index_mut(index) {
            if node.status == NodeStatus::Open {
                self.open_len -= 1;
            }
            node.status = NodeStatus::Closed;
        }
    }

    pub fn open_len(&self) -> usize {
        self.open_len
    }

    pub fn is_frontier_empty(&self) -> bool {
        self.open_len == 0
    }

    /// Number of distinct states registered
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, state: &N) -> Option<NodeId> {
        self.nodes.get_index_of(state)
    }

    pub fn state(&self, index: NodeId) -> Option<&N> {
        self.nodes.get_index(index).map(|(state, _)| state)
    }

    pub fn node(&self, index: NodeId) -> Option<&Node<C>> {
        self.nodes.get_index(index).map(|(_, node)| node)
    }

    pub fn get(&self, state: &N) -> Option<&Node<C>> {
        self.nodes.get(state)
    }

    pub(crate) fn node_mut(&mut self, index: NodeId) -> Option<&mut Node<C>> {
        self.nodes.get_index_mut(index).map(|(_, node)| node)
    }

    /// All registered states with their nodes, in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&N, &Node<C>)> {
        self.nodes.iter()
    }
}
