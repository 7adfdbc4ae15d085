use std::fmt::Debug;
use num_traits::{SaturatingAdd, Zero};


/// Index of a node in the registry arena
pub type NodeId = usize;


/// Frontier membership of a node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeStatus {
    Fresh,  // registered, not yet attached to any parent
    Open,
    Closed,
}


/// Search bookkeeping for a single state
/// The state itself is the key of the registry entry holding this node
#[derive(Clone, Debug)]
pub struct Node<C> {
    g: C, // best known cost from the start
    h: C, // heuristic estimate to the goal
    f: C, // g + h
    parent: Option<NodeId>,
    children: Vec<NodeId>, // every node generated from this one, duplicates allowed
    pub(crate) status: NodeStatus,
    pub(crate) stamp: u64, // id of the live frontier entry, see Registry::insert_open
}

impl<C> Node<C>
where
    C: Zero + SaturatingAdd + Ord + Copy + Debug,
{
    pub(crate) fn fresh() -> Self {
        Self {
            g: Zero::zero(),
            h: Zero::zero(),
            f: Zero::zero(),
            parent: None,
            children: Vec::new(),
            status: NodeStatus::Fresh,
            stamp: 0,
        }
    }

    pub fn g(&self) -> C {
        self.g
    }

    pub fn h(&self) -> C {
        self.h
    }

    pub fn f(&self) -> C {
        self.f
    }

    /// Current cheapest known predecessor, None for the start node
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == NodeStatus::Open
    }

    pub fn is_closed(&self) -> bool {
        self.status == NodeStatus::Closed
    }

    /// Seed the start node
    pub(crate) fn set_root(&mut self, h: C) {
        self.parent = None;
        self.g = Zero::zero();
        self.h = h;
        self.f = h;
    }

    /// Attach to `parent` with the given path cost and a freshly computed heuristic
    /// f saturates at the top of the cost range
    pub(crate) fn attach(&mut self, parent: NodeId, g: C, h: C) {
        self.parent = Some(parent);
        self.g = g;
        self.h = h;
        self.f = g.saturating_add(&h);
    }

    /// Reparent with a cheaper cost, keeping the heuristic
    pub(crate) fn relax(&mut self, parent: NodeId, g: C) {
        self.parent = Some(parent);
        self.g = g;
        self.f = g.saturating_add(&self.h);
    }

    pub(crate) fn add_child(&mut self, child: NodeId) {
        self.children.push(child);
    }
}
