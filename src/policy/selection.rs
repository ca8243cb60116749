//! Selection policies for the MCTS algorithm
//!
//! Selection policies determine which node a simulation descends to,
//! balancing exploration and exploitation.

use crate::tree::{NodeIndex, SearchTree};
use crate::utils;

/// Trait for policies that pick the node to simulate from
pub trait SelectionPolicy: Send + Sync {
    /// Picks a child of `node`
    ///
    /// Returns `None` when `node` has no children.
    fn select_child(&self, tree: &SearchTree, node: NodeIndex) -> Option<NodeIndex>;

    /// Descends from the root to the node the next simulation starts at
    ///
    /// The descent stops at a non-root node that was never visited, at a
    /// terminal node and at a node with no children.
    fn descend(&self, tree: &SearchTree) -> NodeIndex {
        let mut current = SearchTree::ROOT;
        loop {
            let node = tree.node(current);
            if current != SearchTree::ROOT && node.visits() == 0 {
                return current;
            }
            if node.terminal {
                return current;
            }
            match self.select_child(tree, current) {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// Create a boxed clone of this policy
    fn clone_box(&self) -> Box<dyn SelectionPolicy>;
}

/// Upper Confidence Bound 1 (UCB1) selection policy
///
/// ```text
/// UCB1 = average_utility + exploration_constant * sqrt(ln(parent_visits) / child_visits)
/// ```
///
/// Utilities are normalised to [0, 1], so the usual constant sqrt(2) applies.
/// A child that was never visited is always picked before any UCB1
/// comparison is made (forced exploration), the first such child in
/// expansion order.
#[derive(Debug, Clone)]
pub struct Ucb1Policy {
    /// Exploration constant; larger values favour less-visited children
    pub exploration_constant: f64,
}

impl Ucb1Policy {
    /// Creates a new UCB1 policy with the given exploration constant
    pub fn new(exploration_constant: f64) -> Self {
        Ucb1Policy {
            exploration_constant,
        }
    }

    /// Calculates the UCB1 value of a child
    pub fn ucb1_value(&self, total_utility: f64, child_visits: u64, parent_visits: u64) -> f64 {
        utils::ucb1_value(
            total_utility,
            child_visits,
            parent_visits,
            self.exploration_constant,
        )
    }
}

impl Default for Ucb1Policy {
    fn default() -> Self {
        Self::new(std::f64::consts::SQRT_2)
    }
}

impl SelectionPolicy for Ucb1Policy {
    fn select_child(&self, tree: &SearchTree, node: NodeIndex) -> Option<NodeIndex> {
        let children = tree.children(node);

        if let Some(&unvisited) = children.iter().find(|&&c| tree.node(c).visits() == 0) {
            return Some(unvisited);
        }

        let parent_visits = tree.node(node).visits();
        let mut best = None;
        let mut best_value = f64::NEG_INFINITY;
        for &child in children {
            let stats = tree.node(child);
            let value = self.ucb1_value(stats.total_utility(), stats.visits(), parent_visits);
            if value > best_value {
                best_value = value;
                best = Some(child);
            }
        }
        best
    }

    fn clone_box(&self) -> Box<dyn SelectionPolicy> {
        Box::new(self.clone())
    }
}

impl SelectionPolicy for Box<dyn SelectionPolicy> {
    fn select_child(&self, tree: &SearchTree, node: NodeIndex) -> Option<NodeIndex> {
        (**self).select_child(tree, node)
    }

    fn descend(&self, tree: &SearchTree) -> NodeIndex {
        (**self).descend(tree)
    }

    fn clone_box(&self) -> Box<dyn SelectionPolicy> {
        (**self).clone_box()
    }
}
