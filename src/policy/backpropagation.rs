//! Backpropagation policies for the MCTS algorithm
//!
//! Backpropagation policies determine how node statistics are updated
//! after a simulation.

use crate::tree::{NodeIndex, SearchTree};

/// Trait for policies that backpropagate simulation results
pub trait BackpropagationPolicy: Send + Sync {
    /// Credits one simulation result to `leaf` and its ancestors
    ///
    /// `utility` is the searching role's normalised score and
    /// `opponent_utility` the best normalised score among the other roles.
    fn backpropagate(
        &self,
        tree: &mut SearchTree,
        leaf: NodeIndex,
        utility: f64,
        opponent_utility: f64,
    );

    /// Create a boxed clone of this policy
    fn clone_box(&self) -> Box<dyn BackpropagationPolicy>;
}

/// Standard backpropagation policy
///
/// Every node on the path gets exactly one visit and the unmodified score.
#[derive(Debug, Clone)]
pub struct StandardPolicy;

impl StandardPolicy {
    /// Creates a new standard policy
    pub fn new() -> Self {
        StandardPolicy
    }
}

impl Default for StandardPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl BackpropagationPolicy for StandardPolicy {
    fn backpropagate(
        &self,
        tree: &mut SearchTree,
        leaf: NodeIndex,
        utility: f64,
        opponent_utility: f64,
    ) {
        let path: Vec<NodeIndex> = tree.ancestry(leaf).collect();
        for index in path {
            tree.node_mut(index).record(utility, opponent_utility);
        }
    }

    fn clone_box(&self) -> Box<dyn BackpropagationPolicy> {
        Box::new(self.clone())
    }
}

impl BackpropagationPolicy for Box<dyn BackpropagationPolicy> {
    fn backpropagate(
        &self,
        tree: &mut SearchTree,
        leaf: NodeIndex,
        utility: f64,
        opponent_utility: f64,
    ) {
        (**self).backpropagate(tree, leaf, utility, opponent_utility)
    }

    fn clone_box(&self) -> Box<dyn BackpropagationPolicy> {
        (**self).clone_box()
    }
}
