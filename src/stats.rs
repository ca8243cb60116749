//! Statistics collection for one move selection
//!
//! Every strategy fills the fields that apply to it and leaves the rest at
//! zero.

use std::time::Duration;

/// Statistics collected while selecting one move
#[derive(Debug, Clone, PartialEq)]
pub struct SearchStatistics {
    /// Monte Carlo iterations (one selection, expansion, simulation and
    /// backpropagation each)
    pub iterations: usize,

    /// Random playouts run, including those cut short by the deadline
    pub depth_charges: usize,

    /// Positions generated by minimax
    pub nodes_expanded: usize,

    /// Deepest fully completed iterative-deepening depth
    pub completed_depth: usize,

    /// Nodes in the Monte Carlo tree
    pub tree_size: usize,

    /// Deepest node reached in the Monte Carlo tree
    pub max_depth: usize,

    /// Expected goal value of the chosen move, in goal units
    pub estimated_utility: f64,

    /// Total time spent searching
    pub total_time: Duration,

    /// Whether the search was cut short by the deadline
    pub stopped_early: bool,
}

impl SearchStatistics {
    /// Creates a new, empty statistics object
    pub fn new() -> Self {
        SearchStatistics {
            iterations: 0,
            depth_charges: 0,
            nodes_expanded: 0,
            completed_depth: 0,
            tree_size: 0,
            max_depth: 0,
            estimated_utility: 0.0,
            total_time: Duration::from_secs(0),
            stopped_early: false,
        }
    }

    /// Returns the number of depth charges per second
    pub fn depth_charges_per_second(&self) -> f64 {
        if self.total_time.as_secs_f64() <= 0.0 {
            return 0.0;
        }
        self.depth_charges as f64 / self.total_time.as_secs_f64()
    }

    /// Returns a one-line summary of the statistics
    pub fn summary(&self) -> String {
        format!(
            "iterations={} depth_charges={} ({:.0}/s) nodes={} depth={} tree={} \
             max_tree_depth={} estimate={:.1} time={:.3}s stopped_early={}",
            self.iterations,
            self.depth_charges,
            self.depth_charges_per_second(),
            self.nodes_expanded,
            self.completed_depth,
            self.tree_size,
            self.max_depth,
            self.estimated_utility,
            self.total_time.as_secs_f64(),
            self.stopped_early
        )
    }
}

impl Default for SearchStatistics {
    fn default() -> Self {
        Self::new()
    }
}
