//! Tree data structures for Monte Carlo Tree Search
//!
//! Nodes live in one arena and refer to their parent and children by index,
//! so walking back up after a simulation needs no borrowed path.

use std::fmt;

use crate::game_state::{JointMove, Move, Position};

/// Index of a node inside a `SearchTree`
pub type NodeIndex = usize;

/// One node of the search tree
///
/// The root has no parent and no move. Every other node records the joint
/// move that led to it and, separately, the searching role's part of that
/// joint move.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// The position at this node
    pub position: Position,

    /// The joint move that led here (None for root)
    pub joint_move: Option<JointMove>,

    /// The searching role's move within `joint_move` (None for root)
    pub own_move: Option<Move>,

    /// Parent node (None for root)
    pub parent: Option<NodeIndex>,

    /// Children in expansion order
    pub children: Vec<NodeIndex>,

    /// Depth of this node in the tree (root = 0)
    pub depth: usize,

    /// Whether `position` is terminal
    pub terminal: bool,

    visits: u64,
    total_utility: f64,
    opponent_utility: f64,
}

impl SearchNode {
    fn new(
        position: Position,
        joint_move: Option<JointMove>,
        own_move: Option<Move>,
        parent: Option<NodeIndex>,
        depth: usize,
        terminal: bool,
    ) -> Self {
        SearchNode {
            position,
            joint_move,
            own_move,
            parent,
            children: Vec::new(),
            depth,
            terminal,
            visits: 0,
            total_utility: 0.0,
            opponent_utility: 0.0,
        }
    }

    /// Number of simulations that passed through this node
    pub fn visits(&self) -> u64 {
        self.visits
    }

    /// Sum of the searching role's normalised scores
    pub fn total_utility(&self) -> f64 {
        self.total_utility
    }

    /// Sum of the best opponent's normalised scores
    pub fn opponent_utility(&self) -> f64 {
        self.opponent_utility
    }

    /// Average normalised score of the searching role
    pub fn average_utility(&self) -> f64 {
        crate::utils::exploitation_term(self.total_utility, self.visits)
    }

    /// Average normalised score of the best opponent
    pub fn average_opponent_utility(&self) -> f64 {
        crate::utils::exploitation_term(self.opponent_utility, self.visits)
    }

    /// Records one simulation result
    pub fn record(&mut self, utility: f64, opponent_utility: f64) {
        self.visits += 1;
        self.total_utility += utility;
        self.opponent_utility += opponent_utility;
    }

    /// Returns true if the node has not been expanded
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena holding every node of one search
#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    /// Index of the root node
    pub const ROOT: NodeIndex = 0;

    /// Creates a tree holding only the root
    pub fn new(position: Position, terminal: bool) -> Self {
        SearchTree {
            nodes: vec![SearchNode::new(position, None, None, None, 0, terminal)],
        }
    }

    /// Returns the node at `index`
    ///
    /// # Panics
    ///
    /// If `index` did not come from this tree.
    pub fn node(&self, index: NodeIndex) -> &SearchNode {
        &self.nodes[index]
    }

    /// Mutable access to the node at `index`
    pub fn node_mut(&mut self, index: NodeIndex) -> &mut SearchNode {
        &mut self.nodes[index]
    }

    /// The root node
    pub fn root(&self) -> &SearchNode {
        &self.nodes[Self::ROOT]
    }

    /// Appends a child to `parent` and returns its index
    pub fn add_child(
        &mut self,
        parent: NodeIndex,
        position: Position,
        joint_move: JointMove,
        own_move: Move,
        terminal: bool,
    ) -> NodeIndex {
        let index = self.nodes.len();
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(SearchNode::new(
            position,
            Some(joint_move),
            Some(own_move),
            Some(parent),
            depth,
            terminal,
        ));
        self.nodes[parent].children.push(index);
        index
    }

    /// Children of `index`
    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        &self.nodes[index].children
    }

    /// `index` followed by each of its ancestors up to the root
    pub fn ancestry(&self, index: NodeIndex) -> Ancestry<'_> {
        Ancestry {
            tree: self,
            next: Some(index),
        }
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a tree has at least its root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth of the deepest node
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Renders the tree down to `max_depth` for debugging
    pub fn render(&self, max_depth: usize) -> String {
        let mut out = String::new();
        let mut stack = vec![Self::ROOT];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if node.depth > max_depth {
                continue;
            }
            let label = match &node.joint_move {
                Some(joint) => joint.to_string(),
                None => "root".to_string(),
            };
            out.push_str(&format!(
                "{}{} visits={} avg={:.3}\n",
                "  ".repeat(node.depth),
                label,
                node.visits,
                node.average_utility()
            ));
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

impl fmt::Display for SearchTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(1))
    }
}

/// Iterator from a node up to the root
pub struct Ancestry<'a> {
    tree: &'a SearchTree,
    next: Option<NodeIndex>,
}

impl Iterator for Ancestry<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        let current = self.next?;
        self.next = self.tree.nodes[current].parent;
        Some(current)
    }
}
