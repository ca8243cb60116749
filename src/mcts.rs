//! Main implementation of the Monte Carlo Tree Search algorithm
//!
//! Each iteration runs the four phases: selection descends the tree with
//! UCB1, expansion adds one child per legal joint move, simulation plays
//! random depth charges, and backpropagation credits the result to the
//! selected node and all its ancestors. The tree lives for one
//! `select_move` call.

use std::collections::BTreeMap;
use std::time::Instant;

use log::{debug, trace};
use rand::rngs::StdRng;

use crate::clock::Deadline;
use crate::config::{BestChildCriteria, SearchConfig};
use crate::game_state::{Move, Position, Role, StateMachine};
use crate::policy::backpropagation::{BackpropagationPolicy, StandardPolicy};
use crate::policy::selection::{SelectionPolicy, Ucb1Policy};
use crate::policy::simulation::{DepthChargePolicy, SimulationPolicy};
use crate::stats::SearchStatistics;
use crate::strategy::{playable_moves, seeded_rng, Strategy};
use crate::tree::{NodeIndex, SearchTree};
use crate::utils;
use crate::{GameError, Result};

/// Iterations between progress logs
const PROGRESS_INTERVAL: usize = 1000;

/// UCT Monte Carlo Tree Search
pub struct MonteCarloTreeSearch<M: StateMachine> {
    /// Configuration for the search
    config: SearchConfig,

    /// Statistics gathered during the last search
    statistics: SearchStatistics,

    /// Policy for selecting the node to simulate from
    selection_policy: Box<dyn SelectionPolicy>,

    /// Policy for playing out positions
    simulation_policy: Box<dyn SimulationPolicy<M>>,

    /// Policy for backpropagating results
    backpropagation_policy: Box<dyn BackpropagationPolicy>,

    rng: StdRng,

    /// Tree of the last search
    tree: Option<SearchTree>,
}

impl<M: StateMachine + 'static> MonteCarloTreeSearch<M> {
    /// Creates a search with the default UCB1, depth-charge and standard
    /// backpropagation policies
    pub fn new(config: SearchConfig) -> Self {
        let selection_policy: Box<dyn SelectionPolicy> =
            Box::new(Ucb1Policy::new(config.exploration_constant));
        let simulation_policy: Box<dyn SimulationPolicy<M>> =
            Box::new(DepthChargePolicy::new(config.rollouts_per_expansion));
        let backpropagation_policy: Box<dyn BackpropagationPolicy> =
            Box::new(StandardPolicy::new());

        MonteCarloTreeSearch {
            rng: seeded_rng(config.seed),
            config,
            statistics: SearchStatistics::new(),
            selection_policy,
            simulation_policy,
            backpropagation_policy,
            tree: None,
        }
    }

    /// Sets the selection policy to use
    pub fn with_selection_policy<P: SelectionPolicy + 'static>(mut self, policy: P) -> Self {
        self.selection_policy = Box::new(policy);
        self
    }

    /// Sets the simulation policy to use
    pub fn with_simulation_policy<P: SimulationPolicy<M> + 'static>(mut self, policy: P) -> Self {
        self.simulation_policy = Box::new(policy);
        self
    }

    /// Sets the backpropagation policy to use
    pub fn with_backpropagation_policy<P: BackpropagationPolicy + 'static>(
        mut self,
        policy: P,
    ) -> Self {
        self.backpropagation_policy = Box::new(policy);
        self
    }
}

impl<M: StateMachine> MonteCarloTreeSearch<M> {
    /// The tree built by the last search
    pub fn tree(&self) -> Option<&SearchTree> {
        self.tree.as_ref()
    }

    /// Returns the statistics of the last search
    pub fn get_statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Runs the search and returns the chosen move for `role`
    pub fn search(
        &mut self,
        machine: &mut M,
        role: &Role,
        position: &Position,
        deadline: &Deadline,
    ) -> Result<Move> {
        let start = Instant::now();
        self.statistics = SearchStatistics::new();
        let legal = playable_moves(machine, role, position)?;
        let role_index = machine.role_index(role)?;
        let max_goal = machine.goal_bounds(role).1;

        let mut tree = SearchTree::new(position.clone(), false);
        self.expand(machine, &mut tree, SearchTree::ROOT, role, deadline)?;

        if let Some(winner) = self.winning_child(machine, &tree, role, max_goal)? {
            debug!("root move {} wins outright", winner);
            self.finish(tree, start, max_goal, max_goal as f64);
            return Ok(winner);
        }

        let mut iterations = 0;
        loop {
            if deadline.expired() {
                self.statistics.stopped_early = true;
                break;
            }
            if self.config.max_iterations.map_or(false, |max| iterations >= max) {
                break;
            }
            self.execute_iteration(machine, &mut tree, role, role_index, deadline)?;
            iterations += 1;
            self.statistics.iterations = iterations;

            if iterations % PROGRESS_INTERVAL == 0 {
                trace!(
                    "{} iterations, {} nodes, root average {:.3}",
                    iterations,
                    tree.len(),
                    tree.root().average_utility()
                );
            }
        }

        let chosen = self.best_child(&tree);
        let (mv, average) = match chosen {
            Some(index) => {
                let node = tree.node(index);
                (node.own_move.clone(), node.average_utility())
            }
            None => (None, 0.0),
        };
        let mv = match mv.or_else(|| legal.first().cloned()) {
            Some(mv) => mv,
            None => return Err(GameError::NoLegalActions),
        };
        let estimate = utils::denormalize_goal(average, (0, max_goal));
        self.finish(tree, start, max_goal, estimate);
        debug!(
            "mcts chose {} after {} iterations",
            mv, self.statistics.iterations
        );
        Ok(mv)
    }

    /// Runs one selection, expansion, simulation and backpropagation
    fn execute_iteration(
        &mut self,
        machine: &mut M,
        tree: &mut SearchTree,
        role: &Role,
        role_index: usize,
        deadline: &Deadline,
    ) -> Result<()> {
        let selected = self.selection_policy.descend(tree);

        if !tree.node(selected).terminal && tree.node(selected).is_leaf() {
            self.expand(machine, tree, selected, role, deadline)?;
        }

        let position = tree.node(selected).position.clone();
        let result = self.simulation_policy.simulate(
            machine,
            role_index,
            &position,
            deadline,
            &mut self.rng,
        )?;
        self.statistics.depth_charges += result.depth_charges;

        self.backpropagation_policy.backpropagate(
            tree,
            selected,
            result.utility,
            result.opponent_utility,
        );
        Ok(())
    }

    /// Adds one child per legal move of `role` times every legal joint
    /// response of the other roles
    fn expand(
        &self,
        machine: &mut M,
        tree: &mut SearchTree,
        index: NodeIndex,
        role: &Role,
        deadline: &Deadline,
    ) -> Result<()> {
        let position = tree.node(index).position.clone();
        for mv in machine.legal_moves(&position, role)? {
            for joint_move in machine.legal_joint_moves_with(&position, role, &mv)? {
                if deadline.expired() {
                    return Ok(());
                }
                let child = machine.next_position(&position, &joint_move)?;
                let terminal = machine.is_terminal(&child);
                tree.add_child(index, child, joint_move, mv.clone(), terminal);
            }
        }
        Ok(())
    }

    /// A root move whose successor is terminal with the maximum goal
    fn winning_child(
        &self,
        machine: &mut M,
        tree: &SearchTree,
        role: &Role,
        max_goal: i32,
    ) -> Result<Option<Move>> {
        let mut by_move: BTreeMap<&Move, bool> = BTreeMap::new();
        for &child in tree.children(SearchTree::ROOT) {
            let node = tree.node(child);
            let Some(mv) = node.own_move.as_ref() else {
                continue;
            };
            let wins = node.terminal && machine.goal(&node.position, role)? == max_goal;
            let entry = by_move.entry(mv).or_insert(true);
            *entry &= wins;
        }
        Ok(by_move
            .into_iter()
            .find(|(_, wins)| *wins)
            .map(|(mv, _)| mv.clone()))
    }

    /// Root child chosen once the budget is spent
    fn best_child(&self, tree: &SearchTree) -> Option<NodeIndex> {
        let children = tree.children(SearchTree::ROOT);
        match self.config.best_child_criteria {
            BestChildCriteria::HighestAverage => {
                let mut best = None;
                let mut best_value = f64::NEG_INFINITY;
                for &child in children {
                    let value = tree.node(child).average_utility();
                    if value > best_value {
                        best_value = value;
                        best = Some(child);
                    }
                }
                best
            }
            BestChildCriteria::Maximin => {
                // Worst child per own move, keyed by the move
                let mut worst: BTreeMap<&Move, NodeIndex> = BTreeMap::new();
                for &child in children {
                    let node = tree.node(child);
                    let Some(mv) = node.own_move.as_ref() else {
                        continue;
                    };
                    let entry = worst.entry(mv).or_insert(child);
                    if node.average_utility() < tree.node(*entry).average_utility() {
                        *entry = child;
                    }
                }

                let mut best: Option<NodeIndex> = None;
                for &candidate in worst.values() {
                    let better = match best {
                        None => true,
                        Some(current) => {
                            let (c, b) = (tree.node(candidate), tree.node(current));
                            c.average_utility() > b.average_utility()
                                || (c.average_utility() == b.average_utility()
                                    && c.average_opponent_utility()
                                        < b.average_opponent_utility())
                        }
                    };
                    if better {
                        best = Some(candidate);
                    }
                }
                best
            }
        }
    }

    fn finish(&mut self, tree: SearchTree, start: Instant, max_goal: i32, estimate: f64) {
        self.statistics.tree_size = tree.len();
        self.statistics.max_depth = tree.max_depth();
        self.statistics.estimated_utility = estimate.min(max_goal as f64);
        self.statistics.total_time = start.elapsed();
        self.tree = Some(tree);
    }
}

impl<M: StateMachine> Strategy<M> for MonteCarloTreeSearch<M> {
    fn select_move(
        &mut self,
        machine: &mut M,
        role: &Role,
        position: &Position,
        deadline: Deadline,
    ) -> Result<Move> {
        self.search(machine, role, position, &deadline)
    }

    fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    fn name(&self) -> &'static str {
        "mcts"
    }
}
