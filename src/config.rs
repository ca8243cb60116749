//! Configuration options for the player and its search strategies
//!
//! `SearchConfig` holds the tunables shared by every strategy, `StrategyKind`
//! picks the strategy, and `PlayerConfig` bundles both for the turn
//! controller.

use std::time::Duration;

use crate::policy::leaf::Heuristic;
use crate::{GameError, Result};

/// Criteria for selecting the move after a Monte Carlo search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestChildCriteria {
    /// Select the root child with the highest average utility
    HighestAverage,

    /// For each of our moves take the worst average over the opponents'
    /// responses and play the move whose worst case is best
    ///
    /// Ties are broken in favour of the move that leaves the opponents the
    /// lowest average utility.
    Maximin,
}

/// How minimax treats the roles that are not choosing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpponentModel {
    /// Every other role plays `Move::noop()`
    ///
    /// Only meaningful for single-role games or degenerate multi-role games
    /// whose other roles never act.
    NoOp,

    /// Every legal joint response is considered and the worst one for us
    /// is assumed
    Adversarial,
}

/// The search strategy a player uses
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrategyKind {
    /// Always the first legal move
    Legal,
    /// A uniformly random legal move
    Random,
    /// Full game-tree minimax without cutoff
    Exhaustive(OpponentModel),
    /// Adversarial minimax cut off after `plies` of our moves
    DepthLimited { plies: usize, heuristic: Heuristic },
    /// Adversarial minimax cut off after expanding `nodes` positions
    NodeLimited { nodes: usize, heuristic: Heuristic },
    /// Adversarial minimax cut off by whichever of the two limits hits first
    Bounded {
        plies: usize,
        nodes: usize,
        heuristic: Heuristic,
    },
    /// Depth-limited minimax with the depth raised until time runs out
    IterativeDeepening { heuristic: Heuristic },
    /// UCT Monte Carlo Tree Search with random depth charges
    MonteCarloTreeSearch,
}

/// Tunables shared by the search strategies
///
/// # Example
///
/// ```
/// use ggp_player::config::{BestChildCriteria, SearchConfig};
/// use std::time::Duration;
///
/// let config = SearchConfig::default()
///     .with_exploration_constant(1.0)
///     .with_rollouts_per_expansion(3)
///     .with_safety_margin(Duration::from_millis(250))
///     .with_best_child_criteria(BestChildCriteria::Maximin);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Exploration constant `C` of UCB1; utilities are normalised to [0, 1]
    pub exploration_constant: f64,

    /// Depth charges averaged per Monte Carlo expansion
    pub rollouts_per_expansion: usize,

    /// Time reserved before the deadline for returning the move
    pub safety_margin: Duration,

    /// Optional cap on Monte Carlo iterations
    ///
    /// The deadline always applies as well.
    pub max_iterations: Option<usize>,

    /// Seed for the random number generator; `None` draws from entropy
    pub seed: Option<u64>,

    /// Criteria for selecting the move after a Monte Carlo search
    pub best_child_criteria: BestChildCriteria,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            exploration_constant: std::f64::consts::SQRT_2,
            rollouts_per_expansion: 5,
            safety_margin: Duration::from_millis(500),
            max_iterations: None,
            seed: None,
            best_child_criteria: BestChildCriteria::HighestAverage,
        }
    }
}

impl SearchConfig {
    /// Sets the UCB1 exploration constant
    pub fn with_exploration_constant(mut self, constant: f64) -> Self {
        self.exploration_constant = constant;
        self
    }

    /// Sets how many depth charges are averaged per expansion
    pub fn with_rollouts_per_expansion(mut self, rollouts: usize) -> Self {
        self.rollouts_per_expansion = rollouts;
        self
    }

    /// Sets the time reserved before the deadline
    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }

    /// Caps the number of Monte Carlo iterations
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    /// Fixes the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the criteria for selecting the move after a Monte Carlo search
    pub fn with_best_child_criteria(mut self, criteria: BestChildCriteria) -> Self {
        self.best_child_criteria = criteria;
        self
    }

    /// Rejects settings no search can run with
    pub fn validate(&self) -> Result<()> {
        if self.exploration_constant.is_nan() || self.exploration_constant < 0.0 {
            return Err(GameError::InvalidConfiguration(format!(
                "exploration constant must be non-negative, got {}",
                self.exploration_constant
            )));
        }
        if self.rollouts_per_expansion == 0 {
            return Err(GameError::InvalidConfiguration(
                "at least one rollout per expansion is required".into(),
            ));
        }
        if self.max_iterations == Some(0) {
            return Err(GameError::InvalidConfiguration(
                "max_iterations must be positive when set".into(),
            ));
        }
        Ok(())
    }
}

/// Everything the turn controller needs to build a player
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// The strategy to search with
    pub strategy: StrategyKind,

    /// Tunables passed to the strategy
    pub search: SearchConfig,

    /// Prune irrelevant sub-games from single-role circuits during the
    /// metagame
    pub prune_single_role: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            strategy: StrategyKind::MonteCarloTreeSearch,
            search: SearchConfig::default(),
            prune_single_role: true,
        }
    }
}

impl PlayerConfig {
    /// Sets the strategy
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the search tunables
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Enables or disables single-role pruning
    pub fn with_pruning(mut self, prune: bool) -> Self {
        self.prune_single_role = prune;
        self
    }
}
