//! # ggp-player
//!
//! A general game playing engine: a compiled boolean circuit answers the
//! rules of any finite, deterministic, perfect-information game, and a family
//! of deadline-bounded search strategies picks a move every turn.
//!
//! ## Features
//!
//! - Circuit ("propnet") evaluation with per-query memoisation and no native
//!   recursion
//! - One minimax engine covering exhaustive, depth-limited, node-limited and
//!   iterative-deepening search
//! - UCT Monte Carlo Tree Search with random depth charges
//! - Pruning of irrelevant sub-games in single-role circuits
//! - Search statistics for every move
//!
//! ## Basic Usage
//!
//! ```
//! use std::time::Duration;
//!
//! use ggp_player::clock::Deadline;
//! use ggp_player::config::{PlayerConfig, SearchConfig, StrategyKind};
//! use ggp_player::{fixtures, Player, Role};
//!
//! fn main() -> Result<(), ggp_player::GameError> {
//!     let circuit = fixtures::one_ply()?;
//!     let config = PlayerConfig::default()
//!         .with_strategy(StrategyKind::MonteCarloTreeSearch)
//!         .with_search(SearchConfig::default().with_seed(7).with_max_iterations(50));
//!
//!     let margin = Duration::from_millis(10);
//!     let meta = Deadline::after(Duration::from_secs(1), margin);
//!     let mut player = Player::prepare(circuit, Role::new("robot"), config, meta)?;
//!
//!     let start = player.initial_position();
//!     let chosen = player.select_move(&start, Deadline::after(Duration::from_secs(1), margin))?;
//!     assert_eq!(chosen.term(), "a");
//!     println!("{}", player.last_statistics().summary());
//!     Ok(())
//! }
//! ```
//!
//! ## How It Works
//!
//! 1. **Evaluation**: a position assigns the base propositions, a joint move
//!    assigns the input propositions, and legality, termination, goals and
//!    successors are read off the circuit by propagating truth values.
//!
//! 2. **Search**: strategies only see the `StateMachine` queries and a
//!    `Deadline`. Minimax walks the game tree with an explicit stack; Monte
//!    Carlo Tree Search grows an arena tree by selection, expansion,
//!    simulation and backpropagation.
//!
//! 3. **Turns**: `Player` owns the evaluator and the strategy, answers
//!    trivial turns immediately and otherwise searches until the deadline's
//!    safety margin is reached.

pub mod circuit;
pub mod clock;
pub mod config;
pub mod evaluator;
pub mod fixtures;
pub mod game_state;
pub mod mcts;
pub mod minimax;
pub mod optimize;
pub mod player;
pub mod policy;
pub mod stats;
pub mod strategy;
pub mod tree;
pub mod utils;

pub use circuit::{Circuit, CircuitBuilder};
pub use clock::Deadline;
pub use config::{PlayerConfig, SearchConfig, StrategyKind};
pub use evaluator::CircuitEvaluator;
pub use game_state::{JointMove, Move, Position, Role, StateMachine};
pub use mcts::MonteCarloTreeSearch;
pub use minimax::{IterativeDeepening, MinimaxStrategy};
pub use player::Player;
pub use policy::{BackpropagationPolicy, Heuristic, SelectionPolicy, SimulationPolicy};
pub use stats::SearchStatistics;
pub use strategy::Strategy;
pub use tree::{SearchNode, SearchTree};

/// Error types for game evaluation and search
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A role did not have exactly one true goal proposition
    #[error("goal of {role} is ill-defined: {true_goals} goal propositions are true")]
    GoalDefinition { role: String, true_goals: usize },

    /// A role has no legal move in a non-terminal position
    #[error("{role} has no legal move in a non-terminal position")]
    MoveDefinition { role: String },

    /// A joint move could not be applied
    #[error("transition is ill-defined: {0}")]
    TransitionDefinition(String),

    /// The role is not declared by the circuit
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// The circuit failed validation
    #[error("invalid circuit: {0}")]
    InvalidCircuit(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Asked for a move in a terminal position
    #[error("no legal actions available from a terminal position")]
    NoLegalActions,
}

/// Result type for game evaluation and search
pub type Result<T> = std::result::Result<T, GameError>;
