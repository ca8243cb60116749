//! The interface every move-selection strategy implements, the two baseline
//! strategies, and construction from a `StrategyKind`.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::clock::Deadline;
use crate::config::{SearchConfig, StrategyKind};
use crate::game_state::{Move, Position, Role, StateMachine};
use crate::mcts::MonteCarloTreeSearch;
use crate::minimax::{IterativeDeepening, MinimaxStrategy};
use crate::stats::SearchStatistics;
use crate::{GameError, Result};

/// Chooses one move for `role` before a deadline
pub trait Strategy<M: StateMachine> {
    /// Returns a legal move for `role` in `position`
    ///
    /// Returns before `deadline` is breached. Running out of time is not an
    /// error; the best move known at that point is returned.
    fn select_move(
        &mut self,
        machine: &mut M,
        role: &Role,
        position: &Position,
        deadline: Deadline,
    ) -> Result<Move>;

    /// Statistics of the last `select_move` call
    fn statistics(&self) -> &SearchStatistics;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Random number generator seeded from `seed`, or from entropy
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Legal moves of `role`, or `NoLegalActions` in a terminal position
pub(crate) fn playable_moves<M: StateMachine>(
    machine: &mut M,
    role: &Role,
    position: &Position,
) -> Result<Vec<Move>> {
    if machine.is_terminal(position) {
        return Err(GameError::NoLegalActions);
    }
    let moves = machine.legal_moves(position, role)?;
    if moves.is_empty() {
        return Err(GameError::NoLegalActions);
    }
    Ok(moves)
}

/// Always plays the first legal move
#[derive(Debug, Default)]
pub struct LegalStrategy {
    statistics: SearchStatistics,
}

impl LegalStrategy {
    /// Creates the strategy
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M: StateMachine> Strategy<M> for LegalStrategy {
    fn select_move(
        &mut self,
        machine: &mut M,
        role: &Role,
        position: &Position,
        _deadline: Deadline,
    ) -> Result<Move> {
        self.statistics = SearchStatistics::new();
        let moves = playable_moves(machine, role, position)?;
        moves.into_iter().next().ok_or(GameError::NoLegalActions)
    }

    fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    fn name(&self) -> &'static str {
        "legal"
    }
}

/// Plays a uniformly random legal move
#[derive(Debug)]
pub struct RandomStrategy {
    rng: StdRng,
    statistics: SearchStatistics,
}

impl RandomStrategy {
    /// Creates the strategy; `seed` fixes the sequence of choices
    pub fn new(seed: Option<u64>) -> Self {
        RandomStrategy {
            rng: seeded_rng(seed),
            statistics: SearchStatistics::new(),
        }
    }
}

impl<M: StateMachine> Strategy<M> for RandomStrategy {
    fn select_move(
        &mut self,
        machine: &mut M,
        role: &Role,
        position: &Position,
        _deadline: Deadline,
    ) -> Result<Move> {
        self.statistics = SearchStatistics::new();
        let moves = playable_moves(machine, role, position)?;
        moves
            .choose(&mut self.rng)
            .cloned()
            .ok_or(GameError::NoLegalActions)
    }

    fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Builds the strategy described by `kind`
pub fn build<M: StateMachine + 'static>(
    kind: StrategyKind,
    config: &SearchConfig,
) -> Result<Box<dyn Strategy<M>>> {
    config.validate()?;
    let strategy: Box<dyn Strategy<M>> = match kind {
        StrategyKind::Legal => Box::new(LegalStrategy::new()),
        StrategyKind::Random => Box::new(RandomStrategy::new(config.seed)),
        StrategyKind::Exhaustive(opponents) => {
            Box::new(MinimaxStrategy::exhaustive(opponents).with_seed(config.seed))
        }
        StrategyKind::DepthLimited { plies, heuristic } => {
            if plies == 0 {
                return Err(GameError::InvalidConfiguration(
                    "depth limit must be at least one ply".into(),
                ));
            }
            Box::new(MinimaxStrategy::depth_limited(plies, heuristic).with_seed(config.seed))
        }
        StrategyKind::NodeLimited { nodes, heuristic } => {
            if nodes == 0 {
                return Err(GameError::InvalidConfiguration(
                    "node limit must be positive".into(),
                ));
            }
            Box::new(MinimaxStrategy::node_limited(nodes, heuristic).with_seed(config.seed))
        }
        StrategyKind::Bounded {
            plies,
            nodes,
            heuristic,
        } => {
            if plies == 0 || nodes == 0 {
                return Err(GameError::InvalidConfiguration(
                    "depth and node limits must both be positive".into(),
                ));
            }
            Box::new(MinimaxStrategy::bounded(plies, nodes, heuristic).with_seed(config.seed))
        }
        StrategyKind::IterativeDeepening { heuristic } => {
            Box::new(IterativeDeepening::new(heuristic).with_seed(config.seed))
        }
        StrategyKind::MonteCarloTreeSearch => Box::new(MonteCarloTreeSearch::new(config.clone())),
    };
    Ok(strategy)
}
