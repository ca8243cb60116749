//! Turn controller
//!
//! A `Player` is created once per match during the metagame and then asked
//! for one move per turn.

use std::time::{Duration, Instant};

use log::{info, warn};

use crate::circuit::Circuit;
use crate::clock::Deadline;
use crate::config::PlayerConfig;
use crate::evaluator::CircuitEvaluator;
use crate::game_state::{JointMove, Move, Position, Role, StateMachine};
use crate::optimize::prune_unreachable;
use crate::stats::SearchStatistics;
use crate::strategy::{self, Strategy};
use crate::{GameError, Result};

/// Plays one role of one match
pub struct Player {
    role: Role,
    machine: CircuitEvaluator,
    strategy: Box<dyn Strategy<CircuitEvaluator>>,
    config: PlayerConfig,
    last_statistics: SearchStatistics,
    pruned: bool,
}

impl Player {
    /// Metagame hook: builds the evaluator and the strategy for `role`
    ///
    /// Single-role circuits are pruned first when the configuration asks
    /// for it and `meta_deadline` has not expired. If pruning fails, or the
    /// pruned circuit does not survive a check on the initial position, the
    /// unpruned circuit is used.
    pub fn prepare(
        circuit: Circuit,
        role: Role,
        config: PlayerConfig,
        meta_deadline: Deadline,
    ) -> Result<Player> {
        let start = Instant::now();
        config.search.validate()?;
        if !circuit.roles().contains(&role) {
            return Err(GameError::UnknownRole(role.name().to_string()));
        }

        let wants_pruning = config.prune_single_role && circuit.roles().len() == 1;
        let mut pruned = false;
        let machine = if wants_pruning && !meta_deadline.expired() {
            match pruned_evaluator(&circuit, &role) {
                Ok(machine) => {
                    pruned = true;
                    machine
                }
                Err(err) => {
                    warn!("pruning failed, keeping the full circuit: {}", err);
                    CircuitEvaluator::new(circuit)
                }
            }
        } else {
            CircuitEvaluator::new(circuit)
        };

        let strategy = strategy::build::<CircuitEvaluator>(config.strategy, &config.search)?;
        info!(
            "prepared {} with {} strategy on {} nodes (pruned={}) in {:?}",
            role,
            strategy.name(),
            machine.circuit().len(),
            pruned,
            start.elapsed()
        );

        Ok(Player {
            role,
            machine,
            strategy,
            config,
            last_statistics: SearchStatistics::new(),
            pruned,
        })
    }

    /// Chooses this turn's move
    ///
    /// A forced move (the only legal one) is returned without searching.
    pub fn select_move(&mut self, position: &Position, deadline: Deadline) -> Result<Move> {
        let start = Instant::now();
        if self.machine.is_terminal(position) {
            return Err(GameError::NoLegalActions);
        }

        let legal = self.machine.legal_moves(position, &self.role)?;
        if let [only] = legal.as_slice() {
            self.last_statistics = SearchStatistics::new();
            self.last_statistics.total_time = start.elapsed();
            info!("{} plays forced move {}", self.role, only);
            return Ok(only.clone());
        }

        let mv = self
            .strategy
            .select_move(&mut self.machine, &self.role, position, deadline)?;
        self.last_statistics = self.strategy.statistics().clone();
        info!(
            "{} plays {} after {:?} ({})",
            self.role,
            mv,
            start.elapsed(),
            self.last_statistics.summary()
        );
        Ok(mv)
    }

    /// A deadline `budget` from now with the configured safety margin
    pub fn deadline_in(&self, budget: Duration) -> Deadline {
        Deadline::after(budget, self.config.search.safety_margin)
    }

    /// The role this player plays
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// The position the match starts in, in this player's circuit
    pub fn initial_position(&mut self) -> Position {
        self.machine.initial_position()
    }

    /// Advances `position` by the joint move everybody played
    pub fn next_position(&mut self, position: &Position, joint_move: &JointMove) -> Result<Position> {
        self.machine.next_position(position, joint_move)
    }

    /// Re-expresses a position of `source` in this player's circuit
    ///
    /// Bases are matched by name; bases pruned away are dropped.
    pub fn import_position(&self, source: &Circuit, position: &Position) -> Position {
        let circuit = self.machine.circuit();
        Position::from_bases(position.bases().iter().filter_map(|&index| {
            source
                .bases()
                .get(index)
                .and_then(|base| circuit.base_index(&base.name))
        }))
    }

    /// Statistics of the last `select_move`
    pub fn last_statistics(&self) -> &SearchStatistics {
        &self.last_statistics
    }

    /// The evaluator answering this player's queries
    pub fn machine(&mut self) -> &mut CircuitEvaluator {
        &mut self.machine
    }

    /// Whether the circuit was pruned during the metagame
    pub fn is_pruned(&self) -> bool {
        self.pruned
    }
}

/// Prunes `circuit` and checks the result still plays from the start
fn pruned_evaluator(circuit: &Circuit, role: &Role) -> Result<CircuitEvaluator> {
    let mut full = CircuitEvaluator::new(circuit.clone());
    let pruned = prune_unreachable(circuit)?;
    let mut machine = CircuitEvaluator::new(pruned);

    let start = machine.initial_position();
    let full_start = full.initial_position();
    if machine.is_terminal(&start) != full.is_terminal(&full_start) {
        return Err(GameError::InvalidCircuit(
            "pruning changed whether the initial position is terminal".into(),
        ));
    }
    if !machine.is_terminal(&start)
        && machine.legal_moves(&start, role)? != full.legal_moves(&full_start, role)?
    {
        return Err(GameError::InvalidCircuit(
            "pruning changed the legal moves of the initial position".into(),
        ));
    }
    Ok(machine)
}
