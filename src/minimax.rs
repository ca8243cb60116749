//! Minimax search over the game tree
//!
//! One engine covers every variant: an `OpponentModel` decides which joint
//! moves answer each of our moves, a `Cutoff` decides where the search stops
//! expanding, and a `Heuristic` values the positions it stops at. The
//! deadline is always an extra cutoff.
//!
//! The tree is walked with an explicit stack of max and min frames, so long
//! games cannot overflow the native stack.

use std::time::Instant;

use log::{debug, trace};
use rand::rngs::StdRng;

use crate::clock::Deadline;
use crate::config::OpponentModel;
use crate::game_state::{JointMove, Move, Position, Role, StateMachine};
use crate::policy::leaf::Heuristic;
use crate::stats::SearchStatistics;
use crate::strategy::{playable_moves, seeded_rng, Strategy};
use crate::Result;

/// Where the search stops expanding positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cutoff {
    /// Expand until the game ends
    Unbounded,
    /// Stop after this many of our own moves
    Depth(usize),
    /// Stop once this many positions were generated
    Nodes(usize),
    /// Stop at whichever of the two limits is reached first
    DepthOrNodes { plies: usize, nodes: usize },
}

/// Result of one root search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Best root move found
    pub best_move: Move,
    /// Its minimax value in goal units
    pub value: f64,
    /// The deadline interrupted the search
    pub aborted: bool,
    /// Some position was valued by the heuristic instead of being expanded
    pub cutoff_hit: bool,
    /// `best_move` reaches the maximum goal against every response
    pub forced_win: bool,
    /// Positions generated
    pub nodes_expanded: usize,
}

/// Counters and flags shared by every frame of one search
struct SearchContext<'a> {
    role: &'a Role,
    deadline: &'a Deadline,
    bounds: (f64, f64),
    nodes_expanded: usize,
    cutoff_hit: bool,
    aborted: bool,
    /// Set when a heuristic value entered the current root move's value
    estimated: bool,
}

enum Frame {
    /// We pick among `moves`
    Max {
        position: Position,
        depth: usize,
        moves: Vec<Move>,
        next: usize,
        best: f64,
    },
    /// The other roles pick among `responses` to one of our moves
    Min {
        position: Position,
        depth: usize,
        responses: Vec<JointMove>,
        next: usize,
        best: f64,
    },
}

enum Step {
    Push(Frame),
    Leaf(f64),
    Return(f64),
}

/// Minimax engine parameterised by opponent model, cutoff and heuristic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimaxEngine {
    opponents: OpponentModel,
    cutoff: Cutoff,
    heuristic: Heuristic,
}

impl MinimaxEngine {
    /// Creates an engine
    pub fn new(opponents: OpponentModel, cutoff: Cutoff, heuristic: Heuristic) -> Self {
        MinimaxEngine {
            opponents,
            cutoff,
            heuristic,
        }
    }

    /// The same engine with a different cutoff
    pub fn with_cutoff(self, cutoff: Cutoff) -> Self {
        MinimaxEngine { cutoff, ..self }
    }

    /// Searches every root move of `role` and returns the best one
    ///
    /// Root moves are tried in legal-move order; a move that reaches the
    /// maximum goal against every response ends the search at once. If the
    /// deadline interrupts a root move, that move's partial value is
    /// discarded.
    pub fn search<M: StateMachine>(
        &self,
        machine: &mut M,
        role: &Role,
        position: &Position,
        deadline: &Deadline,
        rng: &mut StdRng,
    ) -> Result<SearchOutcome> {
        let moves = playable_moves(machine, role, position)?;
        let (min_goal, max_goal) = machine.goal_bounds(role);
        let mut ctx = SearchContext {
            role,
            deadline,
            bounds: (min_goal as f64, max_goal as f64),
            nodes_expanded: 0,
            cutoff_hit: false,
            aborted: false,
            estimated: false,
        };

        let mut best: Option<(Move, f64)> = None;
        let mut forced_win = false;
        for mv in &moves {
            if deadline.expired() {
                ctx.aborted = true;
                break;
            }
            ctx.estimated = false;
            let value = self.value_of_move(machine, &mut ctx, position, mv, 0, rng)?;
            if ctx.aborted {
                break;
            }
            trace!("root move {} valued {:.1}", mv, value);
            if best.as_ref().map_or(true, |(_, b)| value > *b) {
                best = Some((mv.clone(), value));
            }
            if value >= ctx.bounds.1 && !ctx.estimated {
                forced_win = true;
                break;
            }
        }

        let (best_move, value) = match best {
            Some(found) => found,
            None => (moves[0].clone(), ctx.bounds.0),
        };
        Ok(SearchOutcome {
            best_move,
            value,
            aborted: ctx.aborted,
            cutoff_hit: ctx.cutoff_hit,
            forced_win,
            nodes_expanded: ctx.nodes_expanded,
        })
    }

    /// Minimax value of `role` playing `mv` in `position`
    ///
    /// Returns `None` if the deadline interrupted the search.
    pub fn value_of<M: StateMachine>(
        &self,
        machine: &mut M,
        role: &Role,
        position: &Position,
        mv: &Move,
        deadline: &Deadline,
        rng: &mut StdRng,
    ) -> Result<Option<f64>> {
        let (min_goal, max_goal) = machine.goal_bounds(role);
        let mut ctx = SearchContext {
            role,
            deadline,
            bounds: (min_goal as f64, max_goal as f64),
            nodes_expanded: 0,
            cutoff_hit: false,
            aborted: false,
            estimated: false,
        };
        let value = self.value_of_move(machine, &mut ctx, position, mv, 0, rng)?;
        Ok((!ctx.aborted).then_some(value))
    }

    /// Worst-case value of playing `mv` in `position`
    fn value_of_move<M: StateMachine>(
        &self,
        machine: &mut M,
        ctx: &mut SearchContext<'_>,
        position: &Position,
        mv: &Move,
        depth: usize,
        rng: &mut StdRng,
    ) -> Result<f64> {
        let mut stack = vec![self.min_frame(machine, ctx, position, mv, depth)?];
        let mut returned: Option<f64> = None;

        while let Some(frame) = stack.last_mut() {
            if ctx.aborted {
                return Ok(ctx.bounds.0);
            }
            let step = match frame {
                Frame::Max {
                    position,
                    depth,
                    moves,
                    next,
                    best,
                } => {
                    if let Some(value) = returned.take() {
                        *best = best.max(value);
                    }
                    if *best >= ctx.bounds.1 || *next >= moves.len() {
                        Step::Return(*best)
                    } else {
                        let mv = moves[*next].clone();
                        *next += 1;
                        let position = position.clone();
                        let depth = *depth;
                        Step::Push(self.min_frame(machine, ctx, &position, &mv, depth)?)
                    }
                }
                Frame::Min {
                    position,
                    depth,
                    responses,
                    next,
                    best,
                } => {
                    if let Some(value) = returned.take() {
                        *best = best.min(value);
                    }
                    if *best <= ctx.bounds.0 || *next >= responses.len() {
                        Step::Return(*best)
                    } else {
                        let joint_move = responses[*next].clone();
                        *next += 1;
                        let child = machine.next_position(position, &joint_move)?;
                        ctx.nodes_expanded += 1;
                        let depth = *depth + 1;
                        self.open(machine, ctx, child, depth, rng)?
                    }
                }
            };

            match step {
                Step::Push(frame) => stack.push(frame),
                Step::Leaf(value) => returned = Some(value),
                Step::Return(value) => {
                    stack.pop();
                    returned = Some(value);
                }
            }
        }

        Ok(returned.unwrap_or(ctx.bounds.0))
    }

    /// Responses to our `mv` under the opponent model
    fn min_frame<M: StateMachine>(
        &self,
        machine: &mut M,
        ctx: &SearchContext<'_>,
        position: &Position,
        mv: &Move,
        depth: usize,
    ) -> Result<Frame> {
        let responses = match self.opponents {
            OpponentModel::Adversarial => machine.legal_joint_moves_with(position, ctx.role, mv)?,
            OpponentModel::NoOp => {
                let moves = machine
                    .roles()
                    .iter()
                    .map(|r| if r == ctx.role { mv.clone() } else { Move::noop() })
                    .collect();
                vec![JointMove::new(moves)]
            }
        };
        Ok(Frame::Min {
            position: position.clone(),
            depth,
            responses,
            next: 0,
            best: f64::INFINITY,
        })
    }

    /// Values `position` directly, or opens a max frame to expand it
    fn open<M: StateMachine>(
        &self,
        machine: &mut M,
        ctx: &mut SearchContext<'_>,
        position: Position,
        depth: usize,
        rng: &mut StdRng,
    ) -> Result<Step> {
        if machine.is_terminal(&position) {
            return Ok(Step::Leaf(machine.goal(&position, ctx.role)? as f64));
        }

        let deadline_hit = ctx.deadline.expired();
        let limit_hit = match self.cutoff {
            Cutoff::Unbounded => false,
            Cutoff::Depth(plies) => depth >= plies,
            Cutoff::Nodes(limit) => ctx.nodes_expanded >= limit,
            Cutoff::DepthOrNodes { plies, nodes } => {
                depth >= plies || ctx.nodes_expanded >= nodes
            }
        };
        if deadline_hit || limit_hit {
            ctx.aborted |= deadline_hit;
            ctx.cutoff_hit = true;
            ctx.estimated = true;
            let estimate =
                self.heuristic
                    .evaluate(machine, ctx.role, &position, ctx.deadline, rng)?;
            return Ok(Step::Leaf(estimate));
        }

        let moves = machine.legal_moves(&position, ctx.role)?;
        Ok(Step::Push(Frame::Max {
            position,
            depth,
            moves,
            next: 0,
            best: f64::NEG_INFINITY,
        }))
    }
}

/// Minimax with a fixed cutoff
pub struct MinimaxStrategy {
    engine: MinimaxEngine,
    rng: StdRng,
    statistics: SearchStatistics,
}

impl MinimaxStrategy {
    /// Full game-tree search ("compulsive deliberation")
    pub fn exhaustive(opponents: OpponentModel) -> Self {
        Self::from_engine(MinimaxEngine::new(
            opponents,
            Cutoff::Unbounded,
            Heuristic::Neutral,
        ))
    }

    /// Adversarial search cut off after `plies` of our own moves
    pub fn depth_limited(plies: usize, heuristic: Heuristic) -> Self {
        Self::from_engine(MinimaxEngine::new(
            OpponentModel::Adversarial,
            Cutoff::Depth(plies),
            heuristic,
        ))
    }

    /// Adversarial search cut off after generating `nodes` positions
    pub fn node_limited(nodes: usize, heuristic: Heuristic) -> Self {
        Self::from_engine(MinimaxEngine::new(
            OpponentModel::Adversarial,
            Cutoff::Nodes(nodes),
            heuristic,
        ))
    }

    /// Adversarial search cut off at `plies` or `nodes`, whichever comes
    /// first
    pub fn bounded(plies: usize, nodes: usize, heuristic: Heuristic) -> Self {
        Self::from_engine(MinimaxEngine::new(
            OpponentModel::Adversarial,
            Cutoff::DepthOrNodes { plies, nodes },
            heuristic,
        ))
    }

    /// Wraps an arbitrary engine
    pub fn from_engine(engine: MinimaxEngine) -> Self {
        MinimaxStrategy {
            engine,
            rng: seeded_rng(None),
            statistics: SearchStatistics::new(),
        }
    }

    /// Fixes the seed used by depth-charge heuristics
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.rng = seeded_rng(seed);
        self
    }

    /// Runs the search and returns the full outcome
    pub fn search<M: StateMachine>(
        &mut self,
        machine: &mut M,
        role: &Role,
        position: &Position,
        deadline: &Deadline,
    ) -> Result<SearchOutcome> {
        let start = Instant::now();
        let outcome = self
            .engine
            .search(machine, role, position, deadline, &mut self.rng)?;

        self.statistics = SearchStatistics::new();
        self.statistics.nodes_expanded = outcome.nodes_expanded;
        self.statistics.estimated_utility = outcome.value;
        self.statistics.stopped_early = outcome.aborted;
        self.statistics.total_time = start.elapsed();
        debug!(
            "minimax chose {} (value {:.1}, {} nodes, aborted={})",
            outcome.best_move, outcome.value, outcome.nodes_expanded, outcome.aborted
        );
        Ok(outcome)
    }
}

impl<M: StateMachine> Strategy<M> for MinimaxStrategy {
    fn select_move(
        &mut self,
        machine: &mut M,
        role: &Role,
        position: &Position,
        deadline: Deadline,
    ) -> Result<Move> {
        self.search(machine, role, position, &deadline)
            .map(|outcome| outcome.best_move)
    }

    fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    fn name(&self) -> &'static str {
        "minimax"
    }
}

/// Depth-limited adversarial minimax with the depth raised by one ply per
/// round until time runs out
///
/// Only the best move of the last fully completed depth is ever returned.
/// The search stops early once a depth completes without any cutoff (the
/// whole tree was seen) or a forced maximum-goal move is found.
pub struct IterativeDeepening {
    engine: MinimaxEngine,
    rng: StdRng,
    statistics: SearchStatistics,
}

impl IterativeDeepening {
    /// Creates the strategy with the given frontier heuristic
    pub fn new(heuristic: Heuristic) -> Self {
        IterativeDeepening {
            engine: MinimaxEngine::new(OpponentModel::Adversarial, Cutoff::Depth(1), heuristic),
            rng: seeded_rng(None),
            statistics: SearchStatistics::new(),
        }
    }

    /// Fixes the seed used by depth-charge heuristics
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.rng = seeded_rng(seed);
        self
    }
}

impl<M: StateMachine> Strategy<M> for IterativeDeepening {
    fn select_move(
        &mut self,
        machine: &mut M,
        role: &Role,
        position: &Position,
        deadline: Deadline,
    ) -> Result<Move> {
        let start = Instant::now();
        let moves = playable_moves(machine, role, position)?;
        self.statistics = SearchStatistics::new();

        let mut best = moves[0].clone();
        let mut depth = 1;
        loop {
            if deadline.expired() {
                self.statistics.stopped_early = true;
                break;
            }
            let engine = self.engine.with_cutoff(Cutoff::Depth(depth));
            let outcome = engine.search(machine, role, position, &deadline, &mut self.rng)?;
            self.statistics.nodes_expanded += outcome.nodes_expanded;
            if outcome.aborted {
                self.statistics.stopped_early = true;
                break;
            }

            trace!(
                "depth {} complete: {} valued {:.1}",
                depth,
                outcome.best_move,
                outcome.value
            );
            best = outcome.best_move;
            self.statistics.completed_depth = depth;
            self.statistics.estimated_utility = outcome.value;
            if !outcome.cutoff_hit || outcome.forced_win {
                break;
            }
            depth += 1;
        }

        self.statistics.total_time = start.elapsed();
        debug!(
            "iterative deepening chose {} at depth {}",
            best, self.statistics.completed_depth
        );
        Ok(best)
    }

    fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    fn name(&self) -> &'static str {
        "iterative-deepening"
    }
}
