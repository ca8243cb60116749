//! Circuit-backed implementation of `StateMachine`
//!
//! Every query assigns truth values to the source propositions (bases from
//! the position, inputs from the joint move, init when computing the
//! initial position) and then propagates values through the circuit on
//! demand. Values are memoised only for the duration of one query.

use std::sync::Arc;

use crate::circuit::{Circuit, Gate, NodeId};
use crate::game_state::{JointMove, Move, Position, Role, StateMachine};
use crate::{GameError, Result};

/// Per-query truth assignment and memo table
///
/// `stamp[i] == generation` means `value[i]` holds node `i`'s value for the
/// current query. Bumping the generation invalidates the whole memo at once.
#[derive(Clone, Debug)]
struct Scratch {
    assigned: Vec<bool>,
    value: Vec<bool>,
    stamp: Vec<u32>,
    generation: u32,
    stack: Vec<(NodeId, usize)>,
    asserted: Vec<NodeId>,
}

impl Scratch {
    fn new(size: usize) -> Self {
        Scratch {
            assigned: vec![false; size],
            value: vec![false; size],
            stamp: vec![0; size],
            generation: 0,
            stack: Vec::with_capacity(64),
            asserted: Vec::new(),
        }
    }

    /// Clears the previous assignment and memo
    fn reset(&mut self) {
        for id in self.asserted.drain(..) {
            self.assigned[id.index()] = false;
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.stamp.iter_mut().for_each(|s| *s = 0);
            self.generation = 1;
        }
    }

    fn assert(&mut self, id: NodeId) {
        self.assigned[id.index()] = true;
        self.asserted.push(id);
    }

    #[inline]
    fn cached(&self, id: NodeId) -> Option<bool> {
        let i = id.index();
        (self.stamp[i] == self.generation).then(|| self.value[i])
    }

    #[inline]
    fn store(&mut self, id: NodeId, value: bool) {
        let i = id.index();
        self.stamp[i] = self.generation;
        self.value[i] = value;
    }

    /// Value of `root` under the current assignment
    ///
    /// Uses an explicit stack of `(node, next input)` frames so deep
    /// circuits cannot overflow the native stack. AND and OR stop at the
    /// first deciding input.
    fn eval(&mut self, circuit: &Circuit, root: NodeId) -> bool {
        if let Some(value) = self.cached(root) {
            return value;
        }
        self.stack.clear();
        self.stack.push((root, 0));

        while let Some(&(id, cursor)) = self.stack.last() {
            let node = circuit.node(id);
            let outcome = if node.is_source() {
                Some(self.assigned[id.index()])
            } else {
                match &node.gate {
                    Gate::Constant(value) => Some(*value),
                    Gate::Proposition { input: None, .. } => Some(false),
                    Gate::Proposition {
                        input: Some(input), ..
                    } => self.cached(*input).or_else(|| {
                        self.stack.push((*input, 0));
                        None
                    }),
                    Gate::Not(input) => match self.cached(*input) {
                        Some(value) => Some(!value),
                        None => {
                            self.stack.push((*input, 0));
                            None
                        }
                    },
                    Gate::And(inputs) => self.step_junction(inputs, cursor, false),
                    Gate::Or(inputs) => self.step_junction(inputs, cursor, true),
                }
            };

            if let Some(value) = outcome {
                self.store(id, value);
                self.stack.pop();
            }
        }

        self.cached(root).unwrap_or(false)
    }

    /// Advances an AND (`decisive == false`) or OR (`decisive == true`)
    /// frame. Returns the gate's value once known, or pushes the next
    /// unevaluated input.
    fn step_junction(&mut self, inputs: &[NodeId], cursor: usize, decisive: bool) -> Option<bool> {
        let mut cursor = cursor;
        while let Some(&input) = inputs.get(cursor) {
            match self.cached(input) {
                Some(value) if value == decisive => return Some(decisive),
                Some(_) => cursor += 1,
                None => {
                    if let Some(frame) = self.stack.last_mut() {
                        frame.1 = cursor;
                    }
                    self.stack.push((input, 0));
                    return None;
                }
            }
        }
        Some(!decisive)
    }
}

/// Answers game queries by propagating truth values through a `Circuit`
///
/// Clone one evaluator per thread to run queries concurrently.
#[derive(Clone, Debug)]
pub struct CircuitEvaluator {
    circuit: Arc<Circuit>,
    scratch: Scratch,
}

impl CircuitEvaluator {
    /// Creates an evaluator for `circuit`
    pub fn new(circuit: Circuit) -> Self {
        Self::from_shared(Arc::new(circuit))
    }

    /// Creates an evaluator sharing an already wrapped circuit
    pub fn from_shared(circuit: Arc<Circuit>) -> Self {
        let scratch = Scratch::new(circuit.len());
        CircuitEvaluator { circuit, scratch }
    }

    /// The circuit being evaluated
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    fn mark_bases(&mut self, position: &Position) {
        self.scratch.reset();
        let bases = self.circuit.bases();
        for &index in position.bases() {
            if let Some(base) = bases.get(index) {
                self.scratch.assert(base.node);
            }
        }
    }

    fn mark_moves(&mut self, joint_move: &JointMove) -> Result<()> {
        let role_count = self.circuit.roles().len();
        if joint_move.len() != role_count {
            return Err(GameError::TransitionDefinition(format!(
                "joint move {} has {} moves for {} roles",
                joint_move,
                joint_move.len(),
                role_count
            )));
        }
        for (role, mv) in joint_move.moves().iter().enumerate() {
            match self.circuit.input_for(role, mv) {
                Some(input) => self.scratch.assert(input),
                None if mv.is_noop() => {}
                None => {
                    return Err(GameError::TransitionDefinition(format!(
                        "{} has no input proposition for {}",
                        self.circuit.roles()[role],
                        mv
                    )))
                }
            }
        }
        Ok(())
    }

    fn collect_successors(&mut self) -> Position {
        let circuit: &Circuit = &self.circuit;
        let scratch = &mut self.scratch;
        let next = circuit
            .bases()
            .iter()
            .enumerate()
            .filter(|(_, base)| scratch.eval(circuit, base.successor))
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        Position::from_bases(next)
    }

    fn eval(&mut self, id: NodeId) -> bool {
        self.scratch.eval(&self.circuit, id)
    }
}

impl StateMachine for CircuitEvaluator {
    fn roles(&self) -> &[Role] {
        self.circuit.roles()
    }

    fn initial_position(&mut self) -> Position {
        self.scratch.reset();
        if let Some(init) = self.circuit.init() {
            self.scratch.assert(init);
        }
        self.collect_successors()
    }

    fn legal_moves(&mut self, position: &Position, role: &Role) -> Result<Vec<Move>> {
        let index = self.role_index(role)?;
        self.mark_bases(position);
        let circuit: &Circuit = &self.circuit;
        let scratch = &mut self.scratch;
        let mut moves = Vec::new();
        for (mv, legal) in circuit.legals(index) {
            if scratch.eval(circuit, *legal) {
                moves.push(mv.clone());
            }
        }
        if moves.is_empty() && !scratch.eval(circuit, circuit.terminal()) {
            return Err(GameError::MoveDefinition {
                role: role.name().to_string(),
            });
        }
        Ok(moves)
    }

    fn is_terminal(&mut self, position: &Position) -> bool {
        self.mark_bases(position);
        let terminal = self.circuit.terminal();
        self.eval(terminal)
    }

    fn goal(&mut self, position: &Position, role: &Role) -> Result<i32> {
        let index = self.role_index(role)?;
        self.mark_bases(position);
        let circuit: &Circuit = &self.circuit;
        let scratch = &mut self.scratch;
        let mut found = None;
        let mut true_goals = 0;
        for (value, goal) in circuit.goals(index) {
            if scratch.eval(circuit, *goal) {
                true_goals += 1;
                found = Some(*value);
            }
        }
        match (found, true_goals) {
            (Some(value), 1) => Ok(value),
            _ => Err(GameError::GoalDefinition {
                role: role.name().to_string(),
                true_goals,
            }),
        }
    }

    fn next_position(&mut self, position: &Position, joint_move: &JointMove) -> Result<Position> {
        self.mark_bases(position);
        self.mark_moves(joint_move)?;
        Ok(self.collect_successors())
    }

    fn all_actions(&self, role: &Role) -> Result<Vec<Move>> {
        let index = self.role_index(role)?;
        Ok(self
            .circuit
            .legals(index)
            .iter()
            .map(|(mv, _)| mv.clone())
            .collect())
    }

    fn goal_bounds(&self, role: &Role) -> (i32, i32) {
        let goals = match self.role_index(role) {
            Ok(index) => self.circuit.goals(index),
            Err(_) => return (0, 100),
        };
        let min = goals.iter().map(|(v, _)| *v).min();
        let max = goals.iter().map(|(v, _)| *v).max();
        match (min, max) {
            (Some(min), Some(max)) => (min, max),
            _ => (0, 100),
        }
    }
}
