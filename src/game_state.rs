//! Game-facing value types and the state machine interface.
//!
//! The `StateMachine` trait is the only thing search strategies know about a
//! game: four queries (legal moves, terminality, goals, successor) plus a
//! few derived helpers. `CircuitEvaluator` is the production implementation.

use std::fmt;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{GameError, Result};

/// One participant of a game
///
/// Roles are interned names. Their total order is the order in which the
/// circuit declares them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Role(Arc<str>);

impl Role {
    /// Creates a role with the given name
    pub fn new(name: &str) -> Self {
        Role(Arc::from(name))
    }

    /// Returns the role name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const NOOP: &str = "noop";

/// A grounded action term for one role
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move(Arc<str>);

impl Move {
    /// Creates a move from its term text
    pub fn new(term: &str) -> Self {
        Move(Arc::from(term))
    }

    /// The designated null action
    ///
    /// A `noop` with no matching input proposition asserts nothing when the
    /// joint move is applied.
    pub fn noop() -> Self {
        Move::new(NOOP)
    }

    /// Returns true for the designated null action
    pub fn is_noop(&self) -> bool {
        &*self.0 == NOOP
    }

    /// Returns the term text
    pub fn term(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One move per role, in role order
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JointMove(Vec<Move>);

impl JointMove {
    /// Wraps a list of moves, one per role in role order
    pub fn new(moves: Vec<Move>) -> Self {
        JointMove(moves)
    }

    /// Returns the move of the role at `role_index`
    pub fn get(&self, role_index: usize) -> Option<&Move> {
        self.0.get(role_index)
    }

    /// Returns all moves in role order
    pub fn moves(&self) -> &[Move] {
        &self.0
    }

    /// Number of moves (must equal the role count to be applied)
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no moves
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for JointMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, mv) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", mv)?;
        }
        write!(f, ")")
    }
}

/// The set of base propositions that are true at one point of the game
///
/// Positions are immutable and cheap to clone; search trees share them
/// freely. Bases are identified by their index in `Circuit::bases()`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position(Arc<[usize]>);

impl Position {
    /// Builds a position from any collection of base indices
    pub fn from_bases<I: IntoIterator<Item = usize>>(bases: I) -> Self {
        let mut bases: Vec<usize> = bases.into_iter().collect();
        bases.sort_unstable();
        bases.dedup();
        Position(bases.into())
    }

    /// The position in which no base proposition is true
    pub fn empty() -> Self {
        Position(Arc::from(Vec::new()))
    }

    /// Indices of the true base propositions, ascending
    pub fn bases(&self) -> &[usize] {
        &self.0
    }

    /// Returns true if the base at `index` is true
    pub fn contains(&self, index: usize) -> bool {
        self.0.binary_search(&index).is_ok()
    }

    /// Number of true base propositions
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no base proposition is true
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Forward model of a game
///
/// Queries take `&mut self` because implementations may keep a scratch
/// assignment; one instance never runs two queries at once.
pub trait StateMachine {
    /// Roles in their fixed order
    fn roles(&self) -> &[Role];

    /// The position the game starts in
    fn initial_position(&mut self) -> Position;

    /// Legal moves of `role` in `position`
    ///
    /// Empty only for terminal positions; an empty result on a non-terminal
    /// position is reported as `GameError::MoveDefinition`.
    fn legal_moves(&mut self, position: &Position, role: &Role) -> Result<Vec<Move>>;

    /// Returns true if `position` ends the game
    fn is_terminal(&mut self, position: &Position) -> bool;

    /// Goal value of `role` in `position`
    fn goal(&mut self, position: &Position, role: &Role) -> Result<i32>;

    /// The position reached from `position` when `joint_move` is played
    fn next_position(&mut self, position: &Position, joint_move: &JointMove) -> Result<Position>;

    /// Every move `role` could ever have
    fn all_actions(&self, role: &Role) -> Result<Vec<Move>>;

    /// Smallest and largest goal value `role` can receive
    fn goal_bounds(&self, _role: &Role) -> (i32, i32) {
        (0, 100)
    }

    /// Index of `role` in the fixed role order
    fn role_index(&self, role: &Role) -> Result<usize> {
        self.roles()
            .iter()
            .position(|r| r == role)
            .ok_or_else(|| GameError::UnknownRole(role.name().to_string()))
    }

    /// Goal values of every role, in role order
    fn goals(&mut self, position: &Position) -> Result<Vec<i32>> {
        let roles = self.roles().to_vec();
        roles.iter().map(|role| self.goal(position, role)).collect()
    }

    /// Every legal joint move in `position`
    fn legal_joint_moves(&mut self, position: &Position) -> Result<Vec<JointMove>> {
        let roles = self.roles().to_vec();
        let mut per_role = Vec::with_capacity(roles.len());
        for role in &roles {
            per_role.push(self.legal_moves(position, role)?);
        }
        Ok(cartesian_product(&per_role))
    }

    /// Every legal joint move in which `role` plays `mv`
    fn legal_joint_moves_with(
        &mut self,
        position: &Position,
        role: &Role,
        mv: &Move,
    ) -> Result<Vec<JointMove>> {
        let roles = self.roles().to_vec();
        let mut per_role = Vec::with_capacity(roles.len());
        for r in &roles {
            if r == role {
                per_role.push(vec![mv.clone()]);
            } else {
                per_role.push(self.legal_moves(position, r)?);
            }
        }
        Ok(cartesian_product(&per_role))
    }

    /// A joint move drawn uniformly from all legal joint moves
    ///
    /// Drawing each role's move independently is uniform over the product,
    /// so the product itself is never materialised.
    fn random_joint_move<R: Rng + ?Sized>(
        &mut self,
        position: &Position,
        rng: &mut R,
    ) -> Result<JointMove>
    where
        Self: Sized,
    {
        let roles = self.roles().to_vec();
        let mut moves = Vec::with_capacity(roles.len());
        for role in &roles {
            let legal = self.legal_moves(position, role)?;
            let mv = legal
                .choose(rng)
                .cloned()
                .ok_or_else(|| GameError::MoveDefinition {
                    role: role.name().to_string(),
                })?;
            moves.push(mv);
        }
        Ok(JointMove::new(moves))
    }
}

/// All combinations taking one move from each per-role list
pub fn cartesian_product(per_role: &[Vec<Move>]) -> Vec<JointMove> {
    let mut combos: Vec<Vec<Move>> = vec![Vec::with_capacity(per_role.len())];
    for options in per_role {
        let mut next = Vec::with_capacity(combos.len() * options.len());
        for prefix in &combos {
            for mv in options {
                let mut combo = prefix.clone();
                combo.push(mv.clone());
                next.push(combo);
            }
        }
        combos = next;
    }
    combos.into_iter().map(JointMove::new).collect()
}
