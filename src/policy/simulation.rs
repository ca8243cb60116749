//! Simulation policies for the MCTS algorithm
//!
//! Simulation policies estimate the value of a position by playing it out.

use rand::rngs::StdRng;
use rand::Rng;

use crate::clock::Deadline;
use crate::game_state::{Position, StateMachine};
use crate::utils;
use crate::Result;

/// Averaged outcome of the playouts run for one expansion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationResult {
    /// Searching role's score, normalised to [0, 1]
    pub utility: f64,

    /// Best score among the other roles, normalised to [0, 1]
    pub opponent_utility: f64,

    /// Playouts started, including those cut short
    pub depth_charges: usize,

    /// Whether at least one playout hit the deadline
    pub timed_out: bool,
}

/// Trait for policies that simulate games
pub trait SimulationPolicy<M: StateMachine>: Send + Sync {
    /// Simulates from `position` and returns the averaged outcome for the
    /// role at `role_index`
    fn simulate(
        &self,
        machine: &mut M,
        role_index: usize,
        position: &Position,
        deadline: &Deadline,
        rng: &mut StdRng,
    ) -> Result<SimulationResult>;

    /// Create a boxed clone of this policy
    fn clone_box(&self) -> Box<dyn SimulationPolicy<M>>;
}

/// Plays uniformly random joint moves from `position` until the game ends
///
/// Returns every role's goal at the terminal position, or `None` if the
/// deadline expired first.
pub fn depth_charge<M, R>(
    machine: &mut M,
    position: &Position,
    deadline: &Deadline,
    rng: &mut R,
) -> Result<Option<Vec<i32>>>
where
    M: StateMachine,
    R: Rng + ?Sized,
{
    let mut current = position.clone();
    while !machine.is_terminal(&current) {
        if deadline.expired() {
            return Ok(None);
        }
        let joint_move = machine.random_joint_move(&current, rng)?;
        current = machine.next_position(&current, &joint_move)?;
    }
    machine.goals(&current).map(Some)
}

/// Random depth-charge policy
///
/// Runs a fixed number of random playouts and averages them. A playout cut
/// short by the deadline scores 0.
#[derive(Debug, Clone)]
pub struct DepthChargePolicy {
    rollouts: usize,
}

impl DepthChargePolicy {
    /// Creates a policy averaging `rollouts` playouts (at least one)
    pub fn new(rollouts: usize) -> Self {
        DepthChargePolicy {
            rollouts: rollouts.max(1),
        }
    }

    /// Number of playouts per simulation
    pub fn rollouts(&self) -> usize {
        self.rollouts
    }
}

impl Default for DepthChargePolicy {
    fn default() -> Self {
        Self::new(5)
    }
}

impl<M: StateMachine> SimulationPolicy<M> for DepthChargePolicy {
    fn simulate(
        &self,
        machine: &mut M,
        role_index: usize,
        position: &Position,
        deadline: &Deadline,
        rng: &mut StdRng,
    ) -> Result<SimulationResult> {
        let roles = machine.roles().to_vec();
        let maxima: Vec<i32> = roles.iter().map(|r| machine.goal_bounds(r).1).collect();

        let mut result = SimulationResult {
            utility: 0.0,
            opponent_utility: 0.0,
            depth_charges: 0,
            timed_out: false,
        };
        for _ in 0..self.rollouts {
            result.depth_charges += 1;
            let goals = match depth_charge(machine, position, deadline, rng)? {
                Some(goals) => goals,
                None => {
                    result.timed_out = true;
                    continue;
                }
            };
            let mut best_opponent = 0.0f64;
            for (index, (&goal, &max)) in goals.iter().zip(&maxima).enumerate() {
                let score = utils::normalize_goal(goal as f64, (0, max));
                if index == role_index {
                    result.utility += score;
                } else {
                    best_opponent = best_opponent.max(score);
                }
            }
            result.opponent_utility += best_opponent;
        }
        result.utility /= self.rollouts as f64;
        result.opponent_utility /= self.rollouts as f64;
        Ok(result)
    }

    fn clone_box(&self) -> Box<dyn SimulationPolicy<M>> {
        Box::new(self.clone())
    }
}
