//! Leaf evaluation for cut-off minimax search

use rand::Rng;

use crate::clock::Deadline;
use crate::game_state::{Position, Role, StateMachine};
use crate::policy::simulation::depth_charge;
use crate::utils;
use crate::{GameError, Result};

/// Estimate used in place of the true value at a cutoff frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Heuristic {
    /// The role's minimum goal
    #[default]
    Neutral,

    /// Legal moves now over every action the role could ever have, scaled
    /// to the role's goal range
    Mobility,

    /// The role's current goal value
    ///
    /// Positions whose goal is ill-defined count as neutral. Only
    /// non-terminal positions are estimated, so an ill-defined goal at a
    /// terminal position still surfaces as `GameError::GoalDefinition`.
    GoalEstimate,

    /// Mean goal of `count` random playouts
    DepthCharge { count: usize },
}

impl Heuristic {
    /// Estimates the value of non-terminal `position` for `role`
    ///
    /// Callers value terminal positions by their goal instead.
    pub fn evaluate<M, R>(
        &self,
        machine: &mut M,
        role: &Role,
        position: &Position,
        deadline: &Deadline,
        rng: &mut R,
    ) -> Result<f64>
    where
        M: StateMachine,
        R: Rng + ?Sized,
    {
        let bounds = machine.goal_bounds(role);
        let neutral = bounds.0 as f64;

        match *self {
            Heuristic::Neutral => Ok(neutral),
            Heuristic::Mobility => {
                let everything = machine.all_actions(role)?.len();
                if everything == 0 {
                    return Ok(neutral);
                }
                let now = machine.legal_moves(position, role)?.len();
                Ok(utils::denormalize_goal(
                    now as f64 / everything as f64,
                    bounds,
                ))
            }
            Heuristic::GoalEstimate => match machine.goal(position, role) {
                Ok(goal) => Ok(goal as f64),
                Err(GameError::GoalDefinition { .. }) => Ok(neutral),
                Err(err) => Err(err),
            },
            Heuristic::DepthCharge { count } => {
                let index = machine.role_index(role)?;
                let count = count.max(1);
                let mut total = 0.0;
                for _ in 0..count {
                    total += match depth_charge(machine, position, deadline, rng)? {
                        Some(goals) => goals.get(index).map_or(neutral, |&g| g as f64),
                        None => neutral,
                    };
                }
                Ok(total / count as f64)
            }
        }
    }
}
