//! Policies plugged into the search strategies
//!
//! - Selection policies: which tree node a simulation starts from
//! - Simulation policies: how a position is played out
//! - Backpropagation policies: how node statistics are updated
//! - Leaf heuristics: how minimax values a position it will not expand

pub mod backpropagation;
pub mod leaf;
pub mod selection;
pub mod simulation;

pub use backpropagation::{BackpropagationPolicy, StandardPolicy};
pub use leaf::Heuristic;
pub use selection::{SelectionPolicy, Ucb1Policy};
pub use simulation::{DepthChargePolicy, SimulationPolicy, SimulationResult};
