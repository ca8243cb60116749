//! Arithmetic helpers for UCB1 and score normalisation

/// Average utility of a node
///
/// Returns 0.0 if the node has not been visited.
pub fn exploitation_term(total_utility: f64, visits: u64) -> f64 {
    if visits == 0 {
        return 0.0;
    }
    total_utility / visits as f64
}

/// Exploration bonus of UCB1
///
/// Unvisited nodes get an infinite bonus.
pub fn exploration_term(parent_visits: u64, child_visits: u64, exploration_constant: f64) -> f64 {
    if child_visits == 0 {
        return f64::INFINITY;
    }

    exploration_constant * ((parent_visits as f64).ln() / child_visits as f64).sqrt()
}

/// UCB1 value: `utility / visits + C * sqrt(ln(parent_visits) / visits)`
pub fn ucb1_value(
    total_utility: f64,
    visits: u64,
    parent_visits: u64,
    exploration_constant: f64,
) -> f64 {
    if visits == 0 {
        return f64::INFINITY;
    }

    exploitation_term(total_utility, visits)
        + exploration_term(parent_visits, visits, exploration_constant)
}

/// Maps a goal value onto [0, 1] given the role's goal bounds
pub fn normalize_goal(goal: f64, (min, max): (i32, i32)) -> f64 {
    let span = (max - min) as f64;
    if span <= 0.0 {
        return 0.0;
    }
    ((goal - min as f64) / span).clamp(0.0, 1.0)
}

/// Inverse of `normalize_goal`
pub fn denormalize_goal(reward: f64, (min, max): (i32, i32)) -> f64 {
    min as f64 + reward * (max - min) as f64
}
