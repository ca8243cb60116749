use std::time::{Duration, Instant};

use ggp_player::utils::{denormalize_goal, exploration_term, normalize_goal, ucb1_value};
use ggp_player::{Deadline, JointMove, Move, Position, SearchStatistics};

#[test]
fn test_deadline_margin() {
    let deadline = Deadline::after(Duration::from_secs(60), Duration::from_secs(1));
    assert!(!deadline.expired());
    assert!(deadline.remaining() <= Duration::from_secs(59));
    assert_eq!(deadline.stop_at() + Duration::from_secs(1), deadline.at());

    let past_margin = Deadline::new(Instant::now() + Duration::from_millis(5), Duration::from_secs(1));
    assert!(past_margin.expired(), "The margin is already breached");
    assert_eq!(past_margin.remaining(), Duration::ZERO);

    let relaxed = past_margin.with_margin(Duration::ZERO);
    assert_eq!(relaxed.at(), past_margin.at());
    assert_eq!(relaxed.margin(), Duration::ZERO);
}

#[test]
fn test_ucb1_arithmetic() {
    assert_eq!(ucb1_value(3.0, 0, 10, 1.4), f64::INFINITY);
    assert_eq!(exploration_term(10, 0, 1.4), f64::INFINITY);

    let value = ucb1_value(2.0, 4, 16, 1.0);
    let expected = 0.5 + (16f64.ln() / 4.0).sqrt();
    assert!((value - expected).abs() < 1e-12);
}

#[test]
fn test_goal_normalisation() {
    assert_eq!(normalize_goal(50.0, (0, 100)), 0.5);
    assert_eq!(normalize_goal(150.0, (0, 100)), 1.0);
    assert_eq!(normalize_goal(10.0, (10, 10)), 0.0);
    assert_eq!(denormalize_goal(0.25, (0, 100)), 25.0);
}

#[test]
fn test_position_is_a_sorted_set() {
    let position = Position::from_bases([5, 1, 5, 3]);
    assert_eq!(position.bases(), &[1, 3, 5]);
    assert!(position.contains(3));
    assert!(!position.contains(2));
    assert_eq!(position, Position::from_bases([3, 1, 5]));
    assert!(Position::empty().is_empty());
}

#[test]
fn test_joint_move_display_and_noop() {
    let joint = JointMove::new(vec![Move::new("heads"), Move::noop()]);
    assert_eq!(joint.to_string(), "(heads noop)");
    assert!(joint.get(1).unwrap().is_noop());
    assert!(!Move::new("heads").is_noop());
}

#[test]
fn test_statistics_summary() {
    let mut stats = SearchStatistics::new();
    stats.iterations = 12;
    stats.depth_charges = 60;
    stats.total_time = Duration::from_secs(2);

    assert_eq!(stats.depth_charges_per_second(), 30.0);
    let summary = stats.summary();
    assert!(summary.contains("iterations=12"));
    assert!(summary.contains("depth_charges=60"));
    assert_eq!(SearchStatistics::default().depth_charges_per_second(), 0.0);
}
