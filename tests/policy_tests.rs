use std::time::Duration;

use ggp_player::policy::backpropagation::{BackpropagationPolicy, StandardPolicy};
use ggp_player::policy::simulation::{depth_charge, DepthChargePolicy, SimulationPolicy};
use ggp_player::strategy::seeded_rng;
use ggp_player::tree::SearchTree;
use ggp_player::{
    fixtures, CircuitEvaluator, Deadline, Heuristic, JointMove, Move, Position, Role,
    StateMachine,
};

fn generous() -> Deadline {
    Deadline::after(Duration::from_secs(10), Duration::ZERO)
}

#[test]
fn test_heuristics_on_parity_race() {
    let mut machine = CircuitEvaluator::new(fixtures::parity_race().unwrap());
    let start = machine.initial_position();
    let left = Role::new("left");
    let right = Role::new("right");
    let mut rng = seeded_rng(Some(4));

    let neutral = Heuristic::Neutral
        .evaluate(&mut machine, &left, &start, &generous(), &mut rng)
        .unwrap();
    assert_eq!(neutral, 0.0);

    let mobility = Heuristic::Mobility
        .evaluate(&mut machine, &left, &start, &generous(), &mut rng)
        .unwrap();
    assert_eq!(mobility, 100.0, "Both actions ever available are legal now");

    let left_now = Heuristic::GoalEstimate
        .evaluate(&mut machine, &left, &start, &generous(), &mut rng)
        .unwrap();
    let right_now = Heuristic::GoalEstimate
        .evaluate(&mut machine, &right, &start, &generous(), &mut rng)
        .unwrap();
    assert_eq!(left_now, 0.0, "Parity starts even");
    assert_eq!(right_now, 100.0);

    let charged = Heuristic::DepthCharge { count: 8 }
        .evaluate(&mut machine, &left, &start, &generous(), &mut rng)
        .unwrap();
    assert!((0.0..=100.0).contains(&charged));
}

#[test]
fn test_goal_estimate_treats_undefined_goal_as_neutral() {
    let mut builder = ggp_player::CircuitBuilder::new();
    let robot = builder.add_role("robot");
    let always = builder.add_constant(true);
    let never = builder.add_constant(false);
    builder.add_input(robot, "wait");
    builder.add_legal(robot, "wait", always);
    builder.add_goal(robot, 20, never);
    builder.add_goal(robot, 80, never);
    builder.add_terminal(never);
    let mut machine = CircuitEvaluator::new(builder.build().unwrap());
    let mut rng = seeded_rng(Some(4));

    let estimate = Heuristic::GoalEstimate
        .evaluate(
            &mut machine,
            &Role::new("robot"),
            &Position::empty(),
            &generous(),
            &mut rng,
        )
        .unwrap();
    assert_eq!(estimate, 20.0, "No true goal counts as the minimum goal");
}

#[test]
fn test_depth_charge_reaches_terminal() {
    let mut machine = CircuitEvaluator::new(fixtures::parity_race().unwrap());
    let start = machine.initial_position();
    let mut rng = seeded_rng(Some(8));

    let goals = depth_charge(&mut machine, &start, &generous(), &mut rng)
        .unwrap()
        .expect("a generous deadline lets the charge finish");
    assert_eq!(goals.len(), 2);
    assert_eq!(goals.iter().sum::<i32>(), 100);

    let expired = Deadline::after(Duration::ZERO, Duration::ZERO);
    let cut_short = depth_charge(&mut machine, &start, &expired, &mut rng).unwrap();
    assert_eq!(cut_short, None, "An expired deadline stops the charge");
}

#[test]
fn test_depth_charge_policy_normalises_scores() {
    let mut machine = CircuitEvaluator::new(fixtures::one_ply().unwrap());
    let start = machine.initial_position();
    let won = machine
        .next_position(&start, &JointMove::new(vec![Move::new("a")]))
        .unwrap();
    let mut rng = seeded_rng(Some(1));
    let policy = DepthChargePolicy::new(3);

    let result = policy
        .simulate(&mut machine, 0, &won, &generous(), &mut rng)
        .unwrap();
    assert_eq!(result.utility, 1.0, "Goal 100 of 100 normalises to 1");
    assert_eq!(result.opponent_utility, 0.0, "No opponents in a one-role game");
    assert_eq!(result.depth_charges, 3);
    assert!(!result.timed_out);

    let expired = Deadline::after(Duration::ZERO, Duration::ZERO);
    let result = policy
        .simulate(&mut machine, 0, &start, &expired, &mut rng)
        .unwrap();
    assert_eq!(result.utility, 0.0, "Timed-out charges score zero");
    assert!(result.timed_out);
}

#[test]
fn test_opponent_channel_tracks_best_other_role() {
    let mut machine = CircuitEvaluator::new(fixtures::matching_pennies().unwrap());
    let start = machine.initial_position();
    let mismatch = machine
        .next_position(
            &start,
            &JointMove::new(vec![Move::new("heads"), Move::new("tails")]),
        )
        .unwrap();
    let mut rng = seeded_rng(Some(1));

    let result = DepthChargePolicy::new(1)
        .simulate(&mut machine, 0, &mismatch, &generous(), &mut rng)
        .unwrap();
    assert_eq!(result.utility, 0.0);
    assert_eq!(result.opponent_utility, 1.0);
}

#[test]
fn test_standard_backpropagation_updates_whole_path() {
    let mut tree = SearchTree::new(Position::empty(), false);
    let child = tree.add_child(
        SearchTree::ROOT,
        Position::from_bases([0]),
        JointMove::new(vec![Move::new("x")]),
        Move::new("x"),
        false,
    );
    let grandchild = tree.add_child(
        child,
        Position::from_bases([1]),
        JointMove::new(vec![Move::new("y")]),
        Move::new("y"),
        true,
    );
    let sibling = tree.add_child(
        SearchTree::ROOT,
        Position::from_bases([2]),
        JointMove::new(vec![Move::new("z")]),
        Move::new("z"),
        false,
    );

    let policy = StandardPolicy::new();
    policy.backpropagate(&mut tree, grandchild, 0.75, 0.25);
    policy.backpropagate(&mut tree, grandchild, 0.25, 0.5);

    for index in [SearchTree::ROOT, child, grandchild] {
        let node = tree.node(index);
        assert_eq!(node.visits(), 2, "Each simulation visits each ancestor once");
        assert_eq!(node.total_utility(), 1.0);
        assert_eq!(node.average_utility(), 0.5);
        assert_eq!(node.average_opponent_utility(), 0.375);
    }
    assert_eq!(tree.node(sibling).visits(), 0);
    assert_eq!(tree.node(grandchild).depth, 2);
    assert_eq!(tree.max_depth(), 2);
    assert_eq!(tree.ancestry(grandchild).collect::<Vec<_>>(), vec![grandchild, child, 0]);
}
