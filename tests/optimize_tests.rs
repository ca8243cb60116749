use ggp_player::optimize::prune_unreachable;
use ggp_player::{
    fixtures, CircuitBuilder, CircuitEvaluator, GameError, JointMove, Move, Role, StateMachine,
};

#[test]
fn test_pruning_removes_independent_lamp() {
    let full = fixtures::one_ply_with_lamp().unwrap();
    let pruned = prune_unreachable(&full).expect("one-ply with lamp can be pruned");

    assert!(pruned.len() < full.len(), "Pruning must drop nodes");
    assert!(full.base_index("lamp").is_some());
    assert!(pruned.base_index("lamp").is_none(), "The lamp cannot matter");
    assert!(pruned.base_index("played_a").is_some());
    assert!(
        pruned.input_for(0, &Move::new("toggle")).is_some(),
        "A move that can be legal keeps its input"
    );
    assert_eq!(pruned.legals(0).len(), 3, "Legality is never pruned");
}

#[test]
fn test_pruning_preserves_behaviour() {
    let full = fixtures::one_ply_with_lamp().unwrap();
    let mut pruned = CircuitEvaluator::new(prune_unreachable(&full).unwrap());
    let mut original = CircuitEvaluator::new(full);
    let robot = Role::new("robot");

    for mv in ["a", "b"] {
        let moves = JointMove::new(vec![Move::new(mv)]);
        let start = original.initial_position();
        let full_next = original.next_position(&start, &moves).unwrap();
        let start = pruned.initial_position();
        let pruned_next = pruned.next_position(&start, &moves).unwrap();

        assert_eq!(original.is_terminal(&full_next), pruned.is_terminal(&pruned_next));
        assert_eq!(
            original.goal(&full_next, &robot).unwrap(),
            pruned.goal(&pruned_next, &robot).unwrap(),
            "Goal after {} must survive pruning",
            mv
        );
    }
}

#[test]
fn test_pruning_keeps_needed_circuits_whole() {
    let full = fixtures::one_ply().unwrap();
    let pruned = prune_unreachable(&full).unwrap();

    assert_eq!(pruned.len(), full.len(), "Every node of one-ply matters");
    assert_eq!(pruned.bases().len(), full.bases().len());
}

#[test]
fn test_pruning_keeps_moves_that_only_pass_time() {
    let full = fixtures::waiting_room().unwrap();
    let mut pruned = CircuitEvaluator::new(prune_unreachable(&full).unwrap());
    let robot = Role::new("robot");

    let mut position = pruned.initial_position();
    let mut turns = 0;
    while !pruned.is_terminal(&position) {
        let legal = pruned.legal_moves(&position, &robot).unwrap();
        assert_eq!(legal, vec![Move::new("wait")], "Waiting stays legal on turn {}", turns);
        position = pruned
            .next_position(&position, &JointMove::new(legal))
            .unwrap();
        turns += 1;
    }
    assert_eq!(turns, 3);
    assert_eq!(pruned.goal(&position, &robot).unwrap(), 50);
}

#[test]
fn test_pruning_fails_for_role_without_legal_propositions() {
    let mut builder = CircuitBuilder::new();
    let robot = builder.add_role("robot");
    let always = builder.add_constant(true);
    builder.add_goal(robot, 50, always);
    builder.add_terminal(always);
    let full = builder.build().unwrap();

    match prune_unreachable(&full) {
        Err(GameError::InvalidCircuit(msg)) => assert!(msg.contains("legal")),
        other => panic!("Expected pruning to give up, got {:?}", other.map(|c| c.len())),
    }
}
