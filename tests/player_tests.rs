use std::time::{Duration, Instant};

use ggp_player::config::{OpponentModel, PlayerConfig, SearchConfig, StrategyKind};
use ggp_player::{
    fixtures, Circuit, CircuitBuilder, Deadline, GameError, Heuristic, JointMove, Move, Player,
    Position, Role, StateMachine,
};

fn meta() -> Deadline {
    Deadline::after(Duration::from_secs(5), Duration::from_millis(10))
}

fn turn() -> Deadline {
    Deadline::after(Duration::from_millis(300), Duration::from_millis(50))
}

fn quick_mcts() -> PlayerConfig {
    PlayerConfig::default()
        .with_search(SearchConfig::default().with_seed(17).with_max_iterations(100))
}

#[test]
fn test_prepare_and_play_one_ply() {
    let _ = env_logger::builder().is_test(true).try_init();
    let circuit = fixtures::one_ply().unwrap();
    let mut player = Player::prepare(circuit, Role::new("robot"), quick_mcts(), meta()).unwrap();

    let start = player.initial_position();
    let mv = player.select_move(&start, turn()).unwrap();

    assert_eq!(mv, Move::new("a"));
    assert_eq!(player.role(), &Role::new("robot"));
}

#[test]
fn test_prepare_rejects_unknown_role() {
    let circuit = fixtures::one_ply().unwrap();
    let result = Player::prepare(circuit, Role::new("ghost"), quick_mcts(), meta());

    assert!(matches!(result, Err(GameError::UnknownRole(name)) if name == "ghost"));
}

#[test]
fn test_prepare_rejects_invalid_config() {
    let circuit = fixtures::one_ply().unwrap();
    let config = PlayerConfig::default()
        .with_search(SearchConfig::default().with_exploration_constant(-2.0));

    assert!(matches!(
        Player::prepare(circuit, Role::new("robot"), config, meta()),
        Err(GameError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_single_role_circuit_is_pruned() {
    let circuit = fixtures::one_ply_with_lamp().unwrap();
    let full_size = circuit.len();
    let mut player = Player::prepare(circuit, Role::new("robot"), quick_mcts(), meta()).unwrap();

    assert!(player.is_pruned());
    assert!(player.machine().circuit().len() < full_size);

    let start = player.initial_position();
    assert_eq!(player.select_move(&start, turn()).unwrap(), Move::new("a"));
}

#[test]
fn test_pruning_can_be_disabled() {
    let circuit = fixtures::one_ply_with_lamp().unwrap();
    let config = quick_mcts().with_pruning(false);
    let player = Player::prepare(circuit, Role::new("robot"), config, meta()).unwrap();

    assert!(!player.is_pruned());
}

#[test]
fn test_failed_pruning_falls_back_to_full_circuit() {
    let mut builder = CircuitBuilder::new();
    let robot = builder.add_role("robot");
    let always = builder.add_constant(true);
    builder.add_goal(robot, 50, always);
    builder.add_terminal(always);
    let circuit = builder.build().unwrap();
    let full_size = circuit.len();

    let mut player = Player::prepare(circuit, Role::new("robot"), quick_mcts(), meta()).unwrap();

    assert!(!player.is_pruned(), "A role without legal propositions cannot be pruned");
    assert_eq!(player.machine().circuit().len(), full_size);
    let start = player.initial_position();
    assert_eq!(
        player.select_move(&start, turn()).unwrap_err(),
        GameError::NoLegalActions
    );
}

/// Turn 1 offers `down` or `up` (which scores), turn 2 only `wait`
fn climb_then_wait() -> Circuit {
    let mut builder = CircuitBuilder::new();
    let robot = builder.add_role("robot");
    let init = builder.add_init();

    let t0 = builder.add_base("t0");
    let t1 = builder.add_base("t1");
    let t2 = builder.add_base("t2");
    builder.set_successor(t0, init);
    builder.set_successor(t1, t0);
    builder.set_successor(t2, t1);

    let ok = builder.add_base("ok");
    builder.add_input(robot, "down");
    let up = builder.add_input(robot, "up");
    builder.add_input(robot, "wait");
    let next_ok = builder.add_or(vec![up, ok]);
    builder.set_successor(ok, next_ok);

    builder.add_legal(robot, "down", t0);
    builder.add_legal(robot, "up", t0);
    builder.add_legal(robot, "wait", t1);

    let failed = builder.add_not(ok);
    builder.add_goal(robot, 100, ok);
    builder.add_goal(robot, 0, failed);
    builder.add_terminal(t2);
    builder.build().unwrap()
}

#[test]
fn test_pruned_player_keeps_moves_that_only_pass_time() {
    let config = PlayerConfig::default()
        .with_strategy(StrategyKind::Exhaustive(OpponentModel::Adversarial));
    let mut player =
        Player::prepare(climb_then_wait(), Role::new("robot"), config, meta()).unwrap();
    assert!(player.is_pruned());

    let start = player.initial_position();
    let first = player.select_move(&start, turn()).unwrap();
    assert_eq!(first, Move::new("up"));
    let middle = player
        .next_position(&start, &JointMove::new(vec![first]))
        .unwrap();

    let second = player.select_move(&middle, turn()).unwrap();
    assert_eq!(second, Move::new("wait"), "Waiting must stay legal after pruning");
    let end = player
        .next_position(&middle, &JointMove::new(vec![second]))
        .unwrap();

    assert!(player.machine().is_terminal(&end));
    assert_eq!(player.machine().goal(&end, &Role::new("robot")).unwrap(), 100);
}

#[test]
fn test_multi_role_circuits_are_not_pruned() {
    let circuit = fixtures::matching_pennies().unwrap();
    let player = Player::prepare(circuit, Role::new("col"), quick_mcts(), meta()).unwrap();

    assert!(!player.is_pruned());
}

#[test]
fn test_forced_move_returns_without_search() {
    let circuit = fixtures::waiting_room().unwrap();
    let config = PlayerConfig::default().with_strategy(StrategyKind::MonteCarloTreeSearch);
    let mut player = Player::prepare(circuit, Role::new("robot"), config, meta()).unwrap();
    let start = player.initial_position();

    let begin = Instant::now();
    let mv = player
        .select_move(&start, Deadline::after(Duration::from_secs(10), Duration::ZERO))
        .unwrap();

    assert_eq!(mv, Move::new("wait"));
    assert!(begin.elapsed() < Duration::from_secs(1), "A forced move needs no search");
    assert_eq!(player.last_statistics().iterations, 0);
}

#[test]
fn test_full_match_of_parity_race() {
    let left_config = PlayerConfig::default()
        .with_strategy(StrategyKind::IterativeDeepening {
            heuristic: Heuristic::GoalEstimate,
        })
        .with_search(SearchConfig::default().with_seed(2));
    let right_config = quick_mcts();
    let mut left = Player::prepare(
        fixtures::parity_race().unwrap(),
        Role::new("left"),
        left_config,
        meta(),
    )
    .unwrap();
    let mut right = Player::prepare(
        fixtures::parity_race().unwrap(),
        Role::new("right"),
        right_config,
        meta(),
    )
    .unwrap();

    let mut position = left.initial_position();
    let mut turns = 0;
    while !left.machine().is_terminal(&position) {
        let l = left.select_move(&position, turn()).unwrap();
        let r = right.select_move(&position, turn()).unwrap();
        position = left
            .next_position(&position, &JointMove::new(vec![l, r]))
            .unwrap();
        turns += 1;
    }

    assert_eq!(turns, 4);
    let goals = left.machine().goals(&position).unwrap();
    assert_eq!(goals.iter().sum::<i32>(), 100);
    assert!(left.last_statistics().completed_depth >= 1);
}

#[test]
fn test_select_move_in_terminal_position() {
    let circuit = fixtures::one_ply().unwrap();
    let mut player = Player::prepare(circuit, Role::new("robot"), quick_mcts(), meta()).unwrap();
    let start = player.initial_position();
    let done = player
        .next_position(&start, &JointMove::new(vec![Move::new("b")]))
        .unwrap();

    assert_eq!(
        player.select_move(&done, turn()).unwrap_err(),
        GameError::NoLegalActions
    );
}

#[test]
fn test_import_position_between_circuits() {
    let full = fixtures::one_ply_with_lamp().unwrap();
    let mut player =
        Player::prepare(full.clone(), Role::new("robot"), quick_mcts(), meta()).unwrap();

    let lamp = full.base_index("lamp").unwrap();
    let played_a = full.base_index("played_a").unwrap();
    let outside = Position::from_bases([lamp, played_a]);
    let inside = player.import_position(&full, &outside);

    let pruned_a = player.machine().circuit().base_index("played_a").unwrap();
    assert_eq!(inside, Position::from_bases([pruned_a]));
    assert!(player.machine().is_terminal(&inside));
}
