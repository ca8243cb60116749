//! Parity race between two players
//!
//! `left` searches with iterative deepening and `right` with Monte Carlo
//! Tree Search. Run with `RUST_LOG=info` to see each player's statistics.

use std::time::Duration;

use ggp_player::config::{PlayerConfig, SearchConfig, StrategyKind};
use ggp_player::{fixtures, Deadline, GameError, Heuristic, JointMove, Player, Role, StateMachine};

fn main() -> Result<(), GameError> {
    // Initialize logging
    env_logger::init();

    println!("Parity Race");
    println!("===========");
    println!();

    let search = SearchConfig::default().with_safety_margin(Duration::from_millis(50));
    let left_config = PlayerConfig::default()
        .with_strategy(StrategyKind::IterativeDeepening {
            heuristic: Heuristic::DepthCharge { count: 4 },
        })
        .with_search(search.clone());
    let right_config = PlayerConfig::default()
        .with_strategy(StrategyKind::MonteCarloTreeSearch)
        .with_search(search);

    let start_clock = Duration::from_secs(2);
    let play_clock = Duration::from_millis(500);

    let circuit = fixtures::parity_race()?;
    let meta = Deadline::after(start_clock, Duration::from_millis(50));
    let mut left = Player::prepare(circuit.clone(), Role::new("left"), left_config, meta)?;
    let mut right = Player::prepare(circuit, Role::new("right"), right_config, meta)?;

    let mut position = left.initial_position();
    let mut turn = 1;
    while !left.machine().is_terminal(&position) {
        let left_move = left.select_move(&position, left.deadline_in(play_clock))?;
        let right_move = right.select_move(&position, right.deadline_in(play_clock))?;
        let joint = JointMove::new(vec![left_move, right_move]);
        println!("Turn {}: {}", turn, joint);
        println!("  left:  {}", left.last_statistics().summary());
        println!("  right: {}", right.last_statistics().summary());

        position = left.next_position(&position, &joint)?;
        turn += 1;
    }

    let goals = left.machine().goals(&position)?;
    println!();
    println!("Final goals: left={} right={}", goals[0], goals[1]);
    match goals[0].cmp(&goals[1]) {
        std::cmp::Ordering::Greater => println!("left wins"),
        std::cmp::Ordering::Less => println!("right wins"),
        std::cmp::Ordering::Equal => println!("Draw"),
    }
    Ok(())
}
