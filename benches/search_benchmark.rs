#[macro_use]
extern crate criterion;

use criterion::{black_box, BenchmarkId, Criterion};
use ggp_player::config::{OpponentModel, SearchConfig};
use ggp_player::{
    fixtures, CircuitEvaluator, Deadline, JointMove, MinimaxStrategy, Move,
    MonteCarloTreeSearch, Role, StateMachine,
};
use std::time::Duration;

fn generous() -> Deadline {
    Deadline::after(Duration::from_secs(60), Duration::ZERO)
}

fn bench_evaluator(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluator");
    let mut machine = CircuitEvaluator::new(fixtures::parity_race().unwrap());
    let start = machine.initial_position();
    let joint = JointMove::new(vec![Move::new("one"), Move::new("zero")]);
    let left = Role::new("left");

    group.bench_function("next_position", |b| {
        b.iter(|| black_box(machine.next_position(&start, &joint).unwrap()))
    });
    group.bench_function("legal_moves", |b| {
        b.iter(|| black_box(machine.legal_moves(&start, &left).unwrap()))
    });
    group.bench_function("legal_joint_moves", |b| {
        b.iter(|| black_box(machine.legal_joint_moves(&start).unwrap()))
    });
    group.finish();
}

fn bench_mcts_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_search");
    group.measurement_time(Duration::from_secs(10));
    let left = Role::new("left");

    // Fixed iteration counts keep the runs comparable
    for &iterations in &[100, 1000, 5000] {
        let config = SearchConfig::default()
            .with_seed(42)
            .with_max_iterations(iterations);

        group.bench_with_input(
            BenchmarkId::new("iterations", iterations),
            &iterations,
            |b, &_| {
                b.iter(|| {
                    let mut machine = CircuitEvaluator::new(fixtures::parity_race().unwrap());
                    let start = machine.initial_position();
                    let mut mcts = MonteCarloTreeSearch::new(config.clone());
                    black_box(mcts.search(&mut machine, &left, &start, &generous()))
                })
            },
        );
    }

    for &rollouts in &[1, 5, 20] {
        let config = SearchConfig::default()
            .with_seed(42)
            .with_max_iterations(500)
            .with_rollouts_per_expansion(rollouts);

        group.bench_with_input(BenchmarkId::new("rollouts", rollouts), &rollouts, |b, &_| {
            b.iter(|| {
                let mut machine = CircuitEvaluator::new(fixtures::parity_race().unwrap());
                let start = machine.initial_position();
                let mut mcts = MonteCarloTreeSearch::new(config.clone());
                black_box(mcts.search(&mut machine, &left, &start, &generous()))
            })
        });
    }

    group.finish();
}

fn bench_minimax(c: &mut Criterion) {
    let mut group = c.benchmark_group("minimax");
    let left = Role::new("left");

    group.bench_function("exhaustive_parity_race", |b| {
        b.iter(|| {
            let mut machine = CircuitEvaluator::new(fixtures::parity_race().unwrap());
            let start = machine.initial_position();
            let mut strategy = MinimaxStrategy::exhaustive(OpponentModel::Adversarial);
            black_box(strategy.search(&mut machine, &left, &start, &generous()))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_evaluator, bench_mcts_search, bench_minimax);
criterion_main!(benches);
