use std::time::Duration;

use ggp_player::config::{BestChildCriteria, PlayerConfig, SearchConfig, StrategyKind};
use ggp_player::{GameError, Heuristic};

#[test]
fn test_default_config() {
    let config = SearchConfig::default();

    assert_eq!(config.exploration_constant, std::f64::consts::SQRT_2);
    assert_eq!(config.rollouts_per_expansion, 5);
    assert_eq!(config.safety_margin, Duration::from_millis(500));
    assert_eq!(config.max_iterations, None);
    assert_eq!(config.seed, None);
    assert_eq!(config.best_child_criteria, BestChildCriteria::HighestAverage);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_builder_pattern() {
    let config = SearchConfig::default()
        .with_exploration_constant(0.7)
        .with_rollouts_per_expansion(2)
        .with_safety_margin(Duration::from_millis(100))
        .with_max_iterations(1000)
        .with_seed(99)
        .with_best_child_criteria(BestChildCriteria::Maximin);

    assert_eq!(config.exploration_constant, 0.7);
    assert_eq!(config.rollouts_per_expansion, 2);
    assert_eq!(config.safety_margin, Duration::from_millis(100));
    assert_eq!(config.max_iterations, Some(1000));
    assert_eq!(config.seed, Some(99));
    assert_eq!(config.best_child_criteria, BestChildCriteria::Maximin);
}

#[test]
fn test_validate_rejects_unusable_settings() {
    let cases = [
        SearchConfig::default().with_exploration_constant(-1.0),
        SearchConfig::default().with_exploration_constant(f64::NAN),
        SearchConfig::default().with_rollouts_per_expansion(0),
        SearchConfig::default().with_max_iterations(0),
    ];

    for config in cases {
        assert!(
            matches!(config.validate(), Err(GameError::InvalidConfiguration(_))),
            "Expected {:?} to be rejected",
            config
        );
    }
    assert!(SearchConfig::default()
        .with_exploration_constant(0.0)
        .validate()
        .is_ok());
}

#[test]
fn test_player_config_defaults_and_builders() {
    let config = PlayerConfig::default();
    assert_eq!(config.strategy, StrategyKind::MonteCarloTreeSearch);
    assert!(config.prune_single_role);

    let config = config
        .with_strategy(StrategyKind::IterativeDeepening {
            heuristic: Heuristic::Mobility,
        })
        .with_search(SearchConfig::default().with_seed(1))
        .with_pruning(false);
    assert_eq!(
        config.strategy,
        StrategyKind::IterativeDeepening {
            heuristic: Heuristic::Mobility
        }
    );
    assert_eq!(config.search.seed, Some(1));
    assert!(!config.prune_single_role);
    assert_eq!(Heuristic::default(), Heuristic::Neutral);
}
