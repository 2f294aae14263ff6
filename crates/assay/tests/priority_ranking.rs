//! Integration tests for priority ranking.
//!
//! # Test Coverage
//!
//! - Business impact and level ordering between contrasting components
//! - Shortlist criteria (quick wins, critical path, high impact)
//! - Ranking determinism
//! - Score bounds over arbitrary completion inputs

mod common;

use assay::completion::{CompletionAnalysisResult, CompletionCalculator};
use assay::config::{AssessmentConfig, PriorityConfig};
use assay::dependency::{DependencyAnalysisResult, DependencyAnalyzer};
use assay::domain::ComponentCategory::{
    Automation, Documentation, Infrastructure, Monetization, Security, Testing,
};
use assay::domain::{Component, ComponentEvaluation, CompletionTier};
use assay::priority::{EffortLevel, PriorityLevel, PriorityRanker, PriorityRankingResult};
use common::{component, evaluation};
use proptest::prelude::*;

struct Run {
    deps: DependencyAnalysisResult,
    completion: CompletionAnalysisResult,
    ranking: PriorityRankingResult,
}

fn run(config: &AssessmentConfig, components: &[Component], evaluations: &[ComponentEvaluation]) -> Run {
    let deps = DependencyAnalyzer::new(config.dependency.clone()).analyze(components);
    let completion =
        CompletionCalculator::new(config.completion.clone()).calculate(evaluations, &[], &deps);
    let ranking = PriorityRanker::new(config.priority.clone()).rank(
        &completion.component_scores,
        evaluations,
        &[],
        &deps,
    );
    Run {
        deps,
        completion,
        ranking,
    }
}

fn sample_project() -> (Vec<Component>, Vec<ComponentEvaluation>) {
    let components = vec![
        component("postgres_database", Infrastructure, &[]),
        component("billing", Monetization, &["postgres_database"]),
        component("auth_gateway", Security, &["postgres_database"]),
        component("release_scripts", Automation, &["billing"]),
        component("user_guide", Documentation, &[]),
        component("smoke_suite", Testing, &["billing", "auth_gateway"]),
    ];
    let completions = [70.0, 45.0, 85.0, 20.0, 95.0, 60.0];
    let evaluations = components
        .iter()
        .zip(completions)
        .map(|(c, pct)| evaluation(c, pct))
        .collect();
    (components, evaluations)
}

#[test]
fn test_contrasting_components() {
    let mut config = AssessmentConfig::default();
    config
        .completion
        .category_tiers
        .insert(Documentation, CompletionTier::Optional);

    let revenue = component("revenue_tracker", Monetization, &[]);
    let guide = component("user_guide", Documentation, &[]);
    let evaluations = vec![evaluation(&revenue, 50.0), evaluation(&guide, 90.0)];

    let run = run(&config, &[revenue, guide], &evaluations);
    assert_eq!(
        run.completion.score("revenue_tracker").unwrap().tier,
        CompletionTier::Critical
    );
    assert_eq!(
        run.completion.score("user_guide").unwrap().tier,
        CompletionTier::Optional
    );

    let a = run.ranking.score("revenue_tracker").unwrap();
    let b = run.ranking.score("user_guide").unwrap();
    assert!(a.business_impact_score > b.business_impact_score);
    assert!(matches!(
        a.priority_level,
        PriorityLevel::Critical | PriorityLevel::High
    ));
    assert_eq!(b.priority_level, PriorityLevel::Low);
    assert_eq!(run.ranking.priority_scores[0].component, "revenue_tracker");
}

#[test]
fn test_scores_sorted_descending() {
    let (components, evaluations) = sample_project();
    let run = run(&AssessmentConfig::default(), &components, &evaluations);

    let scores: Vec<f64> = run
        .ranking
        .priority_scores
        .iter()
        .map(|s| s.priority_score)
        .collect();
    assert_eq!(scores.len(), components.len());
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_quick_wins_meet_criteria() {
    let (components, evaluations) = sample_project();
    let config = AssessmentConfig::default();
    let run = run(&config, &components, &evaluations);

    assert!(run.ranking.quick_wins.len() <= config.priority.quick_win_limit);
    for name in &run.ranking.quick_wins {
        let score = run.ranking.score(name).unwrap();
        assert!(score.roi_score >= config.priority.quick_win_roi);
        assert!(matches!(
            score.effort_estimate,
            EffortLevel::Minimal | EffortLevel::Low
        ));
    }
}

#[test]
fn test_critical_path_contains_critical_tier() {
    let (components, evaluations) = sample_project();
    let run = run(&AssessmentConfig::default(), &components, &evaluations);

    let critical: Vec<&str> = run
        .ranking
        .priority_scores
        .iter()
        .filter(|s| s.tier == CompletionTier::Critical)
        .map(|s| s.component.as_str())
        .collect();
    assert!(critical.contains(&"postgres_database"));
    for name in critical {
        assert!(run.ranking.critical_path.iter().any(|c| c == name));
    }
}

#[test]
fn test_high_impact_items_meet_threshold() {
    let (components, evaluations) = sample_project();
    let config = AssessmentConfig::default();
    let run = run(&config, &components, &evaluations);

    for name in &run.ranking.high_impact_items {
        let score = run.ranking.score(name).unwrap();
        assert!(score.business_impact_score >= config.priority.high_impact_threshold);
    }
}

#[test]
fn test_dependents_raise_urgency() {
    let (components, evaluations) = sample_project();
    let run = run(&AssessmentConfig::default(), &components, &evaluations);

    let database = run.ranking.score("postgres_database").unwrap();
    let guide = run.ranking.score("user_guide").unwrap();
    assert!(database.dependency_urgency_score > guide.dependency_urgency_score);
    assert!(run.deps.graph.dependents_of("postgres_database").len() >= 2);
}

#[test]
fn test_cycle_urgency_independent_of_dependency_list_order() {
    let urgency_of_b = |root_deps: &[&str]| {
        let components = vec![
            component("root", Testing, root_deps),
            component("a", Testing, &["root"]),
            component("b", Testing, &["a"]),
        ];
        let evaluations: Vec<ComponentEvaluation> =
            components.iter().map(|c| evaluation(c, 50.0)).collect();
        let run = run(&AssessmentConfig::default(), &components, &evaluations);
        run.ranking.score("b").unwrap().dependency_urgency_score
    };

    let first = urgency_of_b(&["a", "b"]);
    let second = urgency_of_b(&["b", "a"]);

    assert!((first - second).abs() < f64::EPSILON);
    // b sits on root -> b -> a -> root and has root as its one dependent
    assert!(first >= 30.0);
}

#[test]
fn test_ranking_is_deterministic() {
    let (components, evaluations) = sample_project();
    let config = AssessmentConfig::default();

    let first = run(&config, &components, &evaluations).ranking;
    let second = run(&config, &components, &evaluations).ranking;

    assert_eq!(first, second);
}

#[test]
fn test_summary_totals() {
    let (components, evaluations) = sample_project();
    let run = run(&AssessmentConfig::default(), &components, &evaluations);
    let summary = PriorityRanker::new(PriorityConfig::default()).summary(&run.ranking);

    assert_eq!(summary.total_components, components.len());
    assert_eq!(summary.level_counts.values().sum::<usize>(), components.len());
    assert_eq!(summary.effort_distribution.values().sum::<usize>(), components.len());
    assert_eq!(summary.top_priorities.len(), 5);
    assert_eq!(
        summary.total_estimated_effort_hours,
        run.ranking
            .priority_scores
            .iter()
            .map(|s| u64::from(s.effort_hours))
            .sum::<u64>()
    );
}

proptest! {
    #[test]
    fn prop_priority_scores_bounded(
        completions in proptest::collection::vec(-20.0f64..130.0, 1..8),
    ) {
        let categories = [Infrastructure, Monetization, Automation, Documentation, Testing, Security];
        let components: Vec<Component> = completions
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let deps: Vec<String> = (0..i).step_by(2).map(|j| format!("c{j}")).collect();
                Component::new(format!("c{i}"), categories[i % categories.len()])
                    .with_dependencies(deps)
            })
            .collect();
        let evaluations: Vec<ComponentEvaluation> = components
            .iter()
            .zip(&completions)
            .map(|(c, pct)| evaluation(c, *pct))
            .collect();

        let run = run(&AssessmentConfig::default(), &components, &evaluations);

        for score in &run.ranking.priority_scores {
            prop_assert!((0.0..=100.0).contains(&score.priority_score));
            prop_assert!((0.0..=100.0).contains(&score.business_impact_score));
            prop_assert!((0.0..=100.0).contains(&score.technical_complexity_score));
            prop_assert!((0.0..=100.0).contains(&score.dependency_urgency_score));
            prop_assert!((0.0..=100.0).contains(&score.roi_score));
            prop_assert!((0.0..=1.0).contains(&score.risk_factor));
        }
    }
}
