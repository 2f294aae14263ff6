//! Weighted completion scoring.
//!
//! The calculator fuses each component's raw completion percentage with its
//! quality grade and dependency health, weights it by business importance and
//! rolls everything up into a system score. With historical samples it also
//! reports per-component trends and per-tier milestone projections.

mod trend;

pub use trend::{CompletionHistory, CompletionSample, CompletionTrend, TrendDirection};

use crate::config::CompletionConfig;
use crate::dependency::DependencyAnalysisResult;
use crate::domain::{
    Component, ComponentCategory, ComponentEvaluation, CompletionTier, EvaluationStatus,
    QualityAssessment, mean,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

/// Overall completion below this asks for foundation work first.
const FOUNDATION_THRESHOLD: f64 = 70.0;

/// Confidence below this is flagged as a risk.
const LOW_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Completion scores for a single component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentCompletionScore {
    /// Component name
    pub component: String,

    /// Component category
    pub category: ComponentCategory,

    /// Raw completion, 0-100
    pub completion_percentage: f64,

    /// Completion multiplied by the business impact weight
    pub weighted_score: f64,

    /// Importance tier
    pub tier: CompletionTier,

    /// Multiplier from the quality grade
    pub quality_factor: f64,

    /// Dependency health of the component, 0-1
    pub dependency_factor: f64,

    /// Category weight times tier multiplier
    pub business_impact_weight: f64,

    /// Completion after quality and dependency adjustment, within
    /// `[0.5, 1.1]` times the raw completion
    pub adjusted_completion: f64,

    /// Trust in the inputs behind this score, 0-1
    pub confidence: f64,
}

/// System-wide completion roll-up.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SystemCompletionScore {
    /// Mean raw completion
    pub overall_completion: f64,

    /// Business-weighted mean completion
    pub weighted_completion: f64,

    /// Mean completion per category
    pub category_completion: BTreeMap<ComponentCategory, f64>,

    /// Mean completion per tier
    pub tier_completion: BTreeMap<CompletionTier, f64>,

    /// Number of scored components
    pub total_components: usize,

    /// Components at or above the completed threshold
    pub completed_components: usize,

    /// Mean completion of critical-tier components, 0 if there are none
    pub critical_completion: f64,

    /// Mean completion of essential-tier components, 0 if there are none
    pub essential_completion: f64,

    /// Mean adjusted completion
    pub quality_adjusted_completion: f64,

    /// Mean confidence
    pub confidence: f64,
}

/// Output of [`CompletionCalculator::calculate`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CompletionAnalysisResult {
    /// System roll-up
    pub system_score: SystemCompletionScore,

    /// Per-component scores, in evaluation order
    pub component_scores: Vec<ComponentCompletionScore>,

    /// Per-component trends
    pub trends: Vec<CompletionTrend>,

    /// Advice for raising completion
    pub recommendations: Vec<String>,

    /// Named risks to completion
    pub risk_factors: Vec<String>,

    /// Projected completion date per tier
    pub milestones: BTreeMap<CompletionTier, DateTime<Utc>>,
}

impl CompletionAnalysisResult {
    /// Score of the component named `name`.
    #[must_use]
    pub fn score(&self, name: &str) -> Option<&ComponentCompletionScore> {
        self.component_scores.iter().find(|s| s.component == name)
    }
}

/// Computes tiered, weighted completion scores.
#[derive(Debug, Clone, Default)]
pub struct CompletionCalculator {
    config: CompletionConfig,
    history: CompletionHistory,
    as_of: Option<DateTime<Utc>>,
}

impl CompletionCalculator {
    /// Create a calculator with the given weighting tables and no history.
    #[must_use]
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            config,
            history: CompletionHistory::new(),
            as_of: None,
        }
    }

    /// Use `history` for trend analysis, evaluated at `as_of`.
    #[must_use]
    pub fn with_history(mut self, history: CompletionHistory, as_of: DateTime<Utc>) -> Self {
        self.history = history;
        self.as_of = Some(as_of);
        self
    }

    /// Importance tier of `component`.
    ///
    /// Name markers are checked in order before the category default.
    #[must_use]
    pub fn tier_for(&self, component: &Component) -> CompletionTier {
        let name = component.name.to_lowercase();
        self.config
            .tier_overrides
            .iter()
            .find(|o| !o.marker.is_empty() && name.contains(&o.marker.to_lowercase()))
            .map(|o| o.tier)
            .or_else(|| self.config.category_tiers.get(&component.category).copied())
            .unwrap_or(self.config.default_tier)
    }

    /// Score every evaluated component and roll the results up.
    ///
    /// Evaluations are joined to quality assessments and dependency scores by
    /// component name. Missing quality data and missing dependency scores fall
    /// back to neutral defaults; repeated or blank names are skipped.
    #[must_use]
    pub fn calculate(
        &self,
        evaluations: &[ComponentEvaluation],
        quality_assessments: &[QualityAssessment],
        dependency_result: &DependencyAnalysisResult,
    ) -> CompletionAnalysisResult {
        debug!(
            evaluations = evaluations.len(),
            quality_assessments = quality_assessments.len(),
            "Calculating completion"
        );

        let mut quality: HashMap<&str, &QualityAssessment> = HashMap::new();
        for assessment in quality_assessments {
            if quality.contains_key(assessment.component.as_str()) {
                warn!(component = %assessment.component, "Ignoring repeated quality assessment");
                continue;
            }
            quality.insert(assessment.component.as_str(), assessment);
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut component_scores = Vec::with_capacity(evaluations.len());
        for evaluation in evaluations {
            let name = evaluation.component.name.as_str();
            if name.trim().is_empty() {
                warn!("Skipping evaluation with blank component name");
                continue;
            }
            if !seen.insert(name) {
                warn!(component = %name, "Skipping repeated evaluation");
                continue;
            }
            component_scores.push(self.score_component(
                evaluation,
                quality.get(name).copied(),
                dependency_result.score(name),
            ));
        }

        let system_score = self.system_score(&component_scores);
        let trends = self.trends(&component_scores);
        let recommendations = self.recommendations(&system_score, &component_scores, &trends);
        let risk_factors = self.risk_factors(&component_scores, &trends);
        let milestones = trend::project_milestones(&component_scores, &trends);

        info!(
            components = system_score.total_components,
            overall = system_score.overall_completion,
            weighted = system_score.weighted_completion,
            completed = system_score.completed_components,
            "Completion calculation complete"
        );

        CompletionAnalysisResult {
            system_score,
            component_scores,
            trends,
            recommendations,
            risk_factors,
            milestones,
        }
    }

    fn score_component(
        &self,
        evaluation: &ComponentEvaluation,
        quality: Option<&QualityAssessment>,
        dependency_score: Option<f64>,
    ) -> ComponentCompletionScore {
        let component = &evaluation.component;
        let base = evaluation.completion();
        let tier = self.tier_for(component);

        let quality_factor = quality
            .and_then(|q| self.config.quality_factors.get(&q.quality_level).copied())
            .unwrap_or(self.config.missing_quality_factor);
        let dependency_factor = dependency_score.unwrap_or(1.0).clamp(0.0, 1.0);

        let category_weight = self
            .config
            .category_weights
            .get(&component.category)
            .copied()
            .unwrap_or(1.0);
        let tier_multiplier = self
            .config
            .tier_multipliers
            .get(&tier)
            .copied()
            .unwrap_or(1.0);
        let business_impact_weight = category_weight * tier_multiplier;

        let raw_adjusted = base * quality_factor * dependency_factor;
        let adjusted_completion = if raw_adjusted.is_nan() {
            base
        } else {
            raw_adjusted.clamp(0.5 * base, 1.1 * base)
        };

        let status_confidence = match evaluation.status {
            EvaluationStatus::Passed => 0.9,
            EvaluationStatus::Warning => 0.7,
            EvaluationStatus::Failed | EvaluationStatus::NotEvaluated => 0.4,
        };
        let quality_confidence = if quality.is_some() { 0.8 } else { 0.6 };
        let confidence = mean(&[status_confidence, quality_confidence, dependency_factor]);

        ComponentCompletionScore {
            component: component.name.clone(),
            category: component.category,
            completion_percentage: base,
            weighted_score: base * business_impact_weight,
            tier,
            quality_factor,
            dependency_factor,
            business_impact_weight,
            adjusted_completion,
            confidence,
        }
    }

    fn system_score(&self, scores: &[ComponentCompletionScore]) -> SystemCompletionScore {
        if scores.is_empty() {
            return SystemCompletionScore::default();
        }

        let completions: Vec<f64> = scores.iter().map(|s| s.completion_percentage).collect();
        let total_weight: f64 = scores.iter().map(|s| s.business_impact_weight).sum();
        let weighted_completion = if total_weight > 0.0 {
            scores.iter().map(|s| s.weighted_score).sum::<f64>() / total_weight
        } else {
            0.0
        };

        let mut by_category: BTreeMap<ComponentCategory, Vec<f64>> = BTreeMap::new();
        let mut by_tier: BTreeMap<CompletionTier, Vec<f64>> = BTreeMap::new();
        for score in scores {
            by_category
                .entry(score.category)
                .or_default()
                .push(score.completion_percentage);
            by_tier
                .entry(score.tier)
                .or_default()
                .push(score.completion_percentage);
        }
        let category_completion: BTreeMap<_, _> =
            by_category.into_iter().map(|(k, v)| (k, mean(&v))).collect();
        let tier_completion: BTreeMap<_, _> =
            by_tier.into_iter().map(|(k, v)| (k, mean(&v))).collect();

        let adjusted: Vec<f64> = scores.iter().map(|s| s.adjusted_completion).collect();
        let confidences: Vec<f64> = scores.iter().map(|s| s.confidence).collect();

        SystemCompletionScore {
            overall_completion: mean(&completions),
            weighted_completion: weighted_completion.clamp(0.0, 100.0),
            critical_completion: tier_completion
                .get(&CompletionTier::Critical)
                .copied()
                .unwrap_or(0.0),
            essential_completion: tier_completion
                .get(&CompletionTier::Essential)
                .copied()
                .unwrap_or(0.0),
            category_completion,
            tier_completion,
            total_components: scores.len(),
            completed_components: completions
                .iter()
                .filter(|c| **c >= self.config.completed_threshold)
                .count(),
            quality_adjusted_completion: mean(&adjusted),
            confidence: mean(&confidences),
        }
    }

    fn trends(&self, scores: &[ComponentCompletionScore]) -> Vec<CompletionTrend> {
        scores
            .iter()
            .map(|score| {
                let samples = self
                    .history
                    .get(&score.component)
                    .map_or(&[][..], Vec::as_slice);
                match self.as_of {
                    Some(as_of) => trend::analyze_trend(
                        &score.component,
                        score.completion_percentage,
                        samples,
                        as_of,
                        self.config.trend_threshold,
                    ),
                    None => CompletionTrend::unknown(&score.component, score.completion_percentage),
                }
            })
            .collect()
    }

    fn recommendations(
        &self,
        system: &SystemCompletionScore,
        scores: &[ComponentCompletionScore],
        trends: &[CompletionTrend],
    ) -> Vec<String> {
        let mut recs = Vec::new();
        if scores.is_empty() {
            return recs;
        }
        let has_tier = |tier: CompletionTier| scores.iter().any(|s| s.tier == tier);

        if system.overall_completion < FOUNDATION_THRESHOLD {
            recs.push(format!(
                "System completion is {:.1}% - focus on critical components first",
                system.overall_completion
            ));
        }
        if has_tier(CompletionTier::Critical)
            && system.critical_completion < self.config.completed_threshold
        {
            recs.push(format!(
                "Critical components at {:.1}% - these must reach 100% for production",
                system.critical_completion
            ));
        }
        if has_tier(CompletionTier::Essential)
            && system.essential_completion < self.config.completed_threshold
        {
            recs.push(format!(
                "Essential components at {:.1}% - complete them before production deployment",
                system.essential_completion
            ));
        }

        let declining = trends
            .iter()
            .filter(|t| t.direction == TrendDirection::Declining)
            .count();
        if declining > 0 {
            recs.push(format!(
                "Investigate {declining} components with declining completion"
            ));
        }

        recs
    }

    fn risk_factors(
        &self,
        scores: &[ComponentCompletionScore],
        trends: &[CompletionTrend],
    ) -> Vec<String> {
        let mut risks = Vec::new();

        let incomplete_critical: Vec<&ComponentCompletionScore> = scores
            .iter()
            .filter(|s| {
                s.tier == CompletionTier::Critical
                    && s.completion_percentage < self.config.completed_threshold
            })
            .collect();
        if !incomplete_critical.is_empty() {
            risks.push(format!(
                "Risk: {} critical components incomplete",
                incomplete_critical.len()
            ));
            for score in incomplete_critical {
                risks.push(format!(
                    "Critical component {} is only {:.1}% complete",
                    score.component, score.completion_percentage
                ));
            }
        }

        for trend in trends
            .iter()
            .filter(|t| t.direction == TrendDirection::Declining)
        {
            risks.push(format!(
                "{} completion is declining ({:.2} points/day)",
                trend.component, trend.change_rate
            ));
        }

        for score in scores
            .iter()
            .filter(|s| s.confidence < LOW_CONFIDENCE_THRESHOLD)
        {
            risks.push(format!(
                "Low confidence in completion data for {}",
                score.component
            ));
        }

        risks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::DependencyAnalyzer;
    use crate::domain::QualityLevel;
    use chrono::TimeZone;
    use rstest::rstest;

    fn evaluation(
        name: &str,
        category: ComponentCategory,
        completion: f64,
        status: EvaluationStatus,
    ) -> ComponentEvaluation {
        ComponentEvaluation::new(Component::new(name, category), completion, status)
    }

    fn no_dependencies() -> DependencyAnalysisResult {
        DependencyAnalysisResult::default()
    }

    #[rstest]
    #[case::critical_marker("nca_toolkit", ComponentCategory::Automation, CompletionTier::Critical)]
    #[case::marker_case_insensitive("Postgres_DATABASE", ComponentCategory::Infrastructure, CompletionTier::Critical)]
    #[case::essential_marker("minio_storage", ComponentCategory::Infrastructure, CompletionTier::Essential)]
    #[case::monetization_default("checkout", ComponentCategory::Monetization, CompletionTier::Essential)]
    #[case::category_default("readme", ComponentCategory::Documentation, CompletionTier::Important)]
    fn test_tier_for(
        #[case] name: &str,
        #[case] category: ComponentCategory,
        #[case] expected: CompletionTier,
    ) {
        let calculator = CompletionCalculator::default();
        assert_eq!(calculator.tier_for(&Component::new(name, category)), expected);
    }

    #[test]
    fn test_component_score_fields() {
        let calculator = CompletionCalculator::default();
        let evaluations = vec![evaluation(
            "checkout",
            ComponentCategory::Monetization,
            80.0,
            EvaluationStatus::Passed,
        )];
        let quality = vec![QualityAssessment::new("checkout", QualityLevel::Good)];

        let result = calculator.calculate(&evaluations, &quality, &no_dependencies());
        let score = &result.component_scores[0];

        assert_eq!(score.tier, CompletionTier::Essential);
        assert!((score.quality_factor - 0.9).abs() < 1e-9);
        assert!((score.dependency_factor - 1.0).abs() < 1e-9);
        // monetization 2.0 x essential 1.5
        assert!((score.business_impact_weight - 3.0).abs() < 1e-9);
        assert!((score.weighted_score - 240.0).abs() < 1e-9);
        assert!((score.adjusted_completion - 72.0).abs() < 1e-9);
        // mean of 0.9, 0.8 and 1.0
        assert!((score.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_missing_quality_uses_default_factor() {
        let calculator = CompletionCalculator::default();
        let evaluations = vec![evaluation(
            "readme",
            ComponentCategory::Documentation,
            50.0,
            EvaluationStatus::NotEvaluated,
        )];

        let result = calculator.calculate(&evaluations, &[], &no_dependencies());
        let score = &result.component_scores[0];

        assert!((score.quality_factor - 0.8).abs() < 1e-9);
        assert!((score.adjusted_completion - 40.0).abs() < 1e-9);
        assert!((score.confidence - (0.4 + 0.6 + 1.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_adjusted_completion_is_banded() {
        let calculator = CompletionCalculator::default();
        let evaluations = vec![
            ComponentEvaluation::new(
                Component::new("ghost_consumer", ComponentCategory::Automation)
                    .with_dependencies(["ghost_a", "ghost_b", "ghost_c", "ghost_d"]),
                60.0,
                EvaluationStatus::Failed,
            ),
        ];
        let components: Vec<Component> = evaluations.iter().map(|e| e.component.clone()).collect();
        let deps = DependencyAnalyzer::default().analyze(&components);
        let quality = vec![QualityAssessment::new("ghost_consumer", QualityLevel::Poor)];

        let result = calculator.calculate(&evaluations, &quality, &deps);
        let score = &result.component_scores[0];

        assert!(score.dependency_factor.abs() < f64::EPSILON);
        assert!((score.adjusted_completion - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_system_score_rollup() {
        let calculator = CompletionCalculator::default();
        let evaluations = vec![
            evaluation("nca_toolkit", ComponentCategory::Infrastructure, 100.0, EvaluationStatus::Passed),
            evaluation("readme", ComponentCategory::Documentation, 40.0, EvaluationStatus::Warning),
        ];

        let result = calculator.calculate(&evaluations, &[], &no_dependencies());
        let system = &result.system_score;

        assert_eq!(system.total_components, 2);
        assert_eq!(system.completed_components, 1);
        assert!((system.overall_completion - 70.0).abs() < 1e-9);
        // weights: 1.5 x 2.0 = 3.0 and 0.5 x 1.0 = 0.5
        let expected = (100.0 * 3.0 + 40.0 * 0.5) / 3.5;
        assert!((system.weighted_completion - expected).abs() < 1e-9);
        assert!((system.critical_completion - 100.0).abs() < 1e-9);
        assert!(system.essential_completion.abs() < f64::EPSILON);
        assert_eq!(
            system.category_completion.get(&ComponentCategory::Documentation),
            Some(&40.0)
        );
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let result = CompletionCalculator::default().calculate(&[], &[], &no_dependencies());
        assert_eq!(result.system_score, SystemCompletionScore::default());
        assert!(result.recommendations.is_empty());
        assert!(result.milestones.is_empty());
    }

    #[test]
    fn test_out_of_range_completion_clamped() {
        let calculator = CompletionCalculator::default();
        let evaluations = vec![
            evaluation("over", ComponentCategory::Testing, 180.0, EvaluationStatus::Passed),
            evaluation("under", ComponentCategory::Testing, -20.0, EvaluationStatus::Passed),
            evaluation("nan", ComponentCategory::Testing, f64::NAN, EvaluationStatus::Passed),
        ];

        let result = calculator.calculate(&evaluations, &[], &no_dependencies());
        for score in &result.component_scores {
            assert!((0.0..=100.0).contains(&score.completion_percentage));
        }
    }

    #[test]
    fn test_repeated_evaluation_keeps_first() {
        let calculator = CompletionCalculator::default();
        let evaluations = vec![
            evaluation("readme", ComponentCategory::Documentation, 40.0, EvaluationStatus::Passed),
            evaluation("readme", ComponentCategory::Documentation, 90.0, EvaluationStatus::Passed),
        ];

        let result = calculator.calculate(&evaluations, &[], &no_dependencies());
        assert_eq!(result.component_scores.len(), 1);
        assert!((result.component_scores[0].completion_percentage - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_incomplete_critical_is_named_risk() {
        let calculator = CompletionCalculator::default();
        let evaluations = vec![evaluation(
            "revenue_tracker",
            ComponentCategory::Monetization,
            55.0,
            EvaluationStatus::Warning,
        )];

        let result = calculator.calculate(&evaluations, &[], &no_dependencies());

        assert!(result.risk_factors.contains(&"Risk: 1 critical components incomplete".to_string()));
        assert!(
            result
                .risk_factors
                .iter()
                .any(|r| r.contains("revenue_tracker"))
        );
        assert!(
            result
                .recommendations
                .iter()
                .any(|r| r.starts_with("Critical components at 55.0%"))
        );
    }

    #[test]
    fn test_history_drives_trends_and_milestones() {
        let as_of = Utc.with_ymd_and_hms(2025, 6, 11, 0, 0, 0).unwrap();
        let mut history = CompletionHistory::new();
        history.insert(
            "nca_toolkit".to_string(),
            vec![CompletionSample {
                timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
                completion: 50.0,
            }],
        );
        let calculator = CompletionCalculator::default().with_history(history, as_of);
        let evaluations = vec![evaluation(
            "nca_toolkit",
            ComponentCategory::Infrastructure,
            70.0,
            EvaluationStatus::Passed,
        )];

        let result = calculator.calculate(&evaluations, &[], &no_dependencies());
        let trend = &result.trends[0];

        assert_eq!(trend.direction, TrendDirection::Improving);
        assert!((trend.change_rate - 2.0).abs() < 1e-9);
        let expected = as_of + chrono::Duration::days(15);
        assert_eq!(trend.projected_completion_date, Some(expected));
        assert_eq!(result.milestones.get(&CompletionTier::Critical), Some(&expected));
    }

    #[test]
    fn test_milestone_requires_every_projection() {
        let as_of = Utc.with_ymd_and_hms(2025, 6, 11, 0, 0, 0).unwrap();
        let mut history = CompletionHistory::new();
        history.insert(
            "nca_toolkit".to_string(),
            vec![CompletionSample {
                timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
                completion: 50.0,
            }],
        );
        let calculator = CompletionCalculator::default().with_history(history, as_of);
        let evaluations = vec![
            evaluation("nca_toolkit", ComponentCategory::Infrastructure, 70.0, EvaluationStatus::Passed),
            evaluation("postgres_database", ComponentCategory::Infrastructure, 30.0, EvaluationStatus::Passed),
        ];

        let result = calculator.calculate(&evaluations, &[], &no_dependencies());
        assert!(result.milestones.is_empty());
    }
}
