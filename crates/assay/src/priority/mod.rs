//! Priority ranking.
//!
//! [`PriorityRanker::rank`] turns completion scores into an ordered work
//! list. Each component gets a 0-100 priority built from business impact,
//! dependency urgency, inverted technical complexity and the completion gap,
//! plus effort, return and risk estimates used to pick shortlists.

mod effort;
mod selection;

pub use selection::{PrioritySummary, TopPriority};

use crate::completion::ComponentCompletionScore;
use crate::config::PriorityConfig;
use crate::dependency::DependencyAnalysisResult;
use crate::domain::{
    ComponentEvaluation, CompletionTier, EvaluationStatus, QualityAssessment, QualityLevel,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use tracing::{debug, info, warn};

/// Urgency added per component depending on this one.
const URGENCY_PER_DEPENDENT: f64 = 15.0;

/// Urgency added for cycle membership.
const CYCLE_URGENCY: f64 = 30.0;

/// Urgency added per missing dependency of this component.
const URGENCY_PER_MISSING: f64 = 10.0;

/// Complexity before keyword, quality and status adjustments.
const BASE_COMPLEXITY: f64 = 50.0;

/// Urgency of acting on a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    /// Act immediately
    Critical,

    /// Act in the current cycle
    High,

    /// Schedule
    Medium,

    /// Backlog
    Low,
}

impl PriorityLevel {
    /// Every level, most urgent first.
    pub const ALL: [Self; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        f.write_str(s)
    }
}

/// Size of the remaining work on a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffortLevel {
    /// Up to 16 hours
    Minimal,

    /// Up to 40 hours
    Low,

    /// Up to 80 hours
    Medium,

    /// Up to 160 hours
    High,

    /// More than 160 hours
    Extensive,
}

impl EffortLevel {
    /// Every level, smallest first.
    pub const ALL: [Self; 5] = [
        Self::Minimal,
        Self::Low,
        Self::Medium,
        Self::High,
        Self::Extensive,
    ];
}

impl fmt::Display for EffortLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Minimal => "minimal",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Extensive => "extensive",
        };
        f.write_str(s)
    }
}

/// Priority assessment of one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityScore {
    /// Component name
    pub component: String,

    /// Priority bucket
    pub priority_level: PriorityLevel,

    /// Combined priority, 0-100
    pub priority_score: f64,

    /// Business impact, 0-100
    pub business_impact_score: f64,

    /// Technical complexity, 0-100
    pub technical_complexity_score: f64,

    /// Dependency urgency, 0-100
    pub dependency_urgency_score: f64,

    /// Effort bucket
    pub effort_estimate: EffortLevel,

    /// Estimated hours of remaining work
    pub effort_hours: u32,

    /// Return on investment, 0-100
    pub roi_score: f64,

    /// Risk of leaving the component incomplete, 0-1
    pub risk_factor: f64,

    /// Importance tier
    pub tier: CompletionTier,

    /// Reasons behind the priority
    pub justification: String,

    /// Components this one depends on
    pub dependencies: Vec<String>,

    /// Unresolved dependencies blocking this component
    pub blockers: Vec<String>,
}

/// Output of [`PriorityRanker::rank`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PriorityRankingResult {
    /// Scores, highest priority first
    pub priority_scores: Vec<PriorityScore>,

    /// Component names per priority level
    pub priority_matrix: BTreeMap<PriorityLevel, Vec<String>>,

    /// Component count per effort level
    pub effort_distribution: BTreeMap<EffortLevel, usize>,

    /// Components most constraining readiness
    pub critical_path: Vec<String>,

    /// High return, low effort components
    pub quick_wins: Vec<String>,

    /// Components with the highest business impact
    pub high_impact_items: Vec<String>,

    /// Advice derived from the shortlists
    pub recommendations: Vec<String>,

    /// Sum of estimated hours
    pub total_estimated_effort: u64,
}

impl PriorityRankingResult {
    /// Priority of the component named `name`.
    #[must_use]
    pub fn score(&self, name: &str) -> Option<&PriorityScore> {
        self.priority_scores.iter().find(|s| s.component == name)
    }
}

/// Ranks components by priority.
#[derive(Debug, Clone, Default)]
pub struct PriorityRanker {
    config: PriorityConfig,
}

impl PriorityRanker {
    /// Create a ranker with the given weighting tables.
    #[must_use]
    pub fn new(config: PriorityConfig) -> Self {
        Self { config }
    }

    /// Rank every scored component.
    ///
    /// Evaluations and quality assessments are joined by component name and
    /// only refine the complexity and effort estimates; either may be absent.
    #[must_use]
    pub fn rank(
        &self,
        completion_scores: &[ComponentCompletionScore],
        evaluations: &[ComponentEvaluation],
        quality_assessments: &[QualityAssessment],
        dependency_result: &DependencyAnalysisResult,
    ) -> PriorityRankingResult {
        debug!(components = completion_scores.len(), "Ranking priorities");

        let mut statuses: HashMap<&str, EvaluationStatus> = HashMap::new();
        for evaluation in evaluations {
            statuses
                .entry(evaluation.component.name.as_str())
                .or_insert(evaluation.status);
        }
        let mut quality: HashMap<&str, QualityLevel> = HashMap::new();
        for assessment in quality_assessments {
            quality
                .entry(assessment.component.as_str())
                .or_insert(assessment.quality_level);
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut priority_scores: Vec<PriorityScore> = Vec::with_capacity(completion_scores.len());
        for score in completion_scores {
            if !seen.insert(score.component.as_str()) {
                warn!(component = %score.component, "Skipping repeated completion score");
                continue;
            }
            let name = score.component.as_str();
            priority_scores.push(self.score_component(
                score,
                statuses.get(name).copied(),
                quality.get(name).copied(),
                dependency_result,
            ));
        }

        priority_scores.sort_by(|a, b| {
            b.priority_score
                .total_cmp(&a.priority_score)
                .then_with(|| a.component.cmp(&b.component))
        });

        let priority_matrix = selection::priority_matrix(&priority_scores);
        let effort_distribution = selection::effort_distribution(&priority_scores);
        let critical_path = selection::critical_path(&priority_scores, &self.config);
        let quick_wins = selection::quick_wins(&priority_scores, &self.config);
        let high_impact_items = selection::high_impact_items(&priority_scores, &self.config);
        let recommendations =
            selection::recommendations(&priority_scores, &critical_path, &quick_wins);
        let total_estimated_effort = priority_scores
            .iter()
            .map(|s| u64::from(s.effort_hours))
            .sum();

        info!(
            components = priority_scores.len(),
            critical_path = critical_path.len(),
            quick_wins = quick_wins.len(),
            total_effort_hours = total_estimated_effort,
            "Priority ranking complete"
        );

        PriorityRankingResult {
            priority_scores,
            priority_matrix,
            effort_distribution,
            critical_path,
            quick_wins,
            high_impact_items,
            recommendations,
            total_estimated_effort,
        }
    }

    /// Flat digest of a ranking.
    #[must_use]
    pub fn summary(&self, result: &PriorityRankingResult) -> PrioritySummary {
        selection::summarize(result)
    }

    fn score_component(
        &self,
        score: &ComponentCompletionScore,
        status: Option<EvaluationStatus>,
        quality: Option<QualityLevel>,
        deps: &DependencyAnalysisResult,
    ) -> PriorityScore {
        let name = score.component.as_str();
        let completion = score.completion_percentage.clamp(0.0, 100.0);
        let dependent_count = deps.graph.dependents_of(name).len();

        let business_impact = self.business_impact(score, completion);
        let technical_complexity = self.technical_complexity(name, status, quality);
        let dependency_urgency = dependency_urgency(name, dependent_count, deps);

        let weights = &self.config.weights;
        let priority_score = (weights.business_impact * business_impact
            + weights.dependency_urgency * dependency_urgency
            + weights.technical_complexity * (100.0 - technical_complexity)
            + weights.completion_gap * (100.0 - completion))
            .clamp(0.0, 100.0);

        let (effort_estimate, effort_hours) = effort::estimate_effort(
            name,
            completion,
            quality,
            status,
            &self.config.effort_keywords,
        );

        PriorityScore {
            component: score.component.clone(),
            priority_level: priority_level(priority_score, score.tier),
            priority_score,
            business_impact_score: business_impact,
            technical_complexity_score: technical_complexity,
            dependency_urgency_score: dependency_urgency,
            effort_estimate,
            effort_hours,
            roi_score: effort::roi_score(
                business_impact,
                effort_hours,
                self.config.effort_cap_hours,
            ),
            risk_factor: effort::risk_factor(score.tier, dependent_count, &self.config.tier_risk),
            tier: score.tier,
            justification: justification(
                business_impact,
                technical_complexity,
                dependency_urgency,
                completion,
                score.tier,
            ),
            dependencies: deps
                .graph
                .dependencies_of(name)
                .into_iter()
                .map(str::to_string)
                .collect(),
            blockers: deps.missing_for(name).map(|d| d.target.clone()).collect(),
        }
    }

    fn business_impact(&self, score: &ComponentCompletionScore, completion: f64) -> f64 {
        let category_weight = self
            .config
            .category_weights
            .get(&score.category)
            .copied()
            .unwrap_or(1.0);
        let tier_multiplier = self
            .config
            .tier_multipliers
            .get(&score.tier)
            .copied()
            .unwrap_or(1.0);
        let urgency = (100.0 - completion) / 100.0;

        (category_weight * 20.0 * tier_multiplier * (1.0 + urgency)).clamp(0.0, 100.0)
    }

    fn technical_complexity(
        &self,
        name: &str,
        status: Option<EvaluationStatus>,
        quality: Option<QualityLevel>,
    ) -> f64 {
        let lowered = name.to_lowercase();
        let keyword_complexity: f64 = self
            .config
            .complexity_keywords
            .iter()
            .filter(|(keyword, _)| !keyword.is_empty() && lowered.contains(keyword.as_str()))
            .map(|(_, weight)| weight * 10.0)
            .sum();

        let quality_adjustment = match quality {
            Some(QualityLevel::Poor) => 20.0,
            Some(QualityLevel::Excellent) => -10.0,
            _ => 0.0,
        };
        let status_adjustment = match status {
            Some(EvaluationStatus::Failed) => 15.0,
            Some(EvaluationStatus::Passed) => -5.0,
            _ => 0.0,
        };

        (BASE_COMPLEXITY + keyword_complexity + quality_adjustment + status_adjustment)
            .clamp(0.0, 100.0)
    }
}

#[allow(clippy::cast_precision_loss)]
fn dependency_urgency(name: &str, dependent_count: usize, deps: &DependencyAnalysisResult) -> f64 {
    let cycle = if deps.in_cycle(name) { CYCLE_URGENCY } else { 0.0 };
    let missing = deps.missing_for(name).count() as f64;

    (URGENCY_PER_DEPENDENT * dependent_count as f64 + cycle + URGENCY_PER_MISSING * missing)
        .clamp(0.0, 100.0)
}

/// Priority bucket for a score; critical-tier components reach each level sooner.
fn priority_level(score: f64, tier: CompletionTier) -> PriorityLevel {
    if tier == CompletionTier::Critical {
        return if score >= 70.0 {
            PriorityLevel::Critical
        } else if score >= 50.0 {
            PriorityLevel::High
        } else {
            PriorityLevel::Medium
        };
    }

    if score >= 80.0 {
        PriorityLevel::Critical
    } else if score >= 60.0 {
        PriorityLevel::High
    } else if score >= 40.0 {
        PriorityLevel::Medium
    } else {
        PriorityLevel::Low
    }
}

fn justification(
    business_impact: f64,
    technical_complexity: f64,
    dependency_urgency: f64,
    completion: f64,
    tier: CompletionTier,
) -> String {
    let mut reasons = Vec::new();

    if business_impact >= 80.0 {
        reasons.push("High business impact");
    } else if business_impact >= 60.0 {
        reasons.push("Moderate business impact");
    }
    if completion < 50.0 {
        reasons.push("Low completion percentage");
    }
    match tier {
        CompletionTier::Critical => reasons.push("Critical for system operation"),
        CompletionTier::Essential => reasons.push("Essential for production readiness"),
        _ => {}
    }
    if dependency_urgency >= 60.0 {
        reasons.push("High dependency urgency");
    }
    if technical_complexity >= 80.0 {
        reasons.push("High technical complexity");
    } else if technical_complexity <= 30.0 {
        reasons.push("Low technical complexity");
    }

    if reasons.is_empty() {
        "Standard priority assignment".to_string()
    } else {
        reasons.join("; ")
    }
}
