//! Shortlists, groupings and the flat priority summary.
//!
//! Every function here expects scores already sorted by descending priority;
//! shortlists keep that order among equal keys.

use super::{EffortLevel, PriorityLevel, PriorityRankingResult, PriorityScore};
use crate::config::PriorityConfig;
use crate::domain::CompletionTier;
use serde::Serialize;
use std::collections::BTreeMap;

/// Risk at or above this is called out.
const HIGH_RISK_THRESHOLD: f64 = 0.8;

/// Critical path entries named in the recommendations.
const NAMED_CRITICAL_PATH: usize = 3;

/// Entries in [`PrioritySummary::top_priorities`].
const TOP_PRIORITIES: usize = 5;

/// Hours in a working week.
const HOURS_PER_WEEK: f64 = 40.0;

/// One row of [`PrioritySummary::top_priorities`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPriority {
    /// Component name
    pub component: String,

    /// Priority bucket
    pub priority_level: PriorityLevel,

    /// Combined priority, 0-100
    pub priority_score: f64,

    /// Effort bucket
    pub effort_estimate: EffortLevel,

    /// Return on investment, 0-100
    pub roi_score: f64,

    /// Reasons behind the priority
    pub justification: String,
}

/// Flat digest of a [`PriorityRankingResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrioritySummary {
    /// Ranked components
    pub total_components: usize,

    /// Components per priority level
    pub level_counts: BTreeMap<PriorityLevel, usize>,

    /// Sum of estimated hours
    pub total_estimated_effort_hours: u64,

    /// Sum of estimated hours in 40-hour weeks
    pub total_estimated_effort_weeks: f64,

    /// Quick win count
    pub quick_wins_count: usize,

    /// High impact item count
    pub high_impact_count: usize,

    /// Critical path length
    pub critical_path_length: usize,

    /// Component count per effort level
    pub effort_distribution: BTreeMap<EffortLevel, usize>,

    /// The five highest priorities
    pub top_priorities: Vec<TopPriority>,

    /// Advice derived from the shortlists
    pub recommendations: Vec<String>,
}

pub(super) fn priority_matrix(scores: &[PriorityScore]) -> BTreeMap<PriorityLevel, Vec<String>> {
    let mut matrix: BTreeMap<PriorityLevel, Vec<String>> =
        PriorityLevel::ALL.iter().map(|l| (*l, Vec::new())).collect();
    for score in scores {
        matrix
            .entry(score.priority_level)
            .or_default()
            .push(score.component.clone());
    }
    matrix
}

pub(super) fn effort_distribution(scores: &[PriorityScore]) -> BTreeMap<EffortLevel, usize> {
    let mut distribution: BTreeMap<EffortLevel, usize> =
        EffortLevel::ALL.iter().map(|l| (*l, 0)).collect();
    for score in scores {
        *distribution.entry(score.effort_estimate).or_default() += 1;
    }
    distribution
}

/// Critical-tier components plus anything with urgent dependencies.
pub(super) fn critical_path(scores: &[PriorityScore], config: &PriorityConfig) -> Vec<String> {
    scores
        .iter()
        .filter(|s| {
            s.tier == CompletionTier::Critical
                || s.dependency_urgency_score >= config.urgent_dependency_threshold
        })
        .take(config.critical_path_limit)
        .map(|s| s.component.clone())
        .collect()
}

/// High return for little effort, best return first.
pub(super) fn quick_wins(scores: &[PriorityScore], config: &PriorityConfig) -> Vec<String> {
    let mut wins: Vec<&PriorityScore> = scores
        .iter()
        .filter(|s| {
            s.roi_score >= config.quick_win_roi
                && matches!(s.effort_estimate, EffortLevel::Minimal | EffortLevel::Low)
        })
        .collect();
    wins.sort_by(|a, b| b.roi_score.total_cmp(&a.roi_score));
    wins.into_iter()
        .take(config.quick_win_limit)
        .map(|s| s.component.clone())
        .collect()
}

/// Highest business impact first, regardless of effort.
pub(super) fn high_impact_items(scores: &[PriorityScore], config: &PriorityConfig) -> Vec<String> {
    let mut items: Vec<&PriorityScore> = scores
        .iter()
        .filter(|s| s.business_impact_score >= config.high_impact_threshold)
        .collect();
    items.sort_by(|a, b| b.business_impact_score.total_cmp(&a.business_impact_score));
    items
        .into_iter()
        .take(config.high_impact_limit)
        .map(|s| s.component.clone())
        .collect()
}

pub(super) fn recommendations(
    scores: &[PriorityScore],
    critical_path: &[String],
    quick_wins: &[String],
) -> Vec<String> {
    let mut recs = Vec::new();

    let critical = scores
        .iter()
        .filter(|s| s.priority_level == PriorityLevel::Critical)
        .count();
    if critical > 0 {
        recs.push(format!(
            "Address {critical} critical priority items immediately"
        ));
    }

    if !quick_wins.is_empty() {
        recs.push(format!(
            "Start with {} quick wins for immediate ROI",
            quick_wins.len()
        ));
    }

    if !critical_path.is_empty() {
        let named: Vec<&str> = critical_path
            .iter()
            .take(NAMED_CRITICAL_PATH)
            .map(String::as_str)
            .collect();
        recs.push(format!("Focus on critical path: {}", named.join(", ")));
    }

    let extensive = scores
        .iter()
        .filter(|s| s.effort_estimate == EffortLevel::Extensive)
        .count();
    if extensive > 0 {
        recs.push(format!(
            "Plan carefully for {extensive} extensive effort items"
        ));
    }

    let high_risk = scores
        .iter()
        .filter(|s| s.risk_factor >= HIGH_RISK_THRESHOLD)
        .count();
    if high_risk > 0 {
        recs.push(format!(
            "Mitigate risks for {high_risk} high-risk components"
        ));
    }

    recs
}

#[allow(clippy::cast_precision_loss)]
pub(super) fn summarize(result: &PriorityRankingResult) -> PrioritySummary {
    PrioritySummary {
        total_components: result.priority_scores.len(),
        level_counts: result
            .priority_matrix
            .iter()
            .map(|(level, names)| (*level, names.len()))
            .collect(),
        total_estimated_effort_hours: result.total_estimated_effort,
        total_estimated_effort_weeks: result.total_estimated_effort as f64 / HOURS_PER_WEEK,
        quick_wins_count: result.quick_wins.len(),
        high_impact_count: result.high_impact_items.len(),
        critical_path_length: result.critical_path.len(),
        effort_distribution: result.effort_distribution.clone(),
        top_priorities: result
            .priority_scores
            .iter()
            .take(TOP_PRIORITIES)
            .map(|s| TopPriority {
                component: s.component.clone(),
                priority_level: s.priority_level,
                priority_score: s.priority_score,
                effort_estimate: s.effort_estimate,
                roi_score: s.roi_score,
                justification: s.justification.clone(),
            })
            .collect(),
        recommendations: result.recommendations.clone(),
    }
}
