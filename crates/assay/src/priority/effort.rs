//! Effort, return-on-investment and risk estimates.

use super::EffortLevel;
use crate::domain::{CompletionTier, EvaluationStatus, QualityLevel};
use std::collections::BTreeMap;

/// Hours of work per remaining percentage point.
const HOURS_PER_POINT: f64 = 2.0;

/// No estimate is reported below this.
const MINIMUM_EFFORT_HOURS: u32 = 8;

/// Risk added per dependent component, and its ceiling.
const RISK_PER_DEPENDENT: f64 = 0.05;
const MAX_DEPENDENT_RISK: f64 = 0.3;

impl EffortLevel {
    /// Bucket for an estimate of `hours`.
    #[must_use]
    pub fn from_hours(hours: u32) -> Self {
        match hours {
            0..=16 => Self::Minimal,
            17..=40 => Self::Low,
            41..=80 => Self::Medium,
            81..=160 => Self::High,
            _ => Self::Extensive,
        }
    }
}

/// Estimate the remaining effort on a component.
///
/// The level is bucketed on the computed hours; the reported hours never go
/// below eight.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub(crate) fn estimate_effort(
    name: &str,
    completion: f64,
    quality: Option<QualityLevel>,
    status: Option<EvaluationStatus>,
    effort_keywords: &BTreeMap<String, f64>,
) -> (EffortLevel, u32) {
    let remaining = (100.0 - completion).clamp(0.0, 100.0);
    let base_hours = (remaining * HOURS_PER_POINT) as u32;

    let lowered = name.to_lowercase();
    let mut multiplier = effort_keywords
        .iter()
        .filter(|(keyword, _)| !keyword.is_empty() && lowered.contains(keyword.as_str()))
        .map(|(_, weight)| *weight)
        .reduce(f64::max)
        .unwrap_or(1.0);

    match quality {
        Some(QualityLevel::Poor) => multiplier *= 1.5,
        Some(QualityLevel::Excellent) => multiplier *= 0.8,
        _ => {}
    }
    if status == Some(EvaluationStatus::Failed) {
        multiplier *= 1.3;
    }

    let total_hours = (f64::from(base_hours) * multiplier) as u32;
    (
        EffortLevel::from_hours(total_hours),
        total_hours.max(MINIMUM_EFFORT_HOURS),
    )
}

/// Return on investment, 0-100.
///
/// Effort is normalised against `effort_cap_hours` before dividing.
pub(crate) fn roi_score(business_impact: f64, effort_hours: u32, effort_cap_hours: f64) -> f64 {
    if effort_hours == 0 {
        return 0.0;
    }
    let normalized_effort = (f64::from(effort_hours) / effort_cap_hours * 100.0).min(100.0);
    (business_impact / normalized_effort.max(1.0) * 10.0).clamp(0.0, 100.0)
}

/// Risk of leaving a component incomplete, 0-1.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn risk_factor(
    tier: CompletionTier,
    dependent_count: usize,
    tier_risk: &BTreeMap<CompletionTier, f64>,
) -> f64 {
    let base = tier_risk.get(&tier).copied().unwrap_or(0.5);
    let dependency_risk = (RISK_PER_DEPENDENT * dependent_count as f64).min(MAX_DEPENDENT_RISK);
    (base + dependency_risk).clamp(0.0, 1.0)
}
