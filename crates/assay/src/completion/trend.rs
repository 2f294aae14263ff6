//! Completion trends from historical samples.

use super::ComponentCompletionScore;
use crate::domain::{CompletionTier, clamp_percentage};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// One historical completion measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSample {
    /// When the measurement was taken
    pub timestamp: DateTime<Utc>,

    /// Completion percentage at that time
    pub completion: f64,
}

/// Historical samples keyed by component name.
pub type CompletionHistory = BTreeMap<String, Vec<CompletionSample>>;

/// Direction of a component's completion over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// Completion rose by more than the threshold
    Improving,

    /// Completion fell by more than the threshold
    Declining,

    /// Change within the threshold
    Stable,

    /// No history
    Unknown,
}

/// Completion trend of one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionTrend {
    /// Component name
    pub component: String,

    /// Completion now
    pub current_completion: f64,

    /// Most recent historical completion, or the current value without history
    pub previous_completion: f64,

    /// Direction of change
    pub direction: TrendDirection,

    /// Percentage points per day since the previous sample
    pub change_rate: f64,

    /// When the component reaches 100% at the current rate
    pub projected_completion_date: Option<DateTime<Utc>>,

    /// Lowest and highest completion observed
    pub confidence_interval: (f64, f64),

    /// Days covered by the history
    pub period_days: f64,
}

impl CompletionTrend {
    pub(crate) fn unknown(component: &str, current: f64) -> Self {
        Self {
            component: component.to_string(),
            current_completion: current,
            previous_completion: current,
            direction: TrendDirection::Unknown,
            change_rate: 0.0,
            projected_completion_date: None,
            confidence_interval: (current, current),
            period_days: 0.0,
        }
    }
}

/// Compute the trend of `component` from its samples, evaluated at `as_of`.
///
/// `threshold` is the smallest change, in percentage points, that counts as
/// movement. Samples later than `as_of` are ignored.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn analyze_trend(
    component: &str,
    current: f64,
    samples: &[CompletionSample],
    as_of: DateTime<Utc>,
    threshold: f64,
) -> CompletionTrend {
    let current = clamp_percentage(current);
    let past: Vec<&CompletionSample> = samples.iter().filter(|s| s.timestamp <= as_of).collect();

    let (Some(latest), Some(earliest)) = (
        past.iter().max_by_key(|s| s.timestamp),
        past.iter().min_by_key(|s| s.timestamp),
    ) else {
        return CompletionTrend::unknown(component, current);
    };

    let previous = clamp_percentage(latest.completion);
    let delta = current - previous;
    let elapsed_days = (as_of - latest.timestamp).num_seconds() as f64 / SECONDS_PER_DAY;
    let change_rate = if elapsed_days > 0.0 {
        delta / elapsed_days
    } else {
        0.0
    };

    let direction = if delta > threshold {
        TrendDirection::Improving
    } else if delta < -threshold {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    let projected_completion_date = if current >= 100.0 {
        Some(as_of)
    } else if change_rate > 0.0 {
        project(as_of, (100.0 - current) / change_rate)
    } else {
        None
    };

    let (low, high) = past
        .iter()
        .map(|s| clamp_percentage(s.completion))
        .fold((current, current), |(lo, hi), v| (lo.min(v), hi.max(v)));

    CompletionTrend {
        component: component.to_string(),
        current_completion: current,
        previous_completion: previous,
        direction,
        change_rate,
        projected_completion_date,
        confidence_interval: (low, high),
        period_days: ((as_of - earliest.timestamp).num_seconds() as f64 / SECONDS_PER_DAY)
            .max(0.0),
    }
}

/// `as_of` plus `days`, or `None` when the date is out of range.
#[allow(clippy::cast_possible_truncation)]
fn project(as_of: DateTime<Utc>, days: f64) -> Option<DateTime<Utc>> {
    let seconds = (days * SECONDS_PER_DAY).ceil();
    // i64::MAX seconds overflows chrono long before the cast would
    if !seconds.is_finite() || seconds < 0.0 || seconds > 1e15 {
        return None;
    }
    let offset = Duration::try_seconds(seconds as i64)?;
    as_of.checked_add_signed(offset)
}

/// Projected completion date per tier.
///
/// A tier's milestone is the latest projection among its incomplete
/// components. Tiers where some incomplete component has no projection, or
/// with nothing left to complete, get no milestone.
pub(crate) fn project_milestones(
    scores: &[ComponentCompletionScore],
    trends: &[CompletionTrend],
) -> BTreeMap<CompletionTier, DateTime<Utc>> {
    let projections: BTreeMap<&str, Option<DateTime<Utc>>> = trends
        .iter()
        .map(|t| (t.component.as_str(), t.projected_completion_date))
        .collect();

    let mut milestones = BTreeMap::new();
    for tier in CompletionTier::ALL {
        let incomplete: Vec<Option<DateTime<Utc>>> = scores
            .iter()
            .filter(|s| s.tier == tier && s.completion_percentage < 100.0)
            .map(|s| projections.get(s.component.as_str()).copied().flatten())
            .collect();

        if incomplete.is_empty() {
            continue;
        }
        let dates: Option<Vec<DateTime<Utc>>> = incomplete.into_iter().collect();
        if let Some(latest) = dates.and_then(|d| d.into_iter().max()) {
            milestones.insert(tier, latest);
        }
    }
    milestones
}
