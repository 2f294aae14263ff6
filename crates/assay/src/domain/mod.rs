//! Domain types for project assessment.
//!
//! This module contains the records handed to the assessment stages by
//! upstream collaborators (components, evaluations, quality assessments) and
//! the small enums shared by every stage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Functional area a component belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentCategory {
    /// Runtime platform: databases, storage, containers, observability
    Infrastructure,

    /// Revenue-generating features
    Monetization,

    /// Scripts, hooks and tooling that automate operations
    Automation,

    /// User and developer documentation
    Documentation,

    /// Test suites and test infrastructure
    Testing,

    /// Authentication, secrets, hardening
    Security,
}

impl ComponentCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Infrastructure,
        Self::Monetization,
        Self::Automation,
        Self::Documentation,
        Self::Testing,
        Self::Security,
    ];

    /// Lowercase identifier, as used in configuration and pattern matching.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Infrastructure => "infrastructure",
            Self::Monetization => "monetization",
            Self::Automation => "automation",
            Self::Documentation => "documentation",
            Self::Testing => "testing",
            Self::Security => "security",
        }
    }
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observed runtime status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    /// Running and healthy
    Operational,

    /// Running with reduced functionality
    Degraded,

    /// Not running
    Failed,

    /// No health information available
    #[default]
    Unknown,
}

/// A named, categorized unit of the project under assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Unique name within one run
    pub name: String,

    /// Functional category
    pub category: ComponentCategory,

    /// Location of the component in the project tree
    #[serde(default)]
    pub path: String,

    /// Names of components this one explicitly depends on
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Observed status
    #[serde(default)]
    pub status: ComponentStatus,

    /// Free-form configuration captured during discovery
    #[serde(default)]
    pub configuration: BTreeMap<String, serde_json::Value>,

    /// Human-readable description (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Declared version (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Component {
    /// Create a component with no path, dependencies or configuration.
    pub fn new(name: impl Into<String>, category: ComponentCategory) -> Self {
        Self {
            name: name.into(),
            category,
            path: String::new(),
            dependencies: Vec::new(),
            status: ComponentStatus::Unknown,
            configuration: BTreeMap::new(),
            description: None,
            version: None,
        }
    }

    /// Set the project path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the explicit dependency names.
    #[must_use]
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// Set the observed status.
    #[must_use]
    pub fn with_status(mut self, status: ComponentStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether `needle` matches this component by name, category or path.
    ///
    /// Name and path match on case-insensitive substring; the category
    /// matches only when it equals the needle exactly.
    #[must_use]
    pub fn matches_pattern(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        if needle.is_empty() {
            return false;
        }
        self.name.to_lowercase().contains(&needle)
            || self.category.as_str() == needle
            || self.path.to_lowercase().contains(&needle)
    }
}

/// Outcome of evaluating a component against its acceptance criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    /// All required criteria met
    Passed,

    /// Some optional criteria missing
    Warning,

    /// Required criteria missing
    Failed,

    /// Evaluation was not run
    NotEvaluated,
}

/// Externally produced evaluation of one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentEvaluation {
    /// The evaluated component
    pub component: Component,

    /// Fraction of satisfied acceptance criteria, 0-100
    pub completion_percentage: f64,

    /// Evaluation outcome
    pub status: EvaluationStatus,
}

impl ComponentEvaluation {
    /// Create an evaluation record.
    pub fn new(component: Component, completion_percentage: f64, status: EvaluationStatus) -> Self {
        Self {
            component,
            completion_percentage,
            status,
        }
    }

    /// Completion percentage forced into `[0, 100]`.
    #[must_use]
    pub fn completion(&self) -> f64 {
        clamp_percentage(self.completion_percentage)
    }
}

/// Coarse code, documentation and test grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    /// Well structured, documented and tested
    Excellent,

    /// Minor gaps
    Good,

    /// Noticeable gaps
    Fair,

    /// Major gaps
    Poor,
}

/// Externally produced quality grade for one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    /// Name of the assessed component
    pub component: String,

    /// Overall grade
    pub quality_level: QualityLevel,

    /// Documentation coverage score, 0-100
    #[serde(default)]
    pub documentation_score: f64,

    /// Test coverage percentage, 0-100
    #[serde(default)]
    pub test_coverage: f64,
}

impl QualityAssessment {
    /// Create a quality record with zero documentation and coverage scores.
    pub fn new(component: impl Into<String>, quality_level: QualityLevel) -> Self {
        Self {
            component: component.into(),
            quality_level,
            documentation_score: 0.0,
            test_coverage: 0.0,
        }
    }
}

/// Coarse importance class of a component.
///
/// Ordered from most to least important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionTier {
    /// Must be complete for the system to operate
    Critical,

    /// Must be nearly complete for production
    Essential,

    /// Should be mostly complete for full functionality
    Important,

    /// Nice to have
    Optional,
}

impl CompletionTier {
    /// Every tier, most important first.
    pub const ALL: [Self; 4] = [
        Self::Critical,
        Self::Essential,
        Self::Important,
        Self::Optional,
    ];
}

impl fmt::Display for CompletionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Critical => "critical",
            Self::Essential => "essential",
            Self::Important => "important",
            Self::Optional => "optional",
        };
        f.write_str(s)
    }
}

/// Whether a dependency is a hard requirement or a soft one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// The source cannot function without the target
    Required,

    /// The source loses functionality without the target
    Optional,
}

/// Whether a dependency is currently met
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyStatus {
    /// Target exists and is operational
    Satisfied,

    /// Target exists but is degraded
    Degraded,

    /// Target is absent or not running
    Missing,
}

impl DependencyStatus {
    /// Status of an edge given the status of its target component.
    #[must_use]
    pub fn from_target(target: ComponentStatus) -> Self {
        match target {
            ComponentStatus::Operational => Self::Satisfied,
            ComponentStatus::Degraded => Self::Degraded,
            ComponentStatus::Failed | ComponentStatus::Unknown => Self::Missing,
        }
    }
}

/// Directed relation: `source` requires (or benefits from) `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// Component that has the dependency
    pub source: String,

    /// Component (or unresolved pattern) depended upon
    pub target: String,

    /// Required or optional
    pub kind: DependencyKind,

    /// Whether the dependency is met
    pub status: DependencyStatus,

    /// Why the dependency exists
    pub description: String,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// Force a percentage into `[0, 100]`; NaN becomes 0.
#[must_use]
pub fn clamp_percentage(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Arithmetic mean, 0 for an empty slice.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
