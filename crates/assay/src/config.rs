//! Weighting tables for the assessment stages.
//!
//! Every constant the stages depend on (classification keywords, inference
//! rules, penalties, category weights, tier tables, keyword weights) lives in
//! [`AssessmentConfig`] and is handed to each stage at construction time. The
//! `Default` implementation reproduces the stock tables; a YAML file can
//! override any section.

use crate::domain::{ComponentCategory, CompletionTier, DependencyKind, QualityLevel};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "assay.yaml";

/// Configuration for a full assessment run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentConfig {
    /// Dependency analysis tables
    pub dependency: DependencyConfig,

    /// Completion scoring tables
    pub completion: CompletionConfig,

    /// Priority ranking tables
    pub priority: PriorityConfig,
}

impl AssessmentConfig {
    /// Parse a YAML document and validate it.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {}", e)))
    }

    /// Load configuration from a file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Self::from_yaml_str(&content)
    }

    /// Save configuration to a file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_yaml_string()?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Reject weights that would push scores outside their bounds.
    ///
    /// All weights, penalties and multipliers must be finite and
    /// non-negative. Classifier and rule patterns must be non-empty.
    pub fn validate(&self) -> Result<()> {
        let dep = &self.dependency;
        for classifier in &dep.classifiers {
            if classifier.component_type.trim().is_empty() {
                return Err(Error::Config(
                    "Classifier component_type must not be empty".to_string(),
                ));
            }
            if classifier.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(Error::Config(format!(
                    "Classifier '{}' has an empty keyword",
                    classifier.component_type
                )));
            }
        }
        for (component_type, rules) in &dep.rules {
            if rules.iter().any(|r| r.target_pattern.trim().is_empty()) {
                return Err(Error::Config(format!(
                    "Rule set '{}' has an empty target_pattern",
                    component_type
                )));
            }
        }
        check_weights(
            "dependency penalties",
            [
                dep.missing_required_penalty,
                dep.conflict_penalty,
                dep.cycle_health_penalty,
                dep.missing_health_penalty,
                dep.conflict_health_penalty,
            ],
        )?;

        let completion = &self.completion;
        check_weights("completion.category_weights", completion.category_weights.values().copied())?;
        check_weights("completion.quality_factors", completion.quality_factors.values().copied())?;
        check_weights("completion.tier_multipliers", completion.tier_multipliers.values().copied())?;
        check_weights(
            "completion factors",
            [completion.missing_quality_factor, completion.trend_threshold],
        )?;

        let priority = &self.priority;
        check_weights("priority.category_weights", priority.category_weights.values().copied())?;
        check_weights("priority.tier_multipliers", priority.tier_multipliers.values().copied())?;
        check_weights("priority.tier_risk", priority.tier_risk.values().copied())?;
        check_weights("priority.complexity_keywords", priority.complexity_keywords.values().copied())?;
        check_weights("priority.effort_keywords", priority.effort_keywords.values().copied())?;
        let weights = &priority.weights;
        check_weights(
            "priority.weights",
            [
                weights.business_impact,
                weights.dependency_urgency,
                weights.technical_complexity,
                weights.completion_gap,
            ],
        )?;
        if !(priority.effort_cap_hours.is_finite() && priority.effort_cap_hours > 0.0) {
            return Err(Error::Config(
                "priority.effort_cap_hours must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_weights(section: &str, values: impl IntoIterator<Item = f64>) -> Result<()> {
    if values.into_iter().all(|v| v.is_finite() && v >= 0.0) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{} must contain only finite, non-negative numbers",
            section
        )))
    }
}

// ============================================================================
// Dependency analysis
// ============================================================================

/// Maps a component to a component type by keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeClassifier {
    /// Type assigned when the classifier matches (e.g. "database")
    pub component_type: String,

    /// Any one of these must match the component's name, category or path
    pub keywords: Vec<String>,

    /// All of these must also match
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
}

impl TypeClassifier {
    fn new(component_type: &str, keywords: &[&str]) -> Self {
        Self {
            component_type: component_type.to_string(),
            keywords: keywords.iter().map(ToString::to_string).collect(),
            requires: Vec::new(),
        }
    }

    fn requiring(mut self, requires: &[&str]) -> Self {
        self.requires = requires.iter().map(ToString::to_string).collect();
        self
    }
}

/// An inferred dependency for every component of a given type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRule {
    /// Matched against other components' name, category and path
    pub target_pattern: String,

    /// Required or optional
    pub kind: DependencyKind,

    /// Why components of this type need the target
    pub description: String,
}

impl DependencyRule {
    fn new(target_pattern: &str, kind: DependencyKind, description: &str) -> Self {
        Self {
            target_pattern: target_pattern.to_string(),
            kind,
            description: description.to_string(),
        }
    }
}

/// Tables used by [`crate::dependency::DependencyAnalyzer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyConfig {
    /// Ordered classifiers; the first match wins
    pub classifiers: Vec<TypeClassifier>,

    /// Inference rules by component type
    pub rules: BTreeMap<String, Vec<DependencyRule>>,

    /// Score deducted per missing required outgoing dependency
    pub missing_required_penalty: f64,

    /// Score deducted per conflict involving the component
    pub conflict_penalty: f64,

    /// Health deducted per detected cycle
    pub cycle_health_penalty: f64,

    /// Health deducted per missing dependency entry
    pub missing_health_penalty: f64,

    /// Health deducted per conflicting pair
    pub conflict_health_penalty: f64,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        use DependencyKind::{Optional, Required};

        let classifiers = vec![
            TypeClassifier::new("nca_toolkit", &["nca", "toolkit"]),
            TypeClassifier::new("podman_stack", &["podman", "container"]),
            TypeClassifier::new("database", &["database", "postgres"]),
            TypeClassifier::new("minio_storage", &["minio", "s3"]),
            TypeClassifier::new("prometheus", &["prometheus"]),
            TypeClassifier::new("grafana", &["grafana"]),
            TypeClassifier::new("affiliate_marketing", &["affiliate"]),
            TypeClassifier::new("grant_tracking", &["grant"]),
            TypeClassifier::new("revenue_streams", &["revenue"]),
            TypeClassifier::new("vscode_integration", &["vscode", "vs code"]),
            TypeClassifier::new("deployment_scripts", &["deployment"]).requiring(&["script"]),
            TypeClassifier::new("agent_hooks", &["hook", "kiro"]),
        ];

        let mut rules = BTreeMap::new();
        rules.insert(
            "nca_toolkit".to_string(),
            vec![
                DependencyRule::new(
                    "database",
                    Required,
                    "Toolkit requires a database for storing processing results",
                ),
                DependencyRule::new(
                    "minio",
                    Required,
                    "Toolkit requires S3 storage for multimedia files",
                ),
            ],
        );
        rules.insert(
            "grafana".to_string(),
            vec![DependencyRule::new(
                "prometheus",
                Required,
                "Grafana requires Prometheus as data source",
            )],
        );
        rules.insert(
            "affiliate_marketing".to_string(),
            vec![
                DependencyRule::new(
                    "database",
                    Required,
                    "Affiliate marketing requires a database for tracking",
                ),
                DependencyRule::new(
                    "nca_toolkit",
                    Optional,
                    "Affiliate marketing may integrate with toolkit APIs",
                ),
            ],
        );
        rules.insert(
            "revenue_streams".to_string(),
            vec![
                DependencyRule::new(
                    "database",
                    Required,
                    "Revenue tracking requires a database for metrics storage",
                ),
                DependencyRule::new(
                    "affiliate_marketing",
                    Optional,
                    "Revenue streams may include affiliate marketing data",
                ),
            ],
        );
        rules.insert(
            "deployment_scripts".to_string(),
            vec![DependencyRule::new(
                "podman",
                Required,
                "Deployment scripts require container orchestration",
            )],
        );
        rules.insert(
            "agent_hooks".to_string(),
            vec![DependencyRule::new(
                "vscode",
                Optional,
                "Agent hooks integrate with VS Code for automation",
            )],
        );

        Self {
            classifiers,
            rules,
            missing_required_penalty: 0.3,
            conflict_penalty: 0.2,
            cycle_health_penalty: 0.1,
            missing_health_penalty: 0.05,
            conflict_health_penalty: 0.1,
        }
    }
}

// ============================================================================
// Completion scoring
// ============================================================================

/// Forces a tier onto components whose name contains `marker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierOverride {
    /// Case-insensitive name substring
    pub marker: String,

    /// Tier assigned on match
    pub tier: CompletionTier,
}

/// Tables used by [`crate::completion::CompletionCalculator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Business weight per category (1.0 when absent)
    pub category_weights: BTreeMap<ComponentCategory, f64>,

    /// Ordered overrides checked before the category default
    pub tier_overrides: Vec<TierOverride>,

    /// Default tier per category
    pub category_tiers: BTreeMap<ComponentCategory, CompletionTier>,

    /// Tier for categories missing from `category_tiers`
    pub default_tier: CompletionTier,

    /// Adjustment factor per quality grade
    pub quality_factors: BTreeMap<QualityLevel, f64>,

    /// Factor used when no quality assessment exists
    pub missing_quality_factor: f64,

    /// Weight multiplier per tier (1.0 when absent)
    pub tier_multipliers: BTreeMap<CompletionTier, f64>,

    /// Completion at or above which a component counts as complete
    pub completed_threshold: f64,

    /// Change in points beyond which a trend is improving or declining
    pub trend_threshold: f64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        use ComponentCategory::{
            Automation, Documentation, Infrastructure, Monetization, Security, Testing,
        };
        use CompletionTier::{Critical, Essential, Important, Optional};

        let tier_overrides = [
            ("nca", Critical),
            ("database", Critical),
            ("revenue", Critical),
            ("affiliate", Critical),
            ("podman", Essential),
            ("minio", Essential),
            ("deployment", Essential),
            ("monitoring", Essential),
        ]
        .into_iter()
        .map(|(marker, tier)| TierOverride {
            marker: marker.to_string(),
            tier,
        })
        .collect();

        Self {
            category_weights: BTreeMap::from([
                (Monetization, 2.0),
                (Infrastructure, 1.5),
                (Security, 1.3),
                (Automation, 1.0),
                (Testing, 0.8),
                (Documentation, 0.5),
            ]),
            tier_overrides,
            category_tiers: BTreeMap::from([(Monetization, Essential)]),
            default_tier: Important,
            quality_factors: BTreeMap::from([
                (QualityLevel::Excellent, 1.0),
                (QualityLevel::Good, 0.9),
                (QualityLevel::Fair, 0.7),
                (QualityLevel::Poor, 0.5),
            ]),
            missing_quality_factor: 0.8,
            tier_multipliers: default_tier_multipliers(),
            completed_threshold: 90.0,
            trend_threshold: 1.0,
        }
    }
}

fn default_tier_multipliers() -> BTreeMap<CompletionTier, f64> {
    BTreeMap::from([
        (CompletionTier::Critical, 2.0),
        (CompletionTier::Essential, 1.5),
        (CompletionTier::Important, 1.0),
        (CompletionTier::Optional, 0.5),
    ])
}

// ============================================================================
// Priority ranking
// ============================================================================

/// Blend of the four priority signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityWeights {
    /// Weight of the business impact score
    pub business_impact: f64,

    /// Weight of the dependency urgency score
    pub dependency_urgency: f64,

    /// Weight of the inverted technical complexity score
    pub technical_complexity: f64,

    /// Weight of the remaining completion gap
    pub completion_gap: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            business_impact: 0.4,
            dependency_urgency: 0.3,
            technical_complexity: 0.2,
            completion_gap: 0.1,
        }
    }
}

/// Tables used by [`crate::priority::PriorityRanker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityConfig {
    /// Business impact weight per category, scaled by 20 (1.0 when absent)
    pub category_weights: BTreeMap<ComponentCategory, f64>,

    /// Impact multiplier per tier (1.0 when absent)
    pub tier_multipliers: BTreeMap<CompletionTier, f64>,

    /// Base risk per tier (0.5 when absent)
    pub tier_risk: BTreeMap<CompletionTier, f64>,

    /// Complexity weight per name keyword, scaled by 10
    pub complexity_keywords: BTreeMap<String, f64>,

    /// Effort multiplier per name keyword
    pub effort_keywords: BTreeMap<String, f64>,

    /// Blend of the priority signals
    pub weights: PriorityWeights,

    /// Effort that maps to a fully normalised effort of 100
    pub effort_cap_hours: f64,

    /// Maximum critical path length
    pub critical_path_limit: usize,

    /// Maximum number of quick wins
    pub quick_win_limit: usize,

    /// Maximum number of high-impact items
    pub high_impact_limit: usize,

    /// Minimum ROI for a quick win
    pub quick_win_roi: f64,

    /// Minimum business impact for a high-impact item
    pub high_impact_threshold: f64,

    /// Dependency urgency that puts a component on the critical path
    pub urgent_dependency_threshold: f64,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        use ComponentCategory::{
            Automation, Documentation, Infrastructure, Monetization, Security, Testing,
        };

        let keywords = |pairs: &[(&str, f64)]| -> BTreeMap<String, f64> {
            pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
        };

        Self {
            category_weights: BTreeMap::from([
                (Monetization, 5.0),
                (Infrastructure, 4.0),
                (Security, 3.5),
                (Automation, 3.0),
                (Testing, 2.5),
                (Documentation, 2.0),
            ]),
            tier_multipliers: default_tier_multipliers(),
            tier_risk: BTreeMap::from([
                (CompletionTier::Critical, 0.9),
                (CompletionTier::Essential, 0.7),
                (CompletionTier::Important, 0.5),
                (CompletionTier::Optional, 0.2),
            ]),
            complexity_keywords: keywords(&[
                ("api", 2.0),
                ("database", 2.5),
                ("integration", 2.2),
                ("security", 2.3),
                ("authentication", 2.4),
                ("payment", 2.6),
                ("monitoring", 1.8),
                ("configuration", 1.2),
                ("documentation", 0.8),
                ("testing", 1.5),
            ]),
            effort_keywords: keywords(&[
                ("api", 1.5),
                ("database", 1.8),
                ("integration", 1.6),
                ("security", 1.7),
                ("authentication", 1.9),
                ("payment", 2.0),
                ("monitoring", 1.3),
                ("configuration", 1.0),
                ("documentation", 0.7),
                ("testing", 1.2),
            ]),
            weights: PriorityWeights::default(),
            effort_cap_hours: 320.0,
            critical_path_limit: 10,
            quick_win_limit: 5,
            high_impact_limit: 10,
            quick_win_roi: 60.0,
            high_impact_threshold: 70.0,
            urgent_dependency_threshold: 60.0,
        }
    }
}
