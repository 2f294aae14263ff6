//! Dependency analysis.
//!
//! [`DependencyAnalyzer::analyze`] builds the component graph from explicit
//! and inferred dependencies, then reports cycles, unresolved targets and
//! layering problems together with a health score for every component.

mod cycles;
mod graph;
mod report;

pub use graph::DependencyGraph;
pub use report::{ConnectedComponent, DependencyReport};

use crate::config::DependencyConfig;
use crate::domain::{Component, ComponentCategory, Dependency, DependencyKind, mean};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// A pair of components whose dependencies cannot both be satisfied.
///
/// Nothing in the analyzer produces conflicts today; the type exists so the
/// scoring math and downstream consumers already account for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyConflict {
    /// First component of the pair
    pub first: String,

    /// Second component of the pair
    pub second: String,
}

impl DependencyConflict {
    /// Whether `name` is one side of this conflict.
    #[must_use]
    pub fn involves(&self, name: &str) -> bool {
        self.first == name || self.second == name
    }
}

/// A dependency pointing from a lower layer to a higher one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerViolation {
    /// Depending component
    pub source: String,

    /// Component depended upon
    pub target: String,

    /// Category of the depending component
    pub source_category: ComponentCategory,

    /// Category of the component depended upon
    pub target_category: ComponentCategory,
}

/// Output of [`DependencyAnalyzer::analyze`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct DependencyAnalysisResult {
    /// The component graph
    pub graph: DependencyGraph,

    /// Detected cycles, each closed by its entry node
    pub circular_dependencies: Vec<Vec<String>>,

    /// Every component lying on some cycle
    pub cycle_members: BTreeSet<String>,

    /// Dependencies whose target matched no component
    pub missing_dependencies: Vec<Dependency>,

    /// Reserved; normally empty
    pub conflicting_dependencies: Vec<DependencyConflict>,

    /// Infrastructure components depending on higher layers
    pub layer_violations: Vec<LayerViolation>,

    /// Dependency health per component, 0-1
    pub dependency_scores: BTreeMap<String, f64>,

    /// Overall dependency health, 0-1
    pub overall_dependency_health: f64,
}

impl DependencyAnalysisResult {
    /// Dependency health of `name`, if it was analyzed.
    #[must_use]
    pub fn score(&self, name: &str) -> Option<f64> {
        self.dependency_scores.get(name).copied()
    }

    /// Whether `name` is a member of any detected cycle.
    #[must_use]
    pub fn in_cycle(&self, name: &str) -> bool {
        self.cycle_members.contains(name)
    }

    /// Missing dependencies declared by `name`.
    pub fn missing_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Dependency> + 'a {
        self.missing_dependencies
            .iter()
            .filter(move |dep| dep.source == name)
    }
}

/// Builds and scores the dependency graph of a set of components.
#[derive(Debug, Clone, Default)]
pub struct DependencyAnalyzer {
    config: DependencyConfig,
}

impl DependencyAnalyzer {
    /// Create an analyzer using the given classifier, rule and penalty tables.
    #[must_use]
    pub fn new(config: DependencyConfig) -> Self {
        Self { config }
    }

    /// The tables this analyzer was built with.
    #[must_use]
    pub fn config(&self) -> &DependencyConfig {
        &self.config
    }

    /// Analyze the dependencies of `components`.
    ///
    /// Never fails: blank or duplicate names are skipped, unresolved targets
    /// are recorded as missing and cycles are reported as data. An empty
    /// input yields an all-zero result.
    #[must_use]
    pub fn analyze(&self, components: &[Component]) -> DependencyAnalysisResult {
        debug!(components = components.len(), "Analyzing dependencies");

        let (graph, missing_dependencies) = graph::build_graph(components, &self.config);
        let circular_dependencies = cycles::find_cycles(graph.inner());
        let cycle_members = cycles::cycle_members(graph.inner());
        let conflicting_dependencies: Vec<DependencyConflict> = Vec::new();

        let layer_violations: Vec<LayerViolation> = graph
            .dependencies()
            .iter()
            .filter_map(|dep| {
                let source = graph.component(&dep.source)?;
                let target = graph.component(&dep.target)?;
                is_layer_violation(source, target).then(|| LayerViolation {
                    source: source.name.clone(),
                    target: target.name.clone(),
                    source_category: source.category,
                    target_category: target.category,
                })
            })
            .collect();

        let dependency_scores: BTreeMap<String, f64> = graph
            .components()
            .keys()
            .map(|name| {
                let score = self.component_score(
                    name,
                    &missing_dependencies,
                    &conflicting_dependencies,
                );
                (name.clone(), score)
            })
            .collect();

        let overall_dependency_health = self.overall_health(
            &dependency_scores,
            circular_dependencies.len(),
            missing_dependencies.len(),
            conflicting_dependencies.len(),
        );

        info!(
            components = graph.len(),
            dependencies = graph.dependencies().len(),
            cycles = circular_dependencies.len(),
            missing = missing_dependencies.len(),
            layer_violations = layer_violations.len(),
            health = overall_dependency_health,
            "Dependency analysis complete"
        );

        DependencyAnalysisResult {
            graph,
            circular_dependencies,
            cycle_members,
            missing_dependencies,
            conflicting_dependencies,
            layer_violations,
            dependency_scores,
            overall_dependency_health,
        }
    }

    /// Remediation advice for every issue family found in `result`.
    #[must_use]
    pub fn recommendations(&self, result: &DependencyAnalysisResult) -> Vec<String> {
        report::recommendations(result)
    }

    /// Flat summary of `result` for downstream consumers.
    #[must_use]
    pub fn report(&self, result: &DependencyAnalysisResult) -> DependencyReport {
        report::build_report(result)
    }

    #[allow(clippy::cast_precision_loss)]
    fn component_score(
        &self,
        name: &str,
        missing: &[Dependency],
        conflicts: &[DependencyConflict],
    ) -> f64 {
        let missing_required = missing
            .iter()
            .filter(|dep| dep.source == name && dep.kind == DependencyKind::Required)
            .count() as f64;
        let conflict_count = conflicts.iter().filter(|c| c.involves(name)).count() as f64;

        (1.0 - self.config.missing_required_penalty * missing_required
            - self.config.conflict_penalty * conflict_count)
            .clamp(0.0, 1.0)
    }

    #[allow(clippy::cast_precision_loss)]
    fn overall_health(
        &self,
        scores: &BTreeMap<String, f64>,
        cycles: usize,
        missing: usize,
        conflicts: usize,
    ) -> f64 {
        if scores.is_empty() {
            return 0.0;
        }
        let values: Vec<f64> = scores.values().copied().collect();

        (mean(&values)
            - self.config.cycle_health_penalty * cycles as f64
            - self.config.missing_health_penalty * missing as f64
            - self.config.conflict_health_penalty * conflicts as f64)
            .clamp(0.0, 1.0)
    }
}

/// Whether `source` depending on `target` breaks the layering policy.
///
/// Infrastructure sits below everything else and must not depend on
/// monetization or automation components.
#[must_use]
pub fn is_layer_violation(source: &Component, target: &Component) -> bool {
    source.category == ComponentCategory::Infrastructure
        && matches!(
            target.category,
            ComponentCategory::Monetization | ComponentCategory::Automation
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DependencyStatus;
    use rstest::rstest;

    fn component(name: &str, category: ComponentCategory, deps: &[&str]) -> Component {
        Component::new(name, category).with_dependencies(deps.iter().copied())
    }

    #[test]
    fn test_empty_input_yields_zero_result() {
        let result = DependencyAnalyzer::default().analyze(&[]);

        assert!(result.graph.is_empty());
        assert!(result.graph.dependencies().is_empty());
        assert!(result.circular_dependencies.is_empty());
        assert!(result.missing_dependencies.is_empty());
        assert!(result.overall_dependency_health.abs() < f64::EPSILON);
    }

    #[test]
    fn test_unrelated_component_scores_one() {
        let result = DependencyAnalyzer::default()
            .analyze(&[component("alpha", ComponentCategory::Automation, &[])]);

        assert_eq!(result.score("alpha"), Some(1.0));
        assert!((result.overall_dependency_health - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_required_dependency_penalised() {
        let result = DependencyAnalyzer::default().analyze(&[component(
            "alpha",
            ComponentCategory::Automation,
            &["ghost_one", "ghost_two"],
        )]);

        let score = result.score("alpha").unwrap_or_default();
        assert!((score - 0.4).abs() < 1e-9);
        // mean 0.4 minus 2 x 0.05 for the missing entries
        assert!((result.overall_dependency_health - 0.3).abs() < 1e-9);
        assert_eq!(result.missing_for("alpha").count(), 2);
        assert!(
            result
                .missing_dependencies
                .iter()
                .all(|d| d.status == DependencyStatus::Missing)
        );
    }

    #[test]
    fn test_missing_optional_dependency_not_penalised_per_component() {
        let result = DependencyAnalyzer::default().analyze(&[component(
            "kiro_agent_hooks",
            ComponentCategory::Automation,
            &[],
        )]);

        // agent hooks only carry an optional rule towards vscode
        assert_eq!(result.missing_dependencies.len(), 1);
        assert_eq!(result.missing_dependencies[0].kind, DependencyKind::Optional);
        assert_eq!(result.score("kiro_agent_hooks"), Some(1.0));
    }

    #[test]
    fn test_cycle_members_reported() {
        let result = DependencyAnalyzer::default().analyze(&[
            component("a", ComponentCategory::Automation, &["b"]),
            component("b", ComponentCategory::Automation, &["a"]),
        ]);

        assert_eq!(result.circular_dependencies.len(), 1);
        assert!(result.in_cycle("a"));
        assert!(result.in_cycle("b"));
        assert!((result.overall_dependency_health - 0.9).abs() < 1e-9);
    }

    #[rstest]
    #[case::infra_on_monetization(ComponentCategory::Infrastructure, ComponentCategory::Monetization, true)]
    #[case::infra_on_automation(ComponentCategory::Infrastructure, ComponentCategory::Automation, true)]
    #[case::infra_on_security(ComponentCategory::Infrastructure, ComponentCategory::Security, false)]
    #[case::monetization_on_infra(ComponentCategory::Monetization, ComponentCategory::Infrastructure, false)]
    fn test_is_layer_violation(
        #[case] source: ComponentCategory,
        #[case] target: ComponentCategory,
        #[case] expected: bool,
    ) {
        let source = Component::new("s", source);
        let target = Component::new("t", target);
        assert_eq!(is_layer_violation(&source, &target), expected);
    }

    #[test]
    fn test_layer_violations_collected_separately() {
        let result = DependencyAnalyzer::default().analyze(&[
            component("cache", ComponentCategory::Infrastructure, &["billing"]),
            component("billing", ComponentCategory::Monetization, &[]),
        ]);

        assert_eq!(result.layer_violations.len(), 1);
        assert_eq!(result.layer_violations[0].source, "cache");
        assert!(result.conflicting_dependencies.is_empty());
        assert_eq!(result.score("cache"), Some(1.0));
    }
}
