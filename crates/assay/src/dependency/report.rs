//! Flat dependency report and remediation advice.

use super::DependencyAnalysisResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// How many missing dependencies are spelled out individually.
const MAX_LISTED_MISSING: usize = 5;

/// How many components are listed as most connected.
const MOST_CONNECTED_LIMIT: usize = 5;

/// Components scoring below this are called out.
const LOW_SCORE_THRESHOLD: f64 = 0.7;

/// A component and its number of incoming plus outgoing edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectedComponent {
    /// Component name
    pub name: String,

    /// Edges touching the component
    pub connections: usize,
}

/// Summary of a dependency analysis for report renderers.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyReport {
    /// Components in the graph
    pub total_components: usize,

    /// Resolved dependencies
    pub total_dependencies: usize,

    /// Resolved dependencies per component, rounded to two decimals
    pub average_dependencies_per_component: f64,

    /// Detected cycles
    pub circular_dependencies_count: usize,

    /// Unresolved dependencies
    pub missing_dependencies_count: usize,

    /// Conflicting pairs
    pub conflicts_count: usize,

    /// Layering violations
    pub layer_violations_count: usize,

    /// Components without any edge
    pub orphaned_components_count: usize,

    /// Overall dependency health, 0-1
    pub overall_dependency_health: f64,

    /// Dependency health per component
    pub dependency_scores: BTreeMap<String, f64>,

    /// Cycles as `a -> b -> a` strings
    pub circular_dependencies: Vec<String>,

    /// Missing dependencies as `source -> target` strings
    pub missing_dependencies: Vec<String>,

    /// Components without any edge
    pub orphaned_components: Vec<String>,

    /// Components with the most edges, most connected first
    pub most_connected: Vec<ConnectedComponent>,

    /// Longest dependency chain below each component
    pub dependency_depth: BTreeMap<String, usize>,

    /// Longest dependency chain, deepest component first
    pub longest_chain: Vec<String>,

    /// Remediation advice
    pub recommendations: Vec<String>,
}

#[allow(clippy::cast_precision_loss)]
pub(super) fn build_report(result: &DependencyAnalysisResult) -> DependencyReport {
    let graph = &result.graph;
    let total_components = graph.len();
    let total_dependencies = graph.dependencies().len();
    let average = if total_components == 0 {
        0.0
    } else {
        total_dependencies as f64 / total_components as f64
    };

    let mut most_connected: Vec<ConnectedComponent> = graph
        .components()
        .keys()
        .map(|name| ConnectedComponent {
            name: name.clone(),
            connections: graph.connection_count(name),
        })
        .collect();
    most_connected.sort_by(|a, b| {
        b.connections
            .cmp(&a.connections)
            .then_with(|| a.name.cmp(&b.name))
    });
    most_connected.truncate(MOST_CONNECTED_LIMIT);

    let orphaned_components = graph.orphaned_components();

    DependencyReport {
        total_components,
        total_dependencies,
        average_dependencies_per_component: (average * 100.0).round() / 100.0,
        circular_dependencies_count: result.circular_dependencies.len(),
        missing_dependencies_count: result.missing_dependencies.len(),
        conflicts_count: result.conflicting_dependencies.len(),
        layer_violations_count: result.layer_violations.len(),
        orphaned_components_count: orphaned_components.len(),
        overall_dependency_health: result.overall_dependency_health,
        dependency_scores: result.dependency_scores.clone(),
        circular_dependencies: result
            .circular_dependencies
            .iter()
            .map(|cycle| cycle.join(" -> "))
            .collect(),
        missing_dependencies: result
            .missing_dependencies
            .iter()
            .map(ToString::to_string)
            .collect(),
        orphaned_components,
        most_connected,
        dependency_depth: graph.dependency_depths(),
        longest_chain: graph.longest_chain(),
        recommendations: recommendations(result),
    }
}

pub(super) fn recommendations(result: &DependencyAnalysisResult) -> Vec<String> {
    let mut recs = Vec::new();

    if !result.circular_dependencies.is_empty() {
        recs.push(format!(
            "Resolve {} circular dependencies to improve system stability",
            result.circular_dependencies.len()
        ));
        for cycle in &result.circular_dependencies {
            recs.push(format!("Break circular dependency: {}", cycle.join(" -> ")));
        }
    }

    if !result.missing_dependencies.is_empty() {
        recs.push(format!(
            "Address {} missing dependencies",
            result.missing_dependencies.len()
        ));
        for dep in result.missing_dependencies.iter().take(MAX_LISTED_MISSING) {
            recs.push(format!("Implement or configure missing dependency: {dep}"));
        }
    }

    if !result.conflicting_dependencies.is_empty() {
        recs.push(format!(
            "Resolve {} dependency conflicts",
            result.conflicting_dependencies.len()
        ));
    }

    for violation in &result.layer_violations {
        recs.push(format!(
            "Invert layering: {} component {} should not depend on {} component {}",
            violation.source_category, violation.source, violation.target_category, violation.target
        ));
    }

    let low: Vec<&str> = result
        .dependency_scores
        .iter()
        .filter(|(_, score)| **score < LOW_SCORE_THRESHOLD)
        .map(|(name, _)| name.as_str())
        .collect();
    if !low.is_empty() {
        let named: Vec<&str> = low.iter().take(3).copied().collect();
        recs.push(format!(
            "Improve dependency health for {} components: {}",
            low.len(),
            named.join(", ")
        ));
    }

    recs
}
