//! Dependency graph construction and traversal using petgraph.
//!
//! Edges point from **dependent to dependency**: `source -> target` means the
//! source requires (or optionally benefits from) the target. Only resolved
//! dependencies become edges; unresolved targets are returned separately as
//! missing dependencies.

use crate::config::DependencyConfig;
use crate::domain::{Component, Dependency, DependencyKind, DependencyStatus};
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

const DEPENDENT_IMPACT: f64 = 2.0;
const DEPENDENCY_IMPACT: f64 = 0.5;

/// Directed graph of components and the dependencies between them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DependencyGraph {
    /// Components indexed by name
    components: BTreeMap<String, Component>,

    /// Resolved dependencies in discovery order
    dependencies: Vec<Dependency>,

    /// Edge weights carry the dependency kind.
    #[serde(skip)]
    graph: DiGraph<String, DependencyKind>,

    /// Mapping from component name to graph node.
    #[serde(skip)]
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Components indexed by name.
    #[must_use]
    pub fn components(&self) -> &BTreeMap<String, Component> {
        &self.components
    }

    /// Resolved dependencies, in the order they were discovered.
    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Look up a component by name.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }

    /// Whether a component with this name is in the graph.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the graph has no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Names of the components `name` depends on directly.
    #[must_use]
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.dependencies
            .iter()
            .filter(|d| d.source == name)
            .map(|d| d.target.as_str())
            .collect()
    }

    /// Names of the other components that depend on `name` directly.
    #[must_use]
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.dependencies
            .iter()
            .filter(|d| d.target == name && d.source != name)
            .map(|d| d.source.as_str())
            .filter(|source| seen.insert(*source))
            .collect()
    }

    /// Every component reachable from `name` by following dependencies.
    ///
    /// Uses BFS; `name` itself is excluded even when it sits on a cycle.
    #[must_use]
    pub fn transitive_dependencies(&self, name: &str) -> BTreeSet<String> {
        let Some(&start) = self.node_map.get(name) else {
            return BTreeSet::new();
        };

        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut result = BTreeSet::new();

        while let Some(node) = queue.pop_front() {
            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if visited.insert(next) {
                    result.insert(self.graph[next].clone());
                    queue.push_back(next);
                }
            }
        }

        result
    }

    /// Components with neither dependencies nor dependents.
    #[must_use]
    pub fn orphaned_components(&self) -> Vec<String> {
        self.components
            .keys()
            .filter(|name| {
                self.node_map.get(name.as_str()).is_some_and(|&node| {
                    self.graph
                        .neighbors_undirected(node)
                        .next()
                        .is_none()
                })
            })
            .cloned()
            .collect()
    }

    /// Number of edges touching `name` in either direction.
    #[must_use]
    pub fn connection_count(&self, name: &str) -> usize {
        self.node_map.get(name).map_or(0, |&node| {
            self.graph.edges_directed(node, Direction::Outgoing).count()
                + self.graph.edges_directed(node, Direction::Incoming).count()
        })
    }

    /// How much of the system leans on `name`, from 0 to 1.
    ///
    /// Dependents count four times as much as dependencies; the result is
    /// normalised against a component connected to every other one both ways.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn impact_score(&self, name: &str) -> f64 {
        if !self.contains(name) || self.len() < 2 {
            return 0.0;
        }
        let dependents = self.dependents_of(name).len() as f64;
        let dependencies = self.dependencies_of(name).len() as f64;
        let others = (self.len() - 1) as f64;

        let raw = dependents * DEPENDENT_IMPACT + dependencies * DEPENDENCY_IMPACT;
        (raw / (others * (DEPENDENT_IMPACT + DEPENDENCY_IMPACT))).clamp(0.0, 1.0)
    }

    /// Length of the longest dependency chain below each component.
    ///
    /// Components without dependencies have depth 0. Members of a cycle are
    /// collapsed into one step and share its depth, so a cycle never adds to
    /// the depth of anything above it.
    #[must_use]
    pub fn dependency_depths(&self) -> BTreeMap<String, usize> {
        let mut depths: HashMap<NodeIndex, usize> = HashMap::new();

        // tarjan_scc yields reverse topological order: dependencies first
        for scc in tarjan_scc(&self.graph) {
            let members: HashSet<NodeIndex> = scc.iter().copied().collect();
            let depth = scc
                .iter()
                .flat_map(|&node| self.graph.neighbors_directed(node, Direction::Outgoing))
                .filter(|next| !members.contains(next))
                .filter_map(|next| depths.get(&next).map(|d| d + 1))
                .max()
                .unwrap_or(0);
            for node in scc {
                depths.insert(node, depth);
            }
        }

        depths
            .into_iter()
            .map(|(node, depth)| (self.graph[node].clone(), depth))
            .collect()
    }

    /// The longest dependency chain, from the deepest component downwards.
    ///
    /// Starts at the component with the greatest depth and keeps following
    /// its deepest dependency while depth strictly decreases. Ties go to the
    /// smallest name.
    #[must_use]
    pub fn longest_chain(&self) -> Vec<String> {
        let depths = self.dependency_depths();
        let Some(start) = deepest(depths.iter().map(|(name, &depth)| (name.as_str(), depth)))
        else {
            return Vec::new();
        };

        let mut chain = vec![start.to_string()];
        let mut current = start;
        loop {
            let current_depth = depths.get(current).copied().unwrap_or(0);
            let next = deepest(
                self.dependencies_of(current)
                    .into_iter()
                    .map(|name| (name, depths.get(name).copied().unwrap_or(0))),
            );
            match next {
                Some(next) if depths.get(next).copied().unwrap_or(0) < current_depth => {
                    chain.push(next.to_string());
                    current = next;
                }
                _ => break,
            }
        }
        chain
    }

    /// The underlying petgraph graph.
    pub(crate) fn inner(&self) -> &DiGraph<String, DependencyKind> {
        &self.graph
    }

    fn add_component(&mut self, component: &Component) {
        let node = self.graph.add_node(component.name.clone());
        self.node_map.insert(component.name.clone(), node);
        self.components
            .insert(component.name.clone(), component.clone());
    }

    fn has_edge(&self, source: &str, target: &str) -> bool {
        match (self.node_map.get(source), self.node_map.get(target)) {
            (Some(&from), Some(&to)) => self.graph.contains_edge(from, to),
            _ => false,
        }
    }

    /// Add an edge between two known components, ignoring duplicates.
    fn add_edge(&mut self, source: &str, target: &str, kind: DependencyKind, description: String) {
        if self.has_edge(source, target) {
            return;
        }
        let (Some(&from), Some(&to)) = (self.node_map.get(source), self.node_map.get(target))
        else {
            return;
        };
        let status = self
            .components
            .get(target)
            .map_or(DependencyStatus::Missing, |c| {
                DependencyStatus::from_target(c.status)
            });

        self.graph.add_edge(from, to, kind);
        self.dependencies.push(Dependency {
            source: source.to_string(),
            target: target.to_string(),
            kind,
            status,
            description,
        });
    }
}

/// Name with the greatest depth, preferring the smallest name on ties.
fn deepest<'a>(candidates: impl Iterator<Item = (&'a str, usize)>) -> Option<&'a str> {
    candidates
        .max_by(|(a_name, a_depth), (b_name, b_depth)| {
            a_depth.cmp(b_depth).then_with(|| b_name.cmp(a_name))
        })
        .map(|(name, _)| name)
}

/// Build the dependency graph for `components`.
///
/// Returns the graph together with every dependency whose target could not be
/// resolved. Components with blank names are skipped, and so is every
/// component whose name was already seen.
///
/// # Edge sources
///
/// 1. Explicit dependency names, resolved by exact name match into
///    `Required` edges.
/// 2. Inferred dependencies: the component is classified into a type and
///    each rule of that type fans out to every other component matching the
///    rule's pattern. A rule with no match is a missing dependency.
pub(crate) fn build_graph(
    components: &[Component],
    config: &DependencyConfig,
) -> (DependencyGraph, Vec<Dependency>) {
    let mut graph = DependencyGraph::default();
    let mut accepted: Vec<&Component> = Vec::with_capacity(components.len());

    for component in components {
        if component.name.trim().is_empty() {
            warn!(path = %component.path, "Skipping component with blank name");
            continue;
        }
        if graph.contains(&component.name) {
            warn!(name = %component.name, "Skipping duplicate component");
            continue;
        }
        graph.add_component(component);
        accepted.push(component);
    }

    let mut missing: Vec<Dependency> = Vec::new();
    let mut push_missing = |dep: Dependency| {
        if !missing
            .iter()
            .any(|m| m.source == dep.source && m.target == dep.target)
        {
            missing.push(dep);
        }
    };

    for component in &accepted {
        for dep_name in &component.dependencies {
            if graph.contains(dep_name) {
                graph.add_edge(
                    &component.name,
                    dep_name,
                    DependencyKind::Required,
                    format!(
                        "Explicit dependency from {} to {}",
                        component.name, dep_name
                    ),
                );
            } else {
                push_missing(Dependency {
                    source: component.name.clone(),
                    target: dep_name.clone(),
                    kind: DependencyKind::Required,
                    status: DependencyStatus::Missing,
                    description: format!(
                        "Missing explicit dependency from {} to {}",
                        component.name, dep_name
                    ),
                });
            }
        }

        let Some(component_type) = classify(component, config) else {
            continue;
        };
        let Some(rules) = config.rules.get(component_type) else {
            continue;
        };

        for rule in rules {
            let matches: Vec<&str> = accepted
                .iter()
                .filter(|other| other.name != component.name)
                .filter(|other| other.matches_pattern(&rule.target_pattern))
                .map(|other| other.name.as_str())
                .collect();

            if matches.is_empty() {
                push_missing(Dependency {
                    source: component.name.clone(),
                    target: rule.target_pattern.clone(),
                    kind: rule.kind,
                    status: DependencyStatus::Missing,
                    description: rule.description.clone(),
                });
                continue;
            }

            for target in matches {
                graph.add_edge(&component.name, target, rule.kind, rule.description.clone());
            }
        }
    }

    debug!(
        components = graph.len(),
        dependencies = graph.dependencies.len(),
        missing = missing.len(),
        "Built dependency graph"
    );

    (graph, missing)
}

/// Component type of `component` according to the ordered classifier table.
pub(crate) fn classify<'a>(component: &Component, config: &'a DependencyConfig) -> Option<&'a str> {
    config
        .classifiers
        .iter()
        .find(|classifier| {
            classifier
                .keywords
                .iter()
                .any(|keyword| component.matches_pattern(keyword))
                && classifier
                    .requires
                    .iter()
                    .all(|keyword| component.matches_pattern(keyword))
        })
        .map(|classifier| classifier.component_type.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ComponentCategory, ComponentStatus};

    fn component(name: &str, deps: &[&str]) -> Component {
        Component::new(name, ComponentCategory::Automation).with_dependencies(deps.iter().copied())
    }

    #[test]
    fn test_explicit_dependency_becomes_required_edge() {
        let components = vec![component("alpha", &["beta"]), component("beta", &[])];
        let (graph, missing) = build_graph(&components, &DependencyConfig::default());

        assert!(missing.is_empty());
        assert_eq!(graph.dependencies().len(), 1);
        let dep = &graph.dependencies()[0];
        assert_eq!(dep.source, "alpha");
        assert_eq!(dep.target, "beta");
        assert_eq!(dep.kind, DependencyKind::Required);
        assert_eq!(dep.status, DependencyStatus::Missing);
    }

    #[test]
    fn test_edge_status_follows_target_status() {
        let components = vec![
            component("alpha", &["beta", "gamma"]),
            component("beta", &[]).with_status(ComponentStatus::Operational),
            component("gamma", &[]).with_status(ComponentStatus::Degraded),
        ];
        let (graph, _) = build_graph(&components, &DependencyConfig::default());

        let statuses: Vec<_> = graph.dependencies().iter().map(|d| d.status).collect();
        assert_eq!(
            statuses,
            vec![DependencyStatus::Satisfied, DependencyStatus::Degraded]
        );
    }

    #[test]
    fn test_unresolved_explicit_dependency_is_missing_once() {
        let components = vec![component("alpha", &["ghost", "ghost"])];
        let (graph, missing) = build_graph(&components, &DependencyConfig::default());

        assert!(graph.dependencies().is_empty());
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].to_string(), "alpha -> ghost");
    }

    #[test]
    fn test_inferred_rule_fans_out_to_every_match() {
        let components = vec![
            Component::new("grafana", ComponentCategory::Infrastructure),
            Component::new("prometheus_main", ComponentCategory::Infrastructure),
            Component::new("prometheus_edge", ComponentCategory::Infrastructure),
        ];
        let (graph, missing) = build_graph(&components, &DependencyConfig::default());

        assert!(missing.is_empty());
        let mut targets = graph.dependencies_of("grafana");
        targets.sort_unstable();
        assert_eq!(targets, vec!["prometheus_edge", "prometheus_main"]);
    }

    #[test]
    fn test_inferred_rule_without_match_is_missing() {
        let components = vec![Component::new("grafana", ComponentCategory::Infrastructure)];
        let (_, missing) = build_graph(&components, &DependencyConfig::default());

        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].target, "prometheus");
        assert_eq!(missing[0].kind, DependencyKind::Required);
    }

    #[test]
    fn test_inferred_edge_does_not_duplicate_explicit_edge() {
        let components = vec![
            Component::new("grafana", ComponentCategory::Infrastructure)
                .with_dependencies(["prometheus"]),
            Component::new("prometheus", ComponentCategory::Infrastructure),
        ];
        let (graph, _) = build_graph(&components, &DependencyConfig::default());
        assert_eq!(graph.dependencies().len(), 1);
    }

    #[test]
    fn test_blank_and_duplicate_components_skipped() {
        let components = vec![
            component("alpha", &[]),
            component("   ", &[]),
            component("alpha", &["beta"]),
        ];
        let (graph, missing) = build_graph(&components, &DependencyConfig::default());

        assert_eq!(graph.len(), 1);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_classify_respects_order_and_requires() {
        let config = DependencyConfig::default();
        let toolkit = Component::new("nca_toolkit_database", ComponentCategory::Infrastructure);
        assert_eq!(classify(&toolkit, &config), Some("nca_toolkit"));

        let deploy = Component::new("deployment_scripts", ComponentCategory::Automation);
        assert_eq!(classify(&deploy, &config), Some("deployment_scripts"));

        let docs = Component::new("deployment_guide", ComponentCategory::Documentation);
        assert_eq!(classify(&docs, &config), None);
    }

    #[test]
    fn test_vscode_classifier_ignores_ide_substrings() {
        let config = DependencyConfig::default();
        for name in ["user_guide", "storage_provider", "side_panel"] {
            let component = Component::new(name, ComponentCategory::Documentation);
            assert_eq!(classify(&component, &config), None, "{name}");
        }

        let extension = Component::new("vscode_extension", ComponentCategory::Automation);
        assert_eq!(classify(&extension, &config), Some("vscode_integration"));
    }

    #[test]
    fn test_transitive_dependencies_and_dependents() {
        let components = vec![
            component("alpha", &["beta"]),
            component("beta", &["gamma"]),
            component("gamma", &[]),
            component("delta", &["gamma"]),
        ];
        let (graph, _) = build_graph(&components, &DependencyConfig::default());

        let reachable: Vec<_> = graph.transitive_dependencies("alpha").into_iter().collect();
        assert_eq!(reachable, vec!["beta".to_string(), "gamma".to_string()]);

        let mut dependents = graph.dependents_of("gamma");
        dependents.sort_unstable();
        assert_eq!(dependents, vec!["beta", "delta"]);

        assert!(graph.transitive_dependencies("unknown").is_empty());
    }

    #[test]
    fn test_orphaned_components() {
        let components = vec![
            component("alpha", &["beta"]),
            component("beta", &[]),
            component("loner", &[]),
        ];
        let (graph, _) = build_graph(&components, &DependencyConfig::default());
        assert_eq!(graph.orphaned_components(), vec!["loner".to_string()]);
        assert_eq!(graph.connection_count("alpha"), 1);
        assert_eq!(graph.connection_count("loner"), 0);
    }

    #[test]
    fn test_depths_and_longest_chain_on_diamond() {
        let components = vec![
            component("top", &["left", "right"]),
            component("left", &["base"]),
            component("right", &["base"]),
            component("base", &[]),
        ];
        let (graph, _) = build_graph(&components, &DependencyConfig::default());

        let depths = graph.dependency_depths();
        assert_eq!(depths["base"], 0);
        assert_eq!(depths["left"], 1);
        assert_eq!(depths["right"], 1);
        assert_eq!(depths["top"], 2);
        assert_eq!(graph.longest_chain(), vec!["top", "left", "base"]);
    }

    #[test]
    fn test_depths_collapse_cycles() {
        let components = vec![
            component("top", &["x"]),
            component("x", &["y", "leaf"]),
            component("y", &["x"]),
            component("leaf", &[]),
        ];
        let (graph, _) = build_graph(&components, &DependencyConfig::default());

        let depths = graph.dependency_depths();
        assert_eq!(depths["leaf"], 0);
        assert_eq!(depths["x"], 1);
        assert_eq!(depths["y"], 1);
        assert_eq!(depths["top"], 2);
        assert_eq!(graph.longest_chain(), vec!["top", "x"]);

        let mut reversed = components.clone();
        reversed.reverse();
        let (other, _) = build_graph(&reversed, &DependencyConfig::default());
        assert_eq!(other.dependency_depths(), depths);
    }

    #[test]
    fn test_depths_of_empty_graph() {
        let graph = DependencyGraph::default();
        assert!(graph.dependency_depths().is_empty());
        assert!(graph.longest_chain().is_empty());
    }

    #[test]
    fn test_impact_score_favours_dependents() {
        let components = vec![
            component("alpha", &["hub"]),
            component("beta", &["hub"]),
            component("hub", &[]),
        ];
        let (graph, _) = build_graph(&components, &DependencyConfig::default());

        let hub = graph.impact_score("hub");
        let alpha = graph.impact_score("alpha");
        assert!(hub > alpha);
        assert!((0.0..=1.0).contains(&hub));
        assert!(graph.impact_score("missing").abs() < f64::EPSILON);
    }
}
