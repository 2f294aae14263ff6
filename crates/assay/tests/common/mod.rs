//! Shared fixtures for assay integration tests.

#![allow(dead_code)]

use assay::dependency::DependencyAnalysisResult;
use assay::domain::{Component, ComponentCategory, ComponentEvaluation, EvaluationStatus};

/// Component with explicit dependencies.
pub fn component(name: &str, category: ComponentCategory, deps: &[&str]) -> Component {
    Component::new(name, category).with_dependencies(deps.iter().copied())
}

/// Passed evaluation at `completion` percent.
pub fn evaluation(component: &Component, completion: f64) -> ComponentEvaluation {
    ComponentEvaluation::new(component.clone(), completion, EvaluationStatus::Passed)
}

/// Names of every component that sits on some reported cycle.
pub fn cycle_members(result: &DependencyAnalysisResult) -> Vec<String> {
    let mut members: Vec<String> = result
        .circular_dependencies
        .iter()
        .flatten()
        .cloned()
        .collect();
    members.sort();
    members.dedup();
    members
}
