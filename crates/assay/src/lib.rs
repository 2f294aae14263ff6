//! Assay - project assessment engine.
//!
//! Given the components of a multi-component project, their completion
//! evaluations and quality grades, assay runs three stages:
//!
//! 1. [`dependency::DependencyAnalyzer`] builds the dependency graph, finds
//!    cycles, missing dependencies and layer violations, and scores health.
//! 2. [`completion::CompletionCalculator`] turns raw completion percentages
//!    into weighted, quality and dependency adjusted scores, with trends and
//!    milestone projections when history is available.
//! 3. [`priority::PriorityRanker`] ranks components by business impact,
//!    dependency urgency, complexity and completion gap, and builds the
//!    critical path, quick wins and high impact shortlists.
//!
//! [`pipeline::Assessor`] chains the stages over a [`snapshot::ProjectSnapshot`].

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod completion;
pub mod config;
pub mod dependency;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod priority;
pub mod snapshot;

// Public CLI modules (needed by binary)
pub mod cli;
pub mod output;

pub use error::{Error, Result};
pub use pipeline::{AssessmentReport, Assessor};
