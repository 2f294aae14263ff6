//! Project snapshot loading.
//!
//! A snapshot is one JSON document holding every input of an assessment run:
//!
//! ```json
//! {
//!   "as_of": "2025-06-01T00:00:00Z",
//!   "components": [{"name": "postgres_database", "category": "infrastructure"}],
//!   "evaluations": [{"component": "postgres_database", "completion_percentage": 80.0, "status": "passed"}],
//!   "quality": [{"component": "postgres_database", "quality_level": "good"}],
//!   "history": {"postgres_database": [{"timestamp": "2025-05-01T00:00:00Z", "completion": 60.0}]}
//! }
//! ```
//!
//! Loading is resilient: every entry is decoded on its own, and entries that
//! fail are skipped and reported as [`LoadWarning`]s instead of failing the
//! whole load. Only unreadable files and documents that are not a JSON
//! object are errors.

use crate::completion::CompletionHistory;
use crate::domain::{Component, ComponentEvaluation, EvaluationStatus, QualityAssessment};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// A non-fatal problem found while loading a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// An array entry could not be decoded and was skipped.
    MalformedEntry {
        /// Top-level section holding the entry
        section: String,
        /// 0-based position in the section
        index: usize,
        /// Decoding error
        error: String,
    },

    /// An evaluation refers to a component the snapshot does not define.
    UnknownComponent {
        /// 0-based position in the evaluations section
        index: usize,
        /// The unresolved name
        component: String,
    },

    /// A whole section had the wrong shape and was ignored.
    InvalidSection {
        /// Section name
        section: String,
        /// What was wrong
        error: String,
    },
}

impl LoadWarning {
    /// Returns a human-readable description of the warning.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::MalformedEntry {
                section,
                index,
                error,
            } => format!("{section}[{index}]: malformed entry: {error}"),
            Self::UnknownComponent { index, component } => {
                format!("evaluations[{index}]: unknown component '{component}'")
            }
            Self::InvalidSection { section, error } => format!("{section}: ignored: {error}"),
        }
    }
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Evaluation as written in a snapshot, referring to its component by name.
#[derive(Debug, Deserialize)]
struct EvaluationEntry {
    component: String,
    completion_percentage: f64,
    status: EvaluationStatus,
}

/// Every input of one assessment run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectSnapshot {
    /// Discovered components
    pub components: Vec<Component>,

    /// Completion evaluations, resolved against `components`
    pub evaluations: Vec<ComponentEvaluation>,

    /// Quality grades
    pub quality: Vec<QualityAssessment>,

    /// Historical completion samples
    pub history: CompletionHistory,

    /// Reference time for trend analysis
    pub as_of: Option<DateTime<Utc>>,
}

impl ProjectSnapshot {
    /// Parse a snapshot document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Snapshot`] if `content` is not valid JSON or its root
    /// is not an object.
    pub fn from_json_str(content: &str) -> Result<(Self, Vec<LoadWarning>)> {
        let root: Value = serde_json::from_str(content)
            .map_err(|e| Error::Snapshot(format!("invalid JSON: {e}")))?;
        let Value::Object(root) = root else {
            return Err(Error::Snapshot(
                "snapshot root must be a JSON object".to_string(),
            ));
        };

        let mut warnings = Vec::new();

        let components: Vec<Component> = decode_section(&root, "components", &mut warnings);
        let entries: Vec<EvaluationEntry> = decode_section(&root, "evaluations", &mut warnings);
        let quality: Vec<QualityAssessment> = decode_section(&root, "quality", &mut warnings);
        let history = decode_history(&root, &mut warnings);
        let as_of = decode_as_of(&root, &mut warnings);

        let by_name: HashMap<&str, &Component> = components
            .iter()
            .rev()
            .map(|c| (c.name.as_str(), c))
            .collect();
        let mut evaluations = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match by_name.get(entry.component.as_str()) {
                Some(component) => evaluations.push(ComponentEvaluation::new(
                    (*component).clone(),
                    entry.completion_percentage,
                    entry.status,
                )),
                None => warnings.push(LoadWarning::UnknownComponent {
                    index,
                    component: entry.component,
                }),
            }
        }

        for warning in &warnings {
            warn!(warning = %warning, "Snapshot entry skipped");
        }
        debug!(
            components = components.len(),
            evaluations = evaluations.len(),
            quality = quality.len(),
            history = history.len(),
            warnings = warnings.len(),
            "Loaded snapshot"
        );

        Ok((
            Self {
                components,
                evaluations,
                quality,
                history,
                as_of,
            },
            warnings,
        ))
    }

    /// Read and parse a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or
    /// [`Error::Snapshot`] if it is not a JSON object.
    pub async fn load(path: &Path) -> Result<(Self, Vec<LoadWarning>)> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&content)
    }
}

fn decode_section<T: DeserializeOwned>(
    root: &Map<String, Value>,
    section: &str,
    warnings: &mut Vec<LoadWarning>,
) -> Vec<T> {
    match root.get(section) {
        None => Vec::new(),
        Some(Value::Array(entries)) => decode_entries(entries, section, warnings),
        Some(_) => {
            warnings.push(LoadWarning::InvalidSection {
                section: section.to_string(),
                error: "expected an array".to_string(),
            });
            Vec::new()
        }
    }
}

fn decode_entries<T: DeserializeOwned>(
    entries: &[Value],
    section: &str,
    warnings: &mut Vec<LoadWarning>,
) -> Vec<T> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            T::deserialize(entry)
                .map_err(|e| {
                    warnings.push(LoadWarning::MalformedEntry {
                        section: section.to_string(),
                        index,
                        error: e.to_string(),
                    });
                })
                .ok()
        })
        .collect()
}

fn decode_history(root: &Map<String, Value>, warnings: &mut Vec<LoadWarning>) -> CompletionHistory {
    let Some(value) = root.get("history") else {
        return CompletionHistory::new();
    };
    let Value::Object(per_component) = value else {
        warnings.push(LoadWarning::InvalidSection {
            section: "history".to_string(),
            error: "expected an object keyed by component name".to_string(),
        });
        return CompletionHistory::new();
    };

    let mut history = CompletionHistory::new();
    for (name, samples) in per_component {
        let section = format!("history.{name}");
        let Value::Array(samples) = samples else {
            warnings.push(LoadWarning::InvalidSection {
                section,
                error: "expected an array".to_string(),
            });
            continue;
        };
        history.insert(name.clone(), decode_entries(samples, &section, warnings));
    }
    history
}

fn decode_as_of(root: &Map<String, Value>, warnings: &mut Vec<LoadWarning>) -> Option<DateTime<Utc>> {
    let value = root.get("as_of")?;
    if value.is_null() {
        return None;
    }
    DateTime::<Utc>::deserialize(value)
        .map_err(|e| {
            warnings.push(LoadWarning::InvalidSection {
                section: "as_of".to_string(),
                error: e.to_string(),
            });
        })
        .ok()
}
