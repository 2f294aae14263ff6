//! End-to-end assessment of one project snapshot.

use crate::completion::{CompletionAnalysisResult, CompletionCalculator};
use crate::config::AssessmentConfig;
use crate::dependency::{DependencyAnalysisResult, DependencyAnalyzer, DependencyReport};
use crate::priority::{PriorityRanker, PriorityRankingResult, PrioritySummary};
use crate::snapshot::ProjectSnapshot;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

/// Everything one assessment run produces.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentReport {
    /// Dependency graph analysis
    pub dependencies: DependencyAnalysisResult,

    /// Flat dependency digest
    pub dependency_report: DependencyReport,

    /// Completion scores, trends and milestones
    pub completion: CompletionAnalysisResult,

    /// Ranked priorities and shortlists
    pub priorities: PriorityRankingResult,

    /// Flat priority digest
    pub priority_summary: PrioritySummary,
}

/// Runs dependency analysis, completion scoring and priority ranking in order.
#[derive(Debug, Clone, Default)]
pub struct Assessor {
    config: AssessmentConfig,
}

impl Assessor {
    /// Create an assessor using `config` for every stage.
    #[must_use]
    pub fn new(config: AssessmentConfig) -> Self {
        Self { config }
    }

    /// Assess `snapshot`.
    ///
    /// Trends are evaluated at the snapshot's `as_of` time, falling back to
    /// the current time when the snapshot carries history but no reference
    /// time.
    #[must_use]
    pub fn assess(&self, snapshot: &ProjectSnapshot) -> AssessmentReport {
        let analyzer = DependencyAnalyzer::new(self.config.dependency.clone());
        let dependencies = analyzer.analyze(&snapshot.components);
        let dependency_report = analyzer.report(&dependencies);

        let mut calculator = CompletionCalculator::new(self.config.completion.clone());
        if !snapshot.history.is_empty() {
            let as_of = snapshot.as_of.unwrap_or_else(Utc::now);
            calculator = calculator.with_history(snapshot.history.clone(), as_of);
        }
        let completion =
            calculator.calculate(&snapshot.evaluations, &snapshot.quality, &dependencies);

        let ranker = PriorityRanker::new(self.config.priority.clone());
        let priorities = ranker.rank(
            &completion.component_scores,
            &snapshot.evaluations,
            &snapshot.quality,
            &dependencies,
        );
        let priority_summary = ranker.summary(&priorities);

        info!(
            components = snapshot.components.len(),
            health = dependencies.overall_dependency_health,
            completion = completion.system_score.overall_completion,
            critical_path = priorities.critical_path.len(),
            "Assessment complete"
        );

        AssessmentReport {
            dependencies,
            dependency_report,
            completion,
            priorities,
            priority_summary,
        }
    }
}
