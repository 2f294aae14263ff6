//! Output formatting for CLI commands.
//!
//! Reports are printed either as a human-readable digest or as pretty JSON
//! for programmatic use.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors, icons)

pub mod color;

use crate::pipeline::AssessmentReport;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, success, warning};

use color::{
    advice_icon, bold, colorize_priority, colorize_tier, component, dimmed, fraction, percentage,
    problem_icon,
};

/// Cycles and missing dependencies listed in the text digest.
const LISTED_PROBLEMS: usize = 5;

// ============================================================================
// Output Configuration
// ============================================================================

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    #[must_use]
    pub fn new(use_ascii: bool, use_colors: bool) -> Self {
        Self {
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `ASSAY_ASCII`: Set to "1" or "true" for ASCII-only icons (default: false)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `ASSAY_COLOR`: Set to "0" or "false" to disable colors (default: true)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_ascii = match lookup("ASSAY_ASCII") {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Some(v) => {
                tracing::warn!(
                    env_var = "ASSAY_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            None => false,
        };

        // https://no-color.org/
        let use_colors = lookup("NO_COLOR").is_none()
            && lookup("ASSAY_COLOR")
                .is_none_or(|v| v != "0" && !v.eq_ignore_ascii_case("false"));

        Self {
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print an assessment report in the specified format.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_report(report: &AssessmentReport, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_report_text(&mut handle, report, &config),
        OutputMode::Json => write_json(&mut handle, report),
    }
}

/// Print a simple message
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{msg}")
}

/// Print a JSON-formatted result for any serializable value
///
/// # Errors
///
/// Returns an error if serialization or writing to stdout fails.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

fn write_json<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}

// ============================================================================
// Text Formatting
// ============================================================================

fn print_report_text<W: Write>(
    w: &mut W,
    report: &AssessmentReport,
    config: &OutputConfig,
) -> io::Result<()> {
    print_dependency_section(w, report, config)?;
    print_completion_section(w, report, config)?;
    print_priority_section(w, report, config)?;

    let recommendations: Vec<&String> = report
        .dependency_report
        .recommendations
        .iter()
        .chain(&report.completion.recommendations)
        .chain(&report.priorities.recommendations)
        .collect();
    if !recommendations.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}", bold("Recommendations:", config))?;
        for rec in recommendations {
            writeln!(w, "  {} {rec}", advice_icon(config))?;
        }
    }
    Ok(())
}

fn print_dependency_section<W: Write>(
    w: &mut W,
    report: &AssessmentReport,
    config: &OutputConfig,
) -> io::Result<()> {
    let deps = &report.dependency_report;

    writeln!(w, "{}", bold("Dependencies:", config))?;
    writeln!(
        w,
        "  {} {}",
        dimmed("Health:", config),
        fraction(deps.overall_dependency_health, config)
    )?;
    writeln!(
        w,
        "  {} {} components, {} edges ({:.2} per component)",
        dimmed("Graph:", config),
        deps.total_components,
        deps.total_dependencies,
        deps.average_dependencies_per_component
    )?;
    if deps.longest_chain.len() > 1 {
        writeln!(
            w,
            "  {} {}",
            dimmed("Longest chain:", config),
            deps.longest_chain.join(" -> ")
        )?;
    }
    writeln!(
        w,
        "  {} {} cycles, {} missing, {} layer violations, {} orphaned",
        dimmed("Issues:", config),
        deps.circular_dependencies_count,
        deps.missing_dependencies_count,
        deps.layer_violations_count,
        deps.orphaned_components_count
    )?;
    for cycle in deps.circular_dependencies.iter().take(LISTED_PROBLEMS) {
        writeln!(w, "    {} cycle: {cycle}", problem_icon(config))?;
    }
    for missing in deps.missing_dependencies.iter().take(LISTED_PROBLEMS) {
        writeln!(w, "    {} missing: {missing}", problem_icon(config))?;
    }
    Ok(())
}

fn print_completion_section<W: Write>(
    w: &mut W,
    report: &AssessmentReport,
    config: &OutputConfig,
) -> io::Result<()> {
    let system = &report.completion.system_score;

    writeln!(w)?;
    writeln!(w, "{}", bold("Completion:", config))?;
    writeln!(
        w,
        "  {} {} ({} weighted, {} quality adjusted)",
        dimmed("Overall:", config),
        percentage(system.overall_completion, config),
        percentage(system.weighted_completion, config),
        percentage(system.quality_adjusted_completion, config)
    )?;
    writeln!(
        w,
        "  {} {} of {} complete, confidence {:.2}",
        dimmed("Components:", config),
        system.completed_components,
        system.total_components,
        system.confidence
    )?;
    for (tier, value) in &system.tier_completion {
        let milestone = report
            .completion
            .milestones
            .get(tier)
            .map(|date| format!(" (projected {})", date.format("%Y-%m-%d")))
            .unwrap_or_default();
        writeln!(
            w,
            "    {:<10} {}{milestone}",
            colorize_tier(*tier, config),
            percentage(*value, config)
        )?;
    }
    for risk in &report.completion.risk_factors {
        writeln!(w, "    {} {risk}", problem_icon(config))?;
    }
    Ok(())
}

fn print_priority_section<W: Write>(
    w: &mut W,
    report: &AssessmentReport,
    config: &OutputConfig,
) -> io::Result<()> {
    let summary = &report.priority_summary;

    writeln!(w)?;
    writeln!(w, "{}", bold("Priorities:", config))?;
    if summary.top_priorities.is_empty() {
        writeln!(w, "  No components to rank.")?;
        return Ok(());
    }

    for top in &summary.top_priorities {
        writeln!(
            w,
            "  {:>5.1}  {}  {}  {} effort, ROI {:.1}",
            top.priority_score,
            colorize_priority(top.priority_level, config),
            component(&top.component, config),
            top.effort_estimate,
            top.roi_score
        )?;
        if !top.justification.is_empty() {
            writeln!(w, "         {}", dimmed(&top.justification, config))?;
        }
    }
    writeln!(
        w,
        "  {} {} hours ({:.1} weeks)",
        dimmed("Estimated effort:", config),
        summary.total_estimated_effort_hours,
        summary.total_estimated_effort_weeks
    )?;
    print_name_list(w, "Critical path:", &report.priorities.critical_path, config)?;
    print_name_list(w, "Quick wins:", &report.priorities.quick_wins, config)?;
    print_name_list(w, "High impact:", &report.priorities.high_impact_items, config)?;
    Ok(())
}

fn print_name_list<W: Write>(
    w: &mut W,
    label: &str,
    names: &[String],
    config: &OutputConfig,
) -> io::Result<()> {
    if names.is_empty() {
        return Ok(());
    }
    let names: Vec<String> = names.iter().map(|n| component(n, config)).collect();
    writeln!(w, "  {} {}", dimmed(label, config), names.join(", "))
}
