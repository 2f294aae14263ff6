//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Good:      green   (healthy scores, low priority, completed tiers)
//!   - Attention: yellow  (middling scores, high priority, warnings)
//!   - Problem:   red     (poor scores, critical priority, cycles)
//!   - Reference: cyan    (component names)
//!   - Muted:     dimmed  (field labels, separators)
//!   - Emphasis:  bold    (section headers)

use crate::domain::CompletionTier;
use crate::priority::PriorityLevel;
use colored::Colorize;

use super::OutputConfig;

/// Fractions at or above this are shown as healthy.
const HEALTHY: f64 = 0.8;

/// Fractions below this are shown as problems.
const UNHEALTHY: f64 = 0.5;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Colorize a component name (cyan).
pub(crate) fn component(name: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return name.to_string();
    }
    name.cyan().to_string()
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// Format a 0-1 fraction as a percentage colored by how healthy it is.
pub(crate) fn fraction(value: f64, config: &OutputConfig) -> String {
    let text = format!("{:.1}%", value * 100.0);
    if !config.use_colors {
        return text;
    }
    if value >= HEALTHY {
        text.green().to_string()
    } else if value >= UNHEALTHY {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

/// Format a 0-100 percentage colored by how complete it is.
pub(crate) fn percentage(value: f64, config: &OutputConfig) -> String {
    fraction(value / 100.0, config)
}

/// Apply color to a priority level.
pub(crate) fn colorize_priority(level: PriorityLevel, config: &OutputConfig) -> String {
    let text = level.to_string();
    if !config.use_colors {
        return text;
    }
    match level {
        PriorityLevel::Critical => text.red().bold().to_string(),
        PriorityLevel::High => text.yellow().to_string(),
        PriorityLevel::Medium => text.white().to_string(),
        PriorityLevel::Low => text.green().to_string(),
    }
}

/// Apply color to a completion tier.
pub(crate) fn colorize_tier(tier: CompletionTier, config: &OutputConfig) -> String {
    let text = tier.to_string();
    if !config.use_colors {
        return text;
    }
    match tier {
        CompletionTier::Critical => text.red().to_string(),
        CompletionTier::Essential => text.yellow().to_string(),
        CompletionTier::Important => text.white().to_string(),
        CompletionTier::Optional => text.dimmed().to_string(),
    }
}

/// Bullet marking a problem, with ASCII fallback support.
pub(crate) fn problem_icon(config: &OutputConfig) -> String {
    let icon = if config.use_ascii { "x" } else { "✗" };
    error(icon, config)
}

/// Bullet marking a recommendation, with ASCII fallback support.
pub(crate) fn advice_icon(config: &OutputConfig) -> String {
    let icon = if config.use_ascii { ">" } else { "▶" };
    warning(icon, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored::control::set_override;
    use std::sync::{Mutex, MutexGuard};

    static GLOBAL_STATE_MUTEX: Mutex<()> = Mutex::new(());

    struct ColorGuard<'a> {
        _guard: MutexGuard<'a, ()>,
    }

    impl ColorGuard<'_> {
        fn new() -> Self {
            let guard = GLOBAL_STATE_MUTEX
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            set_override(true);
            Self { _guard: guard }
        }
    }

    impl Drop for ColorGuard<'_> {
        fn drop(&mut self) {
            set_override(false);
        }
    }

    fn with_colors_enabled<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ColorGuard::new();
        f()
    }

    #[test]
    fn test_colorize_priority_contains_ansi_codes() {
        with_colors_enabled(|| {
            let config = OutputConfig::new(false, true);
            let critical = colorize_priority(PriorityLevel::Critical, &config);
            assert!(critical.contains("critical"));
            assert!(critical.contains("\x1b["), "Critical should have ANSI codes");
        });
    }

    #[test]
    fn test_colorize_without_colors() {
        let config = OutputConfig::new(false, false);
        assert_eq!(colorize_priority(PriorityLevel::High, &config), "high");
        assert_eq!(colorize_tier(CompletionTier::Essential, &config), "essential");
        assert_eq!(component("billing", &config), "billing");
    }

    #[test]
    fn test_fraction_formatting() {
        let config = OutputConfig::new(false, false);
        assert_eq!(fraction(0.875, &config), "87.5%");
        assert_eq!(percentage(42.0, &config), "42.0%");
    }

    #[test]
    fn test_icons_ascii_fallback() {
        let config = OutputConfig::new(true, false);
        assert_eq!(problem_icon(&config), "x");
        assert_eq!(advice_icon(&config), ">");

        let config = OutputConfig::new(false, false);
        assert_eq!(problem_icon(&config), "✗");
    }
}
