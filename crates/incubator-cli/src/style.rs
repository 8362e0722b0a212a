//! Visual styling utilities for the CLI.
//!
//! Colors are applied with `owo-colors` and always skipped when `no_color`
//! is set, so the same helpers serve interactive and piped output.

use owo_colors::OwoColorize;
use tabled::Table;
use tabled::settings::Style;

use incubator_core::Phase;

/// Format a success message.
pub fn format_success(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[OK] {}", message)
    } else {
        format!("{} {}", "[OK]".green(), message)
    }
}

/// Format an info message.
pub fn format_info(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[--] {}", message)
    } else {
        format!("{} {}", "[--]".cyan(), message)
    }
}

/// Format a warning message.
pub fn format_warning(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[!!] {}", message)
    } else {
        format!("{} {}", "[!!]".yellow(), message)
    }
}

/// Format a title header.
pub fn format_title(title: &str, no_color: bool) -> String {
    let rule = "━".repeat(title.chars().count());
    if no_color {
        format!("{}\n{}", title, rule)
    } else {
        format!("{}\n{}", title.bold(), rule.dimmed())
    }
}

/// Format a value green when inside its ideal range, yellow otherwise.
pub fn format_in_range(value: f32, unit: &str, in_range: Option<bool>, no_color: bool) -> String {
    let formatted = format!("{:.1}{}", value, unit);
    match in_range {
        _ if no_color => formatted,
        Some(true) => format!("{}", formatted.green()),
        Some(false) => format!("{}", formatted.yellow()),
        None => formatted,
    }
}

/// Format a phase as a short colored badge.
pub fn format_phase(phase: &Phase, no_color: bool) -> String {
    let text = phase.to_string();
    if no_color {
        return text;
    }
    match phase {
        Phase::AwaitingFertilityCheck { .. } | Phase::AwaitingHatchCount { .. } => {
            format!("{}", text.yellow().bold())
        }
        Phase::Hatched { .. } => format!("{}", text.red()),
        Phase::InProgress { .. } => format!("{}", text.green()),
        Phase::NoActiveCycle => format!("{}", text.dimmed()),
    }
}

/// Apply the standard table style; borderless when color is off.
pub fn apply_table_style(table: &mut Table, no_color: bool) {
    if no_color {
        table.with(Style::blank());
    } else {
        table.with(Style::rounded());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_messages() {
        assert_eq!(format_success("done", true), "[OK] done");
        assert_eq!(format_info("note", true), "[--] note");
        assert_eq!(format_warning("careful", true), "[!!] careful");
    }

    #[test]
    fn test_title_rule_matches_width() {
        assert_eq!(format_title("Histórico", true), "Histórico\n━━━━━━━━━");
    }

    #[test]
    fn test_in_range_plain() {
        assert_eq!(format_in_range(37.66, "°C", Some(false), true), "37.7°C");
        assert_eq!(format_in_range(60.0, "%", None, false), "60.0%");
    }

    #[test]
    fn test_colored_output_contains_text() {
        let colored = format_in_range(37.6, "°C", Some(true), false);
        assert!(colored.contains("37.6°C"));
        assert_ne!(colored, "37.6°C");
    }

    #[test]
    fn test_phase_plain() {
        assert_eq!(
            format_phase(&Phase::AwaitingHatchCount { max_hatched: 10 }, true),
            "awaiting hatch count"
        );
    }
}
