//! History command implementation.

use anyhow::{Context, Result};
use tabled::builder::Builder;

use incubator_core::CompletedIncubation;
use incubator_store::HistoryStats;
use incubator_types::timestamp;

use crate::cli::OutputFormat;
use crate::context::AppContext;
use crate::style;
use crate::util::{with_newline, write_output};

pub fn cmd_history(ctx: &AppContext, format: OutputFormat, stats: bool) -> Result<()> {
    let store = ctx.open_store()?;

    let content = if stats {
        let stats = store
            .history_stats()
            .context("Failed to compute history statistics")?;
        match format {
            OutputFormat::Text => format_stats_text(&stats, ctx.no_color),
            OutputFormat::Json => with_newline(serde_json::to_string_pretty(&stats)?),
            OutputFormat::Csv => format!(
                "cycles,eggs,hatched,hatch_rate\n{},{},{},{:.1}\n",
                stats.cycles, stats.eggs, stats.hatched, stats.hatch_rate
            ),
        }
    } else {
        match format {
            OutputFormat::Text => {
                let history = store.list_history().context("Failed to read history")?;
                if history.is_empty() {
                    if !ctx.quiet {
                        eprintln!(
                            "{}",
                            style::format_info("No completed incubations yet", ctx.no_color)
                        );
                    }
                    return Ok(());
                }
                format_history_text(&history, ctx.no_color)
            }
            OutputFormat::Json => with_newline(store.export_history_json()?),
            OutputFormat::Csv => store.export_history_csv()?,
        }
    };

    write_output(ctx.output(), &content)
}

fn format_history_text(history: &[CompletedIncubation], no_color: bool) -> String {
    let mut builder = Builder::default();
    builder.push_record([
        "Started", "Species", "Eggs", "Fertile", "Hatched", "Rate", "Ended", "Notes",
    ]);
    for record in history {
        builder.push_record([
            timestamp::format(record.started_at),
            record.species_name.clone(),
            record.egg_count.to_string(),
            record
                .fertility_check_count
                .map_or_else(|| "-".to_string(), |c| c.to_string()),
            record.hatched_count.to_string(),
            format!("{:.1}%", record.hatch_rate()),
            timestamp::format(record.ended_at),
            record.notes.clone(),
        ]);
    }

    let mut table = builder.build();
    style::apply_table_style(&mut table, no_color);
    format!("{}\n", table)
}

fn format_stats_text(stats: &HistoryStats, no_color: bool) -> String {
    [
        style::format_title("Incubation history", no_color),
        format!("Cycles:     {}", stats.cycles),
        format!("Eggs set:   {}", stats.eggs),
        format!("Hatched:    {}", stats.hatched),
        format!("Hatch rate: {:.1}%", stats.hatch_rate),
    ]
    .join("\n")
        + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn record(fertile: Option<u32>, hatched: u32) -> CompletedIncubation {
        CompletedIncubation {
            started_at: datetime!(2024-01-01 00:00:00),
            egg_count: 12,
            species_name: "Galinha".to_string(),
            notes: "lote A".to_string(),
            fertility_check_count: fertile,
            hatched_count: hatched,
            ended_at: datetime!(2024-01-22 00:00:00),
            duration_days: 21,
        }
    }

    #[test]
    fn test_history_table() {
        let text = format_history_text(&[record(Some(10), 8), record(None, 6)], true);
        assert!(text.contains("2024-01-01 00:00:00"));
        assert!(text.contains("66.7%"));
        assert!(text.contains("50.0%"));
        assert!(text.contains("lote A"));
        assert!(text.contains(" - "));
    }

    #[test]
    fn test_stats_text() {
        let stats = HistoryStats {
            cycles: 2,
            eggs: 24,
            hatched: 14,
            hatch_rate: 58.333,
        };
        let text = format_stats_text(&stats, true);
        assert!(text.contains("Cycles:     2"));
        assert!(text.contains("Hatch rate: 58.3%"));
    }
}
