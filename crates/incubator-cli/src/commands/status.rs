//! Status command implementation.

use anyhow::{Result, bail};
use serde::Serialize;
use time::PrimitiveDateTime;

use incubator_core::lifecycle::format_remaining;
use incubator_core::{Catalog, Incubation, Phase};
use incubator_types::timestamp;

use crate::cli::OutputFormat;
use crate::context::AppContext;
use crate::style;
use crate::util::{with_newline, write_output};

/// Machine-readable status.
#[derive(Debug, Serialize)]
struct StatusReport<'a> {
    phase: &'static str,
    incubation: Option<&'a Incubation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    days_elapsed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_fertile: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_hatched: Option<u32>,
}

impl<'a> StatusReport<'a> {
    fn new(record: Option<&'a Incubation>, phase: &Phase, now: PrimitiveDateTime) -> Self {
        let (days_elapsed, max_fertile, max_hatched) = match *phase {
            Phase::InProgress { days_elapsed, .. } => (Some(days_elapsed), None, None),
            Phase::AwaitingFertilityCheck {
                days_elapsed,
                max_fertile,
                ..
            } => (Some(days_elapsed), Some(max_fertile), None),
            Phase::AwaitingHatchCount { max_hatched } => (
                record.map(|r| r.days_elapsed(now)),
                None,
                Some(max_hatched),
            ),
            Phase::NoActiveCycle | Phase::Hatched { .. } => (None, None, None),
        };

        Self {
            phase: phase.label(),
            incubation: record,
            expected_end: record.map(|r| timestamp::format(r.expected_end())),
            days_elapsed,
            remaining: phase.remaining().map(format_remaining),
            max_fertile,
            max_hatched,
        }
    }
}

pub fn cmd_status(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    // The catalog is only needed to start a cycle or push setpoints.
    let lifecycle = ctx.lifecycle(Catalog::default())?;
    let now = ctx.now();
    let (record, phase) = lifecycle.status(now)?;

    let content = match format {
        OutputFormat::Text => format_status_text(record.as_ref(), &phase, ctx.no_color),
        OutputFormat::Json => with_newline(serde_json::to_string_pretty(&StatusReport::new(
            record.as_ref(),
            &phase,
            now,
        ))?),
        OutputFormat::Csv => bail!("CSV output is not supported for status; use --format json"),
    };

    write_output(ctx.output(), &content)
}

fn format_status_text(record: Option<&Incubation>, phase: &Phase, no_color: bool) -> String {
    let Some(record) = record else {
        return format!(
            "{}\n",
            style::format_info(
                "No active incubation. Start one with `incubator start <species> <eggs>`",
                no_color
            )
        );
    };

    let fertility = match record.fertility_check_count {
        Some(count) => format!("{} of {} fertile", count, record.egg_count),
        None => "not recorded".to_string(),
    };

    let mut lines = vec![
        style::format_title("Active incubation", no_color),
        format!("Species:         {}", record.species_name),
        format!("Eggs:            {}", record.egg_count),
        format!("Started:         {}", timestamp::format(record.started_at)),
        format!(
            "Expected hatch:  {}",
            timestamp::format(record.expected_end())
        ),
        format!("Fertility check: {}", fertility),
    ];
    if !record.notes.is_empty() {
        lines.push(format!("Notes:           {}", record.notes));
    }
    lines.push(format!(
        "Status:          {}",
        style::format_phase(phase, no_color)
    ));

    match *phase {
        Phase::AwaitingFertilityCheck { max_fertile, .. } => {
            lines.push(String::new());
            lines.push(style::format_info(
                &format!(
                    "Candle the eggs and run `incubator fertility <0-{}>`",
                    max_fertile
                ),
                no_color,
            ));
        }
        Phase::AwaitingHatchCount { max_hatched } => {
            lines.push(String::new());
            lines.push(style::format_info(
                &format!(
                    "Count the chicks and run `incubator hatch <0-{}>`",
                    max_hatched
                ),
                no_color,
            ));
        }
        _ => {}
    }

    lines.join("\n") + "\n"
}
