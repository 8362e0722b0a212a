//! Sensors command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tabled::builder::Builder;

use incubator_core::sensors::SensorSummary;
use incubator_core::{Catalog, SensorLog, Species, read_log};
use incubator_types::timestamp;

use crate::cli::OutputFormat;
use crate::context::AppContext;
use crate::style;
use crate::util::{parse_datetime_arg, with_newline, write_output};

/// Arguments for the sensors command.
pub struct SensorsArgs {
    pub format: OutputFormat,
    pub file: Option<PathBuf>,
    pub since: Option<String>,
    pub last: Option<usize>,
    pub summary: bool,
    pub species: Option<String>,
}

pub fn cmd_sensors(ctx: &AppContext, args: SensorsArgs) -> Result<()> {
    let SensorsArgs {
        format,
        file,
        since,
        last,
        summary,
        species,
    } = args;

    // Parse filters upfront to fail fast
    let since = since.as_deref().map(parse_datetime_arg).transpose()?;

    let path = file.unwrap_or_else(|| ctx.config.sensors.path.clone());
    let mut log = read_log(&path)
        .with_context(|| format!("Failed to read sensor log {}", path.display()))?;

    if log.skipped() > 0 && !ctx.quiet {
        eprintln!(
            "{}",
            style::format_warning(
                &format!("Skipped {} malformed rows", log.skipped()),
                ctx.no_color
            )
        );
    }
    if let Some(since) = since {
        log = log.since(since);
    }
    if let Some(n) = last {
        log = log.tail(n);
    }

    let bounds = resolve_bounds(ctx, species.as_deref())?;

    let content = if summary {
        let Some(summary) = log.summary(bounds.as_ref()) else {
            if !ctx.quiet {
                eprintln!(
                    "{}",
                    style::format_info("No sensor readings", ctx.no_color)
                );
            }
            return Ok(());
        };
        match format {
            OutputFormat::Text => format_summary_text(&summary, bounds.as_ref(), ctx.no_color),
            OutputFormat::Json => with_newline(serde_json::to_string_pretty(&summary)?),
            OutputFormat::Csv => format_summary_csv(&summary),
        }
    } else {
        match format {
            OutputFormat::Text => {
                if log.is_empty() {
                    if !ctx.quiet {
                        eprintln!(
                            "{}",
                            style::format_info("No sensor readings", ctx.no_color)
                        );
                    }
                    return Ok(());
                }
                format_readings_text(&log, bounds.as_ref(), ctx.no_color)
            }
            OutputFormat::Json => with_newline(log.to_json()?),
            OutputFormat::Csv => {
                let mut buf = Vec::new();
                log.write_csv(&mut buf)?;
                String::from_utf8(buf)?
            }
        }
    };

    write_output(ctx.output(), &content)
}

/// The species to judge readings against: the named one, or the active cycle's.
fn resolve_bounds(ctx: &AppContext, species: Option<&str>) -> Result<Option<Species>> {
    let name = match species {
        Some(name) => name.to_string(),
        None => match ctx.open_store()?.get_active()? {
            Some(active) => active.species_name,
            None => return Ok(None),
        },
    };

    let catalog = Catalog::load_or_empty(&ctx.config.catalog.path);
    let found = catalog.find_by_name(&name).cloned();
    if found.is_none() && species.is_some() {
        anyhow::bail!("Unknown species '{}'", name);
    }
    Ok(found)
}

fn format_readings_text(log: &SensorLog, bounds: Option<&Species>, no_color: bool) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Time", "Temperature", "Humidity"]);
    for r in log.readings() {
        builder.push_record([
            timestamp::format(r.timestamp),
            style::format_in_range(
                r.temperature,
                "°C",
                bounds.map(|s| s.temperature_ok(r.temperature)),
                no_color,
            ),
            style::format_in_range(
                r.humidity,
                "%",
                bounds.map(|s| s.humidity_ok(r.humidity)),
                no_color,
            ),
        ]);
    }

    let mut table = builder.build();
    style::apply_table_style(&mut table, no_color);
    format!("{}\n", table)
}

fn format_summary_text(
    summary: &SensorSummary,
    bounds: Option<&Species>,
    no_color: bool,
) -> String {
    let mut lines = vec![
        style::format_title("Sensor summary", no_color),
        format!("Samples:     {}", summary.count),
        format!(
            "Period:      {} to {}",
            timestamp::format(summary.first),
            timestamp::format(summary.last)
        ),
        format!(
            "Temperature: min {:.1}  avg {:.1}  max {:.1} °C",
            summary.temperature.min, summary.temperature.avg, summary.temperature.max
        ),
        format!(
            "Humidity:    min {:.1}  avg {:.1}  max {:.1} %",
            summary.humidity.min, summary.humidity.avg, summary.humidity.max
        ),
    ];

    if let (Some(species), Some(out)) = (bounds, summary.out_of_range) {
        lines.push(String::new());
        let message = format!(
            "Outside the {} range: {} temperature, {} humidity samples",
            species.name, out.temperature, out.humidity
        );
        lines.push(if out.temperature + out.humidity > 0 {
            style::format_warning(&message, no_color)
        } else {
            style::format_success(&message, no_color)
        });
    }

    lines.join("\n") + "\n"
}

fn format_summary_csv(summary: &SensorSummary) -> String {
    format!(
        "count,first,last,temp_min,temp_avg,temp_max,umid_min,umid_avg,umid_max\n\
         {},{},{},{:.1},{:.1},{:.1},{:.1},{:.1},{:.1}\n",
        summary.count,
        timestamp::format(summary.first),
        timestamp::format(summary.last),
        summary.temperature.min,
        summary.temperature.avg,
        summary.temperature.max,
        summary.humidity.min,
        summary.humidity.avg,
        summary.humidity.max,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
2024-01-02 10:00:00,37.7,58.0
2024-01-02 10:05:00,38.4,57.5
2024-01-02 10:10:00,37.6,66.0
";

    fn hen() -> Species {
        Species {
            name: "Galinha".to_string(),
            incubation_days: 21,
            temp_min: 37.5,
            temp_max: 38.0,
            humidity_min: 55.0,
            humidity_max: 65.0,
        }
    }

    #[test]
    fn test_readings_table() {
        let log = SensorLog::from_reader(LOG.as_bytes()).unwrap();
        let text = format_readings_text(&log, None, true);
        assert!(text.contains("2024-01-02 10:05:00"));
        assert!(text.contains("38.4°C"));
        assert!(text.contains("66.0%"));
    }

    #[test]
    fn test_summary_text_with_bounds() {
        let log = SensorLog::from_reader(LOG.as_bytes()).unwrap();
        let hen = hen();
        let summary = log.summary(Some(&hen)).unwrap();

        let text = format_summary_text(&summary, Some(&hen), true);
        assert!(text.contains("Samples:     3"));
        assert!(text.contains("2024-01-02 10:00:00 to 2024-01-02 10:10:00"));
        assert!(text.contains("[!!] Outside the Galinha range: 1 temperature, 1 humidity"));
    }

    #[test]
    fn test_summary_csv() {
        let log = SensorLog::from_reader(LOG.as_bytes()).unwrap();
        let csv = format_summary_csv(&log.summary(None).unwrap());
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("count,first,last"));
        assert!(
            lines
                .next()
                .unwrap()
                .starts_with("3,2024-01-02 10:00:00,2024-01-02 10:10:00,37.6,37.9,38.4")
        );
    }
}
