//! Species command implementation.

use anyhow::Result;
use tabled::builder::Builder;

use incubator_core::Species;

use crate::cli::OutputFormat;
use crate::context::AppContext;
use crate::style;
use crate::util::{with_newline, write_output};

pub fn cmd_species(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let catalog = ctx.load_catalog();

    if catalog.is_empty() && format == OutputFormat::Text {
        if !ctx.quiet {
            eprintln!(
                "{}",
                style::format_info(
                    &format!(
                        "No species available in {}",
                        ctx.config.catalog.path.display()
                    ),
                    ctx.no_color
                )
            );
        }
        return Ok(());
    }

    let content = match format {
        OutputFormat::Text => format_species_text(catalog.species(), ctx.no_color),
        OutputFormat::Json => with_newline(serde_json::to_string_pretty(catalog.species())?),
        OutputFormat::Csv => format_species_csv(catalog.species())?,
    };

    write_output(ctx.output(), &content)
}

fn format_species_text(species: &[Species], no_color: bool) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Species", "Days", "Temperature (°C)", "Humidity (%)"]);
    for s in species {
        builder.push_record([
            s.name.clone(),
            s.incubation_days.to_string(),
            format!("{:.1} - {:.1}", s.temp_min, s.temp_max),
            format!("{:.0} - {:.0}", s.humidity_min, s.humidity_max),
        ]);
    }

    let mut table = builder.build();
    style::apply_table_style(&mut table, no_color);
    format!("{}\n", table)
}

fn format_species_csv(species: &[Species]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for s in species {
        writer.serialize(s)?;
    }
    Ok(String::from_utf8(writer.into_inner()?)?)
}
