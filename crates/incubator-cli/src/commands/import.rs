//! Import command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use incubator_store::ImportResult;

use crate::cli::ImportFormat;
use crate::context::AppContext;

/// Errors listed before the rest are summarized.
const MAX_ERRORS_SHOWN: usize = 10;

pub fn cmd_import(
    ctx: &AppContext,
    active: Option<PathBuf>,
    history: Option<PathBuf>,
    format: Option<ImportFormat>,
) -> Result<()> {
    if active.is_none() && history.is_none() {
        bail!("Pass --active, --history or both");
    }
    // Resolve the history format before touching the database
    let history_format = history
        .as_deref()
        .map(|path| resolve_format(path, format))
        .transpose()?;

    let store = ctx.open_store()?;

    if let Some(path) = active {
        let data = read_input(&path)?;
        let result = store
            .import_legacy_active_csv(&data)
            .context("Failed to import active incubation")?;
        if !ctx.quiet {
            println!("{}:", path.display());
            print!("{}", format_import_result(&result));
        }
    }

    if let (Some(path), Some(format)) = (history, history_format) {
        let data = read_input(&path)?;
        let result = match format {
            ImportFormat::Json => store.import_history_json(&data),
            ImportFormat::Csv => store.import_history_csv(&data),
        }
        .context("Failed to import history")?;
        if !ctx.quiet {
            println!("{}:", path.display());
            print!("{}", format_import_result(&result));
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Use the explicit format, or infer it from the file extension.
fn resolve_format(path: &Path, format: Option<ImportFormat>) -> Result<ImportFormat> {
    if let Some(format) = format {
        return Ok(format);
    }
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => Ok(ImportFormat::Json),
        Some("csv") => Ok(ImportFormat::Csv),
        _ => bail!(
            "Cannot tell the format of {}; pass --format json or --format csv",
            path.display()
        ),
    }
}

fn format_import_result(result: &ImportResult) -> String {
    let mut out = String::from("Import complete:\n");
    out.push_str(&format!("  Total records: {}\n", result.total));
    out.push_str(&format!("  Imported: {}\n", result.imported));
    out.push_str(&format!("  Skipped: {}\n", result.skipped));

    if !result.errors.is_empty() {
        out.push_str(&format!("  Errors: {}\n", result.errors.len()));
        for err in result.errors.iter().take(MAX_ERRORS_SHOWN) {
            out.push_str(&format!("    - {}\n", err));
        }
        if result.errors.len() > MAX_ERRORS_SHOWN {
            out.push_str(&format!(
                "    ... and {} more errors\n",
                result.errors.len() - MAX_ERRORS_SHOWN
            ));
        }
    }
    out
}
