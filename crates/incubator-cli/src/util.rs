//! Utility functions for CLI operations.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use incubator_types::timestamp;

/// Write output to file or stdout.
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}

/// Current wall-clock time in `offset`, truncated to whole seconds.
pub fn now_in(offset: UtcOffset) -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc().to_offset(offset);
    let now = now.replace_nanosecond(0).unwrap_or(now);
    PrimitiveDateTime::new(now.date(), now.time())
}

/// Parse a `--since` style argument; a bare date means midnight.
pub fn parse_datetime_arg(s: &str) -> Result<PrimitiveDateTime> {
    if let Ok(ts) = timestamp::parse(s) {
        return Ok(ts);
    }
    timestamp::parse(&format!("{} 00:00:00", s.trim())).with_context(|| {
        format!(
            "Invalid date '{}'. Use YYYY-MM-DD or YYYY-MM-DD HH:MM:SS",
            s
        )
    })
}

/// Append a trailing newline if missing.
pub fn with_newline(mut s: String) -> String {
    if !s.ends_with('\n') {
        s.push('\n');
    }
    s
}
