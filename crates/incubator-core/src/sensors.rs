//! Reader for the controller's temperature/humidity log.
//!
//! The controller appends one CSV row per sample, without a header:
//!
//! ```text
//! 2024-01-02 10:00:00,37.7,58.0
//! 2024-01-02 10:05:00,37.8,57.5
//! ```
//!
//! The log is only displayed and exported. It never feeds back into the
//! lifecycle.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::{debug, warn};

use incubator_types::{SensorReading, Species, timestamp};

use crate::error::{Error, Result};

/// Column names used when exporting.
pub const EXPORT_HEADER: [&str; 3] = ["data_hora", "temperatura", "umidade"];

/// Sample times may omit the seconds or carry a fraction of a second.
const SAMPLE_TIME: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute][optional [:[second][optional [.[subsecond]]]]]"
);
const SAMPLE_TIME_ISO: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute][optional [:[second][optional [.[subsecond]]]]]"
);

/// A parsed sensor log, sorted by timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorLog {
    readings: Vec<SensorReading>,
    skipped: usize,
}

/// Read the log at `path`. A missing file is an empty log.
pub fn read_log(path: impl AsRef<Path>) -> Result<SensorLog> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No sensor log at {}", path.display());
            return Ok(SensorLog::default());
        }
        Err(e) => return Err(e.into()),
    };

    let log = SensorLog::from_reader(file).map_err(|e| match e {
        Error::SensorLog { source, .. } => Error::SensorLog {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;

    if log.skipped > 0 {
        warn!(
            "Skipped {} malformed rows in {}",
            log.skipped,
            path.display()
        );
    }
    debug!("Read {} samples from {}", log.len(), path.display());
    Ok(log)
}

fn parse_row(row: &StringRecord) -> Option<SensorReading> {
    if row.len() < 3 {
        return None;
    }
    Some(SensorReading {
        timestamp: parse_sample_time(row.get(0)?)?,
        temperature: row.get(1)?.parse().ok()?,
        humidity: row.get(2)?.parse().ok()?,
    })
}

fn parse_sample_time(s: &str) -> Option<PrimitiveDateTime> {
    timestamp::parse(s)
        .ok()
        .or_else(|| PrimitiveDateTime::parse(s, SAMPLE_TIME).ok())
        .or_else(|| PrimitiveDateTime::parse(s, SAMPLE_TIME_ISO).ok())
}

fn is_header(row: &StringRecord) -> bool {
    row.get(0)
        .is_some_and(|first| first.eq_ignore_ascii_case(EXPORT_HEADER[0]))
}

impl SensorLog {
    /// Parse a log from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut readings = Vec::new();
        let mut skipped = 0;

        for (index, row) in csv.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) if e.is_io_error() => {
                    return Err(Error::SensorLog {
                        path: Default::default(),
                        source: e,
                    });
                }
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };

            if index == 0 && is_header(&row) {
                continue;
            }
            if row.iter().all(str::is_empty) {
                continue;
            }

            match parse_row(&row) {
                Some(reading) => readings.push(reading),
                None => skipped += 1,
            }
        }

        Ok(Self::new(readings, skipped))
    }

    /// Build a log from readings in any order.
    pub fn new(mut readings: Vec<SensorReading>, skipped: usize) -> Self {
        readings.sort_by_key(|r| r.timestamp);
        Self { readings, skipped }
    }

    pub fn readings(&self) -> &[SensorReading] {
        &self.readings
    }

    /// Rows that could not be parsed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Keep only samples taken at or after `since`.
    #[must_use]
    pub fn since(mut self, since: PrimitiveDateTime) -> Self {
        self.readings.retain(|r| r.timestamp >= since);
        self
    }

    /// Keep only the newest `n` samples.
    #[must_use]
    pub fn tail(mut self, n: usize) -> Self {
        let start = self.readings.len().saturating_sub(n);
        self.readings.drain(..start);
        self
    }

    /// Aggregate the log. With `bounds`, also count samples outside the
    /// species' ideal ranges. `None` for an empty log.
    pub fn summary(&self, bounds: Option<&Species>) -> Option<SensorSummary> {
        let first = self.readings.first()?;
        let last = self.readings.last()?;

        let out_of_range = bounds.map(|species| OutOfRange {
            temperature: self
                .readings
                .iter()
                .filter(|r| !species.temperature_ok(r.temperature))
                .count(),
            humidity: self
                .readings
                .iter()
                .filter(|r| !species.humidity_ok(r.humidity))
                .count(),
        });

        Some(SensorSummary {
            count: self.readings.len(),
            first: first.timestamp,
            last: last.timestamp,
            temperature: Stats::of(self.readings.iter().map(|r| r.temperature))?,
            humidity: Stats::of(self.readings.iter().map(|r| r.humidity))?,
            out_of_range,
        })
    }

    /// Write the samples as CSV with a `data_hora,temperatura,umidade` header.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(EXPORT_HEADER).map_err(csv_write_error)?;
        for reading in &self.readings {
            csv.write_record([
                timestamp::format(reading.timestamp),
                reading.temperature.to_string(),
                reading.humidity.to_string(),
            ])
            .map_err(csv_write_error)?;
        }
        csv.flush()?;
        Ok(())
    }

    /// The samples as a pretty-printed JSON array.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.readings)?)
    }
}

fn csv_write_error(e: csv::Error) -> Error {
    Error::SensorLog {
        path: Default::default(),
        source: e,
    }
}

/// Min/max/mean of one quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub min: f32,
    pub max: f32,
    pub avg: f32,
}

impl Stats {
    fn of(values: impl Iterator<Item = f32>) -> Option<Self> {
        let mut count = 0u32;
        let mut sum = 0.0f64;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for v in values {
            count += 1;
            sum += f64::from(v);
            min = min.min(v);
            max = max.max(v);
        }
        (count > 0).then(|| Self {
            min,
            max,
            avg: (sum / f64::from(count)) as f32,
        })
    }
}

/// Samples outside a species' ideal ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutOfRange {
    pub temperature: usize,
    pub humidity: usize,
}

/// Aggregate view of a sensor log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSummary {
    pub count: usize,
    #[serde(with = "incubator_types::timestamp::text")]
    pub first: PrimitiveDateTime,
    #[serde(with = "incubator_types::timestamp::text")]
    pub last: PrimitiveDateTime,
    pub temperature: Stats,
    pub humidity: Stats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_of_range: Option<OutOfRange>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const LOG: &str = "\
2024-01-02 10:05:00,37.9,57.0
2024-01-02 10:00:00,37.7,58.0
2024-01-02T10:10:00,38.4,66.0
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
    fn test_rows_sorted_by_timestamp() {
        let log = SensorLog::from_reader(LOG.as_bytes()).unwrap();

        assert_eq!(log.len(), 3);
        assert_eq!(log.skipped(), 0);
        let times: Vec<_> = log.readings().iter().map(|r| r.timestamp).collect();
        assert_eq!(
            times,
            [
                datetime!(2024-01-02 10:00:00),
                datetime!(2024-01-02 10:05:00),
                datetime!(2024-01-02 10:10:00),
            ]
        );
    }

    #[test]
    fn test_header_row_is_tolerated() {
        let input = format!("data_hora,temperatura,umidade\n{}", LOG);
        let log = SensorLog::from_reader(input.as_bytes()).unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log.skipped(), 0);
    }

    #[test]
    fn test_malformed_rows_are_counted() {
        let input = "\
2024-01-02 10:00:00,37.7,58.0
garbage
2024-01-02 10:05:00,hot,58.0
02/01/2024 10:10,37.7,58.0
2024-01-02 10:15:00,37.8,57.0
";
        let log = SensorLog::from_reader(input.as_bytes()).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.skipped(), 3);
    }

    #[test]
    fn test_short_and_fractional_times() {
        let input = "\
2024-01-02 10:00,37.7,58.0
2024-01-02 10:05:30.250,37.8,57.5
2024-01-02T10:10,37.6,58.5
";
        let log = SensorLog::from_reader(input.as_bytes()).unwrap();
        assert_eq!(log.skipped(), 0);
        let times: Vec<_> = log.readings().iter().map(|r| r.timestamp).collect();
        assert_eq!(
            times,
            [
                datetime!(2024-01-02 10:00:00),
                datetime!(2024-01-02 10:05:30.25),
                datetime!(2024-01-02 10:10:00),
            ]
        );
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = read_log(dir.path().join("dados.csv")).unwrap();
        assert!(log.is_empty());
        assert!(log.summary(None).is_none());
    }

    #[test]
    fn test_read_log_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dados.csv");
        std::fs::write(&path, LOG).unwrap();

        let log = read_log(&path).unwrap();
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_summary_with_bounds() {
        let log = SensorLog::from_reader(LOG.as_bytes()).unwrap();
        let summary = log.summary(Some(&hen())).unwrap();

        assert_eq!(summary.count, 3);
        assert_eq!(summary.first, datetime!(2024-01-02 10:00:00));
        assert_eq!(summary.last, datetime!(2024-01-02 10:10:00));
        assert!((summary.temperature.min - 37.7).abs() < 1e-4);
        assert!((summary.temperature.max - 38.4).abs() < 1e-4);
        assert!((summary.humidity.avg - 60.333).abs() < 1e-2);
        assert_eq!(
            summary.out_of_range,
            Some(OutOfRange {
                temperature: 1,
                humidity: 1,
            })
        );
    }

    #[test]
    fn test_summary_without_bounds() {
        let log = SensorLog::from_reader(LOG.as_bytes()).unwrap();
        assert!(log.summary(None).unwrap().out_of_range.is_none());
    }

    #[test]
    fn test_tail_and_since() {
        let log = SensorLog::from_reader(LOG.as_bytes()).unwrap();

        let last_two = log.clone().tail(2);
        assert_eq!(last_two.len(), 2);
        assert_eq!(
            last_two.readings()[0].timestamp,
            datetime!(2024-01-02 10:05:00)
        );

        let recent = log.since(datetime!(2024-01-02 10:06:00));
        assert_eq!(recent.len(), 1);
    }

    #[test]
    fn test_write_csv_has_header() {
        let log = SensorLog::from_reader(LOG.as_bytes()).unwrap();
        let mut out = Vec::new();
        log.write_csv(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("data_hora,temperatura,umidade"));
        assert_eq!(lines.next(), Some("2024-01-02 10:00:00,37.7,58"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_to_json_uses_export_names() {
        let log = SensorLog::from_reader(LOG.as_bytes()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&log.to_json().unwrap()).unwrap();

        assert_eq!(json.as_array().unwrap().len(), 3);
        assert_eq!(json[0]["data_hora"], "2024-01-02 10:00:00");
        assert!(json[0]["temperatura"].is_number());
    }
}
