//! Row models for stored records.

use rusqlite::Row;

use incubator_types::{CompletedIncubation, Incubation, timestamp};

/// Column list shared by both record tables, in [`RecordRow::from_row`] order.
/// The row id comes first and is read by the caller.
pub(crate) const RECORD_COLUMNS: &str = "id, started_at, egg_count, species_name, notes, \
     fertility_check_count, hatched_count, ended_at, duration_days";

/// A record row as stored, before decoding.
#[derive(Debug, Clone)]
pub(crate) struct RecordRow {
    pub started_at: String,
    pub egg_count: i64,
    pub species_name: String,
    pub notes: String,
    pub fertility_check_count: Option<i64>,
    pub hatched_count: Option<i64>,
    pub ended_at: Option<String>,
    pub duration_days: i64,
}

/// Which field failed to decode, and why.
pub(crate) type DecodeError = (&'static str, String);

impl RecordRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            started_at: row.get(1)?,
            egg_count: row.get(2)?,
            species_name: row.get(3)?,
            notes: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            fertility_check_count: row.get(5)?,
            hatched_count: row.get(6)?,
            ended_at: row.get(7)?,
            duration_days: row.get(8)?,
        })
    }

    /// Decode into an [`Incubation`] and check its invariants.
    pub fn into_incubation(self) -> Result<Incubation, DecodeError> {
        let record = Incubation {
            started_at: parse_time("started_at", &self.started_at)?,
            egg_count: count("egg_count", self.egg_count)?,
            species_name: self.species_name,
            notes: self.notes,
            fertility_check_count: self
                .fertility_check_count
                .map(|v| count("fertility_check_count", v))
                .transpose()?,
            hatched_count: self
                .hatched_count
                .map(|v| count("hatched_count", v))
                .transpose()?,
            ended_at: self
                .ended_at
                .as_deref()
                .map(|s| parse_time("ended_at", s))
                .transpose()?,
            duration_days: count("duration_days", self.duration_days)?,
        };

        record.validate().map_err(|e| ("record", e.to_string()))?;
        Ok(record)
    }

    /// Decode into a [`CompletedIncubation`]; hatch count and end time are required.
    pub fn into_completed(self) -> Result<CompletedIncubation, DecodeError> {
        let record = self.into_incubation()?;
        CompletedIncubation::try_from(record).map_err(|e| ("record", e.to_string()))
    }
}

fn count(field: &'static str, value: i64) -> Result<u32, DecodeError> {
    u32::try_from(value).map_err(|_| (field, format!("{} is not a valid count", value)))
}

fn parse_time(field: &'static str, value: &str) -> Result<time::PrimitiveDateTime, DecodeError> {
    timestamp::parse(value).map_err(|e| (field, e.to_string()))
}
