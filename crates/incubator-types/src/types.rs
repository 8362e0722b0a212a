//! Core types for incubation records.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::{Duration, PrimitiveDateTime};

use crate::error::{ValidationError, ValidationResult};

const SECONDS_PER_DAY: i64 = 86_400;

/// A bird species and its ideal incubation parameters.
///
/// Field names on the wire follow the catalog file (`nome`, `dias`,
/// `umid_min`, `umid_max`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Species {
    /// Display name, used as the lookup key.
    #[cfg_attr(feature = "serde", serde(rename = "nome"))]
    pub name: String,
    /// Incubation length in days.
    #[cfg_attr(feature = "serde", serde(rename = "dias"))]
    pub incubation_days: u32,
    /// Minimum ideal temperature in Celsius.
    pub temp_min: f32,
    /// Maximum ideal temperature in Celsius.
    pub temp_max: f32,
    /// Minimum ideal relative humidity in percent.
    #[cfg_attr(feature = "serde", serde(rename = "umid_min"))]
    pub humidity_min: f32,
    /// Maximum ideal relative humidity in percent.
    #[cfg_attr(feature = "serde", serde(rename = "umid_max"))]
    pub humidity_max: f32,
}

impl Species {
    /// Check that both ranges are ordered and the duration is non-zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use incubator_types::Species;
    ///
    /// let hen = Species {
    ///     name: "Galinha".to_string(),
    ///     incubation_days: 21,
    ///     temp_min: 37.5,
    ///     temp_max: 38.0,
    ///     humidity_min: 55.0,
    ///     humidity_max: 65.0,
    /// };
    /// assert!(hen.validate().is_ok());
    /// ```
    pub fn validate(&self) -> ValidationResult<()> {
        if self.incubation_days == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        if self.temp_min > self.temp_max {
            return Err(ValidationError::InvertedRange {
                quantity: "temperature",
                min: self.temp_min,
                max: self.temp_max,
            });
        }
        if self.humidity_min > self.humidity_max {
            return Err(ValidationError::InvertedRange {
                quantity: "humidity",
                min: self.humidity_min,
                max: self.humidity_max,
            });
        }
        Ok(())
    }

    /// Whether a temperature lies inside the ideal range.
    #[must_use]
    pub fn temperature_ok(&self, celsius: f32) -> bool {
        (self.temp_min..=self.temp_max).contains(&celsius)
    }

    /// Whether a humidity lies inside the ideal range.
    #[must_use]
    pub fn humidity_ok(&self, percent: f32) -> bool {
        (self.humidity_min..=self.humidity_max).contains(&percent)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} days, {}-{} °C, {}-{} %RH)",
            self.name,
            self.incubation_days,
            self.temp_min,
            self.temp_max,
            self.humidity_min,
            self.humidity_max
        )
    }
}

/// The single in-progress incubation cycle.
///
/// Invariants (checked by [`Incubation::validate`]):
/// - `fertility_check_count`, when set, is at most `egg_count`
/// - `hatched_count`, when set, is at most [`Incubation::max_hatched`]
/// - `ended_at` is set only together with `hatched_count`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Incubation {
    /// When the cycle was started.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "inicio", with = "crate::timestamp::text")
    )]
    pub started_at: PrimitiveDateTime,
    /// Number of eggs set.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "ovos", deserialize_with = "crate::timestamp::count::required")
    )]
    pub egg_count: u32,
    /// Species name as found in the catalog at start time.
    #[cfg_attr(feature = "serde", serde(rename = "raca"))]
    pub species_name: String,
    /// Free-text notes.
    #[cfg_attr(feature = "serde", serde(rename = "observacoes", default))]
    pub notes: String,
    /// Eggs still fertile after the candling check.
    #[cfg_attr(
        feature = "serde",
        serde(
            rename = "ovoscopia",
            default,
            deserialize_with = "crate::timestamp::count::optional"
        )
    )]
    pub fertility_check_count: Option<u32>,
    /// Chicks hatched.
    #[cfg_attr(
        feature = "serde",
        serde(
            rename = "nascimentos",
            default,
            deserialize_with = "crate::timestamp::count::optional"
        )
    )]
    pub hatched_count: Option<u32>,
    /// When the hatch count was recorded.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "fim", default, with = "crate::timestamp::text::option")
    )]
    pub ended_at: Option<PrimitiveDateTime>,
    /// Incubation length copied from the species.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "dias", deserialize_with = "crate::timestamp::count::required")
    )]
    pub duration_days: u32,
}

impl Incubation {
    /// Start a new record for `species` with empty fertility and hatch fields.
    pub fn new(
        species: &Species,
        egg_count: u32,
        notes: impl Into<String>,
        started_at: PrimitiveDateTime,
    ) -> ValidationResult<Self> {
        if egg_count == 0 {
            return Err(ValidationError::NoEggs);
        }
        Ok(Self {
            started_at,
            egg_count,
            species_name: species.name.clone(),
            notes: notes.into(),
            fertility_check_count: None,
            hatched_count: None,
            ended_at: None,
            duration_days: species.incubation_days,
        })
    }

    /// The moment the incubation period ends.
    #[must_use]
    pub fn expected_end(&self) -> PrimitiveDateTime {
        self.started_at
            .saturating_add(Duration::days(i64::from(self.duration_days)))
    }

    /// `started_at + duration_days - now`. Zero or negative once the period is over.
    #[must_use]
    pub fn remaining(&self, now: PrimitiveDateTime) -> Duration {
        self.expected_end() - now
    }

    /// Whole days since start, rounded down (negative if `now` precedes the start).
    #[must_use]
    pub fn days_elapsed(&self, now: PrimitiveDateTime) -> i64 {
        (now - self.started_at)
            .whole_seconds()
            .div_euclid(SECONDS_PER_DAY)
    }

    /// Upper bound for the fertility check count.
    #[must_use]
    pub fn max_fertile(&self) -> u32 {
        self.egg_count
    }

    /// Upper bound for the hatch count: the fertile count if recorded, else the egg count.
    #[must_use]
    pub fn max_hatched(&self) -> u32 {
        self.fertility_check_count.unwrap_or(self.egg_count)
    }

    /// Reject a fertility count above the egg count.
    pub fn check_fertility_count(&self, count: u32) -> ValidationResult<()> {
        bounded("fertility check count", count, self.max_fertile())
    }

    /// Reject a hatch count above [`Incubation::max_hatched`].
    pub fn check_hatch_count(&self, count: u32) -> ValidationResult<()> {
        bounded("hatched count", count, self.max_hatched())
    }

    /// Verify the record invariants.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.egg_count == 0 {
            return Err(ValidationError::NoEggs);
        }
        if let Some(fertile) = self.fertility_check_count {
            self.check_fertility_count(fertile)?;
        }
        match (self.hatched_count, self.ended_at) {
            (Some(hatched), _) => self.check_hatch_count(hatched),
            (None, Some(_)) => Err(ValidationError::EndedWithoutHatch),
            (None, None) => Ok(()),
        }
    }

    /// Record the hatch count and produce the terminal snapshot.
    pub fn complete(
        &self,
        hatched_count: u32,
        ended_at: PrimitiveDateTime,
    ) -> ValidationResult<CompletedIncubation> {
        self.check_hatch_count(hatched_count)?;
        Ok(CompletedIncubation {
            started_at: self.started_at,
            egg_count: self.egg_count,
            species_name: self.species_name.clone(),
            notes: self.notes.clone(),
            fertility_check_count: self.fertility_check_count,
            hatched_count,
            ended_at,
            duration_days: self.duration_days,
        })
    }
}

fn bounded(field: &'static str, value: u32, max: u32) -> ValidationResult<()> {
    if value > max {
        Err(ValidationError::InputOutOfRange { field, value, max })
    } else {
        Ok(())
    }
}

/// A finished cycle as kept in the history archive.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompletedIncubation {
    #[cfg_attr(
        feature = "serde",
        serde(rename = "inicio", with = "crate::timestamp::text")
    )]
    pub started_at: PrimitiveDateTime,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "ovos", deserialize_with = "crate::timestamp::count::required")
    )]
    pub egg_count: u32,
    #[cfg_attr(feature = "serde", serde(rename = "raca"))]
    pub species_name: String,
    #[cfg_attr(feature = "serde", serde(rename = "observacoes", default))]
    pub notes: String,
    #[cfg_attr(
        feature = "serde",
        serde(
            rename = "ovoscopia",
            default,
            deserialize_with = "crate::timestamp::count::optional"
        )
    )]
    pub fertility_check_count: Option<u32>,
    #[cfg_attr(
        feature = "serde",
        serde(
            rename = "nascimentos",
            deserialize_with = "crate::timestamp::count::required"
        )
    )]
    pub hatched_count: u32,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "fim", with = "crate::timestamp::text")
    )]
    pub ended_at: PrimitiveDateTime,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "dias", deserialize_with = "crate::timestamp::count::required")
    )]
    pub duration_days: u32,
}

impl CompletedIncubation {
    /// Share of set eggs that hatched, in percent.
    #[must_use]
    pub fn hatch_rate(&self) -> f32 {
        if self.egg_count == 0 {
            0.0
        } else {
            self.hatched_count as f32 * 100.0 / self.egg_count as f32
        }
    }

    /// Verify the same invariants as [`Incubation::validate`].
    pub fn validate(&self) -> ValidationResult<()> {
        Incubation::from(self.clone()).validate()
    }

    /// Whether this snapshot was taken from `active` (all fields equal).
    #[must_use]
    pub fn is_snapshot_of(&self, active: &Incubation) -> bool {
        active.hatched_count == Some(self.hatched_count)
            && active.ended_at == Some(self.ended_at)
            && active.started_at == self.started_at
            && active.egg_count == self.egg_count
            && active.species_name == self.species_name
            && active.notes == self.notes
            && active.fertility_check_count == self.fertility_check_count
            && active.duration_days == self.duration_days
    }
}

impl TryFrom<Incubation> for CompletedIncubation {
    type Error = ValidationError;

    /// Convert a record that already carries its hatch count and end time.
    fn try_from(record: Incubation) -> Result<Self, Self::Error> {
        record.validate()?;
        match (record.hatched_count, record.ended_at) {
            (Some(hatched), Some(ended_at)) => record.complete(hatched, ended_at),
            _ => Err(ValidationError::NotCompleted),
        }
    }
}

impl From<CompletedIncubation> for Incubation {
    fn from(done: CompletedIncubation) -> Self {
        Self {
            started_at: done.started_at,
            egg_count: done.egg_count,
            species_name: done.species_name,
            notes: done.notes,
            fertility_check_count: done.fertility_check_count,
            hatched_count: Some(done.hatched_count),
            ended_at: Some(done.ended_at),
            duration_days: done.duration_days,
        }
    }
}

/// One temperature/humidity sample from the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorReading {
    /// When the sample was taken.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "data_hora", with = "crate::timestamp::text")
    )]
    pub timestamp: PrimitiveDateTime,
    /// Temperature in Celsius.
    #[cfg_attr(feature = "serde", serde(rename = "temperatura"))]
    pub temperature: f32,
    /// Relative humidity in percent.
    #[cfg_attr(feature = "serde", serde(rename = "umidade"))]
    pub humidity: f32,
}
