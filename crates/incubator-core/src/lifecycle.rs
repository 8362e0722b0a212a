//! Incubation lifecycle.
//!
//! A cycle moves through these phases:
//!
//! ```text
//! NoActiveCycle --start--> InProgress --day 7--> AwaitingFertilityCheck
//!                              ^                        |
//!                              +----fertility check-----+
//! InProgress --period over--> AwaitingHatchCount --hatch--> archived (NoActiveCycle)
//! ```
//!
//! The phase is never stored; [`phase`] derives it from the active record and
//! the current time on every call.

use core::fmt;

use time::{Duration, PrimitiveDateTime};
use tracing::{debug, info, warn};

use incubator_types::{CompletedIncubation, Incubation, timestamp};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::notifier::{ControllerConfig, DeviceNotifier};
use crate::traits::IncubationRepository;

/// Day on which the fertility check is offered by default.
pub const DEFAULT_FERTILITY_CHECK_DAY: u32 = 7;

/// When the fertility check is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FertilityCheckPolicy {
    /// Only while the elapsed whole days equal the given day.
    ExactDay(u32),
    /// From the given day until the period ends.
    OnOrAfterDay(u32),
}

impl Default for FertilityCheckPolicy {
    fn default() -> Self {
        Self::ExactDay(DEFAULT_FERTILITY_CHECK_DAY)
    }
}

impl FertilityCheckPolicy {
    fn is_due(self, days_elapsed: i64) -> bool {
        match self {
            Self::ExactDay(day) => days_elapsed == i64::from(day),
            Self::OnOrAfterDay(day) => days_elapsed >= i64::from(day),
        }
    }
}

/// The derived state of the active cycle at a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing is being incubated.
    NoActiveCycle,
    /// The hatch count is already on the active record.
    ///
    /// Only seen when a previous finalize was interrupted; see
    /// [`Lifecycle::recover`].
    Hatched { hatched: u32 },
    /// Counting down, nothing to record.
    InProgress {
        days_elapsed: i64,
        remaining: Duration,
    },
    /// The fertility check can be recorded now.
    AwaitingFertilityCheck {
        days_elapsed: i64,
        remaining: Duration,
        max_fertile: u32,
    },
    /// The period is over and the hatch count can be recorded.
    AwaitingHatchCount { max_hatched: u32 },
}

impl Phase {
    /// Short label, as used in logs and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoActiveCycle => "no active cycle",
            Self::Hatched { .. } => "hatched",
            Self::InProgress { .. } => "in progress",
            Self::AwaitingFertilityCheck { .. } => "awaiting fertility check",
            Self::AwaitingHatchCount { .. } => "awaiting hatch count",
        }
    }

    /// Time left until the expected hatch, while the period is running.
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            Self::InProgress { remaining, .. } | Self::AwaitingFertilityCheck { remaining, .. } => {
                Some(*remaining)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress {
                days_elapsed,
                remaining,
            }
            | Self::AwaitingFertilityCheck {
                days_elapsed,
                remaining,
                ..
            } => write!(
                f,
                "{} (day {}, {} remaining)",
                self.label(),
                days_elapsed,
                format_remaining(*remaining)
            ),
            Self::Hatched { hatched } => write!(f, "{} ({} hatched)", self.label(), hatched),
            _ => f.write_str(self.label()),
        }
    }
}

/// Format a positive duration as `{d}d {h}h {m}min`.
pub fn format_remaining(remaining: Duration) -> String {
    let minutes = remaining.whole_minutes().max(0);
    format!(
        "{}d {}h {}min",
        minutes / (24 * 60),
        (minutes / 60) % 24,
        minutes % 60
    )
}

/// Derive the phase of `record` at `now`.
///
/// # Examples
///
/// ```
/// use incubator_core::lifecycle::{phase, FertilityCheckPolicy, Phase};
/// use incubator_types::{Incubation, Species};
/// use time::macros::datetime;
///
/// let hen = Species {
///     name: "Galinha".to_string(),
///     incubation_days: 21,
///     temp_min: 37.5,
///     temp_max: 38.0,
///     humidity_min: 55.0,
///     humidity_max: 65.0,
/// };
/// let record = Incubation::new(&hen, 12, "", datetime!(2024-01-01 00:00:00)).unwrap();
///
/// let now = datetime!(2024-01-08 00:00:00);
/// assert!(matches!(
///     phase(Some(&record), now, FertilityCheckPolicy::default()),
///     Phase::AwaitingFertilityCheck { max_fertile: 12, .. }
/// ));
/// ```
pub fn phase(
    record: Option<&Incubation>,
    now: PrimitiveDateTime,
    policy: FertilityCheckPolicy,
) -> Phase {
    let Some(record) = record else {
        return Phase::NoActiveCycle;
    };

    if let Some(hatched) = record.hatched_count {
        return Phase::Hatched { hatched };
    }

    let remaining = record.remaining(now);
    if !remaining.is_positive() {
        return Phase::AwaitingHatchCount {
            max_hatched: record.max_hatched(),
        };
    }

    let days_elapsed = record.days_elapsed(now);
    if record.fertility_check_count.is_none() && policy.is_due(days_elapsed) {
        Phase::AwaitingFertilityCheck {
            days_elapsed,
            remaining,
            max_fertile: record.max_fertile(),
        }
    } else {
        Phase::InProgress {
            days_elapsed,
            remaining,
        }
    }
}

/// Result of [`Lifecycle::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Started {
    /// The record as persisted.
    pub record: Incubation,
    /// Whether the controller accepted the new setpoints.
    pub pushed: bool,
}

/// What [`Lifecycle::recover`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// The active record was consistent; nothing changed.
    Nothing,
    /// The hatched record was already archived; the stale copy was removed.
    ClearedDuplicate,
    /// The hatched record was not archived yet; it has been now.
    Archived,
}

/// Drives the active cycle through its phases.
///
/// Every operation reloads the record from the repository, so a `Lifecycle`
/// holds no cycle state of its own.
pub struct Lifecycle<R, N> {
    repo: R,
    notifier: N,
    catalog: Catalog,
    policy: FertilityCheckPolicy,
}

impl<R: IncubationRepository, N: DeviceNotifier> Lifecycle<R, N> {
    pub fn new(repo: R, notifier: N, catalog: Catalog) -> Self {
        Self {
            repo,
            notifier,
            catalog,
            policy: FertilityCheckPolicy::default(),
        }
    }

    /// Use a different fertility check policy.
    #[must_use]
    pub fn with_policy(mut self, policy: FertilityCheckPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn policy(&self) -> FertilityCheckPolicy {
        self.policy
    }

    /// Start a new cycle and push the species' setpoints to the controller.
    ///
    /// The record is persisted before the push, and a failed push does not
    /// undo it; check [`Started::pushed`].
    pub async fn start(
        &self,
        species_name: &str,
        egg_count: u32,
        notes: &str,
        now: PrimitiveDateTime,
    ) -> Result<Started> {
        if let Some(active) = self.repo.load_active()? {
            return Err(Error::AlreadyActive {
                species: active.species_name,
                started_at: timestamp::format(active.started_at),
            });
        }

        let species = self
            .catalog
            .find_by_name(species_name)
            .ok_or_else(|| Error::UnknownSpecies(species_name.to_string()))?;

        let record = Incubation::new(species, egg_count, notes, now)?;
        self.repo.save_active(&record)?;
        info!(
            "Started incubation of {} {} eggs, expected end {}",
            record.egg_count,
            record.species_name,
            timestamp::format(record.expected_end())
        );

        let pushed = self
            .notifier
            .push_config(&ControllerConfig::from(species))
            .await;
        if !pushed {
            warn!("Controller did not accept the setpoints; use `push` to retry");
        }

        Ok(Started { record, pushed })
    }

    /// The active record (if any) and its phase at `now`.
    pub fn status(&self, now: PrimitiveDateTime) -> Result<(Option<Incubation>, Phase)> {
        let record = self.repo.load_active()?;
        let phase = phase(record.as_ref(), now, self.policy);
        debug!("Phase at {}: {}", timestamp::format(now), phase);
        Ok((record, phase))
    }

    /// Record how many eggs are still fertile after candling.
    pub fn record_fertility_check(&self, count: u32, now: PrimitiveDateTime) -> Result<Incubation> {
        let mut record = self.repo.load_active()?.ok_or(Error::NoActiveCycle)?;

        let current = phase(Some(&record), now, self.policy);
        if !matches!(current, Phase::AwaitingFertilityCheck { .. }) {
            return Err(Error::not_awaiting("awaiting fertility check", current));
        }

        record.check_fertility_count(count)?;
        record.fertility_check_count = Some(count);
        self.repo.save_active(&record)?;
        info!(
            "Fertility check recorded: {} of {} eggs fertile",
            count, record.egg_count
        );

        Ok(record)
    }

    /// Record the hatch count and archive the cycle.
    ///
    /// The history append and the removal of the active record happen in one
    /// repository call.
    pub fn record_hatch(&self, count: u32, now: PrimitiveDateTime) -> Result<CompletedIncubation> {
        let record = self.repo.load_active()?.ok_or(Error::NoActiveCycle)?;

        let current = phase(Some(&record), now, self.policy);
        if !matches!(current, Phase::AwaitingHatchCount { .. }) {
            return Err(Error::not_awaiting("awaiting hatch count", current));
        }

        let completed = record.complete(count, now)?;
        self.repo.archive(&completed)?;
        info!(
            "Incubation of {} finished: {} of {} hatched ({:.1}%)",
            completed.species_name,
            completed.hatched_count,
            completed.egg_count,
            completed.hatch_rate()
        );

        Ok(completed)
    }

    /// Push the active cycle's setpoints again.
    pub async fn resend_config(&self) -> Result<bool> {
        let record = self.repo.load_active()?.ok_or(Error::NoActiveCycle)?;
        let species = self
            .catalog
            .find_by_name(&record.species_name)
            .ok_or_else(|| Error::UnknownSpecies(record.species_name.clone()))?;

        Ok(self
            .notifier
            .push_config(&ControllerConfig::from(species))
            .await)
    }

    /// Repair an active record left behind by an interrupted finalize.
    ///
    /// A record that already carries a hatch count should not be active. If
    /// the last history entry is the same cycle, the stale record is removed;
    /// otherwise the record is archived. A hatch count without an end time
    /// (legacy imports) is left alone and only reported by `status`.
    pub fn recover(&self) -> Result<Recovery> {
        let Some(record) = self.repo.load_active()? else {
            return Ok(Recovery::Nothing);
        };
        if record.hatched_count.is_none() {
            return Ok(Recovery::Nothing);
        }
        if record.ended_at.is_none() {
            warn!("Active record has a hatch count but no end time; leaving it in place");
            return Ok(Recovery::Nothing);
        }

        let history = self.repo.load_history()?;
        if history.last().is_some_and(|last| last.is_snapshot_of(&record)) {
            self.repo.clear_active()?;
            warn!("Removed active record already present in history");
            return Ok(Recovery::ClearedDuplicate);
        }

        let completed = CompletedIncubation::try_from(record)?;
        self.repo.archive(&completed)?;
        warn!("Archived a hatched record that was still marked active");
        Ok(Recovery::Archived)
    }
}
