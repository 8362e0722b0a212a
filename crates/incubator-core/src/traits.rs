//! Persistence abstraction for incubation records.
//!
//! [`IncubationRepository`] lets the lifecycle run against the SQLite store
//! in production and an in-memory repository in tests.

use incubator_types::{CompletedIncubation, Incubation};

use crate::error::Result;

/// Storage for the single active record and the append-only history.
///
/// # Example
///
/// ```ignore
/// use incubator_core::{IncubationRepository, Result};
///
/// fn hatched_total<R: IncubationRepository>(repo: &R) -> Result<u32> {
///     Ok(repo.load_history()?.iter().map(|r| r.hatched_count).sum())
/// }
/// ```
pub trait IncubationRepository {
    // --- Active record ---

    /// Load the active record, if any.
    fn load_active(&self) -> Result<Option<Incubation>>;

    /// Replace the active record. Last writer wins.
    fn save_active(&self, record: &Incubation) -> Result<()>;

    /// Remove the active record. A no-op when there is none.
    fn clear_active(&self) -> Result<()>;

    // --- History ---

    /// All completed cycles in insertion order.
    fn load_history(&self) -> Result<Vec<CompletedIncubation>>;

    /// Append one completed cycle.
    fn append_history(&self, record: &CompletedIncubation) -> Result<()>;

    /// Append `record` to the history and clear the active record as one unit.
    ///
    /// Either both happen or neither does.
    fn archive(&self, record: &CompletedIncubation) -> Result<()>;
}
