//! Local persistence for the egg incubation tracker.
//!
//! This crate provides SQLite-based storage for the single active
//! incubation and the append-only archive of completed cycles.
//!
//! # Features
//!
//! - Singleton active record (load, overwrite, clear)
//! - Ordered history of completed cycles
//! - Atomic archival (history insert and active delete in one transaction)
//! - JSON/CSV export and import of the history
//! - Import of the legacy `incubacao_atual.csv` active record
//!
//! # Example
//!
//! ```no_run
//! use incubator_core::IncubationRepository;
//! use incubator_store::Store;
//!
//! let store = Store::open_default()?;
//!
//! for record in store.load_history()? {
//!     println!("{}: {} of {} hatched", record.species_name, record.hatched_count, record.egg_count);
//! }
//! # Ok::<(), incubator_core::Error>(())
//! ```

mod error;
mod models;
mod schema;
mod store;

pub use error::{Error, Result};
pub use store::{HistoryStats, ImportResult, Store};

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/incubator/incubator.db`
/// - macOS: `~/Library/Application Support/incubator/incubator.db`
/// - Windows: `C:\Users\<user>\AppData\Local\incubator\incubator.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("incubator")
        .join("incubator.db")
}
