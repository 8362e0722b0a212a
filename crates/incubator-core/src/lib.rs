//! Core library for the egg incubation tracker.
//!
//! This crate drives a single incubation cycle from start to hatch, and
//! talks to the incubator controller.
//!
//! # Features
//!
//! - **Species catalog**: read-only list of species and their ideal parameters
//! - **Controller notifier**: one-shot HTTP push of temperature/humidity setpoints
//! - **Lifecycle**: start, day-7 fertility check, hatch count and archival
//! - **Sensor log**: read, summarize and export the controller's telemetry
//!
//! Persistence is abstracted behind [`IncubationRepository`]; the SQLite
//! implementation lives in `incubator-store`.
//!
//! # Quick Start
//!
//! ```no_run
//! use incubator_core::{Catalog, HttpNotifier, Lifecycle, MemoryRepository};
//! use incubator_core::notifier::{DEFAULT_ADDRESS, DEFAULT_TIMEOUT};
//! use time::macros::datetime;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Catalog::load("aves.json")?;
//!     let notifier = HttpNotifier::new(DEFAULT_ADDRESS, DEFAULT_TIMEOUT)?;
//!     let lifecycle = Lifecycle::new(MemoryRepository::new(), notifier, catalog);
//!
//!     let started = lifecycle
//!         .start("Galinha", 12, "", datetime!(2024-01-01 00:00:00))
//!         .await?;
//!     println!("Controller updated: {}", started.pushed);
//!
//!     let (_, phase) = lifecycle.status(datetime!(2024-01-08 00:00:00))?;
//!     println!("{}", phase);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod lifecycle;
pub mod mock;
pub mod notifier;
pub mod sensors;
pub mod traits;

// Re-export the record types for convenience
pub use incubator_types::types;
pub use incubator_types::{CompletedIncubation, Incubation, SensorReading, Species};

pub use catalog::Catalog;
pub use error::{CatalogUnavailable, Error, Result};
pub use lifecycle::{FertilityCheckPolicy, Lifecycle, Phase, Recovery, Started, phase};
pub use mock::{MemoryRepository, MockNotifier};
pub use notifier::{ControllerConfig, DeviceNotifier, HttpNotifier, PushError};
pub use sensors::{SensorLog, SensorSummary, read_log};
pub use traits::IncubationRepository;
