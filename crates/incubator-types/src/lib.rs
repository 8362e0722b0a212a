//! Shared types for the egg incubation tracker.
//!
//! This crate provides the record types used by the lifecycle
//! (incubator-core), the persistence layer (incubator-store) and the CLI.
//!
//! # Features
//!
//! - Species parameters from the catalog
//! - The active incubation record and its invariants
//! - Completed snapshots kept in the history archive
//! - Sensor samples produced by the controller
//! - `YYYY-MM-DD HH:MM:SS` timestamp handling
//!
//! # Example
//!
//! ```
//! use incubator_types::{Incubation, Species};
//! use time::macros::datetime;
//!
//! let hen = Species {
//!     name: "Galinha".to_string(),
//!     incubation_days: 21,
//!     temp_min: 37.5,
//!     temp_max: 38.0,
//!     humidity_min: 55.0,
//!     humidity_max: 65.0,
//! };
//!
//! let record = Incubation::new(&hen, 12, "", datetime!(2024-01-01 00:00:00)).unwrap();
//! assert_eq!(record.duration_days, 21);
//! assert_eq!(record.expected_end(), datetime!(2024-01-22 00:00:00));
//! ```

pub mod error;
pub mod timestamp;
pub mod types;

pub use error::{ValidationError, ValidationResult};
pub use types::{CompletedIncubation, Incubation, SensorReading, Species};
