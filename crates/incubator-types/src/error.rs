//! Error types for record validation in incubator-types.

use thiserror::Error;

/// Errors raised when a count or record falls outside its allowed range.
///
/// These are produced at the input boundary, before anything is persisted.
/// Values are never clamped.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// A count is larger than its upper bound.
    #[error("{field} must be between 0 and {max}, got {value}")]
    InputOutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: u32,
        /// Inclusive upper bound.
        max: u32,
    },

    /// An incubation needs at least one egg.
    #[error("egg count must be at least 1")]
    NoEggs,

    /// `ended_at` was set without a hatch count.
    #[error("end timestamp is set but no hatch count was recorded")]
    EndedWithoutHatch,

    /// A history snapshot needs both a hatch count and an end timestamp.
    #[error("record is not completed: hatch count and end timestamp are required")]
    NotCompleted,

    /// A species declares a minimum above its maximum.
    #[error("{quantity} range is inverted: min {min} > max {max}")]
    InvertedRange {
        /// Which range (temperature or humidity).
        quantity: &'static str,
        min: f32,
        max: f32,
    },

    /// A species declares a zero-day incubation.
    #[error("incubation duration must be at least 1 day")]
    ZeroDuration,

    /// A timestamp did not match `YYYY-MM-DD HH:MM:SS`.
    #[error("invalid timestamp '{0}', expected YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp(String),
}

/// Result type alias using incubator-types' ValidationError type.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
