//! Wall-clock timestamps in the `YYYY-MM-DD HH:MM:SS` form used by every
//! persisted and exported record.
//!
//! Timestamps carry no UTC offset. They are the operator's local time, the
//! same way the controller writes its telemetry.

use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::error::{ValidationError, ValidationResult};

const TEXT_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const ISO_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS`.
///
/// # Examples
///
/// ```
/// use incubator_types::timestamp;
/// use time::macros::datetime;
///
/// assert_eq!(timestamp::format(datetime!(2024-01-08 07:05:00)), "2024-01-08 07:05:00");
/// ```
#[must_use]
pub fn format(ts: PrimitiveDateTime) -> String {
    // A PrimitiveDateTime carries every component this description uses
    ts.format(TEXT_FORMAT).unwrap_or_else(|_| ts.to_string())
}

/// Parse `YYYY-MM-DD HH:MM:SS`, also accepting a `T` separator.
///
/// Surrounding whitespace is ignored.
pub fn parse(s: &str) -> ValidationResult<PrimitiveDateTime> {
    let s = s.trim();
    PrimitiveDateTime::parse(s, TEXT_FORMAT)
        .or_else(|_| PrimitiveDateTime::parse(s, ISO_FORMAT))
        .map_err(|_| ValidationError::InvalidTimestamp(s.to_string()))
}

/// Serde adapter for `PrimitiveDateTime` fields stored as text.
#[cfg(feature = "serde")]
pub mod text {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use time::PrimitiveDateTime;

    pub fn serialize<S: Serializer>(ts: &PrimitiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format(*ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<PrimitiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse(&raw).map_err(de::Error::custom)
    }

    /// Optional variant: `null` and `""` both mean unset.
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer, de};
        use time::PrimitiveDateTime;

        pub fn serialize<S: Serializer>(
            ts: &Option<PrimitiveDateTime>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => s.serialize_str(&crate::timestamp::format(*ts)),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<PrimitiveDateTime>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(raw) if !raw.trim().is_empty() => crate::timestamp::parse(&raw)
                    .map(Some)
                    .map_err(de::Error::custom),
                _ => Ok(None),
            }
        }
    }
}

/// Lenient count parsing for records written by older tooling.
///
/// Accepts integers, integral floats (`10.0`) and numeric strings. For
/// optional counts, `null` and `""` mean unset.
#[cfg(feature = "serde")]
pub mod count {
    use serde::{Deserialize, Deserializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCount {
        Int(u64),
        Float(f64),
        Text(String),
    }

    fn to_u32<E: de::Error>(raw: RawCount) -> Result<Option<u32>, E> {
        let value = match raw {
            RawCount::Int(v) => v as f64,
            RawCount::Float(v) => v,
            RawCount::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                s.parse::<f64>()
                    .map_err(|_| E::custom(format!("invalid count '{}'", s)))?
            }
        };

        if value.fract() != 0.0 || value < 0.0 || value > f64::from(u32::MAX) {
            return Err(E::custom(format!("invalid count {}", value)));
        }
        Ok(Some(value as u32))
    }

    pub fn required<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        to_u32(RawCount::deserialize(d)?)?.ok_or_else(|| de::Error::custom("missing count"))
    }

    pub fn optional<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        match Option::<RawCount>::deserialize(d)? {
            Some(raw) => to_u32(raw),
            None => Ok(None),
        }
    }
}
