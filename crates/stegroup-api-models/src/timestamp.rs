//! Serde adapters for backend timestamps.
//!
//! The service emits ISO-8601 strings that may or may not carry an offset
//! (`2025-11-29T10:00:00` as well as `2025-11-29T10:00:00Z`). Values without
//! an offset are interpreted as UTC. Serialization always writes RFC 3339.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a backend timestamp, accepting RFC 3339 or offset-less ISO-8601.
///
/// # Errors
/// Returns a description of the rejected input when no format matches.
pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("unrecognised timestamp '{raw}'"))
}

/// Serialize a timestamp as RFC 3339.
///
/// # Errors
/// Propagates serializer failures.
pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339())
}

/// Deserialize a timestamp via [`parse`].
///
/// # Errors
/// Fails when the input is not a string or not a recognised timestamp.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(D::Error::custom)
}

/// Adapters for optional timestamps.
pub mod option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    /// Serialize an optional timestamp; `None` becomes `null`.
    ///
    /// # Errors
    /// Propagates serializer failures.
    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_some(&value.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional timestamp; `null` becomes `None`.
    ///
    /// # Errors
    /// Fails when a present value is not a recognised timestamp.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::parse(&raw).map_err(D::Error::custom))
            .transpose()
    }
}
