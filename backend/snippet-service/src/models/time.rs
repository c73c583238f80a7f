//! Boundary timestamp type.
//!
//! The hosted document store hands timestamps back in two shapes depending on
//! the path a document travelled: its native `{seconds, nanos}` object, or an
//! ISO-8601 string (REST responses, documents written by older clients).
//! `StoreTimestamp` accepts both on deserialize and always serializes as an
//! ISO-8601 string, so only one temporal representation exists past the
//! data-access edge.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StoreTimestamp(pub DateTime<Utc>);

impl StoreTimestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn epoch() -> Self {
        Self(Utc.timestamp_opt(0, 0).single().unwrap_or_default())
    }

    /// ISO-8601 with millisecond precision and a `Z` suffix
    pub fn to_iso(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl Default for StoreTimestamp {
    fn default() -> Self {
        Self::epoch()
    }
}

impl From<DateTime<Utc>> for StoreTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TimestampRepr {
    Native {
        seconds: i64,
        #[serde(default, alias = "nanoseconds")]
        nanos: u32,
    },
    Iso(String),
}

impl Serialize for StoreTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso())
    }
}

impl<'de> Deserialize<'de> for StoreTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match TimestampRepr::deserialize(deserializer)? {
            TimestampRepr::Native { seconds, nanos } => Utc
                .timestamp_opt(seconds, nanos)
                .single()
                .map(StoreTimestamp)
                .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {}s", seconds))),
            TimestampRepr::Iso(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|dt| StoreTimestamp(dt.with_timezone(&Utc)))
                .map_err(|e| D::Error::custom(format!("invalid ISO-8601 timestamp '{}': {}", raw, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_native_object() {
        let ts: StoreTimestamp = serde_json::from_value(json!({"seconds": 1700000000, "nanos": 500000000})).unwrap();
        assert_eq!(ts.0.timestamp(), 1700000000);
        assert_eq!(ts.0.timestamp_subsec_nanos(), 500000000);
    }

    #[test]
    fn deserializes_nanoseconds_alias() {
        let ts: StoreTimestamp =
            serde_json::from_value(json!({"seconds": 1700000000, "nanoseconds": 1000})).unwrap();
        assert_eq!(ts.0.timestamp_subsec_nanos(), 1000);
    }

    #[test]
    fn deserializes_iso_string() {
        let ts: StoreTimestamp =
            serde_json::from_value(json!("2024-03-01T12:30:45.123Z")).unwrap();
        assert_eq!(ts.to_iso(), "2024-03-01T12:30:45.123Z");
    }

    #[test]
    fn serializes_as_iso_regardless_of_input() {
        let native: StoreTimestamp =
            serde_json::from_value(json!({"seconds": 1709296245, "nanos": 123000000})).unwrap();
        let out = serde_json::to_value(native).unwrap();
        assert_eq!(out, json!("2024-03-01T12:30:45.123Z"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_value::<StoreTimestamp>(json!("not a date")).is_err());
    }

    #[test]
    fn orders_chronologically() {
        let a: StoreTimestamp = serde_json::from_value(json!({"seconds": 100, "nanos": 0})).unwrap();
        let b: StoreTimestamp = serde_json::from_value(json!("1970-01-01T00:03:20.000Z")).unwrap();
        assert!(a < b);
    }
}
