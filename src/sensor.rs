use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Wire format for reading timestamps, matching the MySQL DATETIME column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Closed set of sensor tables. Anything outside this set is rejected at
/// the route boundary before any store access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorType {
    Temperature,
    Humidity,
    Light,
}

impl SensorType {
    pub const ALL: [Self; 3] = [Self::Temperature, Self::Humidity, Self::Light];

    /// Allow-listed table name. This is the only path by which a table
    /// name reaches SQL text.
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Light => "light",
        }
    }
}

impl FromStr for SensorType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature" => Ok(Self::Temperature),
            "humidity" => Ok(Self::Humidity),
            "light" => Ok(Self::Light),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// One stored sensor reading.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize, Deserialize, ToSchema)]
pub struct Reading {
    pub id: i32,
    pub value: f64,
    pub unit: String,
    #[serde(with = "wire_timestamp")]
    #[schema(value_type = String, example = "2024-05-01 12:00:00")]
    pub timestamp: NaiveDateTime,
}

/// Request body for create and update. `timestamp` defaults to the
/// current server time when omitted.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReadingPayload {
    pub value: f64,
    pub unit: String,
    #[schema(value_type = Option<String>, example = "2024-05-01 12:00:00")]
    pub timestamp: Option<String>,
}

impl ReadingPayload {
    /// Resolve the submitted timestamp, or default to now.
    ///
    /// # Errors
    ///
    /// Returns the offending string if it does not match the wire format.
    pub fn resolve_timestamp(&self) -> Result<NaiveDateTime, &str> {
        match self.timestamp.as_deref() {
            Some(raw) => parse_timestamp(raw).ok_or(raw),
            None => {
                // Truncate sub-second precision to match the wire format.
                let now = chrono::Local::now().naive_local();
                Ok(chrono::Timelike::with_nanosecond(&now, 0).unwrap_or(now))
            }
        }
    }
}

/// Parse a date-time string in the wire format.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).ok()
}

/// Serde adapter serializing `NaiveDateTime` in the wire format.
pub mod wire_timestamp {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_type_accepts_exactly_the_three_tables() {
        assert_eq!("temperature".parse(), Ok(SensorType::Temperature));
        assert_eq!("humidity".parse(), Ok(SensorType::Humidity));
        assert_eq!("light".parse(), Ok(SensorType::Light));

        assert!("pressure".parse::<SensorType>().is_err());
        assert!("Temperature".parse::<SensorType>().is_err());
        assert!("".parse::<SensorType>().is_err());
        assert!("temperature; DROP TABLE x".parse::<SensorType>().is_err());
    }

    #[test]
    fn table_names_are_the_fixed_allow_list() {
        let tables: Vec<&str> = SensorType::ALL.iter().map(|s| s.table()).collect();
        assert_eq!(tables, vec!["temperature", "humidity", "light"]);
    }

    #[test]
    fn explicit_timestamp_round_trips() {
        let payload = ReadingPayload {
            value: 21.5,
            unit: "C".to_string(),
            timestamp: Some("2024-05-01 12:30:00".to_string()),
        };
        let ts = payload.resolve_timestamp().unwrap();
        assert_eq!(ts.format(TIMESTAMP_FORMAT).to_string(), "2024-05-01 12:30:00");
    }

    #[test]
    fn omitted_timestamp_defaults_to_now_without_subseconds() {
        let payload = ReadingPayload {
            value: 55.0,
            unit: "%".to_string(),
            timestamp: None,
        };
        let before = chrono::Local::now().naive_local();
        let ts = payload.resolve_timestamp().unwrap();
        let after = chrono::Local::now().naive_local();

        assert!(ts >= before - chrono::Duration::seconds(1));
        assert!(ts <= after);
        assert_eq!(chrono::Timelike::nanosecond(&ts), 0);
    }

    #[test]
    fn malformed_timestamp_is_rejected() {
        let payload = ReadingPayload {
            value: 1.0,
            unit: "lx".to_string(),
            timestamp: Some("yesterday".to_string()),
        };
        assert_eq!(payload.resolve_timestamp(), Err("yesterday"));
    }

    #[test]
    fn reading_serializes_timestamp_in_wire_format() {
        let reading = Reading {
            id: 7,
            value: 19.25,
            unit: "C".to_string(),
            timestamp: parse_timestamp("2024-05-01 08:15:00").unwrap(),
        };
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["timestamp"], "2024-05-01 08:15:00");
    }
}
