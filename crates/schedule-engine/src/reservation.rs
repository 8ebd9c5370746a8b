//! Reservation records as delivered by the reservations API.
//!
//! The engine never owns reservations; it reads snapshots of them. The API has
//! shipped both English (`resource`, `startTime`, ...) and Spanish (`cancha`,
//! `hora_desde`, ...) field names, and identifiers arrive as either JSON
//! strings or numbers. Both shapes deserialize into the same types, with
//! identifiers kept as strings because resources are matched by string
//! equality.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::clock::{self, MinuteOfDay};
use crate::error::Result;

/// An existing reservation of a resource for part of one local day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(alias = "cancha", deserialize_with = "string_or_number")]
    pub resource: String,
    /// `YYYY-MM-DD`, possibly followed by a time component.
    #[serde(alias = "fecha")]
    pub date: String,
    /// `HH:MM[:SS]`.
    #[serde(alias = "hora_desde")]
    pub start_time: String,
    /// `HH:MM[:SS]`. Not after `start_time` means the reservation wraps past
    /// midnight.
    #[serde(alias = "hora_hasta")]
    pub end_time: String,
    #[serde(alias = "socio", default, deserialize_with = "string_or_number")]
    pub occupant: String,
}

impl Reservation {
    pub fn new(
        id: impl Into<String>,
        resource: impl Into<String>,
        date: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        occupant: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            resource: resource.into(),
            date: date.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            occupant: occupant.into(),
        }
    }

    /// True when this reservation belongs to `resource` on the day `date_key`.
    ///
    /// Both comparisons are exact string equality on the significant parts.
    pub fn is_on(&self, resource: &str, date_key: &str) -> bool {
        self.resource == resource && clock::date_prefix(&self.date) == date_key
    }

    /// Start and end as minutes since midnight.
    ///
    /// # Errors
    /// Returns `ScheduleError::MalformedTime` if either time is not `HH:MM`.
    pub fn minutes(&self) -> Result<(MinuteOfDay, MinuteOfDay)> {
        Ok((
            MinuteOfDay::parse(&self.start_time)?,
            MinuteOfDay::parse(&self.end_time)?,
        ))
    }
}

/// A reservation that has not been accepted yet: the contents of a create or
/// edit form. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDraft {
    #[serde(alias = "cancha", default, deserialize_with = "optional_string_or_number")]
    pub resource: Option<String>,
    #[serde(alias = "fecha", default)]
    pub date: Option<String>,
    #[serde(alias = "hora_desde", default)]
    pub start_time: Option<String>,
    #[serde(alias = "hora_hasta", default)]
    pub end_time: Option<String>,
    #[serde(alias = "socio", default, deserialize_with = "optional_string_or_number")]
    pub occupant: Option<String>,
}

impl ReservationDraft {
    /// A draft with every field filled in.
    pub fn new(
        resource: impl Into<String>,
        date: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        occupant: impl Into<String>,
    ) -> Self {
        Self {
            resource: Some(resource.into()),
            date: Some(date.into()),
            start_time: Some(start_time.into()),
            end_time: Some(end_time.into()),
            occupant: Some(occupant.into()),
        }
    }
}

/// Parse a `GET /reservations` payload: a JSON array of reservation records.
///
/// # Errors
/// Returns `ScheduleError::Json` if the payload is not an array of records.
pub fn parse_reservations(json: &str) -> Result<Vec<Reservation>> {
    Ok(serde_json::from_str(json)?)
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}

fn optional_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Null => Ok(None),
        other => Err(D::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}
