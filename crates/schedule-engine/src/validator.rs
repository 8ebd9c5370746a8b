//! Decide whether a reservation draft may be written.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. every field is present and non-blank
//! 2. the end is strictly after the start (no wrap-around on create/edit)
//! 3. the start is not in the past
//! 4. no reservation on the same resource and day overlaps it
//!
//! Rejections are values, not errors. The snapshot the caller validates
//! against may be stale, so the backend repeats the overlap check on write.

use std::fmt;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::clock::{self, MinuteOfDay};
use crate::conflict::intersects;
use crate::error::Result;
use crate::reservation::{Reservation, ReservationDraft};

/// Why a draft was turned down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason")]
pub enum Rejection {
    /// Wire names of the blank or absent fields, in check order.
    MissingFields { fields: Vec<&'static str> },
    InvalidRange,
    PastDate,
    Overlap {
        #[serde(rename = "conflictingId")]
        conflicting_id: String,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingFields { fields } => {
                write!(f, "missing required fields: {}", fields.join(", "))
            }
            Rejection::InvalidRange => write!(f, "end time must be after start time"),
            Rejection::PastDate => write!(f, "reservation starts in the past"),
            Rejection::Overlap { conflicting_id } => {
                write!(f, "overlaps existing reservation {conflicting_id}")
            }
        }
    }
}

/// Outcome of validating a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "rejection")]
pub enum ValidationResult {
    Accepted,
    Rejected(Rejection),
}

impl ValidationResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationResult::Accepted)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ValidationResult::Accepted => None,
            ValidationResult::Rejected(rejection) => Some(rejection),
        }
    }
}

/// Draft fields after the completeness check.
struct Complete<'a> {
    resource: &'a str,
    date: &'a str,
    start_time: &'a str,
    end_time: &'a str,
}

fn complete(draft: &ReservationDraft) -> std::result::Result<Complete<'_>, Vec<&'static str>> {
    fn filled(field: &Option<String>) -> Option<&str> {
        field.as_deref().filter(|value| !value.trim().is_empty())
    }

    let date = filled(&draft.date);
    let start_time = filled(&draft.start_time);
    let end_time = filled(&draft.end_time);
    let resource = filled(&draft.resource);
    let occupant = filled(&draft.occupant);

    match (date, start_time, end_time, resource, occupant) {
        (Some(date), Some(start_time), Some(end_time), Some(resource), Some(_)) => Ok(Complete {
            resource,
            date,
            start_time,
            end_time,
        }),
        _ => Err([
            ("date", date.is_none()),
            ("startTime", start_time.is_none()),
            ("endTime", end_time.is_none()),
            ("resource", resource.is_none()),
            ("occupant", occupant.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()),
    }
}

/// Validate `candidate` against `existing` as of the local wall clock.
///
/// See [`validate_at`].
pub fn validate(
    candidate: &ReservationDraft,
    existing: &[Reservation],
    exclude_id: Option<&str>,
) -> Result<ValidationResult> {
    validate_at(candidate, existing, exclude_id, Local::now().naive_local())
}

/// Validate `candidate` against `existing`, treating `now` as the current
/// local instant.
///
/// `exclude_id` names the reservation being edited so that it does not
/// conflict with its own previous version. The first overlapping reservation
/// in snapshot order is reported.
///
/// # Errors
/// Returns `ScheduleError::MalformedTime` / `ScheduleError::MalformedDate`
/// when the candidate, or an existing reservation on the same resource and
/// day, carries an unparseable time or date.
pub fn validate_at(
    candidate: &ReservationDraft,
    existing: &[Reservation],
    exclude_id: Option<&str>,
    now: NaiveDateTime,
) -> Result<ValidationResult> {
    let fields = match complete(candidate) {
        Ok(fields) => fields,
        Err(fields) => return Ok(rejected(Rejection::MissingFields { fields })),
    };

    let start = MinuteOfDay::parse(fields.start_time)?;
    let end = MinuteOfDay::parse(fields.end_time)?;
    if end <= start {
        return Ok(rejected(Rejection::InvalidRange));
    }

    let day = clock::date_key(fields.date)?;
    if clock::local_instant(day, start)? < now {
        return Ok(rejected(Rejection::PastDate));
    }

    let same_slot = existing
        .iter()
        .filter(|r| r.is_on(fields.resource, day) && Some(r.id.as_str()) != exclude_id);
    for reservation in same_slot {
        if intersects((start, end), reservation.minutes()?) {
            return Ok(rejected(Rejection::Overlap {
                conflicting_id: reservation.id.clone(),
            }));
        }
    }

    debug!(resource = fields.resource, date = day, %start, %end, "draft accepted");
    Ok(ValidationResult::Accepted)
}

fn rejected(rejection: Rejection) -> ValidationResult {
    debug!(%rejection, "draft rejected");
    ValidationResult::Rejected(rejection)
}
