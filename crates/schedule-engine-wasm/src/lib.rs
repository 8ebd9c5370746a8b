//! WASM bindings for schedule-engine.
//!
//! Exposes day projection, draft validation and conflict auditing to the
//! dashboard's JavaScript via `wasm-bindgen`. All complex types are passed as
//! JSON strings: the reservations array exactly as returned by
//! `GET /reservations`, and the draft exactly as the create/edit form holds it.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p schedule-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir dashboard/src/wasm/ \
//!   target/wasm32-unknown-unknown/release/schedule_engine_wasm.wasm
//! ```

use chrono::{Local, NaiveDateTime};
use schedule_engine::projector::{DaySummary, IntervalBlock};
use schedule_engine::{BlockKind, Conflict, ReservationDraft, ValidationResult};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// A projected block with `HH:MM` strings alongside the raw minutes, so the
/// UI never formats times itself.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockDto<'a> {
    kind: BlockKind,
    from: String,
    to: String,
    from_minute: u16,
    to_minute: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    occupant: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_reservation: Option<&'a str>,
    wraps: bool,
}

impl<'a> From<&'a IntervalBlock> for BlockDto<'a> {
    fn from(b: &'a IntervalBlock) -> Self {
        Self {
            kind: b.kind,
            from: b.from_minute.to_string(),
            to: b.to_minute.to_string(),
            from_minute: b.from_minute.get(),
            to_minute: b.to_minute.get(),
            occupant: b.occupant.as_deref(),
            source_reservation: b.source_reservation.as_deref(),
            wraps: b.wraps,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConflictDto<'a> {
    resource: &'a str,
    first_id: &'a str,
    second_id: &'a str,
    overlap_minutes: u16,
}

impl<'a> From<&'a Conflict> for ConflictDto<'a> {
    fn from(c: &'a Conflict) -> Self {
        Self {
            resource: &c.first.resource,
            first_id: &c.first.id,
            second_id: &c.second.id,
            overlap_minutes: c.overlap_minutes,
        }
    }
}

// ---------------------------------------------------------------------------
// Target-independent implementations (errors as plain strings)
// ---------------------------------------------------------------------------

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

/// Parse the optional `now` override: `YYYY-MM-DDTHH:MM[:SS]` local time.
fn parse_now(now: Option<&str>) -> Result<NaiveDateTime, String> {
    let Some(s) = now else {
        return Ok(Local::now().naive_local());
    };
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|e| format!("Invalid datetime '{}': {}", s, e))
}

fn project_day_json(reservations_json: &str, resource: &str, date: &str) -> Result<String, String> {
    let reservations =
        schedule_engine::parse_reservations(reservations_json).map_err(|e| e.to_string())?;
    let blocks =
        schedule_engine::project(&reservations, resource, date).map_err(|e| e.to_string())?;

    let dtos: Vec<BlockDto> = blocks.iter().map(BlockDto::from).collect();
    to_json(&dtos)
}

fn day_summary_json(reservations_json: &str, resource: &str, date: &str) -> Result<String, String> {
    let reservations =
        schedule_engine::parse_reservations(reservations_json).map_err(|e| e.to_string())?;
    let blocks =
        schedule_engine::project(&reservations, resource, date).map_err(|e| e.to_string())?;

    to_json(&DaySummary::from_blocks(&blocks))
}

fn validate_json(
    candidate_json: &str,
    existing_json: &str,
    exclude_id: Option<&str>,
    now: Option<&str>,
) -> Result<String, String> {
    let candidate: ReservationDraft = serde_json::from_str(candidate_json)
        .map_err(|e| format!("Invalid draft JSON: {}", e))?;
    let existing =
        schedule_engine::parse_reservations(existing_json).map_err(|e| e.to_string())?;
    let now = parse_now(now)?;

    let result = schedule_engine::validate_at(&candidate, &existing, exclude_id, now)
        .map_err(|e| e.to_string())?;

    // Attach a display message for the form's error toast.
    let mut value = serde_json::to_value(&result).map_err(|e| format!("Serialization error: {}", e))?;
    if let (ValidationResult::Rejected(rejection), Some(object)) = (&result, value.as_object_mut()) {
        object.insert("message".to_string(), rejection.to_string().into());
    }
    to_json(&value)
}

fn find_conflicts_json(reservations_json: &str) -> Result<String, String> {
    let reservations =
        schedule_engine::parse_reservations(reservations_json).map_err(|e| e.to_string())?;
    let conflicts = schedule_engine::find_conflicts(&reservations).map_err(|e| e.to_string())?;

    let dtos: Vec<ConflictDto> = conflicts.iter().map(ConflictDto::from).collect();
    to_json(&dtos)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Project one resource's reservations onto a day.
///
/// `reservations_json` is the `GET /reservations` array. Returns a JSON array of
/// `{kind, from, to, fromMinute, toMinute, occupant?, sourceReservation?, wraps}`.
#[wasm_bindgen(js_name = "projectDay")]
pub fn project_day(reservations_json: &str, resource: &str, date: &str) -> Result<String, JsValue> {
    project_day_json(reservations_json, resource, date).map_err(|e| JsValue::from_str(&e))
}

/// Free/occupied minute totals for one resource's day.
#[wasm_bindgen(js_name = "daySummary")]
pub fn day_summary(reservations_json: &str, resource: &str, date: &str) -> Result<String, JsValue> {
    day_summary_json(reservations_json, resource, date).map_err(|e| JsValue::from_str(&e))
}

/// Validate a reservation draft before submitting it.
///
/// `exclude_id` is the id of the reservation being edited, if any. `now` is an
/// optional `YYYY-MM-DDTHH:MM[:SS]` local instant; the browser clock is used
/// when omitted. Returns `{"status":"Accepted"}` or
/// `{"status":"Rejected","rejection":{"reason":...},"message":...}`.
#[wasm_bindgen(js_name = "validateReservation")]
pub fn validate_reservation(
    candidate_json: &str,
    existing_json: &str,
    exclude_id: Option<String>,
    now: Option<String>,
) -> Result<String, JsValue> {
    validate_json(
        candidate_json,
        existing_json,
        exclude_id.as_deref(),
        now.as_deref(),
    )
    .map_err(|e| JsValue::from_str(&e))
}

/// List overlapping reservation pairs in a snapshot.
#[wasm_bindgen(js_name = "findConflicts")]
pub fn find_conflicts(reservations_json: &str) -> Result<String, JsValue> {
    find_conflicts_json(reservations_json).map_err(|e| JsValue::from_str(&e))
}
