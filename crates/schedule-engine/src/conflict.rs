//! Detect overlapping reservations already present in a snapshot.
//!
//! The validator keeps new conflicts out, but the snapshot can still contain
//! overlaps written before validation existed or by concurrent clients. Two
//! reservations conflict when they share a resource and a day and their
//! half-open minute ranges intersect. Adjacent reservations (one ends exactly
//! when the other starts) are NOT conflicts.

use serde::Serialize;

use crate::clock::{self, MinuteOfDay};
use crate::error::Result;
use crate::reservation::Reservation;

/// A pair of reservations whose time ranges overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub first: Reservation,
    pub second: Reservation,
    pub overlap_minutes: u16,
}

/// Whether `[a_start, a_end)` and `[b_start, b_end)` intersect.
///
/// Compares literal minutes, so a wrapping range (end not after start) only
/// matches ranges that straddle both of its ends.
pub fn intersects(a: (MinuteOfDay, MinuteOfDay), b: (MinuteOfDay, MinuteOfDay)) -> bool {
    a.0 < b.1 && a.1 > b.0
}

/// Find every pair of overlapping reservations on the same resource and day.
///
/// Pairs are reported in snapshot order (`first` always precedes `second` in
/// the input). The overlap is `min(end) - max(start)`, floored at zero for
/// pairs that only intersect through a wrapping reservation's literal times.
///
/// # Errors
/// Returns `ScheduleError::MalformedTime` if any reservation has a malformed
/// time.
pub fn find_conflicts(reservations: &[Reservation]) -> Result<Vec<Conflict>> {
    let spans = reservations
        .iter()
        .map(Reservation::minutes)
        .collect::<Result<Vec<_>>>()?;

    let mut conflicts = Vec::new();

    for (i, (a, a_span)) in reservations.iter().zip(&spans).enumerate() {
        let a_day = clock::date_prefix(&a.date);
        for (b, b_span) in reservations.iter().zip(&spans).skip(i + 1) {
            if !b.is_on(&a.resource, a_day) || !intersects(*a_span, *b_span) {
                continue;
            }
            let overlap_start = a_span.0.max(b_span.0);
            let overlap_end = a_span.1.min(b_span.1);
            conflicts.push(Conflict {
                first: a.clone(),
                second: b.clone(),
                overlap_minutes: overlap_start.minutes_until(overlap_end),
            });
        }
    }

    Ok(conflicts)
}
