//! Project one resource's reservations onto a single day as free/occupied blocks.
//!
//! Filters the snapshot to the requested resource and day, sorts the matching
//! reservations by start, then walks a cursor across the day emitting a free
//! block for every gap before an occupied one.
//!
//! A reservation whose end is not after its start wraps past midnight. It is
//! emitted as one block carrying its literal end time, the cursor only moves up
//! to its start, and the day gets no trailing free block at all. The wrap is
//! taken to consume the rest of the day even when its literal end is early;
//! whether that window should reopen after the end time is unresolved.

use serde::Serialize;
use tracing::{debug, trace};

use crate::clock::{self, MinuteOfDay};
use crate::error::Result;
use crate::reservation::Reservation;

/// Whether a block of the day can still be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Free,
    Occupied,
}

/// A labeled, half-open `[from_minute, to_minute)` range of the projected day.
///
/// For a wrapping block `to_minute` is the reservation's literal end, which is
/// not after `from_minute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalBlock {
    pub kind: BlockKind,
    pub from_minute: MinuteOfDay,
    pub to_minute: MinuteOfDay,
    /// Who holds the slot. Only set on occupied blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupant: Option<String>,
    /// Id of the reservation this block was derived from. Only set on occupied
    /// blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_reservation: Option<String>,
    pub wraps: bool,
}

impl IntervalBlock {
    pub fn free(from_minute: MinuteOfDay, to_minute: MinuteOfDay) -> Self {
        Self {
            kind: BlockKind::Free,
            from_minute,
            to_minute,
            occupant: None,
            source_reservation: None,
            wraps: false,
        }
    }

    fn occupied(reservation: &Reservation) -> Result<Self> {
        let (from_minute, to_minute) = reservation.minutes()?;
        Ok(Self {
            kind: BlockKind::Occupied,
            from_minute,
            to_minute,
            occupant: Some(reservation.occupant.clone()),
            source_reservation: Some(reservation.id.clone()),
            wraps: to_minute <= from_minute,
        })
    }

    pub fn is_free(&self) -> bool {
        self.kind == BlockKind::Free
    }

    /// Minutes of the queried day covered by this block. A wrapping block
    /// covers everything from its start to the end of the day.
    pub fn duration_minutes(&self) -> u16 {
        if self.wraps {
            self.from_minute.minutes_until(MinuteOfDay::END_OF_DAY)
        } else {
            self.from_minute.minutes_until(self.to_minute)
        }
    }
}

/// Project the reservations of `resource` on `date` into an ordered sequence of
/// free and occupied blocks.
///
/// Without wrapping reservations the blocks cover `[0, 1440)` exactly once.
/// Adjacent reservations stay separate with no free block between them, and
/// overlapping input is reflected as-is rather than merged. A resource with
/// no reservations projects to a single free block.
///
/// # Errors
/// Returns `ScheduleError::MalformedDate` if `date` is not a calendar date and
/// `ScheduleError::MalformedTime` if a matching reservation has a malformed
/// time. Reservations for other resources or days are never parsed.
pub fn project(
    reservations: &[Reservation],
    resource: &str,
    date: &str,
) -> Result<Vec<IntervalBlock>> {
    let day = clock::date_key(date)?;

    let mut occupied = reservations
        .iter()
        .filter(|r| r.is_on(resource, day))
        .map(IntervalBlock::occupied)
        .collect::<Result<Vec<_>>>()?;

    if occupied.is_empty() {
        debug!(resource, date = day, "no reservations, whole day free");
        return Ok(vec![IntervalBlock::free(
            MinuteOfDay::MIDNIGHT,
            MinuteOfDay::END_OF_DAY,
        )]);
    }

    // `sort_by_key` is stable: equal starts keep snapshot order.
    occupied.sort_by_key(|block| block.from_minute);
    let any_wraps = occupied.iter().any(|block| block.wraps);

    let mut blocks = Vec::with_capacity(occupied.len() * 2 + 1);
    let mut cursor = MinuteOfDay::MIDNIGHT;

    for block in occupied {
        if cursor < block.from_minute {
            blocks.push(IntervalBlock::free(cursor, block.from_minute));
        }
        let reached = if block.wraps {
            block.from_minute
        } else {
            block.to_minute
        };
        trace!(
            from = %block.from_minute,
            to = %block.to_minute,
            wraps = block.wraps,
            "occupied block"
        );
        cursor = cursor.max(reached);
        blocks.push(block);
    }

    if !any_wraps && cursor < MinuteOfDay::END_OF_DAY {
        blocks.push(IntervalBlock::free(cursor, MinuteOfDay::END_OF_DAY));
    }

    debug!(
        resource,
        date = day,
        blocks = blocks.len(),
        wraps = any_wraps,
        "projected day"
    );
    Ok(blocks)
}

/// The first free block at least `min_minutes` long, if any.
pub fn first_free_block(blocks: &[IntervalBlock], min_minutes: u16) -> Option<&IntervalBlock> {
    blocks
        .iter()
        .find(|block| block.is_free() && block.duration_minutes() >= min_minutes)
}

/// Totals for a projected day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub free_minutes: u32,
    pub occupied_minutes: u32,
    pub reservations: usize,
    pub wraps: bool,
}

impl DaySummary {
    /// Sum up the blocks returned by [`project`]. Overlapping reservations
    /// are counted in full each, so `occupied_minutes` can exceed a day.
    pub fn from_blocks(blocks: &[IntervalBlock]) -> Self {
        blocks.iter().fold(Self::default(), |mut summary, block| {
            let minutes = u32::from(block.duration_minutes());
            match block.kind {
                BlockKind::Free => summary.free_minutes += minutes,
                BlockKind::Occupied => {
                    summary.occupied_minutes += minutes;
                    summary.reservations += 1;
                    summary.wraps |= block.wraps;
                }
            }
            summary
        })
    }
}
