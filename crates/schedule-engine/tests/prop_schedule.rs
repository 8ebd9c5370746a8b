//! Property-based tests for projection and validation using proptest.
//!
//! These tests verify invariants that should hold for *any* reservation
//! snapshot, not just the specific examples in the other test files.

use chrono::NaiveDate;
use proptest::prelude::*;
use schedule_engine::{
    project, validate_at, BlockKind, MinuteOfDay, Rejection, Reservation, ReservationDraft,
};

const DATE: &str = "2024-06-01";

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn hhmm(minute: u16) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// A same-day range `start < end` inside `[0, 1440)`.
fn arb_range() -> impl Strategy<Value = (u16, u16)> {
    (0u16..1439).prop_flat_map(|start| (Just(start), (start + 1)..1440))
}

/// Up to 8 pairwise-disjoint same-day ranges, in shuffled order.
fn arb_disjoint_ranges() -> impl Strategy<Value = Vec<(u16, u16)>> {
    prop::collection::btree_set(0u16..1440, 2..=16)
        .prop_map(|cuts| {
            let cuts: Vec<u16> = cuts.into_iter().collect();
            cuts.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect::<Vec<_>>()
        })
        .prop_shuffle()
}

fn to_reservations(ranges: &[(u16, u16)]) -> Vec<Reservation> {
    ranges
        .iter()
        .enumerate()
        .map(|(i, (start, end))| {
            Reservation::new(i.to_string(), "1", DATE, hhmm(*start), hhmm(*end), format!("m{i}"))
        })
        .collect()
}

fn now() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn disjoint_reservations_partition_the_day(ranges in arb_disjoint_ranges()) {
        let blocks = project(&to_reservations(&ranges), "1", DATE).unwrap();

        prop_assert_eq!(blocks[0].from_minute, MinuteOfDay::MIDNIGHT);
        prop_assert_eq!(blocks[blocks.len() - 1].to_minute, MinuteOfDay::END_OF_DAY);
        for block in &blocks {
            prop_assert!(block.from_minute < block.to_minute);
        }
        for pair in blocks.windows(2) {
            prop_assert_eq!(pair[0].to_minute, pair[1].from_minute);
        }
        let occupied = blocks.iter().filter(|b| b.kind == BlockKind::Occupied).count();
        prop_assert_eq!(occupied, ranges.len());
    }

    #[test]
    fn occupied_blocks_mirror_input_and_free_blocks_never_overlap_them(
        ranges in prop::collection::vec(arb_range(), 1..10)
    ) {
        let reservations = to_reservations(&ranges);
        let blocks = project(&reservations, "1", DATE).unwrap();

        let occupied: Vec<_> = blocks.iter().filter(|b| b.kind == BlockKind::Occupied).collect();
        prop_assert_eq!(occupied.len(), ranges.len());
        for block in &occupied {
            let id: usize = block.source_reservation.as_deref().unwrap().parse().unwrap();
            prop_assert_eq!(block.from_minute.get(), ranges[id].0);
            prop_assert_eq!(block.to_minute.get(), ranges[id].1);
        }

        for free in blocks.iter().filter(|b| b.is_free()) {
            for busy in &occupied {
                prop_assert!(
                    free.to_minute <= busy.from_minute || free.from_minute >= busy.to_minute,
                    "free {:?} overlaps occupied {:?}", free, busy
                );
            }
        }
    }

    #[test]
    fn starts_are_non_decreasing(ranges in prop::collection::vec(arb_range(), 0..10)) {
        let blocks = project(&to_reservations(&ranges), "1", DATE).unwrap();
        for pair in blocks.windows(2) {
            prop_assert!(pair[0].from_minute <= pair[1].from_minute);
        }
    }

    #[test]
    fn any_wrap_removes_the_trailing_free_block(
        ranges in prop::collection::vec(arb_range(), 0..6),
        wrap_start in 1u16..1440,
        wrap_end_offset in 0u16..1440,
    ) {
        let mut reservations = to_reservations(&ranges);
        let wrap_end = wrap_end_offset % (wrap_start + 1);
        reservations.push(Reservation::new("w", "1", DATE, hhmm(wrap_start), hhmm(wrap_end), "late"));

        let blocks = project(&reservations, "1", DATE).unwrap();

        prop_assert!(blocks.iter().any(|b| b.wraps));
        prop_assert!(blocks
            .iter()
            .filter(|b| b.is_free())
            .all(|b| b.to_minute < MinuteOfDay::END_OF_DAY));
    }

    #[test]
    fn projection_is_a_pure_function(ranges in prop::collection::vec(arb_range(), 0..10)) {
        let reservations = to_reservations(&ranges);
        let snapshot = reservations.clone();

        let first = project(&reservations, "1", DATE).unwrap();
        let second = project(&reservations, "1", DATE).unwrap();

        prop_assert_eq!(first, second);
        prop_assert_eq!(reservations, snapshot);
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn overlap_detection_is_symmetric(a in arb_range(), b in arb_range()) {
        let draft_a = ReservationDraft::new("1", DATE, hhmm(a.0), hhmm(a.1), "a");
        let draft_b = ReservationDraft::new("1", DATE, hhmm(b.0), hhmm(b.1), "b");
        let existing_a = [Reservation::new("a", "1", DATE, hhmm(a.0), hhmm(a.1), "a")];
        let existing_b = [Reservation::new("b", "1", DATE, hhmm(b.0), hhmm(b.1), "b")];

        let a_against_b = validate_at(&draft_a, &existing_b, None, now()).unwrap();
        let b_against_a = validate_at(&draft_b, &existing_a, None, now()).unwrap();

        let overlaps = |r: Option<&Rejection>| matches!(r, Some(Rejection::Overlap { .. }));
        prop_assert_eq!(overlaps(a_against_b.rejection()), overlaps(b_against_a.rejection()));
        prop_assert_eq!(overlaps(a_against_b.rejection()), a.0 < b.1 && a.1 > b.0);
    }

    #[test]
    fn validation_is_idempotent(
        candidate in arb_range(),
        ranges in prop::collection::vec(arb_range(), 0..6),
    ) {
        let draft = ReservationDraft::new("1", DATE, hhmm(candidate.0), hhmm(candidate.1), "c");
        let existing = to_reservations(&ranges);

        let first = validate_at(&draft, &existing, None, now()).unwrap();
        let second = validate_at(&draft, &existing, None, now()).unwrap();

        prop_assert_eq!(first, second);
    }

    #[test]
    fn accepted_draft_projects_without_overlap(
        candidate in arb_range(),
        ranges in arb_disjoint_ranges(),
    ) {
        let draft = ReservationDraft::new("1", DATE, hhmm(candidate.0), hhmm(candidate.1), "c");
        let mut existing = to_reservations(&ranges);

        if validate_at(&draft, &existing, None, now()).unwrap().is_accepted() {
            existing.push(Reservation::new("new", "1", DATE, hhmm(candidate.0), hhmm(candidate.1), "c"));
            let blocks = project(&existing, "1", DATE).unwrap();
            for pair in blocks.windows(2) {
                prop_assert_eq!(pair[0].to_minute, pair[1].from_minute);
            }
        }
    }
}
