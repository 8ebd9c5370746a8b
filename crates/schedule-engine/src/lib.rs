//! # schedule-engine
//!
//! Day-schedule projection and reservation validation for bookable club
//! resources (courts, rooms, establishments).
//!
//! Both halves are pure functions over an explicit snapshot of reservations,
//! as fetched from the reservations API. Nothing is cached, persisted or
//! shared; the same inputs always produce the same output.
//!
//! ```rust
//! use schedule_engine::{project, BlockKind, Reservation};
//!
//! let reservations = vec![Reservation::new("1", "1", "2024-06-01", "08:00", "09:00", "Ana")];
//! let blocks = project(&reservations, "1", "2024-06-01").unwrap();
//!
//! let kinds: Vec<BlockKind> = blocks.iter().map(|b| b.kind).collect();
//! assert_eq!(kinds, [BlockKind::Free, BlockKind::Occupied, BlockKind::Free]);
//! assert_eq!(blocks[1].occupant.as_deref(), Some("Ana"));
//! ```
//!
//! ## Modules
//!
//! - [`projector`] — reservations → ordered free/occupied blocks for one day
//! - [`validator`] — accept or reject a reservation draft before it is written
//! - [`conflict`] — audit a snapshot for overlapping reservations
//! - [`clock`] — `HH:MM` minutes and `YYYY-MM-DD` day keys
//! - [`reservation`] — wire records from the reservations API
//! - [`error`] — Error types

pub mod clock;
pub mod conflict;
pub mod error;
pub mod projector;
pub mod reservation;
pub mod validator;

pub use clock::MinuteOfDay;
pub use conflict::{find_conflicts, Conflict};
pub use error::ScheduleError;
pub use projector::{first_free_block, project, BlockKind, DaySummary, IntervalBlock};
pub use reservation::{parse_reservations, Reservation, ReservationDraft};
pub use validator::{validate, validate_at, Rejection, ValidationResult};
