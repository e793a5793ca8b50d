//! Rooms, reservations and the restriction records that tie them together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dates::StayRange;

/// A bookable room. Reference data, created by administrators out of band
/// and read-only to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub room_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a restriction stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestrictionKind {
    /// The interval is held by a confirmed reservation.
    Reservation { reservation_id: i64 },
    /// Staff blocked the interval manually from the calendar.
    Block,
}

impl RestrictionKind {
    pub fn reservation_id(&self) -> Option<i64> {
        match self {
            RestrictionKind::Reservation { reservation_id } => Some(*reservation_id),
            RestrictionKind::Block => None,
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, RestrictionKind::Block)
    }
}

/// A date interval during which a room cannot be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRestriction {
    pub id: i64,
    pub room_id: i64,
    pub stay: StayRange,
    pub kind: RestrictionKind,
}

/// Guest contact details collected by the reservation form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// A confirmed reservation. Its existence always implies exactly one paired
/// `RestrictionKind::Reservation` restriction with the same room and
/// interval — both rows are written in one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub guest: GuestDetails,
    pub room_id: i64,
    pub room_name: String,
    pub stay: StayRange,
    /// Cleared bookings are hidden from the admin "new" listing.
    pub processed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for the transactional reservation commit.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub guest: GuestDetails,
    pub room_id: i64,
    pub stay: StayRange,
}

/// Outbound confirmation message handed to the mail queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailData {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub content: String,
}

/// One day on the admin calendar, for one room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayStatus {
    Free,
    Reserved { reservation_id: i64 },
    Blocked { restriction_id: i64 },
}

impl DayStatus {
    pub fn is_free(&self) -> bool {
        matches!(self, DayStatus::Free)
    }
}
