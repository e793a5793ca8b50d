//! Repository traits — the narrow persistence contract the engine runs on.
//!
//! The traits are split by capability so tests and tools can depend on only
//! what they use; [`BookingRepository`] is the umbrella the application
//! consumes. Implementations must be `Send + Sync` to work with async Rust.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::models::{
    GuestDetails, NewReservation, Reservation, Room, RoomRestriction, StayRange,
};

/// Read-only access to the room reference data.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// All rooms, ordered by name.
    async fn all_rooms(&self) -> RepositoryResult<Vec<Room>>;

    /// One room by id; `NotFound` if it does not exist.
    async fn room_by_id(&self, id: i64) -> RepositoryResult<Room>;
}

/// Reservation rows and their lifecycle.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert a reservation **and** its paired Reservation-kind restriction
    /// covering the same room and interval, in a single transaction.
    /// Either both rows exist afterwards or neither does.
    async fn create_reservation(&self, new: NewReservation) -> RepositoryResult<Reservation>;

    /// All reservations, ordered by start date, room name joined.
    async fn all_reservations(&self) -> RepositoryResult<Vec<Reservation>>;

    /// Reservations not yet marked processed, ordered by start date.
    async fn new_reservations(&self) -> RepositoryResult<Vec<Reservation>>;

    async fn reservation_by_id(&self, id: i64) -> RepositoryResult<Reservation>;

    /// Update the guest contact fields of an existing reservation.
    async fn update_guest_details(&self, id: i64, guest: &GuestDetails) -> RepositoryResult<()>;

    async fn set_processed(&self, id: i64, processed: bool) -> RepositoryResult<()>;

    /// Delete a reservation together with its paired restrictions, in a
    /// single transaction.
    async fn delete_reservation(&self, id: i64) -> RepositoryResult<()>;
}

/// The restriction store: date intervals blocking a room.
#[async_trait]
pub trait RestrictionRepository: Send + Sync {
    /// True if the room owns at least one restriction (of any kind) that
    /// strictly overlaps `stay` (`existing.start < stay.end && existing.end
    /// > stay.start`).
    async fn has_overlapping_restriction(
        &self,
        room_id: i64,
        stay: StayRange,
    ) -> RepositoryResult<bool>;

    /// Rooms with no overlapping restriction at all for `stay`. Implemented
    /// as "all rooms minus rooms owning an overlapping restriction" — one
    /// query, not a per-room loop.
    async fn rooms_without_restrictions(&self, stay: StayRange) -> RepositoryResult<Vec<Room>>;

    /// All restrictions for a room intersecting `[start, end]` with the
    /// end day treated inclusively (`start < r.end && end >= r.start`).
    async fn restrictions_for_room_in_range(
        &self,
        room_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<RoomRestriction>>;

    /// Insert a one-day `[day, day + 1)` Block-kind restriction; returns the
    /// new restriction id.
    async fn insert_block(&self, room_id: i64, day: NaiveDate) -> RepositoryResult<i64>;

    /// Delete a restriction by id. Deleting an unknown id is `NotFound`,
    /// propagated to the caller rather than swallowed.
    async fn delete_restriction(&self, id: i64) -> RepositoryResult<()>;
}

/// Everything the application needs from a storage backend.
#[async_trait]
pub trait BookingRepository:
    RoomRepository + ReservationRepository + RestrictionRepository
{
    /// Cheap connectivity probe for the health endpoint.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
