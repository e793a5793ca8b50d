//! Availability queries.
//!
//! The single source of truth for "free" is the absence of any restriction
//! strictly overlapping the requested interval (half-open test:
//! `existing.start < end && existing.end > start`). Both entry points
//! reject empty and inverted ranges before touching the store.

use chrono::NaiveDate;

use crate::db::BookingRepository;
use crate::models::{Room, StayRange};

use super::error::ServiceResult;

/// Is this room free for `[start, end)`?
pub async fn is_room_free(
    repo: &dyn BookingRepository,
    room_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> ServiceResult<bool> {
    let stay = StayRange::new(start, end)?;
    is_room_free_for(repo, room_id, stay).await
}

/// Range-validated variant used once a [`StayRange`] already exists.
pub async fn is_room_free_for(
    repo: &dyn BookingRepository,
    room_id: i64,
    stay: StayRange,
) -> ServiceResult<bool> {
    Ok(!repo.has_overlapping_restriction(room_id, stay).await?)
}

/// Rooms with no overlapping restriction at all for `[start, end)`.
///
/// One set-subtraction query against the store; must agree with calling
/// [`is_room_free`] per room.
pub async fn free_rooms(
    repo: &dyn BookingRepository,
    start: NaiveDate,
    end: NaiveDate,
) -> ServiceResult<Vec<Room>> {
    let stay = StayRange::new(start, end)?;
    free_rooms_for(repo, stay).await
}

pub async fn free_rooms_for(
    repo: &dyn BookingRepository,
    stay: StayRange,
) -> ServiceResult<Vec<Room>> {
    Ok(repo.rooms_without_restrictions(stay).await?)
}
