//! In-memory repository for unit testing and local development.
//!
//! Data lives in one table struct behind a single lock, so the multi-row
//! operations (reservation commit, reservation delete) are naturally
//! atomic — the same guarantee the Postgres backend gets from a
//! transaction.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;

use crate::db::error::{ErrorContext, RepositoryError, RepositoryResult};
use crate::db::repository::{
    BookingRepository, ReservationRepository, RestrictionRepository, RoomRepository,
};
use crate::models::{
    GuestDetails, NewReservation, Reservation, RestrictionKind, Room, RoomRestriction, StayRange,
};

#[derive(Debug, Default)]
struct Tables {
    rooms: Vec<Room>,
    reservations: Vec<Reservation>,
    restrictions: Vec<RoomRestriction>,
    next_reservation_id: i64,
    next_restriction_id: i64,
}

/// In-memory implementation of [`BookingRepository`].
#[derive(Debug)]
pub struct LocalRepository {
    tables: Mutex<Tables>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables {
                next_reservation_id: 1,
                next_restriction_id: 1,
                ..Default::default()
            }),
        }
    }

    /// Seed a room (test/setup helper; room creation is out of band).
    pub fn add_room(&self, id: i64, room_name: &str) -> Room {
        let now = Utc::now();
        let room = Room {
            id,
            room_name: room_name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().rooms.push(room.clone());
        room
    }

    /// Number of restriction rows currently stored (assertion helper).
    pub fn restriction_count(&self) -> usize {
        self.tables.lock().restrictions.len()
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn room_not_found(id: i64) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("room {} does not exist", id),
        ErrorContext::new("room_lookup")
            .with_entity("room")
            .with_entity_id(id),
    )
}

#[async_trait]
impl RoomRepository for LocalRepository {
    async fn all_rooms(&self) -> RepositoryResult<Vec<Room>> {
        let mut rooms = self.tables.lock().rooms.clone();
        rooms.sort_by(|a, b| a.room_name.cmp(&b.room_name));
        Ok(rooms)
    }

    async fn room_by_id(&self, id: i64) -> RepositoryResult<Room> {
        self.tables
            .lock()
            .rooms
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| room_not_found(id))
    }
}

#[async_trait]
impl ReservationRepository for LocalRepository {
    async fn create_reservation(&self, new: NewReservation) -> RepositoryResult<Reservation> {
        let mut tables = self.tables.lock();

        let room = tables
            .rooms
            .iter()
            .find(|r| r.id == new.room_id)
            .cloned()
            .ok_or_else(|| room_not_found(new.room_id))?;

        let now = Utc::now();
        let reservation_id = tables.next_reservation_id;
        tables.next_reservation_id += 1;
        let reservation = Reservation {
            id: reservation_id,
            guest: new.guest,
            room_id: room.id,
            room_name: room.room_name,
            stay: new.stay,
            processed: false,
            created_at: now,
            updated_at: now,
        };
        tables.reservations.push(reservation.clone());

        let restriction_id = tables.next_restriction_id;
        tables.next_restriction_id += 1;
        tables.restrictions.push(RoomRestriction {
            id: restriction_id,
            room_id: reservation.room_id,
            stay: reservation.stay,
            kind: RestrictionKind::Reservation {
                reservation_id: reservation.id,
            },
        });

        Ok(reservation)
    }

    async fn all_reservations(&self) -> RepositoryResult<Vec<Reservation>> {
        let mut reservations = self.tables.lock().reservations.clone();
        reservations.sort_by_key(|r| r.stay.start());
        Ok(reservations)
    }

    async fn new_reservations(&self) -> RepositoryResult<Vec<Reservation>> {
        let mut reservations: Vec<_> = self
            .tables
            .lock()
            .reservations
            .iter()
            .filter(|r| !r.processed)
            .cloned()
            .collect();
        reservations.sort_by_key(|r| r.stay.start());
        Ok(reservations)
    }

    async fn reservation_by_id(&self, id: i64) -> RepositoryResult<Reservation> {
        self.tables
            .lock()
            .reservations
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("reservation {} does not exist", id),
                    ErrorContext::new("reservation_by_id")
                        .with_entity("reservation")
                        .with_entity_id(id),
                )
            })
    }

    async fn update_guest_details(&self, id: i64, guest: &GuestDetails) -> RepositoryResult<()> {
        let mut tables = self.tables.lock();
        let reservation = tables
            .reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| {
                RepositoryError::not_found(format!("reservation {} does not exist", id))
            })?;
        reservation.guest = guest.clone();
        reservation.updated_at = Utc::now();
        Ok(())
    }

    async fn set_processed(&self, id: i64, processed: bool) -> RepositoryResult<()> {
        let mut tables = self.tables.lock();
        let reservation = tables
            .reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| {
                RepositoryError::not_found(format!("reservation {} does not exist", id))
            })?;
        reservation.processed = processed;
        reservation.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_reservation(&self, id: i64) -> RepositoryResult<()> {
        let mut tables = self.tables.lock();
        let before = tables.reservations.len();
        tables.reservations.retain(|r| r.id != id);
        if tables.reservations.len() == before {
            return Err(RepositoryError::not_found(format!(
                "reservation {} does not exist",
                id
            )));
        }
        // Paired restrictions go in the same atomic step.
        tables
            .restrictions
            .retain(|r| r.kind.reservation_id() != Some(id));
        Ok(())
    }
}

#[async_trait]
impl RestrictionRepository for LocalRepository {
    async fn has_overlapping_restriction(
        &self,
        room_id: i64,
        stay: StayRange,
    ) -> RepositoryResult<bool> {
        Ok(self
            .tables
            .lock()
            .restrictions
            .iter()
            .any(|r| r.room_id == room_id && r.stay.overlaps(&stay)))
    }

    async fn rooms_without_restrictions(&self, stay: StayRange) -> RepositoryResult<Vec<Room>> {
        let tables = self.tables.lock();
        let restricted: std::collections::HashSet<i64> = tables
            .restrictions
            .iter()
            .filter(|r| r.stay.overlaps(&stay))
            .map(|r| r.room_id)
            .collect();
        let mut rooms: Vec<_> = tables
            .rooms
            .iter()
            .filter(|r| !restricted.contains(&r.id))
            .cloned()
            .collect();
        rooms.sort_by(|a, b| a.room_name.cmp(&b.room_name));
        Ok(rooms)
    }

    async fn restrictions_for_room_in_range(
        &self,
        room_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<RoomRestriction>> {
        Ok(self
            .tables
            .lock()
            .restrictions
            .iter()
            .filter(|r| r.room_id == room_id && r.stay.intersects_inclusive(start, end))
            .cloned()
            .collect())
    }

    async fn insert_block(&self, room_id: i64, day: NaiveDate) -> RepositoryResult<i64> {
        let mut tables = self.tables.lock();
        if !tables.rooms.iter().any(|r| r.id == room_id) {
            return Err(room_not_found(room_id));
        }
        let id = tables.next_restriction_id;
        tables.next_restriction_id += 1;
        tables.restrictions.push(RoomRestriction {
            id,
            room_id,
            stay: StayRange::one_day(day),
            kind: RestrictionKind::Block,
        });
        Ok(id)
    }

    async fn delete_restriction(&self, id: i64) -> RepositoryResult<()> {
        let mut tables = self.tables.lock();
        let before = tables.restrictions.len();
        tables.restrictions.retain(|r| r.id != id);
        if tables.restrictions.len() == before {
            return Err(RepositoryError::not_found_with_context(
                format!("restriction {} does not exist", id),
                ErrorContext::new("delete_restriction")
                    .with_entity("restriction")
                    .with_entity_id(id),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn stay(start: &str, end: &str) -> StayRange {
        StayRange::new(d(start), d(end)).unwrap()
    }

    #[tokio::test]
    async fn commit_writes_reservation_and_restriction_together() {
        let repo = LocalRepository::new();
        repo.add_room(1, "General's Quarters");

        let reservation = repo
            .create_reservation(NewReservation {
                guest: GuestDetails {
                    first_name: "Ada".into(),
                    last_name: "Byron".into(),
                    email: "ada@example.com".into(),
                    phone: "555-0100".into(),
                },
                room_id: 1,
                stay: stay("2024-05-01", "2024-05-03"),
            })
            .await
            .unwrap();

        let restrictions = repo
            .restrictions_for_room_in_range(1, d("2024-05-01"), d("2024-05-31"))
            .await
            .unwrap();
        assert_eq!(restrictions.len(), 1);
        assert_eq!(
            restrictions[0].kind.reservation_id(),
            Some(reservation.id)
        );
        assert_eq!(restrictions[0].stay, reservation.stay);
    }

    #[tokio::test]
    async fn commit_against_unknown_room_writes_nothing() {
        let repo = LocalRepository::new();
        let err = repo
            .create_reservation(NewReservation {
                guest: GuestDetails::default(),
                room_id: 99,
                stay: stay("2024-05-01", "2024-05-03"),
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(repo.all_reservations().await.unwrap().is_empty());
        assert_eq!(repo.restriction_count(), 0);
    }

    #[tokio::test]
    async fn delete_reservation_removes_paired_restriction() {
        let repo = LocalRepository::new();
        repo.add_room(1, "General's Quarters");
        let reservation = repo
            .create_reservation(NewReservation {
                guest: GuestDetails::default(),
                room_id: 1,
                stay: stay("2024-05-01", "2024-05-03"),
            })
            .await
            .unwrap();

        repo.delete_reservation(reservation.id).await.unwrap();
        assert_eq!(repo.restriction_count(), 0);
    }

    #[tokio::test]
    async fn delete_restriction_on_unknown_id_is_an_error() {
        let repo = LocalRepository::new();
        assert!(repo.delete_restriction(42).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn range_listing_is_end_inclusive() {
        let repo = LocalRepository::new();
        repo.add_room(1, "General's Quarters");
        // starts exactly on the window's end day
        repo.insert_block(1, d("2024-05-31")).await.unwrap();

        let hit = repo
            .restrictions_for_room_in_range(1, d("2024-05-01"), d("2024-05-31"))
            .await
            .unwrap();
        assert_eq!(hit.len(), 1);

        // strict overlap check does not see it
        assert!(!repo
            .has_overlapping_restriction(1, stay("2024-05-01", "2024-05-31"))
            .await
            .unwrap());
    }
}
