//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use innkeep::db::{
    BookingRepository, LocalRepository, RepositoryResult, ReservationRepository,
    RestrictionRepository, RoomRepository,
};
use innkeep::models::{
    GuestDetails, NewReservation, Reservation, Room, RoomRestriction, StayRange,
};
use innkeep::session::{MemorySessionStore, Session, SessionStore};

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

pub fn stay(start: &str, end: &str) -> StayRange {
    StayRange::new(date(start), date(end)).unwrap()
}

pub fn guest(first: &str, last: &str, email: &str) -> GuestDetails {
    GuestDetails {
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        phone: "555-0100".to_string(),
    }
}

/// Repository with the two standard rooms seeded.
pub fn seeded_repo() -> Arc<LocalRepository> {
    let repo = Arc::new(LocalRepository::new());
    repo.add_room(1, "General's Quarters");
    repo.add_room(2, "Major's Suite");
    repo
}

/// Fresh session bound to an in-memory store.
pub fn fresh_session() -> Session {
    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    innkeep::session::session_for(&store, "test-visitor")
}

/// Wrapper that counts `delete_restriction` calls while delegating
/// everything to a [`LocalRepository`].
pub struct CountingRepo {
    pub inner: Arc<LocalRepository>,
    pub deletes: AtomicUsize,
}

impl CountingRepo {
    pub fn new(inner: Arc<LocalRepository>) -> Self {
        Self {
            inner,
            deletes: AtomicUsize::new(0),
        }
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoomRepository for CountingRepo {
    async fn all_rooms(&self) -> RepositoryResult<Vec<Room>> {
        self.inner.all_rooms().await
    }

    async fn room_by_id(&self, id: i64) -> RepositoryResult<Room> {
        self.inner.room_by_id(id).await
    }
}

#[async_trait]
impl ReservationRepository for CountingRepo {
    async fn create_reservation(&self, new: NewReservation) -> RepositoryResult<Reservation> {
        self.inner.create_reservation(new).await
    }

    async fn all_reservations(&self) -> RepositoryResult<Vec<Reservation>> {
        self.inner.all_reservations().await
    }

    async fn new_reservations(&self) -> RepositoryResult<Vec<Reservation>> {
        self.inner.new_reservations().await
    }

    async fn reservation_by_id(&self, id: i64) -> RepositoryResult<Reservation> {
        self.inner.reservation_by_id(id).await
    }

    async fn update_guest_details(&self, id: i64, guest: &GuestDetails) -> RepositoryResult<()> {
        self.inner.update_guest_details(id, guest).await
    }

    async fn set_processed(&self, id: i64, processed: bool) -> RepositoryResult<()> {
        self.inner.set_processed(id, processed).await
    }

    async fn delete_reservation(&self, id: i64) -> RepositoryResult<()> {
        self.inner.delete_reservation(id).await
    }
}

#[async_trait]
impl RestrictionRepository for CountingRepo {
    async fn has_overlapping_restriction(
        &self,
        room_id: i64,
        stay: StayRange,
    ) -> RepositoryResult<bool> {
        self.inner.has_overlapping_restriction(room_id, stay).await
    }

    async fn rooms_without_restrictions(&self, stay: StayRange) -> RepositoryResult<Vec<Room>> {
        self.inner.rooms_without_restrictions(stay).await
    }

    async fn restrictions_for_room_in_range(
        &self,
        room_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<RoomRestriction>> {
        self.inner
            .restrictions_for_room_in_range(room_id, start, end)
            .await
    }

    async fn insert_block(&self, room_id: i64, day: NaiveDate) -> RepositoryResult<i64> {
        self.inner.insert_block(room_id, day).await
    }

    async fn delete_restriction(&self, id: i64) -> RepositoryResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_restriction(id).await
    }
}

#[async_trait]
impl BookingRepository for CountingRepo {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.inner.health_check().await
    }
}
