//! Row types mapping the booking schema to the domain model.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use super::schema::{reservations, room_restrictions, rooms};
use crate::db::error::{RepositoryError, RepositoryResult};
use crate::models::{
    GuestDetails, Reservation, RestrictionKind, Room, RoomRestriction, StayRange,
};

#[derive(Debug, Queryable, Identifiable)]
#[diesel(table_name = rooms)]
pub struct RoomRow {
    pub id: i64,
    pub room_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: row.id,
            room_name: row.room_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Queryable, Identifiable)]
#[diesel(table_name = reservations)]
pub struct ReservationRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_id: i64,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationRow {
    /// Join result → domain type. The stored interval was validated on the
    /// way in, so a broken row is an internal error, not user input.
    pub fn into_domain(self, room_name: String) -> RepositoryResult<Reservation> {
        let stay = StayRange::new(self.start_date, self.end_date).map_err(|e| {
            RepositoryError::internal(format!("reservation {} has {}", self.id, e))
        })?;
        Ok(Reservation {
            id: self.id,
            guest: GuestDetails {
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                phone: self.phone,
            },
            room_id: self.room_id,
            room_name,
            stay,
            processed: self.processed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reservations)]
pub struct NewReservationRow<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_id: i64,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Queryable, Identifiable)]
#[diesel(table_name = room_restrictions)]
pub struct RestrictionRow {
    pub id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_id: i64,
    pub reservation_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RestrictionRow {
    pub fn into_domain(self) -> RepositoryResult<RoomRestriction> {
        let stay = StayRange::new(self.start_date, self.end_date).map_err(|e| {
            RepositoryError::internal(format!("restriction {} has {}", self.id, e))
        })?;
        let kind = match self.reservation_id {
            Some(reservation_id) => RestrictionKind::Reservation { reservation_id },
            None => RestrictionKind::Block,
        };
        Ok(RoomRestriction {
            id: self.id,
            room_id: self.room_id,
            stay,
            kind,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = room_restrictions)]
pub struct NewRestrictionRow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_id: i64,
    pub reservation_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
