//! The session-carried draft reservation.
//!
//! A booking is assembled across several requests. Instead of an untyped
//! session map, the in-progress state is one explicit value that can only
//! move forward through its stages:
//!
//! `DatesChosen` → `RoomChosen` → `Committed`
//!
//! The draft is serialized into the visitor's session between requests and
//! is consumed (removed) exactly once by the summary page.

use serde::{Deserialize, Serialize};

use super::booking::{Reservation, Room};
use super::dates::StayRange;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DraftReservation {
    /// A successful availability search fixed the dates.
    DatesChosen { stay: StayRange },
    /// The visitor picked an available room for those dates.
    RoomChosen { stay: StayRange, room: Room },
    /// The booking was written to the store; kept around only so the
    /// summary page can show it once.
    Committed { reservation: Reservation },
}

impl DraftReservation {
    pub fn new(stay: StayRange) -> Self {
        DraftReservation::DatesChosen { stay }
    }

    /// Dates of the draft, whatever the stage.
    pub fn stay(&self) -> StayRange {
        match self {
            DraftReservation::DatesChosen { stay } => *stay,
            DraftReservation::RoomChosen { stay, .. } => *stay,
            DraftReservation::Committed { reservation } => reservation.stay,
        }
    }

    /// Attach (or replace) the chosen room. Committed drafts are final.
    pub fn with_room(self, room: Room) -> Option<Self> {
        match self {
            DraftReservation::DatesChosen { stay }
            | DraftReservation::RoomChosen { stay, .. } => {
                Some(DraftReservation::RoomChosen { stay, room })
            }
            DraftReservation::Committed { .. } => None,
        }
    }

    pub fn room(&self) -> Option<&Room> {
        match self {
            DraftReservation::RoomChosen { room, .. } => Some(room),
            _ => None,
        }
    }

    pub fn committed(&self) -> Option<&Reservation> {
        match self {
            DraftReservation::Committed { reservation } => Some(reservation),
            _ => None,
        }
    }
}
