//! Domain types shared by every layer.

pub mod booking;
pub mod dates;
pub mod draft;

pub use booking::{
    DayStatus, GuestDetails, MailData, NewReservation, Reservation, RestrictionKind, Room,
    RoomRestriction,
};
pub use dates::{day_key, month_bounds, InvalidRange, StayRange, DATE_FMT};
pub use draft::DraftReservation;
