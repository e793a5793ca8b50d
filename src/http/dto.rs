//! View models and form types for the HTTP surface.
//!
//! Every page gets its own struct with every field explicit — the renderer
//! receives exactly what the handler populated, nothing is looked up by
//! string key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{DayStatus, Reservation, Room, StayRange, DATE_FMT};
use crate::services::calendar::MonthGrid;
use crate::services::FieldErrors;

/// One-shot session messages rendered at the top of a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Messages {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Messages {
    pub fn from_session(session: &crate::session::Session) -> Self {
        Self {
            flash: session.pop_flash(),
            error: session.pop_error(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomView {
    pub id: i64,
    pub room_name: String,
}

impl From<Room> for RoomView {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            room_name: room.room_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StayView {
    pub start_date: String,
    pub end_date: String,
}

impl From<StayRange> for StayView {
    fn from(stay: StayRange) -> Self {
        Self {
            start_date: stay.start().format(DATE_FMT).to_string(),
            end_date: stay.end().format(DATE_FMT).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationView {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub room_id: i64,
    pub room_name: String,
    pub start_date: String,
    pub end_date: String,
    pub processed: bool,
}

impl From<Reservation> for ReservationView {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            first_name: r.guest.first_name,
            last_name: r.guest.last_name,
            email: r.guest.email,
            phone: r.guest.phone,
            room_id: r.room_id,
            room_name: r.room_name,
            start_date: r.stay.start().format(DATE_FMT).to_string(),
            end_date: r.stay.end().format(DATE_FMT).to_string(),
            processed: r.processed,
        }
    }
}

// ── visitor pages ────────────────────────────────────────────────────

/// GET /search-availability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(flatten)]
    pub messages: Messages,
}

/// POST /search-availability form fields.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchForm {
    pub start: String,
    pub end: String,
}

/// Room choices after a successful search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChooseRoomPage {
    pub stay: StayView,
    pub rooms: Vec<RoomView>,
}

/// GET /rooms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomsPage {
    pub rooms: Vec<RoomView>,
}

/// GET /rooms/{id}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomPage {
    pub room: RoomView,
    #[serde(flatten)]
    pub messages: Messages,
}

/// POST /search-availability-by-id form fields.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomSearchForm {
    pub room_id: i64,
    pub start: String,
    pub end: String,
}

/// Guest form echo for redisplay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuestFormView {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// GET/POST /make-reservation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakeReservationPage {
    pub stay: StayView,
    pub room: RoomView,
    pub form: GuestFormView,
    /// field name → messages; empty on first render
    pub errors: BTreeMap<String, Vec<String>>,
}

impl MakeReservationPage {
    pub fn fresh(stay: StayRange, room: Room) -> Self {
        Self {
            stay: stay.into(),
            room: room.into(),
            form: GuestFormView::default(),
            errors: BTreeMap::new(),
        }
    }

    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = errors.into_inner();
        self
    }
}

/// GET /reservation-summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryPage {
    pub reservation: ReservationView,
    pub stay: StayView,
}

/// POST /api/search-availability response (shape kept from the original).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub result: bool,
    pub msg: String,
}

/// GET /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

// ── admin pages ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminReservationsPage {
    /// "all" or "new" — which listing this is
    pub src: String,
    pub reservations: Vec<ReservationView>,
    #[serde(flatten)]
    pub messages: Messages,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminReservationDetailPage {
    pub src: String,
    pub reservation: ReservationView,
    pub errors: BTreeMap<String, Vec<String>>,
}

/// Per-day cell on the calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DayCell {
    Free,
    Reserved { reservation_id: i64 },
    Blocked { restriction_id: i64 },
}

impl From<DayStatus> for DayCell {
    fn from(status: DayStatus) -> Self {
        match status {
            DayStatus::Free => DayCell::Free,
            DayStatus::Reserved { reservation_id } => DayCell::Reserved { reservation_id },
            DayStatus::Blocked { restriction_id } => DayCell::Blocked { restriction_id },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDayView {
    /// `YYYY-MM-D` key as used by the form field names
    pub day: String,
    #[serde(flatten)]
    pub cell: DayCell,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarRoomView {
    pub room: RoomView,
    pub days: Vec<CalendarDayView>,
}

/// GET /admin/reservations-calendar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarPage {
    pub year: i32,
    pub month: u32,
    pub rooms: Vec<CalendarRoomView>,
    #[serde(flatten)]
    pub messages: Messages,
}

impl CalendarPage {
    pub fn from_grid(grid: MonthGrid, messages: Messages) -> Self {
        let rooms = grid
            .rooms
            .into_iter()
            .map(|rc| CalendarRoomView {
                room: rc.room.into(),
                days: rc
                    .days
                    .into_iter()
                    .map(|(day, status)| CalendarDayView {
                        day: crate::models::day_key(day),
                        cell: status.into(),
                    })
                    .collect(),
            })
            .collect();
        Self {
            year: grid.year,
            month: grid.month,
            rooms,
            messages,
        }
    }
}

/// Month selector on the calendar page.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarQuery {
    pub y: Option<i32>,
    pub m: Option<u32>,
}
