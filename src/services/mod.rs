//! Service layer — availability decisions, the reservation workflow,
//! calendar reconciliation and outbound mail.
//!
//! Services take the repository and session abstractions as plain
//! arguments; they hold no state of their own.

pub mod availability;
pub mod calendar;
pub mod error;
pub mod forms;
pub mod mailer;
pub mod reservations;

pub use availability::{free_rooms, is_room_free};
pub use calendar::{apply_calendar_edits, build_month_grid, CalendarForm, MonthGrid, RoomCalendar};
pub use error::{ServiceError, ServiceResult};
pub use forms::{FieldErrors, GuestForm};
pub use mailer::{confirmation_email, start_mailer, LogTransport, MailSender, MailTransport};
