//! # Innkeep
//!
//! Room-booking backend for a single property.
//!
//! Visitors search availability for a date range, pick a room and complete a
//! reservation across a session-carried multi-step flow; administrators
//! review bookings and maintain a per-room calendar of reservations and
//! manual blocks. All of it is backed by one store of room restrictions:
//! date intervals during which a room cannot be booked, each tied either to
//! a confirmed reservation or to a manual block.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: domain types — rooms, reservations, restrictions, the
//!   draft-reservation state machine and date-interval arithmetic
//! - [`db`]: repository traits, the in-memory backend and the optional
//!   Postgres backend
//! - [`services`]: availability queries, the reservation workflow, calendar
//!   reconciliation and the outbound mail queue
//! - [`session`]: per-visitor key/value state used to carry drafts and
//!   flash messages across requests
//! - [`http`]: axum handlers, router and view models (feature-gated)

pub mod db;
pub mod models;
pub mod services;
pub mod session;

#[cfg(feature = "http-server")]
pub mod http;
