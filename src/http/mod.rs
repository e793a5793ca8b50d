//! HTTP surface for the booking backend.
//!
//! Thin axum handlers over the service layer: pages are strongly-typed
//! view models serialized as JSON, flow control is redirects plus
//! session-carried flash messages. Template rendering, CSRF and auth
//! policy live outside this crate.

pub mod admin;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod session_layer;
pub mod state;

#[cfg(test)]
mod tests;

pub use error::{ApiError, AppError};
pub use router::create_router;
pub use state::AppState;
