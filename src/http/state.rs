//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::BookingRepository;
use crate::services::MailSender;
use crate::session::SessionStore;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn BookingRepository>,
    /// Per-visitor session storage
    pub sessions: Arc<dyn SessionStore>,
    /// Handle to the outbound mail queue
    pub mailer: MailSender,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn BookingRepository>,
        sessions: Arc<dyn SessionStore>,
        mailer: MailSender,
    ) -> Self {
        Self {
            repository,
            sessions,
            mailer,
        }
    }
}
