//! Persistence layer.
//!
//! The application talks to storage through the repository traits in
//! [`repository`]; [`repositories`] holds the backends and [`factory`]
//! picks one at startup. The store is the single source of truth for
//! cross-request consistency — there is no shared in-memory booking state.

// Feature flag guard: at least one backend must be compiled in.
#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod error;
pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::{PostgresConfig, PostgresRepository};
pub use repository::{
    BookingRepository, ReservationRepository, RestrictionRepository, RoomRepository,
};
