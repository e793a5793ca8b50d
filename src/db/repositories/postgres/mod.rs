//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Per-connection `statement_timeout` so a stalled query fails fast
//!   instead of hanging a request worker
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 5)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_STATEMENT_TIMEOUT_MS`: Per-query timeout in milliseconds (default: 3000)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::db::error::{ErrorContext, RepositoryError, RepositoryResult};
use crate::db::repository::{
    BookingRepository, ReservationRepository, RestrictionRepository, RoomRepository,
};
use crate::models::{
    GuestDetails, NewReservation, Reservation, Room, RoomRestriction, StayRange,
};

mod models;
mod schema;

use models::*;
use schema::{reservations, room_restrictions, rooms};

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations =
    embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Pool checkout timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Per-query `statement_timeout` in milliseconds
    pub statement_timeout_ms: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 5,
            idle_timeout_sec: 600,
            statement_timeout_ms: 3000,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", 10),
            min_pool_size: env_or("PG_POOL_MIN", 1),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", 5),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", 600),
            statement_timeout_ms: env_or("PG_STATEMENT_TIMEOUT_MS", 3000),
            max_retries: env_or("PG_MAX_RETRIES", 3),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", 100),
        })
    }

    /// Create a new configuration with a database URL and defaults.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Applied to every pooled connection so queries fail fast rather than hang.
#[derive(Debug)]
struct StatementTimeout(u64);

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for StatementTimeout {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        sql_query(format!("SET statement_timeout = {}", self.0))
            .execute(conn)
            .map(drop)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Postgres-backed implementation of [`BookingRepository`].
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .connection_customizer(Box::new(StatementTimeout(config.statement_timeout_ms)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool"),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
                RepositoryError::internal_with_context(
                    format!("Migration failed: {}", e),
                    ErrorContext::new("run_migrations"),
                )
            })?;
        }

        Ok(Self { pool, config })
    }

    /// Execute a database operation on the blocking pool, retrying
    /// transient failures with exponential backoff.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection(e.to_string());
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        log::warn!("retrying repository operation after: {}", e);
                        last_error = Some(e);
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn load_reservations(
    conn: &mut PgConnection,
    only_unprocessed: bool,
) -> RepositoryResult<Vec<Reservation>> {
    let mut query = reservations::table
        .inner_join(rooms::table)
        .order(reservations::start_date.asc())
        .select((reservations::all_columns, rooms::room_name))
        .into_boxed();
    if only_unprocessed {
        query = query.filter(reservations::processed.eq(false));
    }
    let rows: Vec<(ReservationRow, String)> = query.load(conn)?;
    rows.into_iter()
        .map(|(row, room_name)| row.into_domain(room_name))
        .collect()
}

#[async_trait]
impl RoomRepository for PostgresRepository {
    async fn all_rooms(&self) -> RepositoryResult<Vec<Room>> {
        self.with_conn(|conn| {
            let rows: Vec<RoomRow> = rooms::table
                .order(rooms::room_name.asc())
                .load(conn)?;
            Ok(rows.into_iter().map(Room::from).collect())
        })
        .await
    }

    async fn room_by_id(&self, id: i64) -> RepositoryResult<Room> {
        self.with_conn(move |conn| {
            let row: RoomRow = rooms::table.find(id).first(conn).map_err(|e| {
                RepositoryError::from(e).into_not_found_for("room", id)
            })?;
            Ok(Room::from(row))
        })
        .await
    }
}

#[async_trait]
impl ReservationRepository for PostgresRepository {
    async fn create_reservation(&self, new: NewReservation) -> RepositoryResult<Reservation> {
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|conn| {
                let room: RoomRow = rooms::table.find(new.room_id).first(conn).map_err(|e| {
                    RepositoryError::from(e).into_not_found_for("room", new.room_id)
                })?;

                let now = Utc::now();
                let inserted: ReservationRow = diesel::insert_into(reservations::table)
                    .values(NewReservationRow {
                        first_name: &new.guest.first_name,
                        last_name: &new.guest.last_name,
                        email: &new.guest.email,
                        phone: &new.guest.phone,
                        start_date: new.stay.start(),
                        end_date: new.stay.end(),
                        room_id: new.room_id,
                        processed: false,
                        created_at: now,
                        updated_at: now,
                    })
                    .get_result(conn)?;

                diesel::insert_into(room_restrictions::table)
                    .values(NewRestrictionRow {
                        start_date: new.stay.start(),
                        end_date: new.stay.end(),
                        room_id: new.room_id,
                        reservation_id: Some(inserted.id),
                        created_at: now,
                        updated_at: now,
                    })
                    .execute(conn)?;

                inserted.into_domain(room.room_name)
            })
        })
        .await
    }

    async fn all_reservations(&self) -> RepositoryResult<Vec<Reservation>> {
        self.with_conn(|conn| load_reservations(conn, false)).await
    }

    async fn new_reservations(&self) -> RepositoryResult<Vec<Reservation>> {
        self.with_conn(|conn| load_reservations(conn, true)).await
    }

    async fn reservation_by_id(&self, id: i64) -> RepositoryResult<Reservation> {
        self.with_conn(move |conn| {
            let (row, room_name): (ReservationRow, String) = reservations::table
                .inner_join(rooms::table)
                .filter(reservations::id.eq(id))
                .select((reservations::all_columns, rooms::room_name))
                .first(conn)
                .map_err(|e| RepositoryError::from(e).into_not_found_for("reservation", id))?;
            row.into_domain(room_name)
        })
        .await
    }

    async fn update_guest_details(&self, id: i64, guest: &GuestDetails) -> RepositoryResult<()> {
        let guest = guest.clone();
        self.with_conn(move |conn| {
            let affected = diesel::update(reservations::table.find(id))
                .set((
                    reservations::first_name.eq(&guest.first_name),
                    reservations::last_name.eq(&guest.last_name),
                    reservations::email.eq(&guest.email),
                    reservations::phone.eq(&guest.phone),
                    reservations::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;
            if affected == 0 {
                return Err(RepositoryError::not_found(format!(
                    "reservation {} does not exist",
                    id
                )));
            }
            Ok(())
        })
        .await
    }

    async fn set_processed(&self, id: i64, processed: bool) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let affected = diesel::update(reservations::table.find(id))
                .set((
                    reservations::processed.eq(processed),
                    reservations::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;
            if affected == 0 {
                return Err(RepositoryError::not_found(format!(
                    "reservation {} does not exist",
                    id
                )));
            }
            Ok(())
        })
        .await
    }

    async fn delete_reservation(&self, id: i64) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|conn| {
                diesel::delete(
                    room_restrictions::table.filter(room_restrictions::reservation_id.eq(id)),
                )
                .execute(conn)?;
                let affected =
                    diesel::delete(reservations::table.find(id)).execute(conn)?;
                if affected == 0 {
                    return Err(RepositoryError::not_found(format!(
                        "reservation {} does not exist",
                        id
                    )));
                }
                Ok(())
            })
        })
        .await
    }
}

#[async_trait]
impl RestrictionRepository for PostgresRepository {
    async fn has_overlapping_restriction(
        &self,
        room_id: i64,
        stay: StayRange,
    ) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            let count: i64 = room_restrictions::table
                .filter(room_restrictions::room_id.eq(room_id))
                .filter(room_restrictions::start_date.lt(stay.end()))
                .filter(room_restrictions::end_date.gt(stay.start()))
                .count()
                .get_result(conn)?;
            Ok(count > 0)
        })
        .await
    }

    async fn rooms_without_restrictions(&self, stay: StayRange) -> RepositoryResult<Vec<Room>> {
        self.with_conn(move |conn| {
            let restricted = room_restrictions::table
                .filter(room_restrictions::start_date.lt(stay.end()))
                .filter(room_restrictions::end_date.gt(stay.start()))
                .select(room_restrictions::room_id);
            let rows: Vec<RoomRow> = rooms::table
                .filter(rooms::id.ne_all(restricted))
                .order(rooms::room_name.asc())
                .load(conn)?;
            Ok(rows.into_iter().map(Room::from).collect())
        })
        .await
    }

    async fn restrictions_for_room_in_range(
        &self,
        room_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<RoomRestriction>> {
        self.with_conn(move |conn| {
            // end-inclusive on purpose: start < end_date AND end >= start_date
            let rows: Vec<RestrictionRow> = room_restrictions::table
                .filter(room_restrictions::room_id.eq(room_id))
                .filter(room_restrictions::end_date.gt(start))
                .filter(room_restrictions::start_date.le(end))
                .load(conn)?;
            rows.into_iter().map(RestrictionRow::into_domain).collect()
        })
        .await
    }

    async fn insert_block(&self, room_id: i64, day: NaiveDate) -> RepositoryResult<i64> {
        self.with_conn(move |conn| {
            let stay = StayRange::one_day(day);
            let now = Utc::now();
            let row: RestrictionRow = diesel::insert_into(room_restrictions::table)
                .values(NewRestrictionRow {
                    start_date: stay.start(),
                    end_date: stay.end(),
                    room_id,
                    reservation_id: None,
                    created_at: now,
                    updated_at: now,
                })
                .get_result(conn)?;
            Ok(row.id)
        })
        .await
    }

    async fn delete_restriction(&self, id: i64) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let affected =
                diesel::delete(room_restrictions::table.find(id)).execute(conn)?;
            if affected == 0 {
                return Err(RepositoryError::not_found_with_context(
                    format!("restriction {} does not exist", id),
                    ErrorContext::new("delete_restriction")
                        .with_entity("restriction")
                        .with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl BookingRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1").execute(conn)?;
            Ok(true)
        })
        .await
    }
}
