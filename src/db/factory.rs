//! Repository factory for dependency injection.

use std::str::FromStr;
use std::sync::Arc;

use super::repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
use super::repositories::{PostgresConfig, PostgresRepository};
use super::repository::BookingRepository;
use crate::db::error::{RepositoryError, RepositoryResult};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Postgres + Diesel implementation
    Postgres,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment.
    ///
    /// Reads `REPOSITORY_TYPE`. Defaults to Postgres if a database URL is
    /// present, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var("DATABASE_URL").is_ok() || std::env::var("PG_DATABASE_URL").is_ok() {
            Self::Postgres
        } else {
            Self::Local
        }
    }
}

/// Centralized creation of repository instances.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create an in-memory local repository.
    pub fn create_local() -> Arc<dyn BookingRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create a Postgres repository (runs migrations).
    #[cfg(feature = "postgres-repo")]
    pub fn create_postgres(config: &PostgresConfig) -> RepositoryResult<Arc<dyn BookingRepository>> {
        let repo = PostgresRepository::new(config.clone())?;
        Ok(Arc::new(repo))
    }

    /// Create the repository described by a TOML config file.
    pub fn from_config_file<P: AsRef<std::path::Path>>(
        path: P,
    ) -> RepositoryResult<Arc<dyn BookingRepository>> {
        let config = super::repo_config::RepositoryConfig::from_file(path)?;
        match config
            .repository_type()
            .map_err(RepositoryError::configuration)?
        {
            RepositoryType::Postgres => {
                #[cfg(feature = "postgres-repo")]
                {
                    let database = config.database.ok_or_else(|| {
                        RepositoryError::configuration(
                            "Postgres repository requires a [database] url",
                        )
                    })?;
                    Self::create_postgres(&PostgresConfig::with_url(database.url))
                }
                #[cfg(not(feature = "postgres-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "Postgres repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create the repository selected by the environment.
    pub fn from_env() -> RepositoryResult<Arc<dyn BookingRepository>> {
        match RepositoryType::from_env() {
            RepositoryType::Postgres => {
                #[cfg(feature = "postgres-repo")]
                {
                    let config = PostgresConfig::from_env()
                        .map_err(RepositoryError::configuration)?;
                    Self::create_postgres(&config)
                }
                #[cfg(not(feature = "postgres-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "Postgres repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_type_from_str() {
        assert_eq!(
            RepositoryType::from_str("local").unwrap(),
            RepositoryType::Local
        );
        assert_eq!(
            RepositoryType::from_str("postgres").unwrap(),
            RepositoryType::Postgres
        );
        assert_eq!(RepositoryType::from_str("Pg").unwrap(), RepositoryType::Postgres);
        assert!(RepositoryType::from_str("invalid").is_err());
    }

    #[tokio::test]
    async fn create_local_repository() {
        let repo = RepositoryFactory::create_local();
        assert!(repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn create_from_config_file() {
        let path = std::env::temp_dir().join("innkeep-factory-test.toml");
        std::fs::write(&path, "[repository]\ntype = \"local\"\n").unwrap();
        let repo = RepositoryFactory::from_config_file(&path).unwrap();
        assert!(repo.health_check().await.unwrap());
        let _ = std::fs::remove_file(&path);
    }
}
