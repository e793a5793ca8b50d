//! Optional TOML configuration for repository selection.
//!
//! Environment variables always work; a `repository.toml` next to the
//! binary (or pointed at by `INNKEEP_CONFIG`) can pin the backend instead:
//!
//! ```toml
//! [repository]
//! type = "postgres"
//!
//! [database]
//! url = "postgres://innkeep@localhost/innkeep"
//! ```

use std::path::Path;

use serde::Deserialize;

use super::error::{RepositoryError, RepositoryResult};
use super::factory::RepositoryType;

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySection,
    #[serde(default)]
    pub database: Option<DatabaseSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositorySection {
    /// "local" or "postgres"
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

impl RepositoryConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let raw = std::fs::read_to_string(&path).map_err(|e| {
            RepositoryError::configuration(format!(
                "cannot read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        toml::from_str(&raw)
            .map_err(|e| RepositoryError::configuration(format!("invalid config: {}", e)))
    }

    /// Look for `repository.toml` in `INNKEEP_CONFIG` or the working
    /// directory.
    pub fn from_default_location() -> RepositoryResult<Self> {
        if let Ok(path) = std::env::var("INNKEEP_CONFIG") {
            return Self::from_file(path);
        }
        Self::from_file("repository.toml")
    }

    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        self.repository.kind.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_local_backend() {
        let config: RepositoryConfig = toml::from_str("[repository]\ntype = \"local\"\n").unwrap();
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
        assert!(config.database.is_none());
    }

    #[test]
    fn parses_postgres_backend_with_url() {
        let config: RepositoryConfig = toml::from_str(
            "[repository]\ntype = \"pg\"\n\n[database]\nurl = \"postgres://localhost/innkeep\"\n",
        )
        .unwrap();
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Postgres);
        assert_eq!(
            config.database.unwrap().url,
            "postgres://localhost/innkeep"
        );
    }

    #[test]
    fn rejects_unknown_backend() {
        let config: RepositoryConfig =
            toml::from_str("[repository]\ntype = \"sqlite\"\n").unwrap();
        assert!(config.repository_type().is_err());
    }
}
