use async_trait::async_trait;
use tracing::debug;
use vat_core::db::{DbConfig, RepositoryFactory};
use vat_core::{RepositoryError, VehicleRepository};

use crate::repository::SqliteRepository;

/// Maps a connection string to a sqlx SQLite URL.
///
/// * `":memory:"`: a private in-memory database.
/// * A `sqlite:` URL: used as is.
/// * Anything else is a file path, created if it does not exist.
pub fn connection_url(connection_string: &str) -> String {
    let trimmed = connection_string.trim();
    if trimmed == ":memory:" {
        "sqlite::memory:".to_string()
    } else if trimmed.starts_with("sqlite:") {
        trimmed.to_string()
    } else {
        format!("sqlite:{}?mode=rwc", trimmed)
    }
}

/// [`RepositoryFactory`] for the `"sqlite"` backend.
///
/// ```rust,no_run
/// use vat_core::db::RepositoryRegistry;
/// use vat_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens the database and brings its schema up to date.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn VehicleRepository>, RepositoryError> {
        let url = connection_url(&config.connection_string);
        debug!(url = %url, "opening sqlite repository");

        let repo = SqliteRepository::new(&url)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{:#}", e)))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{:#}", e)))?;
        Ok(Box::new(repo))
    }
}
