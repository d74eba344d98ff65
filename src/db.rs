use sea_orm::{Database, DatabaseBackend, DatabaseConnection, DbErr};

use crate::config::Config;

/// Backend all raw statements are built against.
pub const BACKEND: DatabaseBackend = DatabaseBackend::MySql;

/// Connect to MySQL using the process configuration.
///
/// The returned connection is a pool; each handler checks out a
/// connection per statement and returns it on every exit path.
///
/// # Errors
///
/// Returns `DbErr` if the store is unreachable or credentials are invalid.
pub async fn connect(config: &Config) -> Result<DatabaseConnection, DbErr> {
    Database::connect(&config.database_url()).await
}
