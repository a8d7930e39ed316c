/// Embedded schema migrations
///
/// Migration files live in `aishop-shared/migrations/` and are compiled into
/// the binary with `sqlx::migrate!`, so the server can bring a fresh database
/// up to date on startup without shipping SQL files alongside it.
///
/// # Example
///
/// ```no_run
/// use aishop_shared::db::pool::{create_pool, DatabaseConfig};
/// use aishop_shared::db::migrations::run_migrations;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::from_url("postgresql://localhost/aishop", 5)).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{info, warn};

/// Applies all pending migrations
///
/// # Errors
///
/// Returns an error if a migration fails; already-applied migrations are
/// left in place.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("Database schema is up to date");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Creates the database named in `database_url` if it is missing
///
/// # Errors
///
/// Returns an error if the server is unreachable or refuses the CREATE.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    }

    Ok(())
}
