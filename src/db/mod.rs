pub mod query;

use diesel::{Connection as _, SqliteConnection, sqlite::Sqlite};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::debug;

use crate::error::AppError;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Opens the SQLite file at `database_url`. Callers own the connection for
/// a single operation and drop it afterwards.
pub fn establish_connection(database_url: &str) -> Result<SqliteConnection, AppError> {
    debug!(database_url, "Opening SQLite connection");
    Ok(SqliteConnection::establish(database_url)?)
}

/// Creates `transactions` and `boot_notifications` if they do not exist yet.
pub fn run_migrations<MH>(conn: &mut MH) -> Result<(), AppError>
where
    MH: MigrationHarness<Sqlite>,
{
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| AppError::Migration(e.to_string()))?;
    debug!(applied = applied.len(), "Migrations applied");
    Ok(())
}
