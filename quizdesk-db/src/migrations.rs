use sqlx::migrate::Migrator;

use crate::error::DbError;
use crate::pool::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply any pending schema migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}
