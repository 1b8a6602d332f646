//! Startup routine: make sure the database exists, connect, migrate, patch.
//!
//! Runs once before the server accepts requests. The first failing step aborts
//! the sequence; nothing already created is rolled back.

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::{Connection, PgConnection};
use thiserror::Error;
use tracing::info;

use super::{create_pool, DbPool};
use crate::config::DatabaseConfig;

static MIGRATOR: Migrator = sqlx::migrate!();

/// SQLSTATE `duplicate_database`.
const DUPLICATE_DATABASE: &str = "42P04";

const SCORE_TIMESTAMP_BACKFILL: &str =
    "UPDATE scores SET created_at = CURRENT_TIMESTAMP WHERE created_at IS NULL";
const SCORE_TIMESTAMP_PATCH: &str = r#"
    ALTER TABLE scores
        ALTER COLUMN created_at SET DEFAULT CURRENT_TIMESTAMP,
        ALTER COLUMN created_at SET NOT NULL
"#;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("error connecting to database server: {0}")]
    ServerConnect(#[source] sqlx::Error),
    #[error("error creating database {name}: {source}")]
    CreateDatabase {
        name: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("error connecting to database {name}: {source}")]
    DatabaseConnect {
        name: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("error migrating tables: {0}")]
    Migrate(#[from] MigrateError),
    #[error("error ensuring scores.created_at default: {0}")]
    PatchSchema(#[source] sqlx::Error),
}

/// Bring the configured database up to date and return a pool connected to it.
pub async fn bootstrap(config: &DatabaseConfig) -> Result<DbPool, BootstrapError> {
    info!(host = %config.host, port = config.port, database = %config.name, "bootstrapping database");

    let mut server = PgConnection::connect_with(&config.server_options())
        .await
        .map_err(BootstrapError::ServerConnect)?;
    let created = ensure_database(&mut server, &config.name).await;
    if let Err(e) = server.close().await {
        tracing::warn!(error = %e, "failed to close server connection");
    }
    if created? {
        info!(database = %config.name, "database created");
    } else {
        info!(database = %config.name, "database already exists");
    }

    let pool = create_pool(config.database_options())
        .await
        .map_err(|source| BootstrapError::DatabaseConnect {
            name: config.name.clone(),
            source,
        })?;

    MIGRATOR.run(&pool).await?;
    info!("table migration successful");

    ensure_score_timestamp(&pool).await?;
    info!("scores.created_at default ensured");

    Ok(pool)
}

/// Create `name` unless it exists. Returns whether it was created here.
async fn ensure_database(conn: &mut PgConnection, name: &str) -> Result<bool, BootstrapError> {
    let create_err = |source| BootstrapError::CreateDatabase {
        name: name.to_string(),
        source,
    };

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(name)
            .fetch_one(&mut *conn)
            .await
            .map_err(create_err)?;
    if exists {
        return Ok(false);
    }

    let statement = format!("CREATE DATABASE {}", quote_identifier(name));
    match sqlx::query(&statement).execute(&mut *conn).await {
        Ok(_) => Ok(true),
        // Another process won the race between the check and the create.
        Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(DUPLICATE_DATABASE) => {
            Ok(false)
        }
        Err(e) => Err(create_err(e)),
    }
}

/// Rows inserted before the column had a default get a timestamp, then the default is pinned.
async fn ensure_score_timestamp(pool: &DbPool) -> Result<(), BootstrapError> {
    let mut tx = pool.begin().await.map_err(BootstrapError::PatchSchema)?;
    sqlx::query(SCORE_TIMESTAMP_BACKFILL)
        .execute(&mut *tx)
        .await
        .map_err(BootstrapError::PatchSchema)?;
    sqlx::query(SCORE_TIMESTAMP_PATCH)
        .execute(&mut *tx)
        .await
        .map_err(BootstrapError::PatchSchema)?;
    tx.commit().await.map_err(BootstrapError::PatchSchema)
}

/// Quote a PostgreSQL identifier; `CREATE DATABASE` cannot take a bind parameter.
fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
