//! Entry point: load config, bootstrap the database, wire dependencies, and run the server.

use std::sync::Arc;

use scoreboard::auth::TokenIssuer;
use scoreboard::config::{self, Config};
use scoreboard::db::{self, PgUserStore};
use scoreboard::{cors_layer, create_app, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_env_files().map_err(|e| anyhow::anyhow!("config: {}", e))?;
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(env = config.app_env.as_deref().unwrap_or("unset"), "starting");
    if config.is_development() {
        tracing::info!(database = ?config.database, "loaded development database configuration");
    }

    let pool = db::bootstrap(&config.database).await?;
    let users = Arc::new(PgUserStore::new(pool));
    let tokens = TokenIssuer::new(config.jwt_secret.clone(), config.token_ttl);
    let state = AppState::new(users, tokens);

    let app = create_app(state).layer(cors_layer(&config)?);

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
