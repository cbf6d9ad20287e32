//! authgate - stateless bearer-token authentication service
//!
//! Boots the credential store, token handler and auth gate, then serves the
//! HTTP API.

use anyhow::{Context, Result};
use authgate_backend::{
    auth::{AuthGate, AuthState, ExemptPaths, JwtHandler, SqliteUserStore, TokenValidator},
    build_router, Config,
};
use clap::Parser;
use dotenv::dotenv;
use std::{path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = Config::parse();
    config.validate().context("Invalid configuration")?;
    info!(?config, "Starting authgate");

    let store = Arc::new(
        SqliteUserStore::new(&config.db_path)
            .with_context(|| format!("Failed to open credential store at {}", config.db_path))?,
    );
    let credentials = store
        .count()
        .await
        .context("Failed to read credential store")?;
    let jwt_handler = Arc::new(JwtHandler::new(
        config.jwt_secret.as_bytes(),
        config.token_lifetime()?,
    ));

    let auth_state = AuthState::new(store.clone(), jwt_handler.clone(), config.bcrypt_cost);
    let gate = Arc::new(AuthGate::new(
        TokenValidator::new(jwt_handler, store),
        ExemptPaths::new(config.exempt_prefixes.iter().cloned()),
    ));

    info!(
        credentials,
        "Credential store initialized at: {}", config.db_path
    );

    let app = build_router(auth_state, gate);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("API server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "authgate_backend=debug,authgate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // Standard dotenv search (cwd + parents), then the crate directory
    let _ = dotenv();

    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
