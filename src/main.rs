//! Parley - a self-hosted chat backend for Ollama

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parley::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{SqlxSessionRepository, SqlxUserRepository},
    },
    provider::{ModelCatalog, OllamaClient},
    services::{LoginRateLimiter, UserService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Parley chat backend...");

    // Load configuration (file, then PARLEY_* / OLLAMA_BASE_URL overrides)
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories and services
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let user_service = Arc::new(UserService::with_session_expiration(
        user_repo,
        session_repo,
        config.session.expiration_days,
    ));

    let rate_limiter = Arc::new(LoginRateLimiter::new());

    // Model catalog and Ollama client
    let catalog = Arc::new(ModelCatalog::from_config(&config.provider));
    let ollama = Arc::new(OllamaClient::new(&config.provider.base_url));
    tracing::info!(
        base_url = %ollama.base_url(),
        chat_model = %config.provider.chat_model,
        "Model provider configured"
    );

    let state = AppState {
        pool: pool.clone(),
        user_service: user_service.clone(),
        rate_limiter: rate_limiter.clone(),
        catalog,
        ollama,
    };

    // Background maintenance: expired sessions and stale rate limiter
    // entries, every 5 minutes
    {
        let user_service = user_service.clone();
        let rate_limiter = rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(300));
            loop {
                interval.tick().await;
                match user_service.cleanup_expired_sessions().await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!("Removed {} expired sessions", n),
                    Err(e) => tracing::warn!("Session cleanup failed: {}", e),
                }
                rate_limiter.cleanup().await;
            }
        });
    }

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
