//! API layer - HTTP handlers and routing
//!
//! Endpoint groups:
//! - Chat entry (`GET /`) bootstrapping a fresh conversation
//! - Auth endpoints (login, register, guest, logout, me)
//! - Model catalog and selection
//! - Chat proxy (non-streaming and SSE) plus title generation
//! - Service status

pub mod auth;
pub mod chat;
pub mod entry;
pub mod middleware;
pub mod models;
pub mod status;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState};

/// Build the API router mounted under `/api`
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Routes that need a valid session
    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::get_current_user))
        .route("/models/select", post(models::select_model))
        .route("/chat", post(chat::chat))
        .route("/chat/title", post(chat::generate_title))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/guest", get(auth::guest))
        .route("/models", get(models::list_models))
        .route("/status", get(status::status))
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    // CORS must allow credentials for cookie auth from the frontend
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Router::new()
        .route("/", get(entry::chat_entry))
        .nest("/api", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::db::repositories::{SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::provider::{ModelCatalog, OllamaClient};
    use crate::services::{LoginRateLimiter, UserService};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::Json;
    use axum_test::TestServer;
    use std::sync::Arc;

    /// Build a fully wired server over an in-memory database with the
    /// given provider configuration.
    pub(crate) async fn test_server_with_provider(
        provider: ProviderConfig,
    ) -> (TestServer, AppState) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let user_service = Arc::new(UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
        ));

        let state = AppState {
            pool,
            user_service,
            rate_limiter: Arc::new(LoginRateLimiter::new()),
            catalog: Arc::new(ModelCatalog::from_config(&provider)),
            ollama: Arc::new(OllamaClient::new(&provider.base_url)),
        };

        let server = TestServer::new(build_router(
            state.clone(),
            "http://localhost:3000",
        ))
        .unwrap();

        (server, state)
    }

    /// Default test server; provider calls would hit the default base
    /// URL, so only non-proxy tests should use this one.
    pub(crate) async fn test_server() -> (TestServer, AppState) {
        test_server_with_provider(ProviderConfig::default()).await
    }

    /// Register an account and return its session token.
    pub(crate) async fn register_and_login(server: &TestServer, email: &str) -> String {
        let response = server
            .post("/api/auth/register")
            .json(&serde_json::json!({
                "email": email,
                "password": "password123"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let cookie = response.header(axum::http::header::SET_COOKIE);
        let cookie = cookie.to_str().unwrap();
        cookie
            .strip_prefix("session=")
            .and_then(|rest| rest.split(';').next())
            .unwrap()
            .to_string()
    }

    /// Spawn a stand-in Ollama server on an ephemeral port and return
    /// its base URL. Echoes the request's model and think flag back so
    /// tests can assert the binding that was used; the model name
    /// "boom" answers 500.
    pub(crate) async fn spawn_mock_ollama() -> String {
        async fn mock_chat(Json(body): Json<serde_json::Value>) -> axum::response::Response {
            let model = body["model"].as_str().unwrap_or_default().to_string();
            if model == "boom" {
                return (StatusCode::INTERNAL_SERVER_ERROR, "kaboom").into_response();
            }

            if body["stream"].as_bool().unwrap_or(false) {
                let lines = format!(
                    "{}\n{}\n",
                    serde_json::json!({
                        "model": model,
                        "message": {"role": "assistant", "content": "Hel"},
                        "done": false
                    }),
                    serde_json::json!({
                        "model": model,
                        "message": {"role": "assistant", "content": "lo"},
                        "done": true
                    })
                );
                return (
                    [(header::CONTENT_TYPE, "application/x-ndjson")],
                    lines,
                )
                    .into_response();
            }

            Json(serde_json::json!({
                "model": model,
                "think": body.get("think"),
                "message": {"role": "assistant", "content": "mock reply"},
                "done": true
            }))
            .into_response()
        }

        let app = Router::new().route("/api/chat", post(mock_chat));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }
}
