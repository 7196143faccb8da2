use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use screenlog_core::{Config, db::create_pool, services::MovieService};

pub mod codec;
pub mod error;
pub mod middleware;
pub mod routes;

use routes::movies;

pub struct AppState {
    pub movie_service: MovieService,
    /// Static bearer token guarding the movie routes; None disables the gate.
    pub api_token: Option<String>,
}

/// Configuration for starting the server
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
        }
    }
}

/// Creates the application state with all services initialized
pub async fn create_app_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connected");

    Ok(Arc::new(AppState {
        movie_service: MovieService::new(pool),
        api_token: config.api_token.clone(),
    }))
}

/// Creates the router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/healthcheck", get(health_check))
        .nest("/v1", movie_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn movie_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", post(movies::create))
        .route(
            "/movies/{id}",
            get(movies::show)
                .patch(movies::update)
                .delete(movies::delete),
        )
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::auth_middleware,
        ))
}

async fn health_check() -> &'static str {
    "OK"
}

/// Starts the server and blocks until shutdown
pub async fn start_server(server_config: ServerConfig) -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    tracing::info!("Starting screenlog server...");

    let state = create_app_state(&config).await?;
    let app = create_router(state);

    let addr = format!("{}:{}", server_config.host, server_config.port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
