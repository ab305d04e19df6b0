/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let store = app::build_store(&config).await?;
/// let router = app::build_router(app::AppState::new(store, config));
/// # Ok(())
/// # }
/// ```

use crate::{config::{Config, StoreBackend}, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use taskboard_shared::auth::middleware::authenticate;
use taskboard_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
use taskboard_shared::store::{DocumentStore, MemoryStore, PgStore};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Document store shared by all handlers
    pub store: Arc<dyn DocumentStore>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn DocumentStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Shared secret for token validation
    pub fn jwt_secret(&self) -> &str {
        &self.config.auth.jwt_secret
    }

    /// Expected token issuer
    pub fn jwt_issuer(&self) -> &str {
        &self.config.auth.issuer
    }
}

/// Opens the store selected by `config.store.backend`
///
/// For PostgreSQL this creates the pool and, unless disabled, applies
/// pending migrations.
pub async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = create_pool(DatabaseConfig {
                url: config.store.database_url.clone(),
                max_connections: config.store.max_connections,
                min_connections: config.store.min_connections,
                ..Default::default()
            })
            .await?;

            if config.store.run_migrations {
                run_migrations(&pool).await?;
            }

            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /health            # Health check (public)
/// ├── GET    /projects          # Projects owned by ?userId
/// ├── POST   /projects          # Create project
/// ├── GET    /tasks             # Tasks in ?projectId
/// ├── POST   /tasks             # Create task
/// ├── PUT    /tasks/:task_id    # Partial update
/// ├── DELETE /tasks/:task_id    # Delete
/// └── GET    /analytics         # Status counts for ?userId[&projectId]
/// ```
///
/// Everything except `/health` sits behind bearer-token authentication.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let protected_routes = Router::new()
        .route(
            "/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:task_id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route("/analytics", get(routes::analytics::get_analytics))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    Router::new()
        .merge(health_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_permissive() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Bearer-token authentication layer
///
/// Validates the token and injects `AuthContext` into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(req.headers(), state.jwt_secret(), state.jwt_issuer())
        .map_err(|e| {
            tracing::debug!(error = %e, path = %req.uri().path(), "Rejected request");
            ApiError::from(e)
        })?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
