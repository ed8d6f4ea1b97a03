/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskmate_api::{app::{build_router, AppState}, config::Config};
/// use taskmate_shared::store::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::{admin::require_admin_layer, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use chrono::Duration;
use std::sync::Arc;
use taskmate_shared::{
    auth::{
        jwt::{self, Claims, JwtError},
        middleware::create_jwt_middleware,
    },
    store::Store,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler through Axum's `State` extractor; both fields
/// are reference counted.
#[derive(Clone)]
pub struct AppState {
    /// User and task storage
    pub store: Arc<dyn Store>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Signs a session token for `email` with the configured lifetime
    pub fn issue_token(&self, email: &str) -> Result<String, JwtError> {
        let claims = Claims::new(email, Duration::minutes(self.config.jwt.expiry_minutes));
        jwt::create_token(&claims, self.jwt_secret())
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                    # public
/// ├── /api
/// │   ├── POST /auth/register         # public
/// │   ├── POST /auth/login            # public
/// │   ├── GET  /auth/me               # bearer
/// │   ├── /tasks                      # bearer
/// │   │   ├── GET, POST /
/// │   │   ├── GET /user/:userId
/// │   │   └── GET, PATCH, DELETE /:id
/// │   └── /users                      # bearer + ADMIN
/// │       ├── GET, POST /
/// │       └── PATCH, DELETE /:id
/// └── *                               # built client, index.html fallback
/// ```
///
/// # Middleware Stack
///
/// Outermost first: security headers, CORS, compression, request tracing,
/// then the per-route bearer and admin checks.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login));

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/user/:user_id", get(routes::tasks::list_user_tasks))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        );

    let user_routes = Router::new()
        .route(
            "/",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/:id",
            axum::routing::patch(routes::users::update_user).delete(routes::users::delete_user),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_admin_layer,
        ));

    let protected_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .nest("/tasks", task_routes)
        .nest("/users", user_routes)
        .route_layer(axum::middleware::from_fn(create_jwt_middleware(
            state.config.jwt.secret.clone(),
        )));

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(api_not_found);

    let static_dir = &state.config.api.static_dir;
    let client = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .fallback_service(client)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if config.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound("No such API route".to_string())
}
