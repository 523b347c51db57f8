/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use hearth_api::{app::{build_router, AppState}, config::Config};
/// use hearth_shared::db::pool::create_pool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// let state = AppState::new(pool, config);
///
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use hearth_shared::auth::{
    jwt::validate_token,
    middleware::{bearer_token, resolve_account},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

/// Shared application state
///
/// Cloned into every handler through Axum's `State` extractor. The pool is
/// reference-counted internally and the config sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Secret bearer tokens are signed with
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Issuer bearer tokens must carry
    pub fn jwt_issuer(&self) -> &str {
        &self.config.jwt.issuer
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Layout
///
/// ```text
/// /
/// ├── GET /health                              # public
/// └── /v1/
///     ├── GET  /houses                         # public: browse
///     ├── GET  /houses/:house_id/members       # public: member names
///     ├── GET  /me                             # user, their houses, joinable houses
///     ├── POST /houses                         # create
///     ├── GET  /houses/:house_id               # house page (members only)
///     ├── POST /houses/:house_id/join
///     ├── POST /houses/:house_id/leave
///     ├── GET  /houses/:house_id/last-member
///     ├── GET  /houses/:house_id/events        # calendar
///     ├── GET|POST       /houses/:house_id/tasks
///     ├── PUT|DELETE     /houses/:house_id/tasks/:task_id
///     └── GET|POST       /houses/:house_id/restrictions
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Authentication (authenticated routes only)
/// 2. Logging (tower-http TraceLayer)
/// 3. CORS (tower-http CorsLayer)
/// 4. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Browsing (public, no auth)
    let public_routes = Router::new()
        .route("/houses", get(routes::houses::list_houses))
        .route("/houses/:house_id/members", get(routes::houses::house_members));

    // Everything else needs a bearer token
    let authenticated_routes = Router::new()
        .route("/me", get(routes::me::me))
        .route("/houses", post(routes::houses::create_house))
        .route("/houses/:house_id", get(routes::houses::house_page))
        .route("/houses/:house_id/join", post(routes::houses::join_house))
        .route("/houses/:house_id/leave", post(routes::houses::leave_house))
        .route(
            "/houses/:house_id/last-member",
            get(routes::houses::last_member),
        )
        .route("/houses/:house_id/events", get(routes::tasks::list_events))
        .route(
            "/houses/:house_id/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/houses/:house_id/tasks/:task_id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route(
            "/houses/:house_id/restrictions",
            get(routes::restrictions::list_restrictions)
                .post(routes::restrictions::create_restriction),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let v1_routes = Router::new()
        .merge(public_routes)
        .merge(authenticated_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
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
    };

    let production = state.config.api.production;

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

/// Bearer-token authentication layer
///
/// Validates the token, resolves (or provisions) the caller's account and
/// injects `AuthContext` into request extensions.
async fn auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;

    let claims = validate_token(token, state.jwt_secret(), state.jwt_issuer()).map_err(|e| {
        warn!(error = %e, "Rejected bearer token");
        ApiError::from(e)
    })?;

    let auth_context = resolve_account(&state.db, &claims).await?;
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
