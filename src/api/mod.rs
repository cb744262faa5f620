use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::TokenIssuer;
use crate::state::SharedState;

mod ai;
mod applicants;
pub mod auth;
mod error;
mod extract;
mod observability;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use observability::REQUEST_ID_HEADER;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

/// Headroom for the non-file parts of an enrollment form.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.shared.tokens
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let config = state.config();
    let cors_origins = config.server.cors_allowed_origins.clone();
    let body_limit = config.storage.max_upload_bytes + FORM_OVERHEAD_BYTES;
    let request_timeout = Duration::from_secs(config.server.request_timeout_seconds);
    let local_uploads = config
        .storage
        .serve_local
        .then(|| std::path::Path::new(&config.storage.root_path).to_path_buf());

    let auth = middleware::from_fn_with_state(state.clone(), auth::auth_middleware);

    // Registration stays public while listing requires a token.
    let users_root = get(users::list_users)
        .route_layer(auth.clone())
        .post(users::create_user);

    let protected_routes = Router::new()
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/datapokok",
            get(applicants::list_applicants).post(applicants::create_applicant),
        )
        .route(
            "/datapokok/{id}",
            get(applicants::get_applicant)
                .put(applicants::update_applicant)
                .delete(applicants::delete_applicant),
        )
        .route("/ai", get(ai::ask))
        .route_layer(auth);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    let mut app = Router::new()
        .route("/users", users_root)
        .route("/login", post(auth::login))
        .route("/health", get(observability::health))
        .route("/metrics", get(observability::get_metrics))
        .merge(protected_routes)
        .with_state(state);

    if let Some(root) = local_uploads {
        app = app.nest_service("/uploads", tower_http::services::ServeDir::new(root));
    }

    app.layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}
