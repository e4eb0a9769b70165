use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;

use auth::rate_limit::RateLimitState;
use config::Config;
use store::TrainingStore;

/// Headers the snapshot function accepts from browsers. Every response of
/// the function, errors included, is readable from any origin.
pub const FUNCTION_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TrainingStore>,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimitState,
}

impl AppState {
    pub fn new(store: Arc<dyn TrainingStore>, config: Arc<Config>) -> Self {
        Self {
            store,
            config,
            rate_limiter: RateLimitState::new(),
        }
    }

    /// Current date in the reference timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now()
            .with_timezone(&self.config.reference_timezone)
            .date_naive()
    }
}

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz));

    let protected_routes = Router::new()
        // Exercise weights
        .route(
            "/api/weights",
            get(handlers::weights::get_weights).put(handlers::weights::set_weight),
        )
        .route("/api/weights/adjust", post(handlers::weights::adjust_weight))
        .route(
            "/api/training-days",
            get(handlers::weights::list_training_days),
        )
        .route(
            "/api/training-days/:day",
            get(handlers::weights::get_training_day),
        )
        // Calendar
        .route("/api/calendar", get(handlers::calendar::get_month))
        .route("/api/calendar/toggle", post(handlers::calendar::toggle_workout))
        .route("/api/calendar/streak", get(handlers::calendar::get_streak))
        // Progress
        .route(
            "/api/progress",
            get(handlers::progress::get_year_table).put(handlers::progress::record_progress),
        )
        .route("/api/dashboard", get(handlers::dashboard::get_dashboard))
        // Settings
        .route(
            "/api/settings/:key",
            get(handlers::settings::get_setting).put(handlers::settings::put_setting),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(app_cors(&state.config));

    let function_routes = Router::new()
        .route(
            "/functions/v1/monthly-snapshot",
            post(handlers::snapshot::run_monthly_snapshot)
                .options(handlers::snapshot::preflight),
        )
        // Older deployments call the same job under this name
        .route(
            "/functions/v1/monthly-progress-save",
            post(handlers::snapshot::run_monthly_snapshot)
                .options(handlers::snapshot::preflight),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_snapshot,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_function_auth,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(FUNCTION_ALLOW_HEADERS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ));

    Router::new()
        .merge(api_routes)
        .merge(function_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn app_cors(config: &Config) -> CorsLayer {
    let mut origins = Vec::new();
    for origin in std::iter::once(&config.frontend_url).chain(config.cors_extra_origins.iter()) {
        match origin.parse::<HeaderValue>() {
            Ok(hv) => origins.push(hv),
            Err(_) => tracing::warn!(origin = %origin, "Ignoring invalid CORS origin"),
        }
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
        .allow_credentials(true)
}
