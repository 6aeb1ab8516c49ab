//! HTTP API Layer
//!
//! REST surface of the claims platform using Axum.
//!
//! # Architecture
//!
//! - **Middleware**: bearer-token verification, audit logging, tracing
//! - **Handlers**: thin adapters from HTTP to [`ClaimLifecycle`] calls
//! - **DTOs**: request/response bodies
//! - **Error Handling**: one JSON error shape for every failure
//!
//! Every `/api/v1` route runs the session verifier before the handler, and
//! the handler passes the verified session to the lifecycle engine, which
//! runs the access guard. Unauthenticated calls never reach the engine.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(config, store, Arc::new(SystemClock))?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use chrono::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::Clock;
use domain_access::SessionVerifier;
use domain_claims::{ClaimLifecycle, ClaimStore, FraudScorer};

use crate::config::{ApiConfig, ConfigurationError};
use crate::handlers::{admin, claims, health, review, session};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<ClaimLifecycle>,
    pub verifier: Arc<SessionVerifier>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// Wires the lifecycle engine and session verifier from configuration
    ///
    /// # Errors
    ///
    /// `ConfigurationError::Invalid` if `config` fails validation
    pub fn new(
        config: ApiConfig,
        store: Arc<dyn ClaimStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigurationError> {
        Self::build(config, store, None, clock)
    }

    /// Same as [`AppState::new`], with a fraud scorer called on submission
    pub fn with_scorer(
        config: ApiConfig,
        store: Arc<dyn ClaimStore>,
        scorer: Arc<dyn FraudScorer>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigurationError> {
        Self::build(config, store, Some(scorer), clock)
    }

    fn build(
        config: ApiConfig,
        store: Arc<dyn ClaimStore>,
        scorer: Option<Arc<dyn FraudScorer>>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigurationError> {
        let mut lifecycle =
            ClaimLifecycle::new(store, config.lifecycle_config()?).with_clock(clock.clone());
        if let Some(scorer) = scorer {
            lifecycle = lifecycle.with_scorer(scorer);
        }

        let leeway = i64::try_from(config.jwt_leeway_secs)
            .map(Duration::seconds)
            .map_err(|_| ConfigurationError::Invalid("jwt_leeway_secs is too large".to_string()))?;
        let verifier = SessionVerifier::new(config.jwt_secret.as_bytes(), clock).with_leeway(leeway);

        Ok(Self {
            lifecycle: Arc::new(lifecycle),
            verifier: Arc::new(verifier),
            config: Arc::new(config),
        })
    }
}

/// Creates the main API router
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let claims_routes = Router::new()
        .route("/", post(claims::submit_claim).get(claims::list_claims))
        .route("/:id", get(claims::get_claim))
        .route("/:id/decision", post(claims::decide_claim));

    let admin_routes = Router::new()
        .route("/stats", get(admin::statistics))
        .route("/claims/:id/scores", post(admin::attach_scores));

    // Protected API routes
    let api_routes = Router::new()
        .route("/me", get(session::me))
        .route("/review-queue", get(review::review_queue))
        .nest("/claims", claims_routes)
        .nest("/admin", admin_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(axum_middleware::from_fn(audit_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
