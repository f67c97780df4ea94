//! Router assembly and HTTP middleware layers.

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use log::warn;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::ws::ws_handler;

use super::handlers;
use super::state::AppState;

/// Build the CORS layer from the configured origin allow-list.
fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Skipping unparseable CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Assemble the full application router.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(state.auth.allowed_origins());

    // Roster management requires a valid school token.
    let protected = Router::new()
        .route(
            "/api/school/students",
            post(handlers::add_student).get(handlers::list_students),
        )
        .route(
            "/api/school/students/{id}",
            put(handlers::update_student).delete(handlers::delete_student),
        )
        .route(
            "/api/school/buses",
            post(handlers::add_bus).get(handlers::list_buses),
        )
        .route(
            "/api/school/buses/assign-driver",
            post(handlers::assign_driver),
        )
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ));

    let public = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/auth/send-otp", post(handlers::send_otp))
        .route("/api/auth/verify-otp", post(handlers::verify_otp))
        .route("/api/school/signup", post(handlers::school_signup))
        .route("/api/school/login", post(handlers::school_login))
        .route("/api/driver/signup", post(handlers::driver_signup))
        .route("/api/driver/login", post(handlers::driver_login))
        .route("/api/parent/signup", post(handlers::parent_signup))
        .route("/api/parent/login", post(handlers::parent_login))
        .route("/api/contact", post(handlers::contact))
        .route("/ws", get(ws_handler));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
