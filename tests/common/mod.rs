//! Test utilities and common setup.

use axum::Router;
use trackify::api;
use trackify::auth::{AuthConfig, AuthState};
use trackify::db::Database;

pub const TEST_DRIVER_CODE: &str = "ROUTE-7";

/// Create a test AuthConfig with a JWT secret and driver code.
fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: Some("test-secret-for-integration-tests-minimum-32-chars".to_string()),
        driver_code: Some(TEST_DRIVER_CODE.to_string()),
        ..Default::default()
    }
}

/// Create a test application over an in-memory database, with no
/// mailer configured.
pub async fn test_app() -> Router {
    let db = Database::in_memory().await.unwrap();
    let auth_state = AuthState::new(test_auth_config());
    let state = api::AppState::new(&db, auth_state, None);
    api::create_router(state)
}
