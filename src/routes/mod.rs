use axum::{
    routing::{get, post},
    Router,
};

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{create_checkout_session, health_check, stripe_webhook};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/checkout/session", post(create_checkout_session))
        .route("/api/webhooks/stripe", post(stripe_webhook))
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .with_state(state)
}
