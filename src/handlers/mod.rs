use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::utils::response::success;

pub mod checkout;
pub mod webhook;

pub use checkout::create_checkout_session;
pub use webhook::stripe_webhook;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "showbooker-api",
    };

    success(payload, "Health check successful").into_response()
}
