use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::models::CheckoutRequest;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Serialize)]
struct CheckoutPayload {
    url: String,
}

/// POST /api/checkout/session: open a hosted payment session for a
/// booking request and hand back the redirect URL.
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Response, AppError> {
    let session = state.checkout.initiate(request).await?;

    let payload = CheckoutPayload { url: session.url };
    Ok(success(payload, "Checkout session created").into_response())
}
