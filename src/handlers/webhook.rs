use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};

use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

const SIGNATURE_HEADER: &str = "stripe-signature";

/// POST /api/webhooks/stripe: verify and process a provider event.
///
/// The raw body goes to the handler untouched; signature verification
/// runs over exactly the bytes the provider signed.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let ack = state.payment_events.handle(&body, signature).await?;

    Ok(success(ack, "Webhook processed").into_response())
}
