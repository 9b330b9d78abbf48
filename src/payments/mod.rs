//! Payment provider port and wire types.
//!
//! The provider hosts the checkout session; this crate only opens sessions
//! and consumes the signed completion events the provider posts back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod mock;
pub mod signature;
pub mod stripe;

pub use mock::MockPaymentProvider;
pub use stripe::StripeClient;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("payment provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("payment provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("payment provider response missing {0}")]
    MissingField(&'static str),
}

/// Booking intent embedded on the session and echoed back in completion
/// events, so the webhook side can recover it without a lookup. Values are
/// strings on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    #[serde(rename = "eventId")]
    pub event_id: String,
    #[serde(rename = "tierId")]
    pub tier_id: String,
    pub quantity: String,
}

/// Everything needed to open a hosted checkout session: one card line item
/// plus redirect URLs and metadata.
#[derive(Debug, Clone)]
pub struct CreateSessionRequest {
    pub product_name: String,
    pub description: String,
    pub currency: String,
    /// Unit price in the currency's minor units (cents).
    pub unit_amount: i64,
    pub quantity: i32,
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: Option<String>,
    pub metadata: SessionMetadata,
}

/// A provider-issued session: opaque id plus the hosted-page redirect.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<CheckoutSession, ProviderError>;
}

/// Completion event type processed by the webhook workflow. Everything
/// else is acknowledged and ignored.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Envelope of a provider webhook delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    pub object: SessionObject,
}

/// The checkout-session snapshot carried inside a completion event.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionObject {
    pub id: String,
    pub customer_email: Option<String>,
    pub metadata: Option<SessionMetadata>,
}
