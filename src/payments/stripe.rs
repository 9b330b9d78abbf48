use async_trait::async_trait;
use serde::Deserialize;

use crate::payments::{CheckoutSession, CreateSessionRequest, PaymentProvider, ProviderError};

const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Stripe adapter for the hosted-checkout flow. Sessions are created with
/// a single form-encoded call; completion arrives later via webhook.
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: Option<StripeErrorBody>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: Option<String>,
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: secret_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Point the client at a different API host (test servers).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn form_params(request: &CreateSessionRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("mode", "payment".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            (
                "line_items[0][price_data][currency]",
                request.currency.clone(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                request.product_name.clone(),
            ),
            (
                "line_items[0][price_data][product_data][description]",
                request.description.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                request.unit_amount.to_string(),
            ),
            ("line_items[0][quantity]", request.quantity.to_string()),
            ("success_url", request.success_url.clone()),
            ("cancel_url", request.cancel_url.clone()),
            ("metadata[eventId]", request.metadata.event_id.clone()),
            ("metadata[tierId]", request.metadata.tier_id.clone()),
            ("metadata[quantity]", request.metadata.quantity.clone()),
        ];

        if let Some(email) = &request.customer_email {
            params.push(("customer_email", email.clone()));
        }

        params
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_checkout_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<CheckoutSession, ProviderError> {
        let params = Self::form_params(&request);

        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorEnvelope>()
                .await
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| "unknown error".to_string());

            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session = response.json::<StripeSession>().await?;
        let url = session.url.ok_or(ProviderError::MissingField("url"))?;

        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }
}
