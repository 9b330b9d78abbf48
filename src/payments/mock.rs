//! Mock payment provider for development and testing.
//!
//! Issues deterministic session ids and records every request it sees, so
//! tests can assert on the exact session that would have been opened. In
//! production the Stripe adapter takes its place.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::payments::{CheckoutSession, CreateSessionRequest, PaymentProvider, ProviderError};

#[derive(Default, Clone)]
pub struct MockPaymentProvider {
    requests: Arc<RwLock<Vec<CreateSessionRequest>>>,
    fail: bool,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose session creation always fails, for exercising the
    /// upstream-failure path.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Requests seen so far, in order.
    pub async fn requests(&self) -> Vec<CreateSessionRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<CheckoutSession, ProviderError> {
        if self.fail {
            return Err(ProviderError::Api {
                status: 503,
                message: "mock provider unavailable".to_string(),
            });
        }

        let mut requests = self.requests.write().await;
        requests.push(request);
        let n = requests.len();

        Ok(CheckoutSession {
            id: format!("cs_test_{n}"),
            url: format!("https://checkout.example.com/pay/cs_test_{n}"),
        })
    }
}
