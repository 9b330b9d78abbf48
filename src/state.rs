use std::sync::Arc;

use crate::services::{CheckoutService, PaymentEventHandler};

/// Shared handler state: the two workflow components, constructed and
/// wired by the process entry point.
#[derive(Clone)]
pub struct AppState {
    pub checkout: Arc<CheckoutService>,
    pub payment_events: Arc<PaymentEventHandler>,
}

impl AppState {
    pub fn new(checkout: CheckoutService, payment_events: PaymentEventHandler) -> Self {
        Self {
            checkout: Arc::new(checkout),
            payment_events: Arc::new(payment_events),
        }
    }
}
