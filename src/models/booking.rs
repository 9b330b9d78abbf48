use serde::Deserialize;
use uuid::Uuid;

use crate::utils::error::AppError;

/// Raw checkout payload as posted by the booking page.
///
/// Fields stay optional so a missing field surfaces as this crate's own
/// validation error rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub event_id: Option<Uuid>,
    pub tier_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub buyer_email: Option<String>,
}

/// A validated booking intent. Request-scoped, never persisted as-is.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub event_id: Uuid,
    pub tier_id: Uuid,
    pub quantity: i32,
    pub buyer_email: Option<String>,
}

impl CheckoutRequest {
    pub fn validate(self) -> Result<BookingRequest, AppError> {
        let mut missing = Vec::new();
        if self.event_id.is_none() {
            missing.push("eventId");
        }
        if self.tier_id.is_none() {
            missing.push("tierId");
        }
        if self.quantity.is_none() {
            missing.push("quantity");
        }
        if !missing.is_empty() {
            return Err(AppError::ValidationError(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let quantity = self.quantity.unwrap_or_default();
        if quantity <= 0 {
            return Err(AppError::ValidationError(
                "quantity must be a positive integer".to_string(),
            ));
        }

        Ok(BookingRequest {
            event_id: self.event_id.unwrap_or_default(),
            tier_id: self.tier_id.unwrap_or_default(),
            quantity,
            buyer_email: self.buyer_email,
        })
    }
}
