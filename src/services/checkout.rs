//! Checkout initiation: validate a booking request and open a hosted
//! payment session for it.
//!
//! No seats move here. The pending order records intent; the payment event
//! handler owns every mutation that follows a confirmed payment.

use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{CheckoutRequest, NewOrder};
use crate::payments::{
    CheckoutSession, CreateSessionRequest, PaymentProvider, SessionMetadata,
};
use crate::stores::{InventoryStore, OrderStore};
use crate::utils::error::AppError;

const CURRENCY: &str = "usd";
const PRODUCT_NAME: &str = "Event Ticket";

pub struct CheckoutService {
    inventory: Arc<dyn InventoryStore>,
    orders: Arc<dyn OrderStore>,
    provider: Arc<dyn PaymentProvider>,
    base_url: String,
}

impl CheckoutService {
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        orders: Arc<dyn OrderStore>,
        provider: Arc<dyn PaymentProvider>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            inventory,
            orders,
            provider,
            base_url: base_url.into(),
        }
    }

    pub async fn initiate(&self, request: CheckoutRequest) -> Result<CheckoutSession, AppError> {
        let booking = request.validate()?;

        // Price always comes from the store; the client never supplies it.
        let tier = self
            .inventory
            .tier_by_id(booking.tier_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Ticket tier '{}' was not found", booking.tier_id))
            })?;

        if tier.event_id != booking.event_id {
            return Err(AppError::ValidationError(format!(
                "Ticket tier '{}' does not belong to event '{}'",
                booking.tier_id, booking.event_id
            )));
        }

        // Optimistic capacity check before paying the provider round trip.
        // The guarded decrement at payment time remains authoritative.
        if booking.quantity > tier.available_quantity() {
            return Err(AppError::SoldOut(format!(
                "Only {} seats left in '{}'",
                tier.available_quantity(),
                tier.name
            )));
        }

        let unit_amount = (tier.price * Decimal::from(100))
            .round_dp(0)
            .to_i64()
            .ok_or_else(|| {
                AppError::InternalServerError(format!(
                    "Tier '{}' price {} cannot be expressed in minor units",
                    tier.id, tier.price
                ))
            })?;

        let session = self
            .provider
            .create_checkout_session(CreateSessionRequest {
                product_name: PRODUCT_NAME.to_string(),
                description: format!("Ticket for event {}", booking.event_id),
                currency: CURRENCY.to_string(),
                unit_amount,
                quantity: booking.quantity,
                success_url: format!(
                    "{}/success?session_id={{CHECKOUT_SESSION_ID}}",
                    self.base_url
                ),
                cancel_url: format!("{}/show/{}", self.base_url, booking.event_id),
                customer_email: booking.buyer_email.clone(),
                metadata: SessionMetadata {
                    event_id: booking.event_id.to_string(),
                    tier_id: booking.tier_id.to_string(),
                    quantity: booking.quantity.to_string(),
                },
            })
            .await?;

        self.orders
            .create(NewOrder {
                stripe_session_id: session.id.clone(),
                event_id: booking.event_id,
                tier_id: booking.tier_id,
                quantity: booking.quantity,
                buyer_email: booking.buyer_email,
            })
            .await?;

        tracing::info!(
            session_id = %session.id,
            event_id = %booking.event_id,
            tier_id = %booking.tier_id,
            quantity = booking.quantity,
            "Checkout session created"
        );

        Ok(session)
    }
}
