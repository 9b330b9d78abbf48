//! Payment completion events.
//!
//! The one code path allowed to mark an order paid and move seats. The
//! provider delivers events at least once, so everything here is keyed to
//! be safe under duplicates: the `pending -> paid` transition is a single
//! conditional update, and only the delivery that wins it records the sale
//! and notifies the buyer.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Order, OrderStatus};
use crate::notifications::{NotificationSender, TicketConfirmation};
use crate::payments::{signature, SessionObject, WebhookEvent, CHECKOUT_SESSION_COMPLETED};
use crate::stores::{InventoryStore, OrderStore, SaleOutcome};
use crate::utils::error::AppError;

/// Body returned to the provider; any 2xx stops redelivery.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

const ACK: WebhookAck = WebhookAck { received: true };

pub struct PaymentEventHandler {
    orders: Arc<dyn OrderStore>,
    inventory: Arc<dyn InventoryStore>,
    notifier: Arc<dyn NotificationSender>,
    webhook_secret: String,
}

impl PaymentEventHandler {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        inventory: Arc<dyn InventoryStore>,
        notifier: Arc<dyn NotificationSender>,
        webhook_secret: impl Into<String>,
    ) -> Self {
        Self {
            orders,
            inventory,
            notifier,
            webhook_secret: webhook_secret.into(),
        }
    }

    /// Verify and process one webhook delivery.
    ///
    /// Errors map to non-2xx responses, which the provider answers with a
    /// retry; the idempotency check makes those retries safe.
    pub async fn handle(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<WebhookAck, AppError> {
        // Nothing is touched before the signature clears.
        signature::verify(
            payload,
            signature_header,
            &self.webhook_secret,
            Utc::now().timestamp(),
        )
        .map_err(|e| AppError::SignatureInvalid(e.to_string()))?;

        let event: WebhookEvent = serde_json::from_slice(payload)
            .map_err(|e| AppError::ValidationError(format!("Malformed webhook payload: {e}")))?;

        if event.event_type != CHECKOUT_SESSION_COMPLETED {
            tracing::debug!(event_type = %event.event_type, "Unhandled event type, acknowledging");
            return Ok(ACK);
        }

        let session = event.data.object;
        let session_id = session.id.clone();

        // At-most-once effects against at-least-once delivery: a paid
        // order means this session was already processed.
        match self.orders.find_by_session(&session_id).await? {
            None => {
                return Err(AppError::OrderNotFound(session_id));
            }
            Some(order) if order.status == OrderStatus::Paid => {
                tracing::info!(session_id = %session_id, "Duplicate delivery for settled session");
                return Ok(ACK);
            }
            Some(_) => {}
        }

        let Some(order) = self.orders.mark_paid(&session_id).await? else {
            // A concurrent delivery won the transition between our read
            // and the update; its effects are the authoritative ones.
            tracing::info!(session_id = %session_id, "Session settled by a concurrent delivery");
            return Ok(ACK);
        };

        tracing::info!(
            session_id = %session_id,
            order_id = %order.id,
            "Order marked paid"
        );

        self.record_sale(&session, &order).await;
        self.notify_buyer(&session, &order).await;

        Ok(ACK)
    }

    /// Move the sold count for the settled session. Payment is already
    /// captured, so a failure here never unwinds the order; it is an
    /// operator-facing inconsistency.
    async fn record_sale(&self, session: &SessionObject, order: &Order) {
        let (tier_id, quantity) = sale_intent(session, order);

        match self.inventory.record_sale(tier_id, quantity).await {
            Ok(SaleOutcome::Recorded) => {
                tracing::info!(tier_id = %tier_id, quantity, "Recorded ticket sale");
            }
            Ok(SaleOutcome::WouldOversell) => {
                tracing::error!(
                    session_id = %order.stripe_session_id,
                    tier_id = %tier_id,
                    quantity,
                    "Inventory inconsistency: paid sale exceeds tier capacity, order stands"
                );
            }
            Err(e) => {
                tracing::error!(
                    session_id = %order.stripe_session_id,
                    tier_id = %tier_id,
                    error = ?e,
                    "Inventory update failed after payment, order stands"
                );
            }
        }
    }

    /// Best-effort confirmation; failures are logged and never roll back
    /// the paid order or the recorded sale.
    async fn notify_buyer(&self, session: &SessionObject, order: &Order) {
        let recipient = session
            .customer_email
            .clone()
            .or_else(|| order.buyer_email.clone());

        let Some(to) = recipient else {
            tracing::warn!(
                session_id = %order.stripe_session_id,
                "No buyer address on session or order, skipping confirmation"
            );
            return;
        };

        let confirmation = TicketConfirmation {
            to,
            event_id: order.event_id.to_string(),
            quantity: order.quantity,
            order_reference: order.stripe_session_id.clone(),
        };

        if let Err(e) = self.notifier.send_confirmation(&confirmation).await {
            tracing::warn!(
                session_id = %order.stripe_session_id,
                error = %e,
                "Confirmation dispatch failed, order unaffected"
            );
        }
    }
}

/// Booking intent for the decrement: the metadata embedded at checkout
/// when it parses, otherwise the order row.
fn sale_intent(session: &SessionObject, order: &Order) -> (Uuid, i32) {
    if let Some(meta) = &session.metadata {
        let tier_id = meta.tier_id.parse::<Uuid>();
        let quantity = meta.quantity.parse::<i32>();
        match (tier_id, quantity) {
            (Ok(tier_id), Ok(quantity)) if quantity > 0 => return (tier_id, quantity),
            _ => {
                tracing::warn!(
                    session_id = %session.id,
                    "Unparseable session metadata, falling back to order record"
                );
            }
        }
    }

    (order.tier_id, order.quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewOrder, OrderStatus, TicketTier};
    use crate::notifications::RecordingNotifier;
    use crate::payments::signature::sign;
    use crate::stores::{InMemoryInventoryStore, InMemoryOrderStore};
    use rust_decimal_macros::dec;
    use serde_json::json;

    const SECRET: &str = "whsec_test123secret456";

    struct Fixture {
        inventory: InMemoryInventoryStore,
        orders: InMemoryOrderStore,
        notifier: RecordingNotifier,
        handler: PaymentEventHandler,
        event_id: Uuid,
        tier_id: Uuid,
    }

    async fn fixture_with(total_quantity: i32, notifier: RecordingNotifier) -> Fixture {
        let inventory = InMemoryInventoryStore::new();
        let orders = InMemoryOrderStore::new();
        let event_id = Uuid::new_v4();
        let tier_id = Uuid::new_v4();
        let now = Utc::now();

        inventory
            .insert(TicketTier {
                id: tier_id,
                event_id,
                name: "General Admission".to_string(),
                description: None,
                price: dec!(49.99),
                total_quantity,
                sold_quantity: 0,
                created_at: now,
                updated_at: now,
            })
            .await;

        orders
            .create(NewOrder {
                stripe_session_id: "cs_1".to_string(),
                event_id,
                tier_id,
                quantity: 2,
                buyer_email: Some("fallback@example.com".to_string()),
            })
            .await
            .unwrap();

        let handler = PaymentEventHandler::new(
            Arc::new(orders.clone()),
            Arc::new(inventory.clone()),
            Arc::new(notifier.clone()),
            SECRET,
        );

        Fixture {
            inventory,
            orders,
            notifier,
            handler,
            event_id,
            tier_id,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(10, RecordingNotifier::new()).await
    }

    fn completed_payload(f: &Fixture, session_id: &str) -> Vec<u8> {
        json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": session_id,
                    "customer_email": "buyer@example.com",
                    "metadata": {
                        "eventId": f.event_id.to_string(),
                        "tierId": f.tier_id.to_string(),
                        "quantity": "2"
                    }
                }
            }
        })
        .to_string()
        .into_bytes()
    }

    fn signed(payload: &[u8]) -> String {
        sign(payload, SECRET, Utc::now().timestamp())
    }

    async fn sold(f: &Fixture) -> i32 {
        f.inventory
            .tier_by_id(f.tier_id)
            .await
            .unwrap()
            .unwrap()
            .sold_quantity
    }

    #[tokio::test]
    async fn test_completed_event_settles_order_and_moves_seats() {
        let f = fixture().await;
        let payload = completed_payload(&f, "cs_1");

        let ack = f
            .handler
            .handle(&payload, Some(&signed(&payload)))
            .await
            .unwrap();
        assert!(ack.received);

        let order = f.orders.find_by_session("cs_1").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(sold(&f).await, 2);

        let sent = f.notifier.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "buyer@example.com");
        assert_eq!(sent[0].quantity, 2);
        assert_eq!(sent[0].order_reference, "cs_1");
    }

    #[tokio::test]
    async fn test_duplicate_delivery_applies_effects_once() {
        let f = fixture().await;
        let payload = completed_payload(&f, "cs_1");

        f.handler
            .handle(&payload, Some(&signed(&payload)))
            .await
            .unwrap();
        let second = f
            .handler
            .handle(&payload, Some(&signed(&payload)))
            .await
            .unwrap();

        // Second delivery acknowledged with no further state change.
        assert!(second.received);
        assert_eq!(sold(&f).await, 2);
        assert_eq!(f.notifier.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_deliveries_apply_effects_once() {
        let f = fixture().await;
        let payload = completed_payload(&f, "cs_1");
        let header = signed(&payload);

        let (a, b) = tokio::join!(
            f.handler.handle(&payload, Some(&header)),
            f.handler.handle(&payload, Some(&header)),
        );
        assert!(a.is_ok());
        assert!(b.is_ok());

        assert_eq!(sold(&f).await, 2);
        assert_eq!(f.notifier.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_session_errors_without_mutation() {
        let f = fixture().await;
        let payload = completed_payload(&f, "cs_missing");

        let err = f
            .handler
            .handle(&payload, Some(&signed(&payload)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OrderNotFound(_)));
        assert_eq!(sold(&f).await, 0);
        assert!(f.notifier.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_bad_signature_rejected_without_mutation() {
        let f = fixture().await;
        let payload = completed_payload(&f, "cs_1");
        let header = signed(&payload);

        let mut tampered = payload.clone();
        tampered.extend_from_slice(b" ");

        let err = f.handler.handle(&tampered, Some(&header)).await.unwrap_err();
        assert!(matches!(err, AppError::SignatureInvalid(_)));

        let missing = f.handler.handle(&payload, None).await.unwrap_err();
        assert!(matches!(missing, AppError::SignatureInvalid(_)));

        let order = f.orders.find_by_session("cs_1").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(sold(&f).await, 0);
    }

    #[tokio::test]
    async fn test_unhandled_event_type_acknowledged() {
        let f = fixture().await;
        let payload = json!({
            "id": "evt_2",
            "type": "invoice.paid",
            "data": { "object": { "id": "cs_1" } }
        })
        .to_string()
        .into_bytes();

        let ack = f
            .handler
            .handle(&payload, Some(&signed(&payload)))
            .await
            .unwrap();
        assert!(ack.received);

        let order = f.orders.find_by_session("cs_1").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(sold(&f).await, 0);
    }

    #[tokio::test]
    async fn test_malformed_payload_rejected_after_signature() {
        let f = fixture().await;
        let payload = b"{\"type\": \"checkout.session.completed\"".to_vec();

        let err = f
            .handler
            .handle(&payload, Some(&signed(&payload)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_capacity_inconsistency_keeps_order_and_notification() {
        // One seat total, but the paid session bought two. Payment is
        // captured, so the order stands and operators get the log line.
        let f = fixture_with(1, RecordingNotifier::new()).await;
        let payload = completed_payload(&f, "cs_1");

        let ack = f
            .handler
            .handle(&payload, Some(&signed(&payload)))
            .await
            .unwrap();
        assert!(ack.received);

        let order = f.orders.find_by_session("cs_1").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(sold(&f).await, 0);
        assert_eq!(f.notifier.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_roll_back() {
        let f = fixture_with(10, RecordingNotifier::failing()).await;
        let payload = completed_payload(&f, "cs_1");

        let ack = f
            .handler
            .handle(&payload, Some(&signed(&payload)))
            .await
            .unwrap();
        assert!(ack.received);

        let order = f.orders.find_by_session("cs_1").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(sold(&f).await, 2);
    }

    #[tokio::test]
    async fn test_missing_metadata_falls_back_to_order_record() {
        let f = fixture().await;
        let payload = json!({
            "id": "evt_3",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_1",
                    "customer_email": null
                }
            }
        })
        .to_string()
        .into_bytes();

        f.handler
            .handle(&payload, Some(&signed(&payload)))
            .await
            .unwrap();

        assert_eq!(sold(&f).await, 2);

        // No session email either, so the stored address is used.
        let sent = f.notifier.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "fallback@example.com");
    }
}
