use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of an order. `pending -> paid` happens at most once, driven
/// by the payment event handler; nothing transitions out of `paid`.
/// `failed` is reserved for expiration/cancellation handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
}

/// One order per provider checkout session, keyed by the session id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub stripe_session_id: String,
    pub event_id: Uuid,
    pub tier_id: Uuid,
    pub quantity: i32,
    pub status: OrderStatus,
    pub buyer_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a pending order, written at checkout initiation.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub stripe_session_id: String,
    pub event_id: Uuid,
    pub tier_id: Uuid,
    pub quantity: i32,
    pub buyer_email: Option<String>,
}
