use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A ticket category with its own price and capacity.
///
/// `sold_quantity` is only ever moved by the inventory store's guarded
/// update, so `0 <= sold_quantity <= total_quantity` holds at all times.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketTier {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub total_quantity: i32,
    pub sold_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TicketTier {
    /// Seats still open for sale.
    pub fn available_quantity(&self) -> i32 {
        self.total_quantity - self.sold_quantity
    }
}
