use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewOrder, Order, TicketTier};
use crate::stores::{InventoryStore, OrderStore, SaleOutcome};
use crate::utils::error::AppError;

#[derive(Clone)]
pub struct PgInventoryStore {
    pool: PgPool,
}

impl PgInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn tier_by_id(&self, tier_id: Uuid) -> Result<Option<TicketTier>, AppError> {
        let tier = sqlx::query_as::<_, TicketTier>("SELECT * FROM ticket_tiers WHERE id = $1")
            .bind(tier_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tier)
    }

    async fn record_sale(&self, tier_id: Uuid, quantity: i32) -> Result<SaleOutcome, AppError> {
        // The capacity guard lives in the WHERE clause so concurrent
        // webhook deliveries against one tier serialize at the row level.
        let result = sqlx::query(
            "UPDATE ticket_tiers \
             SET sold_quantity = sold_quantity + $2, updated_at = now() \
             WHERE id = $1 AND sold_quantity + $2 <= total_quantity",
        )
        .bind(tier_id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            Ok(SaleOutcome::Recorded)
        } else {
            Ok(SaleOutcome::WouldOversell)
        }
    }
}

#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, AppError> {
        let created = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (stripe_session_id, event_id, tier_id, quantity, buyer_email) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING *",
        )
        .bind(&order.stripe_session_id)
        .bind(order.event_id)
        .bind(order.tier_id)
        .bind(order.quantity)
        .bind(&order.buyer_email)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_session(&self, session_id: &str) -> Result<Option<Order>, AppError> {
        let order =
            sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE stripe_session_id = $1")
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(order)
    }

    async fn mark_paid(&self, session_id: &str) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders \
             SET status = 'paid', updated_at = now() \
             WHERE stripe_session_id = $1 AND status = 'pending' \
             RETURNING *",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }
}
