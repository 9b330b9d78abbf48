use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{NewOrder, Order, OrderStatus, TicketTier};
use crate::stores::{InventoryStore, OrderStore, SaleOutcome};
use crate::utils::error::AppError;

/// A thread-safe in-memory inventory store.
///
/// Uses `Arc<RwLock<HashMap<Uuid, TicketTier>>>` for shared concurrent
/// access; the write lock makes the sale guard atomic the same way the
/// Postgres adapter's conditional UPDATE does. Ideal for tests and local
/// development without a database.
#[derive(Default, Clone)]
pub struct InMemoryInventoryStore {
    tiers: Arc<RwLock<HashMap<Uuid, TicketTier>>>,
}

impl InMemoryInventoryStore {
    /// Creates a new, empty in-memory inventory store.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, tier: TicketTier) {
        let mut tiers = self.tiers.write().await;
        tiers.insert(tier.id, tier);
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn tier_by_id(&self, tier_id: Uuid) -> Result<Option<TicketTier>, AppError> {
        let tiers = self.tiers.read().await;
        Ok(tiers.get(&tier_id).cloned())
    }

    async fn record_sale(&self, tier_id: Uuid, quantity: i32) -> Result<SaleOutcome, AppError> {
        let mut tiers = self.tiers.write().await;
        match tiers.get_mut(&tier_id) {
            Some(tier) if tier.sold_quantity + quantity <= tier.total_quantity => {
                tier.sold_quantity += quantity;
                tier.updated_at = Utc::now();
                Ok(SaleOutcome::Recorded)
            }
            _ => Ok(SaleOutcome::WouldOversell),
        }
    }
}

/// A thread-safe in-memory order store keyed by provider session id.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<String, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, AppError> {
        let now = Utc::now();
        let created = Order {
            id: Uuid::new_v4(),
            stripe_session_id: order.stripe_session_id.clone(),
            event_id: order.event_id,
            tier_id: order.tier_id,
            quantity: order.quantity,
            status: OrderStatus::Pending,
            buyer_email: order.buyer_email,
            created_at: now,
            updated_at: now,
        };

        let mut orders = self.orders.write().await;
        orders.insert(order.stripe_session_id, created.clone());
        Ok(created)
    }

    async fn find_by_session(&self, session_id: &str) -> Result<Option<Order>, AppError> {
        let orders = self.orders.read().await;
        Ok(orders.get(session_id).cloned())
    }

    async fn mark_paid(&self, session_id: &str) -> Result<Option<Order>, AppError> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(session_id) {
            Some(order) if order.status == OrderStatus::Pending => {
                order.status = OrderStatus::Paid;
                order.updated_at = Utc::now();
                Ok(Some(order.clone()))
            }
            _ => Ok(None),
        }
    }
}
