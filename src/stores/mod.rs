//! Storage ports for the booking workflow.
//!
//! Handlers never read-modify-write shared counters in memory; the sale
//! guard and the `pending -> paid` transition are single conditional
//! operations inside each adapter.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{NewOrder, Order, TicketTier};
use crate::utils::error::AppError;

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryInventoryStore, InMemoryOrderStore};
pub use postgres::{PgInventoryStore, PgOrderStore};

/// Result of attempting to record a sale against a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleOutcome {
    /// `sold_quantity` was increased by the requested amount.
    Recorded,
    /// Applying the sale would push `sold_quantity` past `total_quantity`
    /// (or the tier does not exist). Nothing was changed.
    WouldOversell,
}

#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn tier_by_id(&self, tier_id: Uuid) -> Result<Option<TicketTier>, AppError>;

    /// Atomically add `quantity` to the tier's sold count, guarded so the
    /// total capacity is never exceeded even under concurrent callers.
    async fn record_sale(&self, tier_id: Uuid, quantity: i32) -> Result<SaleOutcome, AppError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create(&self, order: NewOrder) -> Result<Order, AppError>;

    async fn find_by_session(&self, session_id: &str) -> Result<Option<Order>, AppError>;

    /// Transition the order for `session_id` from `pending` to `paid`.
    ///
    /// Returns the updated order, or `None` when no pending order matched
    /// (unknown session, or a concurrent delivery already won the race).
    async fn mark_paid(&self, session_id: &str) -> Result<Option<Order>, AppError>;
}
