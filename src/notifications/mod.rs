//! Buyer confirmation dispatch.
//!
//! The trait is the retryable-dispatch seam: the payment event handler
//! only ever calls [`NotificationSender::send_confirmation`], so a durable
//! queue or a real email provider can replace the adapter without touching
//! the handler's contract.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notification dispatch failed: {0}")]
    Dispatch(String),
}

/// Confirmation payload: event, quantity, and order reference.
#[derive(Debug, Clone)]
pub struct TicketConfirmation {
    pub to: String,
    pub event_id: String,
    pub quantity: i32,
    pub order_reference: String,
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_confirmation(
        &self,
        confirmation: &TicketConfirmation,
    ) -> Result<(), NotificationError>;
}

/// Logs the confirmation instead of delivering it.
///
/// The upstream email integration is a stub pending a real provider; this
/// adapter keeps the workflow observable until one is wired in.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSender for LogNotifier {
    async fn send_confirmation(
        &self,
        confirmation: &TicketConfirmation,
    ) -> Result<(), NotificationError> {
        tracing::info!(
            to = %confirmation.to,
            event_id = %confirmation.event_id,
            quantity = confirmation.quantity,
            order_reference = %confirmation.order_reference,
            "Sending ticket confirmation"
        );
        Ok(())
    }
}

/// Test double that records confirmations, optionally failing every send.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<TicketConfirmation>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<TicketConfirmation> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingNotifier {
    async fn send_confirmation(
        &self,
        confirmation: &TicketConfirmation,
    ) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError::Dispatch(
                "recording notifier set to fail".to_string(),
            ));
        }
        self.sent.write().await.push(confirmation.clone());
        Ok(())
    }
}
