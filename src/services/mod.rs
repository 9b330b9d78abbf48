pub mod checkout;
pub mod payment_events;

pub use checkout::CheckoutService;
pub use payment_events::{PaymentEventHandler, WebhookAck};
