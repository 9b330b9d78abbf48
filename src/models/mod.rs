pub mod booking;
pub mod order;
pub mod tier;

pub use booking::{BookingRequest, CheckoutRequest};
pub use order::{NewOrder, Order, OrderStatus};
pub use tier::TicketTier;
