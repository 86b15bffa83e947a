//! Checkout orchestration for the marketplace.
//!
//! Turns a shopper's cart into an immutable [`Order`]:
//! 1. Re-resolve the submitted lines against the live catalog
//! 2. Recompute subtotal, discount and total
//! 3. Persist the order under a unique order number
//! 4. Increment the coupon's usage counter
//! 5. Remove the ordered lines from the cart
//!
//! Step 3 is the durability boundary. Steps 4 and 5 are follow-ups retried
//! in-process; if they still fail the order stands and a
//! [`PartialCommitWarning`] is logged and returned.

pub mod config;
pub mod error;
pub mod follow_up;
pub mod memory;
pub mod orchestrator;
pub mod order;
pub mod store;

pub use config::CheckoutConfig;
pub use error::{CheckoutError, PartialCommitWarning, Result};
pub use follow_up::{FollowUp, FollowUpExecutor, FollowUpQueue};
pub use memory::InMemoryOrderStore;
pub use orchestrator::{CheckoutOrchestrator, CheckoutOutcome, CheckoutRequest};
pub use order::{Order, OrderDraft, OrderItem, OrderNumber, PaymentMethod, ShippingInfo};
pub use store::OrderStore;
