//! Immutable order records.

use cart::ResolvedLine;
use chrono::{DateTime, Utc};
use common::{Money, ProductId, StoreId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CheckoutError;

/// Human-facing order number, e.g. `ORD-1718000000000-3FA9C1`.
///
/// Combines a millisecond timestamp with random hex so collisions are
/// negligible; the order store still enforces uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generates a fresh order number for `now`.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let entropy: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(6)
            .collect::<String>()
            .to_uppercase();
        Self(format!("ORD-{}-{}", now.timestamp_millis(), entropy))
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the order ships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl ShippingInfo {
    /// Checks that every required field is non-blank.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        let required = [
            ("full name", &self.full_name),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip code", &self.zip_code),
            ("phone", &self.phone),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(CheckoutError::InvalidShippingInfo { field: *field }),
            None => Ok(()),
        }
    }
}

/// How the buyer intends to pay. A label only; nothing is charged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethod(String);

impl PaymentMethod {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.0.trim().is_empty() {
            return Err(CheckoutError::MissingPaymentMethod);
        }
        Ok(())
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One product line captured at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub store_id: StoreId,
    pub store_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

impl From<&ResolvedLine> for OrderItem {
    fn from(line: &ResolvedLine) -> Self {
        Self {
            product_id: line.product.id.clone(),
            product_name: line.product.name.clone(),
            store_id: line.store.id.clone(),
            store_name: line.store.name.clone(),
            quantity: line.quantity(),
            unit_price: line.product.price,
            line_total: line.line_total(),
        }
    }
}

/// Snapshot of a completed checkout. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    order_number: OrderNumber,
    user_id: UserId,
    items: Vec<OrderItem>,
    subtotal: Money,
    discount: Money,
    coupon_code: Option<String>,
    total: Money,
    payment_method: PaymentMethod,
    shipping: ShippingInfo,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

/// Inputs for [`Order::new`] other than the computed total.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub order_number: OrderNumber,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub discount: Money,
    pub coupon_code: Option<String>,
    pub payment_method: PaymentMethod,
    pub shipping: ShippingInfo,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Builds an order; the total is always `max(0, subtotal - discount)`.
    pub fn new(draft: OrderDraft) -> Self {
        let total = draft.subtotal.saturating_sub(draft.discount);
        Self {
            order_number: draft.order_number,
            user_id: draft.user_id,
            items: draft.items,
            subtotal: draft.subtotal,
            discount: draft.discount,
            coupon_code: draft.coupon_code,
            total,
            payment_method: draft.payment_method,
            shipping: draft.shipping,
            notes: draft.notes,
            created_at: draft.created_at,
        }
    }

    pub fn order_number(&self) -> &OrderNumber {
        &self.order_number
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn payment_method(&self) -> &PaymentMethod {
        &self.payment_method
    }

    pub fn shipping(&self) -> &ShippingInfo {
        &self.shipping
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Total units across all items.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}
