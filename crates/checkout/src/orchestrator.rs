//! Checkout orchestrator: cart to order.

use async_trait::async_trait;
use cart::{CartError, CartLine, CartRepository, CartStore, ResolvedLine};
use catalog::{CatalogReader, Coupon, CouponReader};
use chrono::Utc;
use common::{StoreError, UserId};
use pricing::{PricingEngine, compute_discount, compute_subtotal};

use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, PartialCommitWarning, Result};
use crate::follow_up::{FollowUp, FollowUpExecutor, FollowUpQueue};
use crate::order::{Order, OrderDraft, OrderItem, OrderNumber, PaymentMethod, ShippingInfo};
use crate::store::OrderStore;

/// Everything the shopper submits from the checkout page.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub user_id: UserId,
    /// The cart lines the shopper saw when submitting.
    pub lines: Vec<CartLine>,
    /// A coupon previously accepted by [`PricingEngine::apply_coupon`].
    pub coupon: Option<Coupon>,
    pub shipping: ShippingInfo,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// A placed order plus any follow-ups that could not be completed.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub order: Order,
    pub warnings: Vec<PartialCommitWarning>,
}

impl CheckoutOutcome {
    pub fn order_number(&self) -> &OrderNumber {
        self.order.order_number()
    }

    pub fn is_fully_committed(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Converts a cart into an immutable order.
///
/// The effects of one checkout run strictly in sequence: resolve, persist
/// order, increment coupon, clear cart. Each later step runs only after the
/// order write succeeded. A failed order write leaves the coupon and cart
/// untouched.
pub struct CheckoutOrchestrator<R, C, O>
where
    R: CartRepository,
    C: CatalogReader + CouponReader,
    O: OrderStore,
{
    cart: CartStore<R, C>,
    pricing: PricingEngine<C>,
    orders: O,
    follow_ups: FollowUpQueue,
}

impl<R, C, O> CheckoutOrchestrator<R, C, O>
where
    R: CartRepository,
    C: CatalogReader + CouponReader + Clone,
    O: OrderStore,
{
    /// Creates a new orchestrator sharing the cart store's catalog.
    pub fn new(cart: CartStore<R, C>, orders: O, config: CheckoutConfig) -> Self {
        let pricing = PricingEngine::new(cart.catalog().clone());
        Self {
            cart,
            pricing,
            orders,
            follow_ups: FollowUpQueue::new(config),
        }
    }

    pub fn cart(&self) -> &CartStore<R, C> {
        &self.cart
    }

    pub fn pricing(&self) -> &PricingEngine<C> {
        &self.pricing
    }

    pub fn orders(&self) -> &O {
        &self.orders
    }

    /// Places an order for the submitted cart.
    ///
    /// Returns the created order once it is persisted, even if the coupon
    /// increment or cart cleanup afterwards failed; those failures are
    /// reported as warnings.
    #[tracing::instrument(skip(self, request), fields(user_id = %request.user_id, lines = request.lines.len()))]
    pub async fn place_order(&self, request: CheckoutRequest) -> Result<CheckoutOutcome> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let started = std::time::Instant::now();

        request.payment_method.validate()?;
        request.shipping.validate()?;

        // 1. Re-resolve against the live catalog
        let resolved = self.resolve_submitted(&request).await?;
        if resolved.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        // 2. Recompute pricing from fresh prices
        let subtotal = compute_subtotal(&resolved);
        let coupon = match &request.coupon {
            Some(coupon) => Some(self.pricing.apply_coupon(&coupon.code, subtotal).await?),
            None => None,
        };
        let discount = compute_discount(coupon.as_ref(), subtotal);

        // 3. Build the order under a fresh number
        let now = Utc::now();
        let order = Order::new(OrderDraft {
            order_number: OrderNumber::generate(now),
            user_id: request.user_id.clone(),
            items: resolved.iter().map(OrderItem::from).collect(),
            subtotal,
            discount,
            coupon_code: coupon.as_ref().map(|c| c.code.clone()),
            payment_method: request.payment_method,
            shipping: request.shipping,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
            created_at: now,
        });

        // 4. Persist: the durability boundary
        let order = self.orders.create_order(order).await.map_err(|err| {
            metrics::counter!("checkout_failures_total").increment(1);
            tracing::error!(error = %err, "order creation failed");
            CheckoutError::OrderCreationFailed {
                reason: err.to_string(),
            }
        })?;

        tracing::info!(
            order_number = %order.order_number(),
            total = %order.total(),
            items = order.items().len(),
            "order placed"
        );

        // 5 and 6. Best-effort follow-ups
        let mut follow_ups = Vec::with_capacity(2);
        if let Some(coupon) = coupon {
            follow_ups.push(FollowUp::IncrementCouponUsage {
                coupon_id: coupon.id,
                coupon_code: coupon.code,
                order_number: order.order_number().clone(),
            });
        }
        follow_ups.push(FollowUp::ClearCartLines {
            user_id: request.user_id,
            line_ids: resolved.iter().map(ResolvedLine::id).collect(),
        });

        let warnings = self
            .follow_ups
            .drain(self, order.order_number(), follow_ups)
            .await;

        metrics::counter!("checkout_orders_placed_total").increment(1);
        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());

        Ok(CheckoutOutcome { order, warnings })
    }

    /// Resolves the submitted lines that belong to the buyer, dropping any
    /// whose product or store has gone away.
    async fn resolve_submitted(&self, request: &CheckoutRequest) -> Result<Vec<ResolvedLine>> {
        let (own, foreign): (Vec<CartLine>, Vec<CartLine>) = request
            .lines
            .iter()
            .cloned()
            .partition(|l| l.user_id == request.user_id);

        if !foreign.is_empty() {
            tracing::warn!(
                count = foreign.len(),
                "ignoring submitted lines owned by another user"
            );
        }

        let resolved = self.cart.resolve_all(own).await?;
        let dropped = request.lines.len() - foreign.len() - resolved.len();
        if dropped > 0 {
            tracing::info!(dropped, "excluding lines that no longer resolve");
        }

        Ok(resolved)
    }
}

#[async_trait]
impl<R, C, O> FollowUpExecutor for CheckoutOrchestrator<R, C, O>
where
    R: CartRepository,
    C: CatalogReader + CouponReader + Clone,
    O: OrderStore,
{
    async fn perform(&self, follow_up: &FollowUp) -> std::result::Result<(), StoreError> {
        match follow_up {
            FollowUp::IncrementCouponUsage {
                coupon_id,
                order_number,
                ..
            } => {
                self.orders
                    .increment_coupon_usage(coupon_id, order_number)
                    .await
            }
            FollowUp::ClearCartLines { user_id, line_ids } => self
                .cart
                .remove_lines(user_id, line_ids)
                .await
                .map(|_| ())
                .map_err(|err| match err {
                    CartError::Store(store) => store,
                    other => StoreError::unavailable(other.to_string()),
                }),
        }
    }
}
