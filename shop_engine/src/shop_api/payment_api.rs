use std::fmt::Debug;

use chrono::Utc;
use log::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shop_common::{PaymentDetails, PaymentVerifier};

use crate::{
    db_types::{Order, OrderId, OrderUpdate},
    events::{EventProducers, OrderPaidEvent},
    helpers::is_test_transaction_id,
    traits::{ShopDatabase, ShopError},
};

/// The largest difference between the captured amount and the order total that still counts as a match.
pub const AMOUNT_TOLERANCE: Decimal = dec!(0.01);

/// `PaymentReconciliationApi` links orders to payment provider transactions and marks them as paid once the provider
/// confirms that the money has actually been captured.
///
/// There are two ways to confirm a payment:
/// * [`Self::confirm_payment`] is the primary path. It only needs the provider's transaction id, which must already
///   have been linked to an order with [`Self::set_transaction_id`]. This is the shape of a provider webhook.
/// * [`Self::confirm_payment_for_order`] is scoped to a known order, for when the caller has the order id at hand.
///
/// An order is marked paid at most once. Confirming an order again with the transaction id it was paid with returns
/// the stored order unchanged. Any other transaction id is rejected.
pub struct PaymentReconciliationApi<B, V> {
    db: B,
    verifier: V,
    producers: EventProducers,
}

impl<B, V> Debug for PaymentReconciliationApi<B, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentReconciliationApi")
    }
}

impl<B, V> PaymentReconciliationApi<B, V> {
    pub fn new(db: B, verifier: V, producers: EventProducers) -> Self {
        Self { db, verifier, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }
}

impl<B, V> PaymentReconciliationApi<B, V>
where
    B: ShopDatabase,
    V: PaymentVerifier,
{
    /// Links a provider transaction id to an order, without contacting the provider and without marking anything as
    /// paid.
    ///
    /// * Setting the id an order already has is a no-op.
    /// * The transaction id of a paid order cannot be changed.
    /// * A transaction id can only be linked to one order.
    pub async fn set_transaction_id(&self, order_id: &OrderId, transaction_id: &str) -> Result<Order, ShopError> {
        let order = self.fetch_order(order_id).await?;
        if order.transaction_id.as_deref() == Some(transaction_id) {
            debug!("🔄️💳️ Order [{order_id}] is already linked to transaction {transaction_id}");
            return Ok(order);
        }
        if order.is_paid {
            return Err(ShopError::OrderAlreadyPaid(order.id));
        }
        self.ensure_transaction_is_free(&order.id, transaction_id).await?;
        let update = OrderUpdate::default().with_transaction_id(transaction_id);
        let order = self.db.update_order(&order.id, update).await?;
        info!("🔄️💳️ Order [{order_id}] is now linked to transaction {transaction_id}");
        Ok(order)
    }

    /// Confirms the payment with the given transaction id and marks the linked order as paid.
    ///
    /// The checks happen in this order:
    /// 1. The provider is asked about the transaction. Provider failures are returned as they are.
    /// 2. The provider must report the transaction as `COMPLETED`.
    /// 3. The transaction id must be linked to an order.
    /// 4. The captured amount must be within [`AMOUNT_TOLERANCE`] of the order total. Payments whose provider-reported
    ///    id is a sandbox test id skip this check (see [`crate::helpers::is_test_transaction_id`]).
    /// 5. The order is marked as paid, unless it already is.
    pub async fn confirm_payment(&self, transaction_id: &str) -> Result<Order, ShopError> {
        trace!("🔄️✅️ Confirming payment {transaction_id}");
        let details = self.verify_completed(transaction_id).await?;
        let order = self
            .db
            .fetch_order_by_transaction_id(transaction_id)
            .await?
            .ok_or_else(|| ShopError::TransactionNotFound(transaction_id.to_string()))?;
        self.settle(order, transaction_id, &details).await
    }

    /// Confirms the payment for a specific order. The order is looked up first, so an unknown order fails before the
    /// provider is contacted. The transaction id must not belong to a different order.
    pub async fn confirm_payment_for_order(&self, order_id: &OrderId, transaction_id: &str) -> Result<Order, ShopError> {
        trace!("🔄️✅️ Confirming payment {transaction_id} for order [{order_id}]");
        let order = self.fetch_order(order_id).await?;
        let details = self.verify_completed(transaction_id).await?;
        self.ensure_transaction_is_free(&order.id, transaction_id).await?;
        self.settle(order, transaction_id, &details).await
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Order, ShopError> {
        self.db.fetch_order_by_id(order_id).await?.ok_or_else(|| ShopError::OrderNotFound(order_id.clone()))
    }

    async fn ensure_transaction_is_free(&self, order_id: &OrderId, transaction_id: &str) -> Result<(), ShopError> {
        match self.db.fetch_order_by_transaction_id(transaction_id).await? {
            Some(other) if &other.id != order_id => {
                warn!(
                    "🔄️💳️ Transaction {transaction_id} is already linked to order [{}]. It cannot be used for [{order_id}]",
                    other.id
                );
                Err(ShopError::TransactionIdInUse(transaction_id.to_string()))
            },
            _ => Ok(()),
        }
    }

    async fn verify_completed(&self, transaction_id: &str) -> Result<PaymentDetails, ShopError> {
        let details = self.verifier.verify_payment(transaction_id).await?;
        debug!(
            "🔄️✅️ Provider reports transaction {transaction_id} as {} for {} {}",
            details.status, details.amount.value, details.amount.currency_code
        );
        if !details.is_completed() {
            return Err(ShopError::PaymentNotCompleted {
                transaction_id: transaction_id.to_string(),
                status: details.status,
            });
        }
        Ok(details)
    }

    async fn settle(&self, order: Order, transaction_id: &str, details: &PaymentDetails) -> Result<Order, ShopError> {
        if order.is_paid {
            return if order.is_paid_with(transaction_id) {
                info!("🔄️✅️ Order [{}] was already paid with {transaction_id}. Nothing to do", order.id);
                Ok(order)
            } else {
                Err(ShopError::OrderAlreadyPaid(order.id))
            };
        }
        check_amount(&order, details)?;
        match self.db.mark_order_paid(&order.id, transaction_id, Utc::now()).await? {
            Some(paid) => {
                info!("🔄️✅️ Order [{}] is paid. Transaction {transaction_id}", paid.id);
                self.producers.publish_order_paid(OrderPaidEvent::new(paid.clone())).await;
                Ok(paid)
            },
            None => {
                // Someone else marked the order as paid between our read and our write.
                let current = self.fetch_order(&order.id).await?;
                if current.is_paid_with(transaction_id) {
                    debug!("🔄️✅️ Order [{}] was concurrently confirmed with {transaction_id}", current.id);
                    Ok(current)
                } else {
                    Err(ShopError::OrderAlreadyPaid(current.id))
                }
            },
        }
    }
}

/// The sandbox bypass keys off the id the provider reports, not the id the caller supplied.
fn check_amount(order: &Order, details: &PaymentDetails) -> Result<(), ShopError> {
    let transaction_id = details.id.as_str();
    if is_test_transaction_id(transaction_id) {
        warn!(
            "🔄️🧪️ Transaction {transaction_id} is a sandbox test id. The amount check is skipped for order [{}]. \
             Provider reported {} {}, order total is {}",
            order.id, details.amount.value, details.amount.currency_code, order.total
        );
        return Ok(());
    }
    let paid = details
        .amount
        .decimal_value()
        .map_err(|e| ShopError::InvalidPaymentAmount(format!("{}. {e}", details.amount.value)))?;
    let difference = (paid - order.total.to_decimal()).abs();
    if difference > AMOUNT_TOLERANCE {
        warn!("🔄️💳️ Transaction {transaction_id} paid {paid}, but order [{}] is for {}", order.id, order.total);
        return Err(ShopError::PaymentAmountMismatch { paid, expected: order.total });
    }
    Ok(())
}
