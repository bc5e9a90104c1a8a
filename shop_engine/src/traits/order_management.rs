use chrono::{DateTime, Utc};

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderUpdate},
    traits::ShopError,
};

/// The order store. Orders returned by these methods always carry their items and shipping address.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Takes a fully priced order and, in a single atomic transaction,
    /// * decrements the stock of every product in the order (conditionally, so that stock never goes negative),
    /// * stores the order, its items and its shipping address.
    ///
    /// If any step fails, nothing is written. In particular, if another order claimed the last units of a product
    /// since the order was priced, `ShopError::InsufficientStock` is returned and no stock changes.
    async fn process_new_order(&self, order: NewOrder) -> Result<Order, ShopError>;

    async fn fetch_order_by_id(&self, id: &OrderId) -> Result<Option<Order>, ShopError>;

    /// Fetches the order that is linked to the given payment transaction id, if any.
    async fn fetch_order_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Order>, ShopError>;

    /// Applies the update to the order. Fails with `ShopError::TransactionIdInUse` if the new transaction id is already
    /// linked to another order.
    async fn update_order(&self, id: &OrderId, update: OrderUpdate) -> Result<Order, ShopError>;

    /// Marks the order as paid with the given transaction id, but only if it is not paid already.
    ///
    /// Returns `None` if the order was already paid (or does not exist), so that at most one caller ever observes the
    /// unpaid-to-paid transition.
    async fn mark_order_paid(
        &self,
        id: &OrderId,
        transaction_id: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Order>, ShopError>;

    /// All orders for the user, newest first.
    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, ShopError>;

    /// A page of all orders, newest first, along with the total number of orders.
    async fn fetch_orders_page(&self, offset: i64, limit: i64) -> Result<(Vec<Order>, i64), ShopError>;
}
