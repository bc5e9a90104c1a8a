use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderId, Role},
    shop_api::{
        auth::{require_role, Caller},
        order_objects::{page_params, OrderPage},
    },
    traits::{ShopDatabase, ShopError},
};

/// Read-only queries over orders.
pub struct OrdersApi<B> {
    db: B,
}

impl<B> Debug for OrdersApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrdersApi")
    }
}

impl<B> OrdersApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrdersApi<B>
where B: ShopDatabase
{
    pub async fn order_by_id(&self, id: &OrderId) -> Result<Order, ShopError> {
        self.db.fetch_order_by_id(id).await?.ok_or_else(|| ShopError::OrderNotFound(id.clone()))
    }

    /// Fetches an order on behalf of `caller`. Users can only see their own orders. Admins can see any order.
    pub async fn order_for_caller(&self, caller: &Caller, id: &OrderId) -> Result<Order, ShopError> {
        let order = self.order_by_id(id).await?;
        if order.user_id == caller.user_id || caller.has_role(Role::Admin) {
            Ok(order)
        } else {
            warn!("🔐️ {} tried to read order [{id}], which belongs to someone else", caller.user_id);
            Err(ShopError::AccessDenied(format!("Order {id} does not belong to {}", caller.user_id)))
        }
    }

    /// All the orders for the given user, newest first.
    pub async fn orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, ShopError> {
        self.db.fetch_orders_for_user(user_id).await
    }

    /// Lists every order in the shop, newest first. Admins only.
    ///
    /// `page` is 1-based and defaults to 1. `limit` defaults to 10 and is capped at 100.
    pub async fn orders_page(
        &self,
        caller: &Caller,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<OrderPage, ShopError> {
        require_role(caller, Role::Admin)?;
        let (page, limit) = page_params(page, limit);
        let offset = (page - 1) * limit;
        let (orders, total) = self.db.fetch_orders_page(offset, limit).await?;
        trace!("🔄️📦️ Fetched page {page} ({} of {total} orders)", orders.len());
        Ok(OrderPage::new(orders, total, page, limit))
    }
}
