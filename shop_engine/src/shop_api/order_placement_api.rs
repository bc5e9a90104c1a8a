use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{CartItem, NewOrder, NewOrderItem, Order, OrderAddress},
    events::{EventProducers, OrderPlacedEvent},
    traits::{ShopDatabase, ShopError},
};

/// `OrderPlacementApi` turns a customer's cart into a stored, priced order.
pub struct OrderPlacementApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderPlacementApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderPlacementApi")
    }
}

impl<B> OrderPlacementApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

impl<B> OrderPlacementApi<B>
where B: ShopDatabase
{
    /// Places an order for `user_id` with the given cart and shipping address.
    ///
    /// The cart is validated item by item, in the order given, against the live catalog. The first problem aborts the
    /// call and nothing is written:
    /// * the cart must not be empty,
    /// * the address must refer to a known country,
    /// * every quantity must be at least 1,
    /// * every product must exist (`ShopError::ProductNotFound`),
    /// * have at least `quantity` items in stock (`ShopError::InsufficientStock`),
    /// * and offer the requested size (`ShopError::SizeUnavailable`).
    ///
    /// The order is then priced (see [`NewOrder`]) and handed to the backend, which stores it and reserves stock in
    /// one transaction. If stock ran out in the meantime, the backend reports `InsufficientStock` and nothing is
    /// stored.
    ///
    /// Subscribers to the order placed hook are notified once the order is stored.
    pub async fn place_order(
        &self,
        user_id: &str,
        items: &[CartItem],
        address: OrderAddress,
    ) -> Result<Order, ShopError> {
        if items.is_empty() {
            return Err(ShopError::EmptyOrder);
        }
        if self.db.fetch_country(&address.country_id).await?.is_none() {
            return Err(ShopError::CountryNotFound(address.country_id));
        }
        let mut order_items = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity < 1 {
                return Err(ShopError::InvalidQuantity { product_id: item.product_id.clone(), quantity: item.quantity });
            }
            let product = self
                .db
                .fetch_product(&item.product_id)
                .await?
                .ok_or_else(|| ShopError::ProductNotFound(item.product_id.clone()))?;
            if product.stock < item.quantity {
                return Err(ShopError::InsufficientStock {
                    product: product.title,
                    requested: item.quantity,
                    available: product.stock,
                });
            }
            if !product.has_size(&item.size) {
                return Err(ShopError::SizeUnavailable { product: product.title, size: item.size.clone() });
            }
            order_items.push(NewOrderItem {
                product_id: product.id,
                quantity: item.quantity,
                price: product.price,
                size: item.size.clone(),
            });
        }
        let new_order = NewOrder::new(user_id, order_items, address)?;
        trace!(
            "🔄️📦️ Order [{}] for {user_id} priced at {} + {} tax = {}",
            new_order.id,
            new_order.sub_total,
            new_order.tax,
            new_order.total
        );
        let order = self.db.process_new_order(new_order).await?;
        info!("🔄️📦️ Order [{}] placed by {user_id} for {} ({} items)", order.id, order.total, order.items_in_order);
        self.producers.publish_order_placed(OrderPlacedEvent::new(order.clone())).await;
        Ok(order)
    }
}
