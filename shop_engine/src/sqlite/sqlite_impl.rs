//! `SqliteDatabase` is a concrete implementation of a shop engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{catalog, db_url, new_pool, orders, products};
use crate::{
    db_types::{Category, Country, NewOrder, NewProduct, Order, OrderId, OrderUpdate, Product, ProductId},
    traits::{CatalogManagement, OrderManagement, ShopDatabase, ShopError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the `SHOP_DATABASE_URL` environment variable, or the default url if it
    /// is not set.
    pub async fn new(max_connections: u32) -> Result<Self, ShopError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, ShopError> {
        trace!("🗃️ Connecting to database at {url} with up to {max_connections} connections");
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the database schema up to date.
    pub async fn migrate(&self) -> Result<(), ShopError> {
        migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ShopError::DatabaseError(format!("Could not run migrations. {e}")))?;
        info!("🗃️ Database migrations are complete");
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), ShopError> {
        self.pool.close().await;
        Ok(())
    }
}

impl ShopDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_product(&self, id: &ProductId) -> Result<Option<Product>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(id, &mut conn).await?;
        Ok(product)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(product, &mut conn).await?;
        Ok(product)
    }

    async fn decrement_stock(&self, id: &ProductId, quantity: i64) -> Result<Product, ShopError> {
        let mut conn = self.pool.acquire().await?;
        match products::try_decrement_stock(id, quantity, &mut conn).await? {
            Some(product) => Ok(product),
            None => {
                let product = products::fetch_product(id, &mut conn).await?;
                Err(out_of_stock(id, product, quantity))
            },
        }
    }

    async fn fetch_country(&self, id: &str) -> Result<Option<Country>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let country = catalog::fetch_country(id, &mut conn).await?;
        Ok(country)
    }

    async fn fetch_countries(&self) -> Result<Vec<Country>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let countries = catalog::fetch_countries(&mut conn).await?;
        Ok(countries)
    }

    async fn upsert_country(&self, country: Country) -> Result<Country, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let country = catalog::upsert_country(country, &mut conn).await?;
        Ok(country)
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let categories = catalog::fetch_categories(&mut conn).await?;
        Ok(categories)
    }

    async fn upsert_category(&self, category: Category) -> Result<Category, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let category = catalog::upsert_category(category, &mut conn).await?;
        Ok(category)
    }
}

/// The error to report when a conditional stock decrement did not go through.
fn out_of_stock(id: &ProductId, product: Option<Product>, requested: i64) -> ShopError {
    match product {
        Some(p) => ShopError::InsufficientStock { product: p.title, requested, available: p.stock },
        None => ShopError::ProductNotFound(id.clone()),
    }
}

impl OrderManagement for SqliteDatabase {
    /// Takes a new order, and in a single atomic transaction,
    /// * conditionally decrements stock for every line item. Stock is touched first, so that the transaction takes
    ///   the write lock before it reads anything.
    /// * stores the order, its items and its address.
    ///
    /// Returning early drops the transaction, which rolls back every change made so far.
    async fn process_new_order(&self, order: NewOrder) -> Result<Order, ShopError> {
        let mut tx = self.pool.begin().await?;
        for item in &order.items {
            if products::try_decrement_stock(&item.product_id, item.quantity, &mut tx).await?.is_none() {
                let product = products::fetch_product(&item.product_id, &mut tx).await?;
                let err = out_of_stock(&item.product_id, product, item.quantity);
                warn!("🗃️ Order [{}] rolled back. {err}", order.id);
                return Err(err);
            }
        }
        orders::insert_order(&order, &mut tx).await?;
        let saved = orders::fetch_order_by_id(&order.id, &mut tx)
            .await?
            .ok_or_else(|| ShopError::DatabaseError(format!("Order {} vanished after it was inserted", order.id)))?;
        tx.commit().await?;
        debug!("🗃️ Order [{}] has been saved in the DB. Total: {}", saved.id, saved.total);
        Ok(saved)
    }

    async fn fetch_order_by_id(&self, id: &OrderId) -> Result<Option<Order>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Order>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_transaction_id(transaction_id, &mut conn).await?;
        Ok(order)
    }

    async fn update_order(&self, id: &OrderId, update: OrderUpdate) -> Result<Order, ShopError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_order(id, update, &mut conn).await?.ok_or_else(|| ShopError::OrderNotFound(id.clone()))
    }

    async fn mark_order_paid(
        &self,
        id: &OrderId,
        transaction_id: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Order>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        orders::mark_order_paid(id, transaction_id, paid_at, &mut conn).await
    }

    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_orders_page(&self, offset: i64, limit: i64) -> Result<(Vec<Order>, i64), ShopError> {
        let mut tx = self.pool.begin().await?;
        let total = orders::count_orders(&mut tx).await?;
        let page = orders::fetch_orders_page(offset, limit, &mut tx).await?;
        tx.commit().await?;
        Ok((page, total))
    }
}
