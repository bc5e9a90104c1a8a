use std::{fmt::Debug, future::Future, pin::Pin, sync::Arc};

use futures_util::FutureExt;
use log::*;

use crate::{
    cache::{CacheStore, InMemoryCache},
    db_types::{Category, Country, Product, ProductId},
    events::OrderPlacedEvent,
    traits::{ShopDatabase, ShopError},
};

const PRODUCT_PREFIX: &str = "product:";
const COUNTRIES_KEY: &str = "countries";
const CATEGORIES_KEY: &str = "categories";

/// The kinds of value that the catalog keeps in its cache.
#[derive(Debug, Clone)]
pub enum CatalogEntry {
    Product(Product),
    Countries(Vec<Country>),
    Categories(Vec<Category>),
}

fn product_key(id: &ProductId) -> String {
    format!("{PRODUCT_PREFIX}{id}")
}

/// Cached, read-only access to the catalog, for display purposes.
///
/// Order placement does not use this API. It always reads products straight from the backend so that stock checks
/// see current values.
pub struct CatalogApi<B, C = InMemoryCache<CatalogEntry>> {
    db: B,
    cache: Arc<C>,
}

impl<B, C> Debug for CatalogApi<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B, C> CatalogApi<B, C>
where C: CacheStore<CatalogEntry> + 'static
{
    pub fn new(db: B, cache: C) -> Self {
        Self { db, cache: Arc::new(cache) }
    }

    pub fn cache(&self) -> &C {
        self.cache.as_ref()
    }

    pub fn invalidate_product(&self, id: &ProductId) {
        self.cache.invalidate(&product_key(id));
    }

    pub fn invalidate_all(&self) {
        self.cache.clear();
    }

    /// A hook for [`crate::events::EventHooks::on_order_placed`] that drops the cached copy of every product whose
    /// stock changed because of the order.
    pub fn stock_invalidation_hook(
        &self,
    ) -> impl Fn(OrderPlacedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static {
        let cache = Arc::clone(&self.cache);
        move |event: OrderPlacedEvent| {
            for item in &event.order.items {
                cache.invalidate(&product_key(&item.product_id));
            }
            trace!("🧊️ Invalidated {} cached products after order [{}]", event.order.items.len(), event.order.id);
            async {}.boxed()
        }
    }
}

impl<B, C> CatalogApi<B, C>
where
    B: ShopDatabase,
    C: CacheStore<CatalogEntry>,
{
    pub async fn product(&self, id: &ProductId) -> Result<Product, ShopError> {
        let key = product_key(id);
        if let Some(CatalogEntry::Product(product)) = self.cache.get(&key) {
            return Ok(product);
        }
        let product = self.db.fetch_product(id).await?.ok_or_else(|| ShopError::ProductNotFound(id.clone()))?;
        self.cache.insert(&key, CatalogEntry::Product(product.clone()));
        Ok(product)
    }

    pub async fn countries(&self) -> Result<Vec<Country>, ShopError> {
        if let Some(CatalogEntry::Countries(countries)) = self.cache.get(COUNTRIES_KEY) {
            return Ok(countries);
        }
        let countries = self.db.fetch_countries().await?;
        debug!("🧊️ Caching {} countries", countries.len());
        self.cache.insert(COUNTRIES_KEY, CatalogEntry::Countries(countries.clone()));
        Ok(countries)
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ShopError> {
        if let Some(CatalogEntry::Categories(categories)) = self.cache.get(CATEGORIES_KEY) {
            return Ok(categories);
        }
        let categories = self.db.fetch_categories().await?;
        debug!("🧊️ Caching {} categories", categories.len());
        self.cache.insert(CATEGORIES_KEY, CatalogEntry::Categories(categories.clone()));
        Ok(categories)
    }
}
