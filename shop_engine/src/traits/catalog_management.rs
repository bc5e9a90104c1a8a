use crate::{
    db_types::{Category, Country, NewProduct, Product, ProductId},
    traits::ShopError,
};

/// The inventory and catalog store.
///
/// The order flow only ever reads products and decrements stock. The insert methods exist so that operators and
/// tests can seed a catalog.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Fetches the product with the given id. Returns `None` if no such product exists.
    async fn fetch_product(&self, id: &ProductId) -> Result<Option<Product>, ShopError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, ShopError>;

    /// Atomically reduces the stock of a product by `quantity`.
    ///
    /// The decrement is conditional on there being enough stock, so stock can never go negative, even under
    /// concurrent access. If there is not enough stock, nothing changes and `ShopError::InsufficientStock` is
    /// returned.
    async fn decrement_stock(&self, id: &ProductId, quantity: i64) -> Result<Product, ShopError>;

    async fn fetch_country(&self, id: &str) -> Result<Option<Country>, ShopError>;

    async fn fetch_countries(&self) -> Result<Vec<Country>, ShopError>;

    /// Inserts the country, or renames it if the id already exists.
    async fn upsert_country(&self, country: Country) -> Result<Country, ShopError>;

    async fn fetch_categories(&self) -> Result<Vec<Category>, ShopError>;

    async fn upsert_category(&self, category: Category) -> Result<Category, ShopError>;
}
