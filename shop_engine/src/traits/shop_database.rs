use crate::traits::{CatalogManagement, OrderManagement};

/// The highest level of behaviour for backends supporting the shop engine.
pub trait ShopDatabase: Clone + CatalogManagement + OrderManagement {
    /// The URL of the database
    fn url(&self) -> &str;
}
