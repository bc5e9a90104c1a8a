//! # Backend contracts
//!
//! This module defines the behaviour that a storage backend must expose in order to be supported by the shop engine.
//!
//! * [`CatalogManagement`] covers products, stock, countries and categories.
//! * [`OrderManagement`] covers storing and querying orders, and the conditional updates that the payment flow relies
//!   on.
//! * [`ShopDatabase`] ties the two together.
//!
//! All backends report failures with [`ShopError`].
mod catalog_management;
mod errors;
mod order_management;
mod shop_database;

pub use catalog_management::CatalogManagement;
pub use errors::{ErrorKind, ShopError};
pub use order_management::OrderManagement;
pub use shop_database::ShopDatabase;
