//! Shop Engine
//!
//! The shop engine places orders against a live product inventory and reconciles them with payments that an external
//! provider (PayPal) has verified. It is storage and provider agnostic.
//!
//! The library is divided into two main sections:
//! 1. Storage backends ([`traits`]). SQLite is the supported backend. You should never need to access the database
//!    directly. Instead, use the public API provided by the engine. The exception is the data types used in the
//!    database. These are defined in the `db_types` module and are public.
//! 2. The engine's public API ([`mod@shop_api`]). Placing orders, confirming payments, querying orders and reading
//!    the catalog.
//!
//! The engine also emits events that can be subscribed to, for example when an order is placed or paid. See
//! [`events`].
mod sqlite;

pub mod cache;
pub mod config;
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod shop_api;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use shop_api::{
    auth::{require_role, Caller},
    catalog_api::{CatalogApi, CatalogEntry},
    order_objects,
    order_placement_api::OrderPlacementApi,
    orders_api::OrdersApi,
    payment_api::PaymentReconciliationApi,
};
pub use traits::{CatalogManagement, ErrorKind, OrderManagement, ShopDatabase, ShopError};
