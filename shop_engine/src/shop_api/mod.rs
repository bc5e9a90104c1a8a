//! # Shop engine public API
//!
//! The `shop_api` module exposes the programmatic API for the shop engine. The API is modular, so that clients can
//! pick and choose the functionality they want.
//!
//! * [`order_placement_api`] validates carts against live inventory and stores priced orders.
//! * [`payment_api`] links orders to payment provider transactions and reconciles them against what the provider
//!   actually captured.
//! * [`orders_api`] provides order queries for customers and admins.
//! * [`catalog_api`] provides cached catalog lookups for display.
//!
//! The other submodules in this module are support types and functions.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements the backend traits, plus whatever
//! collaborators the API needs (event producers, a payment verifier, a cache).
//!
//! ```rust,ignore
//! use shop_engine::{OrderPlacementApi, SqliteDatabase, events::EventProducers};
//! let db = SqliteDatabase::new_with_url("sqlite://data/shop_store.db", 5).await?;
//! let api = OrderPlacementApi::new(db, EventProducers::default());
//! let order = api.place_order("alice", &cart, address).await?;
//! ```

pub mod auth;
pub mod catalog_api;
pub mod order_objects;
pub mod order_placement_api;
pub mod orders_api;
pub mod payment_api;
