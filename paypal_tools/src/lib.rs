//! A small client for the parts of the PayPal REST API that the shop needs: reading a checkout order to verify that
//! it was captured, and creating a checkout order for the customer to approve.
//!
//! [`PaypalApi`] implements [`shop_common::PaymentVerifier`], so it can be handed straight to the reconciliation
//! engine.
mod api;
mod config;
mod error;
mod helpers;

pub mod data_objects;

pub use api::PaypalApi;
pub use config::PaypalConfig;
pub use data_objects::{CreatedPayment, PaypalOrder};
pub use error::PaypalApiError;
pub use helpers::is_sandbox_transaction_id;
