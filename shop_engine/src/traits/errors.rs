use rust_decimal::Decimal;
use shop_common::{Money, MoneyConversionError, PaymentVerifierError};
use thiserror::Error;

use crate::db_types::{OrderId, ProductId, Role};

/// Broad classes of failure, so that callers can map engine errors onto their own responses (HTTP status codes,
/// CLI exit codes, etc.) without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    External,
    Unauthorized,
    Internal,
}

#[derive(Debug, Error)]
pub enum ShopError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Product with id {0} not found")]
    ProductNotFound(ProductId),
    #[error("Order with id {0} not found")]
    OrderNotFound(OrderId),
    #[error("No order is linked to transaction {0}")]
    TransactionNotFound(String),
    #[error("Country with id {0} not found")]
    CountryNotFound(String),
    #[error("An order must contain at least one item")]
    EmptyOrder,
    #[error("Invalid quantity {quantity} for product {product_id}. Quantities must be at least 1")]
    InvalidQuantity { product_id: ProductId, quantity: i64 },
    #[error("Insufficient stock for {product}. {requested} requested, {available} available")]
    InsufficientStock { product: String, requested: i64, available: i64 },
    #[error("Size {size} is not available for {product}")]
    SizeUnavailable { product: String, size: String },
    #[error("Payment {transaction_id} has not been completed. Status is {status}")]
    PaymentNotCompleted { transaction_id: String, status: String },
    #[error("Payment amount {paid} does not match the order total {expected}")]
    PaymentAmountMismatch { paid: Decimal, expected: Money },
    #[error("The payment provider reported an invalid amount: {0}")]
    InvalidPaymentAmount(String),
    #[error("Transaction {0} is already linked to another order")]
    TransactionIdInUse(String),
    #[error("Order {0} has already been paid")]
    OrderAlreadyPaid(OrderId),
    #[error("{0}")]
    PaymentVerifier(#[from] PaymentVerifierError),
    #[error("Insufficient permissions. The {0} role is required")]
    InsufficientPermissions(Role),
    #[error("Access denied. {0}")]
    AccessDenied(String),
    #[error("{0}")]
    MoneyConversion(#[from] MoneyConversionError),
}

impl ShopError {
    pub fn kind(&self) -> ErrorKind {
        use ShopError::*;
        match self {
            ProductNotFound(_) | OrderNotFound(_) | TransactionNotFound(_) | CountryNotFound(_) => ErrorKind::NotFound,
            EmptyOrder
            | InvalidQuantity { .. }
            | InsufficientStock { .. }
            | SizeUnavailable { .. }
            | PaymentNotCompleted { .. }
            | PaymentAmountMismatch { .. }
            | InvalidPaymentAmount(_)
            | TransactionIdInUse(_)
            | OrderAlreadyPaid(_) => ErrorKind::Validation,
            PaymentVerifier(_) => ErrorKind::External,
            InsufficientPermissions(_) | AccessDenied(_) => ErrorKind::Unauthorized,
            DatabaseError(_) | MoneyConversion(_) => ErrorKind::Internal,
        }
    }
}

impl From<sqlx::Error> for ShopError {
    fn from(e: sqlx::Error) -> Self {
        ShopError::DatabaseError(e.to_string())
    }
}
