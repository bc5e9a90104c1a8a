use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use shop_common::{Money, MoneyConversionError};
use sqlx::{sqlite::SqliteRow, FromRow, Row, Type};
use thiserror::Error;

/// Sales tax applied to every order's subtotal.
pub const TAX_RATE: Decimal = dec!(0.15);

fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

//--------------------------------------        OrderId        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn random() -> Self {
        Self(new_uuid())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------       ProductId       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn random() -> Self {
        Self(new_uuid())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ProductId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------         Role          ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid role: {0}")]
pub struct ConversionError(String);

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------     Catalog types     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Country {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// A catalog product. Sizes and tags are stored as comma-separated lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub price: Money,
    pub stock: i64,
    pub sizes: Vec<String>,
    pub gender: String,
    pub tags: Vec<String>,
    pub category_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn has_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}

pub(crate) fn join_list(values: &[String]) -> String {
    values.iter().map(|s| s.trim()).collect::<Vec<_>>().join(",")
}

impl FromRow<'_, SqliteRow> for Product {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let sizes: String = row.try_get("sizes")?;
        let tags: String = row.try_get("tags")?;
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            slug: row.try_get("slug")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            stock: row.try_get("stock")?,
            sizes: split_list(&sizes),
            gender: row.try_get("gender")?,
            tags: split_list(&tags),
            category_id: row.try_get("category_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// A product that has not been written to the catalog yet. Used by seeding tools and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub id: ProductId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub price: Money,
    pub stock: i64,
    pub sizes: Vec<String>,
    pub gender: String,
    pub tags: Vec<String>,
    pub category_id: Option<String>,
}

impl NewProduct {
    pub fn new<S: Into<String>>(title: S, price: Money, stock: i64) -> Self {
        let title = title.into();
        let slug = title.trim().to_lowercase().replace(|c: char| !c.is_ascii_alphanumeric(), "_");
        Self {
            id: ProductId::random(),
            title,
            slug,
            description: String::default(),
            price,
            stock,
            sizes: Vec::new(),
            gender: "unisex".into(),
            tags: Vec::new(),
            category_id: None,
        }
    }

    pub fn with_id<S: Into<ProductId>>(mut self, id: S) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_sizes(mut self, sizes: &[&str]) -> Self {
        self.sizes = sizes.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_category<S: Into<String>>(mut self, category_id: S) -> Self {
        self.category_id = Some(category_id.into());
        self
    }
}

//--------------------------------------        CartItem       ---------------------------------------------------------
/// One line of a customer's cart, as submitted for checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: i64,
    pub size: String,
}

impl CartItem {
    pub fn new<P: Into<ProductId>, S: Into<String>>(product_id: P, quantity: i64, size: S) -> Self {
        Self { product_id: product_id.into(), quantity, size: size.into() }
    }
}

//--------------------------------------      OrderAddress     ---------------------------------------------------------
/// Shipping address snapshot. It is copied into the order at checkout and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderAddress {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    #[serde(default)]
    pub address2: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub phone: String,
    pub country_id: String,
}

//--------------------------------------       OrderItem       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    /// Unit price at the time the order was placed
    pub price: Money,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i64,
    pub price: Money,
    pub size: String,
}

impl NewOrderItem {
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
/// A fully priced order, ready to be persisted.
///
/// The monetary fields are derived from the items when the order is built and are never recalculated:
/// `sub_total` is the sum of the line totals, `tax` is `sub_total` times [`TAX_RATE`] rounded to the cent, and
/// `total = sub_total + tax`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub id: OrderId,
    pub user_id: String,
    pub items: Vec<NewOrderItem>,
    pub address: OrderAddress,
    pub sub_total: Money,
    pub tax: Money,
    pub total: Money,
    pub items_in_order: i64,
}

impl NewOrder {
    pub fn new<S: Into<String>>(
        user_id: S,
        items: Vec<NewOrderItem>,
        address: OrderAddress,
    ) -> Result<Self, MoneyConversionError> {
        let sub_total: Money = items.iter().map(NewOrderItem::line_total).sum();
        let tax = sub_total.apply_rate(TAX_RATE)?;
        let total = sub_total + tax;
        let items_in_order = items.iter().map(|i| i.quantity).sum();
        Ok(Self {
            id: OrderId::random(),
            user_id: user_id.into(),
            items,
            address,
            sub_total,
            tax,
            total,
            items_in_order,
        })
    }
}

//--------------------------------------         Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: String,
    pub sub_total: Money,
    pub tax: Money,
    pub total: Money,
    pub items_in_order: i64,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub items: Vec<OrderItem>,
    #[sqlx(skip)]
    pub address: Option<OrderAddress>,
}

impl Order {
    pub fn is_paid_with(&self, transaction_id: &str) -> bool {
        self.is_paid && self.transaction_id.as_deref() == Some(transaction_id)
    }
}

//--------------------------------------      OrderUpdate      ---------------------------------------------------------
/// Fields of an order that may change after it has been placed.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub transaction_id: Option<String>,
}

impl OrderUpdate {
    pub fn with_transaction_id<S: Into<String>>(mut self, transaction_id: S) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.transaction_id.is_none()
    }
}
