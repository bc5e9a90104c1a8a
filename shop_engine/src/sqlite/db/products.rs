use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::db_types::{join_list, NewProduct, Product, ProductId};

pub async fn fetch_product(id: &ProductId, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let product: Product = sqlx::query_as(
        r#"
            INSERT INTO products (
                id,
                title,
                slug,
                description,
                price,
                stock,
                sizes,
                gender,
                tags,
                category_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *;
        "#,
    )
    .bind(product.id.as_str())
    .bind(product.title)
    .bind(product.slug)
    .bind(product.description)
    .bind(product.price)
    .bind(product.stock)
    .bind(join_list(&product.sizes))
    .bind(product.gender)
    .bind(join_list(&product.tags))
    .bind(product.category_id)
    .fetch_all(conn)
    .await?
    .into_iter()
    .next()
    .ok_or(sqlx::Error::RowNotFound)?;
    debug!("🗃️ Product [{}] '{}' added to the catalog with {} in stock", product.id, product.title, product.stock);
    Ok(product)
}

/// Reduces the stock of the product by `quantity` if, and only if, there is enough stock to do so. The check and the
/// update are a single statement, so concurrent callers can never drive stock below zero.
///
/// Returns the updated product, or `None` if the product does not exist or has fewer than `quantity` items in stock.
///
/// `RETURNING` statements are stepped to completion with `fetch_all`. A statement left mid-step keeps its implicit
/// transaction, and the write lock, open on the pooled connection.
pub async fn try_decrement_stock(
    id: &ProductId,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    let product: Option<Product> = sqlx::query_as(
        "UPDATE products SET stock = stock - $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND stock >= $1 \
         RETURNING *",
    )
    .bind(quantity)
    .bind(id.as_str())
    .fetch_all(conn)
    .await?
    .into_iter()
    .next();
    match &product {
        Some(p) => trace!("🗃️ Stock for [{id}] reduced by {quantity} to {}", p.stock),
        None => trace!("🗃️ Stock for [{id}] could not be reduced by {quantity}"),
    }
    Ok(product)
}
