use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderAddress, OrderId, OrderItem, OrderUpdate},
    traits::ShopError,
};

/// Inserts the order header, its items and the shipping address using the given connection. This is not atomic. You
/// should embed this call inside a transaction and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: &NewOrder, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO orders (
                id,
                user_id,
                sub_total,
                tax,
                total,
                items_in_order
            ) VALUES ($1, $2, $3, $4, $5, $6);
        "#,
    )
    .bind(order.id.as_str())
    .bind(order.user_id.as_str())
    .bind(order.sub_total)
    .bind(order.tax)
    .bind(order.total)
    .bind(order.items_in_order)
    .execute(&mut *conn)
    .await?;
    for (position, item) in order.items.iter().enumerate() {
        #[allow(clippy::cast_possible_wrap)]
        let position = position as i64;
        sqlx::query(
            "INSERT INTO order_items (id, order_id, product_id, position, quantity, price, size) VALUES ($1, $2, $3, \
             $4, $5, $6, $7)",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(order.id.as_str())
        .bind(item.product_id.as_str())
        .bind(position)
        .bind(item.quantity)
        .bind(item.price)
        .bind(item.size.as_str())
        .execute(&mut *conn)
        .await?;
    }
    let address = &order.address;
    sqlx::query(
        r#"
            INSERT INTO order_addresses (
                order_id,
                first_name,
                last_name,
                address,
                address2,
                postal_code,
                city,
                phone,
                country_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9);
        "#,
    )
    .bind(order.id.as_str())
    .bind(address.first_name.as_str())
    .bind(address.last_name.as_str())
    .bind(address.address.as_str())
    .bind(address.address2.as_deref())
    .bind(address.postal_code.as_str())
    .bind(address.city.as_str())
    .bind(address.phone.as_str())
    .bind(address.country_id.as_str())
    .execute(conn)
    .await?;
    debug!("📝️ Order [{}] inserted with {} line items", order.id, order.items.len());
    Ok(())
}

async fn fetch_items(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY position ASC")
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await?;
    Ok(items)
}

async fn fetch_address(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<OrderAddress>, sqlx::Error> {
    let address = sqlx::query_as("SELECT * FROM order_addresses WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(address)
}

/// Attaches the line items and shipping address to a bare order row.
async fn with_details(mut order: Order, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    order.items = fetch_items(&order.id, &mut *conn).await?;
    order.address = fetch_address(&order.id, conn).await?;
    Ok(order)
}

async fn with_details_opt(order: Option<Order>, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    match order {
        Some(order) => Ok(Some(with_details(order, conn).await?)),
        None => Ok(None),
    }
}

async fn with_details_all(orders: Vec<Order>, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut result = Vec::with_capacity(orders.len());
    for order in orders {
        result.push(with_details(order, &mut *conn).await?);
    }
    Ok(result)
}

pub async fn fetch_order_by_id(id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id.as_str()).fetch_optional(&mut *conn).await?;
    with_details_opt(order, conn).await
}

pub async fn fetch_order_by_transaction_id(
    transaction_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE transaction_id = $1")
        .bind(transaction_id)
        .fetch_optional(&mut *conn)
        .await?;
    with_details_opt(order, conn).await
}

/// Fetches all the orders for the given user, newest first.
pub async fn fetch_orders_for_user(user_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, rowid DESC")
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;
    with_details_all(orders, conn).await
}

/// Fetches `limit` orders, skipping the first `offset`, newest first.
pub async fn fetch_orders_page(offset: i64, limit: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders ORDER BY created_at DESC, rowid DESC LIMIT $1 OFFSET $2")
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?;
    with_details_all(orders, conn).await
}

pub async fn count_orders(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders").fetch_one(conn).await?;
    Ok(count.0)
}

fn transaction_conflict(e: sqlx::Error, transaction_id: &str) -> ShopError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            debug!("📝️ Transaction id {transaction_id} is already in use by another order");
            ShopError::TransactionIdInUse(transaction_id.to_string())
        },
        _ => ShopError::from(e),
    }
}

pub(crate) async fn update_order(
    id: &OrderId,
    update: OrderUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, ShopError> {
    if update.is_empty() {
        debug!("📝️ No fields to update for order {id}. Update request skipped.");
        return fetch_order_by_id(id, conn).await.map_err(ShopError::from);
    }
    let mut builder = QueryBuilder::new("UPDATE orders SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(transaction_id) = &update.transaction_id {
        set_clause.push("transaction_id = ");
        set_clause.push_bind_unseparated(transaction_id.clone());
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id.as_str());
    builder.push(" RETURNING *");
    trace!("📝️ Executing query: {}", builder.sql());
    let txid = update.transaction_id.as_deref().unwrap_or_default();
    let res = builder
        .build()
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| transaction_conflict(e, txid))?
        .into_iter()
        .next()
        .map(|row: SqliteRow| Order::from_row(&row))
        .transpose()?;
    trace!("📝️ Result of update_order: {res:?}");
    Ok(with_details_opt(res, conn).await?)
}

/// Sets the paid flag, payment timestamp and transaction id in one conditional update. Orders that are already paid
/// are left untouched and `None` is returned.
pub(crate) async fn mark_order_paid(
    id: &OrderId,
    transaction_id: &str,
    paid_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, ShopError> {
    let order: Option<Order> = sqlx::query_as(
        "UPDATE orders SET is_paid = TRUE, paid_at = $1, transaction_id = $2, updated_at = CURRENT_TIMESTAMP WHERE id \
         = $3 AND is_paid = FALSE RETURNING *",
    )
    .bind(paid_at)
    .bind(transaction_id)
    .bind(id.as_str())
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| transaction_conflict(e, transaction_id))?
    .into_iter()
    .next();
    match &order {
        Some(_) => debug!("📝️ Order [{id}] marked as paid with transaction {transaction_id}"),
        None => debug!("📝️ Order [{id}] was not marked as paid. It is either missing or already paid"),
    }
    Ok(with_details_opt(order, conn).await?)
}
