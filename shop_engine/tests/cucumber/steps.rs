use std::time::Duration;

use cucumber::{then, when};
use shop_common::Money;
use shop_engine::{
    db_types::{CartItem, OrderAddress, ProductId},
    CatalogManagement,
    OrderManagement,
    ShopError,
};

use crate::cucumber::ShopWorld;

fn address(country: &str) -> OrderAddress {
    OrderAddress {
        first_name: "Bob".into(),
        last_name: "Builder".into(),
        address: "12 High Street".into(),
        address2: None,
        postal_code: "90210".into(),
        city: "Springfield".into(),
        phone: "555-0100".into(),
        country_id: country.into(),
    }
}

fn parse_cart(cart: &str) -> Vec<CartItem> {
    // e.g. "2 x P1 (M), 1 x P2 (L)"
    cart.split(',')
        .map(|line| {
            let (quantity, rest) = line.trim().split_once(" x ").expect("Cart lines look like '2 x P1 (M)'");
            let (product, size) = rest.split_once(" (").expect("Cart lines look like '2 x P1 (M)'");
            let quantity = quantity.trim().parse::<i64>().expect("Invalid quantity");
            CartItem::new(product.trim(), quantity, size.trim_end_matches(')'))
        })
        .collect()
}

#[when(expr = "{word} places order {word} for {string}")]
async fn place_order(world: &mut ShopWorld, user: String, label: String, cart: String) {
    submit_order(world, user, label, cart, "GB").await;
}

#[when(expr = "{word} places order {word} for {string} shipped to {word}")]
async fn place_order_to(world: &mut ShopWorld, user: String, label: String, cart: String, country: String) {
    submit_order(world, user, label, cart, &country).await;
}

async fn submit_order(world: &mut ShopWorld, user: String, label: String, cart: String, country: &str) {
    let cart = parse_cart(&cart);
    let result = world.system().placement.place_order(&user, &cart, address(country)).await;
    if let Ok(order) = &result {
        world.orders.insert(label, order.id.clone());
    }
    world.record(result);
}

#[when(expr = "the provider reports transaction [{word}] as {word} for {word} USD")]
async fn provider_reports(world: &mut ShopWorld, txid: String, status: String, amount: String) {
    world.system().verifier.with_payment(&txid, &status, &amount);
}

#[when(expr = "order {word} is linked to transaction [{word}]")]
async fn link_transaction(world: &mut ShopWorld, label: String, txid: String) {
    let id = world.order_id(&label);
    let result = world.system().payments.set_transaction_id(&id, &txid).await;
    world.record(result);
}

#[when(expr = "payment [{word}] is confirmed")]
async fn confirm_payment(world: &mut ShopWorld, txid: String) {
    let result = world.system().payments.confirm_payment(&txid).await;
    world.record(result);
}

#[when(expr = "payment [{word}] is confirmed for order {word}")]
async fn confirm_payment_for_order(world: &mut ShopWorld, txid: String, label: String) {
    let id = world.order_id(&label);
    let result = world.system().payments.confirm_payment_for_order(&id, &txid).await;
    world.record(result);
}

#[when(expr = "I pause for {int}ms")]
async fn pause(_world: &mut ShopWorld, ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[then(expr = "the order total is {word}, with {word} tax")]
async fn order_totals(world: &mut ShopWorld, total: String, tax: String) {
    let order = world.last_order.as_ref().expect("No order was returned");
    assert_eq!(order.total, total.parse::<Money>().unwrap());
    assert_eq!(order.tax, tax.parse::<Money>().unwrap());
    assert_eq!(order.sub_total + order.tax, order.total);
}

#[then(expr = "product {word} has {int} units in stock")]
async fn stock_level(world: &mut ShopWorld, product: String, stock: i64) {
    let product = world
        .system()
        .db
        .fetch_product(&ProductId::from(product))
        .await
        .expect("Error fetching product")
        .expect("Product does not exist");
    assert_eq!(product.stock, stock);
}

#[then(expr = "order {word} is paid with transaction [{word}]")]
async fn order_is_paid(world: &mut ShopWorld, label: String, txid: String) {
    let id = world.order_id(&label);
    let order = world.system().db.fetch_order_by_id(&id).await.unwrap().expect("Order does not exist");
    assert!(order.is_paid, "Order {label} is not paid");
    assert!(order.paid_at.is_some());
    assert_eq!(order.transaction_id.as_deref(), Some(txid.as_str()));
}

#[then(expr = "order {word} is not paid")]
async fn order_is_not_paid(world: &mut ShopWorld, label: String) {
    let id = world.order_id(&label);
    let order = world.system().db.fetch_order_by_id(&id).await.unwrap().expect("Order does not exist");
    assert!(!order.is_paid, "Order {label} is paid");
    assert!(order.paid_at.is_none());
}

#[then(expr = "there are {int} orders")]
async fn order_count(world: &mut ShopWorld, count: i64) {
    let (_, total) = world.system().db.fetch_orders_page(0, 1).await.expect("Error counting orders");
    assert_eq!(total, count);
}

#[then(expr = "the call succeeds")]
async fn call_succeeds(world: &mut ShopWorld) {
    if let Some(e) = &world.last_error {
        panic!("Expected success, but got: {e}");
    }
}

#[then(expr = "the call fails with {string}")]
async fn call_fails(world: &mut ShopWorld, message: String) {
    let err = world.last_error().to_string();
    assert!(err.contains(&message), "Expected error containing '{message}', but got: {err}");
}

#[then(expr = "the call fails because the amount does not match")]
async fn amount_mismatch(world: &mut ShopWorld) {
    assert!(matches!(world.last_error(), ShopError::PaymentAmountMismatch { .. }));
}

#[then(expr = "the call fails because the payment is not complete")]
async fn not_completed(world: &mut ShopWorld) {
    assert!(matches!(world.last_error(), ShopError::PaymentNotCompleted { .. }));
}
