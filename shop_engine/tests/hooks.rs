use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
        Mutex,
    },
    time::Duration,
};

use futures_util::FutureExt;
use shop_engine::{
    db_types::{CartItem, OrderId},
    events::{EventHandlers, EventHooks},
    test_utils::{
        fixtures::{seed_lookups, seed_product, test_address},
        prepare_env::{prepare_test_env, random_db_path, tear_down},
        scripted_verifier::ScriptedVerifier,
    },
    OrderPlacementApi,
    PaymentReconciliationApi,
    SqliteDatabase,
};

#[tokio::test]
async fn placing_and_paying_orders_publish_events() {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    seed_lookups(&db).await;
    seed_product(&db, "P1", 100, 10, &["M"]).await;

    let placed = Arc::new(Mutex::new(Vec::<OrderId>::new()));
    let paid = Arc::new(AtomicUsize::new(0));
    let mut hooks = EventHooks::default();
    let placed_log = Arc::clone(&placed);
    hooks.on_order_placed(move |ev| {
        placed_log.lock().unwrap().push(ev.order.id.clone());
        async {}.boxed()
    });
    let paid_count = Arc::clone(&paid);
    hooks.on_order_paid(move |ev| {
        assert!(ev.order.is_paid);
        paid_count.fetch_add(1, Ordering::SeqCst);
        async {}.boxed()
    });
    let handlers = EventHandlers::new(10, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let verifier = ScriptedVerifier::new();
    let placement = OrderPlacementApi::new(db.clone(), producers.clone());
    let payments = PaymentReconciliationApi::new(db.clone(), verifier.clone(), producers);

    let cart = vec![CartItem::new("P1", 1, "M")];
    let first = placement.place_order("alice", &cart, test_address()).await.unwrap();
    let second = placement.place_order("bob", &cart, test_address()).await.unwrap();
    // Failed placements publish nothing
    let too_many = vec![CartItem::new("P1", 100, "M")];
    assert!(placement.place_order("bob", &too_many, test_address()).await.is_err());

    payments.set_transaction_id(&first.id, "TX-1").await.unwrap();
    verifier.with_payment("TX-1", "COMPLETED", "115.00");
    payments.confirm_payment("TX-1").await.expect("Error confirming payment");
    // A repeat confirmation does not publish a second event
    payments.confirm_payment("TX-1").await.expect("Error confirming payment");
    // Neither does a rejected one
    payments.set_transaction_id(&second.id, "TX-2").await.unwrap();
    verifier.with_payment("TX-2", "COMPLETED", "1.00");
    assert!(payments.confirm_payment("TX-2").await.is_err());

    drop(placement);
    drop(payments);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let placed = placed.lock().unwrap().clone();
    assert_eq!(placed.len(), 2);
    assert!(placed.contains(&first.id));
    assert!(placed.contains(&second.id));
    assert_eq!(paid.load(Ordering::SeqCst), 1);
    tear_down(db).await;
}
