use shop_common::{payments::Payer, Money, PaymentAmount, PaymentDetails, PaymentVerifierError};
use shop_engine::{
    db_types::{CartItem, Order, OrderId},
    events::EventProducers,
    helpers::generate_test_transaction_id,
    test_utils::{
        fixtures::{seed_lookups, seed_product, test_address},
        prepare_env::{prepare_test_env, random_db_path, tear_down},
        scripted_verifier::ScriptedVerifier,
    },
    ErrorKind,
    OrderManagement,
    OrderPlacementApi,
    PaymentReconciliationApi,
    ShopError,
    SqliteDatabase,
};

const TXID: &str = "8MC585209K746392H";
const TEST_TXID: &str = "EF68DCEA-CCD3-E05D-696D-EDDC7FE9BED3";

struct TestShop {
    placement: OrderPlacementApi<SqliteDatabase>,
    payments: PaymentReconciliationApi<SqliteDatabase, ScriptedVerifier>,
    verifier: ScriptedVerifier,
}

impl TestShop {
    async fn new() -> Self {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
        seed_lookups(&db).await;
        seed_product(&db, "P1", 100, 10, &["S", "M", "L"]).await;
        let verifier = ScriptedVerifier::new();
        let placement = OrderPlacementApi::new(db.clone(), EventProducers::default());
        let payments = PaymentReconciliationApi::new(db, verifier.clone(), EventProducers::default());
        Self { placement, payments, verifier }
    }

    /// Places an order with a total of 230.00
    async fn order(&self, user: &str) -> Order {
        let cart = vec![CartItem::new("P1", 2, "M")];
        self.placement.place_order(user, &cart, test_address()).await.expect("Error placing order")
    }

    async fn reload(&self, id: &OrderId) -> Order {
        self.payments.db().fetch_order_by_id(id).await.unwrap().expect("Order does not exist")
    }

    async fn finish(self) {
        tear_down(self.payments.db().clone()).await;
    }
}

#[tokio::test]
async fn completed_payment_marks_order_as_paid() {
    let shop = TestShop::new().await;
    let order = shop.order("alice").await;
    assert_eq!(order.total, Money::from_units(230));
    shop.payments.set_transaction_id(&order.id, TXID).await.expect("Error setting transaction id");
    shop.verifier.with_payment(TXID, "COMPLETED", "230.00");

    let paid = shop.payments.confirm_payment(TXID).await.expect("Error confirming payment");
    assert!(paid.is_paid);
    assert!(paid.paid_at.is_some());
    assert_eq!(paid.transaction_id.as_deref(), Some(TXID));
    assert_eq!(paid.id, order.id);
    assert_eq!(paid.total, order.total);
    assert_eq!(paid.items, order.items);
    shop.finish().await;
}

#[tokio::test]
async fn payments_that_are_not_completed_are_rejected() {
    let shop = TestShop::new().await;
    let order = shop.order("alice").await;
    shop.payments.set_transaction_id(&order.id, TXID).await.unwrap();
    shop.verifier.with_payment(TXID, "PENDING", "230.00");

    let err = shop.payments.confirm_payment(TXID).await.expect_err("Payment should not be confirmed");
    assert!(matches!(err, ShopError::PaymentNotCompleted { ref status, .. } if status == "PENDING"));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(!shop.reload(&order.id).await.is_paid);

    // Status matching is exact
    shop.verifier.with_payment(TXID, "completed", "230.00");
    let err = shop.payments.confirm_payment(TXID).await.expect_err("Payment should not be confirmed");
    assert!(matches!(err, ShopError::PaymentNotCompleted { .. }));
    shop.finish().await;
}

#[tokio::test]
async fn mismatched_amounts_are_rejected() {
    let shop = TestShop::new().await;
    let order = shop.order("alice").await;
    shop.payments.set_transaction_id(&order.id, TXID).await.unwrap();
    shop.verifier.with_payment(TXID, "COMPLETED", "200.00");

    let err = shop.payments.confirm_payment(TXID).await.expect_err("Payment should not be confirmed");
    match &err {
        ShopError::PaymentAmountMismatch { paid, expected } => {
            assert_eq!(paid.to_string(), "200.00");
            assert_eq!(*expected, Money::from_units(230));
        },
        e => panic!("Unexpected error: {e}"),
    }
    assert_eq!(err.kind(), ErrorKind::Validation);
    let order = shop.reload(&order.id).await;
    assert!(!order.is_paid);
    assert!(order.paid_at.is_none());
    shop.finish().await;
}

#[tokio::test]
async fn amounts_within_a_cent_are_accepted() {
    let shop = TestShop::new().await;
    for (i, (value, accepted)) in
        [("230.02", false), ("229.98", false), ("230.01", true), ("229.99", true), ("230", true)].iter().enumerate()
    {
        let order = shop.order("alice").await;
        let txid = format!("{TXID}-{i}");
        shop.payments.set_transaction_id(&order.id, &txid).await.unwrap();
        shop.verifier.with_payment(&txid, "COMPLETED", value);
        let result = shop.payments.confirm_payment(&txid).await;
        assert_eq!(result.is_ok(), *accepted, "Amount {value}: {result:?}");
    }
    shop.finish().await;
}

#[tokio::test]
async fn unparseable_amounts_are_rejected() {
    let shop = TestShop::new().await;
    let order = shop.order("alice").await;
    shop.payments.set_transaction_id(&order.id, TXID).await.unwrap();
    shop.verifier.with_payment(TXID, "COMPLETED", "two hundred");
    let err = shop.payments.confirm_payment(TXID).await.expect_err("Payment should not be confirmed");
    assert!(matches!(err, ShopError::InvalidPaymentAmount(_)));
    shop.finish().await;
}

#[tokio::test]
async fn sandbox_transactions_skip_the_amount_check() {
    let shop = TestShop::new().await;
    let order = shop.order("alice").await;
    shop.payments.set_transaction_id(&order.id, TEST_TXID).await.unwrap();
    shop.verifier.with_payment(TEST_TXID, "COMPLETED", "999999.00");

    let paid = shop.payments.confirm_payment(TEST_TXID).await.expect("Sandbox payment should be accepted");
    assert!(paid.is_paid);
    assert_eq!(paid.total, Money::from_units(230));

    // Lowercase ids match the pattern too
    let order = shop.order("alice").await;
    let txid = generate_test_transaction_id().to_lowercase();
    shop.payments.set_transaction_id(&order.id, &txid).await.unwrap();
    shop.verifier.with_payment(&txid, "COMPLETED", "0.01");
    assert!(shop.payments.confirm_payment(&txid).await.unwrap().is_paid);

    // The bypass does not cover the status check
    let order = shop.order("alice").await;
    let txid = generate_test_transaction_id();
    shop.payments.set_transaction_id(&order.id, &txid).await.unwrap();
    shop.verifier.with_payment(&txid, "PENDING", "230.00");
    assert!(shop.payments.confirm_payment(&txid).await.is_err());
    shop.finish().await;
}

#[tokio::test]
async fn sandbox_bypass_uses_the_id_reported_by_the_provider() {
    let shop = TestShop::new().await;
    let reported = |id: &str, value: &str| PaymentDetails {
        id: id.to_string(),
        status: "COMPLETED".into(),
        amount: PaymentAmount::new("USD", value),
        payer: Payer::default(),
    };

    // A sandbox-shaped id from the caller does not help if the provider reports a real capture id
    let order = shop.order("alice").await;
    shop.payments.set_transaction_id(&order.id, TEST_TXID).await.unwrap();
    shop.verifier.with_details(TEST_TXID, reported(TXID, "999999.00"));
    let err = shop.payments.confirm_payment(TEST_TXID).await.expect_err("Amount check should apply");
    assert!(matches!(err, ShopError::PaymentAmountMismatch { .. }));
    assert!(!shop.reload(&order.id).await.is_paid);

    // The provider reporting a sandbox id is what skips the check
    let order = shop.order("alice").await;
    shop.payments.set_transaction_id(&order.id, TXID).await.unwrap();
    shop.verifier.with_details(TXID, reported(&generate_test_transaction_id(), "999999.00"));
    let paid = shop.payments.confirm_payment(TXID).await.expect("Sandbox payment should be accepted");
    assert!(paid.is_paid);
    assert_eq!(paid.transaction_id.as_deref(), Some(TXID));
    shop.finish().await;
}

#[tokio::test]
async fn provider_errors_are_passed_through() {
    let shop = TestShop::new().await;
    let order = shop.order("alice").await;
    shop.payments.set_transaction_id(&order.id, TXID).await.unwrap();
    shop.verifier.with_error(TXID, PaymentVerifierError::RequestFailed("connection reset".into()));

    let err = shop.payments.confirm_payment(TXID).await.expect_err("Payment should not be confirmed");
    assert!(matches!(err, ShopError::PaymentVerifier(PaymentVerifierError::RequestFailed(_))));
    assert_eq!(err.kind(), ErrorKind::External);

    let err = shop.payments.confirm_payment("unknown-to-provider").await.expect_err("Payment should not be confirmed");
    assert!(matches!(err, ShopError::PaymentVerifier(PaymentVerifierError::TransactionNotFound(_))));
    assert!(!shop.reload(&order.id).await.is_paid);
    shop.finish().await;
}

#[tokio::test]
async fn verified_payments_must_be_linked_to_an_order() {
    let shop = TestShop::new().await;
    let _order = shop.order("alice").await;
    shop.verifier.with_payment(TXID, "COMPLETED", "230.00");
    let err = shop.payments.confirm_payment(TXID).await.expect_err("Payment should not be confirmed");
    assert!(matches!(err, ShopError::TransactionNotFound(ref t) if t == TXID));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    shop.finish().await;
}

#[tokio::test]
async fn confirming_twice_is_idempotent() {
    let shop = TestShop::new().await;
    let order = shop.order("alice").await;
    shop.payments.set_transaction_id(&order.id, TXID).await.unwrap();
    shop.verifier.with_payment(TXID, "COMPLETED", "230.00");

    let first = shop.payments.confirm_payment(TXID).await.expect("Error confirming payment");
    let second = shop.payments.confirm_payment(TXID).await.expect("Second confirmation should succeed");
    assert_eq!(first.paid_at, second.paid_at);
    assert_eq!(first, second);
    shop.finish().await;
}

#[tokio::test]
async fn set_transaction_id_rules() {
    let shop = TestShop::new().await;
    let first = shop.order("alice").await;
    let second = shop.order("bob").await;

    let err = shop.payments.set_transaction_id(&OrderId::from("nope"), TXID).await.expect_err("Unknown order");
    assert!(matches!(err, ShopError::OrderNotFound(_)));

    let linked = shop.payments.set_transaction_id(&first.id, TXID).await.expect("Error setting transaction id");
    assert_eq!(linked.transaction_id.as_deref(), Some(TXID));
    assert!(!linked.is_paid);
    // Same id again is a no-op
    let again = shop.payments.set_transaction_id(&first.id, TXID).await.expect("Setting the same id should succeed");
    assert_eq!(again, linked);
    // A transaction id belongs to one order only
    let err = shop.payments.set_transaction_id(&second.id, TXID).await.expect_err("Duplicate transaction id");
    assert!(matches!(err, ShopError::TransactionIdInUse(_)));
    assert!(shop.reload(&second.id).await.transaction_id.is_none());
    // An unpaid order can be relinked
    let relinked = shop.payments.set_transaction_id(&first.id, "OTHER-1").await.unwrap();
    assert_eq!(relinked.transaction_id.as_deref(), Some("OTHER-1"));

    // A paid order's transaction id is fixed
    shop.verifier.with_payment("OTHER-1", "COMPLETED", "230.00");
    shop.payments.confirm_payment("OTHER-1").await.expect("Error confirming payment");
    let err = shop.payments.set_transaction_id(&first.id, "OTHER-2").await.expect_err("Paid orders are fixed");
    assert!(matches!(err, ShopError::OrderAlreadyPaid(_)));
    shop.finish().await;
}

#[tokio::test]
async fn confirm_payment_for_order() {
    let shop = TestShop::new().await;
    let first = shop.order("alice").await;
    let second = shop.order("bob").await;
    shop.verifier.with_payment(TXID, "COMPLETED", "230.00");

    // Unknown orders fail before the provider is called
    let err = shop.payments.confirm_payment_for_order(&OrderId::from("nope"), TXID).await.expect_err("Unknown order");
    assert!(matches!(err, ShopError::OrderNotFound(_)));
    assert_eq!(shop.verifier.call_count(), 0);

    // The transaction id does not need to be linked beforehand
    let paid = shop.payments.confirm_payment_for_order(&first.id, TXID).await.expect("Error confirming payment");
    assert!(paid.is_paid);
    assert_eq!(paid.transaction_id.as_deref(), Some(TXID));

    // ...but it cannot be reused for another order
    let err = shop.payments.confirm_payment_for_order(&second.id, TXID).await.expect_err("Transaction reused");
    assert!(matches!(err, ShopError::TransactionIdInUse(_)));
    assert!(!shop.reload(&second.id).await.is_paid);

    // A paid order cannot be paid again with a different transaction
    shop.verifier.with_payment("ANOTHER-TX", "COMPLETED", "230.00");
    let err =
        shop.payments.confirm_payment_for_order(&first.id, "ANOTHER-TX").await.expect_err("Order is already paid");
    assert!(matches!(err, ShopError::OrderAlreadyPaid(_)));
    let reloaded = shop.reload(&first.id).await;
    assert_eq!(reloaded.transaction_id.as_deref(), Some(TXID));
    assert_eq!(reloaded.paid_at, paid.paid_at);
    shop.finish().await;
}
