use std::collections::HashMap;

use cucumber::World;
use log::*;
use shop_engine::{
    db_types::{Order, OrderId},
    events::EventProducers,
    test_utils::{
        prepare_env::{create_database, random_db_path, run_migrations},
        scripted_verifier::ScriptedVerifier,
    },
    OrderPlacementApi,
    PaymentReconciliationApi,
    ShopError,
    SqliteDatabase,
};
use tokio::time::sleep;

#[derive(Default, Debug, World)]
pub struct ShopWorld {
    pub system: Option<ShopSystem>,
    /// Orders placed during the scenario, by the label the scenario gave them
    pub orders: HashMap<String, OrderId>,
    pub last_order: Option<Order>,
    pub last_error: Option<ShopError>,
}

#[derive(Debug)]
pub struct ShopSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub placement: OrderPlacementApi<SqliteDatabase>,
    pub payments: PaymentReconciliationApi<SqliteDatabase, ScriptedVerifier>,
    pub verifier: ScriptedVerifier,
}

impl ShopWorld {
    pub fn system(&self) -> &ShopSystem {
        self.system.as_ref().expect("Shop system not initialised")
    }

    pub fn order_id(&self, label: &str) -> OrderId {
        self.orders.get(label).cloned().unwrap_or_else(|| panic!("No order labelled {label}"))
    }

    /// Stores the outcome of an engine call so that later steps can make assertions about it.
    pub fn record(&mut self, result: Result<Order, ShopError>) {
        match result {
            Ok(order) => {
                self.last_order = Some(order);
                self.last_error = None;
            },
            Err(e) => {
                debug!("🚀️ Engine call failed: {e}");
                self.last_order = None;
                self.last_error = Some(e);
            },
        }
    }

    pub fn last_error(&self) -> &ShopError {
        self.last_error.as_ref().expect("The last engine call did not fail")
    }
}

impl ShopSystem {
    pub async fn new() -> Self {
        let url = prepare_test_env().await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        sleep(std::time::Duration::from_millis(50)).await;
        let verifier = ScriptedVerifier::new();
        let placement = OrderPlacementApi::new(db.clone(), EventProducers::default());
        let payments = PaymentReconciliationApi::new(db.clone(), verifier.clone(), EventProducers::default());
        Self { db_path: url, db, placement, payments, verifier }
    }
}

pub async fn prepare_test_env() -> String {
    let path = random_db_path();
    create_database(&path).await;
    run_migrations(&path).await;
    path
}
