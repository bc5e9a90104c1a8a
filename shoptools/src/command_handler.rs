use anyhow::{Context, Result};
use log::*;
use paypal_tools::{PaypalApi, PaypalConfig};
use serde::Serialize;
use shop_common::{Money, DEFAULT_CURRENCY_CODE};
use shop_engine::{
    cache::InMemoryCache,
    config::EngineConfig,
    db_types::{OrderId, ProductId},
    events::EventProducers,
    helpers::generate_test_transaction_id,
    Caller,
    CatalogApi,
    OrderPlacementApi,
    OrdersApi,
    PaymentReconciliationApi,
    SqliteDatabase,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::{
    cart::CartFile,
    command_def::{CatalogCommand, Command, OrderCommand, PaymentCommand, TxidCommand},
};

/// The identity the operator tools act under. Operators can see every order.
const OPERATOR: &str = "shoptools";

pub async fn handle_command(command: Command) -> Result<()> {
    match command {
        Command::Migrate => migrate().await,
        Command::Catalog(cmd) => handle_catalog_command(cmd).await,
        Command::Order(cmd) => handle_order_command(cmd).await,
        Command::Payment(cmd) => handle_payment_command(cmd).await,
        Command::Txid(TxidCommand::Generate { count }) => {
            for _ in 0..count {
                println!("{}", generate_test_transaction_id());
            }
            Ok(())
        },
    }
}

async fn connect() -> Result<SqliteDatabase> {
    let config = EngineConfig::from_env_or_default();
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .with_context(|| format!("Could not connect to {}", config.database_url))?;
    Ok(db)
}

fn new_paypal_api() -> Result<PaypalApi> {
    let config = PaypalConfig::new_from_env_or_default();
    let api = PaypalApi::new(config).context("Could not create the PayPal client")?;
    Ok(api)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Could not represent the result as JSON")?;
    println!("{json}");
    Ok(())
}

async fn migrate() -> Result<()> {
    let config = EngineConfig::from_env_or_default();
    let url = config.database_url.as_str();
    if !Sqlite::database_exists(url).await.unwrap_or(false) {
        info!("🗃️ Creating database {url}");
        Sqlite::create_database(url).await.with_context(|| format!("Could not create {url}"))?;
    }
    let db = connect().await?;
    db.migrate().await?;
    println!("Database {url} is up to date");
    Ok(())
}

async fn handle_catalog_command(command: CatalogCommand) -> Result<()> {
    let config = EngineConfig::from_env_or_default();
    let catalog = CatalogApi::new(connect().await?, InMemoryCache::new(config.catalog_cache_ttl));
    match command {
        CatalogCommand::Product { id } => print_json(&catalog.product(&ProductId::from(id)).await?),
        CatalogCommand::Countries => print_json(&catalog.countries().await?),
        CatalogCommand::Categories => print_json(&catalog.categories().await?),
    }
}

async fn handle_order_command(command: OrderCommand) -> Result<()> {
    let db = connect().await?;
    match command {
        OrderCommand::Place { user, cart } => {
            let cart = CartFile::load(&cart)?;
            let api = OrderPlacementApi::new(db, EventProducers::default());
            let order = api.place_order(&user, &cart.items, cart.address).await?;
            print_json(&order)
        },
        OrderCommand::Get { id } => {
            let api = OrdersApi::new(db);
            let order = api.order_by_id(&OrderId::from(id)).await?;
            print_json(&order)
        },
        OrderCommand::List { user } => {
            let api = OrdersApi::new(db);
            let orders = api.orders_for_user(&user).await?;
            print_json(&orders)
        },
        OrderCommand::All { page, limit } => {
            let api = OrdersApi::new(db);
            let page = api.orders_page(&Caller::admin(OPERATOR), page, limit).await?;
            print_json(&page)
        },
    }
}

async fn handle_payment_command(command: PaymentCommand) -> Result<()> {
    match command {
        PaymentCommand::Confirm { txid, order } => {
            let api = PaymentReconciliationApi::new(connect().await?, new_paypal_api()?, EventProducers::default());
            let order = match order {
                Some(id) => api.confirm_payment_for_order(&OrderId::from(id), &txid).await?,
                None => api.confirm_payment(&txid).await?,
            };
            print_json(&order)
        },
        PaymentCommand::SetTxid { order, txid } => {
            let api = PaymentReconciliationApi::new(connect().await?, new_paypal_api()?, EventProducers::default());
            let order = api.set_transaction_id(&OrderId::from(order), &txid).await?;
            print_json(&order)
        },
        PaymentCommand::Create { amount, currency } => {
            let amount = amount.parse::<Money>().with_context(|| format!("{amount} is not a valid amount"))?;
            if currency != DEFAULT_CURRENCY_CODE {
                warn!("💳️ Creating a payment in {currency}. Orders are priced in {DEFAULT_CURRENCY_CODE}");
            }
            let payment = new_paypal_api()?.create_payment(amount, &currency).await?;
            print_json(&payment)
        },
    }
}
