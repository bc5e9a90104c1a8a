use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "Operator tools for the shop engine")]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the database if it does not exist and bring its schema up to date
    Migrate,
    #[command(subcommand)]
    /// Read the product catalog
    Catalog(CatalogCommand),
    #[command(subcommand)]
    /// Place or inspect orders
    Order(OrderCommand),
    #[command(subcommand)]
    /// Link, confirm or create PayPal payments
    Payment(PaymentCommand),
    #[command(subcommand)]
    /// Sandbox transaction ids for testing
    Txid(TxidCommand),
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// Fetch the product with the given ID
    Product {
        #[arg(required = true, index = 1)]
        id: String,
    },
    /// List the countries that orders can be shipped to
    Countries,
    /// List the product categories
    Categories,
}

#[derive(Debug, Subcommand)]
pub enum OrderCommand {
    /// Place an order from a cart file. The file holds a JSON object with `items` and `address` fields.
    Place {
        /// The customer placing the order
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        cart: PathBuf,
    },
    /// Fetch the order with the given ID
    Get {
        #[arg(required = true, index = 1)]
        id: String,
    },
    /// List a customer's orders, newest first
    List {
        #[arg(short, long)]
        user: String,
    },
    /// List every order in the shop, one page at a time
    All {
        #[arg(short, long)]
        page: Option<i64>,
        #[arg(short, long)]
        limit: Option<i64>,
    },
}

#[derive(Debug, Subcommand)]
pub enum PaymentCommand {
    /// Ask PayPal about a transaction and mark the linked order as paid if it checks out
    Confirm {
        #[arg(required = true, index = 1)]
        txid: String,
        /// Confirm against this order instead of the order the transaction is linked to
        #[arg(short, long)]
        order: Option<String>,
    },
    /// Link a PayPal transaction to an order without confirming it
    SetTxid {
        #[arg(required = true, index = 1)]
        order: String,
        #[arg(required = true, index = 2)]
        txid: String,
    },
    /// Create a PayPal checkout order and print its approval link
    Create {
        /// The amount to charge, e.g. 230.00
        #[arg(required = true, index = 1)]
        amount: String,
        #[arg(short, long, default_value = "USD")]
        currency: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum TxidCommand {
    /// Generate UUID-shaped transaction ids that the engine treats as sandbox payments
    Generate {
        #[arg(short, long, default_value = "1")]
        count: usize,
    },
}
