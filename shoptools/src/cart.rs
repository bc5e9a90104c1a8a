use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use shop_engine::db_types::{CartItem, OrderAddress};

/// The contents of a cart file passed to `order place`.
#[derive(Debug, Deserialize)]
pub struct CartFile {
    pub items: Vec<CartItem>,
    pub address: OrderAddress,
}

impl CartFile {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))?;
        let cart = serde_json::from_str(&data).with_context(|| format!("{} is not a valid cart", path.display()))?;
        Ok(cart)
    }
}
