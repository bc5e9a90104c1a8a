use shop_common::Money;

use crate::{
    db_types::{Category, Country, NewProduct, OrderAddress, Product},
    CatalogManagement,
    SqliteDatabase,
};

pub fn test_address() -> OrderAddress {
    OrderAddress {
        first_name: "Alice".into(),
        last_name: "Liddell".into(),
        address: "1 Rabbit Hole Lane".into(),
        address2: Some("Apt 2".into()),
        postal_code: "OX1 1DP".into(),
        city: "Oxford".into(),
        phone: "+44 1865 000000".into(),
        country_id: "GB".into(),
    }
}

/// Inserts a handful of countries and categories.
pub async fn seed_lookups(db: &SqliteDatabase) {
    for (id, name) in [("GB", "United Kingdom"), ("US", "United States"), ("ZA", "South Africa")] {
        db.upsert_country(Country { id: id.into(), name: name.into() }).await.expect("Error seeding country");
    }
    for (id, name) in [("shirts", "Shirts"), ("hoodies", "Hoodies")] {
        db.upsert_category(Category { id: id.into(), name: name.into() }).await.expect("Error seeding category");
    }
}

/// Inserts a product with the given id, price (in whole currency units), stock and sizes.
pub async fn seed_product(db: &SqliteDatabase, id: &str, units: i64, stock: i64, sizes: &[&str]) -> Product {
    let product = NewProduct::new(format!("Product {id}"), Money::from_units(units), stock).with_id(id).with_sizes(sizes);
    db.insert_product(product).await.expect("Error seeding product")
}
