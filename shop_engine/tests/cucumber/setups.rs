use cucumber::{gherkin::Step, given};
use shop_common::Money;
use shop_engine::{
    db_types::{Country, NewProduct},
    CatalogManagement,
};

use crate::cucumber::{shop_world::ShopSystem, ShopWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut ShopWorld) {
    let system = ShopSystem::new().await;
    for (id, name) in [("GB", "United Kingdom"), ("US", "United States")] {
        system.db.upsert_country(Country { id: id.into(), name: name.into() }).await.expect("Error adding country");
    }
    world.system = Some(system);
}

// | id | title | price | stock | sizes |
#[given("the following products")]
async fn products(world: &mut ShopWorld, step: &Step) {
    let table = step.table.as_ref().expect("Expected a product table");
    for row in table.rows.iter().skip(1) {
        let price = row[2].parse::<Money>().expect("Invalid price");
        let stock = row[3].parse::<i64>().expect("Invalid stock");
        let sizes = row[4].split(',').map(str::trim).collect::<Vec<_>>();
        let product = NewProduct::new(row[1].as_str(), price, stock).with_id(row[0].as_str()).with_sizes(&sizes);
        world.system().db.insert_product(product).await.expect("Error adding product");
    }
}
