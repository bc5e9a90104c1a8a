pub mod setups;
pub mod shop_world;
pub mod steps;

pub use shop_world::ShopWorld;
