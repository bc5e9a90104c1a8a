use std::{env, time::Duration};

use log::*;

use crate::{cache::DEFAULT_CACHE_TTL, sqlite::db::db_url};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Engine settings, read from the environment.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// How long catalog lookups stay cached
    pub catalog_cache_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: String::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            catalog_cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl EngineConfig {
    pub fn from_env_or_default() -> Self {
        let database_url = db_url();
        let max_connections = env::var("SHOP_DB_MAX_CONNECTIONS")
            .map(|s| {
                s.parse::<u32>().ok().filter(|n| *n > 0).unwrap_or_else(|| {
                    error!(
                        "🪛️ {s} is not a valid value for SHOP_DB_MAX_CONNECTIONS. Using the default, \
                         {DEFAULT_MAX_CONNECTIONS}, instead."
                    );
                    DEFAULT_MAX_CONNECTIONS
                })
            })
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let catalog_cache_ttl = env::var("SHOP_CATALOG_CACHE_TTL")
            .map(|s| {
                s.parse::<u64>().map(Duration::from_secs).unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid number of seconds for SHOP_CATALOG_CACHE_TTL. {e} Using the default, \
                         {}s, instead.",
                        DEFAULT_CACHE_TTL.as_secs()
                    );
                    DEFAULT_CACHE_TTL
                })
            })
            .unwrap_or(DEFAULT_CACHE_TTL);
        Self { database_url, max_connections, catalog_cache_ttl }
    }
}
