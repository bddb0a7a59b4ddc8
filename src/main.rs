//! Mini Cache - In-memory caching primitives
//!
//! Demo binary that builds both caches from environment configuration and
//! runs a short workload against them.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_cache::{Config, LruCache, TtlCacheMap};

/// Main entry point for the Mini Cache demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Exercise the TTL map
/// 4. Exercise the LRU cache
fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mini Cache demo");

    let config = Config::from_env();
    config.validate().context("invalid cache configuration")?;
    info!(
        "Configuration loaded: {}",
        serde_json::to_string(&config).context("failed to serialize configuration")?
    );

    run_ttl_map(&config)?;
    run_lru_cache(&config)?;

    info!("Demo complete");
    Ok(())
}

/// Fills the TTL map past a few resize thresholds and reads it back.
fn run_ttl_map(config: &Config) -> Result<()> {
    let mut map = TtlCacheMap::from_config(config).context("failed to build TTL map")?;

    for i in 0..64u32 {
        map.put(format!("key_{}", i), i);
    }
    let previous = map.put("key_0".to_string(), 1000);
    info!(
        "TTL map: {} entries in {} buckets, key_0 overwritten (was {:?})",
        map.len(),
        map.bucket_count(),
        previous
    );

    let removed = map.remove("key_1");
    info!(
        "TTL map: removed key_1 = {:?}, contains value 1000: {}",
        removed,
        map.contains_value(&1000)
    );
    Ok(())
}

/// Overfills the LRU cache and reports what survived.
fn run_lru_cache(config: &Config) -> Result<()> {
    let mut cache = LruCache::from_config(config).context("failed to build LRU cache")?;
    let capacity = cache.capacity();

    for i in 0..=capacity {
        cache.put(i, i * i);
    }
    info!(
        "LRU cache: {} of {} slots used, key 0 evicted: {}",
        cache.len(),
        capacity,
        !cache.contains_key(&0)
    );

    if let Some((key, _)) = cache.peek_lru() {
        info!("LRU cache: next eviction candidate is key {}", key);
    }
    Ok(())
}
