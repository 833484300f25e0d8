//! In-memory caching using moka
//!
//! Holds boat pricing snapshots so repeated quotes for the same boat skip the
//! database. Computed prices are never cached.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::pricing::asset::Asset;

/// Application cache holding boat snapshots
#[derive(Clone)]
pub struct AppCache {
    /// Boats (id -> Asset)
    pub assets: Cache<Uuid, Arc<Asset>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Boats: 1000 entries, 5 min TTL
            assets: Cache::builder()
                .max_capacity(1000)
                .time_to_live(Duration::from_secs(5 * 60))
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            assets_size: self.assets.entry_count(),
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.assets.invalidate_all();
        info!("All caches invalidated");
    }

    /// Invalidate a single boat after its prices changed
    pub async fn invalidate_asset(&self, boat_id: Uuid) {
        self.assets.invalidate(&boat_id).await;
        info!("Cache invalidated for boat: {}", boat_id);
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub assets_size: u64,
}
