//! In-memory caching using moka
//!
//! Caches the student candidate list and the gateway settings singleton.
//! Both tolerate staleness: the candidate dropdown refreshes within a minute
//! and settings changes are rare.

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::db;
use crate::models::{GatewaySettings, StudentOption};

/// Cache key for the student candidate list
pub const STUDENTS_KEY: &str = "students";
/// Cache key for the gateway settings singleton
pub const SETTINGS_KEY: &str = "settings";

/// Application cache holding lookup candidates and gateway settings
#[derive(Clone)]
pub struct AppCache {
    /// Student candidate set (singleton entry)
    pub students: Cache<String, Arc<Vec<StudentOption>>>,
    /// Enabled gateway settings (singleton entry)
    pub settings: Cache<String, Arc<GatewaySettings>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Student candidates: 1 entry, 1 min TTL
            students: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(60))
                .build(),

            // Gateway settings: 1 entry, 5 min TTL
            settings: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(5 * 60))
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            students_cached: self.students.entry_count() > 0,
            settings_cached: self.settings.entry_count() > 0,
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.students.invalidate_all();
        self.settings.invalidate_all();
        info!("All caches invalidated");
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
    pub students_cached: bool,
    pub settings_cached: bool,
}

/// Start background cache warmer
///
/// Warms the cache on startup and refreshes every 5 minutes.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool) {
    warm_cache(&cache, &db).await;

    let mut interval = interval(Duration::from_secs(5 * 60));
    loop {
        interval.tick().await;
        warm_cache(&cache, &db).await;
    }
}

/// Warm the cache with commonly accessed data
async fn warm_cache(cache: &AppCache, db: &PgPool) {
    match db::list_eligible_students(db).await {
        Ok(students) => {
            cache
                .students
                .insert(STUDENTS_KEY.to_string(), Arc::new(students))
                .await;
        }
        Err(e) => warn!("Failed to warm student cache: {}", e),
    }

    match db::get_gateway_settings(db).await {
        Ok(Some(settings)) => {
            cache
                .settings
                .insert(SETTINGS_KEY.to_string(), Arc::new(settings))
                .await;
        }
        Ok(None) => {}
        Err(e) => warn!("Failed to warm settings cache: {}", e),
    }
}
