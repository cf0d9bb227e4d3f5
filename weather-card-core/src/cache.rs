//! TTL-bounded cache of the last weather record per city.
//!
//! Fail-open: anything unexpected (missing key, bad JSON, storage error, old
//! entry) reads as a miss, and failed writes are dropped.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{model::WeatherRecord, storage::Storage};

pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

const KEY_PREFIX: &str = "weather_cache_";

/// Stored form of a cached record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Write time, epoch milliseconds.
    pub ts: i64,
    pub data: WeatherRecord,
}

#[derive(Debug)]
pub struct WeatherCache<S> {
    storage: S,
    ttl: Duration,
}

impl<S: Storage> WeatherCache<S> {
    pub fn new(storage: S) -> Self {
        Self::with_ttl(storage, DEFAULT_TTL)
    }

    pub fn with_ttl(storage: S, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Storage key for a city; lookups are case-insensitive.
    pub fn key_for(city: &str) -> String {
        format!("{KEY_PREFIX}{}", city.to_lowercase())
    }

    pub fn set(&self, city: &str, record: &WeatherRecord) {
        let key = Self::key_for(city);
        let entry = CacheEntry { ts: Utc::now().timestamp_millis(), data: record.clone() };

        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!("Skipping cache write for {key}: {e}");
                return;
            }
        };

        if let Err(e) = self.storage.set_item(&key, &raw) {
            tracing::debug!("Cache write for {key} failed: {e}");
        }
    }

    pub fn get(&self, city: &str) -> Option<WeatherRecord> {
        self.get_with_ttl(city, self.ttl)
    }

    pub fn get_with_ttl(&self, city: &str, ttl: Duration) -> Option<WeatherRecord> {
        let key = Self::key_for(city);

        let raw = match self.storage.get_item(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!("Cache read for {key} failed: {e}");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Ignoring malformed cache entry {key}: {e}");
                return None;
            }
        };

        let age_ms = Utc::now().timestamp_millis().saturating_sub(entry.ts);
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        if age_ms > ttl_ms {
            tracing::debug!("Cache entry {key} expired ({age_ms} ms old)");
            return None;
        }

        Some(entry.data)
    }
}
