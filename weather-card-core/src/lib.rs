//! Core library for the `weather-card` CLI.
//!
//! This crate defines:
//! - Configuration resolved once at startup
//! - A fail-open, TTL-bounded cache over pluggable storage
//! - The OpenWeather client (direct or via proxy) and its error taxonomy
//! - A debouncer for collapsing rapid lookups
//!
//! It is used by `weather-card-cli`, but can also be reused by other front ends.

pub mod cache;
pub mod config;
pub mod debounce;
pub mod error;
pub mod model;
pub mod provider;
pub mod storage;

pub use cache::{CacheEntry, WeatherCache};
pub use config::Config;
pub use debounce::Debouncer;
pub use error::FetchError;
pub use model::WeatherRecord;
pub use provider::{RequestTarget, WeatherClient, WeatherProvider, provider_from_config};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
