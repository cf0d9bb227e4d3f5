use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Display;

use crate::{
    Config, FetchError, WeatherCache, WeatherRecord,
    error::failure_detail,
    storage::Storage,
};

use super::{RequestTarget, WeatherProvider};

/// OpenWeather current-conditions client with a cache in front of it.
#[derive(Debug)]
pub struct WeatherClient<S> {
    target: RequestTarget,
    cache: WeatherCache<S>,
    http: Client,
}

impl<S: Storage> WeatherClient<S> {
    pub fn new(config: &Config, storage: S) -> anyhow::Result<Self> {
        Ok(Self {
            target: RequestTarget::from_config(config)?,
            cache: WeatherCache::with_ttl(storage, config.cache_ttl()),
            http: Client::new(),
        })
    }

    pub fn target(&self) -> &RequestTarget {
        &self.target
    }

    pub fn cache(&self) -> &WeatherCache<S> {
        &self.cache
    }

    async fn fetch_current(&self, city: &str) -> Result<WeatherRecord, FetchError> {
        let url = self.target.url_for(city);
        tracing::debug!("Requesting weather for {city} ({} mode)", self.target.mode());

        let res = self.http.get(url).send().await.map_err(FetchError::Transport)?;

        let status = res.status();
        // Error detail lives in the body even on failure, so always try to read it.
        let body = decode_body(res.bytes().await);

        if !status.is_success() {
            let detail = failure_detail(status, body.as_ref().ok());
            tracing::debug!("Weather request for {city} failed with status {status}: {detail}");
            return Err(FetchError::from_status(status, detail));
        }

        let body = body.map_err(|detail| FetchError::Malformed {
            status: status.as_u16(),
            detail,
        })?;

        serde_json::from_value(body).map_err(|e| FetchError::Malformed {
            status: status.as_u16(),
            detail: e.to_string(),
        })
    }
}

/// Parse a response body as JSON, describing why when there is nothing usable.
fn decode_body<B, E>(read: Result<B, E>) -> Result<serde_json::Value, String>
where
    B: AsRef<[u8]>,
    E: Display,
{
    let bytes = read.map_err(|e| {
        tracing::debug!("Failed to read weather response body: {e}");
        format!("failed to read response body: {e}")
    })?;

    serde_json::from_slice(bytes.as_ref()).map_err(|e| format!("response body is not JSON: {e}"))
}

#[async_trait]
impl<S: Storage> WeatherProvider for WeatherClient<S> {
    async fn fetch_weather(&self, city: &str) -> Result<Option<WeatherRecord>, FetchError> {
        let city = city.trim();
        if city.is_empty() {
            return Ok(None);
        }

        if let Some(cached) = self.cache.get(city) {
            tracing::debug!("Cache hit for {city}");
            return Ok(Some(cached));
        }

        let record = self.fetch_current(city).await?;
        self.cache.set(city, &record);

        Ok(Some(record))
    }
}
