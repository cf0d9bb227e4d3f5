use anyhow::Context;
use async_trait::async_trait;
use reqwest::Url;
use std::fmt::Debug;

use crate::{Config, FetchError, WeatherRecord, storage::Storage};

pub mod openweather;

pub use openweather::WeatherClient;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for `city`. A blank city is a no-op returning `Ok(None)`.
    async fn fetch_weather(&self, city: &str) -> Result<Option<WeatherRecord>, FetchError>;
}

/// Where lookups are sent. Chosen once from [`Config::use_proxy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTarget {
    /// Straight to OpenWeather with the key in the query string.
    Direct { base: Url, api_key: String },
    /// Through a trusted proxy that adds the key itself.
    Proxy { base: Url },
}

impl RequestTarget {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        if config.use_proxy {
            let base = Url::parse(&config.proxy_url)
                .with_context(|| format!("Invalid proxy URL: {}", config.proxy_url))?;
            return Ok(Self::Proxy { base });
        }

        let base = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid weather API URL: {}", config.base_url))?;

        if config.api_key().is_none() {
            tracing::warn!("No OpenWeather API key configured; requests will be rejected");
        }

        Ok(Self::Direct { base, api_key: config.api_key().unwrap_or_default().to_owned() })
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Self::Direct { .. } => "direct",
            Self::Proxy { .. } => "proxy",
        }
    }

    /// Full request URL for `city`, with the query escaped.
    pub fn url_for(&self, city: &str) -> Url {
        match self {
            Self::Direct { base, api_key } => {
                let mut url = base.clone();
                url.query_pairs_mut()
                    .append_pair("q", city)
                    .append_pair("units", "metric")
                    .append_pair("appid", api_key);
                url
            }
            Self::Proxy { base } => {
                let mut url = base.clone();
                url.query_pairs_mut().append_pair("city", city);
                url
            }
        }
    }
}

/// Construct a client from config, caching into `storage`.
pub fn provider_from_config<S>(config: &Config, storage: S) -> anyhow::Result<Box<dyn WeatherProvider>>
where
    S: Storage + 'static,
{
    Ok(Box::new(WeatherClient::new(config, storage)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn query(url: &Url) -> Vec<(String, String)> {
        url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect()
    }

    #[test]
    fn direct_url_carries_key_and_metric_units() {
        let cfg = Config { api_key: Some("KEY".into()), ..Config::default() };
        let target = RequestTarget::from_config(&cfg).unwrap();

        let url = target.url_for("São Paulo");

        assert_eq!(target.mode(), "direct");
        assert!(url.as_str().starts_with("https://api.openweathermap.org/data/2.5/weather?"));
        assert_eq!(
            query(&url),
            vec![
                ("q".to_string(), "São Paulo".to_string()),
                ("units".to_string(), "metric".to_string()),
                ("appid".to_string(), "KEY".to_string()),
            ]
        );
        assert!(!url.as_str().contains(' '));
    }

    #[test]
    fn proxy_url_omits_credential() {
        let cfg = Config { api_key: Some("SECRET".into()), use_proxy: true, ..Config::default() };
        let target = RequestTarget::from_config(&cfg).unwrap();

        let url = target.url_for("Paris");

        assert_eq!(target.mode(), "proxy");
        assert_eq!(url.path(), "/.netlify/functions/weather");
        assert_eq!(query(&url), vec![("city".to_string(), "Paris".to_string())]);
        assert!(!url.as_str().contains("SECRET"));
        assert!(!url.as_str().contains("appid"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let cfg = Config { base_url: "not a url".into(), ..Config::default() };
        let err = RequestTarget::from_config(&cfg).unwrap_err();

        assert!(err.to_string().contains("Invalid weather API URL"));
    }

    #[test]
    fn provider_from_config_builds_client() {
        let cfg = Config { api_key: Some("KEY".into()), ..Config::default() };
        assert!(provider_from_config(&cfg, MemoryStorage::new()).is_ok());
    }
}
