use weather_card_core::WeatherProvider;

use crate::view;

/// What a single search produced, ready to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Card(String),
    Failed(String),
    /// Provider declined to look anything up.
    Nothing,
}

/// Look up `city`. `loading` runs once a lookup is actually going ahead, so a
/// blank city never shows the loading line.
pub async fn search<L>(provider: &dyn WeatherProvider, city: &str, loading: L) -> Outcome
where
    L: FnOnce(&str),
{
    let city = city.trim();
    if city.is_empty() {
        return Outcome::Failed(view::EMPTY_CITY_MESSAGE.to_string());
    }

    loading(city);

    match provider.fetch_weather(city).await {
        Ok(Some(record)) => Outcome::Card(view::render_card(&record)),
        Ok(None) => Outcome::Nothing,
        Err(err) => {
            tracing::error!("fetch_weather error for {city}: {err}");
            Outcome::Failed(view::error_message(&err, city))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use weather_card_core::{FetchError, WeatherRecord, error::StatusCode};

    #[derive(Debug, Default)]
    struct FakeProvider {
        status: Option<u16>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn fetch_weather(&self, city: &str) -> Result<Option<WeatherRecord>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(status) = self.status {
                let status = StatusCode::from_u16(status).unwrap();
                return Err(FetchError::from_status(status, "nope"));
            }

            let record = serde_json::from_value(json!({
                "name": city,
                "main": { "temp": 20.0, "feels_like": 19.0, "humidity": 40 },
                "weather": [{ "description": "few clouds", "icon": "02d" }],
                "wind": { "speed": 2.0 }
            }))
            .unwrap();
            Ok(Some(record))
        }
    }

    #[tokio::test]
    async fn blank_city_never_reaches_provider() {
        let provider = FakeProvider::default();

        let mut announced = false;

        let outcome = search(&provider, "   ", |_| announced = true).await;

        assert_eq!(outcome, Outcome::Failed(view::EMPTY_CITY_MESSAGE.to_string()));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert!(!announced, "loading shown for a blank city");
    }

    #[tokio::test]
    async fn success_renders_card() {
        let provider = FakeProvider::default();

        let mut announced = None;

        let outcome = search(&provider, " Oslo ", |city| announced = Some(city.to_string())).await;

        assert_eq!(announced.as_deref(), Some("Oslo"));

        match outcome {
            Outcome::Card(card) => assert!(card.starts_with("Oslo\n20°C  few clouds")),
            other => panic!("expected card, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn not_found_maps_to_message() {
        let provider = FakeProvider { status: Some(404), ..FakeProvider::default() };

        let outcome = search(&provider, "Atlantis", |_| {}).await;

        assert_eq!(
            outcome,
            Outcome::Failed("City not found. Try a different city or check spelling.".to_string())
        );
    }
}
