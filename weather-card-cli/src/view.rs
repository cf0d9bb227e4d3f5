//! Human-friendly output: the weather card and status-specific messages.

use weather_card_core::{FetchError, WeatherRecord};

pub const EMPTY_CITY_MESSAGE: &str = "Please enter a city name.";

pub fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon}@2x.png")
}

fn whole(value: f64) -> i64 {
    value.round() as i64
}

/// "Paris, FR", or just the name when the provider gave no country.
pub fn location_label(record: &WeatherRecord) -> String {
    match record.country().filter(|c| !c.is_empty()) {
        Some(country) => format!("{}, {country}", record.name),
        None => record.name.clone(),
    }
}

pub fn render_card(record: &WeatherRecord) -> String {
    let mut lines = vec![location_label(record)];

    match record.primary_conditions() {
        Some(cond) => {
            lines.push(format!("{}°C  {}", whole(record.main.temp), cond.description));
        }
        None => lines.push(format!("{}°C", whole(record.main.temp))),
    }

    lines.push(format!("Feels like: {}°C", whole(record.main.feels_like)));
    lines.push(format!("Humidity:   {}%", record.main.humidity));
    lines.push(format!("Wind:       {} m/s", whole(record.wind.speed)));

    if let Some(cond) = record.primary_conditions() {
        lines.push(format!("Icon:       {}", icon_url(&cond.icon)));
    }

    lines.join("\n")
}

pub fn error_message(err: &FetchError, city: &str) -> String {
    match err {
        FetchError::Unauthorized { .. } => "Invalid or missing API key. Run `weather-card configure` \
             or set OPENWEATHER_API_KEY to your OpenWeather API key."
            .to_string(),
        FetchError::NotFound { .. } => {
            "City not found. Try a different city or check spelling.".to_string()
        }
        FetchError::RateLimited { .. } => {
            "Rate limit exceeded. Please wait a while and try again.".to_string()
        }
        other => {
            let detail = other.detail();
            if detail.trim().is_empty() {
                format!("Could not find weather for \"{city}\". Try a different city.")
            } else {
                format!("Error: {detail}")
            }
        }
    }
}
