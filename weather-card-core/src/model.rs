use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Current conditions as returned by the OpenWeather `weather` endpoint.
///
/// Only the fields the card consumes are typed. Every other field, at any level,
/// is kept in an `extra` map, so a cached record serializes back to exactly what
/// the provider sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<SysInfo>,
    pub main: MainReadings,
    pub weather: Vec<Conditions>,
    pub wind: Wind,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SysInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    pub description: String,
    pub icon: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WeatherRecord {
    pub fn country(&self) -> Option<&str> {
        self.sys.as_ref().and_then(|s| s.country.as_deref())
    }

    /// The first reported condition; OpenWeather lists the primary one first.
    pub fn primary_conditions(&self) -> Option<&Conditions> {
        self.weather.first()
    }
}
