use async_trait::async_trait;
use reqwest::Client;

use crate::{
    error::WeatherError,
    model::Coordinates,
    normalize::{decode_current, decode_forecast, decode_geocode},
    wire::{RawCurrentWeather, RawForecast, RawGeocodeResult},
};

use super::{ProviderId, WeatherProvider, fetch_body, http_client, trim_base_url};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// OpenWeatherMap free tier: current weather, 5 day / 3 hour forecast and
/// direct geocoding.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    language: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self, WeatherError> {
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            language: "en".to_string(),
            http: http_client()?,
        })
    }

    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = trim_base_url(base_url.as_ref());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    async fn fetch_data(
        &self,
        endpoint: &str,
        coords: &Coordinates,
    ) -> Result<String, WeatherError> {
        let url = format!("{}/data/2.5/{endpoint}", self.base_url);
        let lat = coords.lat.to_string();
        let lon = coords.lon.to_string();

        let request = self.http.get(url).query(&[
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("appid", self.api_key.as_str()),
            ("units", "metric"),
            ("lang", self.language.as_str()),
        ]);
        fetch_body(ProviderId::OpenWeather, endpoint, request).await
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    async fn current(&self, coords: &Coordinates) -> Result<RawCurrentWeather, WeatherError> {
        let body = self.fetch_data("weather", coords).await?;
        decode_current(&body)
    }

    async fn forecast(&self, coords: &Coordinates) -> Result<RawForecast, WeatherError> {
        let body = self.fetch_data("forecast", coords).await?;
        decode_forecast(&body)
    }

    async fn geocode(&self, query: &str, limit: u8) -> Result<Vec<RawGeocodeResult>, WeatherError> {
        let url = format!("{}/geo/1.0/direct", self.base_url);
        let limit = limit.to_string();

        let request = self.http.get(url).query(&[
            ("q", query),
            ("limit", limit.as_str()),
            ("appid", self.api_key.as_str()),
        ]);
        let body = fetch_body(ProviderId::OpenWeather, "geocode", request).await?;
        decode_geocode(&body)
    }
}
