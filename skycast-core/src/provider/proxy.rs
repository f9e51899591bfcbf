use async_trait::async_trait;
use reqwest::Client;

use crate::{
    error::WeatherError,
    model::Coordinates,
    normalize::{decode_current, decode_forecast, decode_geocode},
    wire::{RawCurrentWeather, RawForecast, RawGeocodeResult},
};

use super::{ProviderId, WeatherProvider, fetch_body, http_client, trim_base_url};

/// A pass-through server that holds the OpenWeatherMap key and relays the
/// same payloads, so the client never ships one.
#[derive(Debug, Clone)]
pub struct ProxyProvider {
    base_url: String,
    language: String,
    http: Client,
}

impl ProxyProvider {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, WeatherError> {
        Ok(Self {
            base_url: trim_base_url(base_url.as_ref()),
            language: "en".to_string(),
            http: http_client()?,
        })
    }

    /// The relay falls back to Chinese when no `lang` is sent, so one always is.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    async fn fetch_at(&self, endpoint: &str, coords: &Coordinates) -> Result<String, WeatherError> {
        let url = format!("{}/api/{endpoint}", self.base_url);
        let lat = coords.lat.to_string();
        let lon = coords.lon.to_string();

        let request = self.http.get(url).query(&[
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("units", "metric"),
            ("lang", self.language.as_str()),
        ]);
        fetch_body(ProviderId::Proxy, endpoint, request).await
    }
}

#[async_trait]
impl WeatherProvider for ProxyProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Proxy
    }

    async fn current(&self, coords: &Coordinates) -> Result<RawCurrentWeather, WeatherError> {
        let body = self.fetch_at("weather", coords).await?;
        decode_current(&body)
    }

    async fn forecast(&self, coords: &Coordinates) -> Result<RawForecast, WeatherError> {
        let body = self.fetch_at("forecast", coords).await?;
        decode_forecast(&body)
    }

    async fn geocode(&self, query: &str, limit: u8) -> Result<Vec<RawGeocodeResult>, WeatherError> {
        let url = format!("{}/api/search", self.base_url);
        let limit = limit.to_string();
        let request = self
            .http
            .get(url)
            .query(&[("q", query), ("limit", limit.as_str())]);
        let body = fetch_body(ProviderId::Proxy, "search", request).await?;
        decode_geocode(&body)
    }
}
