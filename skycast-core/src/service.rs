//! Fetch, cache and normalize weather for a location.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::{
    Config,
    cache::{DEFAULT_SEARCH_TTL, DEFAULT_WEATHER_TTL, ResponseCache, keys},
    city::City,
    error::WeatherError,
    model::{Coordinates, WeatherSnapshot},
    normalize::{city_from_geocode, normalize},
    provider::{WeatherProvider, default_provider_from_config},
    retry::{RetryPolicy, with_retry},
    wire::{RawCurrentWeather, RawForecast, RawGeocodeResult},
};

pub const SEARCH_LIMIT: u8 = 10;

#[derive(Debug)]
pub struct WeatherService {
    provider: Box<dyn WeatherProvider>,
    cache: Option<ResponseCache>,
    retry: RetryPolicy,
    weather_ttl: Duration,
    search_ttl: Duration,
}

impl WeatherService {
    /// Uncached service with the default retry policy.
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self {
            provider,
            cache: None,
            retry: RetryPolicy::default(),
            weather_ttl: DEFAULT_WEATHER_TTL,
            search_ttl: DEFAULT_SEARCH_TTL,
        }
    }

    /// Default provider from `config`, backed by the platform disk cache
    /// (swept of expired entries on open).
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = default_provider_from_config(config)?;

        let cache = ResponseCache::open_default(config.cache.max_disk_bytes);

        Ok(Self::new(provider)
            .with_cache(cache)
            .with_ttl(config.cache.weather_ttl(), config.cache.search_ttl()))
    }

    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_ttl(mut self, weather: Duration, search: Duration) -> Self {
        self.weather_ttl = weather;
        self.search_ttl = search;
        self
    }

    pub fn provider(&self) -> &dyn WeatherProvider {
        self.provider.as_ref()
    }

    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    /// Geocode `name` and build the snapshot for the best match.
    pub async fn snapshot_for_city(
        &self,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let results = with_retry(&self.retry, "geocode", || self.provider.geocode(name, 1)).await?;
        let city = city_from_geocode(results, name)?;
        self.snapshot_for(&city, now).await
    }

    /// Snapshot for a known city, labelled with the city's own name rather
    /// than the provider's nearest station.
    pub async fn snapshot_for(
        &self,
        city: &City,
        now: DateTime<Utc>,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let snapshot = self.snapshot_for_coordinates(city.coordinates(), now).await?;
        Ok(snapshot.with_display_name(city.display_name()))
    }

    /// Current conditions and forecast are fetched concurrently. A failed
    /// forecast still yields a snapshot, just without daily or hourly data.
    pub async fn snapshot_for_coordinates(
        &self,
        coords: Coordinates,
        now: DateTime<Utc>,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let (current, forecast) = tokio::join!(self.current(&coords), self.forecast(&coords));

        let current = current?;
        let forecast = match forecast {
            Ok(forecast) => Some(forecast),
            Err(err) => {
                tracing::warn!(
                    %coords,
                    error = %err,
                    "forecast unavailable, continuing without it"
                );
                None
            }
        };

        let snapshot = normalize(current, forecast, now);
        tracing::info!(
            city = %snapshot.city_name,
            temperature = snapshot.temperature,
            condition = %snapshot.condition,
            "weather updated"
        );
        Ok(snapshot)
    }

    /// Up to [`SEARCH_LIMIT`] candidate cities. A blank query matches nothing.
    pub async fn search_cities(&self, query: &str) -> Result<Vec<City>, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let key = keys::search(query);
        let results: Vec<RawGeocodeResult> = match self.cached(&key) {
            Some(results) => results,
            None => {
                let results = with_retry(&self.retry, "search", || {
                    self.provider.geocode(query, SEARCH_LIMIT)
                })
                .await?;
                self.store(&key, &results, self.search_ttl);
                results
            }
        };

        Ok(results.into_iter().map(City::from).collect())
    }

    async fn current(&self, coords: &Coordinates) -> Result<RawCurrentWeather, WeatherError> {
        let key = keys::weather(coords);
        if let Some(current) = self.cached(&key) {
            return Ok(current);
        }
        let current = with_retry(&self.retry, "current weather", || {
            self.provider.current(coords)
        })
        .await?;
        self.store(&key, &current, self.weather_ttl);
        Ok(current)
    }

    async fn forecast(&self, coords: &Coordinates) -> Result<RawForecast, WeatherError> {
        let key = keys::forecast(coords);
        if let Some(forecast) = self.cached(&key) {
            return Ok(forecast);
        }
        let forecast = with_retry(&self.retry, "forecast", || {
            self.provider.forecast(coords)
        })
        .await?;
        self.store(&key, &forecast, self.weather_ttl);
        Ok(forecast)
    }

    fn cached<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.cache.as_ref()?.get(key)
    }

    fn store<T: serde::Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        if let Some(cache) = &self.cache {
            if let Err(err) = cache.set(key, value, ttl) {
                tracing::warn!(key, error = %err, "failed to write cache entry");
            }
        }
    }
}
