use crate::{
    Config,
    error::WeatherError,
    model::Coordinates,
    provider::{openweather::OpenWeatherProvider, proxy::ProxyProvider},
    wire::{RawCurrentWeather, RawForecast, RawGeocodeResult},
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::{
    fmt::{self, Debug},
    time::Duration,
};

pub mod openweather;
pub mod proxy;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    Proxy,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::Proxy => "proxy",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::Proxy]
    }

    /// Whether requests must carry an API key.
    pub fn needs_api_key(&self) -> bool {
        matches!(self, ProviderId::OpenWeather)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let name = value.trim();
        ProviderId::all()
            .iter()
            .copied()
            .find(|id| id.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown provider '{value}'. Supported providers: openweather, proxy."
                )
            })
    }
}

/// Source of raw OpenWeatherMap-shaped records.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn current(&self, coords: &Coordinates) -> Result<RawCurrentWeather, WeatherError>;

    /// 5-day forecast in 3-hour slots.
    async fn forecast(&self, coords: &Coordinates) -> Result<RawForecast, WeatherError>;

    async fn geocode(&self, query: &str, limit: u8) -> Result<Vec<RawGeocodeResult>, WeatherError>;
}

/// Build the provider `id` from its stored settings.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let base_url = config.provider_base_url(id);

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::OpenWeather => {
            let api_key = config.provider_api_key(id).ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for provider '{id}'.\n\
                     Hint: run `skycast configure {id}` or set SKYCAST_API_KEY."
                )
            })?;
            let mut provider =
                OpenWeatherProvider::new(api_key.to_owned())?.with_language(&config.language);
            if let Some(url) = base_url {
                provider = provider.with_base_url(url);
            }
            Box::new(provider)
        }
        ProviderId::Proxy => {
            let url = base_url.ok_or_else(|| {
                anyhow::anyhow!(
                    "No base URL configured for provider '{id}'.\n\
                     Hint: run `skycast configure {id}` and enter the proxy address."
                )
            })?;
            Box::new(ProxyProvider::new(url)?.with_language(&config.language))
        }
    };

    Ok(boxed)
}

/// Build whichever provider `default_provider` names.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

pub(crate) fn http_client() -> Result<Client, WeatherError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("skycast/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(WeatherError::Request)
}

/// Send `request` and return the body of a successful response, mapping
/// failure statuses onto [`WeatherError`].
pub(crate) async fn fetch_body(
    provider: ProviderId,
    what: &str,
    request: RequestBuilder,
) -> Result<String, WeatherError> {
    tracing::debug!(%provider, what, "sending request");
    let res = request.send().await?;

    let status = res.status();
    let body = res.text().await?;

    match status {
        s if s.is_success() => Ok(body),
        StatusCode::UNAUTHORIZED => Err(WeatherError::MissingApiKey(provider.to_string())),
        StatusCode::TOO_MANY_REQUESTS => Err(WeatherError::RateLimited),
        s => Err(WeatherError::Http {
            status: s.as_u16(),
            body: truncate_body(&body),
        }),
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

pub(crate) fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
