use thiserror::Error;

/// Failures surfaced by the fetch layer and the normalizer.
///
/// Transport variants come from the providers; `Decode` and `NoData` come
/// from the normalizer so callers can tell "provider down" apart from
/// "provider changed its schema".
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Failed to reach weather provider: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Weather provider request timed out")]
    Timeout,

    #[error("Weather provider returned status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Weather provider rate limit exceeded (HTTP 429)")]
    RateLimited,

    #[error(
        "Weather provider '{0}' rejected the credentials or none are configured.\n\
         Hint: run `skycast configure {0}` and enter your API key."
    )]
    MissingApiKey(String),

    #[error("Failed to decode {what} payload: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("No weather data found for '{0}'")]
    NoData(String),
}

impl WeatherError {
    /// Whether the transport layer should try the request again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::RateLimited => true,
            Self::Request(err) => err.is_connect() || err.is_timeout(),
            Self::Http { status, .. } => *status == 408 || *status >= 500,
            Self::MissingApiKey(_) | Self::Decode { .. } | Self::NoData(_) => false,
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> WeatherError {
        WeatherError::Http {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn server_errors_and_timeouts_are_retryable() {
        assert!(http(500).is_retryable());
        assert!(http(503).is_retryable());
        assert!(http(408).is_retryable());
        assert!(WeatherError::Timeout.is_retryable());
        assert!(WeatherError::RateLimited.is_retryable());
    }

    #[test]
    fn client_and_data_errors_are_not_retryable() {
        assert!(!http(400).is_retryable());
        assert!(!http(404).is_retryable());
        assert!(!WeatherError::MissingApiKey("openweather".into()).is_retryable());
        assert!(!WeatherError::NoData("Atlantis".into()).is_retryable());

        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let decode = WeatherError::Decode {
            what: "forecast",
            source,
        };
        assert!(!decode.is_retryable());
    }

    #[test]
    fn missing_key_message_carries_hint() {
        let msg = WeatherError::MissingApiKey("openweather".into()).to_string();
        assert!(msg.contains("skycast configure openweather"));
    }
}
