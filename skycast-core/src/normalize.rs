//! Provider payloads to [`WeatherSnapshot`].

use chrono::{DateTime, FixedOffset, Utc};

use crate::city::City;
use crate::daily::aggregate_daily;
use crate::error::WeatherError;
use crate::model::{CompassDirection, WeatherSnapshot, offset_from_secs};
use crate::wire::{RawCurrentWeather, RawForecast, RawForecastItem, RawGeocodeResult, condition_of};

/// The free provider tier reports no UV index.
pub const DEFAULT_UV_INDEX: u8 = 5;

const MPS_TO_KMH: f64 = 3.6;
const METRES_PER_KM: f64 = 1000.0;
/// Below this many readings (current included) today's range is widened.
const MIN_SAME_DAY_READINGS: usize = 3;
const FALLBACK_WINDOW_SECS: i64 = 12 * 3600;

pub fn decode_current(body: &str) -> Result<RawCurrentWeather, WeatherError> {
    serde_json::from_str(body).map_err(|source| WeatherError::Decode {
        what: "current weather",
        source,
    })
}

pub fn decode_forecast(body: &str) -> Result<RawForecast, WeatherError> {
    serde_json::from_str(body).map_err(|source| WeatherError::Decode {
        what: "forecast",
        source,
    })
}

pub fn decode_geocode(body: &str) -> Result<Vec<RawGeocodeResult>, WeatherError> {
    serde_json::from_str(body).map_err(|source| WeatherError::Decode {
        what: "geocoding",
        source,
    })
}

/// First geocoding candidate as a [`City`], or `NoData` when there is none.
pub fn city_from_geocode(
    results: Vec<RawGeocodeResult>,
    query: &str,
) -> Result<City, WeatherError> {
    results
        .into_iter()
        .next()
        .map(City::from)
        .ok_or_else(|| WeatherError::NoData(query.to_string()))
}

/// Build a snapshot from the current record and, when available, the
/// 5-day/3-hour forecast.
pub fn normalize(
    current: RawCurrentWeather,
    forecast: Option<RawForecast>,
    now: DateTime<Utc>,
) -> WeatherSnapshot {
    let offset = offset_from_secs(current.timezone);
    let today = now.with_timezone(&offset).date_naive();
    let temperature = current.main.temp;
    let condition = condition_of(&current.weather);

    let description = current
        .weather
        .first()
        .map(|w| capitalize_words(&w.description))
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| condition.label().to_string());

    let items = forecast.map(|f| f.list);
    let (temperature_min, temperature_max) = match &items {
        Some(items) => today_bounds(temperature, items, now, offset),
        None => clamp_bounds(temperature, current.main.temp_min, current.main.temp_max),
    };
    let precipitation = items
        .as_deref()
        .map(|items| nearest_precipitation(items, now))
        .unwrap_or(0.0);
    let weekly_forecast = items
        .as_deref()
        .map(|items| aggregate_daily(items, offset, today))
        .unwrap_or_default();

    WeatherSnapshot {
        city_name: current.name,
        temperature,
        temperature_min,
        temperature_max,
        condition,
        description,
        humidity: current.main.humidity,
        wind_speed: current.wind.speed * MPS_TO_KMH,
        wind_direction: CompassDirection::from_degrees(current.wind.deg),
        pressure: current.main.pressure,
        visibility: current.visibility.map(|m| m as f64 / METRES_PER_KM).unwrap_or(0.0),
        uv_index: DEFAULT_UV_INDEX,
        precipitation,
        feels_like: current.main.feels_like,
        observed_at: DateTime::from_timestamp(current.dt, 0).unwrap_or(now),
        utc_offset_secs: offset.local_minus_utc(),
        sunrise: current.sys.sunrise,
        sunset: current.sys.sunset,
        weekly_forecast,
        hourly_forecast: items.unwrap_or_default(),
    }
}

/// Today's low/high from forecast slots plus the current reading, widened to
/// a ±12 h window when the local day has too few slots, and always bracketing
/// the current temperature.
pub fn today_bounds(
    current_temp: f64,
    items: &[RawForecastItem],
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> (f64, f64) {
    let today = now.with_timezone(&offset).date_naive();

    let mut readings: Vec<f64> = items
        .iter()
        .filter(|i| i.local_date(offset) == Some(today))
        .map(|i| i.main.temp)
        .collect();
    readings.push(current_temp);

    if readings.len() < MIN_SAME_DAY_READINGS {
        let now_ts = now.timestamp();
        readings = items
            .iter()
            .filter(|i| (i.dt - now_ts).abs() <= FALLBACK_WINDOW_SECS)
            .map(|i| i.main.temp)
            .collect();
        readings.push(current_temp);
    }

    let low = readings.iter().copied().fold(f64::INFINITY, f64::min);
    let high = readings.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    clamp_bounds(current_temp, low, high)
}

fn clamp_bounds(current: f64, low: f64, high: f64) -> (f64, f64) {
    (low.min(current), high.max(current))
}

/// Probability of precipitation (percent) of the slot closest to `now`.
pub fn nearest_precipitation(items: &[RawForecastItem], now: DateTime<Utc>) -> f64 {
    let now_ts = now.timestamp();
    items
        .iter()
        .min_by_key(|i| (i.dt - now_ts).abs())
        .map(|i| i.pop * 100.0)
        .unwrap_or(0.0)
}

fn capitalize_words(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
