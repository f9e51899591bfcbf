use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::sun::SunTimes;
use crate::wire::RawForecastItem;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    PartlyCloudy,
    Rainy,
    Snowy,
    Stormy,
    Foggy,
}

impl WeatherCondition {
    pub const fn all() -> &'static [WeatherCondition] {
        &[
            Self::Sunny,
            Self::Cloudy,
            Self::PartlyCloudy,
            Self::Rainy,
            Self::Snowy,
            Self::Stormy,
            Self::Foggy,
        ]
    }

    /// Map the provider's `weather[].main` group name. Unknown groups
    /// (e.g. "Smoke", "Dust", "Tornado") fall back to partly cloudy.
    pub fn from_provider(main: &str) -> Self {
        match main.to_lowercase().as_str() {
            "clear" => Self::Sunny,
            "clouds" => Self::Cloudy,
            "rain" | "drizzle" => Self::Rainy,
            "snow" => Self::Snowy,
            "thunderstorm" => Self::Stormy,
            "mist" | "fog" | "haze" => Self::Foggy,
            _ => Self::PartlyCloudy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::PartlyCloudy => "partlyCloudy",
            Self::Rainy => "rainy",
            Self::Snowy => "snowy",
            Self::Stormy => "stormy",
            Self::Foggy => "foggy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sunny => "Clear sky",
            Self::Cloudy => "Cloudy",
            Self::PartlyCloudy => "Scattered clouds",
            Self::Rainy => "Rain",
            Self::Snowy => "Snow",
            Self::Stormy => "Thunderstorm",
            Self::Foggy => "Mist",
        }
    }

    pub fn is_severe(&self) -> bool {
        matches!(self, Self::Stormy | Self::Snowy)
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Eight-point compass rose, clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassDirection {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl CompassDirection {
    const ROSE: [CompassDirection; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Buckets are 45° wide and centred on each point, so 337.5°..22.5° is north.
    pub fn from_degrees(degrees: f64) -> Self {
        let bucket = ((degrees + 22.5) / 45.0).floor() as i64;
        Self::ROSE[bucket.rem_euclid(8) as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::North => "N",
            Self::NorthEast => "NE",
            Self::East => "E",
            Self::SouthEast => "SE",
            Self::South => "S",
            Self::SouthWest => "SW",
            Self::West => "W",
            Self::NorthWest => "NW",
        }
    }
}

impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One aggregated calendar day of the forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub day_name: String,
    pub condition: WeatherCondition,
    pub temperature_max: f64,
    pub temperature_min: f64,
    /// Mean probability of precipitation, percent.
    pub precipitation: f64,
}

/// Normalized current conditions for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city_name: String,
    pub temperature: f64,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub condition: WeatherCondition,
    pub description: String,
    pub humidity: f64,
    /// km/h
    pub wind_speed: f64,
    pub wind_direction: CompassDirection,
    /// hPa
    pub pressure: f64,
    /// km
    pub visibility: f64,
    pub uv_index: u8,
    /// Percent.
    pub precipitation: f64,
    pub feels_like: f64,
    pub observed_at: DateTime<Utc>,
    pub utc_offset_secs: i32,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    pub weekly_forecast: Vec<DailyForecast>,
    pub hourly_forecast: Vec<RawForecastItem>,
}

impl WeatherSnapshot {
    pub fn offset(&self) -> FixedOffset {
        offset_from_secs(self.utc_offset_secs)
    }

    pub fn sun_times(&self) -> Option<SunTimes> {
        SunTimes::new(self.sunrise?, self.sunset?)
    }

    /// Replace the provider's station name with the name the user picked.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.city_name = name.into();
        self
    }
}

/// Out-of-range shifts fall back to UTC.
pub fn offset_from_secs(secs: i32) -> FixedOffset {
    FixedOffset::east_opt(secs).unwrap_or_else(|| Utc.fix())
}
