//! Raw OpenWeatherMap records as they arrive on the wire.
//!
//! Shapes follow the 2.5 `weather` and `forecast` endpoints and the geo 1.0
//! `direct` endpoint. Fields the pipeline never reads are left out; fields
//! that some responses omit are defaulted so a sparse payload still decodes.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Coordinates, WeatherCondition};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMain {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub humidity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCondition {
    #[serde(default)]
    pub id: u32,
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawWind {
    /// Metres per second with `units=metric`.
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub deg: f64,
    #[serde(default)]
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSys {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
}

/// Response of `/data/2.5/weather`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCurrentWeather {
    #[serde(default)]
    pub coord: Coordinates,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
    pub main: RawMain,
    /// Metres.
    #[serde(default)]
    pub visibility: Option<u32>,
    #[serde(default)]
    pub wind: RawWind,
    pub dt: i64,
    #[serde(default)]
    pub sys: RawSys,
    /// Shift in seconds from UTC.
    #[serde(default)]
    pub timezone: i32,
    #[serde(default)]
    pub name: String,
}

/// One 3-hour slot of `/data/2.5/forecast`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawForecastItem {
    pub dt: i64,
    pub main: RawMain,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
    #[serde(default)]
    pub wind: RawWind,
    #[serde(default)]
    pub visibility: Option<u32>,
    /// Probability of precipitation in `[0, 1]`.
    #[serde(default)]
    pub pop: f64,
    #[serde(default)]
    pub dt_txt: Option<String>,
}

impl RawForecastItem {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.dt, 0)
    }

    /// Calendar day of the slot in the given zone.
    pub fn local_date(&self, offset: FixedOffset) -> Option<NaiveDate> {
        self.timestamp()
            .map(|ts| ts.with_timezone(&offset).date_naive())
    }

    pub fn condition(&self) -> WeatherCondition {
        condition_of(&self.weather)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawForecastCity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub coord: Coordinates,
    #[serde(default)]
    pub timezone: i32,
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
}

/// Response of `/data/2.5/forecast`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawForecast {
    #[serde(default)]
    pub list: Vec<RawForecastItem>,
    #[serde(default)]
    pub city: RawForecastCity,
}

/// One candidate of `/geo/1.0/direct`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGeocodeResult {
    pub name: String,
    #[serde(default)]
    pub local_names: Option<HashMap<String, String>>,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// A record without any condition entry counts as clear sky.
pub(crate) fn condition_of(weather: &[RawCondition]) -> WeatherCondition {
    weather
        .first()
        .map(|w| WeatherCondition::from_provider(&w.main))
        .unwrap_or(WeatherCondition::Sunny)
}
