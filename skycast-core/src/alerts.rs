//! Threshold alerts, quiet hours and one-line daily advice.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::WeatherSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertKind {
    SevereWeather,
    Temperature,
    Precipitation,
    UvIndex,
    AirQuality,
}

impl AlertKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::SevereWeather => "Severe Weather",
            Self::Temperature => "Temperature Change",
            Self::Precipitation => "Precipitation",
            Self::UvIndex => "UV Index",
            Self::AirQuality => "Air Quality",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThreshold {
    pub kind: AlertKind,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl AlertThreshold {
    pub fn new(kind: AlertKind, enabled: bool, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            kind,
            enabled,
            min,
            max,
        }
    }

    pub fn defaults() -> Vec<AlertThreshold> {
        vec![
            Self::new(AlertKind::SevereWeather, true, None, None),
            Self::new(AlertKind::Temperature, true, Some(0.0), Some(35.0)),
            Self::new(AlertKind::Precipitation, true, Some(60.0), None),
            Self::new(AlertKind::UvIndex, true, Some(7.0), None),
            Self::new(AlertKind::AirQuality, false, Some(100.0), None),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherAlert {
    pub kind: AlertKind,
    pub title: String,
    pub body: String,
}

/// Whole degrees or percent toward zero, so 37.6 reads 37 and -0.5 reads 0.
fn whole(value: f64) -> i64 {
    value.trunc() as i64
}

/// Alerts raised by `snapshot` under the enabled thresholds, in threshold order.
pub fn evaluate_alerts(
    snapshot: &WeatherSnapshot,
    thresholds: &[AlertThreshold],
) -> Vec<WeatherAlert> {
    let city = &snapshot.city_name;
    let mut alerts = Vec::new();

    for threshold in thresholds.iter().filter(|t| t.enabled) {
        match threshold.kind {
            AlertKind::Temperature => {
                let temp = snapshot.temperature;
                if threshold.min.is_some_and(|min| temp < min) {
                    alerts.push(WeatherAlert {
                        kind: threshold.kind,
                        title: "Cold Weather Alert".to_string(),
                        body: format!(
                            "{city} temperature dropped to {}°C, stay warm",
                            whole(temp)
                        ),
                    });
                }
                if threshold.max.is_some_and(|max| temp > max) {
                    alerts.push(WeatherAlert {
                        kind: threshold.kind,
                        title: "Hot Weather Alert".to_string(),
                        body: format!("{city} temperature reached {}°C, stay cool", whole(temp)),
                    });
                }
            }
            AlertKind::Precipitation => {
                if threshold.min.is_some_and(|min| snapshot.precipitation >= min) {
                    alerts.push(WeatherAlert {
                        kind: threshold.kind,
                        title: "Rain Alert".to_string(),
                        body: format!(
                            "{city} has {}% chance of rain, bring an umbrella",
                            whole(snapshot.precipitation)
                        ),
                    });
                }
            }
            AlertKind::UvIndex => {
                if threshold.min.is_some_and(|min| f64::from(snapshot.uv_index) >= min) {
                    alerts.push(WeatherAlert {
                        kind: threshold.kind,
                        title: "UV Alert".to_string(),
                        body: format!(
                            "{city} UV index is {}, use sun protection",
                            snapshot.uv_index
                        ),
                    });
                }
            }
            AlertKind::SevereWeather => {
                if snapshot.condition.is_severe() {
                    alerts.push(WeatherAlert {
                        kind: threshold.kind,
                        title: "Severe Weather Alert".to_string(),
                        body: format!("{city} will have {}, stay safe", snapshot.description),
                    });
                }
            }
            // no air quality feed yet
            AlertKind::AirQuality => {}
        }
    }

    alerts
}

/// Window of the day, in minutes after midnight, during which alerts are held.
/// A start later than the end wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHours {
    pub start: u16,
    pub end: u16,
}

impl Default for QuietHours {
    fn default() -> Self {
        Self {
            start: 22 * 60,
            end: 7 * 60,
        }
    }
}

impl QuietHours {
    pub fn contains(&self, minute_of_day: u16) -> bool {
        if self.start <= self.end {
            self.start <= minute_of_day && minute_of_day < self.end
        } else {
            minute_of_day >= self.start || minute_of_day < self.end
        }
    }
}

pub fn headline_suggestion(snapshot: &WeatherSnapshot) -> &'static str {
    if snapshot.precipitation > 50.0 {
        "Bring an umbrella"
    } else if snapshot.temperature < 10.0 {
        "Cold today, dress warmly"
    } else if snapshot.temperature > 30.0 {
        "Hot today, wear light clothing"
    } else if snapshot.uv_index > 7 {
        "High UV, use sunscreen"
    } else {
        "Comfortable weather today"
    }
}

pub fn uv_description(index: u8) -> &'static str {
    match index {
        0..=2 => "Low",
        3..=5 => "Moderate",
        6..=7 => "High",
        8..=10 => "Very High",
        _ => "Extreme",
    }
}

pub fn precipitation_description(percent: f64) -> &'static str {
    match percent {
        p if p <= 10.0 => "No rain",
        p if p <= 30.0 => "Light rain",
        p if p <= 60.0 => "Moderate rain",
        _ => "Heavy rain",
    }
}
