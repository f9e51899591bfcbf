use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::wire::RawForecastItem;

const SLOT_HOURS: u32 = 3;
const MPS_TO_KMH: f64 = 3.6;
/// Spans narrower than this are widened so a flat line still gets an axis.
const MIN_AXIS_SPAN: f64 = 1.0;
const AXIS_PADDING: f64 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendMetric {
    #[default]
    Temperature,
    Humidity,
    Precipitation,
    Wind,
}

impl TrendMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Precipitation => "precipitation",
            Self::Wind => "wind",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
            Self::Precipitation => "Precipitation",
            Self::Wind => "Wind Speed",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity | Self::Precipitation => "%",
            Self::Wind => "km/h",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Temperature => "#FF6B6B",
            Self::Humidity => "#4ECDC4",
            Self::Precipitation => "#667EEA",
            Self::Wind => "#20E3B2",
        }
    }

    fn value(&self, item: &RawForecastItem) -> f64 {
        match self {
            Self::Temperature => item.main.temp,
            Self::Humidity => item.main.humidity,
            Self::Precipitation => item.pop * 100.0,
            Self::Wind => item.wind.speed * MPS_TO_KMH,
        }
    }
}

impl fmt::Display for TrendMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TrendMetric {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "temperature" | "temp" => Ok(Self::Temperature),
            "humidity" => Ok(Self::Humidity),
            "precipitation" | "rain" => Ok(Self::Precipitation),
            "wind" => Ok(Self::Wind),
            _ => Err(anyhow::anyhow!(
                "Unknown metric '{value}'. \
                 Supported metrics: temperature, humidity, precipitation, wind."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendRange {
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "48h")]
    TwoDays,
    #[serde(rename = "7d")]
    Week,
}

impl TrendRange {
    pub fn hours(&self) -> u32 {
        match self {
            Self::Day => 24,
            Self::TwoDays => 48,
            Self::Week => 168,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "24h",
            Self::TwoDays => "48h",
            Self::Week => "7d",
        }
    }

    fn label_format(&self) -> &'static str {
        match self {
            Self::Day | Self::TwoDays => "%H:%M",
            Self::Week => "%m/%d",
        }
    }
}

impl fmt::Display for TrendRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TrendRange {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "24h" => Ok(Self::Day),
            "48h" => Ok(Self::TwoDays),
            "7d" => Ok(Self::Week),
            _ => Err(anyhow::anyhow!(
                "Unknown range '{value}'. Supported ranges: 24h, 48h, 7d."
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: DateTime<Utc>,
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub name: String,
    pub points: Vec<TrendPoint>,
    pub color: String,
    pub unit: String,
}

/// Chart series for one metric over the next `range` hours of forecast slots.
///
/// Slots are taken in the order the provider returned them; at most one
/// point per 3-hour slot of the range is kept.
pub fn build_trend(
    items: &[RawForecastItem],
    metric: TrendMetric,
    range: TrendRange,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> TrendSeries {
    let horizon = now.timestamp() + i64::from(range.hours()) * 3600;
    let max_points = (range.hours() / SLOT_HOURS) as usize;

    let points = items
        .iter()
        .filter(|item| item.dt <= horizon)
        .filter_map(|item| Some((item.timestamp()?, item)))
        .take(max_points)
        .map(|(date, item)| TrendPoint {
            date,
            value: metric.value(item),
            label: date.with_timezone(&offset).format(range.label_format()).to_string(),
        })
        .collect();

    TrendSeries {
        name: metric.name().to_string(),
        points,
        color: metric.color().to_string(),
        unit: metric.unit().to_string(),
    }
}

/// Y-axis bounds padded by a tenth of the span on each side.
pub fn value_range(series: &TrendSeries) -> (f64, f64) {
    let mut values = series.points.iter().map(|p| p.value);
    let Some(first) = values.next() else {
        return (0.0, 100.0);
    };
    let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = (max - min).max(MIN_AXIS_SPAN);
    let mid_pad = (span - (max - min)) / 2.0;
    (
        min - mid_pad - span * AXIS_PADDING,
        max + mid_pad + span * AXIS_PADDING,
    )
}
