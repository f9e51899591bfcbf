//! Sunrise/sunset derived windows: solar noon, golden hour and blue hour.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

const GOLDEN_HOUR_SECS: i64 = 3600;
const BLUE_HOUR_SECS: i64 = 1800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialMoment {
    MorningBlueHour,
    Sunrise,
    MorningGoldenHour,
    SolarNoon,
    EveningGoldenHour,
    Sunset,
    EveningBlueHour,
}

impl SpecialMoment {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MorningBlueHour => "Morning blue hour",
            Self::Sunrise => "Sunrise",
            Self::MorningGoldenHour => "Morning golden hour",
            Self::SolarNoon => "Solar noon",
            Self::EveningGoldenHour => "Evening golden hour",
            Self::Sunset => "Sunset",
            Self::EveningBlueHour => "Evening blue hour",
        }
    }
}

impl fmt::Display for SpecialMoment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunTimes {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub solar_noon: DateTime<Utc>,
    pub day_length: Duration,
}

impl SunTimes {
    /// Build from Unix timestamps. Returns `None` when either timestamp is out
    /// of range or the sun does not set after it rises (polar day/night).
    pub fn new(sunrise: i64, sunset: i64) -> Option<Self> {
        if sunset <= sunrise {
            return None;
        }
        let sunrise_at = DateTime::from_timestamp(sunrise, 0)?;
        let sunset_at = DateTime::from_timestamp(sunset, 0)?;
        let day_length = sunset_at - sunrise_at;

        Some(Self {
            sunrise: sunrise_at,
            sunset: sunset_at,
            solar_noon: sunrise_at + day_length / 2,
            day_length,
        })
    }

    pub fn morning_golden_hour_start(&self) -> DateTime<Utc> {
        self.sunrise
    }

    pub fn morning_golden_hour_end(&self) -> DateTime<Utc> {
        self.sunrise + Duration::seconds(GOLDEN_HOUR_SECS)
    }

    pub fn evening_golden_hour_start(&self) -> DateTime<Utc> {
        self.sunset - Duration::seconds(GOLDEN_HOUR_SECS)
    }

    pub fn evening_golden_hour_end(&self) -> DateTime<Utc> {
        self.sunset
    }

    pub fn morning_blue_hour_start(&self) -> DateTime<Utc> {
        self.sunrise - Duration::seconds(BLUE_HOUR_SECS)
    }

    pub fn morning_blue_hour_end(&self) -> DateTime<Utc> {
        self.sunrise
    }

    pub fn evening_blue_hour_start(&self) -> DateTime<Utc> {
        self.sunset
    }

    pub fn evening_blue_hour_end(&self) -> DateTime<Utc> {
        self.sunset + Duration::seconds(BLUE_HOUR_SECS)
    }

    /// Fraction of daylight elapsed: 0 at sunrise, 0.5 at solar noon, 1 at
    /// sunset. `None` outside daylight.
    pub fn current_sun_position(&self, at: DateTime<Utc>) -> Option<f64> {
        if at < self.sunrise || at > self.sunset {
            return None;
        }
        let elapsed = (at - self.sunrise).num_milliseconds() as f64;
        Some(elapsed / self.day_length.num_milliseconds() as f64)
    }

    pub fn is_in_golden_hour(&self, at: DateTime<Utc>) -> bool {
        (self.morning_golden_hour_start() <= at && at <= self.morning_golden_hour_end())
            || (self.evening_golden_hour_start() <= at && at <= self.evening_golden_hour_end())
    }

    pub fn is_in_blue_hour(&self, at: DateTime<Utc>) -> bool {
        (self.morning_blue_hour_start() <= at && at <= self.morning_blue_hour_end())
            || (self.evening_blue_hour_start() <= at && at <= self.evening_blue_hour_end())
    }

    /// The day's named moments in chronological order.
    pub fn moments(&self) -> [(SpecialMoment, DateTime<Utc>); 7] {
        [
            (SpecialMoment::MorningBlueHour, self.morning_blue_hour_start()),
            (SpecialMoment::Sunrise, self.sunrise),
            (SpecialMoment::MorningGoldenHour, self.morning_golden_hour_start()),
            (SpecialMoment::SolarNoon, self.solar_noon),
            (SpecialMoment::EveningGoldenHour, self.evening_golden_hour_start()),
            (SpecialMoment::Sunset, self.sunset),
            (SpecialMoment::EveningBlueHour, self.evening_blue_hour_start()),
        ]
    }

    /// First moment strictly after `from`. Once the evening blue hour has
    /// begun this returns `None`; callers refresh with the next day's times.
    pub fn next_special_moment(
        &self,
        from: DateTime<Utc>,
    ) -> Option<(SpecialMoment, DateTime<Utc>)> {
        self.moments().into_iter().find(|(_, at)| *at > from)
    }

    pub fn formatted_day_length(&self) -> String {
        let minutes = self.day_length.num_minutes();
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}
