//! Plain-text output for each command.

use std::fmt::Write;
use std::path::Path;

use chrono::{DateTime, FixedOffset, Utc};
use skycast_core::{
    City, SunTimes, WeatherSnapshot,
    alerts::{WeatherAlert, headline_suggestion, precipitation_description, uv_description},
    clothing::{ClothingItem, ClothingRecommendation},
    trend::{TrendSeries, value_range},
};

fn join(items: &[ClothingItem]) -> String {
    items.iter().map(ClothingItem::name).collect::<Vec<_>>().join(", ")
}

fn clock(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%H:%M").to_string()
}

pub fn current(snap: &WeatherSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", snap.city_name);
    let _ = writeln!(
        out,
        "  {:.0}°C  {}  (feels like {:.0}°C, today {:.0}°C / {:.0}°C)",
        snap.temperature,
        snap.description,
        snap.feels_like,
        snap.temperature_min,
        snap.temperature_max
    );
    let _ = writeln!(
        out,
        "  Wind {:.0} km/h {}   Humidity {:.0}%   Pressure {:.0} hPa",
        snap.wind_speed, snap.wind_direction, snap.humidity, snap.pressure
    );
    let _ = writeln!(
        out,
        "  Visibility {:.1} km   UV {} ({})   Precipitation {:.0}% ({})",
        snap.visibility,
        snap.uv_index,
        uv_description(snap.uv_index),
        snap.precipitation,
        precipitation_description(snap.precipitation)
    );
    let _ = write!(out, "  {}", headline_suggestion(snap));
    out
}

pub fn daily(snap: &WeatherSnapshot) -> String {
    if snap.weekly_forecast.is_empty() {
        return format!("{}: no forecast available", snap.city_name);
    }
    let days = snap.weekly_forecast.len();
    let mut out = format!("{}: next {days} days\n", snap.city_name);
    for day in &snap.weekly_forecast {
        let _ = writeln!(
            out,
            "  {:<10} {}  {:>4.0}°C / {:>4.0}°C  rain {:>3.0}%  {}",
            day.day_name,
            day.date.format("%m/%d"),
            day.temperature_min,
            day.temperature_max,
            day.precipitation,
            day.condition
        );
    }
    out.trim_end().to_string()
}

pub fn sun(city: &str, sun: &SunTimes, now: DateTime<Utc>, offset: FixedOffset) -> String {
    let mut out = format!("{city}: day length {}\n", sun.formatted_day_length());
    for (moment, at) in sun.moments() {
        let _ = writeln!(out, "  {:<20} {}", moment.name(), clock(at, offset));
    }
    match sun.current_sun_position(now) {
        Some(position) => {
            let _ = writeln!(out, "  Sun is {:.0}% through the day", position * 100.0);
        }
        None => out.push_str("  The sun is down\n"),
    }
    if sun.is_in_golden_hour(now) {
        out.push_str("  Golden hour now\n");
    } else if sun.is_in_blue_hour(now) {
        out.push_str("  Blue hour now\n");
    }
    if let Some((moment, at)) = sun.next_special_moment(now) {
        let _ = writeln!(out, "  Next: {} at {}", moment.name(), clock(at, offset));
    }
    out.trim_end().to_string()
}

pub fn wear(city: &str, rec: &ClothingRecommendation) -> String {
    let mut out = format!(
        "{city}: {} (feels like {:.1}°C)\n",
        rec.summary, rec.adjusted_temperature
    );
    let _ = writeln!(out, "  Top:         {}", join(&rec.upper_body));
    let _ = writeln!(out, "  Bottom:      {}", join(&rec.lower_body));
    let _ = writeln!(out, "  Shoes:       {}", rec.footwear.name());
    if !rec.accessories.is_empty() {
        let _ = writeln!(out, "  Accessories: {}", join(&rec.accessories));
    }
    for avoid in &rec.avoid_items {
        let _ = writeln!(out, "  {avoid}");
    }
    if let Some(material) = &rec.material_suggestion {
        let _ = writeln!(out, "  {material}");
    }
    for tip in &rec.tips {
        let _ = writeln!(out, "  Tip: {tip}");
    }
    out.trim_end().to_string()
}

pub fn trend(city: &str, series: &TrendSeries) -> String {
    if series.points.is_empty() {
        return format!("{city}: no {} data available", series.name.to_lowercase());
    }
    let (lo, hi) = value_range(series);
    let width = 30.0;
    let mut out = format!("{city}: {} ({})\n", series.name, series.unit);
    for point in &series.points {
        let filled = (((point.value - lo) / (hi - lo)) * width).round().clamp(0.0, width) as usize;
        let _ = writeln!(
            out,
            "  {:>5}  {:>6.1} {}",
            point.label,
            point.value,
            "#".repeat(filled)
        );
    }
    out.trim_end().to_string()
}

/// `held` marks alerts raised during quiet hours.
pub fn alerts(city: &str, alerts: &[WeatherAlert], held: bool) -> String {
    if alerts.is_empty() {
        return format!("{city}: no alerts");
    }
    let mut out = String::new();
    for alert in alerts {
        let _ = writeln!(out, "[{}] {}: {}", alert.kind, alert.title, alert.body);
    }
    if held {
        out.push_str("(quiet hours, notifications held until morning)\n");
    }
    out.trim_end().to_string()
}

pub fn cities(cities: &[City]) -> String {
    let mut out = String::new();
    for city in cities {
        let marker = if city.is_selected { "*" } else { " " };
        let _ = writeln!(
            out,
            "{marker} {:<28} {:>9.4} {:>9.4}",
            city.display_name(),
            city.latitude,
            city.longitude
        );
    }
    out.trim_end().to_string()
}

fn mebibytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

pub fn cache_info(dir: Option<&Path>, used: u64, quota: u64) -> String {
    match dir {
        Some(dir) => format!(
            "Cache: {}\n  {:.1} MiB of {:.0} MiB used",
            dir.display(),
            mebibytes(used),
            mebibytes(quota)
        ),
        None => "Cache: memory only (no cache directory available)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skycast_core::clothing::{ClothingInput, ColdSensitivity, Style, recommend};
    use skycast_core::{CompassDirection, WeatherCondition, city::default_cities};

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            city_name: "Shanghai".to_string(),
            temperature: 23.0,
            temperature_min: 18.0,
            temperature_max: 28.0,
            condition: WeatherCondition::PartlyCloudy,
            description: "Scattered Clouds".to_string(),
            humidity: 50.0,
            wind_speed: 8.0,
            wind_direction: CompassDirection::NorthEast,
            pressure: 1010.0,
            visibility: 10.0,
            uv_index: 6,
            precipitation: 20.0,
            feels_like: 25.0,
            observed_at: DateTime::from_timestamp(1_717_221_600, 0).unwrap(),
            utc_offset_secs: 8 * 3600,
            sunrise: Some(1_717_221_600),
            sunset: Some(1_717_221_600 + 12 * 3600),
            weekly_forecast: vec![],
            hourly_forecast: vec![],
        }
    }

    #[test]
    fn current_lists_the_headline_fields() {
        let text = current(&snapshot());
        assert!(text.starts_with("Shanghai"));
        assert!(text.contains("23°C"));
        assert!(text.contains("NE"));
        assert!(text.contains("UV 6 (High)"));
        assert!(text.contains("Comfortable weather today"));
    }

    #[test]
    fn empty_forecast_is_reported() {
        assert_eq!(daily(&snapshot()), "Shanghai: no forecast available");
    }

    #[test]
    fn sun_uses_local_clock() {
        let snap = snapshot();
        let sun_times = snap.sun_times().unwrap();
        let text = sun("Shanghai", &sun_times, snap.observed_at, snap.offset());
        // 06:00Z is 14:00 at UTC+8
        let sunrise = text
            .lines()
            .find(|l| l.trim_start().starts_with("Sunrise"))
            .unwrap();
        assert!(sunrise.ends_with("14:00"), "{sunrise}");
        assert!(text.contains("day length 12h 0m"));
    }

    #[test]
    fn wear_lists_garments() {
        let input =
            ClothingInput::from_snapshot(&snapshot(), Style::Casual, ColdSensitivity::Normal);
        let text = wear("Shanghai", &recommend(&input));
        assert!(text.contains("Top:         T-Shirt, Short Sleeve Shirt"));
        assert!(text.contains("Shoes:       Sneakers"));
    }

    #[test]
    fn held_alerts_are_flagged() {
        let alert = WeatherAlert {
            kind: skycast_core::alerts::AlertKind::UvIndex,
            title: "UV Alert".to_string(),
            body: "Shanghai UV index is 8, use sun protection".to_string(),
        };
        let text = alerts("Shanghai", std::slice::from_ref(&alert), true);
        assert!(text.starts_with("[UV Index] UV Alert: Shanghai UV index is 8"));
        assert!(text.ends_with("notifications held until morning)"));
        assert!(!alerts("Shanghai", &[alert], false).contains("quiet hours"));
        assert_eq!(alerts("Shanghai", &[], true), "Shanghai: no alerts");
    }

    #[test]
    fn cache_info_reports_usage_against_quota() {
        const MIB: u64 = 1024 * 1024;
        let text = cache_info(Some(Path::new("/tmp/skycast")), 3 * MIB / 2, 100 * MIB);
        assert_eq!(text, "Cache: /tmp/skycast\n  1.5 MiB of 100 MiB used");
        assert!(cache_info(None, 0, 1).contains("memory only"));
    }

    #[test]
    fn selected_city_is_marked() {
        let text = cities(&default_cities());
        assert!(text.lines().next().unwrap().starts_with("* Beijing"));
    }
}
