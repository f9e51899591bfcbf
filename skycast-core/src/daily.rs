use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate};

use crate::model::DailyForecast;
use crate::wire::RawForecastItem;

pub const MAX_FORECAST_DAYS: usize = 7;

/// Group 3-hour slots by local calendar day and summarize each day.
///
/// The day's condition is taken from its chronologically first slot, not
/// from a majority vote. Output is ordered by date and holds at most
/// [`MAX_FORECAST_DAYS`] entries.
pub fn aggregate_daily(
    items: &[RawForecastItem],
    offset: FixedOffset,
    today: NaiveDate,
) -> Vec<DailyForecast> {
    let mut groups: BTreeMap<NaiveDate, Vec<&RawForecastItem>> = BTreeMap::new();
    for item in items {
        if let Some(date) = item.local_date(offset) {
            groups.entry(date).or_default().push(item);
        }
    }

    groups
        .into_iter()
        .take(MAX_FORECAST_DAYS)
        .filter_map(|(date, mut entries)| {
            entries.sort_by_key(|e| e.dt);
            summarize_day(date, &entries, today)
        })
        .collect()
}

fn summarize_day(
    date: NaiveDate,
    entries: &[&RawForecastItem],
    today: NaiveDate,
) -> Option<DailyForecast> {
    let first = entries.first()?;

    let temperature_max = entries
        .iter()
        .map(|e| e.main.temp_max)
        .fold(f64::NEG_INFINITY, f64::max);
    let temperature_min = entries
        .iter()
        .map(|e| e.main.temp_min)
        .fold(f64::INFINITY, f64::min);
    let precipitation =
        entries.iter().map(|e| e.pop * 100.0).sum::<f64>() / entries.len() as f64;

    Some(DailyForecast {
        date,
        day_name: day_name(date, today),
        condition: first.condition(),
        temperature_max,
        // a slot reporting min above max must not break min <= max for the day
        temperature_min: temperature_min.min(temperature_max),
        precipitation,
    })
}

pub fn day_name(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%A").to_string(),
    }
}
