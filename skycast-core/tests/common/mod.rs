#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

/// 2024-06-01T04:00:00Z, noon in Shanghai.
pub const NOW: i64 = 1_717_214_400;
pub const SHANGHAI_OFFSET: i32 = 8 * 3600;

pub fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(NOW, 0).unwrap()
}

pub fn current_payload() -> Value {
    json!({
        "coord": {"lon": 121.4737, "lat": 31.2304},
        "weather": [
            {"id": 802, "main": "Clouds", "description": "scattered clouds", "icon": "03d"}
        ],
        "base": "stations",
        "main": {
            "temp": 23.0, "feels_like": 23.4, "temp_min": 21.9, "temp_max": 24.1,
            "pressure": 1009, "humidity": 68, "sea_level": 1009, "grnd_level": 1008
        },
        "visibility": 10000,
        "wind": {"speed": 4.0, "deg": 140, "gust": 6.1},
        "clouds": {"all": 40},
        "dt": NOW,
        "sys": {
            "type": 2, "id": 2011791, "country": "CN",
            "sunrise": 1_717_190_040, "sunset": 1_717_240_980
        },
        "timezone": SHANGHAI_OFFSET,
        "id": 1796236,
        "name": "Shanghai",
        "cod": 200
    })
}

fn slot(dt: i64, temp: f64, main: &str, pop: f64) -> Value {
    json!({
        "dt": dt,
        "main": {
            "temp": temp, "feels_like": temp, "temp_min": temp, "temp_max": temp,
            "pressure": 1010, "humidity": 70
        },
        "weather": [{"id": 800, "main": main, "description": main.to_lowercase(), "icon": "01d"}],
        "clouds": {"all": 10},
        "wind": {"speed": 3.0, "deg": 90},
        "visibility": 10000,
        "pop": pop,
        "dt_txt": DateTime::from_timestamp(dt, 0).unwrap().format("%Y-%m-%d %H:%M:%S").to_string()
    })
}

/// Four slots later today (local time) at 19/22/25/24 °C, two just after
/// local midnight and one two days out.
pub fn forecast_payload() -> Value {
    json!({
        "cod": "200",
        "cnt": 7,
        "list": [
            slot(1_717_218_000, 19.0, "Clear", 0.1),
            slot(1_717_228_800, 22.0, "Clouds", 0.0),
            slot(1_717_239_600, 25.0, "Clouds", 0.2),
            slot(1_717_250_400, 24.0, "Rain", 0.5),
            slot(1_717_261_200, 18.0, "Clear", 0.0),
            slot(1_717_272_000, 17.0, "Clear", 0.0),
            slot(1_717_380_000, 27.0, "Rain", 0.8),
        ],
        "city": {
            "id": 1796236, "name": "Shanghai",
            "coord": {"lat": 31.2304, "lon": 121.4737},
            "country": "CN", "timezone": SHANGHAI_OFFSET,
            "sunrise": 1_717_190_040, "sunset": 1_717_240_980
        }
    })
}

pub fn geocode_payload() -> Value {
    json!([
        {
            "name": "Springfield",
            "local_names": {"en": "Springfield"},
            "lat": 39.7990, "lon": -89.6440,
            "country": "US", "state": "Illinois"
        },
        {
            "name": "Springfield",
            "lat": 37.2090, "lon": -93.2923,
            "country": "US", "state": "Missouri"
        }
    ])
}
