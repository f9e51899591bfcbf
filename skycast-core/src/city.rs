use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Coordinates;
use crate::wire::RawGeocodeResult;

/// A saved or searched location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: Uuid,
    pub name: String,
    /// Stable key for built-in cities, e.g. `city_beijing`.
    pub key: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub is_selected: bool,
}

impl City {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            key: None,
            latitude,
            longitude,
            is_selected: false,
        }
    }

    fn builtin(key: &str, name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            key: Some(key.to_string()),
            ..Self::new(name, latitude, longitude)
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn display_name(&self) -> &str {
        &self.name
    }
}

impl From<RawGeocodeResult> for City {
    fn from(result: RawGeocodeResult) -> Self {
        let name = match result.state {
            Some(state) if !state.is_empty() => format!("{}, {}", result.name, state),
            _ => result.name,
        };
        City::new(name, result.lat, result.lon)
    }
}

/// Cities offered before the user has searched for any; Beijing starts selected.
pub fn default_cities() -> Vec<City> {
    let mut cities = vec![
        City::builtin("city_beijing", "Beijing", 39.9042, 116.4074),
        City::builtin("city_shanghai", "Shanghai", 31.2304, 121.4737),
        City::builtin("city_guangzhou", "Guangzhou", 23.1291, 113.2644),
        City::builtin("city_shenzhen", "Shenzhen", 22.5431, 114.0579),
        City::builtin("city_hangzhou", "Hangzhou", 30.2741, 120.1551),
        City::builtin("city_chengdu", "Chengdu", 30.5728, 104.0668),
        City::builtin("city_xian", "Xi'an", 34.3416, 108.9398),
        City::builtin("city_nanjing", "Nanjing", 32.0603, 118.7969),
        City::builtin("city_wuhan", "Wuhan", 30.5928, 114.3055),
        City::builtin("city_tianjin", "Tianjin", 39.3434, 117.3616),
    ];
    cities[0].is_selected = true;
    cities
}

/// Mark `id` as the only selected city. Returns false, leaving the
/// collection untouched, when no city has that id.
pub fn select_city(cities: &mut [City], id: Uuid) -> bool {
    if !cities.iter().any(|c| c.id == id) {
        return false;
    }
    for city in cities.iter_mut() {
        city.is_selected = city.id == id;
    }
    true
}

pub fn selected_city(cities: &[City]) -> Option<&City> {
    cities.iter().find(|c| c.is_selected)
}

/// Case-insensitive match against names and built-in keys.
pub fn find_city<'a>(cities: &'a [City], query: &str) -> Option<&'a City> {
    let needle = query.trim().to_lowercase();
    cities.iter().find(|c| {
        c.name.to_lowercase() == needle
            || c.key.as_deref().is_some_and(|k| k.trim_start_matches("city_") == needle)
    })
}
