use std::fs::{self, File};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use skycast_core::cache::ResponseCache;
use tempfile::TempDir;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Reading {
    city: String,
    temp: f64,
}

fn reading(city: &str, temp: f64) -> Reading {
    Reading {
        city: city.to_string(),
        temp,
    }
}

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_717_214_400 + secs, 0).unwrap()
}

fn json_files(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

const MINUTE: Duration = Duration::from_secs(60);

#[test]
fn entries_survive_a_new_instance() {
    let dir = TempDir::new().unwrap();
    {
        let cache = ResponseCache::new(dir.path(), 1 << 20).unwrap();
        cache.set_at("weather_31.2_121.5", &reading("Shanghai", 23.0), MINUTE, at(0)).unwrap();
    }

    let reopened = ResponseCache::new(dir.path(), 1 << 20).unwrap();
    let hit: Option<Reading> = reopened.get_at("weather_31.2_121.5", at(30));
    assert_eq!(hit, Some(reading("Shanghai", 23.0)));
}

#[test]
fn expired_entry_is_removed_from_disk() {
    let dir = TempDir::new().unwrap();
    let cache = ResponseCache::new(dir.path(), 1 << 20).unwrap();
    cache.set_at("weather_a", &reading("A", 1.0), MINUTE, at(0)).unwrap();
    assert_eq!(json_files(&dir).len(), 1);

    assert!(cache.get_at::<Reading>("weather_a", at(60)).is_some());
    assert_eq!(cache.get_at::<Reading>("weather_a", at(61)), None);
    assert!(json_files(&dir).is_empty());
}

#[test]
fn overwrite_replaces_value_on_disk() {
    let dir = TempDir::new().unwrap();
    let cache = ResponseCache::new(dir.path(), 1 << 20).unwrap();
    cache.set_at("k", &reading("A", 1.0), MINUTE, at(0)).unwrap();
    cache.set_at("k", &reading("A", 2.0), MINUTE, at(10)).unwrap();

    let reopened = ResponseCache::new(dir.path(), 1 << 20).unwrap();
    assert_eq!(
        reopened.get_at::<Reading>("k", at(20)),
        Some(reading("A", 2.0))
    );
    assert_eq!(json_files(&dir).len(), 1);
}

#[test]
fn keys_are_safe_file_names() {
    let dir = TempDir::new().unwrap();
    let cache = ResponseCache::new(dir.path(), 1 << 20).unwrap();
    cache.set_at("search_new york/ny", &reading("New York", 15.0), MINUTE, at(0)).unwrap();

    assert_eq!(
        json_files(&dir),
        vec!["search_new%20york%2Fny.json".to_string()]
    );
    let reopened = ResponseCache::new(dir.path(), 1 << 20).unwrap();
    assert_eq!(
        reopened.get_at::<Reading>("search_new york/ny", at(1)),
        Some(reading("New York", 15.0))
    );
}

#[test]
fn disk_is_trimmed_oldest_first() {
    let dir = TempDir::new().unwrap();
    let sizing = ResponseCache::new(dir.path(), u64::MAX).unwrap();
    sizing.set_at("entry_0", &reading("C", 0.0), MINUTE, at(0)).unwrap();
    let entry_size = sizing.disk_usage().unwrap();
    sizing.clear().unwrap();

    // room for three entries; the fourth pushes usage over the quota
    let quota = entry_size * 3 + entry_size / 2;
    let cache = ResponseCache::new(dir.path(), quota).unwrap();
    let base = SystemTime::now() - Duration::from_secs(3600);
    for i in 0..3u64 {
        let key = format!("entry_{i}");
        cache.set_at(&key, &reading("C", i as f64), MINUTE, at(0)).unwrap();
        File::options()
            .write(true)
            .open(dir.path().join(format!("{key}.json")))
            .unwrap()
            .set_modified(base + Duration::from_secs(i * 60))
            .unwrap();
    }
    cache.set_at("entry_3", &reading("C", 3.0), MINUTE, at(0)).unwrap();

    assert!(cache.disk_usage().unwrap() <= quota / 100 * 80);
    let files = json_files(&dir);
    assert!(!files.contains(&"entry_0.json".to_string()));
    assert!(files.contains(&"entry_3.json".to_string()));
    assert_eq!(cache.get_at::<Reading>("entry_0", at(1)), None);
}

#[test]
fn opening_sweeps_expired_files() {
    let dir = TempDir::new().unwrap();
    {
        let cache = ResponseCache::new(dir.path(), 1 << 20).unwrap();
        let recent = Utc::now() - TimeDelta::minutes(5);
        cache.set_at("weather_old", &reading("Old", 1.0), MINUTE, at(0)).unwrap();
        cache.set_at("weather_fresh", &reading("Fresh", 2.0), MINUTE * 60, recent).unwrap();
    }
    assert_eq!(json_files(&dir).len(), 2);

    let reopened = ResponseCache::open(dir.path(), 1 << 20).unwrap();
    assert_eq!(json_files(&dir), vec!["weather_fresh.json".to_string()]);
    assert_eq!(
        reopened.get::<Reading>("weather_fresh"),
        Some(reading("Fresh", 2.0))
    );
}

#[test]
fn purge_counts_expired_files() {
    let dir = TempDir::new().unwrap();
    let cache = ResponseCache::new(dir.path(), 1 << 20).unwrap();
    cache.set_at("short_1", &reading("A", 1.0), MINUTE, at(0)).unwrap();
    cache.set_at("short_2", &reading("B", 2.0), MINUTE, at(0)).unwrap();
    cache.set_at("long", &reading("C", 3.0), MINUTE * 60, at(0)).unwrap();
    fs::write(dir.path().join("garbage.json"), b"not json").unwrap();

    assert_eq!(cache.purge_expired(at(120)).unwrap(), 3);
    assert_eq!(json_files(&dir), vec!["long.json".to_string()]);
    assert_eq!(
        cache.get_at::<Reading>("long", at(120)),
        Some(reading("C", 3.0))
    );
}

#[test]
fn clear_empties_both_layers() {
    let dir = TempDir::new().unwrap();
    let cache = ResponseCache::new(dir.path(), 1 << 20).unwrap();
    cache.set_at("a", &reading("A", 1.0), MINUTE, at(0)).unwrap();
    cache.set_at("b", &reading("B", 2.0), MINUTE, at(0)).unwrap();

    cache.clear().unwrap();
    assert_eq!(cache.disk_usage().unwrap(), 0);
    assert_eq!(cache.get_at::<Reading>("a", at(1)), None);
}

#[test]
fn unreadable_file_is_a_miss() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.json"), b"{").unwrap();

    let cache = ResponseCache::new(dir.path(), 1 << 20).unwrap();
    assert_eq!(cache.get_at::<Reading>("broken", at(0)), None);
    assert!(json_files(&dir).is_empty());
}
