//! Core library for the `skycast` CLI.
//!
//! This crate defines:
//! - Provider payload decoding and normalization into [`WeatherSnapshot`]
//! - Daily aggregation, sun windows, clothing advice, trend series and alerts
//! - Provider clients with retry and a two-layer response cache
//! - Configuration & credentials handling
//!
//! The derivation modules are pure: every function that depends on the
//! current time takes it as an argument.

pub mod alerts;
pub mod cache;
pub mod city;
pub mod clothing;
pub mod config;
pub mod daily;
pub mod error;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod retry;
pub mod service;
pub mod sun;
pub mod trend;
pub mod wire;

pub use city::City;
pub use config::{Config, Preferences, ProviderConfig};
pub use error::WeatherError;
pub use model::{CompassDirection, Coordinates, DailyForecast, WeatherCondition, WeatherSnapshot};
pub use provider::{ProviderId, WeatherProvider};
pub use service::WeatherService;
pub use sun::{SpecialMoment, SunTimes};
