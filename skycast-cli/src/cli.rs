use anyhow::{Context, anyhow};
use chrono::{DateTime, Timelike, Utc};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, Text};
use skycast_core::{
    Config, ProviderId, WeatherService, WeatherSnapshot,
    alerts::{AlertThreshold, QuietHours, evaluate_alerts},
    cache::ResponseCache,
    city::{default_cities, find_city, selected_city},
    clothing::{ClothingInput, ColdSensitivity, Style, recommend},
    trend::{TrendMetric, TrendRange, build_trend},
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather, clothing advice and sun times")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "openweather" or "proxy".
        provider: String,
    },

    /// Show current conditions.
    Show {
        /// City name; defaults to the configured or selected city.
        city: Option<String>,
    },

    /// Show the daily forecast.
    Daily { city: Option<String> },

    /// Show sunrise, sunset, golden and blue hours.
    Sun { city: Option<String> },

    /// Suggest what to wear.
    Wear {
        city: Option<String>,

        /// casual, formal or sporty; defaults to the configured preference.
        #[arg(long, value_parser = parse_style)]
        style: Option<Style>,

        /// 1-5 or very-cold, cold, normal, warm, very-warm.
        #[arg(long, value_parser = parse_sensitivity)]
        sensitivity: Option<ColdSensitivity>,
    },

    /// Chart a forecast metric.
    Trend {
        city: Option<String>,

        #[arg(long, default_value = "temperature", value_parser = parse_metric)]
        metric: TrendMetric,

        #[arg(long, default_value = "24h", value_parser = parse_range)]
        range: TrendRange,
    },

    /// Check the default alert thresholds.
    Alerts { city: Option<String> },

    /// Search cities by name.
    Search { query: String },

    /// List built-in cities.
    Cities,

    /// Inspect or empty the response cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum CacheAction {
    /// Show where the cache lives and how much disk it uses.
    Info,
    /// Delete every cached response.
    Clear,
}

fn parse_style(s: &str) -> anyhow::Result<Style> {
    Style::try_from(s)
}

fn parse_sensitivity(s: &str) -> anyhow::Result<ColdSensitivity> {
    ColdSensitivity::try_from(s)
}

fn parse_metric(s: &str) -> anyhow::Result<TrendMetric> {
    TrendMetric::try_from(s)
}

fn parse_range(s: &str) -> anyhow::Result<TrendRange> {
    TrendRange::try_from(s)
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure { provider } => {
                let id = ProviderId::try_from(provider.as_str())?;
                configure(&mut config, id)
            }
            Command::Cities => {
                println!("{}", render::cities(&default_cities()));
                Ok(())
            }
            Command::Cache { action } => manage_cache(&config, action),
            command => {
                config.apply_env();
                let service = WeatherService::from_config(&config)?;
                report(command, &service, &config).await
            }
        }
    }
}

async fn report(command: Command, service: &WeatherService, config: &Config) -> anyhow::Result<()> {
    let now = Utc::now();

    match command {
        Command::Show { city } => {
            let snap = fetch(service, config, city.as_deref(), now).await?;
            println!("{}", render::current(&snap));
        }
        Command::Daily { city } => {
            let snap = fetch(service, config, city.as_deref(), now).await?;
            println!("{}", render::daily(&snap));
        }
        Command::Sun { city } => {
            let snap = fetch(service, config, city.as_deref(), now).await?;
            let sun = snap
                .sun_times()
                .ok_or_else(|| anyhow!("No sunrise/sunset for {} today", snap.city_name))?;
            println!("{}", render::sun(&snap.city_name, &sun, now, snap.offset()));
        }
        Command::Wear { city, style, sensitivity } => {
            let snap = fetch(service, config, city.as_deref(), now).await?;
            let input = ClothingInput::from_snapshot(
                &snap,
                style.unwrap_or(config.preferences.style),
                sensitivity.unwrap_or(config.preferences.cold_sensitivity),
            );
            println!("{}", render::wear(&snap.city_name, &recommend(&input)));
        }
        Command::Trend { city, metric, range } => {
            let snap = fetch(service, config, city.as_deref(), now).await?;
            let series = build_trend(&snap.hourly_forecast, metric, range, now, snap.offset());
            println!("{}", render::trend(&snap.city_name, &series));
        }
        Command::Alerts { city } => {
            let snap = fetch(service, config, city.as_deref(), now).await?;
            let alerts = evaluate_alerts(&snap, &AlertThreshold::defaults());
            let local = now.with_timezone(&snap.offset());
            let minute = (local.hour() * 60 + local.minute()) as u16;
            let held = QuietHours::default().contains(minute);
            println!("{}", render::alerts(&snap.city_name, &alerts, held));
        }
        Command::Search { query } => {
            let cities = service.search_cities(&query).await?;
            if cities.is_empty() {
                println!("No cities match '{query}'");
            } else {
                println!("{}", render::cities(&cities));
            }
        }
        Command::Configure { .. } | Command::Cities | Command::Cache { .. } => {}
    }

    Ok(())
}

/// Built-in cities are fetched by coordinates; anything else is geocoded.
async fn fetch(
    service: &WeatherService,
    config: &Config,
    city: Option<&str>,
    now: DateTime<Utc>,
) -> anyhow::Result<WeatherSnapshot> {
    let builtin = default_cities();
    let name = match city.or(config.default_city.as_deref()) {
        Some(name) => name.to_string(),
        None => selected_city(&builtin)
            .map(|c| c.display_name().to_string())
            .ok_or_else(|| anyhow!("No city given and none selected"))?,
    };

    let snapshot = match find_city(&builtin, &name) {
        Some(known) => {
            tracing::debug!(city = %known.name, "using built-in coordinates");
            service.snapshot_for(known, now).await
        }
        None => {
            tracing::debug!(city = %name, "geocoding city");
            service.snapshot_for_city(&name, now).await
        }
    };
    snapshot.with_context(|| format!("Failed to get weather for '{name}'"))
}

fn manage_cache(config: &Config, action: CacheAction) -> anyhow::Result<()> {
    let cache = ResponseCache::open_default(config.cache.max_disk_bytes);

    match action {
        CacheAction::Info => {
            let used = cache.disk_usage().context("Failed to measure cache size")?;
            let quota = config.cache.max_disk_bytes;
            println!("{}", render::cache_info(cache.dir(), used, quota));
        }
        CacheAction::Clear => {
            cache.clear().context("Failed to clear cache")?;
            println!("Cache cleared");
        }
    }
    Ok(())
}

fn configure(config: &mut Config, id: ProviderId) -> anyhow::Result<()> {
    match id {
        ProviderId::OpenWeather => {
            let key = Password::new("OpenWeatherMap API key:")
                .without_confirmation()
                .prompt()
                .context("Failed to read API key")?;
            config.upsert_provider_api_key(id, key.trim().to_string());
        }
        ProviderId::Proxy => {
            let url = Text::new("Proxy base URL:")
                .with_placeholder("https://weather-proxy.example.com")
                .prompt()
                .context("Failed to read proxy URL")?;
            config.upsert_provider_base_url(id, url.trim().to_string());
        }
    }

    if config.default_provider_id().ok() != Some(id) {
        let make_default = Confirm::new(&format!("Use {id} as the default provider?"))
            .with_default(true)
            .prompt()
            .context("Failed to read answer")?;
        if make_default {
            config.set_default_provider(id);
        }
    }

    if config.default_city.is_none() {
        let city = Text::new("Default city (leave empty for Beijing):")
            .prompt()
            .context("Failed to read city")?;
        let city = city.trim();
        if !city.is_empty() {
            config.default_city = Some(city.to_string());
        }
    }

    config.save()?;
    println!("Saved {}", Config::config_file_path()?.display());
    Ok(())
}
