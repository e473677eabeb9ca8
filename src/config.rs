use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;

/// Page sizes offered by the pagination control.
pub const PAGE_LIMITS: [u32; 4] = [5, 8, 10, 20];

#[derive(Debug, Clone)]
pub struct Config {
    pub query_latency_ms: u64,
    pub update_latency_ms: u64,
    pub latency_jitter_ms: u64,
    pub search_debounce_ms: u64,
    pub stale_time_secs: u64,
    pub cache_gc_secs: u64,
    pub query_retry: u32,
    pub default_page_limit: u32,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Default for Config {
    fn default() -> Self {
        Self {
            query_latency_ms: 600,
            update_latency_ms: 400,
            latency_jitter_ms: 0,
            search_debounce_ms: 400,
            stale_time_secs: 30,
            cache_gc_secs: 300,
            query_retry: 2,
            default_page_limit: 8,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let defaults = Self::default();

        let config = Self {
            query_latency_ms: get_env_parse_or("QUERY_LATENCY_MS", defaults.query_latency_ms)?,
            update_latency_ms: get_env_parse_or("UPDATE_LATENCY_MS", defaults.update_latency_ms)?,
            latency_jitter_ms: get_env_parse_or("LATENCY_JITTER_MS", defaults.latency_jitter_ms)?,
            search_debounce_ms: get_env_parse_or(
                "SEARCH_DEBOUNCE_MS",
                defaults.search_debounce_ms,
            )?,
            stale_time_secs: get_env_parse_or("STALE_TIME_SECS", defaults.stale_time_secs)?,
            cache_gc_secs: get_env_parse_or("CACHE_GC_SECS", defaults.cache_gc_secs)?,
            query_retry: get_env_parse_or("QUERY_RETRY", defaults.query_retry)?,
            default_page_limit: get_env_parse_or(
                "DEFAULT_PAGE_LIMIT",
                defaults.default_page_limit,
            )?,
        };

        if !PAGE_LIMITS.contains(&config.default_page_limit) {
            return Err(Error::Config(format!(
                "DEFAULT_PAGE_LIMIT must be one of {:?}, got {}",
                PAGE_LIMITS, config.default_page_limit
            )));
        }

        Ok(config)
    }

    pub fn query_latency(&self) -> Duration {
        Duration::from_millis(self.query_latency_ms)
    }

    pub fn update_latency(&self) -> Duration {
        Duration::from_millis(self.update_latency_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    pub fn cache_gc_time(&self) -> Duration {
        Duration::from_secs(self.cache_gc_secs)
    }
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
