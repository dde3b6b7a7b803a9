use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub geocoding: GeocodingSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_jobs_table")]
    pub jobs_table: String,
    #[serde(default = "default_workers_table")]
    pub workers_table: String,
    /// Rows per request when paging through candidates
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_jobs_table() -> String { "jobs".to_string() }
fn default_workers_table() -> String { "worker_profiles".to_string() }
fn default_page_size() -> usize { 500 }

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingSettings {
    /// Nominatim-compatible base URL; geocoding is disabled when unset
    pub endpoint: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_geocode_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            user_agent: default_user_agent(),
            timeout_secs: default_geocode_timeout_secs(),
        }
    }
}

impl GeocodingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_user_agent() -> String { crate::services::nominatim::DEFAULT_USER_AGENT.to_string() }
fn default_geocode_timeout_secs() -> u64 { 5 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub redis_url: Option<String>,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_l1_cache_size")]
    pub l1_cache_size: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            redis_url: None,
            ttl_secs: default_cache_ttl_secs(),
            l1_cache_size: default_l1_cache_size(),
        }
    }
}

fn default_cache_ttl_secs() -> u64 { 86_400 }
fn default_l1_cache_size() -> u64 { 10_000 }

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_limit() -> u16 { 20 }
fn default_max_limit() -> u16 { 100 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration files (config/default, then config/local)
    /// 3. Environment variables (prefixed with KAZI__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., KAZI__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("KAZI")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply the conventional Supabase variables on top of the loaded config
///
/// `SUPABASE_URL` and `SUPABASE_SERVICE_KEY` are what hosting platforms
/// usually inject; they win over files but lose to explicit `KAZI__` keys.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let url = env::var("KAZI__SUPABASE__URL").or_else(|_| env::var("SUPABASE_URL")).ok();
    let api_key = env::var("KAZI__SUPABASE__API_KEY")
        .or_else(|_| env::var("SUPABASE_SERVICE_KEY"))
        .ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(url) = url {
        builder = builder.set_override("supabase.url", url)?;
    }
    if let Some(api_key) = api_key {
        builder = builder.set_override("supabase.api_key", api_key)?;
    }

    builder.build()
}
