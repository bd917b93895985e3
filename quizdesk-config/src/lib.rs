use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Pre-compiled regex for hostname validation (compiled once at first use)
static HOSTNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][-a-zA-Z0-9\.]*[a-zA-Z0-9]$").unwrap());

#[derive(Debug, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: Option<ServerSection>,
    #[serde(default)]
    pub logging: Option<LoggingSection>,
    #[serde(default)]
    pub database: Option<DatabaseSection>,
    #[serde(default)]
    pub openai: Option<OpenAiSection>,
    #[serde(default)]
    pub explanations: Option<ExplanationsSection>,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub json: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSection {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub max_connections: Option<u32>,
    #[serde(default)]
    pub fallback_to_memory: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAiSection {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ExplanationsSection {
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub retry_delay_base_ms: Option<u64>,
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Load a RawConfigFile from a path. The format is inferred from the extension: .toml, .yaml/.yml, .json
pub fn load_raw_from_file<P: AsRef<Path>>(path: P) -> Result<RawConfigFile, ConfigError> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    parse_config_str(&s, ext.as_deref())
}

#[inline]
fn parse_config_str(s: &str, ext: Option<&str>) -> Result<RawConfigFile, ConfigError> {
    match ext {
        #[cfg(feature = "toml")]
        Some("toml") => toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string())),
        #[cfg(feature = "yaml")]
        Some("yaml" | "yml") => {
            serde_yaml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
        }
        #[cfg(feature = "json")]
        Some("json") => serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string())),
        _ => parse_config_auto(s),
    }
}

/// Try each enabled format in turn.
#[inline]
fn parse_config_auto(s: &str) -> Result<RawConfigFile, ConfigError> {
    #[cfg(feature = "json")]
    if let Ok(cfg) = serde_json::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(feature = "toml")]
    if let Ok(cfg) = toml::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(feature = "yaml")]
    if let Ok(cfg) = serde_yaml::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(any(feature = "yaml", feature = "toml", feature = "json"))]
    {
        Err(ConfigError::Parse(
            "failed to parse config as any supported format".into(),
        ))
    }

    #[cfg(not(any(feature = "yaml", feature = "toml", feature = "json")))]
    {
        let _ = s;
        Err(ConfigError::Parse("no config format enabled".into()))
    }
}

/// Concrete application configuration with defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub openai: OpenAiConfig,
    pub explanations: ExplanationsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Serve from process memory when the database cannot be opened.
    pub fallback_to_memory: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenAiConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplanationsConfig {
    pub max_retries: u32,
    pub retry_delay_base_ms: u64,
    pub batch_size: usize,
    pub subject: String,
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 6100,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
            database: DatabaseConfig {
                url: "sqlite://quizdesk.sqlite".to_string(),
                max_connections: 5,
                fallback_to_memory: true,
            },
            openai: OpenAiConfig {
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o-mini".to_string(),
                temperature: 0.3,
                timeout_secs: 60,
            },
            explanations: ExplanationsConfig {
                max_retries: 3,
                retry_delay_base_ms: 5_000,
                batch_size: 3,
                subject: "reading comprehension".to_string(),
                level: "high school".to_string(),
            },
        }
    }
}

#[inline]
fn parse_bool(s: &str) -> Result<bool, ()> {
    match s.as_bytes() {
        b"1" | b"true" | b"TRUE" | b"True" | b"yes" | b"YES" | b"Yes" | b"y" | b"Y" => Ok(true),
        b"0" | b"false" | b"FALSE" | b"False" | b"no" | b"NO" | b"No" | b"n" | b"N" => Ok(false),
        _ => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" => Ok(true),
            "false" | "no" | "n" => Ok(false),
            _ => Err(()),
        },
    }
}

/// Helper macro to apply optional value if present
macro_rules! apply_opt {
    ($target:expr, $source:expr) => {
        if let Some(v) = $source {
            $target = v;
        }
    };
    ($target:expr, $source:expr, wrap) => {
        if let Some(v) = $source {
            $target = Some(v);
        }
    };
}

/// Load concrete `Config` from optional file and environment variables.
/// Environment variables take precedence over file values and defaults.
pub fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<Config, ConfigError> {
    let mut cfg = Config::default();

    if let Some(p) = path {
        apply_file(&mut cfg, load_raw_from_file(p)?);
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

fn apply_file(cfg: &mut Config, raw: RawConfigFile) {
    if let Some(server) = raw.server {
        apply_opt!(cfg.server.host, server.host);
        apply_opt!(cfg.server.port, server.port);
    }
    if let Some(logging) = raw.logging {
        apply_opt!(cfg.logging.level, logging.level);
        apply_opt!(cfg.logging.json, logging.json);
    }
    if let Some(db) = raw.database {
        apply_opt!(cfg.database.url, db.url);
        apply_opt!(cfg.database.max_connections, db.max_connections);
        apply_opt!(cfg.database.fallback_to_memory, db.fallback_to_memory);
    }
    if let Some(openai) = raw.openai {
        apply_opt!(cfg.openai.api_key, openai.api_key, wrap);
        apply_opt!(cfg.openai.base_url, openai.base_url);
        apply_opt!(cfg.openai.model, openai.model);
        apply_opt!(cfg.openai.temperature, openai.temperature);
        apply_opt!(cfg.openai.timeout_secs, openai.timeout_secs);
    }
    if let Some(ex) = raw.explanations {
        apply_opt!(cfg.explanations.max_retries, ex.max_retries);
        apply_opt!(cfg.explanations.retry_delay_base_ms, ex.retry_delay_base_ms);
        apply_opt!(cfg.explanations.batch_size, ex.batch_size);
        apply_opt!(cfg.explanations.subject, ex.subject);
        apply_opt!(cfg.explanations.level, ex.level);
    }
}

#[inline]
fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Parse(format!("invalid {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

#[inline]
fn env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match env::var(key) {
        Ok(v) => parse_bool(v.trim())
            .map(Some)
            .map_err(|_| ConfigError::Parse(format!("invalid {}", key))),
        Err(_) => Ok(None),
    }
}

/// Non-empty env var as a string.
#[inline]
fn env_str(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn apply_env_overrides(cfg: &mut Config) -> Result<(), ConfigError> {
    // Server
    if let Some(v) = env_str("QUIZDESK_SERVER_HOST") {
        cfg.server.host = v;
    }
    if let Some(v) = env_parse::<u16>("QUIZDESK_SERVER_PORT")? {
        cfg.server.port = v;
    }

    // Logging
    if let Some(v) = env_str("QUIZDESK_LOG_LEVEL") {
        cfg.logging.level = v;
    }
    if let Some(v) = env_bool("QUIZDESK_LOG_JSON")? {
        cfg.logging.json = v;
    }

    // Database
    if let Some(v) = env_str("QUIZDESK_DATABASE_URL") {
        cfg.database.url = v;
    }
    if let Some(v) = env_parse::<u32>("QUIZDESK_DATABASE_MAX_CONNECTIONS")? {
        cfg.database.max_connections = v;
    }
    if let Some(v) = env_bool("QUIZDESK_DATABASE_FALLBACK_TO_MEMORY")? {
        cfg.database.fallback_to_memory = v;
    }

    // OpenAI; the prefixed key wins over the conventional one
    if let Some(v) = env_str("QUIZDESK_OPENAI_API_KEY").or_else(|| env_str("OPENAI_API_KEY")) {
        cfg.openai.api_key = Some(v);
    }
    if let Some(v) = env_str("QUIZDESK_OPENAI_BASE_URL") {
        cfg.openai.base_url = v;
    }
    if let Some(v) = env_str("QUIZDESK_OPENAI_MODEL") {
        cfg.openai.model = v;
    }
    if let Some(v) = env_parse::<f32>("QUIZDESK_OPENAI_TEMPERATURE")? {
        cfg.openai.temperature = v;
    }
    if let Some(v) = env_parse::<u64>("QUIZDESK_OPENAI_TIMEOUT_SECS")? {
        cfg.openai.timeout_secs = v;
    }

    // Explanation queue
    if let Some(v) = env_parse::<u32>("QUIZDESK_EXPLANATIONS_MAX_RETRIES")? {
        cfg.explanations.max_retries = v;
    }
    if let Some(v) = env_parse::<u64>("QUIZDESK_EXPLANATIONS_RETRY_DELAY_BASE_MS")? {
        cfg.explanations.retry_delay_base_ms = v;
    }
    if let Some(v) = env_parse::<usize>("QUIZDESK_EXPLANATIONS_BATCH_SIZE")? {
        cfg.explanations.batch_size = v;
    }
    if let Some(v) = env_str("QUIZDESK_EXPLANATIONS_SUBJECT") {
        cfg.explanations.subject = v;
    }
    if let Some(v) = env_str("QUIZDESK_EXPLANATIONS_LEVEL") {
        cfg.explanations.level = v;
    }

    Ok(())
}

/// Validate higher-level constraints on the resolved configuration.
pub fn validate_config(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.server.port == 0 {
        return Err(ConfigError::Validation("server.port must be > 0".into()));
    }
    let host_ok = cfg.server.host.parse::<std::net::IpAddr>().is_ok()
        || HOSTNAME_REGEX.is_match(&cfg.server.host);
    if !host_ok {
        return Err(ConfigError::Validation(format!(
            "invalid server.host: {}",
            cfg.server.host
        )));
    }

    if !cfg.database.url.starts_with("sqlite:") {
        return Err(ConfigError::Validation(format!(
            "database.url must be a sqlite URL: {}",
            cfg.database.url
        )));
    }
    if cfg.database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be > 0".into(),
        ));
    }

    match url::Url::parse(&cfg.openai.base_url) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => {}
        Ok(_) => {
            return Err(ConfigError::Validation(format!(
                "openai.base_url must be http or https: {}",
                cfg.openai.base_url
            )))
        }
        Err(_) => {
            return Err(ConfigError::Validation(format!(
                "invalid openai.base_url: {}",
                cfg.openai.base_url
            )))
        }
    }
    if cfg.openai.model.trim().is_empty() {
        return Err(ConfigError::Validation("openai.model must be set".into()));
    }
    if !(0.0..=2.0).contains(&cfg.openai.temperature) {
        return Err(ConfigError::Validation(format!(
            "openai.temperature must be within 0.0..=2.0, got {}",
            cfg.openai.temperature
        )));
    }
    if cfg.openai.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "openai.timeout_secs must be > 0".into(),
        ));
    }

    if cfg.explanations.batch_size == 0 {
        return Err(ConfigError::Validation(
            "explanations.batch_size must be > 0".into(),
        ));
    }
    Ok(())
}
