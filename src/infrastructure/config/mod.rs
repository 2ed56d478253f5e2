use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    pub cors_allowed_origin: Option<String>,
    // TTS provider
    pub tts_api_url: String,
    pub tts_api_key: String,
    pub tts_user_id: String,
    pub tts_model: String,
    pub tts_max_chunk_size: usize,
    pub tts_request_timeout_secs: u64,
    // TTS Cache
    pub tts_cache_enabled: bool,
    pub tts_cache_capacity: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

pub const DEFAULT_TTS_API_URL: &str = "https://api.play.ai/api/v1";
pub const DEFAULT_TTS_MODEL: &str = "PlayDialog";
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 15_000;

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let environment = match env::var("ENVIRONMENT").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };
        let log_format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 8080)?,
            environment,
            log_format,
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN").ok(),
            tts_api_url: env::var("TTS_API_URL").unwrap_or_else(|_| DEFAULT_TTS_API_URL.to_string()),
            tts_api_key: required_var("TTS_API_KEY")?,
            tts_user_id: required_var("TTS_USER_ID")?,
            tts_model: env::var("TTS_MODEL").unwrap_or_else(|_| DEFAULT_TTS_MODEL.to_string()),
            tts_max_chunk_size: non_zero(
                "TTS_MAX_CHUNK_SIZE",
                parse_var("TTS_MAX_CHUNK_SIZE", DEFAULT_MAX_CHUNK_SIZE)?,
            )?,
            tts_request_timeout_secs: non_zero(
                "TTS_REQUEST_TIMEOUT_SECS",
                parse_var("TTS_REQUEST_TIMEOUT_SECS", 60)?,
            )?,
            tts_cache_enabled: env::var("TTS_CACHE_ENABLED")
                .map(|s| !s.eq_ignore_ascii_case("false"))
                .unwrap_or(true),
            tts_cache_capacity: parse_var("TTS_CACHE_CAPACITY", 100)?,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Whether the provider credentials look usable
    pub fn is_tts_configured(&self) -> bool {
        !self.tts_api_key.is_empty() && !self.tts_user_id.is_empty()
    }
}

fn required_var(key: &str) -> Result<String, Box<dyn std::error::Error>> {
    env::var(key).map_err(|_| format!("{} must be set", key).into())
}

/// Parse `key` when set, otherwise use `default`
fn parse_var<T>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| format!("Invalid {}: {}", key, e).into()),
        Err(_) => Ok(default),
    }
}

fn non_zero<T>(key: &str, value: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: Default + PartialEq,
{
    if value == T::default() {
        return Err(format!("{} must be greater than zero", key).into());
    }
    Ok(value)
}
