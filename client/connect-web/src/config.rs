/// Configuration for the connect-two client
///
/// Loads configuration from environment variables, after reading a `.env`
/// file if one exists.
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Remote API
    pub api: ApiConfig,
    /// Reverse geocoding provider
    pub geocoder: GeocoderConfig,
    /// Map surface
    pub map: MapConfig,
}

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, production)
    pub env: String,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the remote API, without trailing slash
    pub base_url: String,
    /// Transport timeout for every request
    pub timeout: Duration,
    /// Token of a previous session to resume at start-up
    pub session_token: Option<SecretString>,
}

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub api_key: SecretString,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct MapConfig {
    /// Flag image CDN
    pub flag_cdn_url: String,
    /// Click radius, in degrees, used when the surface does no hit testing
    pub hit_tolerance_deg: f64,
}

// Default values
fn default_timeout_secs() -> u64 {
    30
}

/// Parses `HIT_TOLERANCE_DEG`. Must be a finite, non-negative number of degrees.
fn parse_hit_tolerance(raw: Option<String>) -> Result<f64> {
    let Some(raw) = raw else {
        return Ok(crate::home::DEFAULT_HIT_TOLERANCE_DEG);
    };
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("HIT_TOLERANCE_DEG is not a number: {:?}", raw))?;
    if !value.is_finite() || value < 0.0 {
        anyhow::bail!("HIT_TOLERANCE_DEG must be a finite, non-negative number, got {}", value);
    }
    Ok(value)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let timeout = Duration::from_secs(
            std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_timeout_secs),
        );

        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        };

        let api = ApiConfig {
            base_url: std::env::var("API_URL")
                .context("API_URL environment variable not set")?
                .trim_end_matches('/')
                .to_string(),
            timeout,
            session_token: std::env::var("SESSION_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty())
                .map(SecretString::from),
        };

        let geocoder = GeocoderConfig {
            base_url: std::env::var("GEOCODER_URL")
                .unwrap_or_else(|_| geocoding::opencage::DEFAULT_BASE_URL.to_string()),
            api_key: std::env::var("OPEN_CAGE_DATA_API_KEY")
                .map(SecretString::from)
                .context("OPEN_CAGE_DATA_API_KEY environment variable not set")?,
            timeout,
        };

        let map = MapConfig {
            flag_cdn_url: std::env::var("FLAG_CDN_URL")
                .unwrap_or_else(|_| crate::views::flags::DEFAULT_FLAG_CDN.to_string()),
            hit_tolerance_deg: parse_hit_tolerance(std::env::var("HIT_TOLERANCE_DEG").ok())?,
        };

        Ok(Config {
            app,
            api,
            geocoder,
            map,
        })
    }
}
