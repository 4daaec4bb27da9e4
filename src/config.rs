//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server
//! starts.
//!
//! ## Required Variables
//!
//! None; every variable has a working default for local development.
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `PUBLIC_URL` - Public base URL shown on the default page
//!   (default: `http://localhost:3000`)
//! - `UPSTREAM_BANGS_URL` - Upstream directory source
//!   (default: `https://duckduckgo.com/bang.js`)
//! - `UPSTREAM_TIMEOUT_SECONDS` - Upstream request timeout (default: 10)
//! - `SNAPSHOT_PATH` - Persistent snapshot cache file
//!   (default: `data/directory.json`)
//! - `DIRECTORY_TTL_SECONDS` - Snapshot freshness window (default: 86400)
//! - `REFRESH_INTERVAL_SECONDS` - Scheduled refresh period (default: 3600)
//! - `DEFAULT_TRIGGER` - Fallback bang trigger (default: `g`)
//! - `REDIS_URL` - Shared edge cache (in-memory cache if unset)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::Result;
use std::env;
use url::Url;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub public_url: String,
    pub upstream_url: String,
    /// Timeout for one upstream request in seconds.
    pub upstream_timeout_seconds: u64,
    pub snapshot_path: String,
    /// Freshness window of the persistent snapshot cache in seconds.
    pub directory_ttl_seconds: u64,
    /// Period of the scheduled edge refresh in seconds.
    pub refresh_interval_seconds: u64,
    /// Trigger used when a bang matches no entry. Fixed at startup.
    pub default_trigger: String,
    /// Shared edge cache; the in-memory store is used when unset.
    pub redis_url: Option<String>,
    pub log_level: String,
    pub log_format: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Self {
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let public_url =
            env::var("PUBLIC_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let upstream_url = env::var("UPSTREAM_BANGS_URL")
            .unwrap_or_else(|_| "https://duckduckgo.com/bang.js".to_string());

        let upstream_timeout_seconds = env::var("UPSTREAM_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let snapshot_path =
            env::var("SNAPSHOT_PATH").unwrap_or_else(|_| "data/directory.json".to_string());

        let directory_ttl_seconds = env::var("DIRECTORY_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let refresh_interval_seconds = env::var("REFRESH_INTERVAL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3_600);

        let default_trigger = env::var("DEFAULT_TRIGGER")
            .map(|v| v.to_lowercase())
            .unwrap_or_else(|_| "g".to_string());

        let redis_url = env::var("REDIS_URL").ok().filter(|v| !v.is_empty());

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        Self {
            listen_addr,
            public_url,
            upstream_url,
            upstream_timeout_seconds,
            snapshot_path,
            directory_ttl_seconds,
            refresh_interval_seconds,
            default_trigger,
            redis_url,
            log_level,
            log_format,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is out of range or malformed.
    pub fn validate(&self) -> Result<()> {
        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        validate_http_url("UPSTREAM_BANGS_URL", &self.upstream_url)?;
        validate_http_url("PUBLIC_URL", &self.public_url)?;

        if self.upstream_timeout_seconds == 0 {
            anyhow::bail!("UPSTREAM_TIMEOUT_SECONDS must be greater than 0");
        }

        if self.directory_ttl_seconds == 0 {
            anyhow::bail!("DIRECTORY_TTL_SECONDS must be greater than 0");
        }

        if self.refresh_interval_seconds < 60 {
            anyhow::bail!(
                "REFRESH_INTERVAL_SECONDS must be at least 60, got {}",
                self.refresh_interval_seconds
            );
        }

        if self.default_trigger.is_empty() || self.default_trigger.contains(char::is_whitespace) {
            anyhow::bail!(
                "DEFAULT_TRIGGER must be a single non-empty token, got '{}'",
                self.default_trigger
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if self.snapshot_path.is_empty() {
            anyhow::bail!("SNAPSHOT_PATH must not be empty");
        }

        if let Some(ref redis_url) = self.redis_url
            && !redis_url.starts_with("redis://")
            && !redis_url.starts_with("rediss://")
        {
            anyhow::bail!(
                "REDIS_URL must start with 'redis://' or 'rediss://', got '{}'",
                redis_url
            );
        }

        Ok(())
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Public URL: {}", self.public_url);
        tracing::info!("  Upstream: {}", self.upstream_url);
        tracing::info!("  Snapshot cache: {}", self.snapshot_path);
        tracing::info!("  Directory TTL: {}s", self.directory_ttl_seconds);
        tracing::info!("  Refresh interval: {}s", self.refresh_interval_seconds);
        tracing::info!("  Default trigger: !{}", self.default_trigger);

        if let Some(ref redis_url) = self.redis_url {
            tracing::info!("  Edge cache: {} (Redis)", mask_connection_string(redis_url));
        } else {
            tracing::info!("  Edge cache: in-memory");
        }

        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

/// Checks that `value` parses as an absolute HTTP(S) URL.
fn validate_http_url(name: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL ('{}'): {}", name, value, e))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!(
            "{} must use the http or https scheme, got '{}'",
            name,
            url.scheme()
        );
    }

    Ok(())
}

/// Masks the password in connection strings for logging, e.g.
/// `redis://:password@host:6379/0` → `redis://:***@host:6379/0`.
fn mask_connection_string(url: &str) -> String {
    if let Some(start) = url.find("://") {
        let scheme_end = start + 3;
        let rest = &url[scheme_end..];

        if let Some(at_pos) = rest.find('@') {
            let credentials = &rest[..at_pos];
            let host_part = &rest[at_pos..];

            if let Some(colon_pos) = credentials.rfind(':') {
                let username = &credentials[..colon_pos];
                return format!("{}://{}:***{}", &url[..start], username, host_part);
            }
        }
    }

    url.to_string()
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env();
    config.validate()?;
    Ok(config)
}
