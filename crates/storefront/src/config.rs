//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DDF_TOKEN_SECRET` - Session token signing secret (min 32 chars, high entropy)
//! - `RAZORPAY_KEY_ID` - Razorpay API key id
//! - `RAZORPAY_KEY_SECRET` - Razorpay API key secret (also signs payment callbacks)
//!
//! ## Optional
//! - `DDF_DATA_FILE` - Flat-file store path (default: data/db.json)
//! - `DDF_PUBLIC_DIR` - Static root for uploaded images (default: public)
//! - `DDF_HOST` - Bind address (default: 127.0.0.1)
//! - `DDF_PORT` - Listen port (default: 3000)
//! - `DDF_TOKEN_TTL_DAYS` - Token and cookie lifetime in days (default: 7)
//! - `DDF_SECURE_COOKIES` - Mark the auth cookie `Secure` (default: false)
//! - `DDF_RATE_LIMIT` - Rate limit auth endpoints per client IP (default: true)
//! - `DDF_LOG_JSON` - Emit JSON log lines instead of text (default: false)
//! - `RAZORPAY_API_BASE` - Gateway base URL (default: <https://api.razorpay.com/v1>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default flat-file store path, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "data/db.json";

/// Default Razorpay REST endpoint.
pub const DEFAULT_RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "change-in-production",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Path of the JSON data file
    pub data_file: PathBuf,
    /// Directory served for static files; uploads land in `images/products`
    pub public_dir: PathBuf,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Session token configuration
    pub auth: AuthConfig,
    /// Razorpay gateway configuration
    pub razorpay: RazorpayConfig,
    /// Whether auth endpoints are rate limited
    pub rate_limit: bool,
    /// Whether logs are emitted as JSON
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Session token settings.
///
/// Implements `Debug` manually to redact the signing secret.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC key for session tokens
    pub token_secret: SecretString,
    /// Lifetime of issued tokens and of the auth cookie, in days
    pub token_ttl_days: u32,
    /// Add `Secure` to the auth cookie
    pub secure_cookies: bool,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"[REDACTED]")
            .field("token_ttl_days", &self.token_ttl_days)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

/// Razorpay API configuration.
///
/// Implements `Debug` manually to redact the key secret.
#[derive(Clone)]
pub struct RazorpayConfig {
    /// API key id (public, also sent to browsers for the checkout widget)
    pub key_id: String,
    /// API key secret
    pub key_secret: SecretString,
    /// REST API base URL
    pub api_base: String,
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_file = PathBuf::from(get_env_or_default("DDF_DATA_FILE", DEFAULT_DATA_FILE));
        let public_dir = PathBuf::from(get_env_or_default("DDF_PUBLIC_DIR", "public"));
        let host = get_env_or_default("DDF_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("DDF_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("DDF_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("DDF_PORT".to_string(), e.to_string()))?;

        Ok(Self {
            data_file,
            public_dir,
            host,
            port,
            auth: AuthConfig::from_env()?,
            razorpay: RazorpayConfig::from_env()?,
            rate_limit: get_bool_env("DDF_RATE_LIMIT", true)?,
            log_json: get_bool_env("DDF_LOG_JSON", false)?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Directory that uploaded product images are written to.
    #[must_use]
    pub fn upload_dir(&self) -> PathBuf {
        self.public_dir.join("images").join("products")
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let token_secret = get_validated_secret("DDF_TOKEN_SECRET")?;
        validate_token_secret(&token_secret, "DDF_TOKEN_SECRET")?;

        let token_ttl_days = get_env_or_default("DDF_TOKEN_TTL_DAYS", "7")
            .parse::<u32>()
            .ok()
            .filter(|days| *days > 0)
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "DDF_TOKEN_TTL_DAYS".to_string(),
                    "must be a positive number of days".to_string(),
                )
            })?;

        Ok(Self {
            token_secret,
            token_ttl_days,
            secure_cookies: get_bool_env("DDF_SECURE_COOKIES", false)?,
        })
    }
}

impl RazorpayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            key_id: get_required_env("RAZORPAY_KEY_ID")?,
            key_secret: get_validated_secret("RAZORPAY_KEY_SECRET")?,
            api_base: get_env_or_default("RAZORPAY_API_BASE", DEFAULT_RAZORPAY_API_BASE)
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a boolean flag, accepting `true/false`, `1/0`, `yes/no` and `on/off`.
fn get_bool_env(key: &str, default: bool) -> Result<bool, ConfigError> {
    match get_optional_env(key) {
        None => Ok(default),
        Some(value) => parse_bool(&value).ok_or_else(|| {
            ConfigError::InvalidEnvVar(key.to_string(), format!("not a boolean: {value}"))
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Validate that a token secret meets minimum length requirements.
fn validate_token_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
