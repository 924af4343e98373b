//! Configuration loader for the `sensorflow-occupancy` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Parsing goes through a lookup function so the
//! same rules apply to the process environment and to test fixtures.
//!
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::FixedOffset;

use crate::engine::{EngineSettings, DEFAULT_BULK_THRESHOLD, DEFAULT_MAX_RANGE_DAYS};
use crate::sections::SectionRegistry;

/// Parse an optional numeric variable with a default value.
macro_rules! parse_var {
    ($lookup:expr, $var_name:expr, $ty:ty, $default:expr) => {
        $lookup($var_name)
            .map(|v| v.trim().parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string variable.
macro_rules! require_var {
    ($lookup:expr, $var_name:expr) => {
        $lookup($var_name)
            .ok_or_else(|| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Sections with more sensors than this use the bulk strategy.
    pub bulk_threshold: u32,

    /// Request-level bound on reading store round trips, in seconds.
    pub query_timeout_secs: u32,

    /// Fixed UTC offset readings are stored in, in minutes.
    pub utc_offset_minutes: i32,

    /// Longest accepted custom date range, in days.
    pub max_range_days: u32,

    /// Optional JSON section table replacing the built-in sections.
    pub sections_file: Option<PathBuf>,

    /// HTTP listen port.
    pub http_port: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – PostgreSQL connection string
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `BULK_THRESHOLD` – bulk strategy above this section size (default: 5)
/// - `QUERY_TIMEOUT_SECS` – request timeout for store queries (default: 30)
/// - `READINGS_UTC_OFFSET_MINUTES` – zone of stored readings (default: 0)
/// - `MAX_RANGE_DAYS` – longest custom date range (default: 366)
/// - `SECTIONS_FILE` – JSON section table (default: built-in sections)
/// - `HTTP_PORT` – listen port (default: 8080)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    load_from(|name| env::var(name).ok())
}

/// Load configuration through an arbitrary variable lookup.
pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
    // ---
    let db_url = require_var!(lookup, "DATABASE_URL");
    let db_pool_max = parse_var!(lookup, "DB_POOL_MAX", u32, 5);
    let bulk_threshold = parse_var!(lookup, "BULK_THRESHOLD", u32, DEFAULT_BULK_THRESHOLD as u32);
    let query_timeout_secs = parse_var!(lookup, "QUERY_TIMEOUT_SECS", u32, 30);
    let utc_offset_minutes = parse_var!(lookup, "READINGS_UTC_OFFSET_MINUTES", i32, 0);
    let max_range_days = parse_var!(lookup, "MAX_RANGE_DAYS", u32, DEFAULT_MAX_RANGE_DAYS);
    let http_port = parse_var!(lookup, "HTTP_PORT", u16, 8080);
    let sections_file = lookup("SECTIONS_FILE")
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);

    if query_timeout_secs == 0 {
        return Err(anyhow!("QUERY_TIMEOUT_SECS must be greater than zero"));
    }
    if max_range_days == 0 {
        return Err(anyhow!("MAX_RANGE_DAYS must be greater than zero"));
    }

    Ok(Config {
        db_url,
        db_pool_max,
        bulk_threshold,
        query_timeout_secs,
        utc_offset_minutes,
        max_range_days,
        sections_file,
        http_port,
    })
}

impl Config {
    /// Engine tunables derived from this snapshot.
    pub fn engine_settings(&self) -> Result<EngineSettings> {
        // ---
        let utc_offset = self
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                anyhow!(
                    "READINGS_UTC_OFFSET_MINUTES out of range: {}",
                    self.utc_offset_minutes
                )
            })?;

        Ok(EngineSettings {
            bulk_threshold: self.bulk_threshold as usize,
            query_timeout: Duration::from_secs(u64::from(self.query_timeout_secs)),
            utc_offset,
            max_range_days: self.max_range_days,
        })
    }

    /// Section table from `SECTIONS_FILE`, or the built-in one.
    pub fn section_registry(&self) -> Result<SectionRegistry> {
        // ---
        match &self.sections_file {
            Some(path) => SectionRegistry::load_from_path(path)
                .with_context(|| format!("Failed to load sections from {}", path.display())),
            None => Ok(SectionRegistry::default()),
        }
    }

    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks sensitive information like database passwords while showing
    /// all configuration values that were loaded.
    pub fn log_config(&self) {
        // ---
        let sections = self
            .sections_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<built-in>".to_string());

        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL                : {}", self.masked_db_url());
        tracing::info!("  DB_POOL_MAX                 : {}", self.db_pool_max);
        tracing::info!("  BULK_THRESHOLD              : {}", self.bulk_threshold);
        tracing::info!("  QUERY_TIMEOUT_SECS          : {}", self.query_timeout_secs);
        tracing::info!("  READINGS_UTC_OFFSET_MINUTES : {}", self.utc_offset_minutes);
        tracing::info!("  MAX_RANGE_DAYS              : {}", self.max_range_days);
        tracing::info!("  SECTIONS_FILE               : {}", sections);
        tracing::info!("  HTTP_PORT                   : {}", self.http_port);
    }

    /// Database URL with the password replaced by `****`.
    pub fn masked_db_url(&self) -> String {
        // ---
        if let Some(at_pos) = self.db_url.rfind('@') {
            if let Some(colon_pos) = self.db_url[..at_pos].rfind(':') {
                // `postgres://host` has its only colon in the scheme
                if !self.db_url[colon_pos..].starts_with("://") {
                    return format!(
                        "{}:****{}",
                        &self.db_url[..colon_pos],
                        &self.db_url[at_pos..]
                    );
                }
            }
        }
        self.db_url.clone()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        // ---
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        load_from(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        // ---
        let cfg = load(&[("DATABASE_URL", "postgres://u:p@db/occupancy")]).unwrap();
        assert_eq!(cfg.db_pool_max, 5);
        assert_eq!(cfg.bulk_threshold, 5);
        assert_eq!(cfg.query_timeout_secs, 30);
        assert_eq!(cfg.utc_offset_minutes, 0);
        assert_eq!(cfg.max_range_days, 366);
        assert_eq!(cfg.http_port, 8080);
        assert!(cfg.sections_file.is_none());

        let settings = cfg.engine_settings().unwrap();
        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    fn test_missing_database_url() {
        // ---
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_invalid_number() {
        // ---
        let err = load(&[("DATABASE_URL", "postgres://db"), ("BULK_THRESHOLD", "many")])
            .unwrap_err();
        assert!(err.to_string().contains("BULK_THRESHOLD"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        // ---
        assert!(load(&[("DATABASE_URL", "postgres://db"), ("QUERY_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn test_max_range_days() {
        // ---
        let cfg = load(&[("DATABASE_URL", "postgres://db"), ("MAX_RANGE_DAYS", "31")]).unwrap();
        assert_eq!(cfg.engine_settings().unwrap().max_range_days, 31);

        assert!(load(&[("DATABASE_URL", "postgres://db"), ("MAX_RANGE_DAYS", "0")]).is_err());
    }

    #[test]
    fn test_offset_applied() {
        // ---
        let cfg = load(&[
            ("DATABASE_URL", "postgres://db"),
            ("READINGS_UTC_OFFSET_MINUTES", "60"),
        ])
        .unwrap();
        let settings = cfg.engine_settings().unwrap();
        assert_eq!(settings.utc_offset.local_minus_utc(), 3600);
    }

    #[test]
    fn test_offset_out_of_range() {
        // ---
        let cfg = load(&[
            ("DATABASE_URL", "postgres://db"),
            ("READINGS_UTC_OFFSET_MINUTES", "100000"),
        ])
        .unwrap();
        assert!(cfg.engine_settings().is_err());
    }

    #[test]
    fn test_password_masked() {
        // ---
        let cfg = load(&[("DATABASE_URL", "postgres://app:secret@db:5432/occupancy")]).unwrap();
        assert_eq!(cfg.masked_db_url(), "postgres://app:****@db:5432/occupancy");

        let cfg = load(&[("DATABASE_URL", "postgres://app@db/occupancy")]).unwrap();
        assert_eq!(cfg.masked_db_url(), "postgres://app@db/occupancy");
    }

    #[test]
    fn test_builtin_sections_by_default() {
        // ---
        let cfg = load(&[("DATABASE_URL", "postgres://db")]).unwrap();
        let registry = cfg.section_registry().unwrap();
        assert!(registry.get("interview").is_some());
    }
}
