//! Service configuration read from environment variables.
//!
//! Binaries call `dotenvy::dotenv().ok()` first, so a local `.env` file can
//! supply any of these keys.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Serialize;

// ─────────────────────────────────────────────────────────────────────────────
// Error
// ─────────────────────────────────────────────────────────────────────────────

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

// ─────────────────────────────────────────────────────────────────────────────
// Keys and defaults
// ─────────────────────────────────────────────────────────────────────────────

pub const API_ADDR_KEY: &str = "HOUSING_API_ADDR";
pub const UI_ADDR_KEY: &str = "HOUSING_UI_ADDR";
pub const MODEL_PATH_KEY: &str = "HOUSING_MODEL_PATH";
pub const PIPELINE_PATH_KEY: &str = "HOUSING_PIPELINE_PATH";
pub const MAX_UPLOAD_BYTES_KEY: &str = "HOUSING_MAX_UPLOAD_BYTES";
pub const BATCH_COLUMN_CHECK_KEY: &str = "HOUSING_BATCH_COLUMN_CHECK";
pub const API_URL_KEY: &str = "HOUSING_API_URL";

pub const DEFAULT_API_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_UI_ADDR: &str = "0.0.0.0:8501";
pub const DEFAULT_MODEL_FILE: &str = "model.pkl";
pub const DEFAULT_PIPELINE_FILE: &str = "pipeline.pkl";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

// ─────────────────────────────────────────────────────────────────────────────
// Config Structs
// ─────────────────────────────────────────────────────────────────────────────

/// Locations of the two serialized artifacts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub pipeline: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model: PathBuf::from(DEFAULT_MODEL_FILE),
            pipeline: PathBuf::from(DEFAULT_PIPELINE_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceConfig {
    pub api_addr: SocketAddr,
    pub ui_addr: SocketAddr,
    pub artifacts: ArtifactPaths,
    /// Request body limit applied to upload routes.
    pub max_upload_bytes: usize,
    /// Apply the structured missing-column check to CSV uploads as well.
    pub batch_column_check: bool,
    /// Base URL the smoke-test client targets.
    pub api_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            ui_addr: SocketAddr::from(([0, 0, 0, 0], 8501)),
            artifacts: ArtifactPaths::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            batch_column_check: false,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_addr = parse_or(&lookup, API_ADDR_KEY, defaults.api_addr, |v| v.parse().ok())?;
        let ui_addr = parse_or(&lookup, UI_ADDR_KEY, defaults.ui_addr, |v| v.parse().ok())?;
        let max_upload_bytes = parse_or(
            &lookup,
            MAX_UPLOAD_BYTES_KEY,
            defaults.max_upload_bytes,
            |v| v.parse().ok(),
        )?;
        let batch_column_check = parse_or(
            &lookup,
            BATCH_COLUMN_CHECK_KEY,
            defaults.batch_column_check,
            parse_bool,
        )?;

        let artifacts = ArtifactPaths {
            model: lookup(MODEL_PATH_KEY).map_or(defaults.artifacts.model, PathBuf::from),
            pipeline: lookup(PIPELINE_PATH_KEY).map_or(defaults.artifacts.pipeline, PathBuf::from),
        };

        let api_url = lookup(API_URL_KEY)
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);

        Ok(Self {
            api_addr,
            ui_addr,
            artifacts,
            max_upload_bytes,
            batch_column_check,
            api_url,
        })
    }
}

fn parse_or<F, T, P>(lookup: &F, key: &'static str, default: T, parse: P) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    parse(raw.trim()).ok_or(ConfigError::Invalid { key, value: raw })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
