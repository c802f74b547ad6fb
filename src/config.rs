use anyhow::{Result, bail};
use std::env;

/// Centralized application configuration.
/// Read once from the environment at startup; the host shell passes it on.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the storefront REST backend, without a trailing slash.
    pub api_base_url: String,

    /// Directory holding the durable client store (session id, flags).
    pub data_dir: String,

    /// Path segments that identify the storage bucket inside a media URL.
    /// Key extraction returns everything after the first segment that
    /// contains one of these markers.
    pub bucket_markers: Vec<String>,
}

impl AppConfig {
    /// Build the configuration from environment variables with defaults.
    pub fn from_env() -> Result<Self> {
        let api_base_url = env::var("STOREFRONT_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();
        let data_dir =
            env::var("STOREFRONT_DATA_DIR").unwrap_or_else(|_| "./data/storefront".into());
        let markers_raw = env::var("STOREFRONT_BUCKET_MARKERS")
            .unwrap_or_else(|_| "parsifal-files,twcstorage".into());

        let bucket_markers = parse_markers(&markers_raw);
        if bucket_markers.is_empty() {
            bail!("STOREFRONT_BUCKET_MARKERS `{}` contains no markers", markers_raw);
        }

        Ok(Self {
            api_base_url,
            data_dir,
            bucket_markers,
        })
    }
}

/// Split a comma-separated marker list, dropping empty segments.
fn parse_markers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
