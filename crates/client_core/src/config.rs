use std::{collections::HashMap, fs};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5000/api".into(),
            request_timeout_seconds: 30,
        }
    }
}

/// Layered lookup: defaults, then `client.toml`, then environment overrides.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("client.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("api_base_url") {
                settings.api_base_url = v.clone();
            }
            if let Some(v) = file_cfg.get("request_timeout_seconds") {
                if let Ok(parsed) = v.parse::<u64>() {
                    settings.request_timeout_seconds = parsed;
                }
            }
        }
    }

    if let Ok(v) = std::env::var("API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Ok(v) = std::env::var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Ok(v) = std::env::var("APP__REQUEST_TIMEOUT_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_seconds = parsed;
        }
    }

    settings
}

/// Normalizes and validates a base url for the gateway: defaults the scheme
/// to http, strips trailing slashes, rejects anything unparsable.
pub fn prepare_api_base_url(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        anyhow::bail!("api base url must not be empty");
    }

    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    let url = Url::parse(&candidate)
        .with_context(|| format!("invalid api base url '{raw}'"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("api base url '{raw}' must use http or https");
    }

    Ok(candidate.trim_end_matches('/').to_string())
}
