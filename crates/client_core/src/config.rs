use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use anyhow::{bail, Result};

pub const DEVELOPMENT_API_URL: &str = "http://localhost:5500/api";
pub const DEFAULT_CONFIG_FILE: &str = "client.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnvironment {
    #[default]
    Development,
    Production,
}

impl AppEnvironment {
    fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: AppEnvironment,
    pub remote_server_url: Option<String>,
    pub credentials_path: PathBuf,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: AppEnvironment::Development,
            remote_server_url: None,
            credentials_path: PathBuf::from("./data/credentials.json"),
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    /// Production talks to the configured remote server, everything else to
    /// the local development API.
    pub fn api_base_url(&self) -> Result<String> {
        match self.environment {
            AppEnvironment::Development => Ok(DEVELOPMENT_API_URL.to_string()),
            AppEnvironment::Production => match self.remote_server_url.as_deref() {
                Some(url) if !url.trim().is_empty() => {
                    Ok(url.trim().trim_end_matches('/').to_string())
                }
                _ => bail!("REMOTE_SERVER_URL must be set when APP_ENV=production"),
            },
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

pub fn load_settings() -> Settings {
    let file_cfg = fs::read_to_string(DEFAULT_CONFIG_FILE)
        .ok()
        .and_then(|raw| toml::from_str::<HashMap<String, String>>(&raw).ok())
        .unwrap_or_default();
    let env_cfg: HashMap<String, String> = std::env::vars().collect();
    settings_from_sources(&file_cfg, &env_cfg)
}

fn settings_from_sources(
    file_cfg: &HashMap<String, String>,
    env_cfg: &HashMap<String, String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(v) = file_cfg.get("environment") {
        settings.environment = AppEnvironment::parse(v);
    }
    if let Some(v) = file_cfg.get("remote_server_url") {
        settings.remote_server_url = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("credentials_path") {
        settings.credentials_path = PathBuf::from(v);
    }
    if let Some(v) = file_cfg.get("request_timeout_secs") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = Some(parsed);
        }
    }

    if let Some(v) = env_cfg.get("APP_ENV") {
        settings.environment = AppEnvironment::parse(v);
    }
    if let Some(v) = env_cfg.get("REMOTE_SERVER_URL") {
        settings.remote_server_url = Some(v.clone());
    }
    if let Some(v) = env_cfg.get("APP__CREDENTIALS_PATH") {
        settings.credentials_path = PathBuf::from(v);
    }
    if let Some(v) = env_cfg.get("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = Some(parsed);
        }
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
