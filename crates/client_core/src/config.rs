use std::{collections::HashMap, fs, path::PathBuf};

use anyhow::{Context, Result};
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const SETTINGS_FILE: &str = "urbanspace.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub session_file: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.into(),
            session_file: default_session_file(),
        }
    }
}

impl ClientSettings {
    /// Applies command-line overrides, which win over file and environment.
    pub fn with_overrides(
        mut self,
        api_url: Option<&str>,
        session_file: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(url) = api_url {
            self.api_base_url = normalize_api_url(url)?;
        }
        if let Some(path) = session_file {
            self.session_file = path;
        }
        Ok(self)
    }
}

fn default_session_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("urbanspace")
        .join("session.json")
}

/// Defaults, then `urbanspace.toml` in the working directory, then the
/// environment.
pub fn load_settings() -> Result<ClientSettings> {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    resolve_settings(file.as_deref(), |key| std::env::var(key).ok())
}

pub fn resolve_settings(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    if let Some(raw) = file {
        let file_cfg = toml::from_str::<HashMap<String, String>>(raw)
            .with_context(|| format!("failed to parse {SETTINGS_FILE}"))?;
        if let Some(v) = file_cfg.get("api_url") {
            settings.api_base_url = v.clone();
        }
        if let Some(v) = file_cfg.get("session_file") {
            settings.session_file = PathBuf::from(v);
        }
    }

    if let Some(v) = env("URBANSPACE_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("URBANSPACE_SESSION_FILE") {
        settings.session_file = PathBuf::from(v);
    }

    settings.api_base_url = normalize_api_url(&settings.api_base_url)?;
    Ok(settings)
}

fn normalize_api_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_API_URL.to_string());
    }

    let parsed = Url::parse(raw).with_context(|| format!("invalid api url '{raw}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("api url '{raw}' must use http or https");
    }

    Ok(raw.trim_end_matches('/').to_string())
}
