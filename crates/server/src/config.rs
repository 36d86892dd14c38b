use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use dataset::{DatasetSource, DEFAULT_DATASET_URL};
use shared::domain::AboutText;
use url::Url;

const SETTINGS_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_bind: String,
    pub dataset_url: String,
    pub dataset_path: Option<PathBuf>,
    pub about_config_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8050".into(),
            dataset_url: DEFAULT_DATASET_URL.into(),
            dataset_path: None,
            about_config_path: PathBuf::from("Description").join("config_about.json"),
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the optional settings file, then environment overrides.
fn load_settings_from(file: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("bind_addr") {
                settings.server_bind = v.clone();
            }
            if let Some(v) = file_cfg.get("dataset_url") {
                settings.dataset_url = v.clone();
            }
            if let Some(v) = file_cfg.get("dataset_path") {
                settings.dataset_path = Some(PathBuf::from(v));
            }
            if let Some(v) = file_cfg.get("about_config_path") {
                settings.about_config_path = PathBuf::from(v);
            }
        }
    }

    for key in ["DASHBOARD_BIND", "APP__BIND_ADDR"] {
        if let Some(v) = env(key) {
            settings.server_bind = v;
        }
    }
    for key in ["DATASET_URL", "APP__DATASET_URL"] {
        if let Some(v) = env(key) {
            settings.dataset_url = v;
        }
    }
    for key in ["DATASET_PATH", "APP__DATASET_PATH"] {
        if let Some(v) = env(key).filter(|v| !v.trim().is_empty()) {
            settings.dataset_path = Some(PathBuf::from(v));
        }
    }
    for key in ["ABOUT_CONFIG_PATH", "APP__ABOUT_CONFIG_PATH"] {
        if let Some(v) = env(key) {
            settings.about_config_path = PathBuf::from(v);
        }
    }

    settings
}

/// A local file wins over the URL.
pub fn dataset_source(settings: &Settings) -> anyhow::Result<DatasetSource> {
    if let Some(path) = &settings.dataset_path {
        return Ok(DatasetSource::Path(path.clone()));
    }
    Ok(DatasetSource::Url(validate_dataset_url(&settings.dataset_url)?))
}

fn validate_dataset_url(raw: &str) -> anyhow::Result<String> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid dataset url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("dataset url '{raw}' must use http or https");
    }
    Ok(url.to_string())
}

pub fn load_about_text(path: &Path) -> anyhow::Result<AboutText> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read about config at {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse about config at {}", path.display()))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
