use std::{collections::HashMap, fs, path::Path, path::PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;
use site_core::admin::DEFAULT_EXPORT_SECRET;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "awoc.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub remote_url: Option<String>,
    pub export_secret: String,
    pub export_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://./data/awoc.db".into(),
            remote_url: None,
            export_secret: DEFAULT_EXPORT_SECRET.into(),
            export_dir: PathBuf::from("./exports"),
        }
    }
}

impl Settings {
    /// Parsed remote records endpoint, if one is configured.
    pub fn remote_endpoint(&self) -> anyhow::Result<Option<Url>> {
        let Some(raw) = self.remote_url.as_deref().map(str::trim) else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }

        let url = Url::parse(raw).with_context(|| format!("invalid remote url '{raw}'"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("remote url '{raw}' must use http or https");
        }
        Ok(Some(url))
    }
}

pub fn load_settings(config_path: Option<&Path>) -> Settings {
    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    load_settings_from(path, |key| std::env::var(key).ok())
}

/// File values override defaults and environment values override the file.
/// `APP__*` variables win over the short `AWOC_*` names.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("database_url") {
                settings.database_url = v.clone();
            }
            if let Some(v) = file_cfg.get("remote_url") {
                settings.remote_url = Some(v.clone());
            }
            if let Some(v) = file_cfg.get("export_secret") {
                settings.export_secret = v.clone();
            }
            if let Some(v) = file_cfg.get("export_dir") {
                settings.export_dir = PathBuf::from(v);
            }
        }
    }

    if let Some(v) = env("AWOC_DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("AWOC_REMOTE_URL") {
        settings.remote_url = Some(v);
    }
    if let Some(v) = env("APP__REMOTE_URL") {
        settings.remote_url = Some(v);
    }

    if let Some(v) = env("APP__EXPORT_SECRET") {
        settings.export_secret = v;
    }
    if let Some(v) = env("APP__EXPORT_DIR") {
        settings.export_dir = PathBuf::from(v);
    }

    settings.database_url = normalize_database_url(&settings.database_url);
    settings
}

pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
