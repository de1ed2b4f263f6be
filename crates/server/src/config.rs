use std::{collections::HashMap, fs, net::SocketAddr, time::Duration};

use anyhow::Context;

const SETTINGS_FILE: &str = "journal.toml";

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    pub request_timeout_secs: u64,
    pub max_form_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "0.0.0.0:3000".into(),
            database_url: "sqlite://./data/journal.db".into(),
            request_timeout_secs: 10,
            max_form_bytes: 64 * 1024,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Keeps the configured host and replaces only the port.
    pub fn with_port(mut self, port: u16) -> anyhow::Result<Self> {
        let mut addr: SocketAddr = self
            .server_bind
            .parse()
            .with_context(|| format!("invalid bind address '{}'", self.server_bind))?;
        addr.set_port(port);
        self.server_bind = addr.to_string();
        Ok(self)
    }
}

pub fn load_settings() -> Settings {
    let file_cfg = fs::read_to_string(SETTINGS_FILE)
        .ok()
        .and_then(|raw| toml::from_str::<HashMap<String, toml::Value>>(&raw).ok())
        .unwrap_or_default();
    let env: HashMap<String, String> = std::env::vars().collect();
    merge_settings(Settings::default(), &file_cfg, &env)
}

fn merge_settings(
    mut settings: Settings,
    file_cfg: &HashMap<String, toml::Value>,
    env: &HashMap<String, String>,
) -> Settings {
    if let Some(v) = file_cfg.get("bind_addr").and_then(toml::Value::as_str) {
        settings.server_bind = v.to_string();
    }
    if let Some(v) = file_cfg.get("database_url").and_then(toml::Value::as_str) {
        settings.database_url = v.to_string();
    }
    if let Some(v) = file_cfg
        .get("request_timeout_secs")
        .and_then(toml::Value::as_integer)
    {
        if let Ok(parsed) = u64::try_from(v) {
            settings.request_timeout_secs = parsed;
        }
    }
    if let Some(v) = file_cfg.get("max_form_bytes").and_then(toml::Value::as_integer) {
        if let Ok(parsed) = usize::try_from(v) {
            settings.max_form_bytes = parsed;
        }
    }

    if let Some(v) = env.get("JOURNAL_BIND") {
        settings.server_bind = v.clone();
    }
    if let Some(v) = env.get("APP__BIND_ADDR") {
        settings.server_bind = v.clone();
    }

    if let Some(v) = env.get("DATABASE_URL") {
        settings.database_url = v.clone();
    }
    if let Some(v) = env.get("APP__DATABASE_URL") {
        settings.database_url = v.clone();
    }

    if let Some(v) = env.get("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
    if let Some(v) = env.get("APP__MAX_FORM_BYTES") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.max_form_bytes = parsed;
        }
    }

    settings
}

/// Turns a bare path or `sqlite:` prefixed path into a `sqlite://` URL.
///
/// The parent directory is created by the store when it opens the file.
pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    let database_url = normalize_database_url(raw_database_url);
    if database_url.ends_with("://") {
        anyhow::bail!("database url '{database_url}' names no database file");
    }
    Ok(database_url)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    let path = raw_database_url
        .strip_prefix("sqlite:")
        .unwrap_or(raw_database_url)
        .replace('\\', "/");
    format!("sqlite://{path}")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
