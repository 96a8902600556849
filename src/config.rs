use crate::dashboard::SUPPORTED_LOCALES;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
}

/// Agent presence timing. An agent must `ping` at least every `ping_timeout_secs`.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentsConfig {
    #[serde(default = "default_ping_timeout_secs")]
    pub ping_timeout_secs: u64,
    /// Idle time after which the sweeper evicts a connection.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            ping_timeout_secs: default_ping_timeout_secs(),
            stale_after_secs: default_stale_after_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

fn default_ping_timeout_secs() -> u64 {
    15
}

fn default_stale_after_secs() -> u64 {
    30
}

fn default_cleanup_interval_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: i64,
}

/// Settings for the `pc-monitor-dashboard` client binary.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// HTML file rewritten after every successful render.
    #[serde(default = "default_output_path")]
    pub output_path: String,
    /// One of `SUPPORTED_LOCALES`; sets the date order and separators of last-seen timestamps.
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            output_path: default_output_path(),
            locale: default_locale(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".into()
}

fn default_output_path() -> String {
    "dashboard.html".into()
}

fn default_locale() -> String {
    "ru_RU".into()
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            self.agents.ping_timeout_secs > 0,
            "agents.ping_timeout_secs must be > 0, got {}",
            self.agents.ping_timeout_secs
        );
        anyhow::ensure!(
            self.agents.stale_after_secs > 0,
            "agents.stale_after_secs must be > 0, got {}",
            self.agents.stale_after_secs
        );
        anyhow::ensure!(
            self.agents.cleanup_interval_secs > 0,
            "agents.cleanup_interval_secs must be > 0, got {}",
            self.agents.cleanup_interval_secs
        );
        if let Some(telegram) = &self.telegram {
            anyhow::ensure!(
                !telegram.bot_token.is_empty(),
                "telegram.bot_token must be non-empty"
            );
        }
        anyhow::ensure!(
            !self.dashboard.base_url.is_empty(),
            "dashboard.base_url must be non-empty"
        );
        anyhow::ensure!(
            !self.dashboard.output_path.is_empty(),
            "dashboard.output_path must be non-empty"
        );
        anyhow::ensure!(
            SUPPORTED_LOCALES.contains(&self.dashboard.locale.as_str())
                && chrono::Locale::try_from(self.dashboard.locale.as_str()).is_ok(),
            "dashboard.locale is not a supported locale: {}",
            self.dashboard.locale
        );
        Ok(())
    }
}
