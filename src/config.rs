//! Configuration management

use crate::error::{DaemonError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub node: NodeConfig,
    pub pool: PoolConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub intervals: IntervalConfig,
    #[serde(default)]
    pub watchdog: WatchdogConfig,
    pub telegram: Option<TelegramConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP port on localhost, 0 disables the API
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub rpc_host: String,
    pub rpc_port: u16,
    /// Node data directory holding the RPC `.cookie`
    pub data_dir: String,
    /// Wallet used for staking queries
    pub staking_wallet: String,
    /// Secret path component enabling the staking control routes
    pub staking_ctl_key: Option<String>,
    /// Pool reward address applied when staking is switched on or off
    pub reward_address: String,
    pub smsg_fee_rate_target: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Pool web service base URL
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres URL of the reward statistics database
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntervalConfig {
    pub status_secs: u64,
    pub reward_secs: u64,
    pub history_secs: u64,
    pub watchdog_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    pub email_to: Option<String>,
    pub email_from: Option<String>,
    pub email_subject: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_name: String,
    pub bot_auth: String,
    #[serde(default)]
    pub status_msg_hour: u32,
    #[serde(default)]
    pub status_msg_minute: u32,
    /// Chat receiving the daily status message
    pub status_msg_chat_name: Option<String>,
    /// Chat receiving watchdog alerts
    pub watchdog_msg_chat_name: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 0 }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc_host: "127.0.0.1".to_string(),
            rpc_port: 51735,
            data_dir: "~/.particl".to_string(),
            staking_wallet: String::new(),
            staking_ctl_key: None,
            reward_address: String::new(),
            smsg_fee_rate_target: 0.0,
        }
    }
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            status_secs: 60,
            reward_secs: 60,
            history_secs: 600,
            watchdog_secs: 60,
        }
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            email_to: None,
            email_from: None,
            email_subject: None,
            smtp_host: "localhost".to_string(),
            smtp_port: 25,
        }
    }
}

impl IntervalConfig {
    pub fn status(&self) -> Duration {
        Duration::from_secs(self.status_secs)
    }

    pub fn reward(&self) -> Duration {
        Duration::from_secs(self.reward_secs)
    }

    pub fn history(&self) -> Duration {
        Duration::from_secs(self.history_secs)
    }

    pub fn watchdog(&self) -> Duration {
        Duration::from_secs(self.watchdog_secs)
    }
}

impl NodeConfig {
    /// Data directory with a leading `~` expanded
    pub fn data_dir_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir).as_ref())
    }

    /// Control secret, ignoring an empty value
    pub fn control_key(&self) -> Option<&str> {
        self.staking_ctl_key.as_deref().filter(|k| !k.is_empty())
    }
}

impl WatchdogConfig {
    /// Sender and recipient, when both are configured
    pub fn email_route(&self) -> Option<(&str, &str)> {
        let from = self.email_from.as_deref().filter(|s| !s.is_empty())?;
        let to = self.email_to.as_deref().filter(|s| !s.is_empty())?;
        Some((from, to))
    }

    pub fn subject(&self) -> &str {
        self.email_subject
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("Particld Watchdog Alert")
    }
}

impl TelegramConfig {
    pub fn is_enabled(&self) -> bool {
        !self.bot_name.is_empty() && !self.bot_auth.is_empty()
    }
}

impl Config {
    /// Load configuration from a file, optionally merging a separate
    /// Telegram file under the `telegram` key
    pub fn load<P: AsRef<Path>>(path: P, telegram_path: Option<&Path>) -> Result<Self> {
        let path = path.as_ref().to_str().ok_or_else(|| {
            DaemonError::Config(format!("non UTF-8 config path {}", path.as_ref().display()))
        })?;

        let mut builder = config::Config::builder().add_source(config::File::with_name(path));

        if let Some(tg) = telegram_path {
            let tg = tg.to_str().ok_or_else(|| {
                DaemonError::Config(format!("non UTF-8 config path {}", tg.display()))
            })?;
            let telegram = config::Config::builder()
                .add_source(config::File::with_name(tg))
                .build()
                .map_err(|e| DaemonError::Config(e.to_string()))?;
            let table = telegram
                .try_deserialize::<HashMap<String, config::Value>>()
                .map_err(|e| DaemonError::Config(e.to_string()))?;
            for (key, value) in table {
                builder = builder
                    .set_override(format!("telegram.{}", key), value)
                    .map_err(|e| DaemonError::Config(e.to_string()))?;
            }
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("STAKEPOOL").separator("__"))
            .build()
            .map_err(|e| DaemonError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| DaemonError::Config(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a TOML document directly
    pub fn from_toml(toml: &str) -> Result<Self> {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| DaemonError::Config(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pool.url.trim().is_empty() {
            return Err(DaemonError::Config("pool.url must not be empty".to_string()));
        }

        let intervals = &self.intervals;
        if intervals.status_secs == 0
            || intervals.reward_secs == 0
            || intervals.history_secs == 0
            || intervals.watchdog_secs == 0
        {
            return Err(DaemonError::Config("intervals must be non-zero".to_string()));
        }

        if let Some(tg) = &self.telegram {
            if tg.status_msg_hour > 23 {
                return Err(DaemonError::Validation(format!(
                    "invalid status message hour value: {}",
                    tg.status_msg_hour
                )));
            }
            if tg.status_msg_minute > 59 {
                return Err(DaemonError::Validation(format!(
                    "invalid status message minute value: {}",
                    tg.status_msg_minute
                )));
            }
        }

        Ok(())
    }

    /// Telegram settings, when the bot is enabled
    pub fn telegram_enabled(&self) -> Option<&TelegramConfig> {
        self.telegram.as_ref().filter(|tg| tg.is_enabled())
    }
}
