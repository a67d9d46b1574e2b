// Client settings data models
use super::AppConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientSettings {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_notification_duration_ms")]
    pub notification_duration_ms: u64,
    #[serde(default = "default_log_lines")]
    pub log_lines: u32,
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_notification_duration_ms() -> u64 {
    5000
}

fn default_log_lines() -> u32 {
    200
}

fn default_history_limit() -> u32 {
    50
}

fn default_log_level() -> String {
    String::from("info")
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            notification_duration_ms: default_notification_duration_ms(),
            log_lines: default_log_lines(),
            history_limit: default_history_limit(),
            log_level: default_log_level(),
        }
    }
}

impl ClientSettings {
    /// Never zero: a zero period would spin the poll loop
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// `None` means notifications stay until dismissed
    pub fn notification_duration(&self) -> Option<Duration> {
        match self.notification_duration_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Adopt the polling interval configured on the backend
    pub fn apply_app_config(&mut self, config: &AppConfig) {
        if config.polling.interval_seconds > 0 {
            self.poll_interval_secs = config.polling.interval_seconds;
        }
    }
}
