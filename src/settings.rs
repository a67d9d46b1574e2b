// Client settings persisted in the app data directory
use crate::error::FileError;
use crate::file_manager::{read_json_file_or_default, write_json_file};
use crate::models::ClientSettings;
use crate::utils::get_settings_json_path;
use log::debug;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSettingsParams {
    pub poll_interval_secs: Option<u64>,
    pub notification_duration_ms: Option<u64>,
    pub log_lines: Option<u32>,
    pub history_limit: Option<u32>,
    pub log_level: Option<String>,
}

/// Current settings, defaults when nothing was saved yet
pub fn get_settings() -> Result<ClientSettings, FileError> {
    load_settings_from(&get_settings_json_path())
}

pub fn load_settings_from(path: &Path) -> Result<ClientSettings, FileError> {
    read_json_file_or_default(path)
}

/// Apply a partial update and persist the result
pub fn update_settings(params: UpdateSettingsParams) -> Result<ClientSettings, FileError> {
    update_settings_at(&get_settings_json_path(), params)
}

pub fn update_settings_at(
    path: &Path,
    params: UpdateSettingsParams,
) -> Result<ClientSettings, FileError> {
    let mut current = load_settings_from(path)?;

    if let Some(poll_interval_secs) = params.poll_interval_secs {
        current.poll_interval_secs = poll_interval_secs.max(1);
    }
    if let Some(notification_duration_ms) = params.notification_duration_ms {
        current.notification_duration_ms = notification_duration_ms;
    }
    if let Some(log_lines) = params.log_lines {
        current.log_lines = log_lines;
    }
    if let Some(history_limit) = params.history_limit {
        current.history_limit = history_limit;
    }
    if let Some(log_level) = params.log_level {
        if !log_level.is_empty() {
            current.log_level = log_level;
        }
    }

    write_json_file(path, &current)?;
    debug!("Updated settings: {:?}", current);
    Ok(current)
}
