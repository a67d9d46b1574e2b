use crate::error::FileError;
use log::debug;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

static APP_DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

pub fn get_app_data_dir() -> PathBuf {
    APP_DATA_DIR
        .get_or_init(|| {
            let base_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
            base_dir.join("BenchPilot")
        })
        .clone()
}

pub fn get_data_dir() -> PathBuf {
    get_app_data_dir().join("data")
}

pub fn get_logs_dir() -> PathBuf {
    get_app_data_dir().join("logs")
}

pub fn get_settings_json_path() -> PathBuf {
    get_data_dir().join("settings.json")
}

pub fn initialize_data_directories() -> Result<(), FileError> {
    for dir in [get_data_dir(), get_logs_dir()] {
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|source| FileError::Io {
                path: dir.clone(),
                source,
            })?;
            debug!("Created directory: {:?}", dir);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let root = get_app_data_dir();
        assert!(root.ends_with("BenchPilot"));
        assert_eq!(get_settings_json_path(), root.join("data").join("settings.json"));
        assert_eq!(get_logs_dir(), root.join("logs"));
    }
}
