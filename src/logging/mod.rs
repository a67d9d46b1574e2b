//! Logging setup for BenchPilot
//! Writes to a dated file in the logs directory and keeps 7 days of logs

use crate::models::ClientSettings;
use crate::utils::get_logs_dir;
use env_logger::{Builder, Env, Target};
use log::{info, warn};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const LOG_RETENTION_DAYS: u64 = 7;

/// Install the global logger. `RUST_LOG` overrides `settings.log_level`.
/// Falls back to stderr when the log file cannot be opened. Returns false if a
/// logger was already installed.
pub fn init_logging(settings: &ClientSettings) -> bool {
    let mut builder = Builder::from_env(Env::default().default_filter_or(settings.log_level.as_str()));

    let log_path = log_file_path(&get_logs_dir());
    let file = log_path
        .parent()
        .map(fs::create_dir_all)
        .transpose()
        .and_then(|_| OpenOptions::new().create(true).append(true).open(&log_path));

    let opened = match file {
        Ok(file) => {
            builder.target(Target::Pipe(Box::new(file)));
            true
        }
        Err(_) => {
            builder.target(Target::Stderr);
            false
        }
    };

    if builder.try_init().is_err() {
        return false;
    }

    if opened {
        info!("Logging to {:?}", log_path);
    } else {
        warn!("Could not open {:?}, logging to stderr", log_path);
    }
    cleanup_old_logs();
    true
}

/// benchpilot-YYYY-MM-DD.log
pub fn log_file_path(logs_dir: &Path) -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d");
    logs_dir.join(format!("benchpilot-{}.log", date))
}

pub fn cleanup_old_logs() {
    let removed = cleanup_logs_in(&get_logs_dir(), SystemTime::now());
    if removed > 0 {
        info!("Cleaned up {} old log files", removed);
    }
}

/// Remove `.log` files older than the retention window. Returns how many were removed.
pub fn cleanup_logs_in(logs_dir: &Path, now: SystemTime) -> usize {
    let retention = Duration::from_secs(LOG_RETENTION_DAYS * 24 * 60 * 60);
    let Ok(entries) = fs::read_dir(logs_dir) else {
        return 0;
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(true, |ext| ext != "log") {
            continue;
        }

        let age = fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());

        if matches!(age, Some(age) if age > retention) && fs::remove_file(&path).is_ok() {
            info!("Cleaned up old log: {:?}", path.file_name());
            removed += 1;
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_log_file_name_is_dated() {
        let path = log_file_path(Path::new("/tmp/logs"));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("benchpilot-"));
        assert!(name.ends_with(".log"));
        assert_eq!(name.len(), "benchpilot-2024-01-01.log".len());
    }

    #[test]
    fn test_cleanup_respects_retention() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("old.log"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        // Nothing is old yet
        assert_eq!(cleanup_logs_in(dir.path(), SystemTime::now()), 0);

        let later = SystemTime::now() + Duration::from_secs(8 * 24 * 60 * 60);
        assert_eq!(cleanup_logs_in(dir.path(), later), 1);
        assert!(!dir.path().join("old.log").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_cleanup_missing_dir() {
        let dir = tempdir().unwrap();
        assert_eq!(cleanup_logs_in(&dir.path().join("nope"), SystemTime::now()), 0);
    }
}
