// Atomic JSON file operations

use crate::error::FileError;
use log::debug;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

lazy_static::lazy_static! {
    static ref FILE_LOCK: Mutex<()> = Mutex::new(());
}

fn io_error(path: &Path, source: std::io::Error) -> FileError {
    FileError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn json_error(path: &Path, source: serde_json::Error) -> FileError {
    FileError::Json {
        path: path.to_path_buf(),
        source,
    }
}

pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, FileError> {
    let _lock = FILE_LOCK.lock();
    read_unlocked(path)
}

fn read_unlocked<T: DeserializeOwned>(path: &Path) -> Result<T, FileError> {
    if !path.exists() {
        return Err(FileError::NotFound(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    serde_json::from_str(&contents).map_err(|e| json_error(path, e))
}

/// Writes JSON atomically using write-to-temp-then-rename
pub fn write_json_file<T: Serialize>(path: &Path, data: &T) -> Result<(), FileError> {
    let _lock = FILE_LOCK.lock();
    write_unlocked(path, data)
}

fn write_unlocked<T: Serialize>(path: &Path, data: &T) -> Result<(), FileError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }

    let json_string = serde_json::to_string_pretty(data).map_err(|e| json_error(path, e))?;

    let temp_path = path.with_extension("tmp");
    let mut temp_file = File::create(&temp_path).map_err(|e| io_error(&temp_path, e))?;
    temp_file
        .write_all(json_string.as_bytes())
        .map_err(|e| io_error(&temp_path, e))?;
    temp_file.sync_all().map_err(|e| io_error(&temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| io_error(path, e))
}

pub fn initialize_json_file<T: Serialize>(path: &Path, default: &T) -> Result<(), FileError> {
    if !path.exists() {
        debug!("Initializing JSON file: {:?}", path);
        write_json_file(path, default)?;
    }
    Ok(())
}

pub fn read_json_file_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T, FileError> {
    if path.exists() {
        read_json_file(path)
    } else {
        Ok(T::default())
    }
}

/// Read-modify-write under one lock hold
pub fn update_json_file<T, F>(path: &Path, update_fn: F) -> Result<T, FileError>
where
    T: DeserializeOwned + Serialize,
    F: FnOnce(&mut T),
{
    let _lock = FILE_LOCK.lock();
    let mut data: T = read_unlocked(path)?;
    update_fn(&mut data);
    write_unlocked(path, &data)?;
    Ok(data)
}
