use super::error::FileSystemError;
use log::error;
use std::{
    fs::{metadata, read},
    path::Path,
};

/// Check if path is a file
pub(crate) fn is_file(path: &str) -> bool {
    let file = Path::new(path);
    if file.is_file() {
        return true;
    }
    false
}

/// Read a file that is less than 2GB in size
pub(crate) fn read_file(path: &str) -> Result<Vec<u8>, FileSystemError> {
    if !is_file(path) {
        return Err(FileSystemError::NotFile);
    }
    if file_too_large(path) {
        return Err(FileSystemError::LargeFile);
    }

    let read_result = read(path);
    match read_result {
        Ok(result) => Ok(result),
        Err(err) => {
            error!("[core] Failed to read file {path}: {err:?}");
            Err(FileSystemError::ReadFile)
        }
    }
}

/// Registry exports larger than 2GB are not read into memory
fn file_too_large(path: &str) -> bool {
    let max_size = 2147483648;
    match metadata(path) {
        Ok(result) => result.len() > max_size,
        Err(err) => {
            error!("[core] Failed to get metadata for {path}: {err:?}");
            true
        }
    }
}
