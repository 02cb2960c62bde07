use super::{error::UtilError, uuid::generate_uuid};
use crate::structs::toml::Output;
use log::{error, LevelFilter};
use std::fs::{create_dir_all, File};

/// Create log output file and logging level based on TOML `Output` configuration
pub(crate) fn create_log_file(output: &Output) -> Result<(File, LevelFilter), UtilError> {
    let path = format!("{}/{}", output.directory, output.name);
    let result = create_dir_all(&path);
    match result {
        Ok(_) => {}
        Err(err) => {
            error!("[core] Failed to create logging output directory for {path}. Error: {err:?}");
            return Err(UtilError::CreateDirectory);
        }
    }

    let output_result = File::create(format!("{path}/{}.log", generate_uuid()));
    let log_file = match output_result {
        Ok(result) => result,
        Err(err) => {
            error!("[core] Failed to create log file at {path}. Error: {err:?}");
            return Err(UtilError::LogFile);
        }
    };

    Ok((log_file, log_level(output)))
}

/// Logging level from the TOML `Output`. Defaults to `warn`
pub(crate) fn log_level(output: &Output) -> LevelFilter {
    if let Some(log_level) = &output.logging {
        match log_level.to_lowercase().as_str() {
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            _ => LevelFilter::Warn,
        }
    } else {
        LevelFilter::Warn
    }
}
