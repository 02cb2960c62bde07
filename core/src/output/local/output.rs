use super::error::LocalError;
use crate::structs::toml::Output;
use log::error;
use std::{
    fs::{create_dir_all, OpenOptions},
    io::Write,
};

/// Output to local directory provided by TOML input. Gzip data gets a `.gz` suffix
pub(crate) fn local_output(
    data: &[u8],
    output: &Output,
    output_name: &str,
    extension: &str,
) -> Result<String, LocalError> {
    let output_path = format!("{}/{}", output.directory, output.name);

    let result = create_dir_all(&output_path);
    match result {
        Ok(_) => {}
        Err(err) => {
            error!("[core] Failed to create output directory for {output_path}. Error: {err:?}");
            return Err(LocalError::CreateDirectory);
        }
    }

    let file_path = if output.compress {
        format!("{output_path}/{output_name}.{extension}.gz")
    } else {
        format!("{output_path}/{output_name}.{extension}")
    };

    let json_file_result = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&file_path);

    let mut json_file = match json_file_result {
        Ok(results) => results,
        Err(err) => {
            error!("[core] Failed to create output file {file_path}. Error: {err:?}");
            return Err(LocalError::CreateFile);
        }
    };

    let write_result = json_file.write_all(data);
    match write_result {
        Ok(_) => {}
        Err(err) => {
            error!("[core] Failed to write output to file {file_path}. Error: {err:?}");
            return Err(LocalError::WriteJson);
        }
    }
    Ok(file_path)
}
