pub(crate) mod formats;
pub(crate) mod local;

use self::formats::{error::FormatError, json::json_format, jsonl::jsonl_format};
use crate::structs::toml::Output;
use log::{error, info};
use serde_json::Value;

/// Write artifact data in the format configured by the TOML `Output`
pub(crate) fn output_data(
    serde_data: &Value,
    output_name: &str,
    output: &Output,
    start_time: &u64,
) -> Result<(), FormatError> {
    let result = match output.format.as_str() {
        "json" => json_format(serde_data, output_name, output, start_time),
        "jsonl" => jsonl_format(serde_data, output_name, output, start_time),
        _ => {
            error!("[core] Unknown output format: {}", output.format);
            return Err(FormatError::UnknownFormat);
        }
    };

    match result {
        Ok(_) => info!("[core] {output_name} {} output success", output.format),
        Err(err) => {
            error!("[core] Failed to output {output_name} data: {err}");
            return Err(err);
        }
    }
    Ok(())
}
