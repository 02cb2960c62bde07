use super::{error::FormatError, json::collection_metadata};
use crate::{
    output::local::output::local_output,
    structs::toml::Output,
    utils::{compression::compress_gzip_bytes, uuid::generate_uuid},
};
use log::{error, info};
use serde_json::Value;

/// Output to `jsonl` files. Each array entry becomes its own line
pub(crate) fn jsonl_format(
    serde_data: &Value,
    output_name: &str,
    output: &Output,
    start_time: &u64,
) -> Result<(), FormatError> {
    let mut collection_output = collection_metadata(output_name, start_time);

    let collection_data = match serde_data.as_array() {
        // If array is empty just output metadata
        Some(entries) if entries.is_empty() => create_meta_line(&mut collection_output)?,
        Some(entries) => {
            let mut json_lines = Vec::new();
            for entry in entries {
                json_lines.push(create_line(&mut collection_output, entry)?);
            }
            json_lines.join("")
        }
        None => create_line(&mut collection_output, serde_data)?,
    };

    let file_name = format!("{output_name}_{}", generate_uuid());
    write_json(collection_data.as_bytes(), output, &file_name)?;
    info!("[core] {output_name} jsonl output success");
    Ok(())
}

/// Write JSONL bytes to file
fn write_json(data: &[u8], output: &Output, output_name: &str) -> Result<(), FormatError> {
    let output_data = if output.compress {
        match compress_gzip_bytes(data) {
            Ok(result) => result,
            Err(err) => {
                error!("[core] Failed to compress data: {err:?}");
                return Err(FormatError::Compress);
            }
        }
    } else {
        data.to_vec()
    };

    let output_result = local_output(&output_data, output, output_name, "jsonl");
    match output_result {
        Ok(_) => {}
        Err(err) => {
            error!("[core] Failed to output {output_name} jsonl: {err:?}");
            return Err(FormatError::Output);
        }
    }

    Ok(())
}

/// Only the metadata, for artifacts without entries
fn create_meta_line(base_data: &mut Value) -> Result<String, FormatError> {
    base_data["metadata"]["uuid"] = Value::String(generate_uuid());
    match serde_json::to_string(base_data) {
        Ok(results) => Ok(format!("{results}\n")),
        Err(err) => {
            error!("[core] Failed to serialize jsonl metadata: {err:?}");
            Err(FormatError::Serialize)
        }
    }
}

/// Create a single JSON line
fn create_line(base_data: &mut Value, artifact_data: &Value) -> Result<String, FormatError> {
    base_data["data"] = artifact_data.clone();
    base_data["metadata"]["uuid"] = Value::String(generate_uuid());
    let serde_collection_results = serde_json::to_string(base_data);
    let serde_collection = match serde_collection_results {
        Ok(results) => format!("{results}\n"),
        Err(err) => {
            error!("[core] Failed to serialize jsonl output: {err:?}");
            return Err(FormatError::Serialize);
        }
    };
    Ok(serde_collection)
}
