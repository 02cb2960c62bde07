use super::error::FormatError;
use crate::{
    output::local::output::local_output,
    structs::toml::Output,
    utils::{
        compression::compress_gzip_bytes,
        time::{time_now, unixepoch_to_iso},
        uuid::generate_uuid,
    },
};
use log::{error, info};
use serde_json::{json, Value};

/// Output to `json` format. The whole artifact is written as one object
pub(crate) fn json_format(
    serde_data: &Value,
    output_name: &str,
    output: &Output,
    start_time: &u64,
) -> Result<(), FormatError> {
    let mut collection_output = collection_metadata(output_name, start_time);
    collection_output["data"] = serde_data.clone();

    let serde_collection_results = serde_json::to_string(&collection_output);
    let serde_collection = match serde_collection_results {
        Ok(results) => results,
        Err(err) => {
            error!("[core] Failed to serialize json output: {err:?}");
            return Err(FormatError::Serialize);
        }
    };
    let collection_data = serde_collection.as_bytes();

    let output_data = if output.compress {
        match compress_gzip_bytes(collection_data) {
            Ok(result) => result,
            Err(err) => {
                error!("[core] Failed to compress data: {err:?}");
                return Err(FormatError::Compress);
            }
        }
    } else {
        collection_data.to_vec()
    };

    let file_name = format!("{output_name}_{}", generate_uuid());
    match local_output(&output_data, output, &file_name, "json") {
        Ok(path) => info!("[core] {output_name} json output written to {path}"),
        Err(err) => {
            error!("[core] Failed to output {output_name} json: {err:?}");
            return Err(FormatError::Output);
        }
    }

    Ok(())
}

/// Small amount of metadata describing the collection
pub(crate) fn collection_metadata(output_name: &str, start_time: &u64) -> Value {
    json![{
        "metadata": {
            "uuid": generate_uuid(),
            "artifact_name": output_name,
            "complete_time": unixepoch_to_iso(&(time_now() as i64)),
            "start_time": unixepoch_to_iso(&(*start_time as i64)),
            "samscope_version": env!("CARGO_PKG_VERSION"),
        }
    }]
}

#[cfg(test)]
mod tests {
    use super::{collection_metadata, json_format};
    use crate::{structs::toml::Output, utils::time::time_now};

    #[test]
    fn test_json_format() {
        let output = Output {
            name: String::from("format_test"),
            directory: String::from("./tmp"),
            format: String::from("json"),
            compress: false,
            logging: Some(String::from("warn")),
        };
        let start_time = time_now();

        let name = "test";
        let data = serde_json::Value::String(String::from("test"));
        json_format(&data, name, &output, &start_time).unwrap();
    }

    #[test]
    fn test_json_format_compress() {
        let output = Output {
            name: String::from("format_test"),
            directory: String::from("./tmp"),
            format: String::from("json"),
            compress: true,
            logging: None,
        };

        let data = serde_json::json!([{"name": "Administrators"}]);
        json_format(&data, "groups", &output, &time_now()).unwrap();
    }

    #[test]
    fn test_collection_metadata() {
        let metadata = collection_metadata("accounts", &0);
        assert_eq!(metadata["metadata"]["artifact_name"], "accounts");
        assert_eq!(metadata["metadata"]["start_time"], "1970-01-01T00:00:00.000Z");
        assert!(metadata["metadata"]["uuid"].is_string());
    }
}
