use crate::{
    artifacts::os::windows::sam::parser::grab_sam_export,
    error::TomlError,
    filesystem::files::read_file,
    output::output_data,
    structs::toml::{Output, SamToml},
    utils::{logging::create_log_file, time::time_now},
};
use common::windows::SamResults;
use log::{error, info};
use serde::Serialize;
use simplelog::{Config, WriteLogger};

/// Parse a TOML file at provided path and run the collection
pub fn parse_toml_file(path: &str) -> Result<SamResults, TomlError> {
    let buffer = match read_file(path) {
        Ok(results) => results,
        Err(err) => {
            error!("[core] Could not read TOML file {path}: {err:?}");
            return Err(TomlError::NoFile);
        }
    };

    parse_toml_data(&buffer)
}

/// Parse an already read TOML file and run the collection
pub fn parse_toml_data(data: &[u8]) -> Result<SamResults, TomlError> {
    let collector = match SamToml::parse_sam_toml(data) {
        Ok(results) => results,
        Err(err) => {
            error!("[core] Could not parse TOML data: {err:?}");
            return Err(TomlError::BadToml);
        }
    };
    sam_collection(&collector)
}

/// Decode the SAM Registry export and write accounts, groups and failures to the configured output
pub fn sam_collection(collector: &SamToml) -> Result<SamResults, TomlError> {
    if let Ok((log_file, level)) = create_log_file(&collector.output) {
        // Logger may already be installed by an earlier collection in this process
        let _ = WriteLogger::init(level, Config::default(), log_file);
    }
    let start_time = time_now();

    let results = match grab_sam_export(&collector.sam) {
        Ok(results) => results,
        Err(err) => {
            error!("[core] Failed to decode SAM data: {err}");
            return Err(TomlError::Collection);
        }
    };
    info!(
        "[core] Collected {} accounts, {} groups, {} failures",
        results.accounts.len(),
        results.groups.len(),
        results.failures.len()
    );

    write_artifact(&results.accounts, "accounts", &collector.output, &start_time)?;
    write_artifact(&results.groups, "groups", &collector.output, &start_time)?;
    write_artifact(&results.failures, "failures", &collector.output, &start_time)?;

    Ok(results)
}

fn write_artifact<T: Serialize>(
    data: &T,
    name: &str,
    output: &Output,
    start_time: &u64,
) -> Result<(), TomlError> {
    let serde_data = match serde_json::to_value(data) {
        Ok(results) => results,
        Err(err) => {
            error!("[core] Failed to serialize {name}: {err:?}");
            return Err(TomlError::Output);
        }
    };

    match output_data(&serde_data, name, output, start_time) {
        Ok(_) => Ok(()),
        Err(err) => {
            error!("[core] Failed to output {name}: {err}");
            Err(TomlError::Output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_toml_data, parse_toml_file, sam_collection};
    use crate::{
        error::TomlError,
        filesystem::files::read_file,
        structs::toml::{Output, SamOptions, SamToml},
    };
    use std::path::PathBuf;

    fn test_export() -> String {
        let mut test_location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        test_location.push("tests/test_data/windows/sam_export.json");
        test_location.display().to_string()
    }

    #[test]
    fn test_parse_toml_file() {
        let mut test_location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        test_location.push("tests/test_data/sam.toml");
        let results = parse_toml_file(&test_location.display().to_string()).unwrap();
        assert!(!results.accounts.is_empty());
    }

    #[test]
    fn test_parse_toml_data() {
        let mut test_location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        test_location.push("tests/test_data/sam.toml");

        let buffer = read_file(&test_location.display().to_string()).unwrap();
        let results = parse_toml_data(&buffer).unwrap();
        assert!(!results.groups.is_empty());
    }

    #[test]
    fn test_parse_toml_missing_file() {
        let result = parse_toml_file("./tests/test_data/missing.toml");
        assert!(matches!(result, Err(TomlError::NoFile)));
    }

    #[test]
    fn test_parse_bad_toml_data() {
        let result = parse_toml_data(b"[output]\nname = 1");
        assert!(matches!(result, Err(TomlError::BadToml)));
    }

    #[test]
    fn test_sam_collection() {
        let collector = SamToml {
            output: Output {
                name: String::from("sam_collection_test"),
                directory: String::from("./tmp"),
                format: String::from("json"),
                compress: true,
                logging: Some(String::from("info")),
            },
            sam: SamOptions {
                export: test_export(),
                accounts_path: None,
                groups_path: None,
                strict_fields: None,
                encoding: None,
                parallel: Some(true),
            },
        };
        let results = sam_collection(&collector).unwrap();
        assert!(!results.accounts.is_empty());
    }

    #[test]
    fn test_sam_collection_missing_export() {
        let collector = SamToml {
            output: Output {
                name: String::from("sam_collection_test"),
                directory: String::from("./tmp"),
                format: String::from("jsonl"),
                compress: false,
                logging: None,
            },
            sam: SamOptions {
                export: String::from("./tests/test_data/windows/missing.json"),
                accounts_path: None,
                groups_path: None,
                strict_fields: None,
                encoding: None,
                parallel: None,
            },
        };
        let result = sam_collection(&collector);
        assert!(matches!(result, Err(TomlError::Collection)));
    }
}
