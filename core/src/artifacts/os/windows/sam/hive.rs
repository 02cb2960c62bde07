/**
 * The SAM decoders only need a small view of a Registry hive: open a key by path, list its subkeys and read the raw bytes of its values.
 * Hive container parsing lives behind the `HiveReader` trait.
 *
 * `RegistryExport` implements the trait over a JSON export of Registry keys, where binary value data is base64 encoded
 */
use crate::{
    filesystem::files::read_file,
    utils::encoding::base64_decode_standard,
};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub enum HiveError {
    KeyNotFound,
    ReadExport,
    ParseExport,
    ValueData,
}

impl std::error::Error for HiveError {}

impl fmt::Display for HiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HiveError::KeyNotFound => write!(f, "Registry key not found"),
            HiveError::ReadExport => write!(f, "Could not read Registry export"),
            HiveError::ParseExport => write!(f, "Could not parse Registry export"),
            HiveError::ValueData => write!(f, "Could not get Registry value data"),
        }
    }
}

/// Read access to a tree of Registry keys holding named binary values
pub trait HiveReader {
    type Key;
    type Value;

    /// Open a key by its backslash separated path
    fn open(&self, path: &str) -> Result<Self::Key, HiveError>;
    fn subkeys(&self, key: &Self::Key) -> Result<Vec<Self::Key>, HiveError>;
    fn key_name(&self, key: &Self::Key) -> String;
    fn values(&self, key: &Self::Key) -> Result<Vec<Self::Value>, HiveError>;
    fn value_name(&self, value: &Self::Value) -> String;
    fn value_bytes(&self, value: &Self::Value) -> Result<Vec<u8>, HiveError>;
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RegistryEntry {
    /**Full path to the key. Ex: ROOT\SAM\Domains\Account\Users\000001F4 */
    pub path: String,
    /**Path of the parent key */
    pub key: String,
    pub name: String,
    pub values: Vec<RegistryValue>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RegistryValue {
    /**Value name */
    pub value: String,
    /**Base64 encoded for binary values */
    pub data: String,
    pub data_type: String,
}

/// `HiveReader` over an exported list of Registry keys
#[derive(Debug)]
pub struct RegistryExport {
    entries: Vec<RegistryEntry>,
}

impl RegistryExport {
    /// Read a JSON Registry export from a file
    pub fn from_file(path: &str) -> Result<RegistryExport, HiveError> {
        let buffer = match read_file(path) {
            Ok(result) => result,
            Err(err) => {
                error!("[hive] Could not read Registry export {path}: {err:?}");
                return Err(HiveError::ReadExport);
            }
        };
        RegistryExport::from_json(&buffer)
    }

    /// Parse JSON Registry export bytes
    pub fn from_json(data: &[u8]) -> Result<RegistryExport, HiveError> {
        let entries: Vec<RegistryEntry> = match serde_json::from_slice(data) {
            Ok(result) => result,
            Err(err) => {
                error!("[hive] Could not parse Registry export: {err:?}");
                return Err(HiveError::ParseExport);
            }
        };
        Ok(RegistryExport::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<RegistryEntry>) -> RegistryExport {
        RegistryExport { entries }
    }
}

impl HiveReader for RegistryExport {
    type Key = String;
    type Value = RegistryValue;

    fn open(&self, path: &str) -> Result<String, HiveError> {
        // Exports do not always include an entry for intermediate keys
        let full_paths = self.entries.iter().map(|entry| &entry.path);
        let parent_paths = self.entries.iter().map(|entry| &entry.key);

        let mut candidates: Vec<&String> = Vec::new();
        for candidate in full_paths.chain(parent_paths) {
            if path_matches(candidate, path)
                && !candidates.iter().any(|seen| same_path(seen, candidate))
            {
                candidates.push(candidate);
            }
        }

        if let Some(exact) = candidates.iter().find(|candidate| same_path(candidate, path)) {
            return Ok((*exact).clone());
        }

        match candidates.as_slice() {
            [] => {
                error!("[hive] Could not find key {path} in Registry export");
                Err(HiveError::KeyNotFound)
            }
            [only] => Ok((*only).clone()),
            [first, ..] => {
                warn!(
                    "[hive] Key {path} matches {} keys in Registry export. Using {first}",
                    candidates.len()
                );
                Ok((*first).clone())
            }
        }
    }

    fn subkeys(&self, key: &String) -> Result<Vec<String>, HiveError> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| same_path(&entry.key, key))
            .map(|entry| entry.path.clone())
            .collect())
    }

    fn key_name(&self, key: &String) -> String {
        let trimmed = key.trim_end_matches('\\');
        match trimmed.rsplit_once('\\') {
            Some((_, name)) => name.to_string(),
            None => trimmed.to_string(),
        }
    }

    fn values(&self, key: &String) -> Result<Vec<RegistryValue>, HiveError> {
        Ok(self
            .entries
            .iter()
            .find(|entry| same_path(&entry.path, key))
            .map(|entry| entry.values.clone())
            .unwrap_or_default())
    }

    fn value_name(&self, value: &RegistryValue) -> String {
        value.value.clone()
    }

    fn value_bytes(&self, value: &RegistryValue) -> Result<Vec<u8>, HiveError> {
        match base64_decode_standard(&value.data) {
            Ok(result) => Ok(result),
            Err(err) => {
                warn!(
                    "[hive] Could not base64 decode {} data for value {}: {err:?}",
                    value.data_type, value.value
                );
                Err(HiveError::ValueData)
            }
        }
    }
}

/// Full path match, or `wanted` is a trailing component path of `path`
fn path_matches(path: &str, wanted: &str) -> bool {
    let path = path.trim_end_matches('\\').to_lowercase();
    let wanted = wanted.trim_matches('\\').to_lowercase();
    if wanted.is_empty() {
        return false;
    }
    path == wanted || path.ends_with(&format!("\\{wanted}"))
}

fn same_path(first: &str, second: &str) -> bool {
    first.trim_end_matches('\\').to_lowercase() == second.trim_end_matches('\\').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{HiveError, HiveReader, RegistryEntry, RegistryExport, RegistryValue};

    fn test_export() -> RegistryExport {
        let entries = vec![
            RegistryEntry {
                path: String::from("ROOT\\SAM\\Domains\\Account\\Users\\000001F4"),
                key: String::from("ROOT\\SAM\\Domains\\Account\\Users"),
                name: String::from("000001F4"),
                values: vec![RegistryValue {
                    value: String::from("F"),
                    data: String::from("AQID"),
                    data_type: String::from("REG_BINARY"),
                }],
            },
            RegistryEntry {
                path: String::from("ROOT\\SAM\\Domains\\Account\\Users\\Names"),
                key: String::from("ROOT\\SAM\\Domains\\Account\\Users"),
                name: String::from("Names"),
                values: Vec::new(),
            },
            RegistryEntry {
                path: String::from("ROOT\\SAM\\Domains\\Builtin\\Aliases\\00000220"),
                key: String::from("ROOT\\SAM\\Domains\\Builtin\\Aliases"),
                name: String::from("00000220"),
                values: vec![RegistryValue {
                    value: String::from("C"),
                    data: String::from("not base64!"),
                    data_type: String::from("REG_BINARY"),
                }],
            },
        ];
        RegistryExport::from_entries(entries)
    }

    #[test]
    fn test_open_intermediate_key() {
        let export = test_export();
        let key = export.open("SAM\\Domains\\Account\\Users").unwrap();
        assert_eq!(key, "ROOT\\SAM\\Domains\\Account\\Users");

        let subkeys = export.subkeys(&key).unwrap();
        assert_eq!(subkeys.len(), 2);
        assert_eq!(export.key_name(&subkeys[0]), "000001F4");
        assert_eq!(export.key_name(&subkeys[1]), "Names");
    }

    #[test]
    fn test_open_case_insensitive() {
        let export = test_export();
        let key = export
            .open("sam\\domains\\account\\users\\000001f4")
            .unwrap();
        assert_eq!(key, "ROOT\\SAM\\Domains\\Account\\Users\\000001F4");
    }

    #[test]
    fn test_open_prefers_exact_path() {
        let mut entries = vec![RegistryEntry {
            path: String::from("ROOT\\SAM\\Domains\\Account\\Users"),
            key: String::from("ROOT\\SAM\\Domains\\Account"),
            name: String::from("Users"),
            values: Vec::new(),
        }];
        entries.extend(test_export().entries);
        entries.push(RegistryEntry {
            path: String::from("SAM\\Domains\\Account\\Users\\000003E9"),
            key: String::from("SAM\\Domains\\Account\\Users"),
            name: String::from("000003E9"),
            values: Vec::new(),
        });
        let export = RegistryExport::from_entries(entries);

        let key = export.open("SAM\\Domains\\Account\\Users").unwrap();
        assert_eq!(key, "SAM\\Domains\\Account\\Users");
        let subkeys = export.subkeys(&key).unwrap();
        assert_eq!(subkeys.len(), 1);
        assert_eq!(export.key_name(&subkeys[0]), "000003E9");

        let key = export.open("sam\\domains\\account\\users\\").unwrap();
        assert_eq!(key, "SAM\\Domains\\Account\\Users");
        let key = export.open("ROOT\\SAM\\Domains\\Account\\Users").unwrap();
        assert_eq!(key, "ROOT\\SAM\\Domains\\Account\\Users");
    }

    #[test]
    fn test_open_several_hives() {
        let value = |data: &str| RegistryValue {
            value: String::from("F"),
            data: data.to_string(),
            data_type: String::from("REG_BINARY"),
        };
        let export = RegistryExport::from_entries(vec![
            RegistryEntry {
                path: String::from("HIVE1\\SAM\\Domains\\Account\\Users\\000001F4"),
                key: String::from("HIVE1\\SAM\\Domains\\Account\\Users"),
                name: String::from("000001F4"),
                values: vec![value("AQ==")],
            },
            RegistryEntry {
                path: String::from("HIVE2\\SAM\\Domains\\Account\\Users\\000001F4"),
                key: String::from("HIVE2\\SAM\\Domains\\Account\\Users"),
                name: String::from("000001F4"),
                values: vec![value("Ag==")],
            },
        ]);

        // Ambiguous suffix resolves to the first entry in the export
        let key = export.open("SAM\\Domains\\Account\\Users").unwrap();
        assert_eq!(key, "HIVE1\\SAM\\Domains\\Account\\Users");
        let subkeys = export.subkeys(&key).unwrap();
        assert_eq!(subkeys.len(), 1);
        let values = export.values(&subkeys[0]).unwrap();
        assert_eq!(export.value_bytes(&values[0]).unwrap(), vec![1]);

        let key = export.open("HIVE2\\SAM\\Domains\\Account\\Users").unwrap();
        assert_eq!(key, "HIVE2\\SAM\\Domains\\Account\\Users");
    }

    #[test]
    fn test_open_missing_key() {
        let export = test_export();
        let result = export.open("SAM\\Domains\\Account\\Groups");
        assert_eq!(result, Err(HiveError::KeyNotFound));

        // Partial component names do not match
        assert!(export.open("Users\\000001F").is_err());
    }

    #[test]
    fn test_values() {
        let export = test_export();
        let key = export
            .open("SAM\\Domains\\Account\\Users\\000001F4")
            .unwrap();
        let values = export.values(&key).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(export.value_name(&values[0]), "F");
        assert_eq!(export.value_bytes(&values[0]).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_bad_value_data() {
        let export = test_export();
        let key = export.open("Builtin\\Aliases\\00000220").unwrap();
        let values = export.values(&key).unwrap();
        assert_eq!(
            export.value_bytes(&values[0]),
            Err(HiveError::ValueData)
        );
    }

    #[test]
    fn test_from_json() {
        let data = r#"[{"path":"ROOT\\SAM\\Domains\\Builtin\\Aliases\\00000220","key":"ROOT\\SAM\\Domains\\Builtin\\Aliases","name":"00000220","values":[{"value":"C","data":"AA==","data_type":"REG_BINARY"}],"last_modified":"2019-12-07T09:16:14.000Z","depth":5}]"#;
        let export = RegistryExport::from_json(data.as_bytes()).unwrap();
        let key = export.open("SAM\\Domains\\Builtin\\Aliases").unwrap();
        assert_eq!(export.subkeys(&key).unwrap().len(), 1);
    }

    #[test]
    fn test_from_bad_json() {
        let result = RegistryExport::from_json(b"{\"path\": 1}");
        assert_eq!(result.unwrap_err(), HiveError::ParseExport);
    }

    #[test]
    fn test_from_missing_file() {
        let result = RegistryExport::from_file("./tests/test_data/missing_export.json");
        assert_eq!(result.unwrap_err(), HiveError::ReadExport);
    }
}
