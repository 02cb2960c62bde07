use super::error::UtilError;
use crate::structs::toml::SamToml;
use log::error;
use std::str::from_utf8;

impl SamToml {
    // Parse the SAM TOML collector file
    pub(crate) fn parse_sam_toml(toml_data: &[u8]) -> Result<SamToml, UtilError> {
        let toml_results = toml::from_str(from_utf8(toml_data).unwrap_or_default());
        let mut collector: SamToml = match toml_results {
            Ok(results) => results,
            Err(err) => {
                error!("[core] Failed to parse TOML data. Error: {err:?}");
                return Err(UtilError::BadToml);
            }
        };

        // Format is always lowercase
        collector.output.format = collector.output.format.to_lowercase();
        Ok(collector)
    }
}

#[cfg(test)]
mod tests {
    use crate::{filesystem::files::read_file, structs::toml::SamToml};
    use std::path::PathBuf;

    #[test]
    fn test_parse_sam_toml() {
        let mut test_location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        test_location.push("tests/test_data/sam.toml");

        let buffer = read_file(&test_location.display().to_string()).unwrap();

        let result = SamToml::parse_sam_toml(&buffer).unwrap();
        assert_eq!(result.output.compress, false);
        assert_eq!(result.output.name, "sam_collection");
        assert_eq!(result.output.directory, "./tmp");
        assert_eq!(result.output.format, "jsonl");
        assert_eq!(result.output.logging.as_deref(), Some("warn"));

        assert_eq!(
            result.sam.export,
            "./tests/test_data/windows/sam_export.json"
        );
        assert_eq!(result.sam.strict_fields, Some(false));
        assert!(result.sam.accounts_path.is_none());
    }

    #[test]
    fn test_parse_sam_toml_format_lowercase() {
        let data = r#"
[output]
name = "upper"
directory = "./tmp"
format = "JSON"
compress = true

[sam]
export = "export.json"
"#;
        let result = SamToml::parse_sam_toml(data.as_bytes()).unwrap();
        assert_eq!(result.output.format, "json");
        assert!(result.output.logging.is_none());
        assert!(result.sam.parallel.is_none());
    }

    #[test]
    #[should_panic(expected = "BadToml")]
    fn test_parse_sam_bad_toml() {
        let data = "[output]\nname = 1\n";
        SamToml::parse_sam_toml(data.as_bytes()).unwrap();
    }
}
