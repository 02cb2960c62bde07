use super::error::UtilError;
use log::warn;

/// Text encoding used for strings embedded in SAM records
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum StringEncoding {
    /**UTF16 little endian. Native encoding of SAM strings */
    Utf16,
    /**Single byte decoding with NUL padding removed */
    Utf8,
}

impl StringEncoding {
    /// Map a config value to an encoding. Unknown values fall back to UTF16
    pub(crate) fn from_name(name: &str) -> StringEncoding {
        match name.to_lowercase().as_str() {
            "utf8" | "utf-8" => StringEncoding::Utf8,
            "utf16" | "utf-16" | "utf16le" | "utf-16le" => StringEncoding::Utf16,
            _ => {
                warn!("[strings] Unknown string encoding {name}. Using UTF16");
                StringEncoding::Utf16
            }
        }
    }
}

/// Decode an embedded string and strip any NUL padding
pub(crate) fn extract_embedded_string(
    data: &[u8],
    encoding: StringEncoding,
) -> Result<String, UtilError> {
    let value = match encoding {
        StringEncoding::Utf16 => bytes_to_utf16_le_string(data)?,
        StringEncoding::Utf8 => bytes_to_utf8_string(data)?,
    };
    Ok(value.replace('\0', ""))
}

/// Get a UTF16 little endian string from provided bytes data
fn bytes_to_utf16_le_string(data: &[u8]) -> Result<String, UtilError> {
    let min_byte_size = 2;
    if data.len() % min_byte_size != 0 {
        warn!(
            "[strings] UTF16 data has an odd length of {} bytes",
            data.len()
        );
        return Err(UtilError::Utf16String);
    }

    let utf16_data: Vec<u16> = data
        .chunks_exact(min_byte_size)
        .map(|wide_char| u16::from_le_bytes([wide_char[0], wide_char[1]]))
        .collect();

    match String::from_utf16(&utf16_data) {
        Ok(result) => Ok(result),
        Err(err) => {
            warn!("[strings] Failed to get UTF16 string: {err:?}");
            Err(UtilError::Utf16String)
        }
    }
}

/// Get a UTF8 string from provided bytes data
fn bytes_to_utf8_string(data: &[u8]) -> Result<String, UtilError> {
    match String::from_utf8(data.to_vec()) {
        Ok(result) => Ok(result),
        Err(err) => {
            warn!("[strings] Failed to get UTF8 string: {err:?}");
            Err(UtilError::Utf8String)
        }
    }
}
