use std::fmt;

#[derive(Debug)]
pub(crate) enum UtilError {
    BadToml,
    FiletimeSize,
    FiletimeRange,
    CreateDirectory,
    LogFile,
    GzipCompress,
    GzipFinish,
    Utf16String,
    Utf8String,
}

impl std::error::Error for UtilError {}

impl fmt::Display for UtilError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UtilError::BadToml => write!(f, "Failed to parse TOML data"),
            UtilError::FiletimeSize => write!(f, "FILETIME data must be exactly 8 bytes"),
            UtilError::FiletimeRange => write!(f, "FILETIME value outside supported range"),
            UtilError::CreateDirectory => write!(f, "Could not create directory(ies)"),
            UtilError::LogFile => write!(f, "Could not create log file"),
            UtilError::GzipCompress => write!(f, "Could not compress data with gzip"),
            UtilError::GzipFinish => write!(f, "Could not complete gzip compression"),
            UtilError::Utf16String => write!(f, "Bytes are not valid UTF16 text"),
            UtilError::Utf8String => write!(f, "Bytes are not valid UTF8 text"),
        }
    }
}
