use std::fmt;

#[derive(Debug)]
pub enum FormatError {
    Serialize,
    Compress,
    Output,
    UnknownFormat,
}

impl std::error::Error for FormatError {}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Serialize => write!(f, "Could not serialize data"),
            FormatError::Compress => write!(f, "Could not compress data"),
            FormatError::Output => write!(f, "Could not output data"),
            FormatError::UnknownFormat => write!(f, "Unknown output format"),
        }
    }
}
