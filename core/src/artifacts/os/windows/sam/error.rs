use super::hive::HiveError;
use std::fmt;

#[derive(Debug, PartialEq)]
pub enum SamError {
    /**An offset/length pair or fixed field points past the end of the value */
    Bounds,
    UnrecognizedSidVariant,
    /**Embedded string bytes are not valid text */
    Encoding,
    /**Members table ended before the declared member count was reached */
    MemberCountMismatch,
    MissingUsername,
    MissingTimestamp,
    /**Decoder thread panicked */
    Worker,
    Hive(HiveError),
}

impl std::error::Error for SamError {}

impl fmt::Display for SamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamError::Bounds => write!(f, "Field points outside of the value data"),
            SamError::UnrecognizedSidVariant => write!(f, "Unrecognized SID variant"),
            SamError::Encoding => write!(f, "Embedded string is not valid text"),
            SamError::MemberCountMismatch => {
                write!(f, "Fewer group members than the declared member count")
            }
            SamError::MissingUsername => write!(f, "Could not decode account username"),
            SamError::MissingTimestamp => write!(f, "Could not decode account timestamps"),
            SamError::Worker => write!(f, "SAM decoder thread failed"),
            SamError::Hive(err) => write!(f, "Hive reader failure: {err}"),
        }
    }
}
