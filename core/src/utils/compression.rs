use super::error::UtilError;
use flate2::{write::GzEncoder, Compression};
use log::error;
use std::io::Write;

/// Compress provided bytes with gzip
pub(crate) fn compress_gzip_bytes(data: &[u8]) -> Result<Vec<u8>, UtilError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    if let Err(err) = encoder.write_all(data) {
        error!("[compression] Could not compress data: {err:?}");
        return Err(UtilError::GzipCompress);
    }

    match encoder.finish() {
        Ok(result) => Ok(result),
        Err(err) => {
            error!("[compression] Could not finish compression: {err:?}");
            Err(UtilError::GzipFinish)
        }
    }
}
