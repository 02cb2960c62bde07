use super::{
    error::UtilError,
    nom_helper::{nom_unsigned_eight_bytes, Endian},
};
use chrono::{DateTime, SecondsFormat};
use common::windows::WindowsTime;
use log::warn;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// 100 nanosecond intervals between 1601-01-01 and 1970-01-01
const FILETIME_UNIX_OFFSET: u64 = 116444736000000000;
const FILETIME_PER_SECOND: i64 = 10000000;

/// Decode exactly eight (8) little endian bytes of Windows `FILETIME`. A value of zero is `WindowsTime::Never`
pub(crate) fn decode_filetime(data: &[u8]) -> Result<WindowsTime, UtilError> {
    let filetime_size = 8;
    if data.len() != filetime_size {
        warn!(
            "[time] FILETIME data should be {filetime_size} bytes, got: {}",
            data.len()
        );
        return Err(UtilError::FiletimeSize);
    }

    let filetime = match nom_unsigned_eight_bytes(data, Endian::Le) {
        Ok((_, result)) => result,
        Err(_err) => return Err(UtilError::FiletimeSize),
    };
    filetime_to_windows_time(filetime)
}

/// Convert a `FILETIME` count to a UTC calendar time
pub(crate) fn filetime_to_windows_time(filetime: u64) -> Result<WindowsTime, UtilError> {
    if filetime == 0 {
        return Ok(WindowsTime::Never);
    }

    let unix_intervals = filetime as i128 - FILETIME_UNIX_OFFSET as i128;
    // At most u64::MAX / 10^7 (about 1.8 * 10^12) seconds, so the cast never truncates
    let seconds = unix_intervals.div_euclid(FILETIME_PER_SECOND as i128) as i64;
    let nanos = unix_intervals.rem_euclid(FILETIME_PER_SECOND as i128) as u32 * 100;

    // The latest FILETIME lands in the year 60056, inside chrono's range
    match DateTime::from_timestamp(seconds, nanos) {
        Some(result) => Ok(WindowsTime::Time(result)),
        None => {
            warn!("[time] FILETIME {filetime} is outside the supported calendar range");
            Err(UtilError::FiletimeRange)
        }
    }
}

/// Convert `UnixEpoch` to ISO8601 format
pub(crate) fn unixepoch_to_iso(timestamp: &i64) -> String {
    let iso_opt = DateTime::from_timestamp(*timestamp, 0);
    match iso_opt {
        Some(result) => result.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => String::from("1970-01-01T00:00:00.000Z"),
    }
}

/// Return time now in seconds or 0
pub(crate) fn time_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::new(0, 0))
        .as_secs()
}
