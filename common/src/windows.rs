use base64::{engine::general_purpose, Engine};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Windows `FILETIME` values decoded from the SAM. A raw value of zero means the event never happened
#[derive(Debug, Clone, PartialEq)]
pub enum WindowsTime {
    Never,
    Time(DateTime<Utc>),
}

impl Serialize for WindowsTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            WindowsTime::Never => serializer.serialize_str("Never"),
            WindowsTime::Time(time) => {
                serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
        }
    }
}

/// Local account assembled from the `F` and `V` values of one key under `SAM\Domains\Account\Users`
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AccountRecord {
    pub key_name: String,
    pub last_logon: WindowsTime,
    pub password_last_set: WindowsTime,
    pub account_expires: WindowsTime,
    pub relative_id: u32,
    pub primary_group_id: u32,
    pub control_flags: u16,
    pub account_flags: Vec<UacFlags>,
    pub country_code: u16,
    pub code_page: u16,
    pub failed_logins: u16,
    pub logins: u16,
    pub username: String,
    pub full_name: String,
    pub comment: String,
    pub home_drive: String,
    pub logon_script: String,
    pub profile_path: String,
    pub workstations: String,
    #[serde(serialize_with = "base64_bytes")]
    pub lm_hash: Vec<u8>,
    #[serde(serialize_with = "base64_bytes")]
    pub nt_hash: Vec<u8>,
    pub sid: String,
    /**Field level problems that were replaced with empty values */
    pub issues: Vec<String>,
}

#[derive(Debug, PartialEq, Serialize, Clone)]
pub enum UacFlags {
    AccountDisabled,
    HomeDirectoryRequired,
    PasswordNotRequired,
    TempDuplicateAccount,
    NormalAccount,
    MNSLogonAccount,
    InterdomainTrustAccount,
    WorkstationTrustAccount,
    ServerTrustAccount,
    DontExpirePassword,
    AccountAutoLocked,
    EncryptedTextPasswordAllowed,
    SmartcardRequired,
    TrustedForDelegation,
    NotDelegated,
    UseDESKeyOnly,
}

/// Local group decoded from the `C` value of one key under `SAM\Domains\Builtin\Aliases`
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct GroupRecord {
    pub key_name: String,
    pub name: String,
    pub comment: String,
    pub member_count: u32,
    /**Always present. Empty when the group has no members */
    pub members: Vec<String>,
    pub status: DecodeStatus,
    pub issues: Vec<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub enum DecodeStatus {
    Complete,
    Partial,
}

/// A key whose record could not be decoded at all
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DecodeFailure {
    pub key_name: String,
    pub record: String,
    pub error: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct SamResults {
    pub accounts: Vec<AccountRecord>,
    pub groups: Vec<GroupRecord>,
    pub failures: Vec<DecodeFailure>,
}

fn base64_bytes<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&general_purpose::STANDARD.encode(data))
}

#[cfg(test)]
mod tests {
    use super::{DecodeStatus, GroupRecord, WindowsTime};
    use chrono::DateTime;

    #[test]
    fn test_windows_time_serialize() {
        let never = serde_json::to_string(&WindowsTime::Never).unwrap();
        assert_eq!(never, "\"Never\"");

        let time = WindowsTime::Time(DateTime::from_timestamp(1574819646, 0).unwrap());
        let value = serde_json::to_string(&time).unwrap();
        assert_eq!(value, "\"2019-11-27T01:54:06.000Z\"");
    }

    #[test]
    fn test_group_serialize_empty_members() {
        let group = GroupRecord {
            key_name: String::from("00000220"),
            name: String::from("Administrators"),
            comment: String::new(),
            member_count: 0,
            members: Vec::new(),
            status: DecodeStatus::Complete,
            issues: Vec::new(),
        };
        let value = serde_json::to_value(&group).unwrap();
        assert!(value["members"].is_array());
        assert_eq!(value["status"], "Complete");
    }
}
