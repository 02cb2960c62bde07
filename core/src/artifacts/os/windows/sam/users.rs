/**
 * Local accounts are stored under `SAM\Domains\Account\Users\<RID>`.
 * Each key has a fixed size `F` value (timestamps, RID, counters) and a variable size `V` value (names, paths, password hashes).
 * The Registry does not guarantee the order of the two values
 */
use super::{
    descriptor::{read_slice_at, read_u16_at, read_u32_at, FieldDescriptor, ACCOUNT_LAYOUT},
    error::SamError,
    hive::HiveReader,
    parser::DecodeOptions,
};
use crate::{
    artifacts::os::windows::securitydescriptor::sid::grab_sid, utils::time::decode_filetime,
};
use common::windows::{AccountRecord, DecodeFailure, UacFlags, WindowsTime};
use log::{debug, error, info};
use nom::bytes::complete::{take, take_until};

const LAST_LOGON: usize = 8;
const PASSWORD_LAST_SET: usize = 24;
const ACCOUNT_EXPIRES: usize = 40;
const RELATIVE_ID: usize = 48;
const PRIMARY_GROUP_ID: usize = 52;
const CONTROL_FLAGS: usize = 56;
const COUNTRY_CODE: usize = 60;
const CODE_PAGE: usize = 62;
const FAILED_LOGINS: usize = 64;
const LOGINS: usize = 66;

const USERNAME: FieldDescriptor = FieldDescriptor::at(12);
const FULL_NAME: FieldDescriptor = FieldDescriptor::at(24);
const COMMENT: FieldDescriptor = FieldDescriptor::at(36);
const HOME_DRIVE: FieldDescriptor = FieldDescriptor::at(84);
const LOGON_SCRIPT: FieldDescriptor = FieldDescriptor::at(96);
const PROFILE_PATH: FieldDescriptor = FieldDescriptor::at(108);
const WORKSTATIONS: FieldDescriptor = FieldDescriptor::at(120);
const LM_HASH: FieldDescriptor = FieldDescriptor::at(156);
const NT_HASH: FieldDescriptor = FieldDescriptor::at(168);

/// Values decoded from the `F` value
#[derive(Debug, Clone, PartialEq)]
struct FixedInfo {
    last_logon: WindowsTime,
    password_last_set: WindowsTime,
    account_expires: WindowsTime,
    relative_id: u32,
    primary_group_id: u32,
    control_flags: u16,
    country_code: u16,
    code_page: u16,
    failed_logins: u16,
    logins: u16,
}

/// Values decoded from the `V` value
#[derive(Debug, Clone, PartialEq)]
struct VariableInfo {
    username: String,
    full_name: String,
    comment: String,
    home_drive: String,
    logon_script: String,
    profile_path: String,
    workstations: String,
    lm_hash: Vec<u8>,
    nt_hash: Vec<u8>,
    sid: String,
}

/// Collects the `F` and `V` values of one account key
#[derive(Debug)]
pub(crate) struct UserAccumulator {
    key_name: String,
    fixed: Option<FixedInfo>,
    variable: Option<VariableInfo>,
    issues: Vec<String>,
}

impl UserAccumulator {
    pub(crate) fn new(key_name: &str) -> UserAccumulator {
        UserAccumulator {
            key_name: key_name.to_string(),
            fixed: None,
            variable: None,
            issues: Vec::new(),
        }
    }

    /// Decode an `F` value. Only the timestamps are required
    pub(crate) fn add_fixed(
        &mut self,
        data: &[u8],
        options: &DecodeOptions,
    ) -> Result<(), SamError> {
        let last_logon = self.timestamp(data, LAST_LOGON, "last logon")?;
        let password_last_set = self.timestamp(data, PASSWORD_LAST_SET, "password last set")?;
        let account_expires = self.timestamp(data, ACCOUNT_EXPIRES, "account expires")?;

        let key_name = &self.key_name;
        let issues = &mut self.issues;
        let relative_id =
            options.recover(read_u32_at(data, RELATIVE_ID), "relative id", key_name, issues)?;
        let primary_group_id = options.recover(
            read_u32_at(data, PRIMARY_GROUP_ID),
            "primary group id",
            key_name,
            issues,
        )?;
        let control_flags = options.recover(
            read_u16_at(data, CONTROL_FLAGS),
            "control flags",
            key_name,
            issues,
        )?;
        let country_code = options.recover(
            read_u16_at(data, COUNTRY_CODE),
            "country code",
            key_name,
            issues,
        )?;
        let code_page =
            options.recover(read_u16_at(data, CODE_PAGE), "code page", key_name, issues)?;
        let failed_logins = options.recover(
            read_u16_at(data, FAILED_LOGINS),
            "failed logins",
            key_name,
            issues,
        )?;
        let logins = options.recover(read_u16_at(data, LOGINS), "logins", key_name, issues)?;

        self.fixed = Some(FixedInfo {
            last_logon,
            password_last_set,
            account_expires,
            relative_id,
            primary_group_id,
            control_flags,
            country_code,
            code_page,
            failed_logins,
            logins,
        });
        Ok(())
    }

    /// Decode a `V` value. Only the username is required
    pub(crate) fn add_variable(
        &mut self,
        data: &[u8],
        options: &DecodeOptions,
    ) -> Result<(), SamError> {
        let username = match ACCOUNT_LAYOUT.field_string(data, &USERNAME, options.encoding) {
            Ok(result) => result,
            Err(err) => {
                error!(
                    "[sam] Could not decode username for account {}: {err}",
                    self.key_name
                );
                return Err(SamError::MissingUsername);
            }
        };

        let key_name = &self.key_name;
        let issues = &mut self.issues;
        let mut string_field = |field: &FieldDescriptor, name: &str| {
            options.recover(
                ACCOUNT_LAYOUT.field_string(data, field, options.encoding),
                name,
                key_name,
                issues,
            )
        };

        let full_name = string_field(&FULL_NAME, "full name")?;
        let comment = string_field(&COMMENT, "comment")?;
        let home_drive = string_field(&HOME_DRIVE, "home drive")?;
        let logon_script = string_field(&LOGON_SCRIPT, "logon script")?;
        let profile_path = string_field(&PROFILE_PATH, "profile path")?;
        let workstations = string_field(&WORKSTATIONS, "workstations")?;

        let lm_hash = options.recover(
            ACCOUNT_LAYOUT
                .field_bytes(data, &LM_HASH)
                .map(|hash| hash.to_vec()),
            "lm hash",
            key_name,
            issues,
        )?;
        let nt_hash = options.recover(
            ACCOUNT_LAYOUT
                .field_bytes(data, &NT_HASH)
                .map(|hash| hash.to_vec()),
            "nt hash",
            key_name,
            issues,
        )?;

        let sid = match find_account_sid(data) {
            Ok((_, result)) => result,
            Err(_err) => {
                debug!("[sam] No account SID in V value for {key_name}");
                String::new()
            }
        };

        self.variable = Some(VariableInfo {
            username,
            full_name,
            comment,
            home_drive,
            logon_script,
            profile_path,
            workstations,
            lm_hash,
            nt_hash,
            sid,
        });
        Ok(())
    }

    /// Username and last logon are both decoded
    pub(crate) fn is_complete(&self) -> bool {
        self.fixed.is_some() && self.variable.is_some()
    }

    /// Error for a key whose values ran out with only one of `F` or `V` decoded
    pub(crate) fn missing_error(&self) -> Option<SamError> {
        match (&self.fixed, &self.variable) {
            (Some(_), None) => Some(SamError::MissingUsername),
            (None, Some(_)) => Some(SamError::MissingTimestamp),
            _ => None,
        }
    }

    /// Emit the account once complete and reset for the next record
    pub(crate) fn take_record(&mut self) -> Option<AccountRecord> {
        if !self.is_complete() {
            return None;
        }
        let fixed = self.fixed.take()?;
        let variable = self.variable.take()?;
        let issues = std::mem::take(&mut self.issues);

        Some(AccountRecord {
            key_name: self.key_name.clone(),
            last_logon: fixed.last_logon,
            password_last_set: fixed.password_last_set,
            account_expires: fixed.account_expires,
            relative_id: fixed.relative_id,
            primary_group_id: fixed.primary_group_id,
            control_flags: fixed.control_flags,
            account_flags: get_flags(&fixed.control_flags),
            country_code: fixed.country_code,
            code_page: fixed.code_page,
            failed_logins: fixed.failed_logins,
            logins: fixed.logins,
            username: variable.username,
            full_name: variable.full_name,
            comment: variable.comment,
            home_drive: variable.home_drive,
            logon_script: variable.logon_script,
            profile_path: variable.profile_path,
            workstations: variable.workstations,
            lm_hash: variable.lm_hash,
            nt_hash: variable.nt_hash,
            sid: variable.sid,
            issues,
        })
    }

    fn timestamp(
        &self,
        data: &[u8],
        position: usize,
        name: &str,
    ) -> Result<WindowsTime, SamError> {
        let time_size = 8;
        let time_data = match read_slice_at(data, position, time_size) {
            Ok(result) => result,
            Err(err) => {
                error!(
                    "[sam] Could not read {name} for account {}: {err}",
                    self.key_name
                );
                return Err(SamError::MissingTimestamp);
            }
        };
        match decode_filetime(time_data) {
            Ok(result) => Ok(result),
            Err(err) => {
                error!(
                    "[sam] Could not decode {name} for account {}: {err:?}",
                    self.key_name
                );
                Err(SamError::MissingTimestamp)
            }
        }
    }
}

/// Decode every account key under `path`
pub(crate) fn parse_accounts<R: HiveReader>(
    reader: &R,
    path: &str,
    options: &DecodeOptions,
) -> Result<(Vec<AccountRecord>, Vec<DecodeFailure>), SamError> {
    let users = reader.open(path).map_err(SamError::Hive)?;
    let mut accounts = Vec::new();
    let mut failures = Vec::new();

    for key in reader.subkeys(&users).map_err(SamError::Hive)? {
        let key_name = reader.key_name(&key);
        // Template entry and the username to RID index
        if key_name == "Name" || key_name == "Names" {
            continue;
        }

        let mut accumulator = UserAccumulator::new(&key_name);
        let mut failed = false;
        for value in reader.values(&key).map_err(SamError::Hive)? {
            let value_name = reader.value_name(&value);
            if value_name != "F" && value_name != "V" {
                continue;
            }
            let data = reader.value_bytes(&value).map_err(SamError::Hive)?;
            debug!(
                "[sam] Decoding {value_name} value ({} bytes) for account {key_name}",
                data.len()
            );

            let result = if value_name == "F" {
                accumulator.add_fixed(&data, options)
            } else {
                accumulator.add_variable(&data, options)
            };

            if let Err(err) = result {
                failures.push(DecodeFailure {
                    key_name: key_name.clone(),
                    record: String::from("account"),
                    error: err.to_string(),
                });
                failed = true;
                break;
            }
            if let Some(account) = accumulator.take_record() {
                accounts.push(account);
            }
        }

        if failed {
            continue;
        }
        if let Some(err) = accumulator.missing_error() {
            error!("[sam] Account {key_name} is missing a value: {err}");
            failures.push(DecodeFailure {
                key_name: key_name.clone(),
                record: String::from("account"),
                error: err.to_string(),
            });
        }
    }

    info!("[sam] Decoded {} accounts from {path}", accounts.len());
    Ok((accounts, failures))
}

/// Account SIDs are stored near the end of the `V` value
fn find_account_sid(data: &[u8]) -> nom::IResult<&[u8], String> {
    let sid_start: [u8; 8] = [1, 5, 0, 0, 0, 0, 0, 5];
    let (input, _) = take_until(sid_start.as_slice())(data)?;
    let sid_size: u8 = 28;
    let (_, sid_data) = take(sid_size)(input)?;

    grab_sid(sid_data)
}

/// Determine the account control (ACB) flags
fn get_flags(control_flags: &u16) -> Vec<UacFlags> {
    let disabled = 0x1;
    let home_dir = 0x2;
    let no_pass = 0x4;
    let temp_dupe = 0x8;
    let normal = 0x10;
    let user_mns = 0x20;
    let interdomain = 0x40;
    let workstation = 0x80;
    let server_trust = 0x100;
    let dont_expire = 0x200;
    let auto_lock = 0x400;
    let text_pass = 0x800;
    let smartcard = 0x1000;
    let trusted_delegate = 0x2000;
    let not_delegate = 0x4000;
    let des_key = 0x8000;

    let mut flags = Vec::new();
    if (control_flags & disabled) == disabled {
        flags.push(UacFlags::AccountDisabled);
    }
    if (control_flags & home_dir) == home_dir {
        flags.push(UacFlags::HomeDirectoryRequired);
    }
    if (control_flags & no_pass) == no_pass {
        flags.push(UacFlags::PasswordNotRequired);
    }
    if (control_flags & temp_dupe) == temp_dupe {
        flags.push(UacFlags::TempDuplicateAccount);
    }
    if (control_flags & normal) == normal {
        flags.push(UacFlags::NormalAccount);
    }
    if (control_flags & user_mns) == user_mns {
        flags.push(UacFlags::MNSLogonAccount);
    }
    if (control_flags & interdomain) == interdomain {
        flags.push(UacFlags::InterdomainTrustAccount);
    }
    if (control_flags & workstation) == workstation {
        flags.push(UacFlags::WorkstationTrustAccount);
    }
    if (control_flags & server_trust) == server_trust {
        flags.push(UacFlags::ServerTrustAccount);
    }
    if (control_flags & dont_expire) == dont_expire {
        flags.push(UacFlags::DontExpirePassword);
    }
    if (control_flags & auto_lock) == auto_lock {
        flags.push(UacFlags::AccountAutoLocked);
    }
    if (control_flags & text_pass) == text_pass {
        flags.push(UacFlags::EncryptedTextPasswordAllowed);
    }
    if (control_flags & smartcard) == smartcard {
        flags.push(UacFlags::SmartcardRequired);
    }
    if (control_flags & trusted_delegate) == trusted_delegate {
        flags.push(UacFlags::TrustedForDelegation);
    }
    if (control_flags & not_delegate) == not_delegate {
        flags.push(UacFlags::NotDelegated);
    }
    if (control_flags & des_key) == des_key {
        flags.push(UacFlags::UseDESKeyOnly);
    }
    flags
}
