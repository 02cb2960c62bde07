/**
 * Decode local accounts and groups from a SAM hive
 *
 * Accounts are read from the `F` and `V` values of each key under `SAM\Domains\Account\Users`.
 * Groups are read from the `C` value of each key under `SAM\Domains\Builtin\Aliases`.
 *
 * References:
 *   `https://github.com/libyal/winreg-kb/blob/main/documentation/Security%20Account%20Manager%20(SAM)%20keys.asciidoc`
 *   `https://www.sans.org/blog/digital-forensics-sam-hive/`
 */
use super::{
    error::SamError,
    groups::parse_groups,
    hive::{HiveReader, RegistryExport},
    users::parse_accounts,
};
use crate::{structs::toml::SamOptions, utils::strings::StringEncoding};
use common::windows::SamResults;
use log::{error, info, warn};
use std::thread;

pub const ACCOUNTS_PATH: &str = "SAM\\Domains\\Account\\Users";
pub const GROUPS_PATH: &str = "SAM\\Domains\\Builtin\\Aliases";

/// Settings shared by the account and group decoders
#[derive(Debug, Clone, Copy)]
pub(crate) struct DecodeOptions {
    pub(crate) strict_fields: bool,
    pub(crate) encoding: StringEncoding,
}

impl DecodeOptions {
    pub(crate) fn from_options(options: &SamOptions) -> DecodeOptions {
        let encoding = match &options.encoding {
            Some(name) => StringEncoding::from_name(name),
            None => StringEncoding::Utf16,
        };
        DecodeOptions {
            strict_fields: options.strict_fields.unwrap_or(false),
            encoding,
        }
    }

    /// Apply the field error policy. Non-strict decoding replaces a bad field with its default value and records the problem
    pub(crate) fn recover<T: Default>(
        &self,
        result: Result<T, SamError>,
        field: &str,
        key_name: &str,
        issues: &mut Vec<String>,
    ) -> Result<T, SamError> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                if self.strict_fields {
                    error!("[sam] Could not decode {field} for key {key_name}: {err}");
                    return Err(err);
                }
                warn!("[sam] Could not decode {field} for key {key_name}: {err}. Using empty value");
                issues.push(format!("{field}: {err}"));
                Ok(T::default())
            }
        }
    }
}

/// Decode accounts and groups using the paths and settings in `options`
pub fn grab_sam<R>(reader: &R, options: &SamOptions) -> Result<SamResults, SamError>
where
    R: HiveReader + Sync,
{
    let decode = DecodeOptions::from_options(options);
    let accounts_path = options.accounts_path.as_deref().unwrap_or(ACCOUNTS_PATH);
    let groups_path = options.groups_path.as_deref().unwrap_or(GROUPS_PATH);

    let ((accounts, mut account_failures), (groups, group_failures)) =
        if options.parallel.unwrap_or(false) {
            thread::scope(|scope| {
                let account_worker = scope.spawn(|| parse_accounts(reader, accounts_path, &decode));
                let group_results = parse_groups(reader, groups_path, &decode);

                let account_results = match account_worker.join() {
                    Ok(result) => result,
                    Err(_err) => {
                        error!("[sam] Account decoder thread panicked");
                        Err(SamError::Worker)
                    }
                };
                Ok::<_, SamError>((account_results?, group_results?))
            })?
        } else {
            (
                parse_accounts(reader, accounts_path, &decode)?,
                parse_groups(reader, groups_path, &decode)?,
            )
        };

    info!(
        "[sam] Decoded {} accounts and {} groups",
        accounts.len(),
        groups.len()
    );

    account_failures.extend(group_failures);
    Ok(SamResults {
        accounts,
        groups,
        failures: account_failures,
    })
}

/// Load the Registry export named in `options` and decode it
pub fn grab_sam_export(options: &SamOptions) -> Result<SamResults, SamError> {
    let export = RegistryExport::from_file(&options.export).map_err(SamError::Hive)?;
    grab_sam(&export, options)
}
