/**
 * Local groups are stored under `SAM\Domains\Builtin\Aliases\<RID>`.
 * The `C` value holds the group name, comment and a table of member SIDs
 */
use super::{
    descriptor::{read_u32_at, FieldDescriptor, GROUP_LAYOUT},
    error::SamError,
    hive::HiveReader,
    parser::DecodeOptions,
};
use crate::artifacts::os::windows::securitydescriptor::sid::decode_sid;
use common::windows::{DecodeFailure, DecodeStatus, GroupRecord};
use log::{debug, error, info, warn};

const NAME: FieldDescriptor = FieldDescriptor::at(16);
const COMMENT: FieldDescriptor = FieldDescriptor::at(28);
const MEMBER_OFFSET: usize = 40;
const MEMBER_COUNT: usize = 48;

/// Decode every group key under `path`
pub(crate) fn parse_groups<R: HiveReader>(
    reader: &R,
    path: &str,
    options: &DecodeOptions,
) -> Result<(Vec<GroupRecord>, Vec<DecodeFailure>), SamError> {
    let aliases = reader.open(path).map_err(SamError::Hive)?;
    let mut groups = Vec::new();
    let mut failures = Vec::new();

    for key in reader.subkeys(&aliases).map_err(SamError::Hive)? {
        let key_name = reader.key_name(&key);
        for value in reader.values(&key).map_err(SamError::Hive)? {
            if reader.value_name(&value) != "C" {
                continue;
            }
            let data = reader.value_bytes(&value).map_err(SamError::Hive)?;
            match parse_group(&data, &key_name, options) {
                Ok(group) => groups.push(group),
                Err(err) => failures.push(DecodeFailure {
                    key_name: key_name.clone(),
                    record: String::from("group"),
                    error: err.to_string(),
                }),
            }
        }
    }

    info!("[sam] Decoded {} groups from {path}", groups.len());
    Ok((groups, failures))
}

/// Decode a `C` value
pub(crate) fn parse_group(
    data: &[u8],
    key_name: &str,
    options: &DecodeOptions,
) -> Result<GroupRecord, SamError> {
    let name = match GROUP_LAYOUT.field_string(data, &NAME, options.encoding) {
        Ok(result) => result,
        Err(err) => {
            error!("[sam] Could not decode name for group {key_name}: {err}");
            return Err(err);
        }
    };

    let mut issues = Vec::new();
    let comment = options.recover(
        GROUP_LAYOUT.field_string(data, &COMMENT, options.encoding),
        "comment",
        key_name,
        &mut issues,
    )?;

    let member_offset = read_u32_at(data, MEMBER_OFFSET)?;
    let member_count = read_u32_at(data, MEMBER_COUNT)?;

    let mut group = GroupRecord {
        key_name: key_name.to_string(),
        name,
        comment,
        member_count,
        members: Vec::new(),
        status: DecodeStatus::Complete,
        issues,
    };

    let mut cursor = GROUP_LAYOUT.position(member_offset);
    while group.members.len() < member_count as usize {
        let decoded = match &cursor {
            Ok(position) => decode_sid(data, *position),
            Err(_err) => Err(SamError::Bounds),
        };
        let (sid, consumed) = match decoded {
            Ok(result) => result,
            Err(SamError::UnrecognizedSidVariant) => {
                warn!(
                    "[sam] Group {key_name} member {} has an unrecognized SID. Stopping member walk",
                    group.members.len()
                );
                group.status = DecodeStatus::Partial;
                group
                    .issues
                    .push(SamError::UnrecognizedSidVariant.to_string());
                break;
            }
            Err(err) => {
                warn!(
                    "[sam] Group {key_name} has {} of {member_count} members: {err}",
                    group.members.len()
                );
                group.status = DecodeStatus::Partial;
                group.issues.push(SamError::MemberCountMismatch.to_string());
                break;
            }
        };
        debug!("[sam] Group {key_name} member {sid}");
        group.members.push(sid);
        cursor = cursor
            .and_then(|position| position.checked_add(consumed).ok_or(SamError::Bounds));
    }

    Ok(group)
}
