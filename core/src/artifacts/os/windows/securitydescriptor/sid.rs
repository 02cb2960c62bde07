use crate::{
    artifacts::os::windows::sam::error::SamError,
    utils::nom_helper::{nom_data, nom_unsigned_four_bytes, nom_unsigned_one_byte, Endian},
};
use byteorder::{BigEndian, ReadBytesExt};
use log::warn;
use nom::bytes::complete::take;

/**
 * SIDs stored in SAM group member tables. The first four (4) bytes (revision, sub authority count and two zero bytes) select the layout
 */
#[derive(Debug, PartialEq, Clone, Copy)]
pub(crate) enum SidVariant {
    /**Discriminator `0x00000501`. Four sub authorities followed by the RID. Ex: S-1-5-21-X-Y-Z-1000 */
    DomainAccount,
    /**Discriminator `0x00000101`. One sub authority. Ex: S-1-5-32 */
    WellKnown,
}

impl SidVariant {
    pub(crate) fn from_discriminator(discriminator: u32) -> Option<SidVariant> {
        match discriminator {
            0x00000501 => Some(SidVariant::DomainAccount),
            0x00000101 => Some(SidVariant::WellKnown),
            _ => None,
        }
    }

    /// Number of little endian u32 components after the identifier authority
    pub(crate) fn sub_authorities(&self) -> u8 {
        match self {
            SidVariant::DomainAccount => 5,
            SidVariant::WellKnown => 1,
        }
    }

    /// Size of the variant in bytes. 28 for domain accounts, 12 for well known SIDs
    pub(crate) fn size(&self) -> usize {
        let header_size = 8;
        let sub_authority_size = 4;
        header_size + self.sub_authorities() as usize * sub_authority_size
    }
}

/// Decode the SID at `cursor`. Returns the SID string and number of bytes consumed
pub(crate) fn decode_sid(data: &[u8], cursor: usize) -> Result<(String, usize), SamError> {
    let sid_data = match nom_data(data, cursor as u64) {
        Ok((remaining, _)) => remaining,
        Err(_err) => return Err(SamError::Bounds),
    };

    // Peek the discriminator. The SID parser reads the same bytes again
    let discriminator = match nom_unsigned_four_bytes(sid_data, Endian::Le) {
        Ok((_, result)) => result,
        Err(_err) => return Err(SamError::Bounds),
    };

    let variant = match SidVariant::from_discriminator(discriminator) {
        Some(result) => result,
        None => {
            warn!("[sid] Unrecognized SID discriminator {discriminator:#010x} at offset {cursor}");
            return Err(SamError::UnrecognizedSidVariant);
        }
    };

    let variant_data = match nom_data(sid_data, variant.size() as u64) {
        Ok((_, result)) => result,
        Err(_err) => {
            warn!(
                "[sid] {variant:?} SID at offset {cursor} needs {} bytes, only {} remain",
                variant.size(),
                sid_data.len()
            );
            return Err(SamError::Bounds);
        }
    };

    match parse_sid(variant_data, variant.sub_authorities()) {
        Ok((_, sid)) => Ok((sid, variant.size())),
        Err(_err) => Err(SamError::Bounds),
    }
}

/**
 * Parse the data into a properly formatted SID using the sub authority count stored in the SID
 */
pub(crate) fn grab_sid(data: &[u8]) -> nom::IResult<&[u8], String> {
    let (input, _sid_revision) = nom_unsigned_one_byte(data, Endian::Le)?;
    let (_, subauthorities) = nom_unsigned_one_byte(input, Endian::Le)?;

    parse_sid(data, subauthorities)
}

/// Revision, sub authority count, 6 byte big endian identifier authority, then `subauthorities` little endian u32 values
fn parse_sid(data: &[u8], subauthorities: u8) -> nom::IResult<&[u8], String> {
    let (input, sid_revision) = nom_unsigned_one_byte(data, Endian::Le)?;
    let (input, _sid_count) = nom_unsigned_one_byte(input, Endian::Le)?;
    let authority_size: usize = 6;
    let (mut sid_data, mut authority) = take(authority_size)(input)?;

    let auth = authority.read_u48::<BigEndian>().unwrap_or(0);
    let mut windows_sid = format!("S-{sid_revision}-{auth}");
    for _ in 0..subauthorities {
        let (sub_data, subauth_sid) = nom_unsigned_four_bytes(sid_data, Endian::Le)?;
        windows_sid += &format!("-{subauth_sid}");
        sid_data = sub_data;
    }

    Ok((sid_data, windows_sid))
}
