/**
 * SAM `V` and `C` values start with a header of (offset, length) pairs describing variable sized fields.
 * Offsets are relative to a base displacement that differs per record type
 */
use super::error::SamError;
use crate::utils::{
    encoding::base64_encode_standard,
    nom_helper::{nom_data, nom_unsigned_four_bytes, nom_unsigned_two_bytes, Endian},
    strings::{extract_embedded_string, StringEncoding},
};
use log::warn;

/// Header positions of a field's offset and length
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FieldDescriptor {
    pub(crate) offset_position: usize,
    pub(crate) length_position: usize,
}

impl FieldDescriptor {
    /// Length is always stored four (4) bytes after the offset
    pub(crate) const fn at(offset_position: usize) -> FieldDescriptor {
        FieldDescriptor {
            offset_position,
            length_position: offset_position + 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RecordLayout {
    pub(crate) base: usize,
}

/// Account `V` values
pub(crate) const ACCOUNT_LAYOUT: RecordLayout = RecordLayout { base: 0xcc };
/// Group `C` values
pub(crate) const GROUP_LAYOUT: RecordLayout = RecordLayout { base: 0x34 };

impl RecordLayout {
    /// Read the field described at `field` from the variable tail of the record
    pub(crate) fn field_bytes<'a>(
        &self,
        data: &'a [u8],
        field: &FieldDescriptor,
    ) -> Result<&'a [u8], SamError> {
        let offset = read_u32_at(data, field.offset_position)?;
        let length = read_u32_at(data, field.length_position)?;

        let start = self.position(offset)?;
        let tail = read_slice_at(data, start, length as usize)?;
        Ok(tail)
    }

    /// Read and decode a string field. NUL padding is removed
    pub(crate) fn field_string(
        &self,
        data: &[u8],
        field: &FieldDescriptor,
        encoding: StringEncoding,
    ) -> Result<String, SamError> {
        let string_data = self.field_bytes(data, field)?;
        match extract_embedded_string(string_data, encoding) {
            Ok(result) => Ok(result),
            Err(err) => {
                warn!(
                    "[sam] Field at header position {} is not valid text ({err}): {}",
                    field.offset_position,
                    base64_encode_standard(string_data)
                );
                Err(SamError::Encoding)
            }
        }
    }

    /// Absolute position of a base relative offset
    pub(crate) fn position(&self, offset: u32) -> Result<usize, SamError> {
        match self.base.checked_add(offset as usize) {
            Some(result) => Ok(result),
            None => {
                warn!("[sam] Offset {offset} overflows the record base {}", self.base);
                Err(SamError::Bounds)
            }
        }
    }
}

/// Read `size` bytes at `position`
pub(crate) fn read_slice_at(data: &[u8], position: usize, size: usize) -> Result<&[u8], SamError> {
    let remaining = match nom_data(data, position as u64) {
        Ok((result, _)) => result,
        Err(_err) => return Err(SamError::Bounds),
    };
    match nom_data(remaining, size as u64) {
        Ok((_, result)) => Ok(result),
        Err(_err) => Err(SamError::Bounds),
    }
}

/// Read a little endian u32 at `position`
pub(crate) fn read_u32_at(data: &[u8], position: usize) -> Result<u32, SamError> {
    let value_data = read_slice_at(data, position, 4)?;
    match nom_unsigned_four_bytes(value_data, Endian::Le) {
        Ok((_, result)) => Ok(result),
        Err(_err) => Err(SamError::Bounds),
    }
}

/// Read a little endian u16 at `position`
pub(crate) fn read_u16_at(data: &[u8], position: usize) -> Result<u16, SamError> {
    let value_data = read_slice_at(data, position, 2)?;
    match nom_unsigned_two_bytes(value_data, Endian::Le) {
        Ok((_, result)) => Ok(result),
        Err(_err) => Err(SamError::Bounds),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        read_slice_at, read_u16_at, read_u32_at, FieldDescriptor, RecordLayout, ACCOUNT_LAYOUT,
        GROUP_LAYOUT,
    };
    use crate::{
        artifacts::os::windows::sam::error::SamError, utils::strings::StringEncoding,
    };

    #[test]
    fn test_field_descriptor_at() {
        let field = FieldDescriptor::at(12);
        assert_eq!(field.offset_position, 12);
        assert_eq!(field.length_position, 16);
    }

    #[test]
    fn test_field_bytes() {
        let mut test = vec![0u8; 0x34 + 8];
        // offset 2, length 4
        test[16..20].copy_from_slice(&2u32.to_le_bytes());
        test[20..24].copy_from_slice(&4u32.to_le_bytes());
        test[0x36..0x3a].copy_from_slice(&[9, 8, 7, 6]);

        let result = GROUP_LAYOUT
            .field_bytes(&test, &FieldDescriptor::at(16))
            .unwrap();
        assert_eq!(result, [9, 8, 7, 6]);

        // Same header read with the account base lands outside the data
        let result = ACCOUNT_LAYOUT.field_bytes(&test, &FieldDescriptor::at(16));
        assert_eq!(result, Err(SamError::Bounds));
    }

    #[test]
    fn test_field_bytes_empty() {
        let test = vec![0u8; 0xcc];
        let result = ACCOUNT_LAYOUT
            .field_bytes(&test, &FieldDescriptor::at(24))
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_field_bytes_bad_length() {
        let mut test = vec![0u8; 0xcc + 4];
        test[16..20].copy_from_slice(&u32::MAX.to_le_bytes());
        let result = ACCOUNT_LAYOUT.field_bytes(&test, &FieldDescriptor::at(12));
        assert_eq!(result, Err(SamError::Bounds));
    }

    #[test]
    fn test_position() {
        assert_eq!(ACCOUNT_LAYOUT.position(0x10).unwrap(), 0xdc);
        assert_eq!(GROUP_LAYOUT.position(0).unwrap(), 0x34);

        let layout = RecordLayout {
            base: usize::MAX - 1,
        };
        assert_eq!(layout.position(1).unwrap(), usize::MAX);
        assert_eq!(layout.position(2), Err(SamError::Bounds));
        assert_eq!(layout.position(u32::MAX), Err(SamError::Bounds));
    }

    #[test]
    fn test_field_bytes_offset_overflow() {
        let mut test = vec![0u8; 0x34 + 8];
        test[16..20].copy_from_slice(&u32::MAX.to_le_bytes());
        test[20..24].copy_from_slice(&4u32.to_le_bytes());

        let layout = RecordLayout {
            base: usize::MAX - 0x10,
        };
        let result = layout.field_bytes(&test, &FieldDescriptor::at(16));
        assert_eq!(result, Err(SamError::Bounds));
        let result = GROUP_LAYOUT.field_bytes(&test, &FieldDescriptor::at(16));
        assert_eq!(result, Err(SamError::Bounds));
    }

    #[test]
    fn test_field_bytes_short_header() {
        let test = [0u8; 10];
        let result = ACCOUNT_LAYOUT.field_bytes(&test, &FieldDescriptor::at(12));
        assert_eq!(result, Err(SamError::Bounds));
    }

    #[test]
    fn test_read_numbers() {
        let test = [0, 0, 0xe9, 0x03, 0, 0];
        assert_eq!(read_u32_at(&test, 2).unwrap(), 1001);
        assert_eq!(read_u16_at(&test, 2).unwrap(), 1001);
        assert_eq!(read_u32_at(&test, 3), Err(SamError::Bounds));
        assert_eq!(read_slice_at(&test, 6, 0).unwrap().len(), 0);
        assert_eq!(read_slice_at(&test, 7, 0), Err(SamError::Bounds));
    }

    #[test]
    fn test_field_string() {
        let mut test = vec![0u8; 0x34];
        test[28..32].copy_from_slice(&0u32.to_le_bytes());
        test[32..36].copy_from_slice(&10u32.to_le_bytes());
        test.extend_from_slice(&[85, 0, 115, 0, 101, 0, 114, 0, 115, 0]);

        let field = FieldDescriptor::at(28);
        let result = GROUP_LAYOUT
            .field_string(&test, &field, StringEncoding::Utf16)
            .unwrap();
        assert_eq!(result, "Users");

        let result = GROUP_LAYOUT
            .field_string(&test, &field, StringEncoding::Utf8)
            .unwrap();
        assert_eq!(result, "Users");
    }

    #[test]
    fn test_field_string_bad_text() {
        let mut test = vec![0u8; 0x34];
        test[32..36].copy_from_slice(&3u32.to_le_bytes());
        test.extend_from_slice(&[85, 0, 115]);

        let result = GROUP_LAYOUT.field_string(&test, &FieldDescriptor::at(28), StringEncoding::Utf16);
        assert_eq!(result, Err(SamError::Encoding));
    }
}
