//! Textual UUID <-> Windows `GUID` byte layout.
//!
//! The first three groups are stored little-endian, the last two as raw bytes,
//! which is exactly `uuid`'s `*_bytes_le` representation.

use uuid::Uuid;

use crate::PsrpError;

const HYPHENATED_LEN: usize = 36;

/// Encodes a hyphenated UUID into its 16-byte GUID form. `None` yields the nil GUID.
pub fn encode(text: Option<&str>) -> Result<[u8; 16], PsrpError> {
    let uuid = text.map(parse).transpose()?;
    Ok(to_guid_bytes(uuid.as_ref()))
}

/// Decodes a 16-byte GUID into its lower-case hyphenated form.
pub fn decode(bytes: &[u8; 16]) -> String {
    from_guid_bytes(bytes)
        .unwrap_or_default()
        .hyphenated()
        .to_string()
}

/// GUID bytes of a message header field; absent ids are written as nil.
pub fn to_guid_bytes(uuid: Option<&Uuid>) -> [u8; 16] {
    uuid.map_or([0u8; 16], Uuid::to_bytes_le)
}

/// Reads a message header GUID field. The nil GUID means "absent".
pub fn from_guid_bytes(bytes: &[u8; 16]) -> Option<Uuid> {
    let uuid = Uuid::from_bytes_le(*bytes);
    (!uuid.is_nil()).then_some(uuid)
}

/// Parses `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`, case-insensitive.
pub fn parse(text: &str) -> Result<Uuid, PsrpError> {
    let invalid = || PsrpError::InvalidUuid {
        text: text.to_owned(),
    };

    let well_formed = text.len() == HYPHENATED_LEN
        && text.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        });
    if !well_formed {
        return Err(invalid());
    }

    Uuid::try_parse(text).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_first_three_groups_little_endian() {
        let bytes = encode(Some("00112233-4455-6677-8899-aabbccddeeff")).unwrap();
        assert_eq!(
            bytes,
            [
                0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66, 0x88, 0x99, 0xaa, 0xbb, 0xcc,
                0xdd, 0xee, 0xff
            ]
        );
    }

    #[test]
    fn round_trips_to_lower_case() {
        let text = "0E0D4A86-B6A5-4B8B-9C3B-AD2B0C6E6F2A";
        let bytes = encode(Some(text)).unwrap();
        assert_eq!(decode(&bytes), text.to_lowercase());
    }

    #[test]
    fn nil_encodes_to_zero_bytes() {
        assert_eq!(encode(None).unwrap(), [0u8; 16]);
        assert_eq!(decode(&[0u8; 16]), "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn nil_header_field_reads_as_absent() {
        assert_eq!(from_guid_bytes(&[0u8; 16]), None);
        let id = parse("0e0d4a86-b6a5-4b8b-9c3b-ad2b0c6e6f2a").unwrap();
        assert_eq!(from_guid_bytes(&to_guid_bytes(Some(&id))), Some(id));
    }

    #[test]
    fn rejects_malformed_text() {
        for bad in [
            "",
            "not-a-uuid",
            "0011223344556677-8899-aabbccddeeff",
            "00112233-4455-6677-8899-aabbccddeefg",
            "{00112233-4455-6677-8899-aabbccddeeff}",
            "00112233+4455-6677-8899-aabbccddeeff",
        ] {
            assert!(
                matches!(encode(Some(bad)), Err(PsrpError::InvalidUuid { .. })),
                "{bad} should be rejected"
            );
        }
    }
}
