use std::io::Cursor;

use base64::Engine;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use tracing::trace;

use crate::PsrpError;

/// object id + fragment id + flags + blob length
pub const FRAGMENT_HEADER_LEN: usize = 8 + 8 + 1 + 4;

const START_FLAG: u8 = 0x01;
const END_FLAG: u8 = 0x02;

/// One chunk of a packed [`crate::PsrpMessage`].
///
/// <https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-psrp/3610dae4-67f7-4175-82da-a3fab83af288>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub object_id: u64,
    pub fragment_id: u64,
    pub start: bool,
    pub end: bool,
    pub data: Vec<u8>,
}

impl Fragment {
    pub fn new(object_id: u64, fragment_id: u64, data: Vec<u8>, start: bool, end: bool) -> Self {
        Self {
            object_id,
            fragment_id,
            start,
            end,
            data,
        }
    }

    pub fn pack(&self) -> Result<Vec<u8>, PsrpError> {
        let blob_length = u32::try_from(self.data.len()).map_err(|_| {
            PsrpError::InvalidMessage(format!("Fragment blob too large: {}", self.data.len()))
        })?;

        let mut buffer = Vec::with_capacity(FRAGMENT_HEADER_LEN + self.data.len());
        buffer.write_u64::<BigEndian>(self.object_id)?;
        buffer.write_u64::<BigEndian>(self.fragment_id)?;

        let mut flags = 0u8;
        if self.start {
            flags |= START_FLAG;
        }
        if self.end {
            flags |= END_FLAG;
        }
        buffer.write_u8(flags)?;
        buffer.write_u32::<BigEndian>(blob_length)?;
        buffer.extend_from_slice(&self.data);

        Ok(buffer)
    }

    pub fn pack_as_base64(&self) -> Result<String, PsrpError> {
        Ok(base64::engine::general_purpose::STANDARD.encode(self.pack()?))
    }

    /// Unpacks one fragment and returns whatever bytes follow it.
    pub fn unpack(data: &[u8]) -> Result<(Self, &[u8]), PsrpError> {
        if data.len() < FRAGMENT_HEADER_LEN {
            return Err(PsrpError::InvalidMessage(format!(
                "Fragment too short, need at least {FRAGMENT_HEADER_LEN} bytes, got {}",
                data.len()
            )));
        }

        let mut cursor = Cursor::new(data);
        let object_id = cursor.read_u64::<BigEndian>()?;
        let fragment_id = cursor.read_u64::<BigEndian>()?;
        let flags = cursor.read_u8()?;
        let start = (flags & START_FLAG) != 0;
        let end = (flags & END_FLAG) != 0;
        let length = cursor.read_u32::<BigEndian>()? as usize;

        trace!(
            target: "fragmentation",
            object_id,
            fragment_id,
            start,
            end,
            length,
            "unpacked fragment header"
        );

        let Some(blob) = data.get(FRAGMENT_HEADER_LEN..FRAGMENT_HEADER_LEN + length) else {
            return Err(PsrpError::InvalidMessage(format!(
                "Fragment data truncated: expected {} bytes, got {}",
                FRAGMENT_HEADER_LEN + length,
                data.len()
            )));
        };

        let fragment = Self::new(object_id, fragment_id, blob.to_vec(), start, end);
        Ok((fragment, &data[FRAGMENT_HEADER_LEN + length..]))
    }
}
