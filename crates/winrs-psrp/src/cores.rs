use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use uuid::Uuid;

use crate::PsrpError;
use crate::ps_value::PsObjectWithType;
use crate::uuid_codec::{from_guid_bytes, to_guid_bytes};

/// UTF-8 byte order mark written in front of every message's CLIXML payload.
pub const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// destination + message type + two GUIDs + BOM
pub const MESSAGE_HEADER_LEN: usize = 4 + 4 + 16 + 16 + BOM.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Client = 0x0000_0001,
    Server = 0x0000_0002,
}

impl TryFrom<u32> for Destination {
    type Error = PsrpError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0x0000_0001 => Ok(Self::Client),
            0x0000_0002 => Ok(Self::Server),
            _ => Err(PsrpError::InvalidMessage(format!(
                "Unknown Destination value: 0x{value:08x}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    SessionCapability,
    InitRunspacepool,
    PublicKey,
    EncryptedSessionKey,
    PublicKeyRequest,
    ConnectRunspacepool,
    RunspacepoolInitData,
    ResetRunspaceState,
    SetMaxRunspaces,
    SetMinRunspaces,
    RunspaceAvailability,
    RunspacepoolState,
    CreatePipeline,
    GetAvailableRunspaces,
    UserEvent,
    ApplicationPrivateData,
    GetCommandMetadata,
    RunspacepoolHostCall,
    RunspacepoolHostResponse,
    PipelineInput,
    EndOfPipelineInput,
    PipelineOutput,
    ErrorRecord,
    PipelineState,
    DebugRecord,
    VerboseRecord,
    WarningRecord,
    ProgressRecord,
    InformationRecord,
    PipelineHostCall,
    PipelineHostResponse,
}

impl MessageType {
    pub const ALL: [Self; 31] = [
        Self::SessionCapability,
        Self::InitRunspacepool,
        Self::PublicKey,
        Self::EncryptedSessionKey,
        Self::PublicKeyRequest,
        Self::ConnectRunspacepool,
        Self::RunspacepoolInitData,
        Self::ResetRunspaceState,
        Self::SetMaxRunspaces,
        Self::SetMinRunspaces,
        Self::RunspaceAvailability,
        Self::RunspacepoolState,
        Self::CreatePipeline,
        Self::GetAvailableRunspaces,
        Self::UserEvent,
        Self::ApplicationPrivateData,
        Self::GetCommandMetadata,
        Self::RunspacepoolHostCall,
        Self::RunspacepoolHostResponse,
        Self::PipelineInput,
        Self::EndOfPipelineInput,
        Self::PipelineOutput,
        Self::ErrorRecord,
        Self::PipelineState,
        Self::DebugRecord,
        Self::VerboseRecord,
        Self::WarningRecord,
        Self::ProgressRecord,
        Self::InformationRecord,
        Self::PipelineHostCall,
        Self::PipelineHostResponse,
    ];

    pub const fn value(self) -> u32 {
        match self {
            Self::SessionCapability => 0x00010002,
            Self::InitRunspacepool => 0x00010004,
            Self::PublicKey => 0x00010005,
            Self::EncryptedSessionKey => 0x00010006,
            Self::PublicKeyRequest => 0x00010007,
            Self::ConnectRunspacepool => 0x00010008,
            Self::RunspacepoolInitData => 0x0002100B,
            Self::ResetRunspaceState => 0x0002100C,
            Self::SetMaxRunspaces => 0x00021002,
            Self::SetMinRunspaces => 0x00021003,
            Self::RunspaceAvailability => 0x00021004,
            Self::RunspacepoolState => 0x00021005,
            Self::CreatePipeline => 0x00021006,
            Self::GetAvailableRunspaces => 0x00021007,
            Self::UserEvent => 0x00021008,
            Self::ApplicationPrivateData => 0x00021009,
            Self::GetCommandMetadata => 0x0002100A,
            Self::RunspacepoolHostCall => 0x00021100,
            Self::RunspacepoolHostResponse => 0x00021101,
            Self::PipelineInput => 0x00041002,
            Self::EndOfPipelineInput => 0x00041003,
            Self::PipelineOutput => 0x00041004,
            Self::ErrorRecord => 0x00041005,
            Self::PipelineState => 0x00041006,
            Self::DebugRecord => 0x00041007,
            Self::VerboseRecord => 0x00041008,
            Self::WarningRecord => 0x00041009,
            Self::ProgressRecord => 0x00041010,
            Self::InformationRecord => 0x00041011,
            Self::PipelineHostCall => 0x00041100,
            Self::PipelineHostResponse => 0x00041101,
        }
    }
}

impl TryFrom<u32> for MessageType {
    type Error = PsrpError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.value() == value)
            .ok_or(PsrpError::UnknownMessageType(value))
    }
}

/// A single PSRP message, the unit carried by one or more fragments.
///
/// <https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-psrp/497ac440-89fb-4cb3-9cc1-3434c1aa74c3>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsrpMessage {
    pub destination: Destination,
    pub message_type: MessageType,
    /// Runspace pool id
    pub rpid: Uuid,
    /// Pipeline id, absent for runspace-pool scoped messages
    pub pid: Option<Uuid>,
    /// CLIXML payload, without the BOM
    pub data: Vec<u8>,
}

impl PsrpMessage {
    pub fn new(
        destination: Destination,
        message_type: MessageType,
        rpid: Uuid,
        pid: Option<Uuid>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            destination,
            message_type,
            rpid,
            pid,
            data: data.into(),
        }
    }

    /// Serializes a client message bound for the server.
    pub fn from_ps_message(
        message: &dyn PsObjectWithType,
        rpid: Uuid,
        pid: Option<Uuid>,
    ) -> Result<Self, PsrpError> {
        let data = message.to_ps_object().to_clixml()?;
        Ok(Self::new(
            Destination::Server,
            message.message_type(),
            rpid,
            pid,
            data.into_bytes(),
        ))
    }

    pub fn packed_len(&self) -> usize {
        MESSAGE_HEADER_LEN + self.data.len()
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.packed_len());
        buffer.extend_from_slice(&(self.destination as u32).to_le_bytes());
        buffer.extend_from_slice(&self.message_type.value().to_le_bytes());
        buffer.extend_from_slice(&to_guid_bytes(Some(&self.rpid)));
        buffer.extend_from_slice(&to_guid_bytes(self.pid.as_ref()));
        buffer.extend_from_slice(&BOM);
        buffer.extend_from_slice(&self.data);
        buffer
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, PsrpError> {
        if bytes.len() < MESSAGE_HEADER_LEN - BOM.len() {
            return Err(PsrpError::InvalidMessage(format!(
                "Message too short: {} bytes",
                bytes.len()
            )));
        }

        let mut cursor = Cursor::new(bytes);
        let destination = Destination::try_from(cursor.read_u32::<LittleEndian>()?)?;
        let message_type = MessageType::try_from(cursor.read_u32::<LittleEndian>()?)?;

        let mut rpid_bytes = [0u8; 16];
        cursor.read_exact(&mut rpid_bytes)?;

        let mut pid_bytes = [0u8; 16];
        cursor.read_exact(&mut pid_bytes)?;

        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest)?;
        if rest.starts_with(&BOM) {
            rest.drain(..BOM.len());
        }

        Ok(Self {
            destination,
            message_type,
            rpid: from_guid_bytes(&rpid_bytes).unwrap_or_default(),
            pid: from_guid_bytes(&pid_bytes),
            data: rest,
        })
    }

    /// Payload as text, repairing invalid UTF-8 rather than failing.
    pub fn data_as_text(&self) -> String {
        crate::text::repair_utf8(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_constant_matches_layout() {
        assert_eq!(MESSAGE_HEADER_LEN, 43);
    }

    #[test]
    fn pack_writes_little_endian_header_and_bom() {
        let rpid = Uuid::parse_str("00112233-4455-6677-8899-aabbccddeeff").unwrap();
        let message = PsrpMessage::new(
            Destination::Server,
            MessageType::SessionCapability,
            rpid,
            None,
            b"<Obj/>".to_vec(),
        );

        let packed = message.pack();
        assert_eq!(packed.len(), 43 + 6);
        assert_eq!(&packed[0..4], &[2, 0, 0, 0]);
        assert_eq!(&packed[4..8], &[0x02, 0x00, 0x01, 0x00]);
        assert_eq!(&packed[8..12], &[0x33, 0x22, 0x11, 0x00]);
        assert_eq!(
            packed[8..24],
            crate::uuid_codec::encode(Some("00112233-4455-6677-8899-aabbccddeeff")).unwrap()
        );
        assert_eq!(&packed[24..40], &[0u8; 16]);
        assert_eq!(&packed[40..43], &BOM);
    }

    #[test]
    fn parse_recovers_every_field() {
        let message = PsrpMessage::new(
            Destination::Client,
            MessageType::PipelineOutput,
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            b"<S>hi</S>".to_vec(),
        );

        assert_eq!(PsrpMessage::parse(&message.pack()).unwrap(), message);
    }

    #[test]
    fn parse_rejects_unknown_message_type() {
        let mut packed = PsrpMessage::new(
            Destination::Client,
            MessageType::PipelineOutput,
            Uuid::nil(),
            None,
            Vec::new(),
        )
        .pack();
        packed[4..8].copy_from_slice(&0xDEAD_BEEF_u32.to_le_bytes());

        assert!(matches!(
            PsrpMessage::parse(&packed),
            Err(PsrpError::UnknownMessageType(0xDEAD_BEEF))
        ));
    }

    #[test]
    fn every_message_type_round_trips_its_code() {
        for ty in MessageType::ALL {
            assert_eq!(MessageType::try_from(ty.value()).unwrap(), ty);
        }
    }
}
