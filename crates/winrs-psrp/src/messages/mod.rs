pub mod create_pipeline;
mod error_record;
mod host_call;
pub mod init_runspace_pool;
mod pipeline_output;
mod pipeline_state;
mod runspace_pool_state;
mod session_capability;

pub use create_pipeline::CreatePipeline;
pub use error_record::ErrorRecord;
pub use host_call::HostCall;
pub use init_runspace_pool::InitRunspacePool;
pub use pipeline_output::PipelineOutput;
pub use pipeline_state::{PipelineState, PsInvocationState};
pub use runspace_pool_state::{RunspacePoolState, RunspacePoolStateValue};
pub use session_capability::SessionCapability;

use tracing::trace;

use crate::ps_value::{ComplexObject, PsValue};
use crate::{MessageType, PsrpError, PsrpMessage};

/// Decoded payload of the message kinds the client acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageData {
    SessionCapability(SessionCapability),
    RunspacePoolState(RunspacePoolState),
    ApplicationPrivateData(ComplexObject),
    RunspacePoolHostCall(HostCall),
    PipelineHostCall(HostCall),
    PipelineOutput(PipelineOutput),
    ErrorRecord(ErrorRecord),
    PipelineState(PipelineState),
}

fn decode_value(message: &PsrpMessage) -> Result<PsValue, PsrpError> {
    Ok(PsValue::from_clixml(&message.data_as_text())?)
}

fn decode_object(message: &PsrpMessage) -> Result<ComplexObject, PsrpError> {
    match decode_value(message)? {
        PsValue::Object(obj) => Ok(obj),
        PsValue::Primitive(_) => Err(PsrpError::InvalidMessage(format!(
            "{:?} payload is not an object",
            message.message_type
        ))),
    }
}

impl MessageData {
    /// Decodes `message.data`. Kinds the client has no use for yield `None`.
    pub fn parse(message: &PsrpMessage) -> Result<Option<Self>, PsrpError> {
        let data = match message.message_type {
            MessageType::SessionCapability => {
                Self::SessionCapability(SessionCapability::try_from(&decode_object(message)?)?)
            }
            MessageType::RunspacepoolState => {
                Self::RunspacePoolState(RunspacePoolState::try_from(&decode_object(message)?)?)
            }
            MessageType::ApplicationPrivateData => {
                Self::ApplicationPrivateData(decode_object(message)?)
            }
            MessageType::RunspacepoolHostCall => {
                Self::RunspacePoolHostCall(HostCall::try_from(&decode_object(message)?)?)
            }
            MessageType::PipelineHostCall => {
                Self::PipelineHostCall(HostCall::try_from(&decode_object(message)?)?)
            }
            MessageType::PipelineOutput => {
                Self::PipelineOutput(PipelineOutput::from(decode_value(message)?))
            }
            MessageType::ErrorRecord => Self::ErrorRecord(ErrorRecord::from(&decode_object(message)?)),
            MessageType::PipelineState => {
                Self::PipelineState(PipelineState::try_from(&decode_object(message)?)?)
            }

            MessageType::InitRunspacepool
            | MessageType::PublicKey
            | MessageType::EncryptedSessionKey
            | MessageType::PublicKeyRequest
            | MessageType::ConnectRunspacepool
            | MessageType::RunspacepoolInitData
            | MessageType::ResetRunspaceState
            | MessageType::SetMaxRunspaces
            | MessageType::SetMinRunspaces
            | MessageType::RunspaceAvailability
            | MessageType::CreatePipeline
            | MessageType::GetAvailableRunspaces
            | MessageType::UserEvent
            | MessageType::GetCommandMetadata
            | MessageType::RunspacepoolHostResponse
            | MessageType::PipelineInput
            | MessageType::EndOfPipelineInput
            | MessageType::DebugRecord
            | MessageType::VerboseRecord
            | MessageType::WarningRecord
            | MessageType::ProgressRecord
            | MessageType::InformationRecord
            | MessageType::PipelineHostResponse => {
                trace!(kind = ?message.message_type, "ignoring message kind");
                return Ok(None);
            }
        };

        Ok(Some(data))
    }
}
