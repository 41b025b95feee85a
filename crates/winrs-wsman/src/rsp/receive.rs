use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use tracing::trace;
use winrs_xml::builder::{Attribute, Element};
use winrs_xml::parser::NodeExt;

use super::{rsp_element, rsp_text, shell_element};
use crate::WsManError;

const COMMAND_STATE_DONE: &str =
    "http://schemas.microsoft.com/wbem/wsman/1/windows/shell/CommandState/Done";

/// `rsp:Receive` asking for the given space-separated streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveRequest {
    pub desired_streams: String,
    /// Absent for the keep-alive receive used while a runspace pool opens.
    pub command_id: Option<String>,
}

impl ReceiveRequest {
    pub fn new(desired_streams: impl Into<String>, command_id: Option<String>) -> Self {
        Self {
            desired_streams: desired_streams.into(),
            command_id,
        }
    }

    pub fn to_element(&self) -> Element<'_> {
        let mut desired = rsp_text("DesiredStream", &self.desired_streams);
        if let Some(id) = &self.command_id {
            desired = desired.add_attribute(Attribute::new("CommandId", id.as_str()));
        }
        rsp_element("Receive").add_child(desired)
    }
}

/// One `rsp:Stream` element with its base64 content decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedStream {
    pub name: String,
    pub command_id: Option<String>,
    pub end: bool,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandState {
    pub command_id: Option<String>,
    pub state: String,
    pub exit_code: Option<i32>,
}

impl CommandState {
    pub fn is_done(&self) -> bool {
        self.state == COMMAND_STATE_DONE
    }
}

/// Body of a ReceiveResponse: stream chunks in document order plus the
/// command state, when the service reported one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiveResponse {
    pub streams: Vec<ReceivedStream>,
    pub command_state: Option<CommandState>,
}

impl ReceiveResponse {
    pub fn parse(response: &str) -> Result<Self, WsManError> {
        let doc = winrs_xml::parser::parse(response)?;

        let mut streams = Vec::new();
        for node in doc.descendants().filter(|n| shell_element(*n, "Stream")) {
            let name = node.attribute("Name").ok_or_else(|| {
                WsManError::InvalidResponse("Stream element without Name".to_owned())
            })?;
            let content = node.text_content();
            let data = B64.decode(content.trim())?;
            trace!(target: "receive", stream = name, len = data.len(), "received stream chunk");

            streams.push(ReceivedStream {
                name: name.to_owned(),
                command_id: node.attribute("CommandId").map(str::to_owned),
                end: node.attribute("End").is_some_and(|v| v.eq_ignore_ascii_case("true")),
                data,
            });
        }

        let command_state = doc
            .descendants()
            .find(|n| shell_element(*n, "CommandState"))
            .map(|node| -> Result<CommandState, WsManError> {
                let exit_code = node
                    .children()
                    .find(|c| shell_element(*c, "ExitCode"))
                    .map(|c| {
                        let text = c.text_content();
                        text.trim().parse::<i32>().map_err(|_| {
                            WsManError::InvalidResponse(format!("Invalid ExitCode: {text}"))
                        })
                    })
                    .transpose()?;

                Ok(CommandState {
                    command_id: node.attribute("CommandId").map(str::to_owned),
                    state: node.attribute("State").unwrap_or_default().to_owned(),
                    exit_code,
                })
            })
            .transpose()?;

        Ok(Self {
            streams,
            command_state,
        })
    }

    pub fn is_done(&self) -> bool {
        self.command_state.as_ref().is_some_and(CommandState::is_done)
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.command_state.as_ref().and_then(|s| s.exit_code)
    }
}
