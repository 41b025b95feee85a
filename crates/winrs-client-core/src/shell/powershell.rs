use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;
use winrs_psrp::{
    CreatePipeline, DefragmentResult, Defragmenter, FRAGMENT_HEADER_LEN, Fragmenter,
    InitRunspacePool, MESSAGE_HEADER_LEN, MessageData, PROTOCOL_VERSION, RunspacePoolStateValue,
    SessionCapability, pack_fragments,
};
use winrs_wsman::cores::{CONFIG_RESOURCE_URI, POWERSHELL_RESOURCE_URI};
use winrs_wsman::rsp::{
    CommandLine, ReceiveRequest, SIGNAL_POWERSHELL_CTRL_C, SendStream, ShellBody, read_command_id,
    read_max_envelope_size_kb, read_shell_id,
};
use winrs_wsman::{OptionSet, WsAction, WsManRequest};

use super::{ShellKind, delete_shell, receive_envelope, shell_selector, signal};
use crate::config::{ReceiveRetryPolicy, ShellConfig};
use crate::connection::Connection;
use crate::output::Output;
use crate::receive::{Poller, PsrpStreamDecoder, read_output};
use crate::transport::Transport;
use crate::WinRsError;

/// Makes a script whose last command failed exit non-zero.
const EXIT_CODE_SUFFIX: &str =
    "\r\nif (!$?) { if($LASTEXITCODE) { exit $LASTEXITCODE } else { exit 1 } }";

/// A PowerShell runspace pool driven over PSRP.
///
/// The shell id doubles as the runspace pool id. Each command is a pipeline
/// whose id is also its WS-Man command id.
#[derive(Debug, Default)]
pub struct PowerShell {
    runspace_pool_id: Option<Uuid>,
    fragmenter: Fragmenter,
    session_capability: Option<SessionCapability>,
}

impl PowerShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capabilities the server announced while the pool was opening.
    pub fn session_capability(&self) -> Option<&SessionCapability> {
        self.session_capability.as_ref()
    }

    pub fn max_blob_length(&self) -> usize {
        self.fragmenter.max_blob_length()
    }

    /// Sizes fragments to what the service accepts, keeping the current
    /// size when the configuration cannot be read.
    fn negotiate_blob_length<T: Transport>(&mut self, connection: &mut Connection<T>) {
        match read_max_blob_length(connection) {
            Ok(length) if length > FRAGMENT_HEADER_LEN + MESSAGE_HEADER_LEN => {
                self.fragmenter.set_max_blob_length(length);
            }
            Ok(length) => {
                warn!(target: "shell", length, "negotiated blob length is unusable, keeping default");
            }
            Err(error) => {
                warn!(target: "shell", %error, "could not read MaxEnvelopeSizekb, keeping default");
            }
        }
    }

    /// Polls the new shell until the runspace pool reports Opened.
    #[instrument(level = "debug", skip(self, connection, policy))]
    fn wait_for_opened<T: Transport>(
        &mut self,
        connection: &mut Connection<T>,
        shell_id: &str,
        policy: &ReceiveRetryPolicy,
    ) -> Result<(), WinRsError> {
        let request = ReceiveRequest::new("stdout", None);
        let envelope = receive_envelope(connection, POWERSHELL_RESOURCE_URI, shell_id, &request)?;
        let mut poller = Poller::new(&envelope, policy);
        let mut defragmenter = Defragmenter::new();

        loop {
            let response = poller.poll(connection)?;
            for stream in response.streams.iter().filter(|s| !s.data.is_empty()) {
                let DefragmentResult::Complete(messages) = defragmenter.defragment(&stream.data) else {
                    continue;
                };

                for message in &messages {
                    let data = MessageData::parse(message).unwrap_or_else(|error| {
                        warn!(target: "shell", kind = ?message.message_type, %error, "dropping undecodable message");
                        None
                    });
                    match data {
                        Some(MessageData::SessionCapability(capability)) => {
                            info!(
                                target: "shell",
                                protocol_version = %capability.protocol_version,
                                ps_version = %capability.ps_version,
                                serialization_version = %capability.serialization_version,
                                "server session capability"
                            );
                            self.session_capability = Some(capability);
                        }
                        Some(MessageData::RunspacePoolState(state)) => match state.runspace_state {
                            RunspacePoolStateValue::Opened => {
                                info!(target: "shell", "runspace pool opened");
                                return Ok(());
                            }
                            RunspacePoolStateValue::Broken | RunspacePoolStateValue::Closed => {
                                return Err(WinRsError::RunspaceBroken(state.runspace_state));
                            }
                            other => debug!(target: "shell", state = ?other, "runspace pool state"),
                        },
                        Some(MessageData::ApplicationPrivateData(_)) => {
                            trace!(target: "shell", "ignoring application private data");
                        }
                        Some(_) | None => {
                            trace!(target: "shell", kind = ?message.message_type, "ignoring message while opening");
                        }
                    }
                }
            }
        }
    }
}

/// `(MaxEnvelopeSizekb * 1024 - empty pipeline envelope) * 3 / 4`, the
/// largest fragment whose base64 form still fits one envelope.
fn read_max_blob_length<T: Transport>(connection: &mut Connection<T>) -> Result<usize, WinRsError> {
    let response = connection.send(
        &WsManRequest::builder()
            .action(WsAction::Get)
            .resource_uri(CONFIG_RESOURCE_URI)
            .build(),
    )?;
    let envelope_size = read_max_envelope_size_kb(&response)? as usize * 1024;

    let nil = Uuid::nil().to_string();
    let empty_line = CommandLine::builder()
        .command("Invoke-Expression")
        .arguments(vec![String::new()])
        .command_id(nil.as_str())
        .build();
    let empty_envelope = connection.envelope(
        &WsManRequest::builder()
            .action(WsAction::Command)
            .resource_uri(POWERSHELL_RESOURCE_URI)
            .selectors(shell_selector(&nil))
            .body(empty_line.to_element())
            .build(),
    )?;

    let length = envelope_size.saturating_sub(empty_envelope.len()) * 3 / 4;
    debug!(target: "shell", envelope_size, overhead = empty_envelope.len(), length, "negotiated blob length");
    Ok(length)
}

impl ShellKind for PowerShell {
    fn resource_uri(&self) -> &'static str {
        POWERSHELL_RESOURCE_URI
    }

    fn open_shell<T: Transport>(
        &mut self,
        connection: &mut Connection<T>,
        config: &ShellConfig,
    ) -> Result<String, WinRsError> {
        self.reset();
        self.negotiate_blob_length(connection);

        let runspace_pool_id = Uuid::new_v4();
        let mut fragments =
            self.fragmenter
                .fragment_ps_message(&SessionCapability::default(), runspace_pool_id, None)?;
        fragments.extend(self.fragmenter.fragment_ps_message(
            &InitRunspacePool::default(),
            runspace_pool_id,
            None,
        )?);

        let body = ShellBody::builder()
            .shell_id(runspace_pool_id.to_string().to_uppercase())
            .input_streams("stdin pr")
            .output_streams("stdout")
            .creation_xml(B64.encode(pack_fragments(&fragments)?))
            .build();

        let response = connection.send(
            &WsManRequest::builder()
                .action(WsAction::Create)
                .resource_uri(POWERSHELL_RESOURCE_URI)
                .options(OptionSet::new().add_required_option("protocolversion", PROTOCOL_VERSION))
                .body(body.to_element())
                .build(),
        )?;
        let shell_id = read_shell_id(&response)?;

        if let Err(error) = self.wait_for_opened(connection, &shell_id, &config.receive_retry) {
            if let Err(close_error) = delete_shell(connection, POWERSHELL_RESOURCE_URI, &shell_id) {
                warn!(target: "shell", %close_error, "failed to delete half-open shell");
            }
            return Err(error);
        }

        self.runspace_pool_id = Some(runspace_pool_id);
        Ok(shell_id)
    }

    fn send_command<T: Transport>(
        &mut self,
        connection: &mut Connection<T>,
        shell_id: &str,
        command: &str,
        arguments: &[String],
    ) -> Result<String, WinRsError> {
        let runspace_pool_id = self
            .runspace_pool_id
            .ok_or(WinRsError::InvalidState("runspace pool is not open"))?;
        if !arguments.is_empty() {
            debug!(target: "shell", count = arguments.len(), "PowerShell scripts take no separate arguments");
        }

        let pipeline_id = Uuid::new_v4();
        let pipeline = CreatePipeline::for_script(format!("{command}{EXIT_CODE_SUFFIX}"));
        let fragments =
            self.fragmenter
                .fragment_ps_message(&pipeline, runspace_pool_id, Some(pipeline_id))?;
        let (first, rest) = fragments
            .split_first()
            .ok_or(WinRsError::InvalidState("pipeline produced no fragments"))?;

        let line = CommandLine::builder()
            .command("Invoke-Expression")
            .arguments(vec![first.pack_as_base64()?])
            .command_id(pipeline_id.to_string().to_uppercase())
            .build();
        let response = connection.send(
            &WsManRequest::builder()
                .action(WsAction::Command)
                .resource_uri(POWERSHELL_RESOURCE_URI)
                .selectors(shell_selector(shell_id))
                .body(line.to_element())
                .build(),
        )?;
        let command_id = read_command_id(&response)?;

        for fragment in rest {
            let send = SendStream::new("stdin", command_id.as_str(), &fragment.pack()?);
            connection.send(
                &WsManRequest::builder()
                    .action(WsAction::Send)
                    .resource_uri(POWERSHELL_RESOURCE_URI)
                    .selectors(shell_selector(shell_id))
                    .body(send.to_element())
                    .build(),
            )?;
        }

        debug!(target: "shell", command_id = %command_id, fragments = fragments.len(), "pipeline created");
        Ok(command_id)
    }

    fn read_output<T: Transport>(
        &mut self,
        connection: &mut Connection<T>,
        shell_id: &str,
        command_id: &str,
        policy: &ReceiveRetryPolicy,
        on_output: &mut dyn FnMut(Option<&str>, Option<&str>),
    ) -> Result<Output, WinRsError> {
        let request = ReceiveRequest::new("stdout", Some(command_id.to_owned()));
        let envelope = receive_envelope(connection, POWERSHELL_RESOURCE_URI, shell_id, &request)?;
        read_output(
            connection,
            &envelope,
            &mut PsrpStreamDecoder::new(),
            policy,
            on_output,
        )
    }

    fn cleanup_command<T: Transport>(
        &mut self,
        connection: &mut Connection<T>,
        shell_id: &str,
        command_id: &str,
    ) -> Result<(), WinRsError> {
        signal(
            connection,
            POWERSHELL_RESOURCE_URI,
            shell_id,
            command_id,
            SIGNAL_POWERSHELL_CTRL_C,
        )
    }

    fn reset(&mut self) {
        self.runspace_pool_id = None;
        self.session_capability = None;
    }
}
