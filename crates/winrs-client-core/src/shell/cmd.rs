use tracing::debug;
use winrs_wsman::cores::CMD_RESOURCE_URI;
use winrs_wsman::rsp::{
    CommandLine, ReceiveRequest, SIGNAL_TERMINATE, ShellBody, read_command_id, read_shell_id,
};
use winrs_wsman::{OptionSet, WsAction, WsManRequest};

use super::{ShellKind, receive_envelope, shell_selector, signal};
use crate::config::{ReceiveRetryPolicy, ShellConfig};
use crate::connection::Connection;
use crate::output::Output;
use crate::receive::{CommandStreamDecoder, read_output};
use crate::transport::Transport;
use crate::WinRsError;

/// A `cmd.exe` shell. Output arrives as raw stdout and stderr bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct Cmd;

impl ShellKind for Cmd {
    fn resource_uri(&self) -> &'static str {
        CMD_RESOURCE_URI
    }

    fn open_shell<T: Transport>(
        &mut self,
        connection: &mut Connection<T>,
        config: &ShellConfig,
    ) -> Result<String, WinRsError> {
        let mut body = ShellBody::builder()
            .environment(config.environment.clone())
            .build();
        body.working_directory.clone_from(&config.working_directory);

        let options = OptionSet::new()
            .add_option("WINRS_NOPROFILE", "FALSE")
            .add_option("WINRS_CODEPAGE", config.codepage.to_string());

        let response = connection.send(
            &WsManRequest::builder()
                .action(WsAction::Create)
                .resource_uri(CMD_RESOURCE_URI)
                .options(options)
                .body(body.to_element())
                .build(),
        )?;
        Ok(read_shell_id(&response)?)
    }

    fn send_command<T: Transport>(
        &mut self,
        connection: &mut Connection<T>,
        shell_id: &str,
        command: &str,
        arguments: &[String],
    ) -> Result<String, WinRsError> {
        debug!(target: "shell", command, arguments = arguments.len(), "sending cmd command");
        let line = CommandLine::builder()
            .command(command)
            .arguments(arguments.to_vec())
            .build();

        let options = OptionSet::new()
            .add_option("WINRS_CONSOLEMODE_STDIN", "TRUE")
            .add_option("WINRS_SKIP_CMD_SHELL", "FALSE");

        let response = connection.send(
            &WsManRequest::builder()
                .action(WsAction::Command)
                .resource_uri(CMD_RESOURCE_URI)
                .selectors(shell_selector(shell_id))
                .options(options)
                .body(line.to_element())
                .build(),
        )?;
        Ok(read_command_id(&response)?)
    }

    fn read_output<T: Transport>(
        &mut self,
        connection: &mut Connection<T>,
        shell_id: &str,
        command_id: &str,
        policy: &ReceiveRetryPolicy,
        on_output: &mut dyn FnMut(Option<&str>, Option<&str>),
    ) -> Result<Output, WinRsError> {
        let request = ReceiveRequest::new("stdout stderr", Some(command_id.to_owned()));
        let envelope = receive_envelope(connection, CMD_RESOURCE_URI, shell_id, &request)?;
        read_output(
            connection,
            &envelope,
            &mut CommandStreamDecoder,
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
        signal(connection, CMD_RESOURCE_URI, shell_id, command_id, SIGNAL_TERMINATE)
    }
}
