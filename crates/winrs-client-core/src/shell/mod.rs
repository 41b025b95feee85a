//! Shell sessions: open on demand, run commands, reset on invalidating faults.

mod cmd;
mod powershell;

pub use cmd::Cmd;
pub use powershell::PowerShell;

use std::thread;

use tracing::{debug, info, instrument, warn};
use winrs_wsman::rsp::{ReceiveRequest, SignalBody};
use winrs_wsman::{OptionSet, SelectorSet, WsAction, WsManRequest, fault_codes};

use crate::config::{ReceiveRetryPolicy, ShellConfig};
use crate::connection::Connection;
use crate::output::Output;
use crate::transport::Transport;
use crate::WinRsError;

/// What differs between a cmd shell and a PowerShell runspace pool.
pub trait ShellKind {
    fn resource_uri(&self) -> &'static str;

    /// Creates the remote shell and returns its id.
    fn open_shell<T: Transport>(
        &mut self,
        connection: &mut Connection<T>,
        config: &ShellConfig,
    ) -> Result<String, WinRsError>;

    /// Starts a command and returns its command id.
    fn send_command<T: Transport>(
        &mut self,
        connection: &mut Connection<T>,
        shell_id: &str,
        command: &str,
        arguments: &[String],
    ) -> Result<String, WinRsError>;

    fn read_output<T: Transport>(
        &mut self,
        connection: &mut Connection<T>,
        shell_id: &str,
        command_id: &str,
        policy: &ReceiveRetryPolicy,
        on_output: &mut dyn FnMut(Option<&str>, Option<&str>),
    ) -> Result<Output, WinRsError>;

    fn cleanup_command<T: Transport>(
        &mut self,
        connection: &mut Connection<T>,
        shell_id: &str,
        command_id: &str,
    ) -> Result<(), WinRsError>;

    /// Drops state tied to the shell that just went away.
    fn reset(&mut self) {}
}

pub(crate) fn shell_selector(shell_id: &str) -> SelectorSet {
    SelectorSet::new().add_selector("ShellId", shell_id)
}

/// Builds the Receive envelope polled for `command_id` (or for the shell itself).
pub(crate) fn receive_envelope<T: Transport>(
    connection: &Connection<T>,
    resource_uri: &str,
    shell_id: &str,
    request: &ReceiveRequest,
) -> Result<String, WinRsError> {
    connection.envelope(
        &WsManRequest::builder()
            .action(WsAction::Receive)
            .resource_uri(resource_uri)
            .selectors(shell_selector(shell_id))
            .options(OptionSet::new().add_option("WSMAN_CMDSHELL_OPTION_KEEPALIVE", "TRUE"))
            .body(request.to_element())
            .build(),
    )
}

pub(crate) fn signal<T: Transport>(
    connection: &mut Connection<T>,
    resource_uri: &str,
    shell_id: &str,
    command_id: &str,
    code: &'static str,
) -> Result<(), WinRsError> {
    let body = SignalBody::new(command_id, code);
    connection.send(
        &WsManRequest::builder()
            .action(WsAction::Signal)
            .resource_uri(resource_uri)
            .selectors(shell_selector(shell_id))
            .body(body.to_element())
            .build(),
    )?;
    Ok(())
}

pub(crate) fn delete_shell<T: Transport>(
    connection: &mut Connection<T>,
    resource_uri: &str,
    shell_id: &str,
) -> Result<(), WinRsError> {
    connection.send(
        &WsManRequest::builder()
            .action(WsAction::Delete)
            .resource_uri(resource_uri)
            .selectors(shell_selector(shell_id))
            .build(),
    )?;
    Ok(())
}

/// One remote shell, opened lazily and replaced when it becomes invalid.
///
/// Call [`Shell::close`] when done. Dropping an open shell closes it on a
/// best-effort basis and only logs failures.
pub struct Shell<T: Transport, K: ShellKind> {
    connection: Connection<T>,
    kind: K,
    config: ShellConfig,
    shell_id: Option<String>,
    command_count: u32,
}

impl<T: Transport> Shell<T, Cmd> {
    pub fn cmd(transport: T, config: ShellConfig) -> Self {
        Self::new(transport, Cmd, config)
    }
}

impl<T: Transport> Shell<T, PowerShell> {
    pub fn powershell(transport: T, config: ShellConfig) -> Self {
        Self::new(transport, PowerShell::new(), config)
    }
}

impl<T: Transport, K: ShellKind> Shell<T, K> {
    pub fn new(transport: T, kind: K, config: ShellConfig) -> Self {
        Self {
            connection: Connection::new(transport, config.wsman()),
            kind,
            config,
            shell_id: None,
            command_count: 0,
        }
    }

    pub fn shell_id(&self) -> Option<&str> {
        self.shell_id.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.shell_id.is_some()
    }

    pub fn command_count(&self) -> u32 {
        self.command_count
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn connection(&self) -> &Connection<T> {
        &self.connection
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Opens a fresh shell, closing the current one first.
    ///
    /// Retryable transport errors are retried up to `retry_limit` attempts
    /// with `retry_delay` between them.
    #[instrument(level = "info", skip(self), fields(resource = self.kind.resource_uri()))]
    pub fn open(&mut self) -> Result<&str, WinRsError> {
        if let Err(error) = self.close() {
            warn!(target: "shell", %error, "failed to close previous shell");
        }

        let attempts = self.config.retry_limit.max(1);
        let mut attempt = 1;
        let shell_id = loop {
            match self.kind.open_shell(&mut self.connection, &self.config) {
                Ok(shell_id) => break shell_id,
                Err(WinRsError::Transport(error)) if error.is_retryable() && attempt < attempts => {
                    warn!(
                        target: "shell",
                        attempt,
                        attempts,
                        %error,
                        delay = ?self.config.retry_delay,
                        "failed to open shell, retrying"
                    );
                    thread::sleep(self.config.retry_delay);
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        };

        info!(target: "shell", shell_id = %shell_id, "shell opened");
        self.command_count = 0;
        Ok(self.shell_id.insert(shell_id).as_str())
    }

    pub fn run(&mut self, command: &str, arguments: &[String]) -> Result<Output, WinRsError> {
        self.run_with(command, arguments, |_, _| {})
    }

    /// Runs `command` and streams its output through `on_output(stdout, stderr)`.
    ///
    /// A fault that invalidates the shell triggers exactly one retry on a
    /// freshly opened shell; a second one is returned to the caller.
    #[instrument(level = "info", skip(self, arguments, on_output))]
    pub fn run_with<F>(
        &mut self,
        command: &str,
        arguments: &[String],
        mut on_output: F,
    ) -> Result<Output, WinRsError>
    where
        F: FnMut(Option<&str>, Option<&str>),
    {
        match self.run_once(command, arguments, &mut on_output) {
            Err(WinRsError::Fault(fault)) if fault.invalidates_shell() => {
                warn!(target: "shell", code = %fault.code, "shell became invalid, reopening once");
                self.reset_after_fault(fault.is(fault_codes::MAX_CONCURRENT_EXCEEDED));
                self.run_once(command, arguments, &mut on_output)
            }
            result => result,
        }
    }

    fn run_once(
        &mut self,
        command: &str,
        arguments: &[String],
        on_output: &mut dyn FnMut(Option<&str>, Option<&str>),
    ) -> Result<Output, WinRsError> {
        if self.command_count > self.config.max_commands {
            debug!(target: "shell", count = self.command_count, "command limit reached, replacing shell");
            if let Err(error) = self.close() {
                warn!(target: "shell", %error, "failed to close shell at command limit");
            }
        }

        let shell_id = match &self.shell_id {
            Some(shell_id) => shell_id.clone(),
            None => self.open()?.to_owned(),
        };

        let command_id = self
            .kind
            .send_command(&mut self.connection, &shell_id, command, arguments)?;
        self.command_count += 1;
        debug!(target: "shell", command_id = %command_id, "command started");

        let result = self.kind.read_output(
            &mut self.connection,
            &shell_id,
            &command_id,
            &self.config.receive_retry,
            on_output,
        );

        if let Err(error) = self
            .kind
            .cleanup_command(&mut self.connection, &shell_id, &command_id)
        {
            warn!(target: "shell", command_id = %command_id, %error, "command cleanup failed");
        }

        result
    }

    /// Forgets the invalid shell. Only a quota fault leaves a shell worth deleting.
    fn reset_after_fault(&mut self, delete: bool) {
        if delete {
            if let Err(error) = self.close() {
                warn!(target: "shell", %error, "failed to close shell after quota fault");
            }
        } else {
            self.shell_id = None;
            self.command_count = 0;
            self.kind.reset();
        }
    }

    /// Deletes the remote shell. Calling it again, or on a shell that never
    /// opened, does nothing.
    pub fn close(&mut self) -> Result<(), WinRsError> {
        let Some(shell_id) = self.shell_id.take() else {
            return Ok(());
        };
        self.command_count = 0;
        self.kind.reset();

        info!(target: "shell", shell_id = %shell_id, "closing shell");
        delete_shell(&mut self.connection, self.kind.resource_uri(), &shell_id)
    }
}

impl<T: Transport, K: ShellKind> Drop for Shell<T, K> {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            warn!(target: "shell", %error, "failed to close shell on drop");
        }
    }
}
