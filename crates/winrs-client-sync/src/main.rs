mod config;
mod transport;

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error, info, instrument};
use winrs_client_core::{Shell, ShellKind};

use config::{Args, ShellType, create_shell_config, init_logging};
use transport::UreqTransport;

#[instrument(name = "main", level = "info")]
fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    match run_app(&args) {
        Ok(code) => {
            info!(code, "remote command finished");
            std::process::exit(code);
        }
        Err(e) => {
            error!("Application failed to run: {:?}", e);
            Err(e)
        }
    }
}

fn run_app(args: &Args) -> anyhow::Result<i32> {
    let scheme = if args.https { "HTTPS" } else { "HTTP" };
    info!(
        host = %args.host,
        port = args.port,
        user = %args.user,
        shell = %args.shell,
        scheme,
        "connecting to server"
    );

    let transport = UreqTransport::new(args).context("failed to set up HTTP transport")?;
    let config = create_shell_config(args);

    match args.shell {
        ShellType::Cmd => {
            let (command, arguments) = args
                .command
                .split_first()
                .context("no command given")?;
            run_in(Shell::cmd(transport, config), command, arguments)
        }
        ShellType::PowerShell => {
            let script = args.command.join(" ");
            run_in(Shell::powershell(transport, config), &script, &[])
        }
    }
}

/// Runs one command, echoing its output as it arrives, and returns its exit code.
fn run_in<K: ShellKind>(
    mut shell: Shell<UreqTransport, K>,
    command: &str,
    arguments: &[String],
) -> anyhow::Result<i32> {
    let output = shell
        .run_with(command, arguments, |stdout, stderr| {
            if let Some(text) = stdout {
                echo(&mut std::io::stdout().lock(), "stdout", text);
            }
            if let Some(text) = stderr {
                echo(&mut std::io::stderr().lock(), "stderr", text);
            }
        })
        .context("remote command failed")?;

    shell.close().context("failed to close remote shell")?;

    let code = output.exitcode().unwrap_or(0);
    info!(code, chunks = output.data().len(), "command output collected");
    Ok(code)
}

/// Writes one output chunk. A closed local pipe must not abort the remote run.
fn echo<W: Write>(writer: &mut W, stream: &str, text: &str) {
    if let Err(error) = writer.write_all(text.as_bytes()).and_then(|()| writer.flush()) {
        debug!(stream, %error, "failed to write remote output locally");
    }
}
