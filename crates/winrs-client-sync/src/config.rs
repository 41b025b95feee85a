use std::sync::OnceLock;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry::Registry};
use winrs_client_core::ShellConfig;

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        tracing::error!(target: "winrs_client", %panic_info, "client panicked");
    }));
}

/// Run one command on a Windows host over WinRM
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, help = "Server IP address or hostname")]
    pub host: String,

    #[arg(short, long, default_value = "5985", help = "Server port")]
    pub port: u16,

    #[arg(long, help = "Use HTTPS (default: HTTP)")]
    pub https: bool,

    #[arg(long, requires = "https", help = "Accept invalid TLS certificates")]
    pub insecure: bool,

    #[arg(short, long, help = "Username for Basic authentication")]
    pub user: String,

    #[arg(
        short = 'P',
        long,
        env = "WINRS_PASSWORD",
        hide_env_values = true,
        help = "Password for Basic authentication"
    )]
    pub password: String,

    #[arg(long, value_enum, default_value_t = ShellType::Cmd, help = "Remote shell to run the command in")]
    pub shell: ShellType,

    #[arg(long, default_value_t = 3, help = "Attempts at opening the shell")]
    pub retry_limit: u32,

    #[arg(long, default_value_t = 60, help = "WS-Man OperationTimeout in seconds")]
    pub operation_timeout: u64,

    /// Verbose logging (can be repeated for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase logging verbosity")]
    pub verbose: u8,

    #[arg(trailing_var_arg = true, required = true, help = "Command and its arguments")]
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ShellType {
    Cmd,
    #[value(name = "powershell")]
    PowerShell,
}

impl std::fmt::Display for ShellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cmd => write!(f, "cmd"),
            Self::PowerShell => write!(f, "powershell"),
        }
    }
}

impl Args {
    pub fn endpoint(&self) -> String {
        let scheme = if self.https { "https" } else { "http" };
        format!("{scheme}://{}:{}/wsman", self.host, self.port)
    }
}

/// Sends every `tracing` event to `winrs_client.log`; terminal output stays
/// reserved for the remote command's streams.
pub fn init_logging(verbose_level: u8) -> anyhow::Result<()> {
    setup_panic_hook();

    // ureq logs through `log`
    LogTracer::init().ok();

    let file = std::fs::File::create("winrs_client.log")?;
    let (nb_writer, guard) = tracing_appender::non_blocking(file);

    if LOG_GUARD.set(guard).is_err() {
        tracing::warn!("logging initialized twice, keeping the first writer");
    }

    let filter_str = match verbose_level {
        0 => "info,ureq=error",
        1 => "debug,ureq=warn",
        2 => "trace,ureq=info",
        _ => "trace",
    };

    let subscriber = Registry::default().with(EnvFilter::new(filter_str)).with(
        fmt::layer()
            .with_writer(nb_writer)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false)
            .compact(),
    );

    tracing::subscriber::set_global_default(subscriber)?;
    tracing::info!(verbose_level, "logging initialized");

    Ok(())
}

pub fn create_shell_config(args: &Args) -> ShellConfig {
    ShellConfig::builder()
        .endpoint(args.endpoint())
        .retry_limit(args.retry_limit)
        .operation_timeout(Duration::from_secs(args.operation_timeout))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_after_separator() {
        let args = Args::try_parse_from([
            "winrs-client-sync",
            "--host",
            "winhost",
            "-u",
            "admin",
            "-P",
            "secret",
            "--shell",
            "powershell",
            "--",
            "Get-Process",
            "-Name",
            "svchost",
        ])
        .unwrap();

        assert_eq!(args.endpoint(), "http://winhost:5985/wsman");
        assert!(matches!(args.shell, ShellType::PowerShell));
        assert_eq!(args.command, ["Get-Process", "-Name", "svchost"]);

        let config = create_shell_config(&args);
        assert_eq!(config.retry_limit, 3);
        assert_eq!(config.operation_timeout, Duration::from_secs(60));
    }

    #[test]
    fn https_endpoint() {
        let args = Args::try_parse_from([
            "winrs-client-sync",
            "--host",
            "10.0.0.5",
            "--port",
            "5986",
            "--https",
            "-u",
            "admin",
            "-P",
            "secret",
            "ipconfig",
        ])
        .unwrap();

        assert_eq!(args.endpoint(), "https://10.0.0.5:5986/wsman");
    }
}
