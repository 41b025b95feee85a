pub mod config;
pub mod connection;
pub mod output;
pub mod receive;
pub mod shell;
pub mod transport;

use std::time::Duration;

pub use config::{ReceiveRetryPolicy, ShellConfig};
pub use connection::Connection;
pub use output::Output;
pub use receive::{CommandStreamDecoder, PsrpStreamDecoder, StreamDecoder, read_output};
pub use shell::{Cmd, PowerShell, Shell, ShellKind};
pub use transport::{Transport, TransportError};

pub use winrs_psrp::{DecodedOutput, StreamKind};
pub use winrs_wsman::{WsManFault, fault_codes};

#[derive(Debug, thiserror::Error)]
pub enum WinRsError {
    #[error(transparent)]
    Fault(#[from] WsManFault),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("PowerShell remoting error: {0}")]
    Psrp(#[from] winrs_psrp::PsrpError),

    #[error("WS-Man error: {0}")]
    WsMan(#[from] winrs_wsman::WsManError),

    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    #[error("Runspace pool went {0:?} while opening")]
    RunspaceBroken(winrs_psrp::RunspacePoolStateValue),

    #[error("Gave up after {timeouts} receive timeouts over {elapsed:?}")]
    ReceiveTimeoutExceeded { timeouts: u32, elapsed: Duration },
}

impl WinRsError {
    /// The WS-Man fault behind this error, if any.
    pub fn fault(&self) -> Option<&WsManFault> {
        match self {
            Self::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}
