use std::error::Error as _;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use tracing::{debug, instrument, warn};
use winrs_client_core::{Transport, TransportError};

use crate::config::Args;

const SOAP_CONTENT_TYPE: &str = "application/soap+xml;charset=UTF-8";

/// Blocking HTTP(S) transport with Basic authentication.
///
/// The agent keeps the connection alive between requests. The read timeout
/// exceeds the WS-Man OperationTimeout so the service always answers first.
pub struct UreqTransport {
    agent: ureq::Agent,
    url: String,
    authorization: String,
}

impl UreqTransport {
    pub fn new(args: &Args) -> anyhow::Result<Self> {
        let mut builder = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(30))
            .timeout_read(Duration::from_secs(args.operation_timeout + 30));

        if args.https {
            if args.insecure {
                warn!("TLS certificate validation is disabled");
            }
            let connector = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(args.insecure)
                .danger_accept_invalid_hostnames(args.insecure)
                .build()?;
            builder = builder.tls_connector(Arc::new(connector));
        }

        let credentials = B64.encode(format!("{}:{}", args.user, args.password));
        Ok(Self {
            agent: builder.build(),
            url: args.endpoint(),
            authorization: format!("Basic {credentials}"),
        })
    }
}

impl Transport for UreqTransport {
    #[instrument(name = "http.request", level = "debug", skip_all, fields(url = %self.url, len = xml.len()), err)]
    fn send_request(&mut self, xml: &str) -> Result<String, TransportError> {
        let result = self
            .agent
            .post(&self.url)
            .set("Authorization", &self.authorization)
            .set("Content-Type", SOAP_CONTENT_TYPE)
            .send_string(xml);

        match result {
            Ok(response) => {
                let status = response.status();
                let body = response.into_string().map_err(|e| classify_io(&e))?;
                debug!(target: "transport", status, len = body.len(), "response received");
                Ok(body)
            }
            Err(ureq::Error::Status(401, _)) => Err(TransportError::Unauthorized),
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                debug!(target: "transport", status, len = body.len(), "error status received");
                Err(TransportError::Http { status, body })
            }
            Err(ureq::Error::Transport(transport)) => Err(classify_transport(&transport)),
        }
    }
}

fn classify_transport(error: &ureq::Transport) -> TransportError {
    debug!(target: "transport", kind = ?error.kind(), %error, "request failed");
    let message = error.to_string();
    match error.kind() {
        ureq::ErrorKind::ConnectionFailed => TransportError::ConnectionRefused(message),
        ureq::ErrorKind::Dns => TransportError::Unreachable(message),
        ureq::ErrorKind::Io => error
            .source()
            .and_then(|source| source.downcast_ref::<io::Error>())
            .map_or_else(|| TransportError::Other(message), classify_io),
        _ => TransportError::Other(message),
    }
}

fn classify_io(error: &io::Error) -> TransportError {
    let message = error.to_string();
    match error.kind() {
        io::ErrorKind::ConnectionRefused => TransportError::ConnectionRefused(message),
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe => TransportError::ConnectionReset(message),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportError::TimedOut(message),
        io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
            TransportError::Unreachable(message)
        }
        io::ErrorKind::UnexpectedEof => TransportError::KeepAliveDisconnected(message),
        _ => TransportError::Other(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_onto_retryable_kinds() {
        let reset = io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer");
        assert!(matches!(classify_io(&reset), TransportError::ConnectionReset(_)));

        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "closed");
        assert!(classify_io(&eof).is_retryable());

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert!(!classify_io(&denied).is_retryable());
    }
}
