use std::fmt;

/// Carries one SOAP envelope to the WinRM service and returns the response body.
///
/// Implementations return `Ok` for 2xx responses. Any other status is
/// reported as [`TransportError::Http`] with the body attached, so the
/// caller can still read a SOAP fault out of a 500.
pub trait Transport {
    fn send_request(&mut self, xml: &str) -> Result<String, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send_request(&mut self, xml: &str) -> Result<String, TransportError> {
        (**self).send_request(xml)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send_request(&mut self, xml: &str) -> Result<String, TransportError> {
        (**self).send_request(xml)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    #[error("Connection reset: {0}")]
    ConnectionReset(String),

    #[error("Timed out: {0}")]
    TimedOut(String),

    #[error("Host or network unreachable: {0}")]
    Unreachable(String),

    #[error("Keep-alive connection dropped: {0}")]
    KeepAliveDisconnected(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("HTTP {status}: {}", Truncated(.body))]
    Http { status: u16, body: String },

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Failures worth another attempt while opening a shell.
    ///
    /// `Unauthorized` is included because stale authentication state on a
    /// reused connection clears on reconnect.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionRefused(_)
            | Self::ConnectionReset(_)
            | Self::TimedOut(_)
            | Self::Unreachable(_)
            | Self::KeepAliveDisconnected(_)
            | Self::Unauthorized => true,
            Self::Http { .. } | Self::Other(_) => false,
        }
    }
}

struct Truncated<'a>(&'a str);

impl fmt::Display for Truncated<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LIMIT: usize = 200;
        match self.0.char_indices().nth(LIMIT) {
            Some((index, _)) => write!(f, "{}...", &self.0[..index]),
            None => f.write_str(self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_set() {
        assert!(TransportError::ConnectionRefused("x".into()).is_retryable());
        assert!(TransportError::KeepAliveDisconnected("x".into()).is_retryable());
        assert!(TransportError::Unauthorized.is_retryable());
        assert!(!TransportError::Other("tls".into()).is_retryable());
        assert!(
            !TransportError::Http {
                status: 500,
                body: String::new()
            }
            .is_retryable()
        );
    }

    #[test]
    fn long_http_bodies_are_truncated_in_messages() {
        let error = TransportError::Http {
            status: 500,
            body: "x".repeat(1000),
        };
        let message = error.to_string();
        assert!(message.starts_with("HTTP 500: xxx"));
        assert!(message.ends_with("..."));
        assert!(message.len() < 300);
    }
}
