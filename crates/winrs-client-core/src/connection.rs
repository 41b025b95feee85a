use tracing::{debug, trace};
use winrs_wsman::{WsMan, WsManFault, WsManRequest};

use crate::transport::{Transport, TransportError};
use crate::WinRsError;

/// A transport plus the session-wide envelope settings.
///
/// Every response passes through fault detection here, so callers only see
/// SOAP faults as [`WinRsError::Fault`].
#[derive(Debug)]
pub struct Connection<T> {
    transport: T,
    wsman: WsMan,
}

impl<T: Transport> Connection<T> {
    pub fn new(transport: T, wsman: WsMan) -> Self {
        Self { transport, wsman }
    }

    pub fn wsman(&self) -> &WsMan {
        &self.wsman
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn envelope(&self, request: &WsManRequest<'_>) -> Result<String, WinRsError> {
        Ok(self.wsman.envelope(request)?)
    }

    pub fn send(&mut self, request: &WsManRequest<'_>) -> Result<String, WinRsError> {
        let xml = self.envelope(request)?;
        debug!(target: "transport", action = ?request.action, resource = request.resource_uri, "sending request");
        self.send_envelope(&xml)
    }

    /// Sends a pre-built envelope. The receive loop reuses one envelope for every poll.
    pub fn send_envelope(&mut self, xml: &str) -> Result<String, WinRsError> {
        match self.transport.send_request(xml) {
            Ok(body) => {
                trace!(target: "transport", response = %body, "received response");
                match WsManFault::from_response(&body)? {
                    Some(fault) => Err(fault.into()),
                    None => Ok(body),
                }
            }
            Err(TransportError::Http { status, body }) => match WsManFault::from_response(&body) {
                Ok(Some(fault)) => {
                    debug!(target: "transport", status, code = %fault.code, "service returned a fault");
                    Err(fault.into())
                }
                _ => Err(TransportError::Http { status, body }.into()),
            },
            Err(error) => Err(error.into()),
        }
    }
}
