use std::fmt;

use winrs_xml::parser::{Node, NodeExt};

use crate::WsManError;
use crate::cores::WsNamespace;

/// WS-Man fault codes the client reacts to.
pub mod fault_codes {
    /// No output was produced before `OperationTimeout`; poll again.
    pub const RECEIVE_TIMEOUT: &str = "2150858793";
    /// The shell was closed or no longer exists on the server.
    pub const SHELL_NOT_FOUND: &str = "2150858843";
    /// The shell's registry key was marked for deletion.
    pub const REGISTRY_KEY_DELETED: &str = "2147943418";
    /// The per-user concurrent shell or command quota is exhausted.
    pub const MAX_CONCURRENT_EXCEEDED: &str = "2150859174";

    /// Faults that invalidate the current shell and justify reopening it.
    pub const SHELL_RESET: [&str; 3] = [SHELL_NOT_FOUND, REGISTRY_KEY_DELETED, MAX_CONCURRENT_EXCEEDED];
}

/// A `s:Fault` response, flattened.
///
/// `code` is the numeric WSManFault code when the service supplied one,
/// otherwise the SOAP subcode (`w:TimedOut`, ...).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct WsManFault {
    pub code: String,
    pub subcode: Option<String>,
    pub machine: Option<String>,
    pub reason: String,
    pub message: Option<String>,
}

impl fmt::Display for WsManFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[WSMAN ERROR CODE: {}]: {}", self.code, self.reason.trim())?;
        if let Some(message) = &self.message {
            write!(f, " ({})", message.trim())?;
        }
        Ok(())
    }
}

fn soap_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.has_tag_name((WsNamespace::SoapEnvelope2003.url(), name)))
}

fn all_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl WsManFault {
    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }

    pub fn is_receive_timeout(&self) -> bool {
        self.is(fault_codes::RECEIVE_TIMEOUT)
    }

    pub fn invalidates_shell(&self) -> bool {
        fault_codes::SHELL_RESET.contains(&self.code.as_str())
    }

    /// Extracts the fault from a response body. `Ok(None)` when the
    /// response is not a fault.
    pub fn from_response(response: &str) -> Result<Option<Self>, WsManError> {
        let doc = winrs_xml::parser::parse(response)?;
        let Some(fault) = doc
            .descendants()
            .find(|n| n.has_tag_name((WsNamespace::SoapEnvelope2003.url(), "Fault")))
        else {
            return Ok(None);
        };

        let subcode = soap_child(fault, "Code")
            .and_then(|code| soap_child(code, "Subcode"))
            .and_then(|sub| soap_child(sub, "Value"))
            .map(|value| value.text_content().trim().to_owned());

        let reason = soap_child(fault, "Reason")
            .and_then(|reason| soap_child(reason, "Text"))
            .map(|text| text.text_content().trim().to_owned())
            .unwrap_or_default();

        let detail = fault.find_descendant("WSManFault");
        let code = detail
            .and_then(|d| d.attribute("Code"))
            .map(str::to_owned)
            .or_else(|| subcode.clone())
            .ok_or_else(|| WsManError::InvalidResponse("Fault without a code".to_owned()))?;

        Ok(Some(Self {
            code,
            subcode,
            machine: detail.and_then(|d| d.attribute("Machine")).map(str::to_owned),
            reason,
            message: detail
                .and_then(|d| d.find_child("Message"))
                .map(all_text)
                .filter(|m| !m.is_empty()),
        }))
    }
}
