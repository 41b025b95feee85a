//! Bodies of the remote shell (`rsp`) operations and readers for their responses.

mod command_line;
mod config;
mod receive;
mod send;
mod shell;
mod signal;

pub use command_line::{CommandLine, read_command_id};
pub use config::read_max_envelope_size_kb;
pub use receive::{CommandState, ReceiveRequest, ReceiveResponse, ReceivedStream};
pub use send::SendStream;
pub use shell::{ShellBody, read_shell_id};
pub use signal::{SIGNAL_POWERSHELL_CTRL_C, SIGNAL_TERMINATE, SignalBody};

use winrs_xml::builder::Element;
use winrs_xml::parser::{Document, Node, NodeExt};

use crate::WsManError;
use crate::cores::WsNamespace;

fn shell_element(node: Node<'_, '_>, name: &str) -> bool {
    node.has_tag_name((WsNamespace::WsmanShell.url(), name))
}

fn required_text(doc: &Document<'_>, name: &'static str) -> Result<String, WsManError> {
    doc.descendants()
        .find(|n| shell_element(*n, name))
        .map(|n| n.text_content().trim().to_owned())
        .filter(|t| !t.is_empty())
        .ok_or(WsManError::MissingElement(name))
}

fn rsp_element(name: &str) -> Element<'_> {
    Element::new(name).set_namespace(WsNamespace::WsmanShell.namespace())
}

fn rsp_text<'a>(name: &'a str, value: &'a str) -> Element<'a> {
    rsp_element(name).set_text(value)
}
