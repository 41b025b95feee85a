use winrs_xml::builder::{Attribute, Element};

use super::{rsp_element, rsp_text};

/// Terminates a cmd shell command.
pub const SIGNAL_TERMINATE: &str =
    "http://schemas.microsoft.com/wbem/wsman/1/windows/shell/signal/terminate";
/// Stops a running PowerShell pipeline. The misspelling is the protocol's.
pub const SIGNAL_POWERSHELL_CTRL_C: &str = "http://schemas.microsoft.com/powershell/signal/crtl_c";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalBody {
    pub command_id: String,
    pub code: &'static str,
}

impl SignalBody {
    pub fn new(command_id: impl Into<String>, code: &'static str) -> Self {
        Self {
            command_id: command_id.into(),
            code,
        }
    }

    pub fn to_element(&self) -> Element<'_> {
        rsp_element("Signal")
            .add_attribute(Attribute::new("CommandId", self.command_id.as_str()))
            .add_child(rsp_text("Code", self.code))
    }
}
