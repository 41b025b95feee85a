use winrs_xml::builder::{Attribute, Element};

use super::{required_text, rsp_element, rsp_text};
use crate::WsManError;

/// `rsp:CommandLine`, the body of a Command request.
#[derive(Debug, Clone, PartialEq, Eq, typed_builder::TypedBuilder)]
pub struct CommandLine {
    #[builder(setter(into))]
    pub command: String,
    #[builder(default)]
    pub arguments: Vec<String>,
    /// Client-chosen id; PowerShell pipelines use the pipeline id here.
    #[builder(default, setter(strip_option, into))]
    pub command_id: Option<String>,
}

impl CommandLine {
    pub fn to_element(&self) -> Element<'_> {
        let mut element = rsp_element("CommandLine");
        if let Some(id) = &self.command_id {
            element = element.add_attribute(Attribute::new("CommandId", id.as_str()));
        }

        element
            .add_child(rsp_text("Command", &self.command))
            .add_children(self.arguments.iter().map(|arg| rsp_text("Arguments", arg)))
    }
}

/// Reads `rsp:CommandId` from a Command response.
pub fn read_command_id(response: &str) -> Result<String, WsManError> {
    let doc = winrs_xml::parser::parse(response)?;
    required_text(&doc, "CommandId")
}

#[cfg(test)]
mod tests {
    use winrs_xml::builder::Builder;

    use super::*;

    #[test]
    fn renders_command_and_arguments() {
        let command = CommandLine::builder()
            .command("ipconfig")
            .arguments(vec!["/all".to_owned()])
            .build();
        let xml = Builder::new(command.to_element()).to_xml_string().unwrap();

        assert!(xml.contains("<rsp:Command>ipconfig</rsp:Command><rsp:Arguments>/all</rsp:Arguments>"));
        assert!(!xml.contains("CommandId"));
    }

    #[test]
    fn reads_command_id() {
        let response = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:rsp="http://schemas.microsoft.com/wbem/wsman/1/windows/shell"><s:Body><rsp:CommandResponse><rsp:CommandId>F3E5C3A1-0000-4000-8000-000000000001</rsp:CommandId></rsp:CommandResponse></s:Body></s:Envelope>"#;
        assert_eq!(
            read_command_id(response).unwrap(),
            "F3E5C3A1-0000-4000-8000-000000000001"
        );
    }
}
