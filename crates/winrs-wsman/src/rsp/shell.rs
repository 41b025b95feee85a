use winrs_xml::builder::{Attribute, Element};

use super::{required_text, rsp_element, rsp_text};
use crate::WsManError;
use crate::cores::POWERSHELL_NAMESPACE_URI;

/// `rsp:Shell`, the body of a Create request.
#[derive(Debug, Clone, typed_builder::TypedBuilder)]
pub struct ShellBody {
    #[builder(default, setter(strip_option, into))]
    pub shell_id: Option<String>,
    #[builder(default = "stdin".to_owned(), setter(into))]
    pub input_streams: String,
    #[builder(default = "stdout stderr".to_owned(), setter(into))]
    pub output_streams: String,
    #[builder(default, setter(strip_option, into))]
    pub working_directory: Option<String>,
    #[builder(default)]
    pub environment: Vec<(String, String)>,
    #[builder(default, setter(strip_option, into))]
    pub idle_timeout: Option<String>,
    /// Base64 runspace pool handshake for PowerShell shells.
    #[builder(default, setter(strip_option, into))]
    pub creation_xml: Option<String>,
}

impl ShellBody {
    pub fn to_element(&self) -> Element<'_> {
        let mut shell = rsp_element("Shell");
        if let Some(id) = &self.shell_id {
            shell = shell.add_attribute(Attribute::new("ShellId", id.as_str()));
        }

        let environment = (!self.environment.is_empty()).then(|| {
            rsp_element("Environment").add_children(self.environment.iter().map(|(name, value)| {
                rsp_text("Variable", value).add_attribute(Attribute::new("Name", name.as_str()))
            }))
        });

        shell
            .add_child_optional(
                self.working_directory
                    .as_deref()
                    .map(|dir| rsp_text("WorkingDirectory", dir)),
            )
            .add_child_optional(environment)
            .add_child_optional(
                self.idle_timeout
                    .as_deref()
                    .map(|timeout| rsp_text("IdleTimeOut", timeout)),
            )
            .add_child(rsp_text("InputStreams", &self.input_streams))
            .add_child(rsp_text("OutputStreams", &self.output_streams))
            .add_child_optional(self.creation_xml.as_deref().map(|blob| {
                Element::new("creationXml")
                    .add_attribute(Attribute::new("xmlns", POWERSHELL_NAMESPACE_URI))
                    .set_text(blob)
            }))
    }
}

/// Reads `rsp:ShellId` from a Create response.
pub fn read_shell_id(response: &str) -> Result<String, WsManError> {
    let doc = winrs_xml::parser::parse(response)?;
    required_text(&doc, "ShellId")
}

#[cfg(test)]
mod tests {
    use winrs_xml::builder::Builder;

    use super::*;

    #[test]
    fn cmd_shell_body() {
        let body = ShellBody::builder()
            .environment(vec![("FOO".to_owned(), "bar".to_owned())])
            .build();
        let xml = Builder::new(body.to_element()).to_xml_string().unwrap();

        assert_eq!(
            xml,
            concat!(
                r#"<rsp:Shell xmlns:rsp="http://schemas.microsoft.com/wbem/wsman/1/windows/shell">"#,
                r#"<rsp:Environment><rsp:Variable Name="FOO">bar</rsp:Variable></rsp:Environment>"#,
                "<rsp:InputStreams>stdin</rsp:InputStreams>",
                "<rsp:OutputStreams>stdout stderr</rsp:OutputStreams>",
                "</rsp:Shell>"
            )
        );
    }

    #[test]
    fn powershell_shell_body_carries_creation_xml() {
        let body = ShellBody::builder()
            .shell_id("0A6A8D5E-1111-2222-3333-444455556666")
            .input_streams("stdin pr")
            .output_streams("stdout")
            .creation_xml("AAAA")
            .build();
        let xml = Builder::new(body.to_element()).to_xml_string().unwrap();

        assert!(xml.contains(r#"ShellId="0A6A8D5E-1111-2222-3333-444455556666""#));
        assert!(xml.contains(
            r#"<creationXml xmlns="http://schemas.microsoft.com/powershell">AAAA</creationXml>"#
        ));
    }

    #[test]
    fn reads_shell_id() {
        let response = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:rsp="http://schemas.microsoft.com/wbem/wsman/1/windows/shell"><s:Body><rsp:Shell><rsp:ShellId>
            2D6534D0-6B12-40E3-B773-CBA26459CFA8
        </rsp:ShellId></rsp:Shell></s:Body></s:Envelope>"#;

        assert_eq!(read_shell_id(response).unwrap(), "2D6534D0-6B12-40E3-B773-CBA26459CFA8");
        assert!(matches!(
            read_shell_id("<s:Envelope xmlns:s=\"urn:x\"/>"),
            Err(WsManError::MissingElement("ShellId"))
        ));
    }
}
