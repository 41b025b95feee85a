mod header;

pub use header::{OptionSet, SelectorSet};

use std::time::Duration;

use tracing::trace;
use winrs_xml::builder::{Attribute, Builder, Element};

use crate::WsManError;
use crate::cores::{ANONYMOUS_ADDRESS, WsAction, WsNamespace, iso8601_duration};

/// Session-wide envelope settings. Every request shares them; only the
/// action, resource, addressing and body change per call.
#[derive(Debug, Clone, typed_builder::TypedBuilder)]
pub struct WsMan {
    #[builder(setter(into))]
    to: String,

    #[builder(default = 153_600)]
    max_envelope_size: u32,

    #[builder(default = Duration::from_secs(60))]
    operation_timeout: Duration,

    #[builder(default = "en-US".to_owned(), setter(into))]
    locale: String,

    #[builder(default = "en-US".to_owned(), setter(into))]
    data_locale: String,
}

/// One WS-Man operation to wrap in an envelope.
#[derive(Debug, Clone, typed_builder::TypedBuilder)]
pub struct WsManRequest<'a> {
    pub action: WsAction,
    pub resource_uri: &'a str,
    #[builder(default)]
    pub selectors: SelectorSet,
    #[builder(default)]
    pub options: OptionSet,
    #[builder(default, setter(strip_option))]
    pub body: Option<Element<'a>>,
}

impl WsMan {
    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn max_envelope_size(&self) -> u32 {
        self.max_envelope_size
    }

    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Renders the full SOAP envelope for `request`.
    pub fn envelope(&self, request: &WsManRequest<'_>) -> Result<String, WsManError> {
        let s = WsNamespace::SoapEnvelope2003.namespace();
        let a = WsNamespace::WsAddressing2004.namespace();
        let w = WsNamespace::DmtfWsmanSchema.namespace();
        let p = WsNamespace::MsWsmanSchema.namespace();

        let must_understand = |value: &'static str| Attribute::new("mustUnderstand", value).set_namespace(s);
        let message_id = format!("uuid:{}", uuid::Uuid::new_v4().to_string().to_uppercase());
        let max_envelope_size = self.max_envelope_size.to_string();
        let timeout = iso8601_duration(self.operation_timeout);

        let header = Element::new("Header")
            .set_namespace(s)
            .add_child(Element::new("To").set_namespace(a).set_text(self.to.as_str()))
            .add_child(
                Element::new("ReplyTo").set_namespace(a).add_child(
                    Element::new("Address")
                        .set_namespace(a)
                        .add_attribute(must_understand("true"))
                        .set_text(ANONYMOUS_ADDRESS),
                ),
            )
            .add_child(
                Element::new("MaxEnvelopeSize")
                    .set_namespace(w)
                    .add_attribute(must_understand("true"))
                    .set_text(max_envelope_size.as_str()),
            )
            .add_child(Element::new("MessageID").set_namespace(a).set_text(message_id.as_str()))
            .add_child(
                Element::new("Locale")
                    .set_namespace(w)
                    .add_attribute(Attribute::new("xml:lang", self.locale.as_str()))
                    .add_attribute(must_understand("false")),
            )
            .add_child(
                Element::new("DataLocale")
                    .set_namespace(p)
                    .add_attribute(Attribute::new("xml:lang", self.data_locale.as_str()))
                    .add_attribute(must_understand("false")),
            )
            .add_child(Element::new("OperationTimeout").set_namespace(w).set_text(timeout.as_str()))
            .add_child(
                Element::new("ResourceURI")
                    .set_namespace(w)
                    .add_attribute(must_understand("true"))
                    .set_text(request.resource_uri),
            )
            .add_child(
                Element::new("Action")
                    .set_namespace(a)
                    .add_attribute(must_understand("true"))
                    .set_text(request.action.as_str()),
            )
            .add_child_optional(
                (!request.selectors.is_empty()).then(|| request.selectors.to_element()),
            )
            .add_child_optional((!request.options.is_empty()).then(|| request.options.to_element()));

        let body = Element::new("Body").set_namespace(s);
        let body = match &request.body {
            Some(content) => body.add_child(content.clone()),
            None => body,
        };

        let envelope = Element::new("Envelope")
            .set_namespace(s)
            .add_child(header)
            .add_child(body);

        let xml = Builder::new(envelope).to_xml_string()?;
        trace!(target: "transport", action = ?request.action, envelope = %xml, "built envelope");
        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cores::CMD_RESOURCE_URI;

    fn wsman() -> WsMan {
        WsMan::builder().to("http://host:5985/wsman").build()
    }

    #[test]
    fn envelope_carries_standard_headers() {
        let request = WsManRequest::builder()
            .action(WsAction::Delete)
            .resource_uri(CMD_RESOURCE_URI)
            .selectors(SelectorSet::new().add_selector("ShellId", "ABC"))
            .build();

        let xml = wsman().envelope(&request).unwrap();

        assert!(xml.starts_with("<s:Envelope"));
        assert!(xml.contains(r#"xmlns:s="http://www.w3.org/2003/05/soap-envelope""#));
        assert!(xml.contains("<a:To>http://host:5985/wsman</a:To>"));
        assert!(xml.contains(r#"<w:MaxEnvelopeSize s:mustUnderstand="true">153600</w:MaxEnvelopeSize>"#));
        assert!(xml.contains("<w:OperationTimeout>PT60.000S</w:OperationTimeout>"));
        assert!(xml.contains(WsAction::Delete.as_str()));
        assert!(xml.contains(r#"<w:Selector Name="ShellId">ABC</w:Selector>"#));
        assert!(!xml.contains("OptionSet"));
        assert!(xml.contains("<s:Body/>"));
    }

    #[test]
    fn envelope_parses_back() {
        let request = WsManRequest::builder()
            .action(WsAction::Create)
            .resource_uri(CMD_RESOURCE_URI)
            .options(OptionSet::new().add_required_option("protocolversion", "2.3"))
            .build();

        let xml = wsman().envelope(&request).unwrap();
        let doc = winrs_xml::parser::parse(&xml).unwrap();
        let option = doc
            .descendants()
            .find(|n| n.has_tag_name((WsNamespace::DmtfWsmanSchema.url(), "Option")))
            .unwrap();

        assert_eq!(option.attribute("Name"), Some("protocolversion"));
        assert_eq!(option.attribute("MustComply"), Some("true"));
        assert_eq!(option.text(), Some("2.3"));
    }
}
