//! Builder side of the crate: compose [`Element`] trees and render them as text.
//!
//! Namespaces are attached to elements and attributes as [`Namespace`] values
//! carrying both the prefix and the URI. The root element declares every
//! namespace used anywhere in the tree, so callers never emit `xmlns` by hand.
mod attribute;
#[allow(clippy::module_inception)]
mod builder;
mod element;
mod namespace;

pub use self::attribute::*;
pub use self::builder::*;
pub use self::element::*;
pub use self::namespace::*;

#[derive(Debug, thiserror::Error)]
pub enum XmlBuilderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
    #[error("Namespace prefix '{alias}' bound to both '{first}' and '{second}'")]
    ConflictingAlias {
        alias: String,
        first: String,
        second: String,
    },
}

/// Escapes the five XML special characters for text and attribute content.
pub fn escape(value: &str) -> std::borrow::Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return std::borrow::Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    std::borrow::Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_xml() {
        let builder = Builder::new(Element::new("root"));
        assert_eq!(builder.to_xml_string().unwrap(), "<root/>");
    }

    #[test]
    fn test_xml_with_attributes_and_escaped_text() {
        let element = Element::new("root")
            .add_attribute(Attribute::new("attr1", "a\"b"))
            .set_text("1 < 2 & 3");

        let xml = Builder::new(element).to_xml_string().unwrap();
        assert_eq!(xml, r#"<root attr1="a&quot;b">1 &lt; 2 &amp; 3</root>"#);
    }

    #[test]
    fn test_namespaces_declared_once_on_root() {
        let s = Namespace::new("s", "http://www.w3.org/2003/05/soap-envelope");
        let w = Namespace::new("w", "http://schemas.dmtf.org/wbem/wsman/1/wsman.xsd");

        let envelope = Element::new("Envelope").set_namespace(s).add_child(
            Element::new("Header").set_namespace(s).add_child(
                Element::new("ResourceURI")
                    .set_namespace(w)
                    .add_attribute(Attribute::new("mustUnderstand", "true").set_namespace(s))
                    .set_text("uri"),
            ),
        );

        let xml = Builder::new(envelope)
            .with_declaration()
            .to_xml_string()
            .unwrap();

        assert_eq!(
            xml,
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:w="http://schemas.dmtf.org/wbem/wsman/1/wsman.xsd">"#,
                r#"<s:Header><w:ResourceURI s:mustUnderstand="true">uri</w:ResourceURI></s:Header>"#,
                "</s:Envelope>"
            )
        );
    }

    #[test]
    fn test_conflicting_alias_is_rejected() {
        let element = Element::new("a")
            .set_namespace(Namespace::new("p", "urn:one"))
            .add_child(Element::new("b").set_namespace(Namespace::new("p", "urn:two")));

        let err = Builder::new(element).to_xml_string().unwrap_err();
        assert!(matches!(err, XmlBuilderError::ConflictingAlias { .. }));
    }

    #[test]
    fn test_escape_borrows_clean_input() {
        assert!(matches!(escape("plain"), std::borrow::Cow::Borrowed("plain")));
        assert_eq!(escape("'&'"), "&apos;&amp;&apos;");
    }
}
