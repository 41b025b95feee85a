pub use roxmltree::*;

use crate::XmlError;

pub fn parse(xml: &str) -> Result<Document<'_>, roxmltree::Error> {
    roxmltree::Document::parse(xml)
}

/// Helpers shared by every reader that walks a parsed response.
pub trait NodeExt<'a, 'input> {
    /// First descendant (self included) whose local name matches.
    fn find_descendant(&self, local_name: &str) -> Option<Node<'a, 'input>>;

    /// First direct child element whose local name matches.
    fn find_child(&self, local_name: &str) -> Option<Node<'a, 'input>>;

    /// Like [`NodeExt::find_child`], but a missing child is an error.
    fn expect_child(&self, local_name: &str) -> Result<Node<'a, 'input>, XmlError>;

    /// Concatenated text of the direct text children, empty when there is none.
    fn text_content(&self) -> String;
}

impl<'a, 'input> NodeExt<'a, 'input> for Node<'a, 'input> {
    fn find_descendant(&self, local_name: &str) -> Option<Node<'a, 'input>> {
        self.descendants()
            .find(|n| n.is_element() && n.tag_name().name() == local_name)
    }

    fn find_child(&self, local_name: &str) -> Option<Node<'a, 'input>> {
        self.children()
            .find(|n| n.is_element() && n.tag_name().name() == local_name)
    }

    fn expect_child(&self, local_name: &str) -> Result<Node<'a, 'input>, XmlError> {
        self.find_child(local_name).ok_or_else(|| {
            XmlError::MissingElement(format!(
                "{} under {}",
                local_name,
                self.tag_name().name()
            ))
        })
    }

    fn text_content(&self) -> String {
        self.children()
            .filter(Node::is_text)
            .filter_map(|n| n.text())
            .collect()
    }
}

impl<'a> TryFrom<Node<'a, 'a>> for crate::builder::Element<'a> {
    type Error = XmlError;

    fn try_from(value: Node<'a, 'a>) -> Result<Self, Self::Error> {
        if !value.is_element() {
            return Err(XmlError::InvalidNodeType {
                expected: NodeType::Element,
                found: value.node_type(),
            });
        }

        let mut element = crate::builder::Element::new(value.tag_name().name());
        for attribute in value.attributes() {
            element = element.add_attribute(crate::builder::Attribute::new(
                attribute.name(),
                attribute.value().to_owned(),
            ));
        }

        let children: Vec<_> = value.children().filter(Node::is_element).collect();
        if children.is_empty() {
            if let Some(text) = value.text() {
                element = element.set_text(text.to_owned());
            }
        } else {
            for child in children {
                element = element.add_child(crate::builder::Element::try_from(child)?);
            }
        }

        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_elements_by_local_name_across_namespaces() {
        let doc = parse(
            r#"<s:Envelope xmlns:s="urn:s" xmlns:r="urn:r"><s:Body><r:Shell><r:ShellId>abc</r:ShellId></r:Shell></s:Body></s:Envelope>"#,
        )
        .unwrap();

        let root = doc.root_element();
        let shell_id = root.find_descendant("ShellId").unwrap();
        assert_eq!(shell_id.text_content(), "abc");
        assert!(root.find_child("Shell").is_none());
        assert!(root.find_child("Body").is_some());
    }

    #[test]
    fn expect_child_reports_missing_element() {
        let doc = parse("<a><b/></a>").unwrap();
        let err = doc.root_element().expect_child("c").unwrap_err();
        assert!(matches!(err, XmlError::MissingElement(ref m) if m.contains("c under a")));
    }

    #[test]
    fn node_converts_back_into_builder_element() {
        let doc = parse(r#"<Obj RefId="0"><S N="Key">v &amp; w</S></Obj>"#).unwrap();
        let element = crate::builder::Element::try_from(doc.root_element()).unwrap();
        let xml = crate::builder::Builder::new(element)
            .to_xml_string()
            .unwrap();
        assert_eq!(xml, r#"<Obj RefId="0"><S N="Key">v &amp; w</S></Obj>"#);
    }
}
