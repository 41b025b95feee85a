use std::collections::BTreeMap;
use std::io::Write;

use crate::builder::{Element, XmlBuilderError};

const DECLARATION: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Renders an element tree, declaring every namespace it uses on the root.
pub struct Builder<'a> {
    declaration: bool,
    element: Element<'a>,
}

impl<'a> Builder<'a> {
    pub fn new(element: Element<'a>) -> Self {
        Builder {
            declaration: false,
            element,
        }
    }

    /// Prefixes the output with a UTF-8 `<?xml ...?>` declaration.
    pub fn with_declaration(mut self) -> Self {
        self.declaration = true;
        self
    }

    pub fn write_to<W: Write>(&self, mut w: W) -> Result<(), XmlBuilderError> {
        if self.declaration {
            w.write_all(DECLARATION)?;
        }

        let mut namespaces = BTreeMap::new();
        self.element.collect_namespaces(&mut namespaces)?;
        self.element.write(&mut w, Some(&namespaces))
    }

    pub fn to_xml_string(&self) -> Result<String, XmlBuilderError> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

impl<'a> From<Element<'a>> for Builder<'a> {
    fn from(element: Element<'a>) -> Self {
        Builder::new(element)
    }
}
