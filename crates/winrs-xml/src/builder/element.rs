use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::builder::{Attribute, Namespace, XmlBuilderError, escape};

#[derive(Debug, Clone)]
pub enum Content<'a> {
    /// Escaped on output.
    Text(Cow<'a, str>),
    Elements(Vec<Element<'a>>),
    None,
}

/// Represents an XML element.
#[derive(Debug, Clone)]
pub struct Element<'a> {
    name: &'a str,
    namespace: Option<Namespace<'a>>,
    attributes: Vec<Attribute<'a>>,
    content: Content<'a>,
}

impl<'a> Element<'a> {
    /// Creates a new element with no namespace, attributes or content.
    ///
    /// ```
    /// use winrs_xml::builder::{Builder, Element};
    /// let element = Element::new("root").add_child(Element::new("child").set_text("x"));
    /// let xml = Builder::new(element).to_xml_string().unwrap();
    /// assert_eq!(xml, "<root><child>x</child></root>");
    /// ```
    pub fn new(name: &'a str) -> Self {
        Element {
            name,
            namespace: None,
            attributes: Vec::new(),
            content: Content::None,
        }
    }

    pub fn set_namespace(mut self, namespace: Namespace<'a>) -> Self {
        self.namespace = Some(namespace);
        self
    }

    pub fn set_namespace_optional(mut self, namespace: Option<Namespace<'a>>) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn add_attribute(mut self, attribute: Attribute<'a>) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Appends a child, replacing any text content.
    pub fn add_child(mut self, child: Element<'a>) -> Self {
        match self.content {
            Content::None | Content::Text(_) => {
                self.content = Content::Elements(vec![child]);
            }
            Content::Elements(ref mut children) => {
                children.push(child);
            }
        }
        self
    }

    pub fn add_children(mut self, children: impl IntoIterator<Item = Element<'a>>) -> Self {
        for child in children {
            self = self.add_child(child);
        }
        self
    }

    pub fn add_child_optional(self, child: Option<Element<'a>>) -> Self {
        match child {
            Some(child) => self.add_child(child),
            None => self,
        }
    }

    pub fn set_text(mut self, text: impl Into<Cow<'a, str>>) -> Self {
        self.content = Content::Text(text.into());
        self
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn attributes(&self) -> &[Attribute<'a>] {
        &self.attributes
    }

    pub fn content(&self) -> &Content<'a> {
        &self.content
    }

    /// Collects every namespace used by this subtree, keyed by prefix.
    pub(crate) fn collect_namespaces(
        &self,
        out: &mut BTreeMap<&'a str, &'a str>,
    ) -> Result<(), XmlBuilderError> {
        let attribute_namespaces = self.attributes.iter().filter_map(Attribute::namespace);
        for ns in self.namespace.iter().chain(attribute_namespaces) {
            match out.get(ns.alias) {
                Some(existing) if *existing != ns.url => {
                    return Err(XmlBuilderError::ConflictingAlias {
                        alias: ns.alias.to_owned(),
                        first: (*existing).to_owned(),
                        second: ns.url.to_owned(),
                    });
                }
                Some(_) => {}
                None => {
                    out.insert(ns.alias, ns.url);
                }
            }
        }

        if let Content::Elements(children) = &self.content {
            for child in children {
                child.collect_namespaces(out)?;
            }
        }
        Ok(())
    }

    pub(crate) fn write<W: std::io::Write>(
        &self,
        w: &mut W,
        declarations: Option<&BTreeMap<&'a str, &'a str>>,
    ) -> Result<(), XmlBuilderError> {
        let name: Cow<'_, str> = match &self.namespace {
            Some(ns) => Cow::Owned(format!("{}:{}", ns.alias, self.name)),
            None => Cow::Borrowed(self.name),
        };

        write!(w, "<{name}")?;

        if let Some(declarations) = declarations {
            for (alias, url) in declarations {
                write!(w, " xmlns:{alias}=\"{url}\"")?;
            }
        }

        for attribute in &self.attributes {
            attribute.write(w)?;
        }

        match &self.content {
            Content::None => write!(w, "/>")?,
            Content::Text(value) => write!(w, ">{}</{name}>", escape(value))?,
            Content::Elements(children) => {
                write!(w, ">")?;
                for child in children {
                    child.write(w, None)?;
                }
                write!(w, "</{name}>")?;
            }
        }
        Ok(())
    }
}
