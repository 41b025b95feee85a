use std::borrow::Cow;

use crate::builder::{Namespace, XmlBuilderError, escape};

/// Represents an XML attribute with a name and value.
#[derive(Debug, Clone)]
pub struct Attribute<'a> {
    name: &'a str,
    value: Cow<'a, str>,
    namespace: Option<Namespace<'a>>,
}

impl<'a> Attribute<'a> {
    /// ```
    /// use winrs_xml::builder::Attribute;
    /// let attribute = Attribute::new("Name", "ShellId");
    /// assert_eq!(attribute.value(), "ShellId");
    /// ```
    pub fn new(name: &'a str, value: impl Into<Cow<'a, str>>) -> Self {
        Attribute {
            name,
            value: value.into(),
            namespace: None,
        }
    }

    pub fn set_namespace(mut self, namespace: Namespace<'a>) -> Self {
        self.namespace = Some(namespace);
        self
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub(crate) fn namespace(&self) -> Option<&Namespace<'a>> {
        self.namespace.as_ref()
    }

    pub(crate) fn write<W: std::io::Write>(&self, w: &mut W) -> Result<(), XmlBuilderError> {
        match &self.namespace {
            Some(ns) => write!(w, " {}:{}=\"{}\"", ns.alias, self.name, escape(&self.value))?,
            None => write!(w, " {}=\"{}\"", self.name, escape(&self.value))?,
        }
        Ok(())
    }
}
