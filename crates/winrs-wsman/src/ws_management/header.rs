use winrs_xml::builder::{Attribute, Element};

use crate::cores::WsNamespace;

/// `w:SelectorSet`, addressing one shell instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorSet {
    selectors: Vec<(String, String)>,
}

impl SelectorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// ```
    /// use winrs_wsman::SelectorSet;
    /// let set = SelectorSet::new().add_selector("ShellId", "12345");
    /// assert_eq!(set.get("ShellId"), Some("12345"));
    /// ```
    pub fn add_selector(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.selectors.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.selectors
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub(crate) fn to_element(&self) -> Element<'_> {
        let w = WsNamespace::DmtfWsmanSchema.namespace();
        Element::new("SelectorSet")
            .set_namespace(w)
            .add_children(self.selectors.iter().map(|(name, value)| {
                Element::new("Selector")
                    .set_namespace(w)
                    .add_attribute(Attribute::new("Name", name.as_str()))
                    .set_text(value.as_str())
            }))
    }
}

/// `w:OptionSet`, e.g. `WINRS_CODEPAGE` or the PSRP `protocolversion`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    options: Vec<(String, String, bool)>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((name.into(), value.into(), false));
        self
    }

    /// Adds an option the service must honour or fail the request.
    pub fn add_required_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((name.into(), value.into(), true));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, v, _)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub(crate) fn to_element(&self) -> Element<'_> {
        let w = WsNamespace::DmtfWsmanSchema.namespace();
        Element::new("OptionSet")
            .set_namespace(w)
            .add_children(self.options.iter().map(|(name, value, must_comply)| {
                let option = Element::new("Option")
                    .set_namespace(w)
                    .add_attribute(Attribute::new("Name", name.as_str()))
                    .set_text(value.as_str());
                if *must_comply {
                    option.add_attribute(Attribute::new("MustComply", "true"))
                } else {
                    option
                }
            }))
    }
}
