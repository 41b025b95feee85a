use core::fmt;

/// An XML namespace together with the prefix it is written under.
///
/// Equality and hashing only consider the URI; the prefix is a rendering detail.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Namespace<'a> {
    pub alias: &'a str,
    pub url: &'a str,
}

impl PartialEq for Namespace<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl std::hash::Hash for Namespace<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

impl fmt::Display for Namespace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.url.fmt(f)
    }
}

impl<'a> Namespace<'a> {
    /// ```
    /// use winrs_xml::builder::Namespace;
    /// let ns = Namespace::new("rsp", "http://schemas.microsoft.com/wbem/wsman/1/windows/shell");
    /// assert_eq!(ns.alias, "rsp");
    /// ```
    pub const fn new(alias: &'a str, url: &'a str) -> Self {
        Namespace { alias, url }
    }
}
