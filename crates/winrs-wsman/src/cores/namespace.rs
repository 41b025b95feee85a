use winrs_xml::builder::Namespace;

/// The fixed set of namespaces WS-Man envelopes use. Immutable: every prefix
/// is bound once here and shared by all builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WsNamespace {
    SoapEnvelope2003,
    WsAddressing2004,
    WsTransfer2004,
    DmtfWsmanSchema,
    MsWsmanSchema,
    WsmanShell,
    WsmanConfig,
}

impl WsNamespace {
    pub const ALL: [Self; 7] = [
        Self::SoapEnvelope2003,
        Self::WsAddressing2004,
        Self::WsTransfer2004,
        Self::DmtfWsmanSchema,
        Self::MsWsmanSchema,
        Self::WsmanShell,
        Self::WsmanConfig,
    ];

    pub const fn as_tuple(self) -> (&'static str, &'static str) {
        match self {
            Self::SoapEnvelope2003 => ("s", "http://www.w3.org/2003/05/soap-envelope"),
            Self::WsAddressing2004 => ("a", "http://schemas.xmlsoap.org/ws/2004/08/addressing"),
            Self::WsTransfer2004 => ("x", "http://schemas.xmlsoap.org/ws/2004/09/transfer"),
            Self::DmtfWsmanSchema => ("w", "http://schemas.dmtf.org/wbem/wsman/1/wsman.xsd"),
            Self::MsWsmanSchema => ("p", "http://schemas.microsoft.com/wbem/wsman/1/wsman.xsd"),
            Self::WsmanShell => ("rsp", "http://schemas.microsoft.com/wbem/wsman/1/windows/shell"),
            Self::WsmanConfig => ("cfg", "http://schemas.microsoft.com/wbem/wsman/1/config"),
        }
    }

    pub const fn alias(self) -> &'static str {
        self.as_tuple().0
    }

    pub const fn url(self) -> &'static str {
        self.as_tuple().1
    }

    pub const fn namespace(self) -> Namespace<'static> {
        let (alias, url) = self.as_tuple();
        Namespace::new(alias, url)
    }

    pub fn from_url(url: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ns| ns.url() == url)
    }
}
