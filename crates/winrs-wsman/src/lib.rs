pub mod cores;
pub mod rsp;
pub mod soap;
pub mod ws_management;

pub use cores::{WsAction, WsNamespace};
pub use soap::fault::{WsManFault, fault_codes};
pub use ws_management::{OptionSet, SelectorSet, WsMan, WsManRequest};

#[derive(Debug, thiserror::Error)]
pub enum WsManError {
    #[error("Response is missing element '{0}'")]
    MissingElement(&'static str),

    #[error("Invalid WS-Man response: {0}")]
    InvalidResponse(String),

    #[error("Failed to parse response XML: {0}")]
    ParserError(#[from] winrs_xml::parser::Error),

    #[error(transparent)]
    XmlError(#[from] winrs_xml::XmlError),

    #[error("Failed to build envelope: {0}")]
    XmlBuilderError(#[from] winrs_xml::builder::XmlBuilderError),

    #[error("Invalid base64 stream content: {0}")]
    Base64Error(#[from] base64::DecodeError),
}
