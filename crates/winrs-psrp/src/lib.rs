pub mod cores;
pub mod fragmentation;
pub mod messages;
pub mod output_decoder;
pub mod ps_value;
pub mod text;
pub mod uuid_codec;

use std::string::FromUtf8Error;

pub use cores::*;
pub use fragmentation::*;
pub use messages::*;
pub use output_decoder::*;
pub use ps_value::{PsObjectWithType, PsPrimitiveValue, PsValue};

/// Protocol version advertised in SessionCapability.
pub const PROTOCOL_VERSION: &str = "2.3";
pub const PS_VERSION: &str = "2.0";
pub const SERIALIZATION_VERSION: &str = "1.1.0.1";

#[derive(Debug, thiserror::Error)]
pub enum PsrpError {
    #[error("Invalid PowerShell remoting message: {0}")]
    InvalidMessage(String),

    #[error("Unknown message type: 0x{0:08x}")]
    UnknownMessageType(u32),

    #[error("Invalid UUID '{text}'")]
    InvalidUuid { text: String },

    #[error("IO Error: {0}")]
    IoError(String),

    #[error("Serialization Error: {0}")]
    SerializationError(&'static str),

    #[error("Message data is not valid UTF-8: {0}")]
    Utf8Error(#[from] FromUtf8Error),

    #[error("Failed to parse XML: {0}")]
    XmlError(#[from] winrs_xml::XmlError),

    #[error("Failed to build XML: {0}")]
    XmlBuilderError(#[from] winrs_xml::builder::XmlBuilderError),

    #[error("Invalid base64 payload: {0}")]
    Base64Error(#[from] base64::DecodeError),
}

impl From<std::io::Error> for PsrpError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<winrs_xml::parser::Error> for PsrpError {
    fn from(err: winrs_xml::parser::Error) -> Self {
        Self::XmlError(winrs_xml::XmlError::ParserError(err))
    }
}
