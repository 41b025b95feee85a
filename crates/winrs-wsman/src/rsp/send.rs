use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use winrs_xml::builder::{Attribute, Element};

use super::{rsp_element, rsp_text};

/// `rsp:Send` with a single base64 `rsp:Stream`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendStream {
    pub stream_name: String,
    pub command_id: String,
    encoded: String,
    pub end: bool,
}

impl SendStream {
    pub fn new(stream_name: impl Into<String>, command_id: impl Into<String>, data: &[u8]) -> Self {
        Self {
            stream_name: stream_name.into(),
            command_id: command_id.into(),
            encoded: B64.encode(data),
            end: false,
        }
    }

    /// Marks the stream as finished (`End="true"`).
    pub fn with_end(mut self) -> Self {
        self.end = true;
        self
    }

    pub fn to_element(&self) -> Element<'_> {
        let mut stream = rsp_text("Stream", &self.encoded)
            .add_attribute(Attribute::new("Name", self.stream_name.as_str()))
            .add_attribute(Attribute::new("CommandId", self.command_id.as_str()));
        if self.end {
            stream = stream.add_attribute(Attribute::new("End", "true"));
        }
        rsp_element("Send").add_child(stream)
    }
}

#[cfg(test)]
mod tests {
    use winrs_xml::builder::Builder;

    use super::*;

    #[test]
    fn encodes_payload() {
        let send = SendStream::new("stdin", "ABC", b"hello");
        let xml = Builder::new(send.to_element()).to_xml_string().unwrap();

        assert!(xml.contains(r#"<rsp:Stream Name="stdin" CommandId="ABC">aGVsbG8=</rsp:Stream>"#));
    }
}
