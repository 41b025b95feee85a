use winrs_xml::parser::NodeExt;

use crate::WsManError;

/// Reads `cfg:MaxEnvelopeSizekb` from a Get on the service configuration.
pub fn read_max_envelope_size_kb(response: &str) -> Result<u32, WsManError> {
    let doc = winrs_xml::parser::parse(response)?;
    let text = doc
        .root_element()
        .find_descendant("MaxEnvelopeSizekb")
        .map(|n| n.text_content())
        .ok_or(WsManError::MissingElement("MaxEnvelopeSizekb"))?;

    text.trim()
        .parse()
        .map_err(|_| WsManError::InvalidResponse(format!("MaxEnvelopeSizekb is not a number: {text}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_configured_size() {
        let response = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:cfg="http://schemas.microsoft.com/wbem/wsman/1/config"><s:Body><cfg:Config><cfg:MaxEnvelopeSizekb>500</cfg:MaxEnvelopeSizekb><cfg:MaxTimeoutms>60000</cfg:MaxTimeoutms></cfg:Config></s:Body></s:Envelope>"#;
        assert_eq!(read_max_envelope_size_kb(response).unwrap(), 500);
    }

    #[test]
    fn rejects_garbage() {
        let response = r#"<Config><MaxEnvelopeSizekb>lots</MaxEnvelopeSizekb></Config>"#;
        assert!(matches!(
            read_max_envelope_size_kb(response),
            Err(WsManError::InvalidResponse(_))
        ));
    }
}
