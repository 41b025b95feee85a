use crate::ps_value::{ComplexObject, PsObjectWithType, PsPrimitiveValue, PsValue};
use crate::{MessageType, PROTOCOL_VERSION, PS_VERSION, PsrpError, SERIALIZATION_VERSION};

/// SESSION_CAPABILITY, sent by the client when opening a runspace pool and
/// echoed back by the server.
#[derive(Debug, Clone, PartialEq, Eq, typed_builder::TypedBuilder)]
pub struct SessionCapability {
    #[builder(default = PROTOCOL_VERSION.to_owned(), setter(into))]
    pub protocol_version: String,
    #[builder(default = PS_VERSION.to_owned(), setter(into))]
    pub ps_version: String,
    #[builder(default = SERIALIZATION_VERSION.to_owned(), setter(into))]
    pub serialization_version: String,
    #[builder(default, setter(strip_option, into))]
    pub time_zone: Option<String>,
}

impl Default for SessionCapability {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PsObjectWithType for SessionCapability {
    fn message_type(&self) -> MessageType {
        MessageType::SessionCapability
    }

    fn to_ps_object(&self) -> PsValue {
        let mut obj = ComplexObject::standard()
            .with_extended(
                "protocolversion",
                PsPrimitiveValue::Version(self.protocol_version.clone()),
            )
            .with_extended("PSVersion", PsPrimitiveValue::Version(self.ps_version.clone()))
            .with_extended(
                "SerializationVersion",
                PsPrimitiveValue::Version(self.serialization_version.clone()),
            );

        if let Some(tz) = &self.time_zone {
            obj = obj.with_extended("TimeZone", PsPrimitiveValue::Bytes(tz.as_bytes().to_vec()));
        }

        PsValue::Object(obj)
    }
}

impl TryFrom<&ComplexObject> for SessionCapability {
    type Error = PsrpError;

    fn try_from(obj: &ComplexObject) -> Result<Self, Self::Error> {
        let version = |name: &str| {
            obj.property(name)
                .map(ToString::to_string)
                .ok_or_else(|| PsrpError::InvalidMessage(format!("Missing property: {name}")))
        };

        Ok(Self {
            protocol_version: version("protocolversion")?,
            ps_version: version("PSVersion")?,
            serialization_version: version("SerializationVersion")?,
            time_zone: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_versions() {
        let xml = SessionCapability::default().to_ps_object().to_clixml().unwrap();

        assert!(xml.contains(r#"<Version N="protocolversion">2.3</Version>"#));
        assert!(xml.contains(r#"<Version N="PSVersion">2.0</Version>"#));
        assert!(xml.contains(r#"<Version N="SerializationVersion">1.1.0.1</Version>"#));
    }

    #[test]
    fn parses_server_capability() {
        let value = PsValue::from_clixml(
            r#"<Obj RefId="0"><MS><Version N="protocolversion">2.3</Version><Version N="PSVersion">2.0</Version><Version N="SerializationVersion">1.1.0.1</Version></MS></Obj>"#,
        )
        .unwrap();
        let capability = SessionCapability::try_from(value.as_object().unwrap()).unwrap();

        assert_eq!(capability.protocol_version, "2.3");
        assert_eq!(capability.ps_version, "2.0");
        assert_eq!(capability.serialization_version, "1.1.0.1");
    }
}
