use std::collections::BTreeMap;

use crate::PsrpError;
use crate::ps_value::{ComplexObject, PsValue};
use crate::text::decode_escaped_ps_string;

/// Parameter names, in order, for the host methods the client understands.
/// Methods not listed keep positional `p0`, `p1`, ... names.
const METHOD_SIGNATURES: &[(&str, &[&str])] = &[
    ("Write1", &["s"]),
    ("Write2", &["foreground_color", "background_color", "s"]),
    ("WriteLine1", &["s"]),
    ("WriteLine2", &["s"]),
    ("WriteLine3", &["foreground_color", "background_color", "s"]),
    ("WriteErrorLine", &["s"]),
    ("WriteDebugLine", &["s"]),
    ("WriteVerboseLine", &["s"]),
    ("WriteWarningLine", &["s"]),
    ("SetShouldExit", &["exit_code"]),
];

/// `RemoteHostMethodId` values for the methods above, used when the server
/// sends the enum without its `ToString` name.
const METHOD_IDS: &[(i32, &str)] = &[
    (6, "SetShouldExit"),
    (13, "Write1"),
    (14, "Write2"),
    (15, "WriteLine1"),
    (16, "WriteLine2"),
    (17, "WriteLine3"),
    (18, "WriteErrorLine"),
    (19, "WriteDebugLine"),
    (21, "WriteVerboseLine"),
    (22, "WriteWarningLine"),
];

/// RUNSPACEPOOL_HOST_CALL / PIPELINE_HOST_CALL payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCall {
    pub call_id: i64,
    pub method_identifier: String,
    pub method_parameters: BTreeMap<String, PsValue>,
}

impl HostCall {
    pub fn parameter(&self, name: &str) -> Option<&PsValue> {
        self.method_parameters.get(name)
    }

    /// Text argument of the Write* family, with `_xHHHH_` escapes decoded.
    pub fn text(&self) -> Option<String> {
        self.parameter("s")
            .map(|value| decode_escaped_ps_string(&value.to_string()).into_owned())
    }

    /// Exit code carried by `SetShouldExit`.
    pub fn should_exit_code(&self) -> Option<i32> {
        if self.method_identifier != "SetShouldExit" {
            return None;
        }
        self.parameter("exit_code").and_then(PsValue::as_i32)
    }

    pub fn is_error(&self) -> bool {
        self.method_identifier.contains("Error")
    }
}

fn method_name(mi: &PsValue) -> Option<String> {
    if let Some(obj) = mi.as_object()
        && let Some(name) = obj.to_string.as_deref()
        && !name.is_empty()
    {
        return Some(name.to_owned());
    }

    let id = mi.as_i32()?;
    METHOD_IDS
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, name)| (*name).to_owned())
        .or_else(|| Some(id.to_string()))
}

fn name_parameters(method: &str, values: &[PsValue]) -> BTreeMap<String, PsValue> {
    let names = METHOD_SIGNATURES
        .iter()
        .find(|(known, _)| *known == method)
        .map_or(&[][..], |(_, names)| *names);

    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let name = names
                .get(index)
                .map_or_else(|| format!("p{index}"), |n| (*n).to_owned());
            (name, value.clone())
        })
        .collect()
}

impl TryFrom<&ComplexObject> for HostCall {
    type Error = PsrpError;

    fn try_from(obj: &ComplexObject) -> Result<Self, Self::Error> {
        let call_id = obj.property("ci").and_then(PsValue::as_i64).unwrap_or(-100);

        let method_identifier = obj
            .property("mi")
            .and_then(method_name)
            .ok_or_else(|| PsrpError::InvalidMessage("Host call without method id".to_owned()))?;

        let values = obj.property("mp").and_then(PsValue::as_list).unwrap_or_default();
        let method_parameters = name_parameters(&method_identifier, values);

        Ok(Self {
            call_id,
            method_identifier,
            method_parameters,
        })
    }
}
