use crate::ps_value::PsValue;
use crate::text::{chomp, decode_escaped_ps_string};

/// PIPELINE_OUTPUT: one object written to the output stream.
///
/// With `Out-String -Stream` at the end of the pipeline every object is a
/// single `<S>` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub data: PsValue,
}

impl PipelineOutput {
    /// The output line, with escapes decoded and exactly one trailing CRLF.
    pub fn output(&self) -> String {
        let raw = match &self.data {
            PsValue::Primitive(p) => p.to_string(),
            PsValue::Object(obj) => obj.to_string(),
        };
        let decoded = decode_escaped_ps_string(&raw);
        format!("{}\r\n", chomp(&decoded))
    }
}

impl From<PsValue> for PipelineOutput {
    fn from(data: PsValue) -> Self {
        Self { data }
    }
}
