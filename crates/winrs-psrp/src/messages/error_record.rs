use std::collections::BTreeMap;

use crate::ps_value::{ComplexObject, PsValue};
use crate::text::{decode_escaped_ps_string, to_snake_case};

/// Flattened view of a serialized `System.Management.Automation.ErrorRecord`.
///
/// `exception` is keyed by the lower-cased property name, `invocation_info`
/// by the snake_case form produced by [`to_snake_case`].
#[derive(Debug, Clone, PartialEq, Eq, Default, typed_builder::TypedBuilder)]
pub struct ErrorRecord {
    #[builder(default)]
    pub exception: BTreeMap<String, String>,
    #[builder(default)]
    pub fully_qualified_error_id: Option<String>,
    #[builder(default)]
    pub invocation_info: Option<BTreeMap<String, String>>,
    #[builder(default)]
    pub error_category_message: Option<String>,
    #[builder(default)]
    pub error_details_script_stack_trace: Option<String>,
}

fn property_map(obj: &ComplexObject, key: impl Fn(&str) -> String) -> BTreeMap<String, String> {
    obj.adapted_properties
        .iter()
        .chain(&obj.extended_properties)
        .filter(|(_, value)| !value.is_nil())
        .map(|(name, value)| (key(name), value.to_string()))
        .collect()
}

impl From<&ComplexObject> for ErrorRecord {
    fn from(obj: &ComplexObject) -> Self {
        let string_prop = |name: &str| {
            obj.property(name)
                .filter(|v| !v.is_nil())
                .map(ToString::to_string)
        };

        let exception = obj
            .property_object("Exception")
            .map(|e| property_map(e, str::to_lowercase))
            .unwrap_or_default();

        let invocation_info = obj
            .property_object("InvocationInfo")
            .map(|info| property_map(info, to_snake_case));

        Self {
            exception,
            fully_qualified_error_id: string_prop("FullyQualifiedErrorId"),
            invocation_info,
            error_category_message: string_prop("ErrorCategory_Message"),
            error_details_script_stack_trace: string_prop("ErrorDetails_ScriptStackTrace"),
        }
    }
}

impl TryFrom<&PsValue> for ErrorRecord {
    type Error = crate::PsrpError;

    fn try_from(value: &PsValue) -> Result<Self, Self::Error> {
        value
            .as_object()
            .map(Self::from)
            .ok_or_else(|| Self::Error::InvalidMessage("ErrorRecord is not an object".to_owned()))
    }
}

impl ErrorRecord {
    pub fn message(&self) -> &str {
        self.exception.get("message").map_or("", String::as_str)
    }

    /// Renders the record the way the console host prints it, CRLF terminated.
    pub fn render(&self) -> String {
        let category = self.error_category_message.as_deref().unwrap_or_default();
        let fqid = self.fully_qualified_error_id.as_deref().unwrap_or_default();

        let head = match &self.invocation_info {
            Some(info) => {
                let field = |name: &str| info.get(name).map_or("", String::as_str);
                format!(
                    "{} : {}\r\n{}\r\n",
                    field("my_command"),
                    self.message(),
                    chomp_lines(field("position_message"))
                )
            }
            None => format!("{}\r\n", self.message()),
        };

        let rendered = format!(
            "{head}    + CategoryInfo          : {category}\r\n    + FullyQualifiedErrorId : {fqid}\r\n"
        );
        decode_escaped_ps_string(&rendered).into_owned()
    }
}

fn chomp_lines(text: &str) -> &str {
    text.trim_end_matches(['\r', '\n'])
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERROR_XML: &str = r#"<Obj RefId="0"><TN RefId="0"><T>System.Management.Automation.ErrorRecord</T><T>System.Object</T></TN><ToString>oops</ToString>
<MS>
  <Obj N="Exception" RefId="1"><TN RefId="1"><T>System.Management.Automation.RuntimeException</T><T>System.Object</T></TN><ToString>oops</ToString>
    <Props><S N="Message">oops</S><Nil N="Data"/><S N="Source">System.Management.Automation</S></Props>
  </Obj>
  <S N="FullyQualifiedErrorId">oops</S>
  <Obj N="InvocationInfo" RefId="2"><TN RefId="2"><T>System.Management.Automation.InvocationInfo</T><T>System.Object</T></TN><ToString>System.Management.Automation.InvocationInfo</ToString>
    <Props><S N="MyCommand">Write-Error</S><S N="PositionMessage">At line:1 char:1_x000D__x000A_+ throw 'oops'</S><S N="PSScriptRoot"></S><I32 N="ScriptLineNumber">1</I32></Props>
  </Obj>
  <S N="ErrorCategory_Message">OperationStopped: (oops:String) [], RuntimeException</S>
  <S N="ErrorDetails_ScriptStackTrace">at &lt;ScriptBlock&gt;, &lt;No file&gt;: line 1</S>
</MS></Obj>"#;

    fn record() -> ErrorRecord {
        let value = PsValue::from_clixml(ERROR_XML).unwrap();
        ErrorRecord::try_from(&value).unwrap()
    }

    #[test]
    fn extracts_field_maps() {
        let record = record();

        assert_eq!(record.exception.get("message").unwrap(), "oops");
        assert_eq!(record.exception.get("source").unwrap(), "System.Management.Automation");
        assert!(!record.exception.contains_key("data"));
        assert_eq!(record.fully_qualified_error_id.as_deref(), Some("oops"));

        let info = record.invocation_info.as_ref().unwrap();
        assert_eq!(info.get("my_command").unwrap(), "Write-Error");
        assert_eq!(info.get("script_line_number").unwrap(), "1");
        assert!(info.contains_key("ps_script_root"));

        assert_eq!(
            record.error_details_script_stack_trace.as_deref(),
            Some("at <ScriptBlock>, <No file>: line 1")
        );
    }

    #[test]
    fn renders_console_style() {
        assert_eq!(
            record().render(),
            "Write-Error : oops\r\nAt line:1 char:1\r\n+ throw 'oops'\r\n    + CategoryInfo          : OperationStopped: (oops:String) [], RuntimeException\r\n    + FullyQualifiedErrorId : oops\r\n"
        );
    }

    #[test]
    fn renders_without_invocation_info() {
        let record = ErrorRecord::builder()
            .exception(BTreeMap::from([("message".to_owned(), "bad".to_owned())]))
            .fully_qualified_error_id(Some("Id".to_owned()))
            .error_category_message(Some("NotSpecified".to_owned()))
            .build();

        assert_eq!(
            record.render(),
            "bad\r\n    + CategoryInfo          : NotSpecified\r\n    + FullyQualifiedErrorId : Id\r\n"
        );
    }
}
