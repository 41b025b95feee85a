use crate::PsrpError;
use crate::messages::ErrorRecord;
use crate::ps_value::{ComplexObject, PsValue};

/// `System.Management.Automation.PSInvocationState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PsInvocationState {
    NotStarted = 0,
    Running = 1,
    Stopping = 2,
    Stopped = 3,
    Completed = 4,
    Failed = 5,
    Disconnected = 6,
}

impl PsInvocationState {
    /// Completed, Failed and Stopped end the pipeline.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Stopped)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::Running => "Running",
            Self::Stopping => "Stopping",
            Self::Stopped => "Stopped",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Disconnected => "Disconnected",
        }
    }
}

impl TryFrom<i32> for PsInvocationState {
    type Error = PsrpError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::NotStarted,
            1 => Self::Running,
            2 => Self::Stopping,
            3 => Self::Stopped,
            4 => Self::Completed,
            5 => Self::Failed,
            6 => Self::Disconnected,
            _ => {
                return Err(PsrpError::InvalidMessage(format!(
                    "Unknown PSInvocationState value: {value}"
                )));
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineState {
    pub pipeline_state: PsInvocationState,
    pub exception_as_error_record: Option<PsValue>,
}

impl PipelineState {
    /// The embedded ErrorRecord, only meaningful for a failed pipeline.
    pub fn exception_as_error_record(&self) -> Option<ErrorRecord> {
        if self.pipeline_state != PsInvocationState::Failed {
            return None;
        }

        self.exception_as_error_record
            .as_ref()
            .and_then(PsValue::as_object)
            .map(ErrorRecord::from)
    }
}

impl TryFrom<&ComplexObject> for PipelineState {
    type Error = PsrpError;

    fn try_from(obj: &ComplexObject) -> Result<Self, Self::Error> {
        let state = obj
            .property("PipelineState")
            .and_then(PsValue::as_i32)
            .ok_or_else(|| PsrpError::InvalidMessage("Missing PipelineState property".to_owned()))?;

        Ok(Self {
            pipeline_state: PsInvocationState::try_from(state)?,
            exception_as_error_record: obj
                .property("ExceptionAsErrorRecord")
                .filter(|v| !v.is_nil())
                .cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> PipelineState {
        let value = PsValue::from_clixml(xml).unwrap();
        PipelineState::try_from(value.as_object().unwrap()).unwrap()
    }

    #[test]
    fn completed_has_no_error_record() {
        let state = parse(r#"<Obj RefId="0"><MS><I32 N="PipelineState">4</I32></MS></Obj>"#);

        assert_eq!(state.pipeline_state, PsInvocationState::Completed);
        assert!(state.pipeline_state.is_terminal());
        assert!(state.exception_as_error_record().is_none());
    }

    #[test]
    fn failed_exposes_error_record() {
        let state = parse(
            r#"<Obj RefId="0"><MS><I32 N="PipelineState">5</I32>
            <Obj N="ExceptionAsErrorRecord" RefId="1"><MS>
              <Obj N="Exception" RefId="2"><Props><S N="Message">boom</S></Props></Obj>
              <S N="FullyQualifiedErrorId">Boom</S>
            </MS></Obj></MS></Obj>"#,
        );

        let record = state.exception_as_error_record().unwrap();
        assert_eq!(record.message(), "boom");
        assert_eq!(record.fully_qualified_error_id.as_deref(), Some("Boom"));
    }

    #[test]
    fn running_is_not_terminal() {
        assert!(!PsInvocationState::Running.is_terminal());
        assert!(PsInvocationState::try_from(9).is_err());
    }
}
