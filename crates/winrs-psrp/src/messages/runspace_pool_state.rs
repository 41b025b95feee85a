use crate::PsrpError;
use crate::ps_value::{ComplexObject, PsValue};

/// `System.Management.Automation.Runspaces.RunspacePoolState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunspacePoolStateValue {
    BeforeOpen = 0,
    Opening = 1,
    Opened = 2,
    Closed = 3,
    Closing = 4,
    Broken = 5,
    NegotiationSent = 6,
    NegotiationSucceeded = 7,
    Connecting = 8,
    Disconnected = 9,
}

impl TryFrom<i32> for RunspacePoolStateValue {
    type Error = PsrpError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::BeforeOpen,
            1 => Self::Opening,
            2 => Self::Opened,
            3 => Self::Closed,
            4 => Self::Closing,
            5 => Self::Broken,
            6 => Self::NegotiationSent,
            7 => Self::NegotiationSucceeded,
            8 => Self::Connecting,
            9 => Self::Disconnected,
            _ => {
                return Err(PsrpError::InvalidMessage(format!(
                    "Unknown RunspacePoolState value: {value}"
                )));
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunspacePoolState {
    pub runspace_state: RunspacePoolStateValue,
    pub exception_as_error_record: Option<PsValue>,
}

impl TryFrom<&ComplexObject> for RunspacePoolState {
    type Error = PsrpError;

    fn try_from(obj: &ComplexObject) -> Result<Self, Self::Error> {
        let state = obj
            .property("RunspaceState")
            .and_then(PsValue::as_i32)
            .ok_or_else(|| PsrpError::InvalidMessage("Missing RunspaceState property".to_owned()))?;

        Ok(Self {
            runspace_state: RunspacePoolStateValue::try_from(state)?,
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

    #[test]
    fn parses_opened() {
        let value =
            PsValue::from_clixml(r#"<Obj RefId="1"><MS><I32 N="RunspaceState">2</I32></MS></Obj>"#)
                .unwrap();
        let state = RunspacePoolState::try_from(value.as_object().unwrap()).unwrap();

        assert_eq!(state.runspace_state, RunspacePoolStateValue::Opened);
        assert!(state.exception_as_error_record.is_none());
    }
}
