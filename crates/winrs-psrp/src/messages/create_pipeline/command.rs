use crate::ps_value::{ComplexObject, PsValue};

/// `System.Management.Automation.Runspaces.PipelineResultTypes`, used for the
/// per-command stream merge settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineResultTypes {
    #[default]
    None = 0,
    Output = 1,
    Error = 2,
    Warning = 3,
    Verbose = 4,
    Debug = 5,
    Information = 6,
    All = 7,
    Null = 8,
}

impl PipelineResultTypes {
    const fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Output => "Output",
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Verbose => "Verbose",
            Self::Debug => "Debug",
            Self::Information => "Information",
            Self::All => "All",
            Self::Null => "Null",
        }
    }
}

impl From<PipelineResultTypes> for PsValue {
    fn from(value: PipelineResultTypes) -> Self {
        ComplexObject::enumeration(
            "System.Management.Automation.Runspaces.PipelineResultTypes",
            value.name(),
            value as i32,
        )
        .into()
    }
}

/// One `-Name Value` pair. Either half may be absent: a positional argument
/// has no name, a switch has no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandParameter {
    pub name: Option<String>,
    pub value: PsValue,
}

impl CommandParameter {
    pub fn named(name: impl Into<String>, value: impl Into<PsValue>) -> Self {
        Self {
            name: Some(name.into()),
            value: value.into(),
        }
    }

    pub fn positional(value: impl Into<PsValue>) -> Self {
        Self {
            name: None,
            value: value.into(),
        }
    }

    fn to_ps_value(&self) -> PsValue {
        let name = self
            .name
            .as_deref()
            .map_or_else(PsValue::nil, PsValue::from);
        ComplexObject::standard()
            .with_extended("N", name)
            .with_extended("V", self.value.clone())
            .into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, typed_builder::TypedBuilder)]
pub struct Command {
    #[builder(setter(into))]
    pub cmd: String,
    #[builder(default = false)]
    pub is_script: bool,
    #[builder(default)]
    pub use_local_scope: Option<bool>,
    #[builder(default)]
    pub args: Vec<CommandParameter>,
    #[builder(default)]
    pub merge: PipelineResultTypes,
}

impl Command {
    pub fn to_ps_value(&self) -> PsValue {
        let args = PsValue::from_array(self.args.iter().map(CommandParameter::to_ps_value).collect());

        let merge = self.merge;
        ComplexObject::standard()
            .with_extended("Cmd", self.cmd.as_str())
            .with_extended("IsScript", self.is_script)
            .with_extended("UseLocalScope", self.use_local_scope.map_or_else(PsValue::nil, PsValue::from))
            .with_extended("MergeMyResult", merge)
            .with_extended("MergeToResult", merge)
            .with_extended("MergePreviousResults", merge)
            .with_extended("MergeError", merge)
            .with_extended("MergeWarning", merge)
            .with_extended("MergeVerbose", merge)
            .with_extended("MergeDebug", merge)
            .with_extended("MergeInformation", merge)
            .with_extended("Args", args)
            .into()
    }
}
