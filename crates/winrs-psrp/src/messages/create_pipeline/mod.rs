mod command;

pub use command::{Command, CommandParameter, PipelineResultTypes};

use crate::MessageType;
use crate::messages::init_runspace_pool::{ApartmentState, HostInfo};
use crate::ps_value::{
    ComplexObject, ComplexObjectContent, Container, PsObjectWithType, PsType, PsValue,
};

/// `System.Management.Automation.RemoteStreamOptions`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoteStreamOptions {
    #[default]
    None = 0,
    AddInvocationInfoToErrorRecord = 1,
    AddInvocationInfoToWarningRecord = 2,
    AddInvocationInfoToDebugRecord = 4,
    AddInvocationInfoToVerboseRecord = 8,
    AddInvocationInfo = 15,
}

impl From<RemoteStreamOptions> for PsValue {
    fn from(options: RemoteStreamOptions) -> Self {
        let value = options as i32;
        ComplexObject::enumeration(
            "System.Management.Automation.RemoteStreamOptions",
            value.to_string(),
            value,
        )
        .into()
    }
}

/// The `PowerShell` property of CREATE_PIPELINE: the command chain to run.
#[derive(Debug, Clone, PartialEq, Eq, typed_builder::TypedBuilder)]
pub struct PowerShellPipeline {
    pub commands: Vec<Command>,
    #[builder(default = false)]
    pub is_nested: bool,
    #[builder(default = true)]
    pub redirect_shell_error_output_pipe: bool,
}

impl PowerShellPipeline {
    fn to_ps_value(&self) -> PsValue {
        let cmds = ComplexObject {
            type_def: Some(PsType::ps_object_list()),
            content: ComplexObjectContent::Container(Container::List(
                self.commands.iter().map(Command::to_ps_value).collect(),
            )),
            ..ComplexObject::default()
        };

        ComplexObject::standard()
            .with_extended("Cmds", cmds)
            .with_extended("IsNested", self.is_nested)
            .with_extended("History", PsValue::nil())
            .with_extended("RedirectShellErrorOutputPipe", self.redirect_shell_error_output_pipe)
            .into()
    }
}

/// CREATE_PIPELINE
#[derive(Debug, Clone, PartialEq, Eq, typed_builder::TypedBuilder)]
pub struct CreatePipeline {
    pub power_shell: PowerShellPipeline,
    #[builder(default = true)]
    pub no_input: bool,
    #[builder(default)]
    pub apartment_state: ApartmentState,
    #[builder(default)]
    pub remote_stream_options: RemoteStreamOptions,
    #[builder(default = false)]
    pub add_to_history: bool,
    #[builder(default)]
    pub host_info: HostInfo,
    #[builder(default = false)]
    pub is_nested: bool,
}

impl CreatePipeline {
    /// `Invoke-Expression -Command <script> | Out-String -Stream`, so every
    /// output object reaches the client as one line of text.
    pub fn for_script(script: impl Into<String>) -> Self {
        let invoke = Command::builder()
            .cmd("Invoke-Expression")
            .args(vec![
                CommandParameter::named("-Command", PsValue::nil()),
                CommandParameter::positional(script.into()),
            ])
            .build();
        let out_string = Command::builder()
            .cmd("Out-String")
            .args(vec![CommandParameter::named("-Stream", true)])
            .build();

        Self::builder()
            .power_shell(
                PowerShellPipeline::builder()
                    .commands(vec![invoke, out_string])
                    .build(),
            )
            .build()
    }
}

impl PsObjectWithType for CreatePipeline {
    fn message_type(&self) -> MessageType {
        MessageType::CreatePipeline
    }

    fn to_ps_object(&self) -> PsValue {
        ComplexObject::standard()
            .with_extended("NoInput", self.no_input)
            .with_extended("ApartmentState", self.apartment_state)
            .with_extended("RemoteStreamOptions", self.remote_stream_options)
            .with_extended("AddToHistory", self.add_to_history)
            .with_extended("HostInfo", self.host_info.to_ps_value())
            .with_extended("PowerShell", self.power_shell.to_ps_value())
            .with_extended("IsNested", self.is_nested)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_pipeline_pipes_through_out_string() {
        let pipeline = CreatePipeline::for_script("Get-Date");
        let xml = pipeline.to_ps_object().to_clixml().unwrap();

        assert!(xml.contains(r#"<S N="Cmd">Invoke-Expression</S>"#));
        assert!(xml.contains(r#"<S N="V">Get-Date</S>"#));
        assert!(xml.contains(r#"<S N="Cmd">Out-String</S>"#));
        assert!(xml.contains(r#"<S N="N">-Stream</S>"#));
        assert!(xml.contains(r#"<B N="NoInput">true</B>"#));
    }

    #[test]
    fn script_pipeline_parses_back() {
        let xml = CreatePipeline::for_script("dir").to_ps_object().to_clixml().unwrap();
        let value = PsValue::from_clixml(&xml).unwrap();
        let cmds = value
            .as_object()
            .and_then(|o| o.property_object("PowerShell"))
            .and_then(|p| p.property("Cmds"))
            .and_then(PsValue::as_list)
            .unwrap();

        assert_eq!(cmds.len(), 2);
        assert_eq!(
            cmds[0].as_object().and_then(|c| c.property_str("Cmd")),
            Some("Invoke-Expression")
        );
    }

    #[test]
    fn scripts_are_escaped_for_clixml() {
        let xml = CreatePipeline::for_script("echo a\r\nexit 1").to_ps_object().to_clixml().unwrap();
        assert!(xml.contains("echo a_x000D_\nexit 1"));
    }
}
