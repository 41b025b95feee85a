mod host_info;

pub use host_info::{Coordinates, HostDefaultData, HostInfo, Size};

use crate::MessageType;
use crate::ps_value::{ComplexObject, PsObjectWithType, PsValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PsThreadOptions {
    #[default]
    Default = 0,
    UseNewThread = 1,
    ReuseThread = 2,
    UseCurrentThread = 3,
}

impl PsThreadOptions {
    const fn name(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::UseNewThread => "UseNewThread",
            Self::ReuseThread => "ReuseThread",
            Self::UseCurrentThread => "UseCurrentThread",
        }
    }
}

impl From<PsThreadOptions> for PsValue {
    fn from(options: PsThreadOptions) -> Self {
        ComplexObject::enumeration(
            "System.Management.Automation.Runspaces.PSThreadOptions",
            options.name(),
            options as i32,
        )
        .into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApartmentState {
    Sta = 0,
    Mta = 1,
    #[default]
    Unknown = 2,
}

impl ApartmentState {
    const fn name(self) -> &'static str {
        match self {
            Self::Sta => "STA",
            Self::Mta => "MTA",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<ApartmentState> for PsValue {
    fn from(state: ApartmentState) -> Self {
        ComplexObject::enumeration("System.Threading.ApartmentState", state.name(), state as i32)
            .into()
    }
}

/// INIT_RUNSPACEPOOL, the second half of the runspace pool `creationXml`.
#[derive(Debug, Clone, PartialEq, Eq, typed_builder::TypedBuilder)]
pub struct InitRunspacePool {
    #[builder(default = 1)]
    pub min_runspaces: i32,
    #[builder(default = 1)]
    pub max_runspaces: i32,
    #[builder(default)]
    pub thread_options: PsThreadOptions,
    #[builder(default)]
    pub apartment_state: ApartmentState,
    #[builder(default)]
    pub host_info: HostInfo,
}

impl Default for InitRunspacePool {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PsObjectWithType for InitRunspacePool {
    fn message_type(&self) -> MessageType {
        MessageType::InitRunspacepool
    }

    fn to_ps_object(&self) -> PsValue {
        ComplexObject::standard()
            .with_extended("MinRunspaces", self.min_runspaces)
            .with_extended("MaxRunspaces", self.max_runspaces)
            .with_extended("PSThreadOptions", self.thread_options)
            .with_extended("ApartmentState", self.apartment_state)
            .with_extended("HostInfo", self.host_info.to_ps_value())
            .with_extended("ApplicationArguments", PsValue::nil())
            .into()
    }
}
