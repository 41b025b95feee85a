use std::{collections::BTreeMap, fmt::Display};

use super::PsValue;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Container {
    /// <https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-psrp/e9cf648e-38fe-42ba-9ca3-d89a9e0a856a>
    Stack(Vec<PsValue>),
    /// <https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-psrp/ade9f023-ac30-4b7e-be17-900c02a6f837>
    Queue(Vec<PsValue>),
    /// <https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-psrp/f4bdb166-cefc-4d49-848c-7d08680ae0a7>
    List(Vec<PsValue>),
    /// <https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-psrp/c4e000a2-21d8-46c0-a71b-0051365d8273>
    Dictionary(BTreeMap<PsValue, PsValue>),
}

impl Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stack(_) => write!(f, "System.Collections.Stack"),
            Self::Queue(_) => write!(f, "System.Collections.Queue"),
            Self::List(items) => {
                let s: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", s.join(" "))
            }
            Self::Dictionary(_) => write!(f, "System.Collections.Hashtable"),
        }
    }
}

/// Value of a .NET enum. The owning object's `<ToString>` carries the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PsEnums {
    pub value: i32,
}
