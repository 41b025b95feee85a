use std::borrow::Cow;

/// The `<TN>` type-name chain of an object, most specific first.
///
/// <https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-psrp/2784bd9c-267d-4297-b603-722c727f85f1>
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct PsType {
    pub type_names: Vec<Cow<'static, str>>,
}

impl PsType {
    pub fn new(type_names: &[&'static str]) -> Self {
        Self {
            type_names: type_names.iter().map(|t| Cow::Borrowed(*t)).collect(),
        }
    }

    /// Type chain of a .NET enum.
    pub fn enumeration(name: &'static str) -> Self {
        Self::new(&[name, "System.Enum", "System.ValueType", "System.Object"])
    }

    pub fn array_list() -> Self {
        Self::new(&["System.Collections.ArrayList", "System.Object"])
    }

    pub fn hashtable() -> Self {
        Self::new(&["System.Collections.Hashtable", "System.Object"])
    }

    pub fn ps_object_list() -> Self {
        Self::new(&[
            "System.Collections.Generic.List`1[[System.Management.Automation.PSObject, System.Management.Automation, Version=3.0.0.0, Culture=neutral, PublicKeyToken=31bf3856ad364e35]]",
            "System.Object",
        ])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.type_names.iter().any(|t| t == name)
    }
}
