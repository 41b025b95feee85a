use std::{collections::BTreeMap, fmt::Display};

use super::{Container, PsEnums, PsPrimitiveValue, PsType, PsValue};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ComplexObjectContent {
    #[default]
    Standard,
    ExtendedPrimitive(PsPrimitiveValue),
    Container(Container),
    PsEnums(PsEnums),
}

/// An `<Obj>` element: optional type chain, `<ToString>`, content and property bags.
///
/// Adapted properties live under `<Props>`, extended ones under `<MS>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ComplexObject {
    pub type_def: Option<PsType>,
    pub to_string: Option<String>,
    pub content: ComplexObjectContent,
    pub adapted_properties: BTreeMap<String, PsValue>,
    pub extended_properties: BTreeMap<String, PsValue>,
}

impl ComplexObject {
    /// Plain property bag object, the shape of most PSRP messages.
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn enumeration(type_name: &'static str, name: impl Into<String>, value: i32) -> Self {
        Self {
            type_def: Some(PsType::enumeration(type_name)),
            to_string: Some(name.into()),
            content: ComplexObjectContent::PsEnums(PsEnums { value }),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, type_def: PsType) -> Self {
        self.type_def = Some(type_def);
        self
    }

    pub fn with_extended(mut self, name: impl Into<String>, value: impl Into<PsValue>) -> Self {
        self.extended_properties.insert(name.into(), value.into());
        self
    }

    pub fn with_adapted(mut self, name: impl Into<String>, value: impl Into<PsValue>) -> Self {
        self.adapted_properties.insert(name.into(), value.into());
        self
    }

    /// Looks a property up in `<MS>` first, then in `<Props>`.
    pub fn property(&self, name: &str) -> Option<&PsValue> {
        self.extended_properties
            .get(name)
            .or_else(|| self.adapted_properties.get(name))
    }

    pub fn property_str(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(PsValue::as_str)
    }

    pub fn property_object(&self, name: &str) -> Option<&Self> {
        self.property(name).and_then(PsValue::as_object)
    }
}

impl Display for ComplexObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(to_string) = &self.to_string {
            return write!(f, "{to_string}");
        }

        match &self.content {
            ComplexObjectContent::ExtendedPrimitive(p) => write!(f, "{p}"),
            ComplexObjectContent::Container(c) => write!(f, "{c}"),
            ComplexObjectContent::PsEnums(e) => write!(f, "{}", e.value),
            ComplexObjectContent::Standard => match &self.type_def {
                Some(ty) => write!(f, "{}", ty.type_names.first().map_or("", |t| t.as_ref())),
                None => Ok(()),
            },
        }
    }
}
