use std::fmt::Display;

use super::{ComplexObject, ComplexObjectContent, Container, PsPrimitiveValue, PsType};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PsValue {
    Primitive(PsPrimitiveValue),
    Object(ComplexObject),
}

impl<IntoPrimitive> From<IntoPrimitive> for PsValue
where
    IntoPrimitive: Into<PsPrimitiveValue>,
{
    fn from(p: IntoPrimitive) -> Self {
        Self::Primitive(p.into())
    }
}

impl From<ComplexObject> for PsValue {
    fn from(obj: ComplexObject) -> Self {
        Self::Object(obj)
    }
}

impl Display for PsValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primitive(p) => p.fmt(f),
            Self::Object(o) => o.fmt(f),
        }
    }
}

impl PsValue {
    pub fn nil() -> Self {
        Self::Primitive(PsPrimitiveValue::Nil)
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Primitive(PsPrimitiveValue::Nil))
    }

    pub fn as_object(&self) -> Option<&ComplexObject> {
        match self {
            Self::Object(obj) => Some(obj),
            Self::Primitive(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Primitive(PsPrimitiveValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Integer view that also looks through enum and extended-primitive wrappers.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Primitive(PsPrimitiveValue::I32(val)) => Some(*val),
            Self::Object(obj) => match &obj.content {
                ComplexObjectContent::PsEnums(e) => Some(e.value),
                ComplexObjectContent::ExtendedPrimitive(PsPrimitiveValue::I32(val)) => Some(*val),
                _ => None,
            },
            Self::Primitive(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Primitive(PsPrimitiveValue::I64(val)) => Some(*val),
            _ => self.as_i32().map(i64::from),
        }
    }

    /// Items of a list, stack or queue object.
    pub fn as_list(&self) -> Option<&[PsValue]> {
        match &self.as_object()?.content {
            ComplexObjectContent::Container(
                Container::List(items) | Container::Stack(items) | Container::Queue(items),
            ) => Some(items),
            _ => None,
        }
    }

    pub fn from_array(values: Vec<Self>) -> Self {
        Self::Object(ComplexObject {
            type_def: Some(PsType::array_list()),
            content: ComplexObjectContent::Container(Container::List(values)),
            ..ComplexObject::default()
        })
    }
}
