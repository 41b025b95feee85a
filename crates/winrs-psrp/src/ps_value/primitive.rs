use std::fmt::Display;

/// <https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-psrp/c8c85974-ffd7-4455-84a8-e49016c20683>
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PsPrimitiveValue {
    Str(String),
    Bool(bool),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    Guid(String),
    Char(char),
    Nil,
    Bytes(Vec<u8>),
    Version(String),
    DateTime(String),
}

impl PsPrimitiveValue {
    pub const TAGS: [&'static str; 12] = [
        "S", "B", "I32", "U32", "I64", "U64", "G", "C", "Nil", "BA", "Version", "DT",
    ];

    pub fn is_primitive_tag(tag: &str) -> bool {
        Self::TAGS.contains(&tag)
    }
}

impl Display for PsPrimitiveValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) | Self::Guid(s) | Self::Version(s) | Self::DateTime(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::I32(i) => write!(f, "{i}"),
            Self::U32(u) => write!(f, "{u}"),
            Self::I64(i) => write!(f, "{i}"),
            Self::U64(u) => write!(f, "{u}"),
            Self::Char(c) => write!(f, "{c}"),
            // $null stringifies to an empty string
            Self::Nil => Ok(()),
            Self::Bytes(_) => write!(f, "System.Byte[]"),
        }
    }
}

impl From<()> for PsPrimitiveValue {
    fn from((): ()) -> Self {
        Self::Nil
    }
}

impl From<&str> for PsPrimitiveValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for PsPrimitiveValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for PsPrimitiveValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for PsPrimitiveValue {
    fn from(i: i32) -> Self {
        Self::I32(i)
    }
}

impl From<i64> for PsPrimitiveValue {
    fn from(i: i64) -> Self {
        Self::I64(i)
    }
}

impl From<uuid::Uuid> for PsPrimitiveValue {
    fn from(guid: uuid::Uuid) -> Self {
        Self::Guid(guid.to_string())
    }
}
