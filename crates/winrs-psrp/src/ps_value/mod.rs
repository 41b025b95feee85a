//! CLIXML object model used inside PSRP message payloads.
//!
//! <https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-psrp/c8c85974-ffd7-4455-84a8-e49016c20683>
mod complex;
mod container;
pub mod deserialize;
mod primitive;
mod serialize;
mod types;
mod value;

pub use complex::*;
pub use container::*;
pub use primitive::*;
pub use serialize::RefIdMap;
pub use types::*;
pub use value::*;

use crate::MessageType;

/// A client-side message that knows its PSRP type and how to render itself as a value.
pub trait PsObjectWithType {
    fn message_type(&self) -> MessageType;
    fn to_ps_object(&self) -> PsValue;
}
