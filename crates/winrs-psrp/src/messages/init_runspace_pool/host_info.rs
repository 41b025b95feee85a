use std::collections::BTreeMap;

use crate::ps_value::{ComplexObject, ComplexObjectContent, Container, PsType, PsValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Coordinates {
    fn to_ps_value(self) -> PsValue {
        ComplexObject::standard()
            .with_extended("x", self.x)
            .with_extended("y", self.y)
            .into()
    }
}

impl Size {
    fn to_ps_value(self) -> PsValue {
        ComplexObject::standard()
            .with_extended("width", self.width)
            .with_extended("height", self.height)
            .into()
    }
}

/// Console characteristics advertised to the remote host.
#[derive(Debug, Clone, PartialEq, Eq, typed_builder::TypedBuilder)]
pub struct HostDefaultData {
    #[builder(default = 7)]
    pub foreground_color: i32,
    #[builder(default = 0)]
    pub background_color: i32,
    #[builder(default)]
    pub cursor_position: Coordinates,
    #[builder(default)]
    pub window_position: Coordinates,
    #[builder(default = 25)]
    pub cursor_size: i32,
    #[builder(default = Size { width: 120, height: 3000 })]
    pub buffer_size: Size,
    #[builder(default = Size { width: 120, height: 50 })]
    pub window_size: Size,
    #[builder(default = Size { width: 120, height: 50 })]
    pub max_window_size: Size,
    #[builder(default = Size { width: 120, height: 50 })]
    pub max_physical_window_size: Size,
    #[builder(default = "winrs".to_owned(), setter(into))]
    pub window_title: String,
}

impl Default for HostDefaultData {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Each entry is `{ T = <type name>, V = <value> }`.
fn typed_entry(type_name: &str, value: PsValue) -> PsValue {
    ComplexObject::standard()
        .with_extended("T", type_name)
        .with_extended("V", value)
        .into()
}

impl HostDefaultData {
    pub fn to_dictionary(&self) -> BTreeMap<PsValue, PsValue> {
        const COORDINATES: &str = "System.Management.Automation.Host.Coordinates";
        const SIZE: &str = "System.Management.Automation.Host.Size";
        const COLOR: &str = "System.ConsoleColor";

        let entries = [
            typed_entry(COLOR, self.foreground_color.into()),
            typed_entry(COLOR, self.background_color.into()),
            typed_entry(COORDINATES, self.cursor_position.to_ps_value()),
            typed_entry(COORDINATES, self.window_position.to_ps_value()),
            typed_entry("System.Int32", self.cursor_size.into()),
            typed_entry(SIZE, self.buffer_size.to_ps_value()),
            typed_entry(SIZE, self.window_size.to_ps_value()),
            typed_entry(SIZE, self.max_window_size.to_ps_value()),
            typed_entry(SIZE, self.max_physical_window_size.to_ps_value()),
            typed_entry("System.String", self.window_title.as_str().into()),
        ];

        (0i32..)
            .zip(entries)
            .map(|(key, value)| (PsValue::from(key), value))
            .collect()
    }
}

#[expect(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, typed_builder::TypedBuilder)]
pub struct HostInfo {
    #[builder(default = false)]
    pub is_host_null: bool,
    #[builder(default = false)]
    pub is_host_ui_null: bool,
    #[builder(default = false)]
    pub is_host_raw_ui_null: bool,
    #[builder(default = false)]
    pub use_runspace_host: bool,
    #[builder(default)]
    pub host_default_data: HostDefaultData,
}

impl Default for HostInfo {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl HostInfo {
    pub fn to_ps_value(&self) -> PsValue {
        let data = ComplexObject {
            type_def: Some(PsType::hashtable()),
            content: ComplexObjectContent::Container(Container::Dictionary(
                self.host_default_data.to_dictionary(),
            )),
            ..ComplexObject::default()
        };

        ComplexObject::standard()
            .with_extended("_hostDefaultData", ComplexObject::standard().with_extended("data", data))
            .with_extended("_isHostNull", self.is_host_null)
            .with_extended("_isHostUINull", self.is_host_ui_null)
            .with_extended("_isHostRawUINull", self.is_host_raw_ui_null)
            .with_extended("_useRunspaceHost", self.use_runspace_host)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_default_data_is_keyed_by_index() {
        let dict = HostDefaultData::default().to_dictionary();

        assert_eq!(dict.len(), 10);
        let title = dict[&PsValue::from(9)].as_object().unwrap();
        assert_eq!(title.property_str("T"), Some("System.String"));
        assert_eq!(title.property_str("V"), Some("winrs"));
    }

    #[test]
    fn host_info_carries_flags_and_data() {
        let value = HostInfo::default().to_ps_value();
        let obj = value.as_object().unwrap();

        assert_eq!(
            obj.property("_isHostNull"),
            Some(&PsValue::from(false))
        );
        let data = obj
            .property_object("_hostDefaultData")
            .and_then(|d| d.property_object("data"))
            .unwrap();
        assert!(matches!(
            data.content,
            ComplexObjectContent::Container(Container::Dictionary(_))
        ));
    }
}
