use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use tracing::trace;
use winrs_xml::builder::{Attribute, Builder, Element};

use super::{ComplexObject, ComplexObjectContent, Container, PsPrimitiveValue, PsType, PsValue};
use crate::PsrpError;

type Result<T> = std::result::Result<T, PsrpError>;

/// Hands out sequential RefIds and remembers which items already have one.
#[derive(Debug)]
pub struct RefIdMap<'a, T> {
    map: HashMap<&'a T, u32>,
    next_id: u32,
}

impl<T> Default for RefIdMap<'_, T> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<'a, T: std::hash::Hash + Eq> RefIdMap<'a, T> {
    pub fn get(&self, item: &T) -> Option<u32> {
        self.map.get(item).copied()
    }

    pub fn insert_new(&mut self, item: &'a T) -> u32 {
        let id = self.next_id;
        self.map.insert(item, id);
        self.next_id += 1;
        id
    }

    /// Allocates an id without remembering the item, for objects that are never referenced.
    pub fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Running RefId state for one CLIXML document.
#[derive(Debug, Default)]
pub struct SerializationContext<'a> {
    pub objects: RefIdMap<'a, ComplexObject>,
    pub types: RefIdMap<'a, PsType>,
}

impl PsPrimitiveValue {
    pub fn to_element(&self) -> Element<'_> {
        match self {
            Self::Str(s) => Element::new("S").set_text(crate::text::encode_ps_string(s)),
            Self::Bool(b) => Element::new("B").set_text(b.to_string()),
            Self::I32(i) => Element::new("I32").set_text(i.to_string()),
            Self::U32(u) => Element::new("U32").set_text(u.to_string()),
            Self::I64(i) => Element::new("I64").set_text(i.to_string()),
            Self::U64(u) => Element::new("U64").set_text(u.to_string()),
            Self::Guid(g) => Element::new("G").set_text(g.as_str()),
            Self::Char(c) => Element::new("C").set_text((*c as u32).to_string()),
            Self::Nil => Element::new("Nil"),
            Self::Bytes(b) => Element::new("BA").set_text(B64.encode(b)),
            Self::Version(v) => Element::new("Version").set_text(v.as_str()),
            Self::DateTime(dt) => Element::new("DT").set_text(dt.as_str()),
        }
    }
}

impl PsType {
    pub fn to_element<'a>(&'a self, context: &mut SerializationContext<'a>) -> Element<'a> {
        if let Some(ref_id) = context.types.get(self) {
            return Element::new("TNRef").add_attribute(Attribute::new("RefId", ref_id.to_string()));
        }

        let ref_id = context.types.insert_new(self);
        trace!(ref_id, names = ?self.type_names, "writing type names");
        Element::new("TN")
            .add_attribute(Attribute::new("RefId", ref_id.to_string()))
            .add_children(
                self.type_names
                    .iter()
                    .map(|name| Element::new("T").set_text(name.as_ref())),
            )
    }
}

impl PsValue {
    pub fn to_element<'a>(&'a self, context: &mut SerializationContext<'a>) -> Result<Element<'a>> {
        match self {
            Self::Primitive(primitive) => Ok(primitive.to_element()),
            Self::Object(obj) => obj.to_element(context),
        }
    }

    /// Renders the value as a standalone CLIXML document body.
    pub fn to_clixml(&self) -> Result<String> {
        let mut context = SerializationContext::default();
        let element = self.to_element(&mut context)?;
        Ok(Builder::new(element).to_xml_string()?)
    }
}

impl Container {
    pub fn to_element<'a>(&'a self, context: &mut SerializationContext<'a>) -> Result<Element<'a>> {
        match self {
            Self::Stack(values) => list_element("STK", values, context),
            Self::Queue(values) => list_element("QUE", values, context),
            Self::List(values) => list_element("LST", values, context),
            Self::Dictionary(map) => {
                let mut element = Element::new("DCT");
                for (key, value) in map {
                    element = element.add_child(
                        Element::new("En")
                            .add_child(key.to_element(context)?.add_attribute(Attribute::new("N", "Key")))
                            .add_child(
                                value
                                    .to_element(context)?
                                    .add_attribute(Attribute::new("N", "Value")),
                            ),
                    );
                }
                Ok(element)
            }
        }
    }
}

fn list_element<'a>(
    tag: &'static str,
    values: &'a [PsValue],
    context: &mut SerializationContext<'a>,
) -> Result<Element<'a>> {
    let children = values
        .iter()
        .map(|value| value.to_element(context))
        .collect::<Result<Vec<_>>>()?;
    Ok(Element::new(tag).add_children(children))
}

impl ComplexObject {
    pub fn to_element<'a>(&'a self, context: &mut SerializationContext<'a>) -> Result<Element<'a>> {
        if let Some(ref_id) = context.objects.get(self) {
            return Ok(Element::new("Ref").add_attribute(Attribute::new("RefId", ref_id.to_string())));
        }

        let ref_id = context.objects.insert_new(self);
        let mut element = Element::new("Obj").add_attribute(Attribute::new("RefId", ref_id.to_string()));

        if let Some(type_def) = &self.type_def {
            element = element.add_child(type_def.to_element(context));
        }

        if let Some(to_string) = &self.to_string {
            element = element.add_child(Element::new("ToString").set_text(to_string.as_str()));
        }

        match &self.content {
            ComplexObjectContent::Standard => {}
            ComplexObjectContent::ExtendedPrimitive(primitive) => {
                element = element.add_child(primitive.to_element());
            }
            ComplexObjectContent::Container(container) => {
                element = element.add_child(container.to_element(context)?);
            }
            ComplexObjectContent::PsEnums(e) => {
                element = element.add_child(Element::new("I32").set_text(e.value.to_string()));
            }
        }

        for (tag, bag) in [("Props", &self.adapted_properties), ("MS", &self.extended_properties)] {
            if bag.is_empty() {
                continue;
            }
            let mut properties = Element::new(tag);
            for (name, value) in bag {
                properties = properties.add_child(
                    value
                        .to_element(context)?
                        .add_attribute(Attribute::new("N", name.as_str())),
                );
            }
            element = element.add_child(properties);
        }

        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_types_become_tnref() {
        let value = PsValue::Object(
            ComplexObject::standard()
                .with_extended("A", ComplexObject::enumeration("System.ConsoleColor", "Blue", 9))
                .with_extended("B", ComplexObject::enumeration("System.ConsoleColor", "Red", 12)),
        );

        let xml = value.to_clixml().unwrap();
        assert_eq!(xml.matches("<TN ").count(), 1);
        assert!(xml.contains(r#"<TNRef RefId="0"/>"#));
        assert!(xml.contains(r#"<ToString>Blue</ToString><I32>9</I32>"#));
    }

    #[test]
    fn serialized_object_reads_back() {
        let original = PsValue::Object(
            ComplexObject::standard()
                .with_extended("Cmd", "Get-Item")
                .with_extended("IsScript", false)
                .with_extended("Args", PsValue::from_array(vec!["a & b".into(), PsValue::nil()])),
        );

        let xml = original.to_clixml().unwrap();
        let parsed = PsValue::from_clixml(&xml).unwrap();
        let obj = parsed.as_object().unwrap();

        assert_eq!(obj.property_str("Cmd"), Some("Get-Item"));
        assert_eq!(obj.property("IsScript"), Some(&PsValue::from(false)));
        let args = obj.property("Args").unwrap().as_list().unwrap();
        assert_eq!(args[0].as_str(), Some("a & b"));
        assert!(args[1].is_nil());
    }
}
