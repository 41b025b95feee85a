//! CLIXML reader. Walks a `roxmltree` node tree, resolving `<TNRef>` and `<Ref>`
//! back-references through a [`DeserializationContext`].

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use tracing::trace;
use winrs_xml::XmlError;
use winrs_xml::parser::Node;

use super::{
    ComplexObject, ComplexObjectContent, Container, PsEnums, PsPrimitiveValue, PsType, PsValue,
};

type Result<T> = std::result::Result<T, XmlError>;

/// Maps RefIds seen so far in one document.
#[derive(Debug, Default)]
pub struct DeserializationContext {
    pub type_refs: HashMap<String, PsType>,
    pub object_refs: HashMap<String, ComplexObject>,
}

impl DeserializationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_type(&mut self, ref_id: &str, ps_type: PsType) {
        trace!(ref_id, names = ps_type.type_names.len(), "registering type reference");
        self.type_refs.insert(ref_id.to_owned(), ps_type);
    }

    pub fn register_object(&mut self, ref_id: &str, object: ComplexObject) {
        trace!(ref_id, "registering object reference");
        self.object_refs.insert(ref_id.to_owned(), object);
    }
}

pub trait PsXmlDeserialize<'a>: Sized {
    fn from_node_with_context(node: Node<'a, 'a>, context: &mut DeserializationContext)
    -> Result<Self>;

    fn from_node(node: Node<'a, 'a>) -> Result<Self> {
        Self::from_node_with_context(node, &mut DeserializationContext::new())
    }
}

fn parse_number<T: std::str::FromStr>(node: Node<'_, '_>, kind: &str) -> Result<T> {
    let text = node.text().unwrap_or("0").trim();
    text.parse::<T>()
        .map_err(|_| XmlError::GenericError(format!("Invalid {kind} value: {text}")))
}

fn element_children<'a>(node: Node<'a, 'a>) -> impl Iterator<Item = Node<'a, 'a>> {
    node.children().filter(Node::is_element)
}

impl<'a> PsXmlDeserialize<'a> for PsPrimitiveValue {
    fn from_node_with_context(node: Node<'a, 'a>, _: &mut DeserializationContext) -> Result<Self> {
        let text = || node.text().unwrap_or_default().to_owned();

        Ok(match node.tag_name().name() {
            "S" => Self::Str(text()),
            "B" => {
                let raw = node.text().unwrap_or("false").trim();
                Self::Bool(raw.eq_ignore_ascii_case("true"))
            }
            "I32" => Self::I32(parse_number(node, "i32")?),
            "U32" => Self::U32(parse_number(node, "u32")?),
            "I64" => Self::I64(parse_number(node, "i64")?),
            "U64" => Self::U64(parse_number(node, "u64")?),
            "G" => Self::Guid(text()),
            "C" => {
                let code: u32 = parse_number(node, "char")?;
                Self::Char(char::from_u32(code).ok_or_else(|| {
                    XmlError::GenericError(format!("Invalid Unicode character code: {code}"))
                })?)
            }
            "Nil" => Self::Nil,
            "BA" => Self::Bytes(
                B64.decode(node.text().unwrap_or_default().trim())
                    .map_err(|e| XmlError::GenericError(format!("Invalid base64 data: {e}")))?,
            ),
            "Version" => Self::Version(text()),
            "DT" => Self::DateTime(text()),
            other => {
                return Err(XmlError::XmlInvalidTag {
                    expected: "primitive".to_owned(),
                    found: other.to_owned(),
                });
            }
        })
    }
}

impl<'a> PsXmlDeserialize<'a> for PsType {
    fn from_node_with_context(
        node: Node<'a, 'a>,
        context: &mut DeserializationContext,
    ) -> Result<Self> {
        match node.tag_name().name() {
            "TN" => {
                let ps_type = Self {
                    type_names: element_children(node)
                        .filter(|c| c.tag_name().name() == "T")
                        .filter_map(|c| c.text())
                        .map(|t| Cow::Owned(t.to_owned()))
                        .collect(),
                };
                if let Some(ref_id) = node.attribute("RefId") {
                    context.register_type(ref_id, ps_type.clone());
                }
                Ok(ps_type)
            }
            "TNRef" => {
                let ref_id = node.attribute("RefId").ok_or_else(|| XmlError::MissingAttribute {
                    element: "TNRef".to_owned(),
                    attribute: "RefId".to_owned(),
                })?;
                context.type_refs.get(ref_id).cloned().ok_or_else(|| {
                    XmlError::GenericError(format!("Type reference {ref_id} not found"))
                })
            }
            other => Err(XmlError::XmlInvalidTag {
                expected: "TN".to_owned(),
                found: other.to_owned(),
            }),
        }
    }
}

impl<'a> PsXmlDeserialize<'a> for Container {
    fn from_node_with_context(
        node: Node<'a, 'a>,
        context: &mut DeserializationContext,
    ) -> Result<Self> {
        match node.tag_name().name() {
            "STK" => Ok(Self::Stack(read_items(node, context)?)),
            "QUE" => Ok(Self::Queue(read_items(node, context)?)),
            "LST" | "IE" => Ok(Self::List(read_items(node, context)?)),
            "DCT" => {
                let mut map = BTreeMap::new();
                for entry in element_children(node).filter(|n| n.tag_name().name() == "En") {
                    let mut key = None;
                    let mut value = None;
                    for part in element_children(entry) {
                        match part.attribute("N") {
                            Some("Key") => {
                                key = Some(PsValue::from_node_with_context(part, context)?);
                            }
                            Some("Value") => {
                                value = Some(PsValue::from_node_with_context(part, context)?);
                            }
                            _ => {}
                        }
                    }
                    if let (Some(k), Some(v)) = (key, value) {
                        map.insert(k, v);
                    }
                }
                Ok(Self::Dictionary(map))
            }
            other => Err(XmlError::XmlInvalidTag {
                expected: "container".to_owned(),
                found: other.to_owned(),
            }),
        }
    }
}

fn read_items<'a>(
    node: Node<'a, 'a>,
    context: &mut DeserializationContext,
) -> Result<Vec<PsValue>> {
    element_children(node)
        .map(|child| PsValue::from_node_with_context(child, context))
        .collect()
}

fn read_property_bag<'a>(
    node: Node<'a, 'a>,
    context: &mut DeserializationContext,
) -> Result<BTreeMap<String, PsValue>> {
    let mut bag = BTreeMap::new();
    for child in element_children(node) {
        let name = child.attribute("N").unwrap_or_default().to_owned();
        bag.insert(name, PsValue::from_node_with_context(child, context)?);
    }
    Ok(bag)
}

impl<'a> PsXmlDeserialize<'a> for ComplexObject {
    fn from_node_with_context(
        node: Node<'a, 'a>,
        context: &mut DeserializationContext,
    ) -> Result<Self> {
        let mut obj = Self::default();

        for child in element_children(node) {
            match child.tag_name().name() {
                "TN" | "TNRef" => obj.type_def = Some(PsType::from_node_with_context(child, context)?),
                "ToString" => obj.to_string = Some(child.text().unwrap_or_default().to_owned()),
                "Props" => obj.adapted_properties = read_property_bag(child, context)?,
                "MS" => obj.extended_properties = read_property_bag(child, context)?,
                "STK" | "QUE" | "LST" | "IE" | "DCT" => {
                    obj.content = ComplexObjectContent::Container(
                        Container::from_node_with_context(child, context)?,
                    );
                }
                tag if PsPrimitiveValue::is_primitive_tag(tag) => {
                    obj.content = ComplexObjectContent::ExtendedPrimitive(
                        PsPrimitiveValue::from_node_with_context(child, context)?,
                    );
                }
                _ => {}
            }
        }

        let is_enum = obj
            .type_def
            .as_ref()
            .is_some_and(|t| t.contains("System.Enum"));
        if is_enum
            && let ComplexObjectContent::ExtendedPrimitive(PsPrimitiveValue::I32(value)) = obj.content
        {
            obj.content = ComplexObjectContent::PsEnums(PsEnums { value });
        }

        if let Some(ref_id) = node.attribute("RefId") {
            context.register_object(ref_id, obj.clone());
        }

        Ok(obj)
    }
}

impl<'a> PsXmlDeserialize<'a> for PsValue {
    fn from_node_with_context(
        node: Node<'a, 'a>,
        context: &mut DeserializationContext,
    ) -> Result<Self> {
        match node.tag_name().name() {
            "Obj" => Ok(Self::Object(ComplexObject::from_node_with_context(
                node, context,
            )?)),
            "Ref" => {
                let ref_id = node.attribute("RefId").ok_or_else(|| XmlError::MissingAttribute {
                    element: "Ref".to_owned(),
                    attribute: "RefId".to_owned(),
                })?;
                context
                    .object_refs
                    .get(ref_id)
                    .cloned()
                    .map(Self::Object)
                    .ok_or_else(|| {
                        XmlError::GenericError(format!("Object reference {ref_id} not found"))
                    })
            }
            _ => Ok(Self::Primitive(PsPrimitiveValue::from_node_with_context(
                node, context,
            )?)),
        }
    }
}

impl PsValue {
    /// Parses one CLIXML document, tolerating a leading BOM.
    pub fn from_clixml(xml: &str) -> Result<Self> {
        let xml = xml.trim_start_matches('\u{feff}');
        let doc = winrs_xml::parser::parse(xml)?;
        Self::from_node(doc.root_element())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_primitive_root() {
        let value = PsValue::from_clixml("\u{feff}<S>hello</S>").unwrap();
        assert_eq!(value.as_str(), Some("hello"));
    }

    #[test]
    fn resolves_type_and_object_references() {
        let xml = r#"<Obj RefId="0"><MS>
            <Obj N="First" RefId="1"><TN RefId="0"><T>System.ConsoleColor</T><T>System.Enum</T><T>System.ValueType</T><T>System.Object</T></TN><ToString>Blue</ToString><I32>9</I32></Obj>
            <Obj N="Second" RefId="2"><TNRef RefId="0"/><ToString>Red</ToString><I32>12</I32></Obj>
            <Ref N="Third" RefId="1"/>
        </MS></Obj>"#;

        let value = PsValue::from_clixml(xml).unwrap();
        let obj = value.as_object().unwrap();

        let second = obj.property_object("Second").unwrap();
        assert!(second.type_def.as_ref().unwrap().contains("System.ConsoleColor"));
        assert_eq!(second.content, ComplexObjectContent::PsEnums(PsEnums { value: 12 }));
        assert_eq!(obj.property("Third").unwrap().as_i32(), Some(9));
        assert_eq!(obj.property("Third").unwrap().to_string(), "Blue");
    }

    #[test]
    fn reads_props_lists_and_dictionaries() {
        let xml = r#"<Obj RefId="0"><Props><S N="Message">boom</S><Nil N="Data"/></Props>
            <MS><Obj N="mp" RefId="1"><LST><S>a</S><I32>2</I32></LST></Obj>
            <Obj N="table" RefId="2"><DCT><En><S N="Key">k</S><B N="Value">true</B></En></DCT></Obj></MS></Obj>"#;

        let value = PsValue::from_clixml(xml).unwrap();
        let obj = value.as_object().unwrap();

        assert_eq!(obj.property_str("Message"), Some("boom"));
        assert!(obj.property("Data").unwrap().is_nil());

        let list = obj.property("mp").unwrap().as_list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].as_i32(), Some(2));

        let ComplexObjectContent::Container(Container::Dictionary(map)) =
            &obj.property_object("table").unwrap().content
        else {
            panic!("expected dictionary");
        };
        assert_eq!(map.get(&PsValue::from("k")), Some(&PsValue::from(true)));
    }

    #[test]
    fn unknown_reference_is_an_error() {
        assert!(PsValue::from_clixml(r#"<Obj RefId="0"><MS><Ref N="x" RefId="7"/></MS></Obj>"#).is_err());
    }
}
