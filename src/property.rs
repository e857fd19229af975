use crate::colour::Colour;
use crate::xml;

/// Typed value carried by a [`Property`].
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// `type="bool"`.
    Bool(bool),
    /// `type="float"`.
    Float(f32),
    /// `type="int"`.
    Int(i32),
    /// `type="string"`, also the default when no type is given.
    String(String),
    /// `type="color"`.
    Colour(Colour),
    /// `type="file"`; a path relative to the declaring document.
    File(String),
    /// `type="object"`; the UID of an object in the same map, 0 when unset.
    Object(u32),
}

/// Named property attached to maps, layers, tilesets, tiles and objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Name as written in the document.
    pub name: String,
    /// Parsed value.
    pub value: PropertyValue,
}

impl Property {
    /// Parses a `<property>` node. `value_attr` is `"value"` in maps and
    /// tilesets and `"default"` in object-types documents.
    pub(crate) fn from_node(node: roxmltree::Node, value_attr: &str) -> Option<Property> {
        let name = xml::attr_str(node, "name");
        if name.is_empty() {
            log::warn!("skipping <property> with no name");
            return None;
        }

        // Multiline string values live in the element text rather than
        // the value attribute.
        let raw = match node.attribute(value_attr) {
            Some(v) => v,
            None => node.text().unwrap_or(""),
        };

        let value = match node.attribute("type").unwrap_or("string") {
            "bool" => PropertyValue::Bool(matches!(raw, "true" | "1")),
            "int" => PropertyValue::Int(raw.parse().unwrap_or(0)),
            "float" => PropertyValue::Float(raw.parse().unwrap_or(0.0)),
            "string" => PropertyValue::String(raw.to_owned()),
            "color" => match raw.parse::<Colour>() {
                Ok(colour) => PropertyValue::Colour(colour),
                Err(_) => {
                    if !raw.is_empty() {
                        log::warn!("property \"{}\" has malformed colour \"{}\"", name, raw);
                    }
                    PropertyValue::Colour(Colour::default())
                }
            },
            "file" => PropertyValue::File(raw.to_owned()),
            "object" => PropertyValue::Object(raw.parse().unwrap_or(0)),
            other => {
                log::warn!(
                    "skipping property \"{}\" with unsupported type \"{}\"",
                    name,
                    other
                );
                return None;
            }
        };

        Some(Property {
            name: name.to_owned(),
            value,
        })
    }
}

/// Parses every `<property>` child of a `<properties>` node into `out`.
pub(crate) fn parse_properties(node: roxmltree::Node, value_attr: &str, out: &mut Vec<Property>) {
    for child in node.children().filter(|c| c.has_tag_name("property")) {
        if let Some(property) = Property::from_node(child, value_attr) {
            out.push(property);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(xml: &str) -> Option<Property> {
        let doc = roxmltree::Document::parse(xml).expect("fixture is valid XML");
        Property::from_node(doc.root_element(), "value")
    }

    #[test]
    fn parses_each_supported_type() {
        let p = parse_one(r#"<property name="solid" type="bool" value="true"/>"#).unwrap();
        assert_eq!(p.value, PropertyValue::Bool(true));

        let p = parse_one(r#"<property name="speed" type="float" value="2.5"/>"#).unwrap();
        assert_eq!(p.value, PropertyValue::Float(2.5));

        let p = parse_one(r#"<property name="hp" type="int" value="-3"/>"#).unwrap();
        assert_eq!(p.value, PropertyValue::Int(-3));

        let p = parse_one(r##"<property name="tint" type="color" value="#80ff0000"/>"##).unwrap();
        assert_eq!(p.value, PropertyValue::Colour(Colour::new(255, 0, 0, 128)));

        let p = parse_one(r#"<property name="script" type="file" value="ai/walk.lua"/>"#).unwrap();
        assert_eq!(p.value, PropertyValue::File("ai/walk.lua".into()));

        let p = parse_one(r#"<property name="door" type="object" value="17"/>"#).unwrap();
        assert_eq!(p.value, PropertyValue::Object(17));
    }

    #[test]
    fn untyped_property_is_a_string() {
        let p = parse_one(r#"<property name="theme" value="forest"/>"#).unwrap();
        assert_eq!(p.value, PropertyValue::String("forest".into()));
    }

    #[test]
    fn multiline_string_value_comes_from_element_text() {
        let p = parse_one("<property name=\"note\" type=\"string\">two\nlines</property>").unwrap();
        assert_eq!(p.value, PropertyValue::String("two\nlines".into()));
    }

    #[test]
    fn skips_unsupported_type_and_missing_name() {
        assert!(parse_one(r#"<property name="x" type="class" value="y"/>"#).is_none());
        assert!(parse_one(r#"<property value="y"/>"#).is_none());
    }

    #[test]
    fn collects_children_of_a_properties_node() {
        let doc = roxmltree::Document::parse(
            r#"<properties>
                 <property name="a" type="int" value="1"/>
                 <property name="b" value="two"/>
               </properties>"#,
        )
        .unwrap();
        let mut out = Vec::new();
        parse_properties(doc.root_element(), "value", &mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "a");
        assert_eq!(out[1].value, PropertyValue::String("two".into()));
    }
}
