//! Object type defaults exported from the editor's object types
//! dialogue, a small standalone document independent of any map.

use crate::colour::Colour;
use crate::error::Error;
use crate::path;
use crate::property::{self, Property};
use crate::xml;

/// One declared object class.
#[derive(Debug, Clone)]
pub struct ObjectType {
    /// Class name objects refer to.
    pub name: String,
    /// Colour the editor shows objects of this class in.
    pub colour: Colour,
    /// Default properties of the class.
    pub properties: Vec<Property>,
}

/// A parsed object types export.
#[derive(Debug, Default, Clone)]
pub struct ObjectTypes {
    /// Directory relative references would resolve against.
    pub working_dir: String,
    /// Declared classes, in document order.
    pub types: Vec<ObjectType>,
}

impl ObjectTypes {
    /// Reads and parses the object types file at `path`.
    pub fn load(path: &str) -> Result<ObjectTypes, Error> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.into(),
            source,
        })?;
        ObjectTypes::load_from_str(&text, &path::dirname(&path.replace('\\', "/")))
    }

    /// Parses object types from an in-memory document.
    pub fn load_from_str(data: &str, working_dir: &str) -> Result<ObjectTypes, Error> {
        let doc = roxmltree::Document::parse(data)?;
        let root = doc.root_element();
        if !root.has_tag_name("objecttypes") {
            return Err(Error::Structure("no <objecttypes> node found".into()));
        }

        let mut working_dir = working_dir.replace('\\', "/");
        if working_dir.ends_with('/') {
            working_dir.pop();
        }

        let mut types = Vec::new();
        for child in root.children().filter(roxmltree::Node::is_element) {
            if !child.has_tag_name("objecttype") {
                log::warn!(
                    "unexpected <{}> in object types skipped",
                    child.tag_name().name()
                );
                continue;
            }
            let mut object_type = ObjectType {
                name: xml::attr_str(child, "name").to_owned(),
                colour: Colour::new(255, 255, 255, 255),
                properties: Vec::new(),
            };
            if let Some(colour) = xml::attr_colour(child, "color") {
                object_type.colour = colour;
            }
            // Values live in the "default" attribute here, not "value".
            property::parse_properties(child, "default", &mut object_type.properties);
            types.push(object_type);
        }

        Ok(ObjectTypes { working_dir, types })
    }
}
