//! Objects placed on object layers, in collision groups and in
//! template files.

use crate::colour::Colour;
use crate::data::Tile;
use crate::geom::{Rect, Vec2f};
use crate::map::ParseContext;
use crate::property::{self, Property};
use crate::template;
use crate::xml;

/// Outline an object is drawn with.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Axis aligned box, the default.
    #[default]
    Rectangle,
    /// Ellipse fitted into the object bounds.
    Ellipse,
    /// Single point, bounds are zero sized.
    Point,
    /// Closed polygon described by `points`.
    Polygon,
    /// Open line strip described by `points`.
    Polyline,
    /// Text, see [`TextData`].
    Text,
}

/// Horizontal alignment of object text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    /// Aligned to the left edge.
    #[default]
    Left,
    /// Centred within the bounds.
    Centre,
    /// Aligned to the right edge.
    Right,
}

/// Vertical alignment of object text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    /// Aligned to the top edge.
    #[default]
    Top,
    /// Centred within the bounds.
    Centre,
    /// Aligned to the bottom edge.
    Bottom,
}

/// Text payload of a [`Shape::Text`] object.
#[derive(Debug, Clone, PartialEq)]
pub struct TextData {
    /// Font family name, empty for the editor default.
    pub font_family: String,
    /// Glyph size in pixels.
    pub pixel_size: u32,
    /// Whether the text wraps within the object bounds.
    pub wrap: bool,
    /// Text colour.
    pub colour: Colour,
    /// Bold style.
    pub bold: bool,
    /// Italic style.
    pub italic: bool,
    /// Underlined text.
    pub underline: bool,
    /// Struck through text.
    pub strikethrough: bool,
    /// Whether kerning is applied, on by default.
    pub kerning: bool,
    /// Horizontal alignment within the bounds.
    pub h_align: HAlign,
    /// Vertical alignment within the bounds.
    pub v_align: VAlign,
    /// The text itself.
    pub content: String,
}

impl Default for TextData {
    fn default() -> Self {
        TextData {
            font_family: String::new(),
            pixel_size: 16,
            wrap: false,
            colour: Colour::new(255, 255, 255, 255),
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
            kerning: true,
            h_align: HAlign::Left,
            v_align: VAlign::Top,
            content: String::new(),
        }
    }
}

/// A single placed object.
///
/// Objects written by the editor carry only the attributes that differ
/// from their defaults, so every field here has a well defined resting
/// value. Objects referencing a template file are returned already
/// merged with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Unique ID within the map, never merged from a template.
    pub id: u32,
    /// Object name, not necessarily unique.
    pub name: String,
    /// Class of the object (named "type" before Tiled 1.9).
    pub class: String,
    /// Position in pixels.
    pub position: Vec2f,
    /// Bounding box in pixels; `x`/`y` mirror `position`.
    pub bounds: Rect<f32>,
    /// Rotation in degrees, clockwise.
    pub rotation: f32,
    /// Global tile ID when the object stamps a tile, 0 otherwise.
    pub tile_gid: u32,
    /// Flip bits of the stamped tile, see the `FLIP_*` constants.
    pub flip: u8,
    /// Whether the object is shown.
    pub visible: bool,
    /// Outline the object is drawn with.
    pub shape: Shape,
    /// Polygon or polyline vertices, relative to `position`.
    pub points: Vec<Vec2f>,
    /// Object properties.
    pub properties: Vec<Property>,
    /// Text payload, meaningful when `shape` is [`Shape::Text`].
    pub text: TextData,
    /// Name of the tileset a template routed this object to, else empty.
    pub tileset_name: String,
}

impl Default for Object {
    fn default() -> Self {
        Object {
            id: 0,
            name: String::new(),
            class: String::new(),
            position: Vec2f::default(),
            bounds: Rect::default(),
            rotation: 0.0,
            tile_gid: 0,
            flip: 0,
            visible: true,
            shape: Shape::default(),
            points: Vec::new(),
            properties: Vec::new(),
            text: TextData::default(),
            tileset_name: String::new(),
        }
    }
}

impl Object {
    /// Parses an `<object>` node, merging in its template when one is
    /// referenced.
    pub(crate) fn from_node(node: roxmltree::Node, ctx: &mut ParseContext) -> Object {
        let mut object = Object::default();
        object.parse_into(node);
        if let Some(template) = node.attribute("template") {
            template::apply(&mut object, template, ctx);
        }
        object
    }

    // Attribute and child parsing shared with template objects. The
    // template attribute itself is handled by the caller, so a template
    // file cannot chain into another one.
    pub(crate) fn parse_into(&mut self, node: roxmltree::Node) {
        self.id = xml::attr_or(node, "id", 0);
        self.name = xml::attr_str(node, "name").to_owned();
        self.class = xml::attr_class(node).to_owned();
        self.position = Vec2f::new(xml::attr_or(node, "x", 0.0), xml::attr_or(node, "y", 0.0));
        self.bounds = Rect::new(
            self.position.x,
            self.position.y,
            xml::attr_or(node, "width", 0.0),
            xml::attr_or(node, "height", 0.0),
        );
        self.rotation = xml::attr_or(node, "rotation", 0.0);
        let raw_gid: u32 = xml::attr_or(node, "gid", 0);
        if raw_gid != 0 {
            let tile = Tile::from_raw(raw_gid);
            self.tile_gid = tile.gid;
            self.flip = tile.flags;
        }
        self.visible = xml::attr_bool(node, "visible", true);

        for child in node.children().filter(roxmltree::Node::is_element) {
            match child.tag_name().name() {
                "properties" => property::parse_properties(child, "value", &mut self.properties),
                "ellipse" => self.shape = Shape::Ellipse,
                "point" => self.shape = Shape::Point,
                "polygon" => {
                    self.shape = Shape::Polygon;
                    self.parse_points(child);
                }
                "polyline" => {
                    self.shape = Shape::Polyline;
                    self.parse_points(child);
                }
                "text" => {
                    self.shape = Shape::Text;
                    self.parse_text(child);
                }
                other => log::warn!("unexpected <{}> in object {} skipped", other, self.id),
            }
        }
    }

    fn parse_points(&mut self, node: roxmltree::Node) {
        let list = match node.attribute("points") {
            Some(list) => list,
            None => {
                log::warn!("object {} has a point list node with no points", self.id);
                return;
            }
        };
        for pair in list.split_ascii_whitespace() {
            let mut coords = pair.split(',').map(|c| c.trim().parse::<f32>());
            match (coords.next(), coords.next()) {
                (Some(Ok(x)), Some(Ok(y))) => self.points.push(Vec2f::new(x, y)),
                _ => log::warn!("object {} has a malformed point \"{}\"", self.id, pair),
            }
        }
    }

    fn parse_text(&mut self, node: roxmltree::Node) {
        let text = &mut self.text;
        text.font_family = xml::attr_str(node, "fontfamily").to_owned();
        text.pixel_size = xml::attr_or(node, "pixelsize", 16);
        text.wrap = xml::attr_bool(node, "wrap", false);
        if let Some(colour) = xml::attr_colour(node, "color") {
            text.colour = colour;
        }
        text.bold = xml::attr_bool(node, "bold", false);
        text.italic = xml::attr_bool(node, "italic", false);
        text.underline = xml::attr_bool(node, "underline", false);
        text.strikethrough = xml::attr_bool(node, "strikeout", false);
        text.kerning = xml::attr_bool(node, "kerning", true);
        text.h_align = match xml::attr_str(node, "halign") {
            "center" => HAlign::Centre,
            "right" => HAlign::Right,
            _ => HAlign::Left,
        };
        text.v_align = match xml::attr_str(node, "valign") {
            "center" => VAlign::Centre,
            "bottom" => VAlign::Bottom,
            _ => VAlign::Top,
        };
        text.content = node.text().unwrap_or("").to_owned();
    }
}
