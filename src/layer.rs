//! The map's layer stack: tile layers, object groups, image layers and
//! nested groups, all behind one common [`Layer`] wrapper.

use crate::colour::Colour;
use crate::data::{self, Tile};
use crate::geom::{Vec2f, Vec2i, Vec2u};
use crate::map::ParseContext;
use crate::object::Object;
use crate::path;
use crate::property::{self, Property};
use crate::xml;

/// One rung of the layer stack.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Layer name.
    pub name: String,
    /// Layer class.
    pub class: String,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Whether the layer is drawn.
    pub visible: bool,
    /// Pixel offset applied when drawing.
    pub offset: Vec2i,
    /// Parallax scroll factor.
    pub parallax: Vec2f,
    /// Multiplied with everything the layer draws, when present.
    pub tint_colour: Option<Colour>,
    /// Size in tiles; matches the map for tile layers of finite maps.
    pub size: Vec2u,
    /// Layer properties.
    pub properties: Vec<Property>,
    /// The layer's content.
    pub kind: LayerKind,
}

/// Content of a layer.
#[derive(Debug, Clone)]
pub enum LayerKind {
    /// Grid of tile references.
    Tiles(TileData),
    /// Free placed objects.
    Objects(ObjectGroup),
    /// A single image.
    Image(ImageLayer),
    /// Nested group of further layers.
    Group(LayerGroup),
}

impl Layer {
    /// The cell data, if this is a tile layer.
    pub fn as_tiles(&self) -> Option<&TileData> {
        match &self.kind {
            LayerKind::Tiles(data) => Some(data),
            _ => None,
        }
    }

    /// The object group, if this is an object layer.
    pub fn as_objects(&self) -> Option<&ObjectGroup> {
        match &self.kind {
            LayerKind::Objects(group) => Some(group),
            _ => None,
        }
    }

    /// The image, if this is an image layer.
    pub fn as_image(&self) -> Option<&ImageLayer> {
        match &self.kind {
            LayerKind::Image(image) => Some(image),
            _ => None,
        }
    }

    /// The nested layers, if this is a group layer.
    pub fn as_group(&self) -> Option<&LayerGroup> {
        match &self.kind {
            LayerKind::Group(group) => Some(group),
            _ => None,
        }
    }

    pub(crate) fn from_node(node: roxmltree::Node, ctx: &mut ParseContext) -> Option<Layer> {
        let name = xml::attr_str(node, "name").to_owned();
        let mut size = Vec2u::new(
            xml::attr_or(node, "width", 0),
            xml::attr_or(node, "height", 0),
        );

        let kind = match node.tag_name().name() {
            "layer" => {
                if size == Vec2u::default() {
                    size = ctx.map_size;
                }
                LayerKind::Tiles(TileData::parse(node, &name, ctx))
            }
            "objectgroup" => LayerKind::Objects(ObjectGroup::parse(node, ctx)),
            "imagelayer" => LayerKind::Image(ImageLayer::parse(node, &ctx.working_dir)),
            "group" => LayerKind::Group(LayerGroup::parse(node, ctx)),
            other => {
                log::warn!("unexpected <{}> in layer stack skipped", other);
                return None;
            }
        };

        let mut properties = Vec::new();
        if let Some(props) = xml::child(node, "properties") {
            property::parse_properties(props, "value", &mut properties);
        }

        Some(Layer {
            name,
            class: xml::attr_str(node, "class").to_owned(),
            opacity: xml::attr_or(node, "opacity", 1.0),
            visible: xml::attr_bool(node, "visible", true),
            offset: Vec2i::new(
                xml::attr_or(node, "offsetx", 0),
                xml::attr_or(node, "offsety", 0),
            ),
            parallax: Vec2f::new(
                xml::attr_or(node, "parallaxx", 1.0),
                xml::attr_or(node, "parallaxy", 1.0),
            ),
            tint_colour: xml::attr_colour(node, "tintcolor"),
            size,
            properties,
            kind,
        })
    }
}

/// Cells of a tile layer. Finite maps store one flat grid, infinite
/// maps a set of chunks; a layer never holds both.
#[derive(Debug, Clone)]
pub enum TileData {
    /// Row-major cells, `width * height` of them.
    Finite(Vec<Tile>),
    /// Cell blocks of an infinite map, in document order.
    Chunks(Vec<Chunk>),
}

impl TileData {
    fn parse(node: roxmltree::Node, name: &str, ctx: &ParseContext) -> TileData {
        let data_node = match xml::child(node, "data") {
            Some(data_node) => data_node,
            None => {
                log::warn!("layer \"{}\" has no <data> node", name);
                return TileData::Finite(Vec::new());
            }
        };

        let chunk_nodes: Vec<_> = data_node
            .children()
            .filter(|child| child.has_tag_name("chunk"))
            .collect();
        if chunk_nodes.is_empty() {
            let expected = ctx.map_size.x as usize * ctx.map_size.y as usize;
            return match data::decode_cells(data_node, data_node, expected) {
                Ok(cells) => TileData::Finite(cells.into_iter().map(Tile::from_raw).collect()),
                Err(err) => {
                    log::warn!("layer \"{}\" skipped: {}", name, err);
                    TileData::Finite(Vec::new())
                }
            };
        }

        // Chunks carry no encoding attributes of their own, the
        // enclosing <data> node dictates it for all of them.
        let mut chunks = Vec::with_capacity(chunk_nodes.len());
        for chunk_node in chunk_nodes {
            let size = Vec2u::new(
                xml::attr_or(chunk_node, "width", 0),
                xml::attr_or(chunk_node, "height", 0),
            );
            let expected = size.x as usize * size.y as usize;
            if expected == 0 {
                log::warn!("layer \"{}\" has a chunk with no size", name);
                continue;
            }
            match data::decode_cells(data_node, chunk_node, expected) {
                Ok(cells) => chunks.push(Chunk {
                    position: Vec2i::new(
                        xml::attr_or(chunk_node, "x", 0),
                        xml::attr_or(chunk_node, "y", 0),
                    ),
                    size,
                    tiles: cells.into_iter().map(Tile::from_raw).collect(),
                }),
                Err(err) => log::warn!("chunk in layer \"{}\" dropped: {}", name, err),
            }
        }
        if chunks.is_empty() {
            log::warn!("layer \"{}\" has no decodable chunks", name);
        }
        TileData::Chunks(chunks)
    }
}

/// One cell block of an infinite map layer.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Position in tiles, may be negative.
    pub position: Vec2i,
    /// Size in tiles.
    pub size: Vec2u,
    /// Row-major cells, `size.x * size.y` of them.
    pub tiles: Vec<Tile>,
}

/// Draw order of an object group.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DrawOrder {
    /// Objects are drawn sorted by their y position.
    #[default]
    TopDown,
    /// Objects are drawn in document order.
    Index,
}

/// Object content of a layer, also used for tile collision shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectGroup {
    /// Outline colour the editor shows for these objects.
    pub colour: Colour,
    /// Order the objects should be drawn in.
    pub draw_order: DrawOrder,
    /// The objects, in document order.
    pub objects: Vec<Object>,
}

impl Default for ObjectGroup {
    fn default() -> Self {
        ObjectGroup {
            colour: Colour::new(127, 127, 127, 255),
            draw_order: DrawOrder::default(),
            objects: Vec::new(),
        }
    }
}

impl ObjectGroup {
    pub(crate) fn parse(node: roxmltree::Node, ctx: &mut ParseContext) -> ObjectGroup {
        let mut group = ObjectGroup::default();
        if let Some(colour) = xml::attr_colour(node, "color") {
            group.colour = colour;
        }
        if xml::attr_str(node, "draworder") == "index" {
            group.draw_order = DrawOrder::Index;
        }
        for child in node.children().filter(roxmltree::Node::is_element) {
            match child.tag_name().name() {
                "object" => group.objects.push(Object::from_node(child, ctx)),
                // collected by the enclosing layer
                "properties" => {}
                other => log::warn!("unexpected <{}> in object group skipped", other),
            }
        }
        group
    }
}

/// Image content of a layer.
#[derive(Debug, Default, Clone)]
pub struct ImageLayer {
    /// Image path, resolved against the map's directory.
    pub image_path: String,
    /// Image size in pixels, when the document declares one.
    pub image_size: Vec2u,
    /// Colour treated as transparent when the image is drawn.
    pub transparency_colour: Option<Colour>,
}

impl ImageLayer {
    fn parse(node: roxmltree::Node, working_dir: &str) -> ImageLayer {
        let mut layer = ImageLayer::default();
        for child in node.children().filter(roxmltree::Node::is_element) {
            match child.tag_name().name() {
                "image" => {
                    let source = xml::attr_str(child, "source");
                    if source.is_empty() {
                        log::warn!("image layer has an <image> node with no source");
                        continue;
                    }
                    layer.image_path = path::resolve(source, working_dir);
                    layer.image_size = Vec2u::new(
                        xml::attr_or(child, "width", 0),
                        xml::attr_or(child, "height", 0),
                    );
                    layer.transparency_colour = xml::attr_colour(child, "trans");
                }
                "properties" => {}
                other => log::warn!("unexpected <{}> in image layer skipped", other),
            }
        }
        layer
    }
}

/// Nested group of layers.
#[derive(Debug, Default, Clone)]
pub struct LayerGroup {
    /// Child layers, bottom to top.
    pub layers: Vec<Layer>,
}

impl LayerGroup {
    fn parse(node: roxmltree::Node, ctx: &mut ParseContext) -> LayerGroup {
        let mut group = LayerGroup::default();
        for child in node.children().filter(roxmltree::Node::is_element) {
            match child.tag_name().name() {
                "layer" | "objectgroup" | "imagelayer" | "group" => {
                    if let Some(layer) = Layer::from_node(child, ctx) {
                        group.layers.push(layer);
                    }
                }
                "properties" => {}
                other => log::warn!("unexpected <{}> in layer group skipped", other),
            }
        }
        group
    }
}
