//! The map document itself: top level attributes, the tileset list,
//! the layer stack and the lookups derived from them.

use std::collections::HashMap;

use crate::colour::Colour;
use crate::error::Error;
use crate::geom::{Rect, Vec2f, Vec2u};
use crate::layer::Layer;
use crate::object::Object;
use crate::path;
use crate::property::{self, Property};
use crate::tileset::{TileMeta, Tileset};
use crate::xml;

/// Format version of a map document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    /// Number before the first dot.
    pub major: u16,
    /// Number after the first dot.
    pub minor: u16,
}

/// How the tile grid is projected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Plain rectangular grid.
    Orthogonal,
    /// Diamond shaped grid.
    Isometric,
    /// Isometric with alternating rows or columns shifted.
    Staggered,
    /// Hexagonal grid.
    Hexagonal,
}

/// Order in which the cells of a tile layer are meant to be drawn.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RenderOrder {
    /// Left to right, top to bottom; the editor default.
    #[default]
    RightDown,
    /// Left to right, bottom to top.
    RightUp,
    /// Right to left, top to bottom.
    LeftDown,
    /// Right to left, bottom to top.
    LeftUp,
}

/// Axis along which staggered and hexagonal maps shift their cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaggerAxis {
    /// Columns are shifted.
    X,
    /// Rows are shifted.
    Y,
}

/// Whether the even or the odd rows/columns are shifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaggerIndex {
    /// Even rows/columns are shifted.
    Even,
    /// Odd rows/columns are shifted.
    Odd,
}

// Shared state of one load: the directory paths resolve against, the
// map dimensions layers need for decoding, and the per map template
// caches.
pub(crate) struct ParseContext {
    pub working_dir: String,
    pub map_size: Vec2u,
    pub template_objects: HashMap<String, Object>,
    pub template_tilesets: HashMap<String, Tileset>,
}

impl ParseContext {
    pub fn new(working_dir: String) -> ParseContext {
        ParseContext {
            working_dir,
            map_size: Vec2u::default(),
            template_objects: HashMap::new(),
            template_tilesets: HashMap::new(),
        }
    }
}

/// A fully parsed map document.
///
/// Built by [`Map::load`] or [`Map::load_from_str`] and never
/// observable half parsed: a document that fails its structural checks
/// is returned as an [`Error`] instead of a partial value. Recoverable
/// problems cost the offending element and are logged.
#[derive(Debug, Clone)]
pub struct Map {
    /// Format version the document declares.
    pub version: Version,
    /// Class of the map.
    pub class: String,
    /// Grid projection.
    pub orientation: Orientation,
    /// Draw order for tile layers.
    pub render_order: RenderOrder,
    /// Whether the map grows on demand and stores its layers in chunks.
    pub infinite: bool,
    /// Map size in tiles.
    pub tile_count: Vec2u,
    /// Size of one grid cell in pixels.
    pub tile_size: Vec2u,
    /// Side length of hexagonal tiles, 0 for other orientations.
    pub hex_side_length: f32,
    /// Stagger axis, present for staggered and hexagonal maps.
    pub stagger_axis: Option<StaggerAxis>,
    /// Stagger index, present for staggered and hexagonal maps.
    pub stagger_index: Option<StaggerIndex>,
    /// Origin used for parallax scrolling, in pixels.
    pub parallax_origin: Vec2f,
    /// Colour drawn behind all layers, when the document sets one.
    pub background_colour: Option<Colour>,
    /// Directory relative references in the document resolve against.
    pub working_dir: String,
    /// Tilesets, in document order.
    pub tilesets: Vec<Tileset>,
    /// Layer stack, bottom to top.
    pub layers: Vec<Layer>,
    /// Map properties.
    pub properties: Vec<Property>,
    anim_tiles: HashMap<u32, TileMeta>,
    template_objects: HashMap<String, Object>,
    template_tilesets: HashMap<String, Tileset>,
}

impl Map {
    /// Reads and parses the map file at `path`.
    ///
    /// Relative references inside the document resolve against the
    /// file's directory.
    pub fn load(path: &str) -> Result<Map, Error> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.into(),
            source,
        })?;
        Map::load_from_str(&text, &path::dirname(path))
    }

    /// Parses a map from an in-memory document.
    ///
    /// `working_dir` is the directory relative references resolve
    /// against.
    pub fn load_from_str(data: &str, working_dir: &str) -> Result<Map, Error> {
        let doc = roxmltree::Document::parse(data)?;
        let root = doc.root_element();
        if !root.has_tag_name("map") {
            return Err(Error::Structure("no <map> node found".into()));
        }

        let mut working_dir = working_dir.replace('\\', "/");
        if working_dir.ends_with('/') {
            working_dir.pop();
        }

        Map::parse_map_node(root, working_dir)
    }

    fn parse_map_node(node: roxmltree::Node, working_dir: String) -> Result<Map, Error> {
        let version_attr = xml::attr_str(node, "version");
        let version = parse_version(version_attr).ok_or_else(|| {
            Error::Structure(format!("invalid map version \"{}\"", version_attr))
        })?;

        let orientation = match xml::attr_str(node, "orientation") {
            "orthogonal" => Orientation::Orthogonal,
            "isometric" => Orientation::Isometric,
            "staggered" => Orientation::Staggered,
            "hexagonal" => Orientation::Hexagonal,
            "" => return Err(Error::Structure("map has no orientation".into())),
            other => {
                return Err(Error::Structure(format!(
                    "unsupported map orientation \"{}\"",
                    other
                )))
            }
        };

        let render_order = match xml::attr_str(node, "renderorder") {
            // optional in older documents
            "" => RenderOrder::default(),
            "right-down" => RenderOrder::RightDown,
            "right-up" => RenderOrder::RightUp,
            "left-down" => RenderOrder::LeftDown,
            "left-up" => RenderOrder::LeftUp,
            other => {
                return Err(Error::Structure(format!(
                    "invalid render order \"{}\"",
                    other
                )))
            }
        };

        let tile_count = Vec2u::new(
            xml::attr_or(node, "width", 0),
            xml::attr_or(node, "height", 0),
        );
        if tile_count.x == 0 || tile_count.y == 0 {
            return Err(Error::Structure("invalid map tile count".into()));
        }

        let tile_size = Vec2u::new(
            xml::attr_or(node, "tilewidth", 0),
            xml::attr_or(node, "tileheight", 0),
        );
        if tile_size.x == 0 || tile_size.y == 0 {
            return Err(Error::Structure("invalid map tile size".into()));
        }

        let hex_side_length = xml::attr_or(node, "hexsidelength", 0.0f32);
        if orientation == Orientation::Hexagonal && hex_side_length <= 0.0 {
            return Err(Error::Structure(
                "hexagonal map has no side length".into(),
            ));
        }

        let stagger_axis = match xml::attr_str(node, "staggeraxis") {
            "x" => Some(StaggerAxis::X),
            "y" => Some(StaggerAxis::Y),
            _ => None,
        };
        let stagger_index = match xml::attr_str(node, "staggerindex") {
            "even" => Some(StaggerIndex::Even),
            "odd" => Some(StaggerIndex::Odd),
            _ => None,
        };
        if orientation == Orientation::Staggered || orientation == Orientation::Hexagonal {
            if stagger_axis.is_none() {
                return Err(Error::Structure("map has no stagger axis".into()));
            }
            if stagger_index.is_none() {
                return Err(Error::Structure("map has no stagger index".into()));
            }
        }

        let mut map = Map {
            version,
            class: xml::attr_str(node, "class").to_owned(),
            orientation,
            render_order,
            infinite: xml::attr_bool(node, "infinite", false),
            tile_count,
            tile_size,
            hex_side_length,
            stagger_axis,
            stagger_index,
            parallax_origin: Vec2f::new(
                xml::attr_or(node, "parallaxoriginx", 0.0),
                xml::attr_or(node, "parallaxoriginy", 0.0),
            ),
            background_colour: xml::attr_colour(node, "backgroundcolor"),
            working_dir: working_dir.clone(),
            tilesets: Vec::new(),
            layers: Vec::new(),
            properties: Vec::new(),
            anim_tiles: HashMap::new(),
            template_objects: HashMap::new(),
            template_tilesets: HashMap::new(),
        };

        let mut ctx = ParseContext::new(working_dir);
        ctx.map_size = tile_count;

        for child in node.children().filter(roxmltree::Node::is_element) {
            match child.tag_name().name() {
                "tileset" => {
                    let dir = ctx.working_dir.clone();
                    match Tileset::parse(child, &dir, &mut ctx) {
                        Ok(tileset) => map.tilesets.push(tileset),
                        Err(err) => log::warn!("tileset skipped: {}", err),
                    }
                }
                "layer" | "objectgroup" | "imagelayer" | "group" => {
                    if let Some(layer) = Layer::from_node(child, &mut ctx) {
                        map.layers.push(layer);
                    }
                }
                "properties" => {
                    property::parse_properties(child, "value", &mut map.properties)
                }
                other => log::warn!("unexpected <{}> in map skipped", other),
            }
        }

        // Animated tiles of every set, keyed by global ID so a layer
        // cell can be looked up directly.
        for tileset in &map.tilesets {
            for tile in tileset.tiles() {
                if !tile.animation.is_empty() {
                    map.anim_tiles
                        .insert(tileset.first_gid + tile.id, tile.clone());
                }
            }
        }

        map.template_objects = ctx.template_objects;
        map.template_tilesets = ctx.template_tilesets;
        Ok(map)
    }

    /// Resolves a global tile ID to its tileset and the ID local to it.
    ///
    /// GID 0 means "no tile" and IDs past the last tileset's range
    /// belong to nothing, both return `None`. Flip bits must already be
    /// stripped, see [`Tile::from_raw`](crate::Tile::from_raw).
    pub fn tileset_for(&self, gid: u32) -> Option<(&Tileset, u32)> {
        let tileset = self
            .tilesets
            .iter()
            .filter(|tileset| tileset.first_gid <= gid)
            .max_by_key(|tileset| tileset.first_gid)?;
        if !tileset.contains_gid(gid) {
            return None;
        }
        Some((tileset, gid - tileset.first_gid))
    }

    /// Pixel bounds of the map.
    pub fn bounds(&self) -> Rect<f32> {
        Rect::new(
            0.0,
            0.0,
            self.tile_count.x as f32 * self.tile_size.x as f32,
            self.tile_count.y as f32 * self.tile_size.y as f32,
        )
    }

    /// Animated tiles across all tilesets, keyed by global ID.
    pub fn animated_tiles(&self) -> &HashMap<u32, TileMeta> {
        &self.anim_tiles
    }

    /// Objects loaded from template files, keyed by their resolved
    /// path.
    pub fn template_objects(&self) -> &HashMap<String, Object> {
        &self.template_objects
    }

    /// Tilesets pulled in by template files rather than the map itself,
    /// keyed by the template's resolved path.
    pub fn template_tilesets(&self) -> &HashMap<String, Tileset> {
        &self.template_tilesets
    }
}

// "major.minor", with trailing point releases ignored.
fn parse_version(raw: &str) -> Option<Version> {
    let (major, rest) = raw.split_once('.')?;
    let minor = rest.split('.').next()?;
    Some(Version {
        major: major.parse().ok()?,
        minor: minor.parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_strings_parse_without_their_patch_part() {
        assert_eq!(parse_version("1.0"), Some(Version { major: 1, minor: 0 }));
        assert_eq!(
            parse_version("1.10.2"),
            Some(Version { major: 1, minor: 10 })
        );
        assert_eq!(parse_version("2"), None);
        assert_eq!(parse_version(""), None);
        assert_eq!(parse_version("one.two"), None);
    }
}
