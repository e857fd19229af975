//! Tilesets: the mapping from tile IDs to atlas regions or single
//! images, plus the per-tile metadata a map can attach.

use crate::colour::Colour;
use crate::error::Error;
use crate::geom::{Vec2i, Vec2u};
use crate::layer::ObjectGroup;
use crate::map::ParseContext;
use crate::path;
use crate::property::{self, Property};
use crate::xml;

/// How tile objects of this set are aligned to their position.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ObjectAlignment {
    /// Legacy behaviour: bottom left for orthogonal maps, bottom centre
    /// for isometric ones.
    #[default]
    Unspecified,
    /// Top left corner.
    TopLeft,
    /// Top centre.
    Top,
    /// Top right corner.
    TopRight,
    /// Centre left.
    Left,
    /// Dead centre.
    Centre,
    /// Centre right.
    Right,
    /// Bottom left corner.
    BottomLeft,
    /// Bottom centre.
    Bottom,
    /// Bottom right corner.
    BottomRight,
}

impl ObjectAlignment {
    fn parse(raw: &str) -> ObjectAlignment {
        match raw {
            "topleft" => ObjectAlignment::TopLeft,
            "top" => ObjectAlignment::Top,
            "topright" => ObjectAlignment::TopRight,
            "left" => ObjectAlignment::Left,
            "center" => ObjectAlignment::Centre,
            "right" => ObjectAlignment::Right,
            "bottomleft" => ObjectAlignment::BottomLeft,
            "bottom" => ObjectAlignment::Bottom,
            "bottomright" => ObjectAlignment::BottomRight,
            _ => ObjectAlignment::Unspecified,
        }
    }
}

/// One frame of a tile animation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Global ID of the tile shown during this frame.
    pub tile_id: u32,
    /// How long the frame is shown, in milliseconds.
    pub duration: u32,
}

/// A terrain type declared by the tileset.
#[derive(Debug, Default, Clone)]
pub struct Terrain {
    /// Terrain name.
    pub name: String,
    /// Local ID of the tile representing the terrain.
    pub tile_id: u32,
    /// Terrain properties.
    pub properties: Vec<Property>,
}

/// Metadata of a single tile.
///
/// Every tile of a set has an entry, whether the document spelled it
/// out or not; see [`Tileset::tile`].
#[derive(Debug, Clone, PartialEq)]
pub struct TileMeta {
    /// Local ID within the tileset.
    pub id: u32,
    /// Class of the tile.
    pub class: String,
    /// Terrain index per corner, -1 where none applies.
    pub terrain_indices: [i32; 4],
    /// Relative chance this tile is picked when painting terrain.
    pub probability: u32,
    /// Tile properties.
    pub properties: Vec<Property>,
    /// Path of the image the tile is cut from.
    pub image_path: String,
    /// Size of the tile's region within its image, in pixels.
    pub image_size: Vec2u,
    /// Top left corner of the tile's region within its image.
    pub image_position: Vec2u,
    /// Collision shapes of the tile.
    pub collision: ObjectGroup,
    /// Animation frames, empty for still tiles.
    pub animation: Vec<Frame>,
}

impl Default for TileMeta {
    fn default() -> Self {
        TileMeta {
            id: 0,
            class: String::new(),
            terrain_indices: [-1; 4],
            probability: 100,
            properties: Vec::new(),
            image_path: String::new(),
            image_size: Vec2u::default(),
            image_position: Vec2u::default(),
            collision: ObjectGroup::default(),
            animation: Vec::new(),
        }
    }
}

/// A tileset referenced by a map, embedded or loaded from a .tsx file.
#[derive(Debug, Clone)]
pub struct Tileset {
    /// First global ID the set covers; 0 for standalone .tsx sets.
    pub first_gid: u32,
    /// Path of the .tsx file the set came from, empty when embedded.
    pub source: String,
    /// Tileset name.
    pub name: String,
    /// Class of the tileset.
    pub class: String,
    /// Size of one tile in pixels.
    pub tile_size: Vec2u,
    /// Pixels between neighbouring tiles in the atlas.
    pub spacing: u32,
    /// Pixels before the first tile in the atlas.
    pub margin: u32,
    /// Number of tiles in the set.
    pub tile_count: u32,
    /// Number of atlas columns; 0 for collections of single images.
    pub column_count: u32,
    /// How tile objects of this set are aligned.
    pub object_alignment: ObjectAlignment,
    /// Pixel offset applied when tiles of this set are drawn.
    pub tile_offset: Vec2i,
    /// Tileset properties.
    pub properties: Vec<Property>,
    /// Atlas image path, empty for collections of single images.
    pub image_path: String,
    /// Pixel size of the atlas image, when the document declares one.
    pub image_size: Vec2u,
    /// Colour treated as transparent in the atlas image.
    pub transparency_colour: Option<Colour>,
    /// Terrain types declared by the set.
    pub terrain_types: Vec<Terrain>,
    tiles: Vec<TileMeta>,
    // Maps a local ID to 1 + its position in `tiles`; 0 means absent.
    tile_index: Vec<usize>,
}

impl Tileset {
    /// Reads and parses a standalone .tsx file.
    ///
    /// The set has no place in any map's global ID space, so
    /// `first_gid` is 0 and local IDs are the only handle to its tiles.
    pub fn load(path: &str) -> Result<Tileset, Error> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.into(),
            source,
        })?;
        let doc = roxmltree::Document::parse(&text)?;
        let root = doc.root_element();
        if !root.has_tag_name("tileset") {
            return Err(Error::Structure(format!("{} has no <tileset> node", path)));
        }

        let path = path.replace('\\', "/");
        let dir = path::dirname(&path);
        let mut ctx = ParseContext::new(dir.clone());
        let mut tileset = Tileset::parse_node(root, 0, &dir, &mut ctx)?;
        tileset.source = path;
        Ok(tileset)
    }

    /// Parses a map-side `<tileset>` node found in the document rooted
    /// at `dir`, following its `source` attribute when the set is
    /// external.
    pub(crate) fn parse(
        node: roxmltree::Node,
        dir: &str,
        ctx: &mut ParseContext,
    ) -> Result<Tileset, Error> {
        let first_gid: u32 = xml::attr_or(node, "firstgid", 0);
        if first_gid == 0 {
            return Err(Error::Structure("tileset has no first GID".into()));
        }

        if let Some(source) = node.attribute("source") {
            // External set: the .tsx file dictates the image paths, so
            // the working directory becomes that of the .tsx file.
            let tsx_path = path::resolve(source, dir);
            let text = std::fs::read_to_string(&tsx_path).map_err(|source| Error::Io {
                path: tsx_path.clone().into(),
                source,
            })?;
            let doc = roxmltree::Document::parse(&text)?;
            let root = doc.root_element();
            if !root.has_tag_name("tileset") {
                return Err(Error::Structure(format!(
                    "{} has no <tileset> node",
                    tsx_path
                )));
            }
            let mut tileset = Tileset::parse_node(root, first_gid, &path::dirname(&tsx_path), ctx)?;
            tileset.source = tsx_path;
            return Ok(tileset);
        }

        Tileset::parse_node(node, first_gid, dir, ctx)
    }

    fn parse_node(
        node: roxmltree::Node,
        first_gid: u32,
        dir: &str,
        ctx: &mut ParseContext,
    ) -> Result<Tileset, Error> {
        let tile_size = Vec2u::new(
            xml::attr_or(node, "tilewidth", 0),
            xml::attr_or(node, "tileheight", 0),
        );
        if tile_size.x == 0 || tile_size.y == 0 {
            return Err(Error::Structure(format!(
                "tileset \"{}\" has an invalid tile size",
                xml::attr_str(node, "name")
            )));
        }

        let tile_count = xml::attr_or(node, "tilecount", 0u32);
        let mut tileset = Tileset {
            first_gid,
            source: String::new(),
            name: xml::attr_str(node, "name").to_owned(),
            class: xml::attr_class(node).to_owned(),
            tile_size,
            spacing: xml::attr_or(node, "spacing", 0),
            margin: xml::attr_or(node, "margin", 0),
            tile_count,
            column_count: xml::attr_or(node, "columns", 0),
            object_alignment: ObjectAlignment::parse(xml::attr_str(node, "objectalignment")),
            tile_offset: Vec2i::default(),
            properties: Vec::new(),
            image_path: String::new(),
            image_size: Vec2u::default(),
            transparency_colour: None,
            terrain_types: Vec::new(),
            tiles: Vec::new(),
            tile_index: vec![0; tile_count as usize],
        };

        for child in node.children().filter(roxmltree::Node::is_element) {
            match child.tag_name().name() {
                "image" => {
                    let source = xml::attr_str(child, "source");
                    if source.is_empty() {
                        return Err(Error::Structure(format!(
                            "tileset \"{}\" has an <image> node with no source",
                            tileset.name
                        )));
                    }
                    tileset.image_path = path::resolve(source, dir);
                    tileset.image_size = Vec2u::new(
                        xml::attr_or(child, "width", 0),
                        xml::attr_or(child, "height", 0),
                    );
                    if let Some(colour) = xml::attr_colour(child, "trans") {
                        tileset.transparency_colour = Some(colour);
                    }
                }
                "tileoffset" => {
                    tileset.tile_offset = Vec2i::new(
                        xml::attr_or(child, "x", 0),
                        xml::attr_or(child, "y", 0),
                    );
                }
                "properties" => {
                    property::parse_properties(child, "value", &mut tileset.properties)
                }
                "terraintypes" => tileset.parse_terrain_types(child),
                "tile" => tileset.parse_tile(child, dir, ctx),
                "grid" | "wangsets" | "transformations" => {}
                other => log::warn!(
                    "unexpected <{}> in tileset \"{}\" skipped",
                    other,
                    tileset.name
                ),
            }
        }

        tileset.fill_missing_tiles();
        Ok(tileset)
    }

    /// All tile entries, explicit and synthesised, in ascending ID
    /// order for atlas sets.
    pub fn tiles(&self) -> &[TileMeta] {
        &self.tiles
    }

    /// Looks up a tile by its local ID.
    pub fn tile(&self, local_id: u32) -> Option<&TileMeta> {
        let slot = *self.tile_index.get(local_id as usize)?;
        if slot == 0 {
            return None;
        }
        self.tiles.get(slot - 1)
    }

    /// Last global ID covered by this set.
    pub fn last_gid(&self) -> u32 {
        self.first_gid.saturating_add(self.tile_count).saturating_sub(1)
    }

    /// Whether `gid` falls into this set's range.
    pub fn contains_gid(&self, gid: u32) -> bool {
        gid >= self.first_gid && gid <= self.last_gid()
    }

    fn parse_terrain_types(&mut self, node: roxmltree::Node) {
        for child in node.children().filter(|c| c.has_tag_name("terrain")) {
            let mut terrain = Terrain {
                name: xml::attr_str(child, "name").to_owned(),
                tile_id: xml::attr_or(child, "tile", 0),
                properties: Vec::new(),
            };
            if let Some(props) = xml::child(child, "properties") {
                property::parse_properties(props, "value", &mut terrain.properties);
            }
            self.terrain_types.push(terrain);
        }
    }

    fn parse_tile(&mut self, node: roxmltree::Node, dir: &str, ctx: &mut ParseContext) {
        let mut tile = TileMeta {
            id: xml::attr_or(node, "id", 0),
            class: xml::attr_class(node).to_owned(),
            probability: xml::attr_or(node, "probability", 100),
            ..TileMeta::default()
        };

        if let Some(terrain) = node.attribute("terrain") {
            for (slot, token) in terrain.split(',').take(4).enumerate() {
                tile.terrain_indices[slot] = token.trim().parse().unwrap_or(-1);
            }
        }

        for child in node.children().filter(roxmltree::Node::is_element) {
            match child.tag_name().name() {
                "properties" => {
                    property::parse_properties(child, "value", &mut tile.properties)
                }
                "objectgroup" => tile.collision = ObjectGroup::parse(child, ctx),
                "image" => {
                    let source = xml::attr_str(child, "source");
                    if source.is_empty() {
                        log::warn!(
                            "tile {} of \"{}\" has an image with no source",
                            tile.id,
                            self.name
                        );
                        continue;
                    }
                    tile.image_path = path::resolve(source, dir);
                    tile.image_size = Vec2u::new(
                        xml::attr_or(child, "width", 0),
                        xml::attr_or(child, "height", 0),
                    );
                    // The editor writes per tile transparency on
                    // collection sets; it applies to the whole set.
                    if let Some(colour) = xml::attr_colour(child, "trans") {
                        self.transparency_colour = Some(colour);
                    }
                }
                "animation" => {
                    for frame_node in child.children().filter(|c| c.has_tag_name("frame")) {
                        tile.animation.push(Frame {
                            tile_id: xml::attr_or(frame_node, "tileid", 0u32) + self.first_gid,
                            duration: xml::attr_or(frame_node, "duration", 0),
                        });
                    }
                }
                other => log::warn!(
                    "unexpected <{}> in tile {} of \"{}\" skipped",
                    other,
                    tile.id,
                    self.name
                ),
            }
        }

        self.insert_tile(tile);
    }

    fn insert_tile(&mut self, tile: TileMeta) {
        match self.tile_index.get_mut(tile.id as usize) {
            Some(slot) => {
                self.tiles.push(tile);
                *slot = self.tiles.len();
            }
            None => log::warn!(
                "tile {} is outside the {} tiles of \"{}\", dropped",
                tile.id,
                self.tile_count,
                self.name
            ),
        }
    }

    // Completes the tile table: explicit atlas tiles get their region
    // filled in, IDs never spelled out get a plain entry. Collection
    // sets have no atlas, so synthesized entries keep a zero position.
    // Running it again is a no-op, which keeps re-parsing safe.
    fn fill_missing_tiles(&mut self) {
        let image_path = self.image_path.clone();
        for tile in &mut self.tiles {
            if tile.image_path.is_empty() {
                tile.image_path = image_path.clone();
                tile.image_size = self.tile_size;
                if self.column_count != 0 {
                    tile.image_position = Self::atlas_position(
                        tile.id,
                        self.column_count,
                        self.tile_size,
                        self.margin,
                        self.spacing,
                    );
                }
            }
        }

        for id in 0..self.tile_count {
            if self.tile_index[id as usize] != 0 {
                continue;
            }
            let mut tile = TileMeta {
                id,
                image_path: image_path.clone(),
                image_size: self.tile_size,
                ..TileMeta::default()
            };
            if self.column_count != 0 {
                tile.image_position = Self::atlas_position(
                    id,
                    self.column_count,
                    self.tile_size,
                    self.margin,
                    self.spacing,
                );
            }
            self.insert_tile(tile);
        }
    }

    fn atlas_position(id: u32, columns: u32, tile_size: Vec2u, margin: u32, spacing: u32) -> Vec2u {
        let column = id % columns;
        let row = id / columns;
        Vec2u::new(
            margin + column * (tile_size.x + spacing),
            margin + row * (tile_size.y + spacing),
        )
    }
}
