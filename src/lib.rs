#![warn(missing_docs)]

//! Parser for the Tiled editor's TMX/TSX map formats.
//!
//! Loads a map document into a plain in-memory model: tilesets with
//! per tile metadata, the layer stack, objects and properties. Nothing
//! is rendered and no images are touched, the model pairs with any
//! renderer that can draw a texture region.
//!
//! ```no_run
//! use tmx_map::Map;
//!
//! # fn main() -> Result<(), tmx_map::Error> {
//! let map = Map::load("assets/town.tmx")?;
//! println!("{} layers over {} tilesets", map.layers.len(), map.tilesets.len());
//! if let Some((tileset, local_id)) = map.tileset_for(42) {
//!     println!("gid 42 is tile {} of \"{}\"", local_id, tileset.name);
//! }
//! # Ok(())
//! # }
//! ```

mod colour;
mod data;
mod error;
mod geom;
mod layer;
mod map;
mod object;
mod object_types;
pub mod path;
mod property;
mod template;
mod tileset;
mod xml;

pub use colour::Colour;
pub use data::{Tile, FLIP_DIAGONAL, FLIP_HORIZONTAL, FLIP_VERTICAL};
pub use error::Error;
pub use geom::{Rect, Vec2f, Vec2i, Vec2u, Vector2};
pub use layer::{
    Chunk, DrawOrder, ImageLayer, Layer, LayerGroup, LayerKind, ObjectGroup, TileData,
};
pub use map::{Map, Orientation, RenderOrder, StaggerAxis, StaggerIndex, Version};
pub use object::{HAlign, Object, Shape, TextData, VAlign};
pub use object_types::{ObjectType, ObjectTypes};
pub use property::{Property, PropertyValue};
pub use tileset::{Frame, ObjectAlignment, Terrain, TileMeta, Tileset};
