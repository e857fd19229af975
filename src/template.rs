//! Object template resolution.
//!
//! The editor stores reusable object presets in .tx files. A placed
//! object referencing one only writes its own overrides, so the missing
//! fields are filled in from the template here. Template files are
//! parsed once per map and cached under their resolved path.

use crate::error::Error;
use crate::geom::Vec2f;
use crate::map::ParseContext;
use crate::object::{Object, Shape, TextData};
use crate::path;
use crate::tileset::Tileset;
use crate::xml;

/// Merges the template at `template_path` into `object`. Failures only
/// cost the template, the object keeps its own values.
pub(crate) fn apply(object: &mut Object, template_path: &str, ctx: &mut ParseContext) {
    let resolved = path::resolve(template_path, &ctx.working_dir);
    if !ctx.template_objects.contains_key(&resolved) {
        if let Err(err) = load(&resolved, ctx) {
            log::warn!("template {} skipped: {}", resolved, err);
            return;
        }
    }
    if let Some(tileset) = ctx.template_tilesets.get(&resolved) {
        object.tileset_name = tileset.name.clone();
    }
    if let Some(template) = ctx.template_objects.get(&resolved) {
        merge(object, template);
    }
}

fn load(resolved: &str, ctx: &mut ParseContext) -> Result<(), Error> {
    let text = std::fs::read_to_string(resolved).map_err(|source| Error::Io {
        path: resolved.into(),
        source,
    })?;
    let doc = roxmltree::Document::parse(&text)?;
    let root = doc.root_element();
    if !root.has_tag_name("template") {
        return Err(Error::Structure(format!(
            "{} has no <template> node",
            resolved
        )));
    }
    let object_node = xml::child(root, "object")
        .ok_or_else(|| Error::Structure(format!("{} has no <object> node", resolved)))?;

    // Claim the cache slot before parsing the tileset, so a collision
    // object inside it referencing this same template cannot re-enter
    // this load.
    ctx.template_objects.insert(resolved.to_owned(), Object::default());

    if let Some(tileset_node) = xml::child(root, "tileset") {
        let dir = path::dirname(resolved);
        match Tileset::parse(tileset_node, &dir, ctx) {
            Ok(tileset) => {
                ctx.template_tilesets.insert(resolved.to_owned(), tileset);
            }
            Err(err) => log::warn!("tileset of template {} skipped: {}", resolved, err),
        }
    }

    let mut template_object = Object::default();
    template_object.parse_into(object_node);
    ctx.template_objects.insert(resolved.to_owned(), template_object);
    Ok(())
}

// A placed object only stores what differs from the type defaults, so
// any field still at its default takes the template's value. The ID is
// the exception: it always belongs to the placed object.
fn merge(object: &mut Object, template: &Object) {
    if object.name.is_empty() {
        object.name = template.name.clone();
    }
    if object.class.is_empty() {
        object.class = template.class.clone();
    }
    if object.position == Vec2f::default() {
        object.position = template.position;
    }
    object.bounds.x = object.position.x;
    object.bounds.y = object.position.y;
    if object.bounds.width == 0.0 {
        object.bounds.width = template.bounds.width;
    }
    if object.bounds.height == 0.0 {
        object.bounds.height = template.bounds.height;
    }
    if object.rotation == 0.0 {
        object.rotation = template.rotation;
    }
    if object.tile_gid == 0 {
        object.tile_gid = template.tile_gid;
        object.flip = template.flip;
    }
    if object.visible {
        object.visible = template.visible;
    }
    if object.shape == Shape::Rectangle {
        object.shape = template.shape;
    }
    if object.points.is_empty() {
        object.points = template.points.clone();
    }
    merge_text(&mut object.text, &template.text);
    for property in &template.properties {
        if !object.properties.iter().any(|p| p.name == property.name) {
            object.properties.push(property.clone());
        }
    }
}

fn merge_text(text: &mut TextData, template: &TextData) {
    let defaults = TextData::default();
    if text.font_family.is_empty() {
        text.font_family = template.font_family.clone();
    }
    if text.pixel_size == defaults.pixel_size {
        text.pixel_size = template.pixel_size;
    }
    if !text.wrap {
        text.wrap = template.wrap;
    }
    if text.colour == defaults.colour {
        text.colour = template.colour;
    }
    if !text.bold {
        text.bold = template.bold;
    }
    if !text.italic {
        text.italic = template.italic;
    }
    if !text.underline {
        text.underline = template.underline;
    }
    if !text.strikethrough {
        text.strikethrough = template.strikethrough;
    }
    if text.kerning {
        text.kerning = template.kerning;
    }
    if text.h_align == defaults.h_align {
        text.h_align = template.h_align;
    }
    if text.v_align == defaults.v_align {
        text.v_align = template.v_align;
    }
    if text.content.is_empty() {
        text.content = template.content.clone();
    }
}
