//! Attribute helpers over `roxmltree` nodes.
//!
//! Attributes fall back to a default when absent or unparseable, the
//! way the editor itself treats optional attributes. Callers that
//! require a value check the fallback themselves.

use std::str::FromStr;

use crate::colour::Colour;

/// Attribute parsed as `T`, or `default` when absent or unparseable.
pub(crate) fn attr_or<T: FromStr>(node: roxmltree::Node, name: &str, default: T) -> T {
    node.attribute(name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Attribute as a string slice, empty when absent.
pub(crate) fn attr_str<'a>(node: roxmltree::Node<'a, '_>, name: &str) -> &'a str {
    node.attribute(name).unwrap_or("")
}

/// Boolean attribute; accepts `1`/`true` and `0`/`false`.
pub(crate) fn attr_bool(node: roxmltree::Node, name: &str, default: bool) -> bool {
    match node.attribute(name) {
        Some("1") | Some("true") => true,
        Some("0") | Some("false") => false,
        _ => default,
    }
}

/// Colour attribute; malformed values are logged and dropped.
pub(crate) fn attr_colour(node: roxmltree::Node, name: &str) -> Option<Colour> {
    let raw = node.attribute(name)?;
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<Colour>() {
        Ok(colour) => Some(colour),
        Err(_) => {
            log::warn!(
                "ignoring malformed colour \"{}\" on <{}>",
                raw,
                node.tag_name().name()
            );
            None
        }
    }
}

/// The `class` attribute, with the pre-1.9 `type` spelling as fallback.
pub(crate) fn attr_class<'a>(node: roxmltree::Node<'a, '_>) -> &'a str {
    match node.attribute("class") {
        Some(v) => v,
        None => attr_str(node, "type"),
    }
}

/// First child element named `name`.
pub(crate) fn child<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children().find(|c| c.has_tag_name(name))
}
