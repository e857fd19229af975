//! Small geometry types shared by the whole document model.
#![allow(missing_docs)]

/// Two component vector.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Vector2<T> {
    pub x: T,
    pub y: T,
}

impl<T> Vector2<T> {
    /// Creates a vector from its components.
    pub fn new(x: T, y: T) -> Self {
        Vector2 { x, y }
    }
}

/// Vector with `f32` components.
pub type Vec2f = Vector2<f32>;
/// Vector with `i32` components.
pub type Vec2i = Vector2<i32>;
/// Vector with `u32` components.
pub type Vec2u = Vector2<u32>;

/// Axis aligned rectangle.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Rect<T> {
    pub x: T,
    pub y: T,
    pub width: T,
    pub height: T,
}

impl<T> Rect<T> {
    /// Creates a rectangle from its position and size.
    pub fn new(x: T, y: T, width: T, height: T) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}
