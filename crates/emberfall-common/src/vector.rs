//! Vector and distance helpers.

pub use glam::Vec2;

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Unit vector in the direction of `v`, or the zero vector when `v` has no length.
#[must_use]
pub fn normalize(v: Vec2) -> Vec2 {
    let len = v.length();
    if len > 0.0 {
        v / len
    } else {
        Vec2::ZERO
    }
}

/// Rotates `v` by `radians` counter-clockwise.
#[must_use]
pub fn rotate(v: Vec2, radians: f32) -> Vec2 {
    let (sin, cos) = radians.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}
