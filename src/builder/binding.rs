//! Attribute binding inference
//!
//! Databases store normals, colors and texture coordinates as flat arrays
//! without saying how they map onto vertices. The mapping is recovered from
//! the array lengths alone.

use crate::scene::Binding;

/// Decide the binding of an attribute array of length `count`
///
/// - `count == vertex_count` gives [`Binding::PerVertex`]
/// - `count == primitive_count` gives [`Binding::PerPrimitive`]
/// - `count == 1` gives [`Binding::Overall`]
///
/// The rules are tried in that order. Any other length, zero included, has
/// no binding and yields `None`.
pub fn infer_binding(count: usize, vertex_count: usize, primitive_count: usize) -> Option<Binding> {
    if count == 0 {
        None
    } else if count == vertex_count {
        Some(Binding::PerVertex)
    } else if count == primitive_count {
        Some(Binding::PerPrimitive)
    } else if count == 1 {
        Some(Binding::Overall)
    } else {
        None
    }
}
