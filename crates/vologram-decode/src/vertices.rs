//! Vertex position unpacking.

use glam::Vec3;

use crate::error::DecodeResult;
use crate::reader::{check_stride, le_f32};

/// Bytes per packed position (three `f32`).
pub const POSITION_STRIDE: usize = 12;

/// Remap a vector from capture axes into render axes.
///
/// Captures use {+x right, +y up, +z forward}; the render target uses
/// {+x forward, +y right, +z up}, so `(x, y, z)` becomes `(z, x, y)`.
#[inline]
#[must_use]
pub fn remap_axes(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(z, x, y)
}

/// Unpack tightly packed little-endian position triples.
///
/// Output positions are already remapped with [`remap_axes`].
pub fn unpack_vertices(packed: &[u8]) -> DecodeResult<Vec<Vec3>> {
    check_stride("vertices", packed, POSITION_STRIDE)?;
    Ok(packed
        .chunks_exact(POSITION_STRIDE)
        .map(|c| remap_axes(le_f32(&c[0..4]), le_f32(&c[4..8]), le_f32(&c[8..12])))
        .collect())
}
