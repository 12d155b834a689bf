//! Normal vector unpacking.

use glam::{Vec3, Vec4};

use crate::error::{DecodeError, DecodeResult};
use crate::reader::{check_stride, le_f32};
use crate::vertices::{POSITION_STRIDE, remap_axes};

/// Unpack per-vertex normals.
///
/// Normals use the same packing and axis remap as positions. The count must
/// match `vertex_count`.
pub fn unpack_normals(packed: &[u8], vertex_count: usize) -> DecodeResult<Vec<Vec3>> {
    let count = check_stride("normals", packed, POSITION_STRIDE)?;
    if count != vertex_count {
        return Err(DecodeError::CountMismatch {
            what: "normals",
            expected: vertex_count,
            found: count,
        });
    }
    Ok(packed
        .chunks_exact(POSITION_STRIDE)
        .map(|c| remap_axes(le_f32(&c[0..4]), le_f32(&c[4..8]), le_f32(&c[8..12])))
        .collect())
}

/// Vertex colors derived from normals.
///
/// Volograms ship their normals into the color channel as well, which lets a
/// material visualize them directly. Alpha is always 1.
#[must_use]
pub fn normals_as_colors(normals: &[Vec3]) -> Vec<Vec4> {
    normals.iter().map(|n| n.extend(1.0)).collect()
}
