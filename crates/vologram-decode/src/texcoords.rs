//! Texture coordinate unpacking.

use glam::Vec2;

use crate::error::{DecodeError, DecodeResult};
use crate::reader::{check_stride, le_f32};

/// Bytes per packed texture coordinate (two `f32`).
pub const UV_STRIDE: usize = 8;

/// Unpack texture coordinates, one per vertex.
///
/// V is flipped (`v' = 1 - v`): captures put the origin at the bottom of the
/// image, the render target at the top.
pub fn unpack_tex_coords(packed: &[u8], vertex_count: usize) -> DecodeResult<Vec<Vec2>> {
    let count = check_stride("uvs", packed, UV_STRIDE)?;
    if count != vertex_count {
        return Err(DecodeError::CountMismatch {
            what: "uvs",
            expected: vertex_count,
            found: count,
        });
    }
    Ok(packed
        .chunks_exact(UV_STRIDE)
        .map(|c| Vec2::new(le_f32(&c[0..4]), 1.0 - le_f32(&c[4..8])))
        .collect())
}
