//! Index unpacking.

use crate::error::{DecodeError, DecodeResult};
use crate::reader::check_stride;

/// Vertex count from which indices are stored as `u32`.
pub const WIDE_INDEX_THRESHOLD: usize = 65_535;

/// Storage width of a keyframe's indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexWidth {
    U16,
    U32,
}

impl IndexWidth {
    /// Width used by exporters for a mesh of `vertex_count` vertices.
    #[must_use]
    pub fn for_vertex_count(vertex_count: usize) -> Self {
        if vertex_count >= WIDE_INDEX_THRESHOLD {
            Self::U32
        } else {
            Self::U16
        }
    }

    #[must_use]
    pub fn size(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// Unpack a triangle list and flip its winding.
///
/// The axis remap mirrors the mesh, so every triangle `(i0, i1, i2)` is
/// emitted as `(i0, i2, i1)` to keep front faces facing out.
pub fn unpack_indices(packed: &[u8], vertex_count: usize) -> DecodeResult<Vec<u32>> {
    let width = IndexWidth::for_vertex_count(vertex_count);
    let count = check_stride("indices", packed, width.size())?;
    if count % 3 != 0 {
        return Err(DecodeError::BadStride {
            what: "indices",
            size: packed.len(),
            stride: width.size() * 3,
        });
    }

    let raw: Vec<u32> = match width {
        IndexWidth::U16 => packed
            .chunks_exact(2)
            .map(|c| u32::from(u16::from_le_bytes([c[0], c[1]])))
            .collect(),
        IndexWidth::U32 => packed
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    };

    if let Some(&index) = raw.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(DecodeError::IndexOutOfRange {
            index,
            vertex_count,
        });
    }

    Ok(raw
        .chunks_exact(3)
        .flat_map(|tri| [tri[0], tri[2], tri[1]])
        .collect())
}
