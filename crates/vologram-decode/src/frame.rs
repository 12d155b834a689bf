//! Per-frame block parsing.
//!
//! # Layout
//!
//! ```text
//! frame_number  i32
//! payload_size  u32   (bytes after the keyframe flag)
//! keyframe      u8
//! payload:
//!   vertices_size u32, vertices
//!   [normals_size u32, normals]              if the header has normals
//!   [indices_size u32, indices,
//!    uvs_size u32, uvs]                      if keyframe
//! ```

use std::ops::Range;

use glam::{Vec2, Vec3};

use crate::error::{DecodeError, DecodeResult};
use crate::header::Header;
use crate::indices::IndexWidth;
use crate::reader::Reader;

/// Size of the fixed prefix in front of every frame payload.
pub const FRAME_PREFIX_SIZE: usize = 9;

/// Fixed prefix of a frame block, enough to index a sequence file without
/// reading payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePrefix {
    pub frame_number: i32,
    pub payload_size: u32,
    pub is_keyframe: bool,
}

impl FramePrefix {
    /// Read prefix from bytes.
    pub fn from_bytes(bytes: &[u8]) -> DecodeResult<Self> {
        let mut reader = Reader::new(bytes);
        Ok(Self {
            frame_number: reader.i32("frame_number")?,
            payload_size: reader.u32("payload_size")?,
            // Any non-zero flag marks a keyframe.
            is_keyframe: reader.u8("keyframe")? != 0,
        })
    }

    /// Total size of the block this prefix introduces.
    #[must_use]
    pub fn block_size(&self) -> usize {
        FRAME_PREFIX_SIZE + self.payload_size as usize
    }
}

/// Raw block for one frame with the byte ranges of its sub-blocks.
///
/// Ranges index into the owned block, so each accessor is a plain slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRecord {
    frame_index: u32,
    is_keyframe: bool,
    data: Vec<u8>,
    vertices: Range<usize>,
    normals: Option<Range<usize>>,
    indices: Option<Range<usize>>,
    uvs: Option<Range<usize>>,
}

impl FrameRecord {
    /// Parse a complete frame block (prefix and payload) read from a sequence.
    pub fn parse(frame_index: u32, data: Vec<u8>, header: &Header) -> DecodeResult<Self> {
        let mut reader = Reader::new(&data);
        let prefix = FramePrefix::from_bytes(reader.take("frame prefix", FRAME_PREFIX_SIZE)?)?;

        if u32::try_from(prefix.frame_number).ok() != Some(frame_index) {
            return Err(DecodeError::FrameNumberMismatch {
                expected: frame_index,
                found: prefix.frame_number,
            });
        }

        let vertices = sub_block(&mut reader, "vertices")?;
        let normals = if header.normals_present() {
            Some(sub_block(&mut reader, "normals")?)
        } else {
            None
        };
        let (indices, uvs) = if prefix.is_keyframe {
            let indices = sub_block(&mut reader, "indices")?;
            let uvs = sub_block(&mut reader, "uvs")?;
            (Some(indices), Some(uvs))
        } else {
            (None, None)
        };

        let actual = reader.position() - FRAME_PREFIX_SIZE;
        if actual != prefix.payload_size as usize {
            return Err(DecodeError::PayloadMismatch {
                frame: frame_index,
                declared: prefix.payload_size as usize,
                actual,
            });
        }

        Ok(Self {
            frame_index,
            is_keyframe: prefix.is_keyframe,
            data,
            vertices,
            normals,
            indices,
            uvs,
        })
    }

    #[must_use]
    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    #[must_use]
    pub fn is_keyframe(&self) -> bool {
        self.is_keyframe
    }

    /// Packed `f32` position triples.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        &self.data[self.vertices.clone()]
    }

    /// Packed `f32` normal triples, when the stream has normals.
    #[must_use]
    pub fn normal_bytes(&self) -> Option<&[u8]> {
        self.normals.clone().map(|range| &self.data[range])
    }

    /// Packed triangle-list indices (keyframes only).
    #[must_use]
    pub fn index_bytes(&self) -> Option<&[u8]> {
        self.indices.clone().map(|range| &self.data[range])
    }

    /// Packed `f32` texture coordinate pairs (keyframes only).
    #[must_use]
    pub fn uv_bytes(&self) -> Option<&[u8]> {
        self.uvs.clone().map(|range| &self.data[range])
    }
}

fn sub_block(reader: &mut Reader<'_>, what: &'static str) -> DecodeResult<Range<usize>> {
    let size = reader.u32(what)? as usize;
    let start = reader.position();
    reader.take(what, size)?;
    Ok(start..start + size)
}

/// Encoder for frame blocks, used to author sequence files and fixtures.
///
/// Positions, normals and texture coordinates are written in source axes, and
/// triangles in source winding, exactly as an exporter would store them.
#[derive(Debug, Clone, Default)]
pub struct FrameBuilder {
    frame_number: u32,
    is_keyframe: bool,
    vertices: Vec<u8>,
    normals: Vec<u8>,
    indices: Vec<u8>,
    uvs: Vec<u8>,
}

impl FrameBuilder {
    #[must_use]
    pub fn keyframe(frame_number: u32) -> Self {
        Self {
            frame_number,
            is_keyframe: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn delta(frame_number: u32) -> Self {
        Self {
            frame_number,
            is_keyframe: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn vertices(mut self, positions: &[Vec3]) -> Self {
        self.vertices = positions
            .iter()
            .flat_map(|p| p.to_array())
            .flat_map(f32::to_le_bytes)
            .collect();
        self
    }

    #[must_use]
    pub fn normals(mut self, normals: &[Vec3]) -> Self {
        self.normals = normals
            .iter()
            .flat_map(|n| n.to_array())
            .flat_map(f32::to_le_bytes)
            .collect();
        self
    }

    #[must_use]
    pub fn uvs(mut self, uvs: &[Vec2]) -> Self {
        self.uvs = uvs
            .iter()
            .flat_map(|uv| uv.to_array())
            .flat_map(f32::to_le_bytes)
            .collect();
        self
    }

    /// Triangle-list indices, written at the width the current vertex count
    /// selects. Set vertices first.
    #[must_use]
    pub fn triangles(mut self, indices: &[u32]) -> Self {
        let vertex_count = self.vertices.len() / 12;
        self.indices = match IndexWidth::for_vertex_count(vertex_count) {
            IndexWidth::U16 => indices
                .iter()
                .flat_map(|&i| u16::try_from(i).unwrap_or(u16::MAX).to_le_bytes())
                .collect(),
            IndexWidth::U32 => indices.iter().flat_map(|i| i.to_le_bytes()).collect(),
        };
        self
    }

    /// Replace the vertex sub-block with raw bytes.
    #[must_use]
    pub fn raw_vertices(mut self, bytes: Vec<u8>) -> Self {
        self.vertices = bytes;
        self
    }

    /// Replace the index sub-block with raw bytes.
    #[must_use]
    pub fn raw_indices(mut self, bytes: Vec<u8>) -> Self {
        self.indices = bytes;
        self
    }

    /// Encode the block for a stream described by `header`.
    #[must_use]
    pub fn to_bytes(&self, header: &Header) -> Vec<u8> {
        let mut payload = Vec::new();
        push_sub_block(&mut payload, &self.vertices);
        if header.normals_present() {
            push_sub_block(&mut payload, &self.normals);
        }
        if self.is_keyframe {
            push_sub_block(&mut payload, &self.indices);
            push_sub_block(&mut payload, &self.uvs);
        }

        let frame_number = i32::try_from(self.frame_number).unwrap_or(i32::MAX);
        let payload_size = u32::try_from(payload.len()).unwrap_or(u32::MAX);

        let mut block = Vec::with_capacity(FRAME_PREFIX_SIZE + payload.len());
        block.extend_from_slice(&frame_number.to_le_bytes());
        block.extend_from_slice(&payload_size.to_le_bytes());
        block.push(u8::from(self.is_keyframe));
        block.extend_from_slice(&payload);
        block
    }
}

fn push_sub_block(out: &mut Vec<u8>, bytes: &[u8]) {
    let size = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(bytes);
}
