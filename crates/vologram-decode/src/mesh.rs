//! Mesh assembly from frame records.
//!
//! A frame is decoded into a [`DecodedFrame`] first and only then committed to
//! the [`MeshBuffers`], so a corrupt block never leaves half-written buffers.

use glam::{Vec2, Vec3, Vec4};

use crate::error::{DecodeError, DecodeResult};
use crate::frame::FrameRecord;
use crate::header::Header;
use crate::indices::unpack_indices;
use crate::normals::{normals_as_colors, unpack_normals};
use crate::texcoords::unpack_tex_coords;
use crate::vertices::unpack_vertices;

/// Tangent written for every vertex; lighting here does not use tangent space.
pub const PLACEHOLDER_TANGENT: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);

/// Vertex and index buffers for the single mesh section of a vologram.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<Vec4>,
    pub uvs: Vec<Vec2>,
    pub tangents: Vec<Vec4>,
    /// Triangle list, already in render winding.
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Drop every buffer.
    pub fn clear(&mut self) {
        self.clear_intermediate();
        self.uvs.clear();
        self.tangents.clear();
        self.indices.clear();
    }

    /// Drop the buffers a delta frame replaces.
    pub fn clear_intermediate(&mut self) {
        self.vertices.clear();
        self.normals.clear();
        self.colors.clear();
    }

    /// Whether keyframe topology is loaded.
    #[must_use]
    pub fn has_topology(&self) -> bool {
        !self.indices.is_empty()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Commit a decoded frame.
    ///
    /// Keyframes replace everything; delta frames replace positions, normals
    /// and colors and keep the topology of the last keyframe.
    pub fn apply(&mut self, frame: DecodedFrame) {
        self.vertices = frame.vertices;
        self.normals = frame.normals;
        self.colors = frame.colors;
        if let Some(topology) = frame.topology {
            self.uvs = topology.uvs;
            self.indices = topology.indices;
            self.tangents = vec![PLACEHOLDER_TANGENT; self.vertices.len()];
        }
    }
}

/// Keyframe-only part of a decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

/// A fully validated frame, ready to commit.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    pub frame_index: u32,
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<Vec4>,
    /// Present for keyframes only.
    pub topology: Option<Topology>,
}

impl DecodedFrame {
    #[must_use]
    pub fn is_keyframe(&self) -> bool {
        self.topology.is_some()
    }
}

/// Decode a frame record against the mesh it will update.
///
/// `prior` is only read: a delta frame must have as many vertices as the
/// keyframe whose topology it reuses.
pub fn decode_frame(
    record: &FrameRecord,
    prior: &MeshBuffers,
    header: &Header,
) -> DecodeResult<DecodedFrame> {
    let vertices = unpack_vertices(record.vertex_bytes())?;
    let vertex_count = vertices.len();

    let normals = match record.normal_bytes() {
        Some(bytes) if header.normals_present() => unpack_normals(bytes, vertex_count)?,
        _ => Vec::new(),
    };
    let colors = normals_as_colors(&normals);

    let topology = if record.is_keyframe() {
        let uvs = unpack_tex_coords(record.uv_bytes().unwrap_or_default(), vertex_count)?;
        let indices = unpack_indices(record.index_bytes().unwrap_or_default(), vertex_count)?;
        Some(Topology { uvs, indices })
    } else {
        if prior.has_topology() && prior.uvs.len() != vertex_count {
            return Err(DecodeError::CountMismatch {
                what: "delta vertices",
                expected: prior.uvs.len(),
                found: vertex_count,
            });
        }
        None
    };

    Ok(DecodedFrame {
        frame_index: record.frame_index(),
        vertices,
        normals,
        colors,
        topology,
    })
}

/// Decode `record` and commit it to `buffers`.
///
/// On error `buffers` is left untouched.
pub fn assemble(record: &FrameRecord, buffers: &mut MeshBuffers, header: &Header) -> DecodeResult<()> {
    let frame = decode_frame(record, buffers, header)?;
    buffers.apply(frame);
    Ok(())
}
