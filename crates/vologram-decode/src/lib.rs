//! Decode vologram geometry headers and per-frame mesh blocks.
//!
//! This crate provides pure synchronous decoding for the uncompressed vologram
//! geometry container: one header file plus a sequence file of frame blocks.
//! It does no I/O; callers hand it bytes and own the buffers it fills.
//!
//! # Design principles
//!
//! - **Synchronous**: No async, no threading primitives
//! - **Checked**: Every sub-block is length-validated before it is read
//! - **Atomic**: A frame either decodes completely or leaves the mesh alone
//!
//! # Key functions
//!
//! - [`Header::from_bytes`]: Parse per-session metadata
//! - [`FrameRecord::parse`]: Split a frame block into its sub-blocks
//! - [`unpack_vertices`]: Position triples remapped into render axes
//! - [`unpack_normals`]: Normal triples remapped into render axes
//! - [`unpack_tex_coords`]: UV pairs with V flipped
//! - [`unpack_indices`]: Triangle list with width selection and winding flip
//! - [`assemble`]: Update [`MeshBuffers`] from a keyframe or delta frame
//! - [`calibrate`]: One-time placement transform from the header

mod error;
mod reader;

pub mod calibration;
pub mod frame;
pub mod header;
pub mod indices;
pub mod mesh;
pub mod normals;
pub mod texcoords;
pub mod vertices;

pub use calibration::{Calibration, METERS_TO_CENTIMETERS, calibrate};
pub use error::{DecodeError, DecodeResult};
pub use frame::{FRAME_PREFIX_SIZE, FrameBuilder, FramePrefix, FrameRecord};
pub use header::Header;
pub use indices::{IndexWidth, unpack_indices};
pub use mesh::{DecodedFrame, MeshBuffers, PLACEHOLDER_TANGENT, Topology, assemble, decode_frame};
pub use normals::{normals_as_colors, unpack_normals};
pub use texcoords::unpack_tex_coords;
pub use vertices::{remap_axes, unpack_vertices};
