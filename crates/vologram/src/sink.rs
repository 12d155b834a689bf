//! Host side of mesh updates.

use glam::Affine3A;
use vologram_decode::MeshBuffers;

use crate::error::ResourceError;

/// Scene object that displays the assembled mesh.
///
/// The player borrows a sink for each call, so hosts can wrap short-lived
/// engine borrows.
pub trait MeshSink {
    /// Replace the mesh section, topology included. Called for keyframes.
    fn rebuild_section(&mut self, mesh: &MeshBuffers) -> Result<(), ResourceError>;

    /// Update positions, normals and colors of the existing section. Called
    /// for delta frames; uvs, indices and tangents are unchanged.
    fn update_section(&mut self, mesh: &MeshBuffers) -> Result<(), ResourceError>;

    /// Current transform of the hosting object.
    fn transform(&self) -> Affine3A;

    /// Move the hosting object.
    fn set_transform(&mut self, transform: Affine3A);
}
