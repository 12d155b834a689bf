//! Geometry header parsing.

use glam::Vec3;

use crate::error::{DecodeError, DecodeResult};
use crate::reader::Reader;

/// Magic bytes at the start of every header file.
pub const MAGIC: [u8; 4] = *b"VOLS";

/// First format version whose frames carry a normals sub-block.
pub const NORMALS_MIN_VERSION: i32 = 11;

/// Per-session geometry metadata.
///
/// # Layout
///
/// ```text
/// 0x00: magic        [u8; 4] = "VOLS"
/// 0x04: frame_count  i32
/// 0x08: scale        f32
/// 0x0C: translation  f32 × 3
/// 0x18: rotation     f32 × 4 (w, x, y, z)
/// 0x28: has_normals  u8
/// 0x29: version      i32
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Header {
    /// Number of frames in the sequence file.
    pub frame_count: u32,
    /// Uniform scale of the capture.
    pub scale: f32,
    /// Capture translation in source axes.
    pub translation: Vec3,
    /// Capture rotation, scalar first: `[w, x, y, z]`.
    pub rotation: [f32; 4],
    /// Whether frames were exported with normals.
    pub has_normals: bool,
    /// Container format version.
    pub format_version: i32,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            frame_count: 0,
            scale: 1.0,
            translation: Vec3::ZERO,
            rotation: [1.0, 0.0, 0.0, 0.0],
            has_normals: false,
            format_version: NORMALS_MIN_VERSION,
        }
    }
}

impl Header {
    pub const SIZE: usize = 45;

    /// Whether each frame block carries a normals sub-block.
    ///
    /// Containers older than version 11 may set the flag without writing
    /// normals, so both conditions are required.
    #[must_use]
    pub fn normals_present(&self) -> bool {
        self.has_normals && self.format_version >= NORMALS_MIN_VERSION
    }

    /// Read header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> DecodeResult<Self> {
        let mut reader = Reader::new(bytes);

        let magic = reader.array::<4>("header magic")?;
        if magic != MAGIC {
            return Err(DecodeError::BadMagic { found: magic });
        }

        let frame_count = reader.i32("frame_count")?;
        let frame_count = u32::try_from(frame_count).map_err(|_| DecodeError::InvalidHeader {
            field: "frame_count",
            reason: format!("{frame_count} is negative"),
        })?;

        let scale = reader.f32("scale")?;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(DecodeError::InvalidHeader {
                field: "scale",
                reason: format!("{scale} is not a positive number"),
            });
        }

        let translation = Vec3::new(
            reader.f32("translation")?,
            reader.f32("translation")?,
            reader.f32("translation")?,
        );
        let rotation = [
            reader.f32("rotation")?,
            reader.f32("rotation")?,
            reader.f32("rotation")?,
            reader.f32("rotation")?,
        ];

        let has_normals = match reader.u8("has_normals")? {
            0 => false,
            1 => true,
            other => {
                return Err(DecodeError::InvalidHeader {
                    field: "has_normals",
                    reason: format!("{other} is not a boolean"),
                });
            }
        };
        let format_version = reader.i32("version")?;

        Ok(Self {
            frame_count,
            scale,
            translation,
            rotation,
            has_normals,
            format_version,
        })
    }

    /// Write header to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&MAGIC);
        // Counts beyond i32::MAX cannot be represented by the container.
        let frame_count = i32::try_from(self.frame_count).unwrap_or(i32::MAX);
        bytes[4..8].copy_from_slice(&frame_count.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.scale.to_le_bytes());
        for (i, value) in self.translation.to_array().iter().enumerate() {
            let at = 12 + i * 4;
            bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
        }
        for (i, value) in self.rotation.iter().enumerate() {
            let at = 24 + i * 4;
            bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
        }
        bytes[40] = u8::from(self.has_normals);
        bytes[41..45].copy_from_slice(&self.format_version.to_le_bytes());
        bytes
    }
}
