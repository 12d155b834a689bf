//! One-time spatial alignment derived from the header.

use glam::{Affine3A, Quat, Vec3, Vec4};

use crate::Header;

/// Meters in the capture to centimeters in the render target.
pub const METERS_TO_CENTIMETERS: f32 = 100.0;

/// Capture placement mapped into render axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,
    /// Source unit to target unit factor, applied after placement.
    pub unit_scale: f32,
}

impl Calibration {
    /// Map the header's capture placement into render axes.
    ///
    /// Translation `(x, y, z)` maps to `(z, -x, y)`. The scalar-first rotation
    /// `(w, x, y, z)` maps to the quaternion `(z, -x, -w, y)`; captures are
    /// exported with w and z in swapped slots and this mapping undoes it.
    #[must_use]
    pub fn from_header(header: &Header, unit_scale: f32) -> Self {
        let t = header.translation;
        let [w, x, y, z] = header.rotation;
        let rotation = Vec4::new(z, -x, -w, y)
            .try_normalize()
            .map_or(Quat::IDENTITY, Quat::from_vec4);

        Self {
            translation: Vec3::new(t.z, -t.x, t.y),
            rotation,
            scale: header.scale,
            unit_scale,
        }
    }

    /// Scale, then rotate, then translate, then convert units.
    #[must_use]
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale(Vec3::splat(self.unit_scale))
            * Affine3A::from_translation(self.translation)
            * Affine3A::from_quat(self.rotation)
            * Affine3A::from_scale(Vec3::splat(self.scale))
    }

    /// Compose on top of the hosting object's existing transform.
    #[must_use]
    pub fn compose(&self, base: Affine3A) -> Affine3A {
        base * self.to_affine()
    }
}

/// Calibrate a header against `base` in one step.
#[must_use]
pub fn calibrate(header: &Header, unit_scale: f32, base: Affine3A) -> Affine3A {
    Calibration::from_header(header, unit_scale).compose(base)
}
