//! Player configuration.

use std::path::PathBuf;

use vologram_decode::METERS_TO_CENTIMETERS;

use crate::texture::DEFAULT_TEXTURE_PARAMETER;
use crate::video::FALLBACK_FPS;

/// Files that make up one vologram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPaths {
    pub header: PathBuf,
    pub sequence: PathBuf,
    pub video: PathBuf,
}

impl SessionPaths {
    pub fn new(
        header: impl Into<PathBuf>,
        sequence: impl Into<PathBuf>,
        video: impl Into<PathBuf>,
    ) -> Self {
        Self {
            header: header.into(),
            sequence: sequence.into(),
            video: video.into(),
        }
    }
}

/// How the clock treats ticks longer than one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FrameSkip {
    /// Advance at most one frame per tick; slow hosts play back slower.
    #[default]
    Disabled,
    /// Consume every pending frame interval, assembling only keyframes on the
    /// way and the final frame in full.
    ToKeyframes,
}

/// Settings for a player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSettings {
    /// Files to load. `None` until the host picks a vologram.
    pub paths: Option<SessionPaths>,
    /// Start playing once loaded.
    pub playing: bool,
    /// Wrap to frame 0 after the last frame.
    pub looping: bool,
    /// Capture unit to scene unit factor.
    pub unit_scale: f32,
    /// Material parameter the color texture binds to.
    pub texture_parameter: String,
    /// Rate used when the video reports none.
    pub fallback_fps: f64,
    pub frame_skip: FrameSkip,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            paths: None,
            playing: true,
            looping: true,
            unit_scale: METERS_TO_CENTIMETERS,
            texture_parameter: DEFAULT_TEXTURE_PARAMETER.to_owned(),
            fallback_fps: FALLBACK_FPS,
            frame_skip: FrameSkip::Disabled,
        }
    }
}
