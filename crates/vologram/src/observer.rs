//! Playback event reporting.

use glam::Affine3A;

use crate::error::PlayerError;

/// Something notable the player did or failed to do.
#[derive(Debug)]
pub enum PlaybackEvent<'a> {
    /// A session opened.
    Loaded { frame_count: u32, fps: f64 },
    /// Opening a session failed; the player stays unloaded.
    LoadFailed { error: &'a PlayerError },
    /// The placement transform was applied to the host.
    Calibrated { transform: Affine3A },
    /// A frame was assembled and pushed to the mesh sink.
    FrameShown { frame: u32, keyframe: bool },
    /// A frame could not be shown; the previous mesh stays up.
    FrameFailed { frame: u32, error: &'a PlayerError },
    /// A video frame could not be decoded or uploaded; the texture is stale.
    TextureFailed { error: &'a PlayerError },
    /// Non-keyframes dropped to catch up with the clock.
    FramesSkipped { count: u32 },
    /// Playback wrapped to frame 0.
    Looped,
    /// Restarting a loop failed; playback holds the last frame.
    LoopFailed { error: &'a PlayerError },
    /// The last frame was reached with looping off.
    Finished,
    /// The session was closed.
    Closed,
}

/// Receives playback events.
pub trait PlaybackObserver {
    fn on_event(&mut self, event: &PlaybackEvent<'_>);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PlaybackObserver for TracingObserver {
    fn on_event(&mut self, event: &PlaybackEvent<'_>) {
        match event {
            PlaybackEvent::Loaded { frame_count, fps } => {
                tracing::info!(frame_count, fps, "Loaded vologram");
            }
            PlaybackEvent::LoadFailed { error } => {
                tracing::warn!("Failed to load vologram: {}", error);
            }
            PlaybackEvent::Calibrated { transform } => {
                tracing::debug!(?transform, "Applied capture calibration");
            }
            PlaybackEvent::FrameShown { frame, keyframe } => {
                tracing::trace!(frame, keyframe, "Showing frame");
            }
            PlaybackEvent::FrameFailed { frame, error } => {
                tracing::warn!(frame, "Failed to show frame: {}", error);
            }
            PlaybackEvent::TextureFailed { error } => {
                tracing::warn!("Failed to update texture: {}", error);
            }
            PlaybackEvent::FramesSkipped { count } => {
                tracing::debug!(count, "Skipped frames to catch up");
            }
            PlaybackEvent::Looped => tracing::debug!("Looped to frame 0"),
            PlaybackEvent::LoopFailed { error } => {
                tracing::warn!("Failed to restart playback: {}", error);
            }
            PlaybackEvent::Finished => tracing::info!("Playback finished"),
            PlaybackEvent::Closed => tracing::debug!("Closed vologram"),
        }
    }
}
