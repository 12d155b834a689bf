//! Playback controller.
//!
//! [`Player`] owns the playback clock and the mesh buffers, pulls frames from
//! its geometry and video decoders, and pushes results into host sinks that
//! are borrowed for each call.
//!
//! ```text
//! Unloaded --load--> MetaLoaded --play--> Playing --last frame--> Looped
//!     ^                                      ^                      |
//!     +------------------close---------------+------next advance----+
//! ```

use glam::Affine3A;
use vologram_decode::{Header, MeshBuffers, calibrate, decode_frame};

use crate::error::{LoadError, PlayerError, RangeError, Result};
use crate::geometry::GeometryDecoder;
use crate::observer::{PlaybackEvent, PlaybackObserver, TracingObserver};
use crate::settings::{FrameSkip, PlayerSettings, SessionPaths};
use crate::sink::MeshSink;
use crate::texture::{TextureHandle, TextureSink, TextureSync};
use crate::video::{FALLBACK_FPS, VideoDecoder, effective_fps};

/// Coarse player state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    /// No session is open.
    Unloaded,
    /// A session is open and the clock is stopped.
    MetaLoaded,
    /// The clock is running.
    Playing,
    /// The last advance wrapped back to frame 0.
    Looped,
}

/// Clock and bookkeeping for the open session.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Frame the clock is on.
    pub current_frame: u32,
    /// Seconds accumulated towards the next frame.
    pub frame_timer: f64,
    pub fps: f64,
    pub playing: bool,
    pub looping: bool,
    /// Most recently assembled keyframe.
    pub last_keyframe_index: Option<u32>,
    /// Most recently assembled frame.
    pub last_frame_index: Option<u32>,
    pub metadata_loaded: bool,
}

impl PlaybackState {
    fn new(settings: &PlayerSettings) -> Self {
        Self {
            current_frame: 0,
            frame_timer: 0.0,
            fps: settings.fallback_fps,
            playing: settings.playing,
            looping: settings.looping,
            last_keyframe_index: None,
            last_frame_index: None,
            metadata_loaded: false,
        }
    }

    #[must_use]
    pub fn seconds_per_frame(&self) -> f64 {
        1.0 / self.fps
    }
}

/// Result of asking for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUpdate {
    /// The frame was assembled and pushed to the mesh sink.
    Shown { keyframe: bool },
    /// The frame is not a keyframe and only keyframes were requested.
    Skipped,
}

/// Plays a vologram from a geometry decoder and a video decoder.
pub struct Player<G, V> {
    settings: PlayerSettings,
    geometry: G,
    video: V,
    state: PlaybackState,
    mesh: MeshBuffers,
    texture: TextureSync,
    observer: Box<dyn PlaybackObserver + Send + Sync>,
    calibrated: bool,
    /// Host transform captured before the first calibration.
    base_transform: Option<Affine3A>,
    looped: bool,
    finished: bool,
    /// Frame 0 has been requested for this session.
    started: bool,
}

impl<G, V> std::fmt::Debug for Player<G, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("vertices", &self.mesh.vertex_count())
            .field("calibrated", &self.calibrated)
            .finish_non_exhaustive()
    }
}

impl<G: GeometryDecoder, V: VideoDecoder> Player<G, V> {
    pub fn new(geometry: G, video: V, mut settings: PlayerSettings) -> Self {
        settings.fallback_fps = effective_fps(settings.fallback_fps, FALLBACK_FPS);
        Self {
            state: PlaybackState::new(&settings),
            texture: TextureSync::new(settings.texture_parameter.clone()),
            settings,
            geometry,
            video,
            mesh: MeshBuffers::default(),
            observer: Box::new(TracingObserver),
            calibrated: false,
            base_transform: None,
            looped: false,
            finished: false,
            started: false,
        }
    }

    /// Report events to `observer` instead of `tracing`.
    #[must_use]
    pub fn with_observer(mut self, observer: impl PlaybackObserver + Send + Sync + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    #[must_use]
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    #[must_use]
    pub fn mesh(&self) -> &MeshBuffers {
        &self.mesh
    }

    #[must_use]
    pub fn header(&self) -> Option<&Header> {
        self.geometry.header()
    }

    #[must_use]
    pub fn frame_count(&self) -> u32 {
        self.geometry.frame_count()
    }

    #[must_use]
    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture.texture()
    }

    #[must_use]
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    #[must_use]
    pub fn phase(&self) -> PlaybackPhase {
        if !self.state.metadata_loaded {
            PlaybackPhase::Unloaded
        } else if self.looped {
            PlaybackPhase::Looped
        } else if self.state.playing {
            PlaybackPhase::Playing
        } else {
            PlaybackPhase::MetaLoaded
        }
    }

    pub fn play(&mut self) {
        self.state.playing = true;
    }

    pub fn pause(&mut self) {
        self.state.playing = false;
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.state.looping = looping;
        self.finished = false;
    }

    /// Point the player at another vologram. The open session is closed; the
    /// next [`advance`](Self::advance) or [`set_frame`](Self::set_frame) loads
    /// the new one.
    pub fn set_paths(&mut self, paths: SessionPaths) {
        self.close();
        self.settings.paths = Some(paths);
    }

    /// Open a vologram and pre-roll its first video frame.
    pub fn load(&mut self, paths: SessionPaths, textures: &mut dyn TextureSink) -> Result<()> {
        self.set_paths(paths);
        self.load_session(textures)
    }

    /// Show frame `index` without moving the clock.
    ///
    /// With `only_if_keyframe`, non-keyframes succeed without doing anything.
    /// Loads the session first if needed, and applies the calibration the
    /// first time a session is shown.
    pub fn set_frame(
        &mut self,
        index: u32,
        only_if_keyframe: bool,
        mesh: &mut dyn MeshSink,
        textures: &mut dyn TextureSink,
    ) -> Result<FrameUpdate> {
        if !self.state.metadata_loaded {
            self.load_session(textures)?;
        }
        self.started = true;
        self.update_frame(index, only_if_keyframe, mesh)
    }

    /// Move the clock forward by `dt` seconds.
    ///
    /// At most one frame interval is consumed per call unless the settings
    /// enable [`FrameSkip::ToKeyframes`]. Failures are reported to the
    /// observer; playback carries on with the last good frame.
    pub fn advance(&mut self, dt: f64, mesh: &mut dyn MeshSink, textures: &mut dyn TextureSink) {
        if !self.state.metadata_loaded {
            if self.settings.paths.is_some() {
                // Load failures were already reported.
                if let Err(error) = self.set_frame(0, false, mesh, textures) {
                    if self.state.metadata_loaded {
                        self.emit(&PlaybackEvent::FrameFailed { frame: 0, error: &error });
                    }
                }
            }
            return;
        }

        let frame_count = self.geometry.frame_count();
        if frame_count < 1 {
            return;
        }

        // The first tick of a session shows frame 0, whose video is pre-rolled.
        if !self.started {
            self.started = true;
            if let Err(error) = self.update_frame(0, false, mesh) {
                self.emit(&PlaybackEvent::FrameFailed { frame: 0, error: &error });
            }
            return;
        }

        if !self.state.playing {
            return;
        }

        let spf = self.state.seconds_per_frame();
        self.state.frame_timer += dt.max(0.0);
        if self.state.frame_timer < spf {
            return;
        }
        self.state.frame_timer -= spf;

        let last = frame_count - 1;
        if self.state.current_frame < last {
            let mut steps = 1;
            if self.settings.frame_skip == FrameSkip::ToKeyframes {
                let pending = (self.state.frame_timer / spf).floor();
                self.state.frame_timer -= pending * spf;
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let pending = pending.min(f64::from(u32::MAX)) as u32;
                steps += pending;
            }
            let target = (self.state.current_frame.saturating_add(steps)).min(last);
            self.step_to(target, mesh, textures);
        } else if self.state.looping {
            self.restart_loop(mesh, textures);
        } else if !self.finished {
            self.finished = true;
            self.emit(&PlaybackEvent::Finished);
        }
    }

    /// Close the session. Safe to call at any time, any number of times.
    pub fn close(&mut self) {
        let was_loaded = self.state.metadata_loaded;
        self.geometry.close();
        if let Err(error) = self.video.close() {
            tracing::warn!("Failed to close video: {}", error);
        }
        self.reset_session();
        if was_loaded {
            self.emit(&PlaybackEvent::Closed);
        }
    }

    /// Forget the session. Play and loop choices made by the host survive.
    fn reset_session(&mut self) {
        self.mesh.clear();
        self.texture.reset();
        self.state = PlaybackState {
            playing: self.state.playing,
            looping: self.state.looping,
            ..PlaybackState::new(&self.settings)
        };
        self.calibrated = false;
        self.looped = false;
        self.finished = false;
        self.started = false;
    }

    fn emit(&mut self, event: &PlaybackEvent<'_>) {
        self.observer.on_event(event);
    }

    /// Open geometry and video for the configured paths.
    fn load_session(&mut self, textures: &mut dyn TextureSink) -> Result<()> {
        match self.open_session(textures) {
            Ok(()) => {
                let frame_count = self.geometry.frame_count();
                let fps = self.state.fps;
                self.emit(&PlaybackEvent::Loaded { frame_count, fps });
                Ok(())
            }
            Err(error) => {
                self.geometry.close();
                // The decoder error is the one worth reporting.
                let _ = self.video.close();
                self.emit(&PlaybackEvent::LoadFailed { error: &error });
                Err(error)
            }
        }
    }

    fn open_session(&mut self, textures: &mut dyn TextureSink) -> Result<()> {
        let paths = self.settings.paths.clone().ok_or(LoadError::NoPaths)?;

        // Drop anything left over from a previous session.
        self.geometry.close();
        self.video.close()?;
        self.reset_session();

        self.video.open(&paths.video)?;
        self.upload_next_video_frame(textures);
        self.state.fps = effective_fps(self.video.frame_rate(), self.settings.fallback_fps);

        self.geometry.open(&paths.header, &paths.sequence)?;
        self.state.metadata_loaded = true;
        Ok(())
    }

    /// Apply the header's placement to the host once per session.
    fn apply_calibration(&mut self, mesh: &mut dyn MeshSink) {
        if self.calibrated {
            return;
        }
        let Some(header) = self.geometry.header() else {
            return;
        };
        let base = *self.base_transform.get_or_insert_with(|| mesh.transform());
        let transform = calibrate(header, self.settings.unit_scale, base);
        mesh.set_transform(transform);
        self.calibrated = true;
        self.emit(&PlaybackEvent::Calibrated { transform });
    }

    /// Decode frame `index` and push it to the mesh sink, calibrating the
    /// host first if this session has not done so yet.
    fn update_frame(
        &mut self,
        index: u32,
        only_if_keyframe: bool,
        mesh: &mut dyn MeshSink,
    ) -> Result<FrameUpdate> {
        self.apply_calibration(mesh);

        let frame_count = self.geometry.frame_count();
        if index >= frame_count {
            return Err(RangeError { index, frame_count }.into());
        }
        if only_if_keyframe && !self.geometry.is_keyframe(index)? {
            return Ok(FrameUpdate::Skipped);
        }

        let header = *self.geometry.header().ok_or(LoadError::NotOpen)?;
        let record = self.geometry.read_frame(index)?;
        let frame = decode_frame(&record, &self.mesh, &header)?;
        let keyframe = frame.is_keyframe();
        let shown = frame.frame_index;
        self.mesh.apply(frame);

        if keyframe {
            mesh.rebuild_section(&self.mesh)?;
            self.state.last_keyframe_index = Some(shown);
        } else {
            mesh.update_section(&self.mesh)?;
        }
        self.state.last_frame_index = Some(shown);
        self.emit(&PlaybackEvent::FrameShown { frame: shown, keyframe });
        Ok(FrameUpdate::Shown { keyframe })
    }

    /// Move the clock to `target`, dropping non-keyframes on the way.
    fn step_to(&mut self, target: u32, mesh: &mut dyn MeshSink, textures: &mut dyn TextureSink) {
        let mut skipped = 0;
        while self.state.current_frame + 1 < target {
            self.state.current_frame += 1;
            let frame = self.state.current_frame;
            match self.update_frame(frame, true, mesh) {
                Ok(FrameUpdate::Skipped) => skipped += 1,
                Ok(FrameUpdate::Shown { .. }) => {}
                Err(error) => self.emit(&PlaybackEvent::FrameFailed { frame, error: &error }),
            }
            // Keep the color stream in step even for dropped frames.
            if let Err(error) = self.video.decode_next_frame() {
                let error = PlayerError::from(error);
                self.emit(&PlaybackEvent::TextureFailed { error: &error });
            }
        }
        if skipped > 0 {
            self.emit(&PlaybackEvent::FramesSkipped { count: skipped });
        }

        self.state.current_frame = target;
        self.looped = false;
        if let Err(error) = self.update_frame(target, false, mesh) {
            self.emit(&PlaybackEvent::FrameFailed {
                frame: target,
                error: &error,
            });
        }
        self.upload_next_video_frame(textures);
    }

    /// Rewind to frame 0 by reopening the video.
    fn restart_loop(&mut self, mesh: &mut dyn MeshSink, textures: &mut dyn TextureSink) {
        if let Err(error) = self.reopen_video() {
            self.emit(&PlaybackEvent::LoopFailed { error: &error });
            return;
        }
        self.upload_next_video_frame(textures);
        self.state.fps = effective_fps(self.video.frame_rate(), self.settings.fallback_fps);

        self.state.current_frame = 0;
        self.state.frame_timer = 0.0;
        self.looped = true;
        self.emit(&PlaybackEvent::Looped);

        if let Err(error) = self.update_frame(0, false, mesh) {
            self.emit(&PlaybackEvent::FrameFailed { frame: 0, error: &error });
        }
    }

    fn reopen_video(&mut self) -> Result<()> {
        let paths = self.settings.paths.as_ref().ok_or(LoadError::NoPaths)?;
        self.video.close()?;
        self.video.open(&paths.video)?;
        Ok(())
    }

    /// Decode the next video frame into the texture; failures leave the
    /// previous texture up.
    fn upload_next_video_frame(&mut self, textures: &mut dyn TextureSink) {
        let result = self
            .video
            .decode_next_frame()
            .map_err(PlayerError::from)
            .and_then(|frame| Ok(self.texture.update(textures, &frame)?));
        if let Err(error) = result {
            self.emit(&PlaybackEvent::TextureFailed { error: &error });
        }
    }
}
