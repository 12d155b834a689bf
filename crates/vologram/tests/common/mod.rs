//! In-memory decoders and recording sinks for player tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use glam::{Affine3A, Vec2, Vec3};
use vologram::{
    GeometryDecoder, LoadError, PixelBuffer, PlaybackEvent, PlaybackObserver, Player,
    PlayerSettings, RangeError, ResourceError, SessionPaths, TextureHandle, TextureSink,
    VideoDecoder, VideoError,
};
use vologram_decode::{FrameBuilder, FrameRecord, Header, MeshBuffers};

/// Geometry held in memory as encoded frame blocks.
pub struct MockGeometry {
    header: Header,
    blocks: Vec<Vec<u8>>,
    open: bool,
    pub fail_open: Arc<AtomicBool>,
}

impl MockGeometry {
    pub fn new(header: Header, frames: &[FrameBuilder]) -> Self {
        Self {
            blocks: frames.iter().map(|f| f.to_bytes(&header)).collect(),
            header,
            open: false,
            fail_open: Arc::default(),
        }
    }
}

impl GeometryDecoder for MockGeometry {
    fn open(&mut self, header_path: &Path, _sequence_path: &Path) -> Result<Header, LoadError> {
        if self.open {
            return Err(LoadError::AlreadyOpen);
        }
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(LoadError::Io {
                path: header_path.to_path_buf(),
                source: std::io::ErrorKind::NotFound.into(),
            });
        }
        self.open = true;
        Ok(self.header)
    }

    fn header(&self) -> Option<&Header> {
        self.open.then_some(&self.header)
    }

    fn is_keyframe(&self, frame_index: u32) -> Result<bool, RangeError> {
        self.blocks
            .get(frame_index as usize)
            .filter(|_| self.open)
            .map(|block| block[8] != 0)
            .ok_or(RangeError {
                index: frame_index,
                frame_count: self.frame_count(),
            })
    }

    fn read_frame(&mut self, frame_index: u32) -> vologram::Result<FrameRecord> {
        if !self.open {
            return Err(LoadError::NotOpen.into());
        }
        let block = self.blocks.get(frame_index as usize).ok_or(RangeError {
            index: frame_index,
            frame_count: self.header.frame_count,
        })?;
        Ok(FrameRecord::parse(frame_index, block.clone(), &self.header)?)
    }

    fn close(&mut self) {
        self.open = false;
    }
}

/// Endless solid-color video; pixel value is the frame's position in the
/// stream.
pub struct MockVideo {
    frame_rate: f64,
    cursor: Option<u8>,
    pub fail_open: Arc<AtomicBool>,
    pub opens: Arc<AtomicUsize>,
    pub decoded: Arc<AtomicUsize>,
}

impl MockVideo {
    pub fn new(frame_rate: f64) -> Self {
        Self {
            frame_rate,
            cursor: None,
            fail_open: Arc::default(),
            opens: Arc::default(),
            decoded: Arc::default(),
        }
    }
}

impl VideoDecoder for MockVideo {
    fn open(&mut self, path: &Path) -> Result<(), LoadError> {
        if self.cursor.is_some() {
            return Err(LoadError::AlreadyOpen);
        }
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(LoadError::EmptyVideo(path.to_path_buf()));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.cursor = Some(0);
        Ok(())
    }

    fn decode_next_frame(&mut self) -> Result<PixelBuffer, VideoError> {
        let cursor = self.cursor.as_mut().ok_or(VideoError::NotOpen)?;
        let value = *cursor;
        *cursor = cursor.wrapping_add(1);
        self.decoded.fetch_add(1, Ordering::SeqCst);
        PixelBuffer::new(2, 2, vec![value; 12])
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn close(&mut self) -> Result<(), LoadError> {
        self.cursor = None;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.cursor.is_some()
    }
}

#[derive(Default)]
pub struct RecordingMesh {
    pub transform: Affine3A,
    pub rebuilds: usize,
    pub updates: usize,
    pub transforms_set: usize,
    pub last: Option<MeshBuffers>,
}

impl vologram::MeshSink for RecordingMesh {
    fn rebuild_section(&mut self, mesh: &MeshBuffers) -> Result<(), ResourceError> {
        self.rebuilds += 1;
        self.last = Some(mesh.clone());
        Ok(())
    }

    fn update_section(&mut self, mesh: &MeshBuffers) -> Result<(), ResourceError> {
        self.updates += 1;
        self.last = Some(mesh.clone());
        Ok(())
    }

    fn transform(&self) -> Affine3A {
        self.transform
    }

    fn set_transform(&mut self, transform: Affine3A) {
        self.transforms_set += 1;
        self.transform = transform;
    }
}

#[derive(Default)]
pub struct RecordingTextures {
    pub created: u64,
    /// First byte of every upload.
    pub uploads: Vec<u8>,
    pub bound: Vec<(TextureHandle, String)>,
}

impl TextureSink for RecordingTextures {
    fn upload(
        &mut self,
        target: Option<TextureHandle>,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureHandle, ResourceError> {
        assert_eq!(rgba.len(), (width * height * 4) as usize);
        self.uploads.push(rgba[0]);
        Ok(target.unwrap_or_else(|| {
            self.created += 1;
            TextureHandle(self.created)
        }))
    }

    fn bind(&mut self, texture: TextureHandle, parameter: &str) -> Result<(), ResourceError> {
        self.bound.push((texture, parameter.to_owned()));
        Ok(())
    }
}

/// Records a short tag per event.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, tag: &str) -> usize {
        self.events().iter().filter(|e| e.as_str() == tag).count()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl PlaybackObserver for RecordingObserver {
    fn on_event(&mut self, event: &PlaybackEvent<'_>) {
        let tag = match event {
            PlaybackEvent::Loaded { .. } => "loaded".to_owned(),
            PlaybackEvent::LoadFailed { .. } => "load_failed".to_owned(),
            PlaybackEvent::Calibrated { .. } => "calibrated".to_owned(),
            PlaybackEvent::FrameShown { frame, .. } => format!("shown {frame}"),
            PlaybackEvent::FrameFailed { frame, .. } => format!("failed {frame}"),
            PlaybackEvent::TextureFailed { .. } => "texture_failed".to_owned(),
            PlaybackEvent::FramesSkipped { count } => format!("skipped {count}"),
            PlaybackEvent::Looped => "looped".to_owned(),
            PlaybackEvent::LoopFailed { .. } => "loop_failed".to_owned(),
            PlaybackEvent::Finished => "finished".to_owned(),
            PlaybackEvent::Closed => "closed".to_owned(),
        };
        self.events.lock().unwrap().push(tag);
    }
}

pub fn header(frame_count: u32) -> Header {
    Header {
        frame_count,
        scale: 2.0,
        translation: Vec3::new(1.0, 2.0, 3.0),
        ..Header::default()
    }
}

fn triangle(offset: f32) -> [Vec3; 3] {
    [
        Vec3::new(offset, 0.0, 0.0),
        Vec3::new(offset + 1.0, 0.0, 0.0),
        Vec3::new(offset, 1.0, 0.0),
    ]
}

/// `count` frames of one triangle, with a keyframe every `keyframe_every`
/// frames. Each frame's triangle is shifted along X by its index.
pub fn frames(count: u32, keyframe_every: u32) -> Vec<FrameBuilder> {
    (0..count)
        .map(|i| {
            let positions = triangle(i as f32);
            if i % keyframe_every == 0 {
                FrameBuilder::keyframe(i)
                    .vertices(&positions)
                    .uvs(&[Vec2::ZERO, Vec2::X, Vec2::Y])
                    .triangles(&[0, 1, 2])
            } else {
                FrameBuilder::delta(i).vertices(&positions)
            }
        })
        .collect()
}

pub fn paths() -> SessionPaths {
    SessionPaths::new("header.vols", "sequence.vols", "video")
}

pub struct Harness {
    pub player: Player<MockGeometry, MockVideo>,
    pub mesh: RecordingMesh,
    pub textures: RecordingTextures,
    pub observer: RecordingObserver,
    pub geometry_fail: Arc<AtomicBool>,
    pub video_fail: Arc<AtomicBool>,
    pub video_opens: Arc<AtomicUsize>,
    pub video_decoded: Arc<AtomicUsize>,
}

impl Harness {
    pub fn new(frames: &[FrameBuilder], video_fps: f64) -> Self {
        Self::with_settings(frames, video_fps, PlayerSettings::default())
    }

    pub fn with_settings(frames: &[FrameBuilder], video_fps: f64, settings: PlayerSettings) -> Self {
        let frame_count = u32::try_from(frames.len()).unwrap();
        let geometry = MockGeometry::new(header(frame_count), frames);
        let video = MockVideo::new(video_fps);
        let observer = RecordingObserver::default();

        Self {
            geometry_fail: geometry.fail_open.clone(),
            video_fail: video.fail_open.clone(),
            video_opens: video.opens.clone(),
            video_decoded: video.decoded.clone(),
            player: Player::new(geometry, video, settings).with_observer(observer.clone()),
            mesh: RecordingMesh::default(),
            textures: RecordingTextures::default(),
            observer,
        }
    }

    /// Load and show frame 0.
    pub fn start(&mut self) {
        self.player.load(paths(), &mut self.textures).unwrap();
        self.player
            .set_frame(0, false, &mut self.mesh, &mut self.textures)
            .unwrap();
    }

    pub fn advance(&mut self, dt: f64) {
        self.player.advance(dt, &mut self.mesh, &mut self.textures);
    }

    pub fn tick(&mut self) {
        self.advance(1.0 / 30.0);
    }
}
