//! Color video sources.
//!
//! Video sources only move forward. Rewinding means closing and reopening,
//! which is how the player restarts a looping vologram.

use std::path::{Path, PathBuf};

use crate::error::{LoadError, VideoError};

/// Frame rate assumed when a source reports none.
pub const FALLBACK_FPS: f64 = 30.0;

/// One decoded video frame as packed RGB8 rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap RGB8 data, checking it covers `width * height` pixels.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, VideoError> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(VideoError::BadPixelBuffer {
                width,
                height,
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Sequential color frame source.
pub trait VideoDecoder {
    /// Open a source. Fails if one is already open.
    fn open(&mut self, path: &Path) -> Result<(), LoadError>;

    /// Decode the frame under the read cursor and advance it.
    fn decode_next_frame(&mut self) -> Result<PixelBuffer, VideoError>;

    /// Frame rate the source reports; may be zero or negative if unknown.
    fn frame_rate(&self) -> f64;

    /// Release the source. Closing a closed decoder succeeds.
    fn close(&mut self) -> Result<(), LoadError>;

    fn is_open(&self) -> bool;
}

/// Effective playback rate for a reported frame rate.
#[must_use]
pub fn effective_fps(reported: f64, fallback: f64) -> f64 {
    if reported > 0.0 && reported.is_finite() {
        reported
    } else {
        fallback
    }
}

#[derive(Debug)]
struct OpenSequence {
    dir: PathBuf,
    frames: Vec<PathBuf>,
    cursor: usize,
    size: Option<(u32, u32)>,
}

/// Video source backed by a directory of numbered PNG or JPEG frames.
///
/// Frames play in file-name order, so zero-padded numbering is expected.
#[derive(Debug)]
pub struct ImageSequenceDecoder {
    frame_rate: f64,
    open: Option<OpenSequence>,
}

impl ImageSequenceDecoder {
    /// A decoder reporting `frame_rate`. Pass zero when the rate is unknown.
    #[must_use]
    pub fn new(frame_rate: f64) -> Self {
        Self {
            frame_rate,
            open: None,
        }
    }

    /// Number of frames in the open sequence.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.open.as_ref().map_or(0, |o| o.frames.len())
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ["png", "jpg", "jpeg"]
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

impl VideoDecoder for ImageSequenceDecoder {
    fn open(&mut self, path: &Path) -> Result<(), LoadError> {
        if self.open.is_some() {
            return Err(LoadError::AlreadyOpen);
        }

        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut frames = Vec::new();
        for entry in std::fs::read_dir(path).map_err(io_err)? {
            let entry_path = entry.map_err(io_err)?.path();
            if entry_path.is_file() && is_frame_file(&entry_path) {
                frames.push(entry_path);
            }
        }
        if frames.is_empty() {
            return Err(LoadError::EmptyVideo(path.to_path_buf()));
        }
        frames.sort();

        tracing::debug!(frames = frames.len(), "Opened image sequence {}", path.display());
        self.open = Some(OpenSequence {
            dir: path.to_path_buf(),
            frames,
            cursor: 0,
            size: None,
        });
        Ok(())
    }

    fn decode_next_frame(&mut self) -> Result<PixelBuffer, VideoError> {
        let open = self.open.as_mut().ok_or(VideoError::NotOpen)?;
        let path = open.frames.get(open.cursor).ok_or(VideoError::EndOfStream)?;

        let image = image::open(path)
            .map_err(|source| VideoError::Image {
                path: path.clone(),
                source,
            })?
            .to_rgb8();
        let found = image.dimensions();
        let expected = *open.size.get_or_insert(found);
        if found != expected {
            return Err(VideoError::FrameSizeChanged { expected, found });
        }

        open.cursor += 1;
        PixelBuffer::new(found.0, found.1, image.into_raw())
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn close(&mut self) -> Result<(), LoadError> {
        if let Some(open) = self.open.take() {
            tracing::debug!(
                decoded = open.cursor,
                "Closed image sequence {}",
                open.dir.display()
            );
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.is_some()
    }
}
