//! Error types for vologram playback.

use std::path::PathBuf;

use thiserror::Error;
use vologram_decode::DecodeError;

/// Opening or reading a geometry or video source failed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed header in {path}: {source}")]
    Header {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("corrupt sequence {path} at byte {offset}: {reason}")]
    Corrupt {
        path: PathBuf,
        offset: u64,
        reason: String,
    },

    #[error("no frames found in {0}")]
    EmptyVideo(PathBuf),

    #[error("source is already open, close it first")]
    AlreadyOpen,

    #[error("source is not open")]
    NotOpen,

    #[error("no session paths configured")]
    NoPaths,
}

/// A frame index outside the loaded sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("frame {index} out of range, sequence has {frame_count} frames")]
pub struct RangeError {
    pub index: u32,
    pub frame_count: u32,
}

/// A host sink could not create or update a resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{resource}: {reason}")]
pub struct ResourceError {
    pub resource: &'static str,
    pub reason: String,
}

impl ResourceError {
    pub fn new(resource: &'static str, reason: impl Into<String>) -> Self {
        Self {
            resource,
            reason: reason.into(),
        }
    }
}

/// Errors produced while decoding a video frame.
#[derive(Debug, Error)]
pub enum VideoError {
    #[error("end of video stream")]
    EndOfStream,

    #[error("video source is not open")]
    NotOpen,

    #[error("failed to decode {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("frame is {found:?}, stream is {expected:?}")]
    FrameSizeChanged {
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("pixel buffer holds {found} bytes, {width}x{height} RGB needs {expected}")]
    BadPixelBuffer {
        width: u32,
        height: u32,
        expected: usize,
        found: usize,
    },
}

/// Any failure surfaced by the player.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Video(#[from] VideoError),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Resource(#[from] ResourceError),
}

pub type Result<T, E = PlayerError> = std::result::Result<T, E>;
