//! Geometry sources.
//!
//! [`VolFileDecoder`] streams frames from an uncompressed header + sequence
//! file pair. Opening indexes the sequence by reading only the fixed prefix of
//! each block, so reading a frame later costs one seek and one block read.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use vologram_decode::{FRAME_PREFIX_SIZE, FramePrefix, FrameRecord, Header};

use crate::error::{LoadError, RangeError, Result};

/// Source of per-frame geometry blocks.
pub trait GeometryDecoder {
    /// Open a header + sequence pair. Fails if a session is already open.
    fn open(&mut self, header_path: &Path, sequence_path: &Path) -> Result<Header, LoadError>;

    /// Header of the open session.
    fn header(&self) -> Option<&Header>;

    /// Whether `frame_index` is a keyframe, answered without reading the block.
    fn is_keyframe(&self, frame_index: u32) -> Result<bool, RangeError>;

    /// Read and split one frame block.
    fn read_frame(&mut self, frame_index: u32) -> Result<FrameRecord>;

    /// Release the session. Closing a closed decoder does nothing.
    fn close(&mut self);

    fn is_open(&self) -> bool {
        self.header().is_some()
    }

    fn frame_count(&self) -> u32 {
        self.header().map_or(0, |header| header.frame_count)
    }
}

#[derive(Debug, Clone, Copy)]
struct FrameEntry {
    offset: u64,
    size: usize,
    is_keyframe: bool,
}

#[derive(Debug)]
struct Session {
    header: Header,
    sequence_path: PathBuf,
    sequence: BufReader<File>,
    frames: Vec<FrameEntry>,
}

/// Streaming reader for `.vols` header and sequence files.
#[derive(Debug, Default)]
pub struct VolFileDecoder {
    session: Option<Session>,
}

impl VolFileDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keyframes in the open sequence.
    #[must_use]
    pub fn keyframe_count(&self) -> usize {
        self.session
            .as_ref()
            .map_or(0, |s| s.frames.iter().filter(|f| f.is_keyframe).count())
    }
}

impl GeometryDecoder for VolFileDecoder {
    fn open(&mut self, header_path: &Path, sequence_path: &Path) -> Result<Header, LoadError> {
        if self.session.is_some() {
            return Err(LoadError::AlreadyOpen);
        }

        let header_bytes = std::fs::read(header_path).map_err(|source| LoadError::Io {
            path: header_path.to_path_buf(),
            source,
        })?;
        let header = Header::from_bytes(&header_bytes).map_err(|source| LoadError::Header {
            path: header_path.to_path_buf(),
            source,
        })?;

        let io_err = |source| LoadError::Io {
            path: sequence_path.to_path_buf(),
            source,
        };
        let file = File::open(sequence_path).map_err(io_err)?;
        let file_len = file.metadata().map_err(io_err)?.len();
        let mut sequence = BufReader::new(file);
        let frames = index_frames(&mut sequence, sequence_path, &header, file_len)?;

        self.session = Some(Session {
            header,
            sequence_path: sequence_path.to_path_buf(),
            sequence,
            frames,
        });
        tracing::debug!(
            frames = header.frame_count,
            keyframes = self.keyframe_count(),
            version = header.format_version,
            "Indexed sequence {}",
            sequence_path.display()
        );
        Ok(header)
    }

    fn header(&self) -> Option<&Header> {
        self.session.as_ref().map(|s| &s.header)
    }

    fn is_keyframe(&self, frame_index: u32) -> Result<bool, RangeError> {
        let session = self.session.as_ref();
        session
            .and_then(|s| s.frames.get(frame_index as usize))
            .map(|entry| entry.is_keyframe)
            .ok_or(RangeError {
                index: frame_index,
                frame_count: session.map_or(0, |s| s.header.frame_count),
            })
    }

    fn read_frame(&mut self, frame_index: u32) -> Result<FrameRecord> {
        let session = self.session.as_mut().ok_or(LoadError::NotOpen)?;
        let entry = *session
            .frames
            .get(frame_index as usize)
            .ok_or(RangeError {
                index: frame_index,
                frame_count: session.header.frame_count,
            })?;

        let mut block = vec![0u8; entry.size];
        session
            .sequence
            .seek(SeekFrom::Start(entry.offset))
            .and_then(|_| session.sequence.read_exact(&mut block))
            .map_err(|source| LoadError::Io {
                path: session.sequence_path.clone(),
                source,
            })?;

        Ok(FrameRecord::parse(frame_index, block, &session.header)?)
    }

    fn close(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!("Closed sequence {}", session.sequence_path.display());
        }
    }
}

/// Walk the sequence reading each block prefix and skipping its payload.
fn index_frames(
    sequence: &mut BufReader<File>,
    path: &Path,
    header: &Header,
    file_len: u64,
) -> Result<Vec<FrameEntry>, LoadError> {
    let corrupt = |offset, reason: String| LoadError::Corrupt {
        path: path.to_path_buf(),
        offset,
        reason,
    };

    // Every frame needs at least a prefix.
    let max_frames = file_len / FRAME_PREFIX_SIZE as u64;
    if u64::from(header.frame_count) > max_frames {
        return Err(corrupt(
            0,
            format!("{} frames cannot fit in {file_len} bytes", header.frame_count),
        ));
    }

    let mut frames = Vec::with_capacity(header.frame_count as usize);
    let mut offset = 0u64;
    for index in 0..header.frame_count {
        if offset + FRAME_PREFIX_SIZE as u64 > file_len {
            return Err(corrupt(
                offset,
                format!("frame {index} of {} starts past end of file", header.frame_count),
            ));
        }

        let mut prefix = [0u8; FRAME_PREFIX_SIZE];
        sequence
            .seek(SeekFrom::Start(offset))
            .and_then(|_| sequence.read_exact(&mut prefix))
            .map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let prefix =
            FramePrefix::from_bytes(&prefix).map_err(|e| corrupt(offset, e.to_string()))?;

        if u32::try_from(prefix.frame_number).ok() != Some(index) {
            return Err(corrupt(
                offset,
                format!("expected frame {index}, found frame {}", prefix.frame_number),
            ));
        }

        let size = prefix.block_size();
        if offset + size as u64 > file_len {
            return Err(corrupt(offset, format!("frame {index} runs past end of file")));
        }

        frames.push(FrameEntry {
            offset,
            size,
            is_keyframe: prefix.is_keyframe,
        });
        offset += size as u64;
    }

    if offset < file_len {
        tracing::debug!(trailing = file_len - offset, "Ignoring bytes after last frame");
    }
    Ok(frames)
}
