//! Video frame to texture upload.

use crate::error::ResourceError;
use crate::video::PixelBuffer;

/// Material parameter the color texture is bound to by default.
pub const DEFAULT_TEXTURE_PARAMETER: &str = "colour";

/// Opaque handle to a texture owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Host side of texture uploads.
pub trait TextureSink {
    /// Upload RGBA8 pixels.
    ///
    /// With `target` set, overwrite that texture in place; otherwise create a
    /// new `width x height` texture.
    fn upload(
        &mut self,
        target: Option<TextureHandle>,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureHandle, ResourceError>;

    /// Bind a texture to a named material parameter.
    fn bind(&mut self, texture: TextureHandle, parameter: &str) -> Result<(), ResourceError>;
}

/// Expand packed RGB8 into RGBA8 with opaque alpha, reusing `out`.
pub fn expand_rgb_to_rgba(rgb: &[u8], out: &mut Vec<u8>) {
    out.clear();
    out.reserve(rgb.len() / 3 * 4);
    for pixel in rgb.chunks_exact(3) {
        out.extend_from_slice(pixel);
        out.push(0xFF);
    }
}

/// Keeps one host texture in sync with the decoded video.
///
/// The RGBA staging buffer lives as long as the session, so steady-state
/// playback does not allocate per frame.
#[derive(Debug)]
pub struct TextureSync {
    parameter: String,
    scratch: Vec<u8>,
    texture: Option<(TextureHandle, u32, u32)>,
}

impl Default for TextureSync {
    fn default() -> Self {
        Self::new(DEFAULT_TEXTURE_PARAMETER)
    }
}

impl TextureSync {
    pub fn new(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            scratch: Vec::new(),
            texture: None,
        }
    }

    /// Current texture, if one has been uploaded.
    #[must_use]
    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture.map(|(handle, _, _)| handle)
    }

    /// Upload a frame and bind it.
    ///
    /// The first frame creates the texture; later frames of the same size
    /// overwrite it. A size change creates a fresh texture.
    pub fn update(
        &mut self,
        sink: &mut dyn TextureSink,
        frame: &PixelBuffer,
    ) -> Result<TextureHandle, ResourceError> {
        expand_rgb_to_rgba(&frame.data, &mut self.scratch);

        let target = self
            .texture
            .filter(|&(_, w, h)| (w, h) == (frame.width, frame.height))
            .map(|(handle, _, _)| handle);
        let handle = sink.upload(target, &self.scratch, frame.width, frame.height)?;
        self.texture = Some((handle, frame.width, frame.height));

        sink.bind(handle, &self.parameter)?;
        Ok(handle)
    }

    /// Release the staging buffer and forget the texture.
    pub fn reset(&mut self) {
        self.scratch = Vec::new();
        self.texture = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        created: u64,
        uploads: Vec<(Option<TextureHandle>, usize, u32, u32)>,
        bound: Vec<(TextureHandle, String)>,
        fail_upload: bool,
    }

    impl TextureSink for RecordingSink {
        fn upload(
            &mut self,
            target: Option<TextureHandle>,
            rgba: &[u8],
            width: u32,
            height: u32,
        ) -> Result<TextureHandle, ResourceError> {
            if self.fail_upload {
                return Err(ResourceError::new("texture", "out of memory"));
            }
            self.uploads.push((target, rgba.len(), width, height));
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

    fn frame(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::new(width, height, vec![7; (width * height * 3) as usize]).unwrap()
    }

    #[test]
    fn rgb_gets_opaque_alpha() {
        let mut out = Vec::new();
        expand_rgb_to_rgba(&[1, 2, 3, 4, 5, 6], &mut out);
        assert_eq!(out, vec![1, 2, 3, 0xFF, 4, 5, 6, 0xFF]);
    }

    #[test]
    fn first_frame_creates_then_overwrites() {
        let mut sink = RecordingSink::default();
        let mut sync = TextureSync::default();

        let first = sync.update(&mut sink, &frame(4, 2)).unwrap();
        let second = sync.update(&mut sink, &frame(4, 2)).unwrap();

        assert_eq!(first, second);
        assert_eq!(sink.created, 1);
        assert_eq!(sink.uploads[0], (None, 32, 4, 2));
        assert_eq!(sink.uploads[1], (Some(first), 32, 4, 2));
        assert_eq!(sink.bound[1], (first, "colour".to_owned()));
    }

    #[test]
    fn size_change_creates_new_texture() {
        let mut sink = RecordingSink::default();
        let mut sync = TextureSync::new("albedo");

        let small = sync.update(&mut sink, &frame(2, 2)).unwrap();
        let large = sync.update(&mut sink, &frame(4, 4)).unwrap();

        assert_ne!(small, large);
        assert_eq!(sink.uploads[1].0, None);
        assert_eq!(sink.bound[1].1, "albedo");
    }

    #[test]
    fn scratch_is_reused() {
        let mut sink = RecordingSink::default();
        let mut sync = TextureSync::default();
        sync.update(&mut sink, &frame(8, 8)).unwrap();
        let capacity = sync.scratch.capacity();
        let ptr = sync.scratch.as_ptr();

        sync.update(&mut sink, &frame(8, 8)).unwrap();
        assert_eq!(sync.scratch.capacity(), capacity);
        assert_eq!(sync.scratch.as_ptr(), ptr);

        sync.reset();
        assert_eq!(sync.scratch.capacity(), 0);
        assert!(sync.texture().is_none());
    }

    #[test]
    fn sink_failure_is_reported() {
        let mut sink = RecordingSink {
            fail_upload: true,
            ..RecordingSink::default()
        };
        let mut sync = TextureSync::default();
        assert!(sync.update(&mut sink, &frame(2, 2)).is_err());
        assert!(sync.texture().is_none());
    }
}
