//! Vologram playback runtime.
//!
//! Reads a geometry sequence and its companion color video in lock-step and
//! drives a host mesh and texture through the [`MeshSink`] and [`TextureSink`]
//! traits. Decoding of individual blocks lives in [`vologram_decode`].
//!
//! # Example
//!
//! ```no_run
//! use vologram::{ImageSequenceDecoder, Player, PlayerSettings, SessionPaths, VolFileDecoder};
//! # fn run(mesh: &mut dyn vologram::MeshSink, textures: &mut dyn vologram::TextureSink) -> vologram::Result<()> {
//! let mut player = Player::new(
//!     VolFileDecoder::new(),
//!     ImageSequenceDecoder::new(30.0),
//!     PlayerSettings::default(),
//! );
//! player.load(SessionPaths::new("header.vols", "sequence_0.vols", "texture/"), textures)?;
//! player.set_frame(0, false, mesh, textures)?;
//! player.advance(1.0 / 30.0, mesh, textures);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod geometry;
pub mod observer;
pub mod player;
pub mod settings;
pub mod sink;
pub mod texture;
pub mod video;

pub use error::{LoadError, PlayerError, RangeError, ResourceError, Result, VideoError};
pub use geometry::{GeometryDecoder, VolFileDecoder};
pub use observer::{PlaybackEvent, PlaybackObserver, TracingObserver};
pub use player::{FrameUpdate, PlaybackPhase, PlaybackState, Player};
pub use settings::{FrameSkip, PlayerSettings, SessionPaths};
pub use sink::MeshSink;
pub use texture::{DEFAULT_TEXTURE_PARAMETER, TextureHandle, TextureSink, TextureSync};
pub use video::{FALLBACK_FPS, ImageSequenceDecoder, PixelBuffer, VideoDecoder, effective_fps};
