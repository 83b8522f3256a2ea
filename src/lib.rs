//! # yuvplay
//!
//! Minimal video playback: demux a container, decode its best video stream,
//! convert every frame to planar YUV 4:2:0 at a reduced size, and present it
//! in an SDL2 window through a streaming texture.
//!
//! Decoding is powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate, presentation
//! by [`sdl2`](https://crates.io/crates/sdl2).
//!
//! ## Quick Start
//!
//! ### Play a File
//!
//! ```no_run
//! use yuvplay::{Player, PlayerOptions};
//!
//! Player::new(PlayerOptions::new("video.mp4")).play().unwrap();
//! ```
//!
//! ### Decode Without a Window
//!
//! ```no_run
//! use ffmpeg_next::frame::Video as VideoFrame;
//! use yuvplay::{FrameSink, PlaybackError, Player, PlayerOptions};
//!
//! struct CountFrames(u64);
//!
//! impl FrameSink for CountFrames {
//!     fn present(&mut self, _frame: &VideoFrame) -> Result<(), PlaybackError> {
//!         self.0 += 1;
//!         Ok(())
//!     }
//! }
//!
//! let playback = Player::new(PlayerOptions::new("video.mp4")).prepare().unwrap();
//! let report = playback.run(CountFrames(0)).unwrap();
//! println!("{} frames", report.pipeline.frames_presented);
//! ```
//!
//! ## Features
//!
//! - **Two-phase open**: container open and stream probing, each followed
//!   by an FFmpeg format dump
//! - **Best-stream selection**: FFmpeg's own ranking of video streams
//! - **Send/receive decoding**: every frame a packet yields is presented
//!   before the next packet is read
//! - **Configurable output**: scale divisor and resampling filter, bicubic
//!   half size by default
//! - **Playback modes**: full playback or a single-packet demo
//! - **Progress & cancellation**: `ProgressCallback` and
//!   `CancellationToken`; closing the window or pressing Escape cancels
//! - **Validation**: inspect an input before playing it
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `bundled` | Build and link SDL2 from source instead of the system library |
//!
//! ## Requirements
//!
//! FFmpeg and SDL2 development libraries must be installed on your system
//! unless `bundled` is enabled for SDL2.

pub mod configuration;
pub mod conversion;
pub mod decoder;
pub mod error;
pub mod ffmpeg;
pub mod metadata;
pub mod pipeline;
pub mod player;
pub mod presenter;
pub mod progress;
pub mod source;
pub mod validation;

pub use configuration::{
    DEFAULT_INPUT, DEFAULT_WINDOW_TITLE, OutputOptions, PlaybackMode, PlayerOptions,
    ScalingFilter, WindowOptions,
};
pub use conversion::{FrameConverter, output_dimensions};
pub use decoder::{VideoDecoder, select_video_stream};
pub use error::{FAILURE_EXIT_CODE, PlaybackError};
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use metadata::{MediaMetadata, VideoMetadata};
pub use pipeline::{
    DecodeStatus, FrameDecoder, FrameSink, PacketSource, PipelineOptions, PipelineReport,
    ReadStatus, StopReason, run_pipeline,
};
pub use player::{ConvertingSink, Playback, PlaybackReport, Player};
pub use presenter::{Presenter, SdlWindow};
pub use progress::{CancellationToken, ProgressCallback, ProgressInfo};
pub use source::MediaSource;
pub use validation::{ValidationReport, validate_playback};
