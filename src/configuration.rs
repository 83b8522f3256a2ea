//! Playback configuration.
//!
//! [`PlayerOptions`] gathers every run parameter in one place: the input
//! path, the output scale and resampling filter, the window title, the
//! playback mode, and the progress/cancellation plumbing. Defaults match a
//! plain `yuvplay` run: `video.mp4`, half resolution, bicubic filtering,
//! full playback.
//!
//! # Example
//!
//! ```no_run
//! use yuvplay::{PlaybackMode, PlayerOptions, ScalingFilter};
//!
//! let options = PlayerOptions::new("input.mkv")
//!     .with_scale_divisor(3)
//!     .with_filter(ScalingFilter::Lanczos)
//!     .with_mode(PlaybackMode::FirstPacket);
//! options.validate()?;
//! # Ok::<(), yuvplay::PlaybackError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ffmpeg_next::{format::Pixel, software::scaling::Flags as ScalingFlags};

use crate::error::PlaybackError;
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// Input path used when none is given.
pub const DEFAULT_INPUT: &str = "video.mp4";

/// Window title used when none is given.
pub const DEFAULT_WINDOW_TITLE: &str = "SDL";

/// Resampling filter used by the software scaler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalingFilter {
    /// Fast bilinear, lowest quality.
    FastBilinear,
    /// Bilinear.
    Bilinear,
    /// Bicubic. This is the default.
    #[default]
    Bicubic,
    /// Nearest neighbour.
    Point,
    /// Area averaging.
    Area,
    /// Lanczos, highest quality.
    Lanczos,
}

impl ScalingFilter {
    /// Map to the corresponding FFmpeg scaler flag.
    pub(crate) fn to_ffmpeg_flags(self) -> ScalingFlags {
        match self {
            ScalingFilter::FastBilinear => ScalingFlags::FAST_BILINEAR,
            ScalingFilter::Bilinear => ScalingFlags::BILINEAR,
            ScalingFilter::Bicubic => ScalingFlags::BICUBIC,
            ScalingFilter::Point => ScalingFlags::POINT,
            ScalingFilter::Area => ScalingFlags::AREA,
            ScalingFilter::Lanczos => ScalingFlags::LANCZOS,
        }
    }
}

/// How far the packet loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    /// Read and present until end of stream, an error, or a quit request.
    #[default]
    Full,
    /// Process exactly one packet (and whatever frames it yields), then stop.
    FirstPacket,
}

/// Converted-frame settings.
///
/// The pixel layout is always planar YUV 4:2:0, which is what the streaming
/// texture expects. The output size is the source size divided by
/// `scale_divisor`, fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    /// Integer divisor applied to the decoder's width and height.
    pub scale_divisor: u32,
    /// Resampling filter.
    pub filter: ScalingFilter,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            scale_divisor: 2,
            filter: ScalingFilter::Bicubic,
        }
    }
}

impl OutputOptions {
    /// The planar layout every converted frame uses.
    pub const PIXEL_FORMAT: Pixel = Pixel::YUV420P;

    /// Resolve the output size for a given source size.
    ///
    /// Returns `(width, height)` using integer division.
    pub fn resolve_dimensions(&self, source_width: u32, source_height: u32) -> (u32, u32) {
        crate::conversion::output_dimensions(source_width, source_height, self.scale_divisor)
    }
}

/// Window settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOptions {
    /// Window title.
    pub title: String,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_WINDOW_TITLE.to_string(),
        }
    }
}

/// Configuration for a playback run.
///
/// Built with [`PlayerOptions::new`] and the `with_*` methods, then handed to
/// [`Player::new`](crate::Player::new).
#[derive(Clone)]
pub struct PlayerOptions {
    pub(crate) input: PathBuf,
    pub(crate) output: OutputOptions,
    pub(crate) window: WindowOptions,
    pub(crate) mode: PlaybackMode,
    pub(crate) flush_on_end_of_stream: bool,
    pub(crate) dump_format: bool,
    pub(crate) frame_pacing: bool,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: CancellationToken,
    pub(crate) batch_size: u64,
}

impl Debug for PlayerOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PlayerOptions")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("window", &self.window)
            .field("mode", &self.mode)
            .field("flush_on_end_of_stream", &self.flush_on_end_of_stream)
            .field("dump_format", &self.dump_format)
            .field("frame_pacing", &self.frame_pacing)
            .field("is_cancelled", &self.cancellation.is_cancelled())
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT)
    }
}

impl PlayerOptions {
    /// Create options for `input` with every other field at its default.
    pub fn new<P: AsRef<Path>>(input: P) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: OutputOptions::default(),
            window: WindowOptions::default(),
            mode: PlaybackMode::Full,
            flush_on_end_of_stream: false,
            dump_format: true,
            frame_pacing: false,
            progress: Arc::new(NoOpProgress),
            cancellation: CancellationToken::new(),
            batch_size: 1,
        }
    }

    /// Set the integer divisor applied to the source resolution.
    #[must_use]
    pub fn with_scale_divisor(mut self, divisor: u32) -> Self {
        self.output.scale_divisor = divisor;
        self
    }

    /// Set the resampling filter.
    #[must_use]
    pub fn with_filter(mut self, filter: ScalingFilter) -> Self {
        self.output.filter = filter;
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_window_title<S: Into<String>>(mut self, title: S) -> Self {
        self.window.title = title.into();
        self
    }

    /// Choose between full playback and the single-packet demo.
    #[must_use]
    pub fn with_mode(mut self, mode: PlaybackMode) -> Self {
        self.mode = mode;
        self
    }

    /// Drain the decoder's buffered frames once the container is exhausted.
    ///
    /// Off by default: end of stream then stops without presenting anything
    /// further.
    #[must_use]
    pub fn with_flush_on_end_of_stream(mut self, flush: bool) -> Self {
        self.flush_on_end_of_stream = flush;
        self
    }

    /// Dump container information to stderr after opening and after
    /// probing. On by default.
    #[must_use]
    pub fn with_dump_format(mut self, dump: bool) -> Self {
        self.dump_format = dump;
        self
    }

    /// Sleep between frames to follow the stream's average frame rate.
    #[must_use]
    pub fn with_frame_pacing(mut self, pacing: bool) -> Self {
        self.frame_pacing = pacing;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Use an externally owned cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Fire the progress callback every `size` frames. Clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// The input path.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// The converted-frame settings.
    pub fn output(&self) -> &OutputOptions {
        &self.output
    }

    /// The window settings.
    pub fn window(&self) -> &WindowOptions {
        &self.window
    }

    /// The playback mode.
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// The cancellation token the packet loop checks.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Check every field that can be checked without opening the input.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::InvalidConfiguration`] naming the first bad
    /// field.
    pub fn validate(&self) -> Result<(), PlaybackError> {
        if self.input.as_os_str().is_empty() {
            return Err(PlaybackError::InvalidConfiguration(
                "input path is empty".to_string(),
            ));
        }
        if self.output.scale_divisor == 0 {
            return Err(PlaybackError::InvalidConfiguration(
                "scale divisor must be at least 1".to_string(),
            ));
        }
        if self.window.title.contains('\0') {
            return Err(PlaybackError::InvalidConfiguration(
                "window title must not contain NUL bytes".to_string(),
            ));
        }
        Ok(())
    }
}
