//! Pixel-format conversion and downscaling.
//!
//! Every decoded frame is converted to planar YUV 4:2:0 at the source size
//! divided by the configured divisor. The scaler is created once from the
//! decoder's negotiated size and format, and reused for every frame.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    time::Duration,
};

use ffmpeg_next::{
    Rational,
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::Context as ScalingContext,
};

use crate::{
    configuration::{OutputOptions, ScalingFilter},
    error::PlaybackError,
};

/// Output size for a source size and integer divisor.
///
/// Uses integer division. A divisor of zero is treated as one.
pub fn output_dimensions(source_width: u32, source_height: u32, divisor: u32) -> (u32, u32) {
    let divisor = divisor.max(1);
    (source_width / divisor, source_height / divisor)
}

/// Rescale a presentation timestamp to wall-clock time.
///
/// Returns `None` for missing or negative timestamps and for a degenerate
/// time base.
pub fn pts_to_duration(pts: Option<i64>, time_base: Rational) -> Option<Duration> {
    let pts = pts.filter(|&value| value >= 0)?;
    if time_base.denominator() == 0 || time_base.numerator() <= 0 {
        return None;
    }
    let seconds = pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64;
    Some(Duration::from_secs_f64(seconds))
}

/// Converts decoded frames into the presentation layout.
///
/// Holds the scaler and a preallocated destination frame. The input size and
/// format are fixed at construction: frames that arrive at a different
/// resolution are rejected with [`PlaybackError::ResolutionChanged`].
pub struct FrameConverter {
    scaler: ScalingContext,
    converted_frame: VideoFrame,
    source_width: u32,
    source_height: u32,
    output_width: u32,
    output_height: u32,
    filter: ScalingFilter,
}

impl Debug for FrameConverter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FrameConverter")
            .field("source_width", &self.source_width)
            .field("source_height", &self.source_height)
            .field("output_width", &self.output_width)
            .field("output_height", &self.output_height)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl FrameConverter {
    /// Create a converter for frames of the given format and size.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Scaling`] if the output would be empty or the
    /// scaler cannot be created for this format pair.
    pub fn new(
        source_format: Pixel,
        source_width: u32,
        source_height: u32,
        options: &OutputOptions,
    ) -> Result<Self, PlaybackError> {
        let (output_width, output_height) =
            options.resolve_dimensions(source_width, source_height);
        if output_width == 0 || output_height == 0 {
            return Err(PlaybackError::Scaling(format!(
                "output size {output_width}x{output_height} is empty \
                 (source {source_width}x{source_height}, divisor {})",
                options.scale_divisor,
            )));
        }

        let scaler = ScalingContext::get(
            source_format,
            source_width,
            source_height,
            OutputOptions::PIXEL_FORMAT,
            output_width,
            output_height,
            options.filter.to_ffmpeg_flags(),
        )
        .map_err(|error| {
            PlaybackError::Scaling(format!("cannot create scaler for {source_format:?}: {error}"))
        })?;

        log::debug!(
            "Scaler: {source_width}x{source_height} {source_format:?} -> \
             {output_width}x{output_height} {:?} ({:?})",
            OutputOptions::PIXEL_FORMAT,
            options.filter,
        );

        Ok(Self {
            scaler,
            converted_frame: VideoFrame::new(OutputOptions::PIXEL_FORMAT, output_width, output_height),
            source_width,
            source_height,
            output_width,
            output_height,
            filter: options.filter,
        })
    }

    /// `(width, height)` of converted frames.
    pub fn output_dimensions(&self) -> (u32, u32) {
        (self.output_width, self.output_height)
    }

    /// Convert one decoded frame.
    ///
    /// The returned frame is overwritten by the next call.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::ResolutionChanged`] if `frame` is not the size the
    ///   converter was built for.
    /// - [`PlaybackError::Scaling`] if the scaler fails.
    pub fn convert(&mut self, frame: &VideoFrame) -> Result<&VideoFrame, PlaybackError> {
        if frame.width() != self.source_width || frame.height() != self.source_height {
            return Err(PlaybackError::ResolutionChanged {
                expected_width: self.source_width,
                expected_height: self.source_height,
                actual_width: frame.width(),
                actual_height: frame.height(),
            });
        }

        self.scaler
            .run(frame, &mut self.converted_frame)
            .map_err(|error| PlaybackError::Scaling(error.to_string()))?;

        Ok(&self.converted_frame)
    }
}
