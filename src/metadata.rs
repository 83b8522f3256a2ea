//! Media metadata types.
//!
//! Metadata is read once when a [`MediaSource`](crate::MediaSource) is
//! opened and cached for its lifetime. It drives output sizing, frame pacing
//! and the `probe` report.

use std::time::Duration;

/// Container-level metadata plus the best video stream, if any.
#[derive(Debug, Clone)]
#[must_use]
pub struct MediaMetadata {
    /// Metadata of the stream FFmpeg ranks as the best video stream.
    pub video: Option<VideoMetadata>,
    /// Total duration. Zero when the container does not report one.
    pub duration: Duration,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`, `"matroska,webm"`).
    pub format: String,
    /// Number of streams of any kind in the container.
    pub stream_count: usize,
}

/// Metadata for a video stream.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoMetadata {
    /// Index of the stream inside the container.
    pub stream_index: usize,
    /// Coded width in pixels.
    pub width: u32,
    /// Coded height in pixels.
    pub height: u32,
    /// Average frames per second; zero when unknown.
    pub frames_per_second: f64,
    /// Estimated frame count from duration and frame rate; zero when unknown.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
    /// Native pixel format of the decoder, if FFmpeg reported one.
    pub pixel_format: Option<String>,
}

impl VideoMetadata {
    /// Time between two frames at the average frame rate.
    pub fn frame_interval(&self) -> Option<Duration> {
        if self.frames_per_second > 0.0 && self.frames_per_second.is_finite() {
            Some(Duration::from_secs_f64(1.0 / self.frames_per_second))
        } else {
            None
        }
    }
}
