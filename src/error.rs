//! Error types for the `yuvplay` crate.
//!
//! This module defines [`PlaybackError`], the unified error type returned by
//! every fallible operation in the crate. Variants carry the path, stream or
//! upstream message needed to diagnose the failure from a single log line.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

/// Process exit status used for every playback failure.
pub const FAILURE_EXIT_CODE: i32 = -1;

/// The unified error type for all `yuvplay` operations.
///
/// Setup failures (open, probe, stream selection, decoder, window) and
/// steady-state failures (packet submission, frame reception) are both
/// fatal: nothing in the crate retries. The expected "needs more input" and
/// "end of stream" decoder signals are not errors; see
/// [`DecodeStatus`](crate::DecodeStatus).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlaybackError {
    /// The container could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`MediaSource::open`](crate::MediaSource::open).
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The container opened but its stream information could not be probed.
    #[error("Failed to find stream information in {path}: {reason}")]
    StreamInfo {
        /// Path of the opened container.
        path: PathBuf,
        /// Underlying reason the probe failed.
        reason: String,
    },

    /// The file does not contain a decodable video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// The decoder for the selected stream could not be allocated or opened.
    #[error("Failed to open video decoder for stream {stream_index}: {reason}")]
    DecoderOpen {
        /// Index of the selected video stream.
        stream_index: usize,
        /// Underlying reason the decoder failed to open.
        reason: String,
    },

    /// A packet was rejected by the decoder.
    #[error("Error while sending a packet to the decoder: {0}")]
    DecoderSend(String),

    /// The decoder failed with something other than "needs input" or
    /// "end of stream".
    #[error("Error while receiving a frame from the decoder: {0}")]
    DecoderReceive(String),

    /// The scaling context could not be created or failed to run.
    #[error("Pixel format conversion failed: {0}")]
    Scaling(String),

    /// A decoded frame no longer matches the size the converter was built for.
    #[error(
        "Decoded frame is {actual_width}x{actual_height} but the converter was built for {expected_width}x{expected_height}"
    )]
    ResolutionChanged {
        /// Width fixed at converter construction.
        expected_width: u32,
        /// Height fixed at converter construction.
        expected_height: u32,
        /// Width of the offending frame.
        actual_width: u32,
        /// Height of the offending frame.
        actual_height: u32,
    },

    /// SDL could not create or drive the window, renderer or texture.
    #[error("SDL: {0}")]
    Window(String),

    /// A [`PlayerOptions`](crate::PlayerOptions) field failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),
}

impl PlaybackError {
    /// The process exit status this error maps to.
    pub fn exit_code(&self) -> i32 {
        FAILURE_EXIT_CODE
    }
}

impl From<FfmpegError> for PlaybackError {
    fn from(error: FfmpegError) -> Self {
        PlaybackError::FfmpegError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_exits_with_minus_one() {
        let errors = [
            PlaybackError::NoVideoStream,
            PlaybackError::DecoderSend("bad packet".to_string()),
            PlaybackError::Window("no display".to_string()),
        ];
        for error in &errors {
            assert_eq!(error.exit_code(), -1, "{error}");
        }
    }

    #[test]
    fn ffmpeg_errors_convert() {
        let error = PlaybackError::from(FfmpegError::Eof);
        assert!(matches!(error, PlaybackError::FfmpegError(_)));
        assert!(error.to_string().starts_with("FFmpeg error"));
    }

    #[test]
    fn resolution_change_message_names_both_sizes() {
        let error = PlaybackError::ResolutionChanged {
            expected_width: 640,
            expected_height: 480,
            actual_width: 1280,
            actual_height: 720,
        };
        let message = error.to_string();
        assert!(message.contains("1280x720"));
        assert!(message.contains("640x480"));
    }
}
