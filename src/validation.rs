//! Pre-playback checks.
//!
//! [`validate_playback`] inspects the cached metadata against the chosen
//! [`PlayerOptions`] and returns a [`ValidationReport`] describing anything
//! that will stop playback or degrade it.
//!
//! # Example
//!
//! ```no_run
//! use yuvplay::{MediaSource, PlayerOptions};
//!
//! let options = PlayerOptions::new("input.mp4");
//! let source = MediaSource::open(options.input(), false)?;
//! let report = source.validate(&options);
//! if !report.is_valid() {
//!     for error in &report.errors {
//!         println!("Error: {error}");
//!     }
//! }
//! # Ok::<(), yuvplay::PlaybackError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::{configuration::PlayerOptions, metadata::MediaMetadata};

/// Findings of a validation pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Informational notices (not problems).
    pub info: Vec<String>,
    /// Issues that degrade playback without preventing it.
    pub warnings: Vec<String>,
    /// Issues that will make playback fail.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Returns `true` if no errors were found. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of entries (info + warnings + errors).
    pub fn issue_count(&self) -> usize {
        self.info.len() + self.warnings.len() + self.errors.len()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for item in &self.info {
            writeln!(f, "[INFO] {item}")?;
        }
        for item in &self.warnings {
            writeln!(f, "[WARN] {item}")?;
        }
        for item in &self.errors {
            writeln!(f, "[ERROR] {item}")?;
        }
        if self.issue_count() == 0 {
            writeln!(f, "No issues found.")?;
        }
        Ok(())
    }
}

/// Check `metadata` against `options`.
pub fn validate_playback(metadata: &MediaMetadata, options: &PlayerOptions) -> ValidationReport {
    let mut report = ValidationReport::default();

    if let Err(error) = options.validate() {
        report.errors.push(error.to_string());
    }

    if metadata.duration == Duration::ZERO {
        report
            .warnings
            .push("Container reports no duration; progress cannot be estimated".to_string());
    }

    let Some(video) = &metadata.video else {
        report
            .errors
            .push(format!("No video stream among {} streams", metadata.stream_count));
        return report;
    };

    report.info.push(format!(
        "Video: stream {} {} {}x{} @ {:.2} fps, ~{} frames",
        video.stream_index,
        video.codec,
        video.width,
        video.height,
        video.frames_per_second,
        video.frame_count,
    ));

    if video.width == 0 || video.height == 0 {
        report.errors.push(format!(
            "Invalid video dimensions: {}x{}",
            video.width, video.height,
        ));
        return report;
    }

    let (output_width, output_height) = options
        .output()
        .resolve_dimensions(video.width, video.height);
    if output_width == 0 || output_height == 0 {
        report.errors.push(format!(
            "Scale divisor {} leaves an empty {output_width}x{output_height} output",
            options.output().scale_divisor,
        ));
    } else {
        if output_width % 2 != 0 || output_height % 2 != 0 {
            report.info.push(format!(
                "Output size {output_width}x{output_height} is odd; the last chroma row or column covers a single pixel"
            ));
        }
        report.info.push(format!(
            "Output: {output_width}x{output_height} YUV420P ({:?})",
            options.output().filter,
        ));
    }

    if video.pixel_format.is_none() {
        report
            .warnings
            .push("Decoder did not report a pixel format".to_string());
    }

    if options.frame_pacing && video.frame_interval().is_none() {
        report
            .warnings
            .push("Frame rate is unknown; frames will not be paced".to_string());
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::VideoMetadata;

    fn metadata(width: u32, height: u32) -> MediaMetadata {
        MediaMetadata {
            video: Some(VideoMetadata {
                stream_index: 0,
                width,
                height,
                frames_per_second: 25.0,
                frame_count: 250,
                codec: "h264".to_string(),
                pixel_format: Some("YUV420P".to_string()),
            }),
            duration: Duration::from_secs(10),
            format: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
            stream_count: 2,
        }
    }

    #[test]
    fn typical_file_is_valid_without_warnings() {
        let report = validate_playback(&metadata(1920, 1080), &PlayerOptions::default());
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
        assert!(report.info.iter().any(|line| line.contains("960x540")));
    }

    #[test]
    fn missing_video_is_an_error() {
        let mut metadata = metadata(1920, 1080);
        metadata.video = None;
        let report = validate_playback(&metadata, &PlayerOptions::default());
        assert!(!report.is_valid());
    }

    #[test]
    fn odd_output_size_is_playable() {
        let report = validate_playback(&metadata(1280, 534), &PlayerOptions::default());
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
        assert!(report.info.iter().any(|line| line.contains("640x267 is odd")));
    }

    #[test]
    fn oversized_divisor_is_an_error() {
        let options = PlayerOptions::default().with_scale_divisor(4096);
        let report = validate_playback(&metadata(1920, 1080), &options);
        assert!(!report.is_valid());
    }

    #[test]
    fn display_lists_every_entry() {
        let mut metadata = metadata(1920, 1080);
        metadata.duration = Duration::ZERO;
        let report = validate_playback(&metadata, &PlayerOptions::default());
        let text = report.to_string();
        assert!(text.contains("[INFO]"));
        assert!(text.contains("[WARN]"));
    }
}
