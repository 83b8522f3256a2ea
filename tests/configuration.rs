//! PlayerOptions builder tests.

use std::path::Path;
use std::sync::Arc;

use yuvplay::{
    CancellationToken, PlaybackError, PlaybackMode, PlayerOptions, ProgressCallback,
    ProgressInfo, ScalingFilter,
};

struct Ignore;

impl ProgressCallback for Ignore {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

// ── Builder ────────────────────────────────────────────────────────

#[test]
fn config_defaults() {
    let options = PlayerOptions::default();
    let debug = format!("{options:?}");
    assert!(debug.contains("PlayerOptions"));
    assert!(debug.contains("is_cancelled: false"));
    assert!(debug.contains("batch_size: 1"));
    assert_eq!(options.input(), Path::new("video.mp4"));
}

#[test]
fn config_with_every_option() {
    let token = CancellationToken::new();
    let options = PlayerOptions::new("clip.mkv")
        .with_scale_divisor(3)
        .with_filter(ScalingFilter::Point)
        .with_window_title("Preview")
        .with_mode(PlaybackMode::FirstPacket)
        .with_flush_on_end_of_stream(true)
        .with_dump_format(false)
        .with_frame_pacing(true)
        .with_progress(Arc::new(Ignore))
        .with_cancellation(token.clone())
        .with_batch_size(25);

    assert_eq!(options.input(), Path::new("clip.mkv"));
    assert_eq!(options.output().scale_divisor, 3);
    assert_eq!(options.output().filter, ScalingFilter::Point);
    assert_eq!(options.window().title, "Preview");
    assert_eq!(options.mode(), PlaybackMode::FirstPacket);
    assert!(options.validate().is_ok());

    let debug = format!("{options:?}");
    assert!(debug.contains("batch_size: 25"));
    assert!(debug.contains("dump_format: false"));

    token.cancel();
    assert!(options.cancellation().is_cancelled());
}

#[test]
fn clones_share_the_cancellation_token() {
    let options = PlayerOptions::default();
    let clone = options.clone();
    options.cancellation().cancel();
    assert!(clone.cancellation().is_cancelled());
}

// ── Validation ─────────────────────────────────────────────────────

#[test]
fn zero_scale_divisor_is_invalid() {
    let result = PlayerOptions::default().with_scale_divisor(0).validate();
    assert!(matches!(result, Err(PlaybackError::InvalidConfiguration(_))));
}

#[test]
fn empty_input_is_invalid() {
    let error = PlayerOptions::new("").validate().unwrap_err();
    assert!(error.to_string().contains("Invalid configuration"));
    assert_eq!(error.exit_code(), -1);
}
