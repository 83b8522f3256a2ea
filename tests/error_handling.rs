//! Error handling integration tests.
//!
//! These tests verify that setup failures surface as meaningful errors that
//! map to the failure exit status, and that none of them need a window.

use std::path::Path;

use yuvplay::{
    FAILURE_EXIT_CODE, MediaSource, PlaybackError, Player, PlayerOptions, select_video_stream,
};

#[test]
fn open_nonexistent_file() {
    let result = MediaSource::open("this_file_does_not_exist.mp4", false);
    assert!(result.is_err());

    let error = result.unwrap_err();
    assert!(
        error.to_string().contains("Failed to open media file"),
        "Error message should mention file open failure: {error}",
    );
    assert_eq!(error.exit_code(), FAILURE_EXIT_CODE);
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let player = Player::new(PlayerOptions::new(&invalid_file_path).with_dump_format(false));
    let error = player
        .prepare()
        .expect_err("Expected error for invalid media file");
    assert_eq!(error.exit_code(), -1);
}

#[test]
fn play_missing_file_fails_before_window() {
    // Succeeds even without a display: the window is never reached.
    let player = Player::new(PlayerOptions::new("missing/video.mp4").with_dump_format(false));
    let error = player.play().expect_err("Expected open failure");

    assert!(matches!(error, PlaybackError::FileOpen { .. }));
    assert_eq!(error.exit_code(), -1);
}

#[test]
fn invalid_configuration_is_rejected_before_opening() {
    let player = Player::new(PlayerOptions::new("missing/video.mp4").with_scale_divisor(0));
    let error = player.prepare().expect_err("Expected configuration error");

    assert!(matches!(error, PlaybackError::InvalidConfiguration(_)));
}

#[test]
fn no_video_stream_error() {
    let path = "tests/fixtures/sample_audio_only.mp4";
    if !Path::new(path).exists() {
        return;
    }

    let source = MediaSource::open(path, false).expect("Failed to open audio-only file");
    let error = select_video_stream(&source).expect_err("Expected no video stream");

    assert!(
        error.to_string().contains("No video stream"),
        "Error should mention no video stream: {error}",
    );
    assert_eq!(error.exit_code(), -1);
}
