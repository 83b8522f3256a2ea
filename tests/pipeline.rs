//! Packet loop integration tests.
//!
//! The scripted tests drive `run_pipeline` through its public traits; the
//! playback tests require fixture files from
//! `tests/fixtures/generate_fixtures.sh` and run without a window.

use std::path::Path;

use ffmpeg_next::{Packet, format::Pixel, frame::Video as VideoFrame};
use yuvplay::{
    CancellationToken, DecodeStatus, FrameDecoder, FrameSink, PacketSource, PipelineOptions,
    PlaybackError, PlaybackMode, Player, PlayerOptions, ReadStatus, StopReason, run_pipeline,
};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

// ── Scripted collaborators ─────────────────────────────────────────

struct Interleaved {
    remaining: Vec<usize>,
}

impl PacketSource for Interleaved {
    fn read_packet(&mut self, packet: &mut Packet) -> ReadStatus {
        if self.remaining.is_empty() {
            return ReadStatus::EndOfStream;
        }
        let stream = self.remaining.remove(0);
        *packet = Packet::copy(&[stream as u8; 8]);
        packet.set_stream(stream);
        ReadStatus::Packet
    }
}

/// Emits one frame per packet and records which streams it was fed.
#[derive(Default)]
struct RecordingDecoder {
    fed_streams: Vec<usize>,
    pending: bool,
}

impl FrameDecoder for RecordingDecoder {
    fn send_packet(&mut self, packet: &Packet) -> Result<(), PlaybackError> {
        self.fed_streams.push(packet.stream());
        self.pending = true;
        Ok(())
    }

    fn send_eof(&mut self) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn receive_frame(&mut self, _frame: &mut VideoFrame) -> Result<DecodeStatus, PlaybackError> {
        if std::mem::take(&mut self.pending) {
            Ok(DecodeStatus::Frame)
        } else {
            Ok(DecodeStatus::NeedsInput)
        }
    }
}

#[derive(Default)]
struct FrameCounter {
    frames: u64,
    sizes: Vec<(u32, u32)>,
    quit_after: Option<u64>,
}

impl FrameSink for FrameCounter {
    fn present(&mut self, frame: &VideoFrame) -> Result<(), PlaybackError> {
        self.frames += 1;
        self.sizes.push((frame.width(), frame.height()));
        Ok(())
    }

    fn poll_quit(&mut self) -> bool {
        self.quit_after.is_some_and(|limit| self.frames >= limit)
    }
}

#[test]
fn only_selected_stream_is_decoded() {
    let mut source = Interleaved {
        remaining: vec![0, 1, 1, 0, 2, 1, 0],
    };
    let mut decoder = RecordingDecoder::default();
    let mut sink = FrameCounter::default();

    let report =
        run_pipeline(&mut source, &mut decoder, &mut sink, 1, &PipelineOptions::default()).unwrap();

    assert_eq!(decoder.fed_streams, vec![1, 1, 1]);
    assert_eq!(sink.frames, 3);
    assert_eq!(report.packets_read, 7);
    assert_eq!(report.packets_skipped, 4);
    assert_eq!(report.stop_reason, StopReason::EndOfStream);
}

#[test]
fn shared_token_cancels_from_outside() {
    let token = CancellationToken::new();
    let options = PipelineOptions {
        cancellation: token.clone(),
        ..PipelineOptions::default()
    };
    token.cancel();

    let mut source = Interleaved {
        remaining: vec![0, 0],
    };
    let report = run_pipeline(
        &mut source,
        &mut RecordingDecoder::default(),
        &mut FrameCounter::default(),
        0,
        &options,
    )
    .unwrap();

    assert_eq!(report.stop_reason, StopReason::Cancelled);
    assert_eq!(report.packets_read, 0);
}

#[test]
fn options_follow_player_options() {
    let player_options = PlayerOptions::default()
        .with_mode(PlaybackMode::FirstPacket)
        .with_flush_on_end_of_stream(true);
    let options = PipelineOptions::from(&player_options);

    assert_eq!(options.mode, PlaybackMode::FirstPacket);
    assert!(options.flush_on_end_of_stream);

    player_options.cancellation().cancel();
    assert!(options.cancellation.is_cancelled());
}

// ── Headless playback of real files ────────────────────────────────

#[test]
fn headless_playback_presents_half_size_frames() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let player = Player::new(PlayerOptions::new(path).with_dump_format(false));
    let playback = player.prepare().expect("Failed to prepare playback");
    let metadata = playback.metadata().clone();
    let video = metadata.video.as_ref().unwrap();
    let expected = (video.width / 2, video.height / 2);
    assert_eq!(playback.output_dimensions(), expected);

    let mut sink = FrameCounter::default();
    let report = playback.run(&mut sink).expect("Playback failed");

    assert!(sink.frames > 0);
    assert!(sink.sizes.iter().all(|&size| size == expected));
    assert_eq!(report.pipeline.frames_presented, sink.frames);
    assert_eq!(report.pipeline.stop_reason, StopReason::EndOfStream);
    assert_eq!((report.output_width, report.output_height), expected);
}

#[test]
fn flushing_presents_at_least_as_many_frames() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let plain = Player::new(PlayerOptions::new(path).with_dump_format(false))
        .prepare()
        .unwrap()
        .run(FrameCounter::default())
        .unwrap();
    let flushed = Player::new(
        PlayerOptions::new(path)
            .with_dump_format(false)
            .with_flush_on_end_of_stream(true),
    )
    .prepare()
    .unwrap()
    .run(FrameCounter::default())
    .unwrap();

    assert!(flushed.pipeline.frames_presented >= plain.pipeline.frames_presented);
}

#[test]
fn first_packet_mode_reads_one_packet() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let options = PlayerOptions::new(path)
        .with_dump_format(false)
        .with_mode(PlaybackMode::FirstPacket);
    let report = Player::new(options)
        .prepare()
        .unwrap()
        .run(FrameCounter::default())
        .unwrap();

    assert_eq!(report.pipeline.packets_read, 1);
    assert_eq!(report.pipeline.stop_reason, StopReason::FirstPacketDone);
}

#[test]
fn quit_request_stops_playback() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let options = PlayerOptions::new(path).with_dump_format(false);
    let token = options.cancellation().clone();
    let mut sink = FrameCounter {
        quit_after: Some(2),
        ..FrameCounter::default()
    };
    let report = Player::new(options)
        .prepare()
        .unwrap()
        .run(&mut sink)
        .unwrap();

    assert_eq!(report.pipeline.stop_reason, StopReason::Cancelled);
    assert!(token.is_cancelled());
    assert!(sink.frames >= 2);
}

#[test]
fn converted_frames_are_planar_yuv() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    struct FormatCheck(Vec<Pixel>);

    impl FrameSink for FormatCheck {
        fn present(&mut self, frame: &VideoFrame) -> Result<(), PlaybackError> {
            self.0.push(frame.format());
            Ok(())
        }
    }

    let mut sink = FormatCheck(Vec::new());
    Player::new(PlayerOptions::new(path).with_dump_format(false))
        .prepare()
        .unwrap()
        .run(&mut sink)
        .unwrap();

    assert!(!sink.0.is_empty());
    assert!(sink.0.iter().all(|&format| format == Pixel::YUV420P));
}
