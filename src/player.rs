//! End-to-end playback.
//!
//! [`Player::play`] wires every stage together: open and probe the input,
//! select the video stream, open its decoder, build the converter, open the
//! window, then run the packet loop with a [`ConvertingSink`] in front of the
//! presenter.
//!
//! The window is opened last, so a bad input never creates one. For
//! headless use, [`Player::prepare`] stops before the window and
//! [`Playback::run`] accepts any [`FrameSink`].
//!
//! # Example
//!
//! ```no_run
//! use yuvplay::{Player, PlayerOptions};
//!
//! let report = Player::new(PlayerOptions::new("video.mp4")).play()?;
//! println!("{} frames shown", report.pipeline.frames_presented);
//! # Ok::<(), yuvplay::PlaybackError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    time::Duration,
};

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

use crate::{
    configuration::PlayerOptions,
    conversion::{FrameConverter, pts_to_duration},
    decoder::{VideoDecoder, select_video_stream},
    error::PlaybackError,
    metadata::MediaMetadata,
    pipeline::{FrameSink, PipelineOptions, PipelineReport, run_pipeline},
    presenter::SdlWindow,
    progress::ProgressTracker,
    source::MediaSource,
};

/// Summary of a finished playback run.
#[derive(Debug, Clone)]
pub struct PlaybackReport {
    /// Metadata of the played input.
    pub metadata: MediaMetadata,
    /// Index of the stream that was decoded.
    pub video_stream_index: usize,
    /// Width of the presented frames.
    pub output_width: u32,
    /// Height of the presented frames.
    pub output_height: u32,
    /// Packet and frame counters, and why the loop stopped.
    pub pipeline: PipelineReport,
}

/// Plays one input with one set of options.
#[derive(Debug, Clone)]
pub struct Player {
    options: PlayerOptions,
}

impl Player {
    /// Create a player. Nothing is opened until [`play`](Player::play).
    pub fn new(options: PlayerOptions) -> Self {
        Self { options }
    }

    /// The options this player runs with.
    pub fn options(&self) -> &PlayerOptions {
        &self.options
    }

    /// Open the input and set up decoding and conversion, without a window.
    ///
    /// # Errors
    ///
    /// Returns the first failure among configuration validation, opening,
    /// probing, stream selection, decoder setup and scaler setup.
    pub fn prepare(&self) -> Result<Playback, PlaybackError> {
        self.options.validate()?;

        let source = MediaSource::open(&self.options.input, self.options.dump_format)?;
        let video_stream_index = select_video_stream(&source)?;
        let decoder = VideoDecoder::open(&source, video_stream_index)?;
        let converter = FrameConverter::new(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            &self.options.output,
        )?;

        Ok(Playback {
            source,
            decoder,
            converter,
            video_stream_index,
            options: self.options.clone(),
        })
    }

    /// Play the input in an SDL window until it ends or the user quits.
    ///
    /// # Errors
    ///
    /// Any setup failure from [`prepare`](Player::prepare), a window failure,
    /// or a fatal error inside the packet loop.
    pub fn play(&self) -> Result<PlaybackReport, PlaybackError> {
        let playback = self.prepare()?;
        let (width, height) = playback.output_dimensions();

        let frame_interval = if self.options.frame_pacing {
            playback
                .metadata()
                .video
                .as_ref()
                .and_then(|video| video.frame_interval())
        } else {
            None
        };

        let mut window = SdlWindow::open(&self.options.window, width, height)?;
        let mut presenter = window.presenter(frame_interval)?;
        playback.run(&mut presenter)
    }
}

/// An input that is open and ready to decode.
pub struct Playback {
    source: MediaSource,
    decoder: VideoDecoder,
    converter: FrameConverter,
    video_stream_index: usize,
    options: PlayerOptions,
}

impl Debug for Playback {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Playback")
            .field("source", &self.source)
            .field("video_stream_index", &self.video_stream_index)
            .field("converter", &self.converter)
            .finish_non_exhaustive()
    }
}

impl Playback {
    /// Metadata of the opened input.
    pub fn metadata(&self) -> &MediaMetadata {
        self.source.metadata()
    }

    /// Index of the stream being decoded.
    pub fn video_stream_index(&self) -> usize {
        self.video_stream_index
    }

    /// `(width, height)` of the converted frames.
    pub fn output_dimensions(&self) -> (u32, u32) {
        self.converter.output_dimensions()
    }

    /// Run the packet loop, handing converted frames to `sink`.
    ///
    /// # Errors
    ///
    /// Fails on the first decoder, conversion or sink error.
    pub fn run<K: FrameSink>(self, sink: K) -> Result<PlaybackReport, PlaybackError> {
        let Playback {
            mut source,
            mut decoder,
            converter,
            video_stream_index,
            options,
        } = self;

        let (output_width, output_height) = converter.output_dimensions();
        let total = source
            .metadata()
            .video
            .as_ref()
            .map(|video| video.frame_count)
            .filter(|&count| count > 0);
        let tracker = ProgressTracker::new(options.progress.clone(), total, options.batch_size);

        let mut sink = ConvertingSink::new(converter, sink);
        sink.progress = Some((tracker, decoder.time_base()));

        log::info!(
            "Playing {} (stream {video_stream_index}, {output_width}x{output_height})",
            source.path().display(),
        );

        let result = run_pipeline(
            &mut source,
            &mut decoder,
            &mut sink,
            video_stream_index,
            &PipelineOptions::from(&options),
        );
        if let Some((tracker, _)) = sink.progress.as_mut() {
            tracker.finish();
        }
        let pipeline = result?;

        log::info!(
            "Playback finished ({:?}): {} frames presented",
            pipeline.stop_reason,
            pipeline.frames_presented,
        );

        Ok(PlaybackReport {
            metadata: source.metadata().clone(),
            video_stream_index,
            output_width,
            output_height,
            pipeline,
        })
    }
}

/// Converts each decoded frame, then forwards it to an inner sink.
pub struct ConvertingSink<S> {
    converter: FrameConverter,
    inner: S,
    progress: Option<(ProgressTracker, Rational)>,
}

impl<S> ConvertingSink<S> {
    /// Put `converter` in front of `inner`.
    pub fn new(converter: FrameConverter, inner: S) -> Self {
        Self {
            converter,
            inner,
            progress: None,
        }
    }

    /// Give back the inner sink.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: FrameSink> FrameSink for ConvertingSink<S> {
    fn present(&mut self, frame: &VideoFrame) -> Result<(), PlaybackError> {
        let converted = self.converter.convert(frame)?;
        self.inner.present(converted)?;

        if let Some((tracker, time_base)) = self.progress.as_mut() {
            tracker.advance(frame_timestamp(frame, *time_base));
        }
        Ok(())
    }

    fn poll_quit(&mut self) -> bool {
        self.inner.poll_quit()
    }
}

/// Presentation time of a decoded frame, from FFmpeg's best-effort timestamp.
fn frame_timestamp(frame: &VideoFrame, time_base: Rational) -> Option<Duration> {
    pts_to_duration(frame.timestamp(), time_base)
}
