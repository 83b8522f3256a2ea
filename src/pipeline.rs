//! The read → decode → present loop.
//!
//! [`run_pipeline`] drives three collaborators through small traits:
//! a [`PacketSource`] (the demuxer), a [`FrameDecoder`] and a [`FrameSink`]
//! (conversion plus presentation in a real run). Keeping the seams as traits
//! lets the loop be exercised with scripted collaborators.
//!
//! Each outer iteration reads one packet, drops it if it belongs to another
//! stream, otherwise submits it and drains every frame the decoder has ready,
//! handing each to the sink before pulling the next. The packet payload is
//! released at the end of every iteration, whichever path was taken.

use ffmpeg_next::{Packet, frame::Video as VideoFrame};

use crate::{
    configuration::{PlaybackMode, PlayerOptions},
    error::PlaybackError,
    progress::CancellationToken,
};

/// Outcome of reading one packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadStatus {
    /// The packet was filled.
    Packet,
    /// The container is exhausted.
    EndOfStream,
    /// Reading failed. Ends the loop like end of stream, but is logged.
    Failed(String),
}

/// Outcome of asking the decoder for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// The frame was filled.
    Frame,
    /// The decoder needs another packet before it can produce output.
    NeedsInput,
    /// The decoder has been fully drained.
    EndOfStream,
}

/// Something packets can be read from.
pub trait PacketSource {
    /// Fill `packet` with the next packet of any stream.
    fn read_packet(&mut self, packet: &mut Packet) -> ReadStatus;
}

/// A decoder driven by the send/receive model.
pub trait FrameDecoder {
    /// Submit one compressed packet.
    fn send_packet(&mut self, packet: &Packet) -> Result<(), PlaybackError>;

    /// Signal that no more packets will follow.
    fn send_eof(&mut self) -> Result<(), PlaybackError>;

    /// Pull the next decoded frame, if one is ready.
    ///
    /// "Needs input" and "end of stream" are statuses, not errors.
    fn receive_frame(&mut self, frame: &mut VideoFrame) -> Result<DecodeStatus, PlaybackError>;
}

/// Where decoded frames go.
pub trait FrameSink {
    /// Consume one decoded frame.
    fn present(&mut self, frame: &VideoFrame) -> Result<(), PlaybackError>;

    /// Check once for a user quit request. Called after every packet.
    fn poll_quit(&mut self) -> bool {
        false
    }
}

impl<T: FrameSink + ?Sized> FrameSink for &mut T {
    fn present(&mut self, frame: &VideoFrame) -> Result<(), PlaybackError> {
        (**self).present(frame)
    }

    fn poll_quit(&mut self) -> bool {
        (**self).poll_quit()
    }
}

/// Loop control settings.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Full playback or a single packet.
    pub mode: PlaybackMode,
    /// Drain the decoder into the sink once the container is exhausted.
    pub flush_on_end_of_stream: bool,
    /// Checked at the top of every iteration; set when the sink reports a
    /// quit request.
    pub cancellation: CancellationToken,
}

impl From<&PlayerOptions> for PipelineOptions {
    fn from(options: &PlayerOptions) -> Self {
        Self {
            mode: options.mode,
            flush_on_end_of_stream: options.flush_on_end_of_stream,
            cancellation: options.cancellation.clone(),
        }
    }
}

/// Why the loop stopped without an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StopReason {
    /// The container was exhausted.
    #[default]
    EndOfStream,
    /// Reading a packet failed.
    ReadError(String),
    /// The cancellation token was set, usually by a quit request.
    Cancelled,
    /// [`PlaybackMode::FirstPacket`] finished its one iteration.
    FirstPacketDone,
}

/// Counters describing one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Packets read from the source, of any stream.
    pub packets_read: u64,
    /// Packets dropped because they belong to another stream.
    pub packets_skipped: u64,
    /// Packets handed to the decoder.
    pub packets_submitted: u64,
    /// Frames received from the decoder.
    pub frames_decoded: u64,
    /// Frames the sink accepted.
    pub frames_presented: u64,
    /// Why the loop ended.
    pub stop_reason: StopReason,
}

/// Run the packet loop until it stops or fails.
///
/// # Errors
///
/// Fails on the first error from the decoder or the sink. End of stream,
/// read failures, cancellation and the end of the single-packet demo are
/// reported through [`PipelineReport::stop_reason`] instead.
pub fn run_pipeline<S, D, K>(
    source: &mut S,
    decoder: &mut D,
    sink: &mut K,
    video_stream_index: usize,
    options: &PipelineOptions,
) -> Result<PipelineReport, PlaybackError>
where
    S: PacketSource + ?Sized,
    D: FrameDecoder + ?Sized,
    K: FrameSink + ?Sized,
{
    let mut report = PipelineReport::default();
    let mut packet = Packet::empty();
    let mut decoded_frame = VideoFrame::empty();

    let stop_reason = loop {
        if options.cancellation.is_cancelled() {
            log::info!("Playback cancelled");
            break StopReason::Cancelled;
        }

        match source.read_packet(&mut packet) {
            ReadStatus::Packet => {}
            ReadStatus::EndOfStream => {
                log::debug!("End of stream after {} packets", report.packets_read);
                if options.flush_on_end_of_stream {
                    decoder.send_eof()?;
                    drain(decoder, sink, &mut decoded_frame, &mut report)?;
                }
                break StopReason::EndOfStream;
            }
            ReadStatus::Failed(reason) => {
                log::warn!("Failed to read packet: {reason}");
                break StopReason::ReadError(reason);
            }
        }
        report.packets_read += 1;

        let outcome = if packet.stream() == video_stream_index {
            submit_and_drain(decoder, sink, &packet, &mut decoded_frame, &mut report)
        } else {
            report.packets_skipped += 1;
            Ok(())
        };
        release_packet(&mut packet);
        outcome?;

        if sink.poll_quit() {
            log::info!("Quit requested");
            options.cancellation.cancel();
        }

        if options.mode == PlaybackMode::FirstPacket {
            break StopReason::FirstPacketDone;
        }
    };

    log::debug!(
        "Pipeline stopped ({stop_reason:?}): {} packets read, {} skipped, {} frames presented",
        report.packets_read,
        report.packets_skipped,
        report.frames_presented,
    );

    report.stop_reason = stop_reason;
    Ok(report)
}

fn submit_and_drain<D, K>(
    decoder: &mut D,
    sink: &mut K,
    packet: &Packet,
    decoded_frame: &mut VideoFrame,
    report: &mut PipelineReport,
) -> Result<(), PlaybackError>
where
    D: FrameDecoder + ?Sized,
    K: FrameSink + ?Sized,
{
    decoder.send_packet(packet)?;
    report.packets_submitted += 1;
    drain(decoder, sink, decoded_frame, report)
}

/// Pull frames until the decoder wants more input or is exhausted.
fn drain<D, K>(
    decoder: &mut D,
    sink: &mut K,
    decoded_frame: &mut VideoFrame,
    report: &mut PipelineReport,
) -> Result<(), PlaybackError>
where
    D: FrameDecoder + ?Sized,
    K: FrameSink + ?Sized,
{
    loop {
        match decoder.receive_frame(decoded_frame)? {
            DecodeStatus::Frame => {
                report.frames_decoded += 1;
                sink.present(decoded_frame)?;
                report.frames_presented += 1;
            }
            DecodeStatus::NeedsInput | DecodeStatus::EndOfStream => return Ok(()),
        }
    }
}

/// Drop the packet's payload so the next read starts from a blank packet.
fn release_packet(packet: &mut Packet) {
    unsafe {
        ffmpeg_sys_next::av_packet_unref(packet.as_mut_ptr());
    }
}
