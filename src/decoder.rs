//! Video stream selection and decoder setup.

use std::{os::raw::c_int, ptr};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational, codec::context::Context as CodecContext,
    decoder::Video as FfmpegVideoDecoder, format::Pixel, format::context::Input,
    frame::Video as VideoFrame,
};
use ffmpeg_sys_next::{AVCodec, AVMediaType};

use crate::{
    error::PlaybackError,
    pipeline::{DecodeStatus, FrameDecoder},
    source::MediaSource,
};

/// Pick the video stream FFmpeg ranks best.
///
/// The ranking is FFmpeg's own (`av_find_best_stream`). A decoder is
/// requested alongside the stream, so streams nothing can decode are skipped.
///
/// # Errors
///
/// Returns [`PlaybackError::NoVideoStream`] if the container has no video
/// stream with an available decoder.
pub fn select_video_stream(source: &MediaSource) -> Result<usize, PlaybackError> {
    let index = best_video_stream(&source.input_context)?;
    log::debug!("Selected video stream {index}");
    Ok(index)
}

/// Index of the best decodable video stream in `input_context`.
pub(crate) fn best_video_stream(input_context: &Input) -> Result<usize, PlaybackError> {
    let mut decoder: *const AVCodec = ptr::null();
    let status = unsafe {
        ffmpeg_sys_next::av_find_best_stream(
            input_context.as_ptr() as *mut _,
            AVMediaType::AVMEDIA_TYPE_VIDEO,
            -1,
            -1,
            &mut decoder,
            0,
        )
    };
    if status >= 0 && decoder.is_null() {
        return Err(PlaybackError::NoVideoStream);
    }
    stream_index_from_status(status)
}

/// Negative statuses (no stream, no decoder) mean there is nothing to play.
fn stream_index_from_status(status: c_int) -> Result<usize, PlaybackError> {
    usize::try_from(status).map_err(|_| PlaybackError::NoVideoStream)
}

/// An opened decoder for one video stream.
///
/// Exactly one of these exists per playback run.
pub struct VideoDecoder {
    decoder: FfmpegVideoDecoder,
    stream_index: usize,
    time_base: Rational,
}

impl VideoDecoder {
    /// Allocate a codec context from the stream's parameters and open it with
    /// the decoder registered for the stream's codec.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::DecoderOpen`] if the stream does not exist,
    /// no decoder is available for its codec, or the decoder fails to open.
    pub fn open(source: &MediaSource, stream_index: usize) -> Result<Self, PlaybackError> {
        let stream = source
            .input_context
            .stream(stream_index)
            .ok_or(PlaybackError::DecoderOpen {
                stream_index,
                reason: "stream does not exist".to_string(),
            })?;
        let time_base = stream.time_base();
        let parameters = stream.parameters();
        let codec_id = parameters.id();

        let codec =
            ffmpeg_next::decoder::find(codec_id).ok_or_else(|| PlaybackError::DecoderOpen {
                stream_index,
                reason: format!("no decoder available for codec {}", codec_id.name()),
            })?;

        let context = CodecContext::from_parameters(parameters).map_err(|error| {
            PlaybackError::DecoderOpen {
                stream_index,
                reason: format!("failed to read codec parameters: {error}"),
            }
        })?;
        let decoder = context
            .decoder()
            .open_as(codec)
            .and_then(|opened| opened.video())
            .map_err(|error| PlaybackError::DecoderOpen {
                stream_index,
                reason: error.to_string(),
            })?;

        log::info!(
            "Opened {} decoder: {}x{} {:?}",
            decoder
                .codec()
                .map(|codec| codec.name().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            decoder.width(),
            decoder.height(),
            decoder.format(),
        );

        Ok(Self {
            decoder,
            stream_index,
            time_base,
        })
    }

    /// Coded width negotiated by the decoder.
    pub fn width(&self) -> u32 {
        self.decoder.width()
    }

    /// Coded height negotiated by the decoder.
    pub fn height(&self) -> u32 {
        self.decoder.height()
    }

    /// Native pixel format of decoded frames.
    pub fn format(&self) -> Pixel {
        self.decoder.format()
    }

    /// Index of the stream this decoder consumes.
    pub fn stream_index(&self) -> usize {
        self.stream_index
    }

    /// Time base of the stream's timestamps.
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /// Name of the codec implementation in use.
    pub fn codec_name(&self) -> String {
        self.decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl FrameDecoder for VideoDecoder {
    fn send_packet(&mut self, packet: &Packet) -> Result<(), PlaybackError> {
        self.decoder
            .send_packet(packet)
            .map_err(|error| PlaybackError::DecoderSend(error.to_string()))
    }

    fn send_eof(&mut self) -> Result<(), PlaybackError> {
        self.decoder
            .send_eof()
            .map_err(|error| PlaybackError::DecoderSend(error.to_string()))
    }

    fn receive_frame(&mut self, frame: &mut VideoFrame) -> Result<DecodeStatus, PlaybackError> {
        decode_status(self.decoder.receive_frame(frame))
    }
}

/// Sort a receive result into frame, expected signal, or failure.
fn decode_status(result: Result<(), FfmpegError>) -> Result<DecodeStatus, PlaybackError> {
    match result {
        Ok(()) => Ok(DecodeStatus::Frame),
        Err(FfmpegError::Other {
            errno: ffmpeg_next::error::EAGAIN,
        }) => Ok(DecodeStatus::NeedsInput),
        Err(FfmpegError::Eof) => Ok(DecodeStatus::EndOfStream),
        Err(error) => Err(PlaybackError::DecoderReceive(error.to_string())),
    }
}
