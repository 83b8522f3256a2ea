//! Input opening and stream probing.
//!
//! [`MediaSource`] owns the FFmpeg demuxer context. Opening happens in two
//! phases (open the container, then probe its stream information) so the
//! container can be dumped to stderr after each phase and so each phase
//! fails with its own error.

use std::{
    ffi::CString,
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    ptr,
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, codec::context::Context as CodecContext,
    format::{Pixel, context::Input},
};

use crate::{
    configuration::PlayerOptions,
    decoder::best_video_stream,
    error::PlaybackError,
    metadata::{MediaMetadata, VideoMetadata},
    pipeline::{PacketSource, ReadStatus},
    validation::ValidationReport,
};

/// An opened and probed media container.
///
/// Created via [`MediaSource::open`]. The demuxer is closed when the value is
/// dropped, on success and error paths alike.
///
/// # Example
///
/// ```no_run
/// use yuvplay::MediaSource;
///
/// let source = MediaSource::open("video.mp4", false)?;
/// println!("{:?}", source.metadata().video);
/// # Ok::<(), yuvplay::PlaybackError>(())
/// ```
pub struct MediaSource {
    pub(crate) input_context: Input,
    pub(crate) metadata: MediaMetadata,
    pub(crate) path: PathBuf,
}

impl Debug for MediaSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaSource")
            .field("metadata", &self.metadata)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl MediaSource {
    /// Open a container and probe its streams.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, and reads enough of
    /// it to fill in stream parameters. With `dump_format` set, the container
    /// is described on stderr once after opening and once after probing.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::FileOpen`] if the file is missing, unreadable, or
    ///   not a recognisable container.
    /// - [`PlaybackError::StreamInfo`] if stream information cannot be
    ///   probed.
    pub fn open<P: AsRef<Path>>(path: P, dump_format: bool) -> Result<Self, PlaybackError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();

        log::debug!("Opening media file: {}", file_path.display());

        ffmpeg_next::init().map_err(|error| PlaybackError::FileOpen {
            path: file_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let c_path = path
            .to_str()
            .and_then(|value| CString::new(value).ok())
            .ok_or_else(|| PlaybackError::FileOpen {
                path: file_path.clone(),
                reason: "path is not valid UTF-8 or contains a NUL byte".to_string(),
            })?;

        // From here on the context is owned by `Input`, which closes it on drop.
        let mut input_context = unsafe {
            let mut format_context = ptr::null_mut();
            let status = ffmpeg_sys_next::avformat_open_input(
                &mut format_context,
                c_path.as_ptr(),
                ptr::null_mut(),
                ptr::null_mut(),
            );
            if status != 0 {
                return Err(PlaybackError::FileOpen {
                    path: file_path,
                    reason: FfmpegError::from(status).to_string(),
                });
            }
            Input::wrap(format_context)
        };

        if dump_format {
            crate::ffmpeg::dump_format(&input_context, &format!("1 => {}", file_path.display()));
        }

        let status = unsafe {
            ffmpeg_sys_next::avformat_find_stream_info(input_context.as_mut_ptr(), ptr::null_mut())
        };
        if status < 0 {
            return Err(PlaybackError::StreamInfo {
                path: file_path,
                reason: FfmpegError::from(status).to_string(),
            });
        }

        if dump_format {
            crate::ffmpeg::dump_format(&input_context, &format!("2 => {}", file_path.display()));
        }

        let metadata = read_metadata(&input_context);

        log::info!(
            "Opened media file: {} (format={}, duration={:.2}s, streams={})",
            file_path.display(),
            metadata.format,
            metadata.duration.as_secs_f64(),
            metadata.stream_count,
        );

        if let Some(video) = &metadata.video {
            log::debug!(
                "Best video stream: index={}, {}x{}, {:.2} fps, codec={}",
                video.stream_index,
                video.width,
                video.height,
                video.frames_per_second,
                video.codec,
            );
        }

        Ok(Self {
            input_context,
            metadata,
            path: file_path,
        })
    }

    /// The cached metadata.
    pub fn metadata(&self) -> &MediaMetadata {
        &self.metadata
    }

    /// The path this source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check the cached metadata against `options`.
    pub fn validate(&self, options: &PlayerOptions) -> ValidationReport {
        crate::validation::validate_playback(&self.metadata, options)
    }
}

impl PacketSource for MediaSource {
    fn read_packet(&mut self, packet: &mut Packet) -> ReadStatus {
        match packet.read(&mut self.input_context) {
            Ok(()) => ReadStatus::Packet,
            Err(FfmpegError::Eof) => ReadStatus::EndOfStream,
            Err(error) => ReadStatus::Failed(error.to_string()),
        }
    }
}

/// Collect container metadata and describe the best video stream.
///
/// The stream is described from its codec parameters without opening a
/// decoder. Parameters that cannot be read leave zero dimensions rather than
/// failing the open; decoder setup reports the real problem later.
fn read_metadata(input_context: &Input) -> MediaMetadata {
    let duration_microseconds = input_context.duration();
    let duration = if duration_microseconds > 0 {
        Duration::from_micros(duration_microseconds as u64)
    } else {
        Duration::ZERO
    };

    let video = best_video_stream(input_context)
        .ok()
        .and_then(|index| input_context.stream(index))
        .map(|stream| {
            let frame_rate = stream.avg_frame_rate();
            let frames_per_second = if frame_rate.denominator() != 0 {
                frame_rate.numerator() as f64 / frame_rate.denominator() as f64
            } else {
                let rate = stream.rate();
                if rate.denominator() != 0 {
                    rate.numerator() as f64 / rate.denominator() as f64
                } else {
                    0.0
                }
            };

            let frame_count = if frames_per_second > 0.0 {
                (duration.as_secs_f64() * frames_per_second) as u64
            } else {
                0
            };

            let parameters = stream.parameters();
            let codec = parameters.id().name().to_string();
            let (width, height, pixel_format) = match CodecContext::from_parameters(parameters) {
                Ok(context) => {
                    let (width, height, format) = unsafe {
                        let raw = context.as_ptr();
                        ((*raw).width, (*raw).height, Pixel::from((*raw).pix_fmt))
                    };
                    (
                        width.max(0) as u32,
                        height.max(0) as u32,
                        pixel_format_name(format),
                    )
                }
                Err(_) => (0, 0, None),
            };

            VideoMetadata {
                stream_index: stream.index(),
                width,
                height,
                frames_per_second,
                frame_count,
                codec,
                pixel_format,
            }
        });

    MediaMetadata {
        video,
        duration,
        format: input_context.format().name().to_string(),
        stream_count: input_context.nb_streams() as usize,
    }
}

fn pixel_format_name(format: Pixel) -> Option<String> {
    (format != Pixel::None).then(|| format!("{format:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_pixel_format_has_no_name() {
        assert_eq!(pixel_format_name(Pixel::None), None);
    }

    #[test]
    fn known_pixel_format_is_named() {
        assert_eq!(pixel_format_name(Pixel::YUV420P).as_deref(), Some("YUV420P"));
    }
}
