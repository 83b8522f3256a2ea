//! SDL window and streaming-texture presentation.
//!
//! [`SdlWindow`] owns the SDL context, a centred OpenGL window, its canvas and
//! the event pump. [`SdlWindow::presenter`] borrows those to build a
//! [`Presenter`], which holds one IYUV streaming texture sized to the
//! converted frames and implements [`FrameSink`].
//!
//! Everything here must stay on the thread that created the window.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    thread,
    time::{Duration, Instant},
};

use ffmpeg_next::frame::Video as VideoFrame;
use sdl2::{
    EventPump, Sdl, VideoSubsystem,
    event::Event,
    keyboard::Keycode,
    pixels::PixelFormatEnum,
    render::{Texture, TextureCreator, WindowCanvas},
    video::WindowContext,
};

use crate::{configuration::WindowOptions, error::PlaybackError, pipeline::FrameSink};

/// An open SDL window sized to the converted frames.
pub struct SdlWindow {
    canvas: WindowCanvas,
    texture_creator: TextureCreator<WindowContext>,
    event_pump: EventPump,
    width: u32,
    height: u32,
    _video: VideoSubsystem,
    _context: Sdl,
}

impl Debug for SdlWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SdlWindow")
            .field("title", &self.canvas.window().title())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl SdlWindow {
    /// Initialise SDL video and open a centred `width`×`height` window.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Window`] if SDL, the window or its renderer
    /// cannot be created.
    pub fn open(options: &WindowOptions, width: u32, height: u32) -> Result<Self, PlaybackError> {
        let context = sdl2::init().map_err(PlaybackError::Window)?;
        let video = context.video().map_err(PlaybackError::Window)?;

        let window = video
            .window(&options.title, width, height)
            .position_centered()
            .opengl()
            .build()
            .map_err(|error| PlaybackError::Window(error.to_string()))?;

        let canvas = window
            .into_canvas()
            .accelerated()
            .build()
            .map_err(|error| PlaybackError::Window(error.to_string()))?;
        let texture_creator = canvas.texture_creator();
        let event_pump = context.event_pump().map_err(PlaybackError::Window)?;

        log::info!("Opened window \"{}\" ({width}x{height})", options.title);

        Ok(Self {
            canvas,
            texture_creator,
            event_pump,
            width,
            height,
            _video: video,
            _context: context,
        })
    }

    /// `(width, height)` of the window.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Create the streaming texture and return a presenter drawing into this
    /// window.
    ///
    /// With `frame_interval` set, [`FrameSink::present`] sleeps so that
    /// consecutive frames are at least that far apart.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Window`] if the texture cannot be created.
    pub fn presenter(
        &mut self,
        frame_interval: Option<Duration>,
    ) -> Result<Presenter<'_>, PlaybackError> {
        let Self {
            canvas,
            texture_creator,
            event_pump,
            width,
            height,
            ..
        } = self;

        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::IYUV, *width, *height)
            .map_err(|error| PlaybackError::Window(error.to_string()))?;

        Ok(Presenter {
            canvas,
            event_pump,
            texture,
            height: *height,
            frame_interval,
            last_present: None,
        })
    }
}

/// Uploads converted frames to the texture and shows them.
pub struct Presenter<'a> {
    canvas: &'a mut WindowCanvas,
    event_pump: &'a mut EventPump,
    texture: Texture<'a>,
    height: u32,
    frame_interval: Option<Duration>,
    last_present: Option<Instant>,
}

impl Debug for Presenter<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Presenter")
            .field("height", &self.height)
            .field("frame_interval", &self.frame_interval)
            .finish_non_exhaustive()
    }
}

impl Presenter<'_> {
    fn wait_for_next_slot(&mut self) {
        if let (Some(interval), Some(last)) = (self.frame_interval, self.last_present) {
            let elapsed = last.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
        self.last_present = Some(Instant::now());
    }
}

impl FrameSink for Presenter<'_> {
    fn present(&mut self, frame: &VideoFrame) -> Result<(), PlaybackError> {
        let [(y, y_pitch), (u, u_pitch), (v, v_pitch)] = yuv_planes(frame, self.height)?;

        self.texture
            .update_yuv(None, y, y_pitch, u, u_pitch, v, v_pitch)
            .map_err(|error| PlaybackError::Window(error.to_string()))?;

        self.wait_for_next_slot();

        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, None)
            .map_err(PlaybackError::Window)?;
        self.canvas.present();
        Ok(())
    }

    fn poll_quit(&mut self) -> bool {
        matches!(
            self.event_pump.poll_event(),
            Some(Event::Quit { .. })
                | Some(Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                })
        )
    }
}

/// Borrow the three planes of a YUV 4:2:0 frame with their pitches.
///
/// The luma plane is cut to `pitch * height` bytes and each chroma plane to
/// `pitch * height / 2` bytes, the exact lengths the texture upload checks.
/// For odd heights that covers half of the last chroma row, which FFmpeg
/// always allocates.
pub(crate) fn yuv_planes(
    frame: &VideoFrame,
    height: u32,
) -> Result<[(&[u8], usize); 3], PlaybackError> {
    if frame.planes() < 3 {
        return Err(PlaybackError::Window(format!(
            "expected 3 planes, frame has {}",
            frame.planes()
        )));
    }

    let height = height as usize;
    let plane = |index: usize, length: fn(usize, usize) -> usize| {
        let pitch = frame.stride(index);
        let length = length(pitch, height);
        frame
            .data(index)
            .get(..length)
            .map(|data| (data, pitch))
            .ok_or_else(|| {
                PlaybackError::Window(format!("plane {index} is shorter than {length} bytes"))
            })
    };

    Ok([
        plane(0, luma_length)?,
        plane(1, chroma_length)?,
        plane(2, chroma_length)?,
    ])
}

fn luma_length(pitch: usize, height: usize) -> usize {
    pitch * height
}

fn chroma_length(pitch: usize, height: usize) -> usize {
    pitch * height / 2
}

#[cfg(test)]
mod tests {
    use ffmpeg_next::format::Pixel;

    use super::*;

    #[test]
    fn planes_are_cut_to_texture_rows() {
        let frame = VideoFrame::new(Pixel::YUV420P, 32, 24);
        let [(y, y_pitch), (u, u_pitch), (v, v_pitch)] = yuv_planes(&frame, 24).unwrap();

        assert_eq!(y.len(), y_pitch * 24);
        assert_eq!(u.len(), u_pitch * 12);
        assert_eq!(v.len(), v_pitch * 12);
    }

    #[test]
    fn odd_height_matches_upload_lengths() {
        // 640x267 output, as produced from a 1280x534 source.
        let frame = VideoFrame::new(Pixel::YUV420P, 640, 267);
        let [(y, y_pitch), (u, u_pitch), (v, v_pitch)] = yuv_planes(&frame, 267).unwrap();

        assert_eq!(y.len(), y_pitch * 267);
        assert_eq!(u.len(), u_pitch * 267 / 2);
        assert_eq!(v.len(), v_pitch * 267 / 2);
        assert!(u.len() > u_pitch * 133);
    }

    #[test]
    fn odd_height_chroma_stays_within_allocation() {
        let frame = VideoFrame::new(Pixel::YUV420P, 33, 25);
        let [_, (u, _), (v, _)] = yuv_planes(&frame, 25).unwrap();

        assert!(u.len() <= frame.data(1).len());
        assert!(v.len() <= frame.data(2).len());
    }

    #[test]
    fn packed_frames_are_rejected() {
        let frame = VideoFrame::new(Pixel::RGB24, 16, 16);
        assert!(matches!(yuv_planes(&frame, 16), Err(PlaybackError::Window(_))));
    }
}
