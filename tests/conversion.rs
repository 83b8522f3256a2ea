//! Frame conversion tests on synthetic frames.

use ffmpeg_next::{format::Pixel, frame::Video as VideoFrame};
use yuvplay::{FrameConverter, OutputOptions, PlaybackError, ScalingFilter, output_dimensions};

fn gradient_frame(width: u32, height: u32) -> VideoFrame {
    let mut frame = VideoFrame::new(Pixel::YUV420P, width, height);
    let stride = frame.stride(0);
    for (index, byte) in frame.data_mut(0).iter_mut().enumerate() {
        *byte = ((index % stride) * 255 / stride.max(1)) as u8;
    }
    frame.data_mut(1).fill(128);
    frame.data_mut(2).fill(128);
    frame
}

#[test]
fn output_is_half_size_for_every_conversion() {
    let mut converter =
        FrameConverter::new(Pixel::YUV420P, 320, 240, &OutputOptions::default()).unwrap();
    let source = gradient_frame(320, 240);

    for _ in 0..10 {
        let converted = converter.convert(&source).unwrap();
        assert_eq!((converted.width(), converted.height()), (160, 120));
        assert_eq!(converted.format(), Pixel::YUV420P);
    }
}

#[test]
fn every_filter_produces_the_same_size() {
    let source = gradient_frame(128, 96);
    for filter in [
        ScalingFilter::FastBilinear,
        ScalingFilter::Bilinear,
        ScalingFilter::Bicubic,
        ScalingFilter::Point,
        ScalingFilter::Area,
        ScalingFilter::Lanczos,
    ] {
        let options = OutputOptions {
            scale_divisor: 2,
            filter,
        };
        let mut converter = FrameConverter::new(Pixel::YUV420P, 128, 96, &options).unwrap();
        let converted = converter.convert(&source).unwrap();
        assert_eq!((converted.width(), converted.height()), (64, 48), "{filter:?}");
    }
}

#[test]
fn neutral_chroma_survives_conversion() {
    let mut converter =
        FrameConverter::new(Pixel::YUV420P, 64, 64, &OutputOptions::default()).unwrap();
    let source = gradient_frame(64, 64);
    let converted = converter.convert(&source).unwrap();

    let width = 16;
    let stride = converted.stride(1);
    for row in converted.data(1).chunks(stride).take(16) {
        assert!(row[..width].iter().all(|&value| value.abs_diff(128) <= 1));
    }
}

#[test]
fn divisor_one_keeps_source_size() {
    let options = OutputOptions {
        scale_divisor: 1,
        filter: ScalingFilter::Bicubic,
    };
    let mut converter = FrameConverter::new(Pixel::YUV420P, 100, 60, &options).unwrap();
    assert_eq!(converter.output_dimensions(), (100, 60));

    let converted = converter.convert(&gradient_frame(100, 60)).unwrap();
    assert_eq!((converted.width(), converted.height()), (100, 60));
}

#[test]
fn odd_source_dimensions_round_down() {
    assert_eq!(output_dimensions(1281, 721, 2), (640, 360));

    let mut converter =
        FrameConverter::new(Pixel::YUV420P, 131, 97, &OutputOptions::default()).unwrap();
    let converted = converter.convert(&gradient_frame(131, 97)).unwrap();
    assert_eq!((converted.width(), converted.height()), (65, 48));
}

#[test]
fn resolution_change_is_reported() {
    let mut converter =
        FrameConverter::new(Pixel::YUV420P, 320, 240, &OutputOptions::default()).unwrap();
    let error = converter.convert(&gradient_frame(640, 480)).unwrap_err();

    assert!(matches!(error, PlaybackError::ResolutionChanged { .. }));
    assert!(error.to_string().contains("640x480"));
}

#[test]
fn options_resolve_dimensions() {
    let options = OutputOptions {
        scale_divisor: 4,
        filter: ScalingFilter::Area,
    };
    assert_eq!(options.resolve_dimensions(1920, 1080), (480, 270));
    assert_eq!(OutputOptions::PIXEL_FORMAT, Pixel::YUV420P);
}
