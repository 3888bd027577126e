use ffmpeg_next::Rational;

use crate::decoder::VideoDecoder;
use crate::encoder::VideoEncoder;
use crate::error::PipeError;
use crate::frame::{FrameConverter, PixelFrame};
use crate::input::{StreamMeta, VideoInput};
use crate::output::Mp4Output;
use crate::transcode::blur_video;

/// Encodes `frames` into an in-memory MP4 at `fps`, through the same encoder
/// and muxer the pipeline uses.
fn synth_video(frames: &[PixelFrame], fps: i32) -> anyhow::Result<Vec<u8>> {
    crate::init()?;
    let meta = StreamMeta {
        width: frames[0].width(),
        height: frames[0].height(),
        frame_rate: Rational::new(fps, 1),
        time_base: Rational::new(1, fps),
    };
    let path = tempfile::Builder::new()
        .suffix(".mp4")
        .tempfile()?
        .into_temp_path();

    let mut output = Mp4Output::create(&path)?;
    let mut encoder = VideoEncoder::new(&meta, output.needs_global_header())?;
    output.add_video_stream(&encoder)?;
    for frame in frames {
        encoder.send_frame(frame)?;
        while let Some(packet) = encoder.receive_packet()? {
            output.write_packet(packet, encoder.time_base())?;
        }
    }
    encoder.send_eof()?;
    while let Some(packet) = encoder.receive_packet()? {
        output.write_packet(packet, encoder.time_base())?;
    }
    output.finish()?;
    Ok(std::fs::read(&path)?)
}

/// Decodes a complete video back into metadata plus every frame as BGR24.
fn decode_all(bytes: &[u8]) -> anyhow::Result<(StreamMeta, Vec<PixelFrame>)> {
    crate::init()?;
    let mut file = tempfile::Builder::new().suffix(".mp4").tempfile()?;
    std::io::Write::write_all(&mut file, bytes)?;
    file.as_file().sync_all()?;

    let mut input = VideoInput::open(file.path())?;
    let meta = *input.meta();
    let mut decoder = VideoDecoder::new(&input)?;
    let mut converter = FrameConverter::new();
    let mut frames = Vec::new();
    while let Some(packet) = input.read_packet() {
        decoder.send_packet(&packet)?;
        while let Some(frame) = decoder.receive_frame()? {
            frames.push(converter.to_pixels(&frame)?);
        }
    }
    decoder.send_eof()?;
    while let Some(frame) = decoder.receive_frame()? {
        frames.push(converter.to_pixels(&frame)?);
    }
    Ok((meta, frames))
}

fn solid(width: u32, height: u32, v: u8) -> PixelFrame {
    let mut frame = PixelFrame::new(width, height);
    for y in 0..height {
        for x in 0..width {
            frame.set_pixel(x, y, [v, v, v]);
        }
    }
    frame
}

fn checkerboard(width: u32, height: u32, cell: u32) -> PixelFrame {
    let mut frame = PixelFrame::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let v = if (x / cell + y / cell) % 2 == 0 { 255 } else { 0 };
            frame.set_pixel(x, y, [v, v, v]);
        }
    }
    frame
}

fn variance(frame: &PixelFrame) -> f64 {
    let data = frame.data();
    let mean = data.iter().map(|&v| v as f64).sum::<f64>() / data.len() as f64;
    data.iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / data.len() as f64
}

#[test]
fn blur_video_preserves_geometry_rate_and_frame_count() -> anyhow::Result<()> {
    let frames = vec![
        solid(64, 64, 0),
        solid(64, 64, 255),
        checkerboard(64, 64, 8),
    ];
    let source = synth_video(&frames, 30)?;

    let processed = blur_video(&source, 25)?;
    let (meta, out_frames) = decode_all(&processed)?;

    assert_eq!(meta.width, 64);
    assert_eq!(meta.height, 64);
    assert_eq!(meta.frame_rate, Rational::new(30, 1));
    assert_eq!(out_frames.len(), frames.len());
    Ok(())
}

#[test]
fn blur_video_flattens_detail_and_keeps_solids() -> anyhow::Result<()> {
    let board = checkerboard(64, 64, 8);
    let frames = vec![solid(64, 64, 0), solid(64, 64, 255), board.clone()];
    let source = synth_video(&frames, 30)?;

    let processed = blur_video(&source, 25)?;
    let (_, out_frames) = decode_all(&processed)?;
    assert_eq!(out_frames.len(), 3);

    // high-frequency content collapses; codec noise stays far below the
    // original checkerboard contrast
    assert!(variance(&out_frames[2]) < variance(&board) * 0.5);
    // solid frames stay visually flat
    assert!(variance(&out_frames[0]) < 100.0);
    assert!(variance(&out_frames[1]) < 100.0);
    Ok(())
}

#[test]
fn garbage_input_fails_as_open_error() {
    crate::init().unwrap();
    let err = blur_video(&[0x42; 4096], 25).unwrap_err();
    assert!(
        matches!(err, PipeError::OpenSource(_) | PipeError::NoVideoStream),
        "unexpected error: {err:?}"
    );
}

#[test]
fn empty_input_is_rejected() {
    let err = blur_video(&[], 25).unwrap_err();
    assert!(matches!(err, PipeError::EmptyInput));
}
