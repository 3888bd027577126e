//! Transcode orchestration: decode -> blur every frame -> re-encode to MP4.
//!
//! One call runs one complete, synchronous pipeline. Request-scoped temp
//! files back the demuxer and muxer and are deleted on every exit path by
//! their drop guards.

use std::io::Write;
use std::path::Path;

use crate::blur;
use crate::decoder::VideoDecoder;
use crate::encoder::VideoEncoder;
use crate::error::PipeError;
use crate::frame::FrameConverter;
use crate::input::VideoInput;
use crate::output::Mp4Output;

/// Blurs every frame of `input` (a complete video file) with a `kernel`-wide
/// Gaussian and returns the complete bytes of the resulting MP4.
///
/// No partial output: any failure drops both temp files and surfaces a single
/// typed error, with `OpenSource` marking an unreadable source.
pub fn blur_video(input: &[u8], kernel: usize) -> Result<Vec<u8>, PipeError> {
    if input.is_empty() {
        return Err(PipeError::EmptyInput);
    }

    let mut source = tempfile::Builder::new()
        .prefix("plateblur-in-")
        .suffix(".mp4")
        .tempfile()?;
    source.write_all(input)?;
    source.as_file().sync_all()?;

    let dest = tempfile::Builder::new()
        .prefix("plateblur-out-")
        .suffix(".mp4")
        .tempfile()?
        .into_temp_path();

    run(source.path(), &dest, kernel)?;
    Ok(std::fs::read(&dest)?)
}

fn run(source: &Path, dest: &Path, kernel: usize) -> Result<(), PipeError> {
    let mut input = VideoInput::open(source)?;
    let meta = *input.meta();
    log::debug!(
        "transcode start: {}x{} @ {:.2} fps",
        meta.width,
        meta.height,
        meta.fps()
    );

    let mut decoder = VideoDecoder::new(&input)?;
    let mut output = Mp4Output::create(dest)?;
    let mut encoder = VideoEncoder::new(&meta, output.needs_global_header())?;
    output.add_video_stream(&encoder)?;

    let mut converter = FrameConverter::new();
    let mut frames: u64 = 0;

    while let Some(packet) = input.read_packet() {
        decoder.send_packet(&packet)?;
        frames += drain_decoder(
            &mut decoder,
            &mut converter,
            &mut encoder,
            &mut output,
            kernel,
        )?;
    }
    decoder.send_eof()?;
    frames += drain_decoder(
        &mut decoder,
        &mut converter,
        &mut encoder,
        &mut output,
        kernel,
    )?;

    encoder.send_eof()?;
    drain_encoder(&mut encoder, &mut output)?;
    output.finish()?;

    log::debug!("transcode done: {} frames", frames);
    Ok(())
}

/// Blurs and encodes every frame the decoder has ready, in decode order.
fn drain_decoder(
    decoder: &mut VideoDecoder,
    converter: &mut FrameConverter,
    encoder: &mut VideoEncoder,
    output: &mut Mp4Output,
    kernel: usize,
) -> Result<u64, PipeError> {
    let mut frames = 0;
    while let Some(decoded) = decoder.receive_frame()? {
        let pixels = converter.to_pixels(&decoded)?;
        let blurred = blur::blur_frame(&pixels, kernel);
        encoder.send_frame(&blurred)?;
        drain_encoder(encoder, output)?;
        frames += 1;
    }
    Ok(frames)
}

fn drain_encoder(encoder: &mut VideoEncoder, output: &mut Mp4Output) -> Result<(), PipeError> {
    while let Some(packet) = encoder.receive_packet()? {
        output.write_packet(packet, encoder.time_base())?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "transcode_test.rs"]
mod transcode_test;
