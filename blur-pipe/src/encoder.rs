use ffmpeg_next::{Dictionary, Rational, codec};

use crate::error::PipeError;
use crate::frame::PixelFrame;
use crate::input::StreamMeta;
use crate::scaler::Scaler;

const BIT_RATE: usize = 2_000_000;

/// MPEG-4 video encoder at the source geometry and frame rate. Frames go in
/// as tight BGR24 grids and are converted to YUV420P on the way through; PTS
/// is a running frame index against a 1/frame_rate time base, so the original
/// frame order is preserved exactly.
pub struct VideoEncoder {
    inner: codec::encoder::Video,
    scaler: Scaler,
    time_base: Rational,
    frame_index: i64,
}

impl VideoEncoder {
    pub fn new(meta: &StreamMeta, global_header: bool) -> Result<Self, PipeError> {
        let codec =
            ffmpeg_next::encoder::find(codec::Id::MPEG4).ok_or(PipeError::EncoderUnavailable)?;
        let mut encoder = codec::Context::new_with_codec(codec).encoder().video()?;

        let time_base = meta.frame_rate.invert();
        encoder.set_width(meta.width);
        encoder.set_height(meta.height);
        encoder.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder.set_frame_rate(Some(meta.frame_rate));
        encoder.set_time_base(time_base);
        encoder.set_bit_rate(BIT_RATE);
        if global_header {
            encoder.set_flags(codec::Flags::GLOBAL_HEADER);
        }

        let opened = encoder.open_with(Dictionary::new())?;
        log::debug!(
            "mpeg4 encoder opened: {}x{} @ {}/{}",
            meta.width,
            meta.height,
            meta.frame_rate.numerator(),
            meta.frame_rate.denominator()
        );

        let scaler = Scaler::new(
            ffmpeg_next::format::Pixel::BGR24,
            meta.width,
            meta.height,
            ffmpeg_next::format::Pixel::YUV420P,
            meta.width,
            meta.height,
        )?;

        Ok(Self {
            inner: opened,
            scaler,
            time_base,
            frame_index: 0,
        })
    }

    pub fn send_frame(&mut self, frame: &PixelFrame) -> Result<(), PipeError> {
        let bgr = frame.to_video();
        let mut yuv = ffmpeg_next::frame::Video::empty();
        self.scaler.run(&bgr, &mut yuv)?;
        yuv.set_pts(Some(self.frame_index));
        self.inner.send_frame(&yuv)?;
        self.frame_index += 1;
        Ok(())
    }

    pub fn send_eof(&mut self) -> Result<(), PipeError> {
        self.inner.send_eof()?;
        Ok(())
    }

    /// Next encoded packet, or `None` when the codec wants more frames or has
    /// fully drained.
    pub fn receive_packet(&mut self) -> Result<Option<ffmpeg_next::codec::packet::Packet>, PipeError> {
        let mut packet = ffmpeg_next::codec::packet::Packet::empty();
        match self.inner.receive_packet(&mut packet) {
            Ok(()) => Ok(Some(packet)),
            Err(ffmpeg_next::Error::Eof) => Ok(None),
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffmpeg_next::util::error::EAGAIN => {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    pub(crate) fn as_video(&self) -> &codec::encoder::Video {
        &self.inner
    }
}
