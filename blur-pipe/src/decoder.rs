use crate::error::PipeError;
use crate::input::VideoInput;

/// Video decoder built from the input stream's codec parameters.
pub struct VideoDecoder {
    inner: ffmpeg_next::codec::decoder::Video,
}

impl VideoDecoder {
    /// A source whose codec cannot be set up counts as an open failure: no
    /// frame was ever produced from it.
    pub fn new(input: &VideoInput) -> Result<Self, PipeError> {
        let context = ffmpeg_next::codec::Context::from_parameters(input.parameters())
            .map_err(PipeError::OpenSource)?;
        let decoder = context.decoder().video().map_err(PipeError::OpenSource)?;

        if decoder.format() == ffmpeg_next::format::Pixel::None
            || decoder.width() == 0
            || decoder.height() == 0
        {
            return Err(PipeError::OpenSource(ffmpeg_next::Error::InvalidData));
        }

        Ok(Self { inner: decoder })
    }

    pub fn send_packet(
        &mut self,
        packet: &ffmpeg_next::codec::packet::Packet,
    ) -> Result<(), PipeError> {
        self.inner.send_packet(packet)?;
        Ok(())
    }

    pub fn send_eof(&mut self) -> Result<(), PipeError> {
        self.inner.send_eof()?;
        Ok(())
    }

    /// Next decoded frame, or `None` when the codec needs more input or has
    /// drained after EOF.
    pub fn receive_frame(&mut self) -> Result<Option<ffmpeg_next::frame::Video>, PipeError> {
        let mut frame = ffmpeg_next::frame::Video::empty();
        match self.inner.receive_frame(&mut frame) {
            Ok(()) => Ok(Some(frame)),
            Err(ffmpeg_next::Error::Eof) => Ok(None),
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffmpeg_next::util::error::EAGAIN => {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}
