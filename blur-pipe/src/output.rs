use std::path::Path;

use ffmpeg_next::Rational;

use crate::encoder::VideoEncoder;
use crate::error::PipeError;

/// MP4 muxer for a single video stream. The header is written lazily on the
/// first packet and the trailer exactly once in `finish`, so a run that never
/// produced a packet does not write a dangling header.
pub struct Mp4Output {
    inner: ffmpeg_next::format::context::Output,
    stream_index: usize,
    have_written_header: bool,
    have_written_trailer: bool,
}

impl Mp4Output {
    pub fn create(path: &Path) -> Result<Self, PipeError> {
        let output = ffmpeg_next::format::output(&path)?;
        Ok(Self {
            inner: output,
            stream_index: 0,
            have_written_header: false,
            have_written_trailer: false,
        })
    }

    /// Whether the container wants codec extradata in the global header
    /// instead of in-band; the encoder flag must match.
    pub fn needs_global_header(&self) -> bool {
        self.inner
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER)
    }

    pub fn add_video_stream(&mut self, encoder: &VideoEncoder) -> Result<(), PipeError> {
        let mut stream = self
            .inner
            .add_stream(ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4))?;
        stream.set_parameters(encoder.as_video());
        self.stream_index = stream.index();
        Ok(())
    }

    pub fn write_packet(
        &mut self,
        mut packet: ffmpeg_next::codec::packet::Packet,
        source_time_base: Rational,
    ) -> Result<(), PipeError> {
        if !self.have_written_header {
            self.inner.write_header()?;
            self.have_written_header = true;
        }
        let stream_time_base = self
            .inner
            .stream(self.stream_index)
            .ok_or(ffmpeg_next::Error::StreamNotFound)?
            .time_base();
        packet.set_stream(self.stream_index);
        packet.set_position(-1);
        packet.rescale_ts(source_time_base, stream_time_base);
        packet.write_interleaved(&mut self.inner)?;
        Ok(())
    }

    pub fn finish(&mut self) -> Result<(), PipeError> {
        if self.have_written_header && !self.have_written_trailer {
            self.have_written_trailer = true;
            self.inner.write_trailer()?;
        }
        Ok(())
    }
}
