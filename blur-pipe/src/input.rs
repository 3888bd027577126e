use std::path::Path;

use ffmpeg_next::Rational;

use crate::error::PipeError;

/// Metadata of the source video stream. The encoder must be configured with
/// identical width/height/frame_rate or the output container is corrupt.
#[derive(Debug, Clone, Copy)]
pub struct StreamMeta {
    pub width: u32,
    pub height: u32,
    pub frame_rate: Rational,
    pub time_base: Rational,
}

impl StreamMeta {
    pub fn fps(&self) -> f32 {
        self.frame_rate.numerator() as f32 / self.frame_rate.denominator() as f32
    }
}

/// Demuxer over the best video stream of a container.
pub struct VideoInput {
    inner: ffmpeg_next::format::context::Input,
    stream_index: usize,
    parameters: ffmpeg_next::codec::Parameters,
    meta: StreamMeta,
}

impl VideoInput {
    /// Opens `path`. An unsupported or corrupt container fails with
    /// `OpenSource`; a container without a video stream with `NoVideoStream`.
    pub fn open(path: &Path) -> Result<Self, PipeError> {
        let input = ffmpeg_next::format::input(&path).map_err(PipeError::OpenSource)?;
        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or(PipeError::NoVideoStream)?;

        let stream_index = stream.index();
        let parameters = stream.parameters();
        let (width, height) = video_size(&parameters);
        if width == 0 || height == 0 {
            return Err(PipeError::OpenSource(ffmpeg_next::Error::InvalidData));
        }

        let mut frame_rate = stream.avg_frame_rate();
        if frame_rate.numerator() <= 0 {
            frame_rate = stream.rate();
        }
        if frame_rate.numerator() <= 0 {
            log::warn!("source reports no frame rate, assuming 25/1");
            frame_rate = Rational::new(25, 1);
        }

        let meta = StreamMeta {
            width,
            height,
            frame_rate,
            time_base: stream.time_base(),
        };

        Ok(Self {
            inner: input,
            stream_index,
            parameters,
            meta,
        })
    }

    pub fn meta(&self) -> &StreamMeta {
        &self.meta
    }

    pub fn parameters(&self) -> ffmpeg_next::codec::Parameters {
        self.parameters.clone()
    }

    /// Next packet of the video stream; `None` at end of stream.
    pub fn read_packet(&mut self) -> Option<ffmpeg_next::codec::packet::Packet> {
        loop {
            match self.inner.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() != self.stream_index {
                        continue;
                    }
                    return Some(packet);
                }
                None => return None,
            }
        }
    }
}

/// Reads video width/height from codec parameters (not exposed by ffmpeg-next).
fn video_size(params: &ffmpeg_next::codec::Parameters) -> (u32, u32) {
    unsafe {
        let ptr = params.as_ptr() as *const ffmpeg_next::ffi::AVCodecParameters;
        ((*ptr).width.max(0) as u32, (*ptr).height.max(0) as u32)
    }
}
