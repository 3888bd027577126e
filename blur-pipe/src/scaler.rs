use crate::error::PipeError;

/// Pixel format converter wrapping FFmpeg's swscale context.
pub struct Scaler {
    context: ffmpeg_next::software::scaling::Context,
}

impl Scaler {
    pub fn new(
        src_format: ffmpeg_next::format::Pixel,
        src_width: u32,
        src_height: u32,
        dst_format: ffmpeg_next::format::Pixel,
        dst_width: u32,
        dst_height: u32,
    ) -> Result<Self, PipeError> {
        let context = ffmpeg_next::software::scaling::Context::get(
            src_format,
            src_width,
            src_height,
            dst_format,
            dst_width,
            dst_height,
            ffmpeg_next::software::scaling::flag::Flags::BILINEAR,
        )?;
        Ok(Self { context })
    }

    pub fn run(
        &mut self,
        frame: &ffmpeg_next::frame::Video,
        dst: &mut ffmpeg_next::frame::Video,
    ) -> Result<(), PipeError> {
        self.context.run(frame, dst).map_err(|e| e.into())
    }
}

unsafe impl Send for Scaler {}
