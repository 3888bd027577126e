pub use ffmpeg_next::Rational;

/// Registers FFmpeg components (formats, codecs). Call once at startup
/// before opening any input or encoder.
pub fn init() -> Result<(), error::PipeError> {
    ffmpeg_next::init().map_err(error::PipeError::from)
}

pub mod blur;
pub mod decoder;
pub mod detect;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod input;
pub mod output;
pub mod scaler;
pub mod transcode;
