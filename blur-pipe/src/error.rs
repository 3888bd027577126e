use crate::frame::Rect;

/// Pipeline failure. `OpenSource` means the input could not be opened at all
/// (unsupported or corrupt container, missing video stream parameters); every
/// other variant means the source was readable but no output could be produced.
#[derive(Debug, thiserror::Error)]
pub enum PipeError {
    #[error("empty input payload")]
    EmptyInput,

    #[error("could not open source video")]
    OpenSource(#[source] ffmpeg_next::Error),

    #[error("source has no video stream")]
    NoVideoStream,

    #[error("mpeg4 encoder not available in this ffmpeg build")]
    EncoderUnavailable,

    #[error("region {region:?} out of bounds for {width}x{height} frame")]
    InvalidRegion {
        region: Rect,
        width: u32,
        height: u32,
    },

    #[error("transcode failed")]
    Transcode(#[from] ffmpeg_next::Error),

    #[error("i/o error")]
    Io(#[from] std::io::Error),
}
