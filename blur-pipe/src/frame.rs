use crate::error::PipeError;
use crate::scaler::Scaler;

pub const CHANNELS: usize = 3;

/// Axis-aligned rectangle in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.w as f32 / self.h as f32
    }

    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
}

/// Tightly packed BGR24 pixel grid. FFmpeg frames carry per-row padding
/// (linesize), so rows are copied out stride-by-stride on conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelFrame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelFrame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; width as usize * height as usize * CHANNELS],
            width,
            height,
        }
    }

    pub fn from_data(data: Vec<u8>, width: u32, height: u32) -> Self {
        assert_eq!(data.len(), width as usize * height as usize * CHANNELS);
        Self {
            data,
            width,
            height,
        }
    }

    /// Copies a decoded BGR24 frame into a tight buffer.
    pub fn from_video(frame: &ffmpeg_next::frame::Video) -> Self {
        debug_assert_eq!(frame.format(), ffmpeg_next::format::Pixel::BGR24);
        let width = frame.width();
        let height = frame.height();
        let stride = frame.stride(0);
        let row_len = width as usize * CHANNELS;
        let src = frame.data(0);
        let mut data = Vec::with_capacity(row_len * height as usize);
        for y in 0..height as usize {
            data.extend_from_slice(&src[y * stride..y * stride + row_len]);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Builds a BGR24 FFmpeg frame, honoring the allocated stride.
    pub fn to_video(&self) -> ffmpeg_next::frame::Video {
        let mut frame = ffmpeg_next::frame::Video::new(
            ffmpeg_next::format::Pixel::BGR24,
            self.width,
            self.height,
        );
        let stride = frame.stride(0);
        let row_len = self.width as usize * CHANNELS;
        let dst = frame.data_mut(0);
        for y in 0..self.height as usize {
            dst[y * stride..y * stride + row_len]
                .copy_from_slice(&self.data[y * row_len..(y + 1) * row_len]);
        }
        frame
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; CHANNELS] {
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, bgr: [u8; CHANNELS]) {
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        self.data[i..i + CHANNELS].copy_from_slice(&bgr);
    }

    /// Copies the `rect` sub-region out as an independent frame.
    pub fn crop(&self, rect: Rect) -> Result<PixelFrame, PipeError> {
        self.check_bounds(rect)?;
        let row_len = rect.w as usize * CHANNELS;
        let full_row = self.width as usize * CHANNELS;
        let mut data = Vec::with_capacity(row_len * rect.h as usize);
        for y in rect.y..rect.y + rect.h {
            let start = y as usize * full_row + rect.x as usize * CHANNELS;
            data.extend_from_slice(&self.data[start..start + row_len]);
        }
        Ok(PixelFrame::from_data(data, rect.w, rect.h))
    }

    /// Writes `patch` back over the `rect` sub-region.
    pub fn paste(&mut self, rect: Rect, patch: &PixelFrame) -> Result<(), PipeError> {
        self.check_bounds(rect)?;
        assert_eq!(patch.width, rect.w);
        assert_eq!(patch.height, rect.h);
        let row_len = rect.w as usize * CHANNELS;
        let full_row = self.width as usize * CHANNELS;
        for (py, y) in (rect.y..rect.y + rect.h).enumerate() {
            let dst = y as usize * full_row + rect.x as usize * CHANNELS;
            self.data[dst..dst + row_len]
                .copy_from_slice(&patch.data[py * row_len..(py + 1) * row_len]);
        }
        Ok(())
    }

    fn check_bounds(&self, rect: Rect) -> Result<(), PipeError> {
        let ok = rect.w > 0
            && rect.h > 0
            && rect.x.checked_add(rect.w).is_some_and(|r| r <= self.width)
            && rect.y.checked_add(rect.h).is_some_and(|b| b <= self.height);
        if ok {
            Ok(())
        } else {
            Err(PipeError::InvalidRegion {
                region: rect,
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Converts an arbitrary decoded frame to a tight BGR24 grid, creating the
/// swscale context on first use.
pub struct FrameConverter {
    scaler: Option<Scaler>,
}

impl FrameConverter {
    pub fn new() -> Self {
        Self { scaler: None }
    }

    pub fn to_pixels(
        &mut self,
        frame: &ffmpeg_next::frame::Video,
    ) -> Result<PixelFrame, PipeError> {
        if self.scaler.is_none() {
            self.scaler = Some(Scaler::new(
                frame.format(),
                frame.width(),
                frame.height(),
                ffmpeg_next::format::Pixel::BGR24,
                frame.width(),
                frame.height(),
            )?);
        }
        let mut bgr = ffmpeg_next::frame::Video::empty();
        self.scaler.as_mut().unwrap().run(frame, &mut bgr)?;
        Ok(PixelFrame::from_video(&bgr))
    }
}

impl Default for FrameConverter {
    fn default() -> Self {
        Self::new()
    }
}
