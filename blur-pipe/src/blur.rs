//! Separable Gaussian blur over packed pixel buffers.

use crate::error::PipeError;
use crate::frame::{PixelFrame, Rect};

/// Kernel size used by the full-frame blur in the transcode pipeline.
pub const DEFAULT_KERNEL: usize = 25;

/// Normalized 1-D Gaussian weights for an odd `ksize`, matching OpenCV's
/// `getGaussianKernel`: fixed tables for small kernels, otherwise the
/// `sigma = 0.3*((ksize-1)*0.5 - 1) + 0.8` formula.
pub fn gaussian_kernel(ksize: usize) -> Vec<f32> {
    assert!(ksize % 2 == 1 && ksize > 0, "kernel size must be odd");
    match ksize {
        1 => return vec![1.0],
        3 => return vec![0.25, 0.5, 0.25],
        5 => return vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        7 => {
            return vec![
                0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
            ];
        }
        _ => {}
    }
    let sigma = 0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (ksize / 2) as f32;
    let mut kernel: Vec<f32> = (0..ksize)
        .map(|i| {
            let d = i as f32 - half;
            (-d * d / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Reflect-101 border indexing (`-1 -> 1`, `n -> n-2`), folded until in range
/// so kernels wider than the image stay defined.
fn reflect101(mut i: isize, n: isize) -> usize {
    if n == 1 {
        return 0;
    }
    loop {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * (n - 1) - i;
        } else {
            return i as usize;
        }
    }
}

/// Blurs an interleaved `channels`-per-pixel plane. Two separable passes with
/// an f32 intermediate, rounded back to u8.
pub fn blur_plane(data: &[u8], width: usize, height: usize, channels: usize, ksize: usize) -> Vec<u8> {
    assert_eq!(data.len(), width * height * channels);
    let kernel = gaussian_kernel(ksize);
    let half = (ksize / 2) as isize;
    let row = width * channels;

    // horizontal
    let mut tmp = vec![0.0f32; data.len()];
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut acc = 0.0f32;
                for (k, w) in kernel.iter().enumerate() {
                    let sx = reflect101(x as isize + k as isize - half, width as isize);
                    acc += w * data[y * row + sx * channels + c] as f32;
                }
                tmp[y * row + x * channels + c] = acc;
            }
        }
    }

    // vertical
    let mut out = vec![0u8; data.len()];
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut acc = 0.0f32;
                for (k, w) in kernel.iter().enumerate() {
                    let sy = reflect101(y as isize + k as isize - half, height as isize);
                    acc += w * tmp[sy * row + x * channels + c];
                }
                out[y * row + x * channels + c] = acc.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}

/// Full-frame Gaussian blur; every pixel becomes a weighted average of its
/// neighborhood. Identity (within rounding) on uniform frames.
pub fn blur_frame(frame: &PixelFrame, ksize: usize) -> PixelFrame {
    let out = blur_plane(
        frame.data(),
        frame.width() as usize,
        frame.height() as usize,
        crate::frame::CHANNELS,
        ksize,
    );
    PixelFrame::from_data(out, frame.width(), frame.height())
}

/// Blurs only `region` in place, treating it as an independent sub-image
/// (borders reflect within the region). A rectangle outside the frame is a
/// caller contract violation and is rejected, leaving the frame untouched.
pub fn blur_region(frame: &mut PixelFrame, region: Rect, ksize: usize) -> Result<(), PipeError> {
    let patch = frame.crop(region)?;
    let blurred = blur_frame(&patch, ksize);
    frame.paste(region, &blurred)
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn kernel_is_normalized() {
        for ksize in [1, 3, 5, 7, 9, 25] {
            let sum: f32 = gaussian_kernel(ksize).iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "ksize {} sums to {}", ksize, sum);
        }
    }

    #[test]
    fn kernel_small_table_matches_opencv() {
        assert_eq!(gaussian_kernel(5), vec![0.0625, 0.25, 0.375, 0.25, 0.0625]);
    }

    #[test]
    fn uniform_frame_is_identity() {
        let mut frame = PixelFrame::new(16, 16);
        for y in 0..16 {
            for x in 0..16 {
                frame.set_pixel(x, y, [200, 130, 40]);
            }
        }
        let out = blur_frame(&frame, 25);
        assert_eq!(out, frame);
    }

    #[test]
    fn checkerboard_variance_drops() {
        let frame = checkerboard(64, 64, 4);
        let out = blur_frame(&frame, 25);
        assert_ne!(out, frame);
        assert!(variance(&out) < variance(&frame) * 0.5);
    }

    #[test]
    fn region_blur_leaves_outside_untouched() {
        let frame = checkerboard(32, 32, 2);
        let mut blurred = frame.clone();
        let region = Rect::new(8, 8, 12, 12);
        blur_region(&mut blurred, region, 5).unwrap();

        // outside the rect: unchanged
        assert_eq!(blurred.pixel(0, 0), frame.pixel(0, 0));
        assert_eq!(blurred.pixel(31, 31), frame.pixel(31, 31));
        // inside: observably different somewhere
        let mut changed = false;
        for y in 8..20 {
            for x in 8..20 {
                if blurred.pixel(x, y) != frame.pixel(x, y) {
                    changed = true;
                }
            }
        }
        assert!(changed);
    }

    #[test]
    fn region_out_of_bounds_is_rejected() {
        let mut frame = checkerboard(32, 32, 2);
        let before = frame.clone();
        let err = blur_region(&mut frame, Rect::new(24, 24, 16, 16), 5).unwrap_err();
        assert!(matches!(err, PipeError::InvalidRegion { .. }));
        assert_eq!(frame, before);
    }
}
