//! License plate candidate detection.
//!
//! Grayscale -> 5x5 Gaussian smoothing -> Canny edges (low=50, high=150) ->
//! outer-boundary contour tracing -> bounding boxes filtered by enclosed area
//! and plate-like aspect ratio. Standalone capability; the transcode pipeline
//! does not consume its output.

use crate::blur::blur_plane;
use crate::frame::{CHANNELS, PixelFrame, Rect};

const SMOOTH_KERNEL: usize = 5;
const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;
const MIN_AREA: f64 = 1000.0;
const MIN_ASPECT: f32 = 2.0;
const MAX_ASPECT: f32 = 5.5;

/// Returns candidate plate rectangles in scan order (top-left first).
pub fn detect_plates(frame: &PixelFrame) -> Vec<Rect> {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    if width < 3 || height < 3 {
        return Vec::new();
    }

    let gray = grayscale(frame);
    let smoothed = blur_plane(&gray, width, height, 1, SMOOTH_KERNEL);
    let edges = canny(&smoothed, width, height, CANNY_LOW, CANNY_HIGH);

    let mut plates = Vec::new();
    for contour in outer_contours(&edges, width, height) {
        if contour_area(&contour) <= MIN_AREA {
            continue;
        }
        let rect = bounding_rect(&contour);
        let aspect = rect.aspect_ratio();
        if (MIN_ASPECT..=MAX_ASPECT).contains(&aspect) {
            plates.push(rect);
        }
    }
    plates
}

/// BT.601 luma from BGR24.
fn grayscale(frame: &PixelFrame) -> Vec<u8> {
    frame
        .data()
        .chunks_exact(CHANNELS)
        .map(|bgr| {
            (0.114 * bgr[0] as f32 + 0.587 * bgr[1] as f32 + 0.299 * bgr[2] as f32).round() as u8
        })
        .collect()
}

/// Dual-threshold Canny: Sobel gradients, L1 magnitude, non-maximum
/// suppression, then hysteresis from strong edges through weak ones.
fn canny(gray: &[u8], width: usize, height: usize, low: f32, high: f32) -> Vec<bool> {
    let size = width * height;
    let mut gx = vec![0i32; size];
    let mut gy = vec![0i32; size];
    let at = |x: usize, y: usize| gray[y * width + x] as i32;

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let i = y * width + x;
            gx[i] = (at(x + 1, y - 1) + 2 * at(x + 1, y) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2 * at(x - 1, y) + at(x - 1, y + 1));
            gy[i] = (at(x - 1, y + 1) + 2 * at(x, y + 1) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2 * at(x, y - 1) + at(x + 1, y - 1));
        }
    }
    let mag: Vec<f32> = gx
        .iter()
        .zip(&gy)
        .map(|(&x, &y)| (x.abs() + y.abs()) as f32)
        .collect();

    // non-maximum suppression along the quantized gradient direction
    let mut thin = vec![0.0f32; size];
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let i = y * width + x;
            if mag[i] == 0.0 {
                continue;
            }
            let angle = (gy[i] as f32).atan2(gx[i] as f32).to_degrees();
            let angle = if angle < 0.0 { angle + 180.0 } else { angle };
            let (a, b) = if !(22.5..157.5).contains(&angle) {
                (mag[i - 1], mag[i + 1])
            } else if angle < 67.5 {
                (mag[i - width - 1], mag[i + width + 1])
            } else if angle < 112.5 {
                (mag[i - width], mag[i + width])
            } else {
                (mag[i - width + 1], mag[i + width - 1])
            };
            if mag[i] >= a && mag[i] >= b {
                thin[i] = mag[i];
            }
        }
    }

    // hysteresis: strong pixels seed, weak pixels join when 8-connected
    let mut edges = vec![false; size];
    let mut stack = Vec::new();
    for i in 0..size {
        if thin[i] >= high && !edges[i] {
            edges[i] = true;
            stack.push(i);
            while let Some(j) = stack.pop() {
                let (x, y) = (j % width, j / width);
                for dy in -1i32..=1 {
                    for dx in -1i32..=1 {
                        let nx = x as i32 + dx;
                        let ny = y as i32 + dy;
                        if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                            continue;
                        }
                        let n = ny as usize * width + nx as usize;
                        if !edges[n] && thin[n] >= low {
                            edges[n] = true;
                            stack.push(n);
                        }
                    }
                }
            }
        }
    }
    edges
}

/// Outer boundary of every 8-connected edge component, traced with
/// Moore-neighbor following from the component's first pixel in scan order.
fn outer_contours(edges: &[bool], width: usize, height: usize) -> Vec<Vec<(i32, i32)>> {
    let mut visited = vec![false; edges.len()];
    let mut contours = Vec::new();

    for start in 0..edges.len() {
        if !edges[start] || visited[start] {
            continue;
        }
        // flood the whole component so it is traced only once
        let mut component = Vec::new();
        let mut stack = vec![start];
        visited[start] = true;
        while let Some(i) = stack.pop() {
            component.push(i);
            let (x, y) = (i % width, i / width);
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                        continue;
                    }
                    let n = ny as usize * width + nx as usize;
                    if edges[n] && !visited[n] {
                        visited[n] = true;
                        stack.push(n);
                    }
                }
            }
        }
        contours.push(trace_boundary(edges, width, height, start, component.len()));
    }
    contours
}

/// Moore-neighbor boundary following, clockwise, starting left of the first
/// pixel. Iterations are capped so degenerate one-pixel-wide shapes terminate.
fn trace_boundary(
    edges: &[bool],
    width: usize,
    height: usize,
    start: usize,
    component_len: usize,
) -> Vec<(i32, i32)> {
    // clockwise Moore neighborhood, starting west
    const DIRS: [(i32, i32); 8] = [
        (-1, 0),
        (-1, -1),
        (0, -1),
        (1, -1),
        (1, 0),
        (1, 1),
        (0, 1),
        (-1, 1),
    ];
    let is_edge = |x: i32, y: i32| {
        x >= 0
            && y >= 0
            && x < width as i32
            && y < height as i32
            && edges[y as usize * width + x as usize]
    };

    let start_pos = ((start % width) as i32, (start / width) as i32);
    let mut boundary = vec![start_pos];
    let mut current = start_pos;
    let mut dir = 0usize; // backtrack direction: west of start is guaranteed background

    let max_steps = component_len * 4 + 8;
    for _ in 0..max_steps {
        let mut found = None;
        for step in 0..8 {
            let d = (dir + step) % 8;
            let cand = (current.0 + DIRS[d].0, current.1 + DIRS[d].1);
            if is_edge(cand.0, cand.1) {
                found = Some((cand, d));
                break;
            }
        }
        let Some((next, d)) = found else {
            break; // isolated pixel
        };
        if next == start_pos {
            break;
        }
        boundary.push(next);
        current = next;
        // restart the scan just past the direction we came from
        dir = (d + 5) % 8;
    }
    boundary
}

/// Shoelace area of the traced boundary polygon.
fn contour_area(contour: &[(i32, i32)]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }
    let mut sum = 0i64;
    for i in 0..contour.len() {
        let (x0, y0) = contour[i];
        let (x1, y1) = contour[(i + 1) % contour.len()];
        sum += x0 as i64 * y1 as i64 - x1 as i64 * y0 as i64;
    }
    (sum.abs() as f64) / 2.0
}

fn bounding_rect(contour: &[(i32, i32)]) -> Rect {
    let min_x = contour.iter().map(|p| p.0).min().unwrap_or(0);
    let max_x = contour.iter().map(|p| p.0).max().unwrap_or(0);
    let min_y = contour.iter().map(|p| p.1).min().unwrap_or(0);
    let max_y = contour.iter().map(|p| p.1).max().unwrap_or(0);
    Rect::new(
        min_x as u32,
        min_y as u32,
        (max_x - min_x + 1) as u32,
        (max_y - min_y + 1) as u32,
    )
}
