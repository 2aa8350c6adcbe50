//! Canny edge detection on u8 intensity planes.
//!
//! The detector runs three stages:
//! 1. 3×3 Sobel derivatives with replicated borders; magnitude is the L1 norm
//!    `|gx| + |gy|`.
//! 2. Non-maximum suppression along the gradient direction, quantized to
//!    horizontal, vertical and the two diagonals.
//! 3. Double-threshold hysteresis: magnitudes above `high` seed edges, and
//!    magnitudes above `low` survive only when 8-connected to a seed.
//!
//! Output is binary (0 or 255). All arithmetic after the input plane is
//! integer, so results are bit-exact across targets and thread counts.

use ndarray::{Array2, Array3, ArrayView2, Zip};

use super::core::clamp_index;

const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Fixed-point scale for the direction test.
const DIR_SHIFT: u32 = 15;
/// tan(22.5°) scaled by 2^15.
const TAN_22_5: i64 = 13573;

/// Value written for edge pixels.
pub const EDGE_ON: u8 = 255;

/// Per-pixel Sobel derivatives and L1 magnitude.
#[derive(Clone, Debug)]
pub struct Gradients {
    /// Horizontal derivative
    pub gx: Array2<i32>,
    /// Vertical derivative
    pub gy: Array2<i32>,
    /// `|gx| + |gy|`
    pub magnitude: Array2<i32>,
}

/// Quantized gradient direction used to pick the two NMS neighbors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    /// Gradient mostly along x: compare left/right.
    Horizontal,
    /// Gradient mostly along y: compare up/down.
    Vertical,
    /// gx and gy share a sign: compare up-left/down-right.
    Falling,
    /// gx and gy differ in sign: compare up-right/down-left.
    Rising,
}

#[inline]
fn quantize_direction(gx: i32, gy: i32) -> Direction {
    let ax = (gx as i64).abs();
    let ay = (gy as i64).abs() << DIR_SHIFT;
    let tg22x = ax * TAN_22_5;

    if ay < tg22x {
        return Direction::Horizontal;
    }
    // tan(67.5°) = tan(22.5°) + 2
    let tg67x = tg22x + (ax << (DIR_SHIFT + 1));
    if ay > tg67x {
        Direction::Vertical
    } else if (gx ^ gy) < 0 {
        Direction::Rising
    } else {
        Direction::Falling
    }
}

/// Compute Sobel gradients on an intensity plane.
///
/// Border pixels reuse the nearest in-bounds sample, so an image that is flat
/// up to its border has zero gradient there.
pub fn sobel_gradients(input: ArrayView2<u8>) -> Gradients {
    let (height, width) = input.dim();
    let mut gx = Array2::<i32>::zeros((height, width));
    let mut gy = Array2::<i32>::zeros((height, width));
    let mut magnitude = Array2::<i32>::zeros((height, width));

    if height == 0 || width == 0 {
        return Gradients { gx, gy, magnitude };
    }

    Zip::indexed(&mut gx)
        .and(&mut gy)
        .and(&mut magnitude)
        .par_for_each(|(y, x), out_gx, out_gy, out_mag| {
            let mut sum_x = 0i32;
            let mut sum_y = 0i32;
            for ky in 0..3 {
                let sy = clamp_index(y as isize + ky as isize - 1, height);
                for kx in 0..3 {
                    let sx = clamp_index(x as isize + kx as isize - 1, width);
                    let v = input[[sy, sx]] as i32;
                    sum_x += v * SOBEL_X[ky][kx];
                    sum_y += v * SOBEL_Y[ky][kx];
                }
            }
            *out_gx = sum_x;
            *out_gy = sum_y;
            *out_mag = sum_x.abs() + sum_y.abs();
        });

    Gradients { gx, gy, magnitude }
}

/// Thin gradient ridges to one pixel.
///
/// Returns the magnitude where a pixel is a local maximum along its gradient
/// direction and 0 elsewhere. Along the axis-aligned directions the "before"
/// neighbor must be strictly smaller and the "after" neighbor no larger, so a
/// two-pixel plateau keeps exactly its first pixel. Neighbors outside the
/// image count as 0.
pub fn non_max_suppression(grad: &Gradients) -> Array2<i32> {
    let (height, width) = grad.magnitude.dim();
    let mut suppressed = Array2::<i32>::zeros((height, width));

    let mag_at = |y: isize, x: isize| -> i32 {
        if y < 0 || x < 0 || y >= height as isize || x >= width as isize {
            0
        } else {
            grad.magnitude[[y as usize, x as usize]]
        }
    };

    for y in 0..height {
        for x in 0..width {
            let m = grad.magnitude[[y, x]];
            if m == 0 {
                continue;
            }
            let (yi, xi) = (y as isize, x as isize);

            let keep = match quantize_direction(grad.gx[[y, x]], grad.gy[[y, x]]) {
                Direction::Horizontal => m > mag_at(yi, xi - 1) && m >= mag_at(yi, xi + 1),
                Direction::Vertical => m > mag_at(yi - 1, xi) && m >= mag_at(yi + 1, xi),
                Direction::Falling => m > mag_at(yi - 1, xi - 1) && m > mag_at(yi + 1, xi + 1),
                Direction::Rising => m > mag_at(yi - 1, xi + 1) && m > mag_at(yi + 1, xi - 1),
            };

            if keep {
                suppressed[[y, x]] = m;
            }
        }
    }

    suppressed
}

/// Double-threshold hysteresis with 8-connectivity.
///
/// # Arguments
/// * `suppressed` - Thinned magnitudes from [`non_max_suppression`]
/// * `low` - Candidates need magnitude strictly above this
/// * `high` - Seeds need magnitude strictly above this
///
/// # Returns
/// Binary plane: [`EDGE_ON`] for edges, 0 elsewhere
pub fn hysteresis(suppressed: &Array2<i32>, low: i32, high: i32) -> Array2<u8> {
    let (height, width) = suppressed.dim();
    let mut edges = Array2::<u8>::zeros((height, width));
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for ((y, x), &m) in suppressed.indexed_iter() {
        if m > high {
            edges[[y, x]] = EDGE_ON;
            stack.push((y, x));
        }
    }

    // Grow seeds through connected candidates
    while let Some((y, x)) = stack.pop() {
        for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                if edges[[ny, nx]] == 0 && suppressed[[ny, nx]] > low {
                    edges[[ny, nx]] = EDGE_ON;
                    stack.push((ny, nx));
                }
            }
        }
    }

    edges
}

/// Run the full Canny detector on an already-smoothed plane.
///
/// # Arguments
/// * `input` - Intensity plane of shape (height, width)
/// * `low` - Low hysteresis threshold
/// * `high` - High hysteresis threshold
///
/// # Returns
/// Binary edge plane with the same dimensions
pub fn canny_u8(input: ArrayView2<u8>, low: i32, high: i32) -> Array2<u8> {
    let grad = sobel_gradients(input);
    let suppressed = non_max_suppression(&grad);
    hysteresis(&suppressed, low, high)
}

/// Replicate a single-channel plane into a 4-channel image.
///
/// Every channel, including the fourth, carries the same value, so "off"
/// pixels are (0, 0, 0, 0) and "on" pixels are (255, 255, 255, 255).
pub fn gray_to_rgba_u8(input: ArrayView2<u8>) -> Array3<u8> {
    let (height, width) = input.dim();
    Array3::from_shape_fn((height, width, 4), |(y, x, _)| input[[y, x]])
}
