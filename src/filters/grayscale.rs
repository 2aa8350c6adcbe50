//! Luma reduction from 1, 3 or 4 channel u8 images to one intensity plane.
//!
//! Uses ITU-R BT.601 weights (0.299, 0.587, 0.114) in 14-bit fixed point,
//! so the result is exact integer arithmetic and identical on every target.
//!
//! ## Channel order
//!
//! - **Gray**: (height, width, 1) - copied through
//! - **BGR**: (height, width, 3) - channel 0 is *blue*
//! - **RGBA**: (height, width, 4) - channel 0 is *red*, alpha ignored
//!
//! The 3- and 4-channel paths deliberately disagree on channel order; the
//! same bytes fed as BGR and as RGBA give different intensities.

use ndarray::{Array2, ArrayView3, Axis};

use crate::error::Result;
use crate::image::ChannelLayout;

const LUMA_SHIFT: u32 = 14;
const LUMA_R: u32 = 4899; // 0.299 * 2^14
const LUMA_G: u32 = 9617; // 0.587 * 2^14
const LUMA_B: u32 = 1868; // 0.114 * 2^14
const LUMA_ROUND: u32 = 1 << (LUMA_SHIFT - 1);

/// BT.601 luma of one pixel, rounded to nearest.
#[inline]
pub fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    let sum = LUMA_R * r as u32 + LUMA_G * g as u32 + LUMA_B * b as u32;
    ((sum + LUMA_ROUND) >> LUMA_SHIFT) as u8
}

/// Reduce an image to a single intensity plane.
///
/// # Arguments
/// * `input` - Image with 1, 3 (BGR) or 4 (RGBA) channels
///
/// # Returns
/// Intensity plane of shape (height, width), or `UnsupportedChannels`
pub fn intensity_u8(input: ArrayView3<u8>) -> Result<Array2<u8>> {
    let (height, width, channels) = input.dim();

    let gray = match ChannelLayout::from_count(channels)? {
        ChannelLayout::Gray => input.index_axis(Axis(2), 0).to_owned(),
        ChannelLayout::Bgr => Array2::from_shape_fn((height, width), |(y, x)| {
            luma_u8(input[[y, x, 2]], input[[y, x, 1]], input[[y, x, 0]])
        }),
        ChannelLayout::Rgba => Array2::from_shape_fn((height, width), |(y, x)| {
            luma_u8(input[[y, x, 0]], input[[y, x, 1]], input[[y, x, 2]])
        }),
    };

    Ok(gray)
}
