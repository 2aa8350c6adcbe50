//! The edge-map pipeline: luma → Gaussian blur → Canny → RGBA expansion.
//!
//! Parameters are fixed. They are gathered in [`EDGE_PARAMS`] so they can be
//! inspected and tested, but no public entry point accepts other values.

use log::debug;
use ndarray::{Array3, ArrayView3};

use crate::error::Result;
use crate::filters::blur::gaussian_blur_u8;
use crate::filters::edge::{canny_u8, gray_to_rgba_u8, EDGE_ON};
use crate::filters::grayscale::intensity_u8;
use crate::image::ImageBuffer;

/// Algorithm parameters for the edge-map pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeParams {
    /// Gaussian footprint in taps per axis
    pub kernel_size: usize,
    /// Gaussian standard deviation
    pub sigma: f64,
    /// Hysteresis low threshold (candidate edges)
    pub low_threshold: f64,
    /// Hysteresis high threshold (definite edges)
    pub high_threshold: f64,
}

/// The parameters every public entry point uses.
pub const EDGE_PARAMS: EdgeParams = EdgeParams {
    kernel_size: 5,
    sigma: 1.2,
    low_threshold: 100.0,
    high_threshold: 200.0,
};

impl Default for EdgeParams {
    fn default() -> Self {
        EDGE_PARAMS
    }
}

impl EdgeParams {
    /// Thresholds as integer magnitudes, low first.
    ///
    /// Gradient magnitudes are integers, so `m > t` and `m > floor(t)` agree.
    fn integer_thresholds(&self) -> (i32, i32) {
        (
            self.low_threshold.floor() as i32,
            self.high_threshold.floor() as i32,
        )
    }
}

/// Compute the edge map of an image buffer.
///
/// # Returns
/// A 4-channel buffer of the same width and height in which every pixel is
/// either (0, 0, 0, 0) or (255, 255, 255, 255)
pub fn transform(input: &ImageBuffer) -> Result<ImageBuffer> {
    let edges = edge_map_with(input.view(), &EDGE_PARAMS)?;
    ImageBuffer::from_array(edges)
}

/// Compute the edge map of a `(height, width, channels)` array.
///
/// # Arguments
/// * `input` - Image with 1 (gray), 3 (BGR) or 4 (RGBA) channels
///
/// # Returns
/// Edge map of shape (height, width, 4), or `UnsupportedChannels`
pub fn edge_map_u8(input: ArrayView3<u8>) -> Result<Array3<u8>> {
    edge_map_with(input, &EDGE_PARAMS)
}

pub(crate) fn edge_map_with(input: ArrayView3<u8>, params: &EdgeParams) -> Result<Array3<u8>> {
    let (height, width, channels) = input.dim();

    let gray = intensity_u8(input)?;
    let blurred = gaussian_blur_u8(gray.view(), params.kernel_size, params.sigma);
    let (low, high) = params.integer_thresholds();
    let edges = canny_u8(blurred.view(), low, high);

    debug!(
        "edge map {}x{}x{} -> {} edge pixels",
        width,
        height,
        channels,
        edges.iter().filter(|&&v| v == EDGE_ON).count()
    );

    Ok(gray_to_rgba_u8(edges.view()))
}
