//! WebAssembly exports for the edge-map pipeline.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images cross
//! the boundary as flat interleaved byte arrays; the JS side owns both the
//! input and the returned copy, so no handles are involved.

use ndarray::Array3;
use wasm_bindgen::prelude::*;

use crate::pipeline::edge_map_u8;

/// Compute the Canny edge map of an image.
///
/// # Arguments
/// * `data` - Flat interleaved bytes (length = width * height * channels)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `channels` - 1 (gray), 3 (BGR) or 4 (RGBA)
///
/// # Returns
/// Flat RGBA bytes (length = width * height * 4), each pixel all 0 or all 255
#[wasm_bindgen]
pub fn canny_edges_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
) -> Result<Vec<u8>, JsValue> {
    let input = Array3::from_shape_vec((height, width, channels), data.to_vec())
        .map_err(|e| JsValue::from_str(&format!("invalid dimensions: {e}")))?;

    let result = edge_map_u8(input.view()).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(result.into_raw_vec_and_offset().0)
}
