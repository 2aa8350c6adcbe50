//! Owned 8-bit image buffers.
//!
//! Pixels are stored interleaved as `(height, width, channels)` in standard
//! (row-major) layout, the same shape convention the filters use for their
//! array views.

use ndarray::{Array3, ArrayView3};

use crate::error::{EdgeError, Result};

/// Channel layouts the pipeline accepts.
///
/// The 3-channel layout is blue-first while the 4-channel layout is
/// red-first; frames from the capture side arrive as either BGR or RGBA.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    /// Single intensity channel.
    Gray,
    /// Blue, green, red.
    Bgr,
    /// Red, green, blue, alpha.
    Rgba,
}

impl ChannelLayout {
    /// Maps a channel count to its layout, rejecting anything but 1, 3 or 4.
    pub fn from_count(channels: usize) -> Result<Self> {
        match channels {
            1 => Ok(Self::Gray),
            3 => Ok(Self::Bgr),
            4 => Ok(Self::Rgba),
            other => Err(EdgeError::UnsupportedChannels { channels: other }),
        }
    }

    /// Number of interleaved samples per pixel.
    #[must_use]
    pub const fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Bgr => 3,
            Self::Rgba => 4,
        }
    }
}

/// A width × height grid of 8-bit pixels with 1, 3 or 4 channels.
///
/// The buffer has no mutable accessors; once built it is read-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageBuffer {
    layout: ChannelLayout,
    pixels: Array3<u8>,
}

impl ImageBuffer {
    /// Wraps an array of shape `(height, width, channels)`.
    ///
    /// Non-standard layouts (e.g. transposed views turned owned) are copied
    /// into row-major order.
    pub fn from_array(pixels: Array3<u8>) -> Result<Self> {
        let layout = ChannelLayout::from_count(pixels.dim().2)?;
        let pixels = if pixels.is_standard_layout() {
            pixels
        } else {
            pixels.as_standard_layout().into_owned()
        };
        Ok(Self { layout, pixels })
    }

    /// Builds an image from interleaved row-major bytes.
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `channels` - Samples per pixel (1, 3 or 4)
    /// * `data` - Exactly `width * height * channels` bytes
    pub fn from_raw(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        let layout = ChannelLayout::from_count(channels)?;
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels));
        if expected != Some(data.len()) {
            return Err(EdgeError::buffer_size(width, height, channels, data.len()));
        }
        let pixels = Array3::from_shape_vec((height, width, channels), data)?;
        Ok(Self { layout, pixels })
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    /// Samples per pixel.
    #[inline]
    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    #[inline]
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// True when the image has no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Borrowed `(height, width, channels)` view.
    #[inline]
    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.pixels.view()
    }

    /// Interleaved row-major bytes.
    pub fn as_bytes(&self) -> &[u8] {
        // Standard layout is enforced by every constructor.
        self.pixels.as_slice().unwrap_or_default()
    }

    /// Consumes the buffer, returning the underlying array.
    pub fn into_array(self) -> Array3<u8> {
        self.pixels
    }
}
