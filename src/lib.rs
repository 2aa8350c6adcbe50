//! edgemap
//!
//! Canny edge maps for camera frames, handed to a managed application layer
//! through integer handles.
//!
//! ## Image Format
//! Input frames are 8-bit, interleaved `(height, width, channels)`:
//! - **Grayscale**: (height, width, 1)
//! - **BGR**: (height, width, 3), blue first
//! - **RGBA**: (height, width, 4), red first, alpha ignored
//!
//! The output is always `(height, width, 4)` with every pixel either
//! (0, 0, 0, 0) or (255, 255, 255, 255).
//!
//! ## Pipeline
//! BT.601 luma → 5×5 Gaussian (σ = 1.2) → Canny (low 100, high 200) → RGBA.
//! The parameters are fixed; see [`pipeline::EDGE_PARAMS`].
//!
//! ## Handles
//! [`bridge::acquire_edge_map`] returns a [`bridge::RawHandle`] that owns the
//! result until [`bridge::release_edge_map`] is called on it, exactly once.
//! The C ABI in [`ffi`] wraps the same calls. Python (feature `python`) and
//! WASM (feature `wasm`) bindings are thin adapters over the same pipeline.

pub mod bridge;
pub mod error;
pub mod ffi;
pub mod filters;
pub mod image;
pub mod pipeline;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use bridge::{acquire_edge_map, release_edge_map, OwnedImage, RawHandle, NULL_HANDLE};
pub use error::{EdgeError, Result};
pub use image::{ChannelLayout, ImageBuffer};
pub use pipeline::{edge_map_u8, transform, EdgeParams, EDGE_PARAMS};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::bridge::{self, OwnedImage, RawHandle};
    use crate::error::EdgeError;
    use crate::image::ImageBuffer;
    use crate::pipeline;

    impl From<EdgeError> for PyErr {
        fn from(err: EdgeError) -> PyErr {
            PyValueError::new_err(err.to_string())
        }
    }

    /// Compute the Canny edge map of an image.
    ///
    /// Input is (H, W, 1), (H, W, 3) BGR or (H, W, 4) RGBA uint8.
    /// Output is (H, W, 4) uint8 with every pixel all 0 or all 255.
    #[pyfunction]
    pub fn canny_edges<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = pipeline::edge_map_u8(image.as_array())?;
        Ok(result.into_pyarray(py))
    }

    /// Copy an array into a native image and return its handle.
    ///
    /// The handle must be passed to `release_edge_map` exactly once.
    #[pyfunction]
    pub fn image_to_handle(image: PyReadonlyArray3<'_, u8>) -> PyResult<RawHandle> {
        let buffer = ImageBuffer::from_array(image.as_array().to_owned())?;
        Ok(OwnedImage::new(buffer).into_raw())
    }

    /// Compute the edge map of a native image; returns a new handle.
    ///
    /// The input handle stays valid.
    #[pyfunction]
    pub fn acquire_edge_map(input_handle: RawHandle) -> PyResult<RawHandle> {
        // SAFETY: validity of the handle is the caller's contract
        Ok(unsafe { bridge::acquire_edge_map(input_handle)? })
    }

    /// Copy the image behind a handle into a new array.
    #[pyfunction]
    pub fn handle_to_array<'py>(
        py: Python<'py>,
        handle: RawHandle,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        // SAFETY: the borrow ends before this function returns
        let image = unsafe { bridge::borrow_image(handle)? };
        Ok(image.view().to_owned().into_pyarray(py))
    }

    /// Free the image behind a handle. `0` is a no-op.
    #[pyfunction]
    pub fn release_edge_map(handle: RawHandle) -> PyResult<()> {
        // SAFETY: validity of the handle is the caller's contract
        unsafe { bridge::release_edge_map(handle)? };
        Ok(())
    }

    /// edgemap extension module
    #[pymodule]
    pub fn edgemap(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(canny_edges, m)?)?;

        // Handle lifecycle
        m.add_function(wrap_pyfunction!(image_to_handle, m)?)?;
        m.add_function(wrap_pyfunction!(acquire_edge_map, m)?)?;
        m.add_function(wrap_pyfunction!(handle_to_array, m)?)?;
        m.add_function(wrap_pyfunction!(release_edge_map, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::edgemap;
