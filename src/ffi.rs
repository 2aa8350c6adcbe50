//! C ABI entry points.
//!
//! Handles are 64-bit integers (0 = null) so a JNI-style `long` can carry
//! them unchanged. Errors never unwind across the boundary: failures are
//! logged and reported as a null handle or a negative status code (see
//! [`EdgeError::status_code`]); panics are caught and reported as
//! [`STATUS_PANIC`].

use std::panic::{self, AssertUnwindSafe};

use log::error;

use crate::bridge::{self, OwnedImage, RawHandle, NULL_HANDLE};
use crate::error::{EdgeError, Result, STATUS_OK, STATUS_PANIC};
use crate::image::ImageBuffer;

fn guard<T>(op: &str, f: impl FnOnce() -> Result<T>) -> std::result::Result<T, i32> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            error!("{op} failed: {err}");
            Err(err.status_code())
        }
        Err(_) => {
            error!("{op} panicked");
            Err(STATUS_PANIC)
        }
    }
}

/// Copies a caller frame into a new bridge-owned image.
///
/// Returns the image handle, or 0 if the shape is invalid, a dimension
/// exceeds `i32::MAX`, or `data` is null with a non-zero `len`. Release the handle with [`edgemap_release`].
///
/// # Safety
///
/// `data` must point to `len` readable bytes (it may be null when `len` is 0).
#[no_mangle]
pub unsafe extern "C" fn edgemap_image_create(
    width: u32,
    height: u32,
    channels: u32,
    data: *const u8,
    len: usize,
) -> RawHandle {
    let result = guard("edgemap_image_create", || {
        if width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(EdgeError::DimensionOverflow {
                width: width as usize,
                height: height as usize,
            });
        }
        let bytes = if len == 0 {
            Vec::new()
        } else if data.is_null() {
            return Err(EdgeError::NullHandle);
        } else {
            std::slice::from_raw_parts(data, len).to_vec()
        };
        let image = ImageBuffer::from_raw(width as usize, height as usize, channels as usize, bytes)?;
        Ok(OwnedImage::new(image).into_raw())
    });
    result.unwrap_or(NULL_HANDLE)
}

/// Computes the edge map of `input`; returns a new handle or 0 on failure.
///
/// # Safety
///
/// `input` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn edgemap_acquire(input: RawHandle) -> RawHandle {
    guard("edgemap_acquire", || bridge::acquire_edge_map(input)).unwrap_or(NULL_HANDLE)
}

/// Computes the edge map of `input`, writing the new handle to `out_handle`.
///
/// Returns 0 on success or a negative status code. On failure `out_handle`
/// is set to 0.
///
/// # Safety
///
/// - `input` must be null or a live handle.
/// - `out_handle` must be null or valid for a single `i64` write.
#[no_mangle]
pub unsafe extern "C" fn edgemap_acquire_checked(input: RawHandle, out_handle: *mut RawHandle) -> i32 {
    if out_handle.is_null() {
        error!("edgemap_acquire_checked: null output pointer");
        return EdgeError::NullHandle.status_code();
    }
    match guard("edgemap_acquire_checked", || bridge::acquire_edge_map(input)) {
        Ok(handle) => {
            *out_handle = handle;
            STATUS_OK
        }
        Err(code) => {
            *out_handle = NULL_HANDLE;
            code
        }
    }
}

/// Frees the image behind `handle`. Null is a no-op.
///
/// # Safety
///
/// `handle` must be null or a live handle that is not used afterwards.
#[no_mangle]
pub unsafe extern "C" fn edgemap_release(handle: RawHandle) {
    let _ = guard("edgemap_release", || bridge::release_edge_map(handle));
}

unsafe fn with_image<T>(
    op: &str,
    handle: RawHandle,
    f: impl FnOnce(&ImageBuffer) -> Result<T>,
) -> std::result::Result<T, i32> {
    guard(op, || f(bridge::borrow_image(handle)?))
}

fn dimension_i32(image: &ImageBuffer, value: usize) -> Result<i32> {
    i32::try_from(value).map_err(|_| EdgeError::DimensionOverflow {
        width: image.width(),
        height: image.height(),
    })
}

/// Width of the image behind `handle`, or a negative status code.
///
/// Dimensions are bounded by `i32::MAX` at [`edgemap_image_create`]; a wider
/// image reaching this query reports the dimension-overflow code.
///
/// # Safety
///
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn edgemap_image_width(handle: RawHandle) -> i32 {
    with_image("edgemap_image_width", handle, |image| dimension_i32(image, image.width())).unwrap_or_else(|code| code)
}

/// Height of the image behind `handle`, or a negative status code.
///
/// # Safety
///
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn edgemap_image_height(handle: RawHandle) -> i32 {
    with_image("edgemap_image_height", handle, |image| dimension_i32(image, image.height())).unwrap_or_else(|code| code)
}

/// Channel count of the image behind `handle`, or a negative status code.
///
/// # Safety
///
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn edgemap_image_channels(handle: RawHandle) -> i32 {
    with_image("edgemap_image_channels", handle, |image| Ok(image.channels() as i32)).unwrap_or_else(|code| code)
}

/// Copies the interleaved pixels of `handle` into `dst`.
///
/// Returns the number of bytes written, or a negative status code. When
/// `capacity` is smaller than the image the buffer-size code is returned and
/// nothing is written.
///
/// # Safety
///
/// - `handle` must be null or a live handle.
/// - `dst` must be valid for `capacity` byte writes.
#[no_mangle]
pub unsafe extern "C" fn edgemap_image_copy_pixels(handle: RawHandle, dst: *mut u8, capacity: usize) -> i64 {
    let result = guard("edgemap_image_copy_pixels", || {
        let image = bridge::borrow_image(handle)?;
        let bytes = image.as_bytes();
        if bytes.len() > capacity || (dst.is_null() && !bytes.is_empty()) {
            return Err(EdgeError::buffer_size(image.width(), image.height(), image.channels(), capacity));
        }
        if !bytes.is_empty() {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), dst, bytes.len());
        }
        Ok(bytes.len() as i64)
    });
    result.unwrap_or_else(|code| code as i64)
}
