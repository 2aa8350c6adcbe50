//! Ownership bridge between native image buffers and integer handles.
//!
//! A managed caller never holds a Rust value directly. It holds a
//! [`RawHandle`], a 64-bit integer standing for one heap-allocated
//! [`ImageBuffer`]. Each handle moves through
//! `Unallocated → Allocated → Released` exactly once:
//!
//! - [`acquire_edge_map`] mints a handle for a freshly computed edge map;
//! - [`release_edge_map`] frees it (null is a no-op).
//!
//! The bridge keeps no reference to anything it hands out. Releasing twice or
//! using a handle after release is a caller contract violation. When the
//! liveness audit is compiled in (debug builds, or the `handle-audit`
//! feature) handles are never-reused tokens looked up in a registry, and
//! misuse is reported as [`EdgeError::UnknownHandle`] instead of touching
//! freed memory. Release builds without the feature hand out the image
//! address itself.

use std::ptr::NonNull;

use log::trace;

use crate::error::{EdgeError, Result};
use crate::image::ImageBuffer;
use crate::pipeline;

/// Integer token standing for exclusive ownership of one image.
pub type RawHandle = i64;

/// The null handle.
pub const NULL_HANDLE: RawHandle = 0;

/// Whether the liveness audit is compiled into this build.
pub const HANDLE_AUDIT: bool = cfg!(any(debug_assertions, feature = "handle-audit"));

/// Handle registry.
///
/// With the audit, handles are tokens from a counter that never repeats,
/// mapped to image addresses. A stale handle stays unknown even after the
/// allocator hands its old address to another image. Without the audit the
/// handle is the address itself.
#[cfg(any(debug_assertions, feature = "handle-audit"))]
mod audit {
    use std::collections::BTreeMap;
    use std::ptr::NonNull;

    use parking_lot::{const_mutex, Mutex};

    use super::RawHandle;
    use crate::image::ImageBuffer;

    /// First token handed out; small integers are never valid handles.
    const FIRST_TOKEN: RawHandle = 0x1_0000;

    struct Registry {
        next: RawHandle,
        // Addresses are kept as integers so the registry is Send.
        live: BTreeMap<RawHandle, usize>,
    }

    static REGISTRY: Mutex<Registry> = const_mutex(Registry {
        next: FIRST_TOKEN,
        live: BTreeMap::new(),
    });

    pub(super) fn register(ptr: NonNull<ImageBuffer>) -> RawHandle {
        let mut registry = REGISTRY.lock();
        let handle = registry.next;
        registry.next += 1;
        registry.live.insert(handle, ptr.as_ptr() as usize);
        handle
    }

    pub(super) fn resolve(handle: RawHandle) -> Option<NonNull<ImageBuffer>> {
        let addr = *REGISTRY.lock().live.get(&handle)?;
        NonNull::new(addr as *mut ImageBuffer)
    }

    /// Removes `handle`; only the caller that gets `Some` owns the image.
    pub(super) fn unregister(handle: RawHandle) -> Option<NonNull<ImageBuffer>> {
        let addr = REGISTRY.lock().live.remove(&handle)?;
        NonNull::new(addr as *mut ImageBuffer)
    }
}

#[cfg(not(any(debug_assertions, feature = "handle-audit")))]
mod audit {
    use std::ptr::NonNull;

    use super::RawHandle;
    use crate::image::ImageBuffer;

    #[inline]
    pub(super) fn register(ptr: NonNull<ImageBuffer>) -> RawHandle {
        ptr.as_ptr() as usize as RawHandle
    }

    #[inline]
    pub(super) fn resolve(handle: RawHandle) -> Option<NonNull<ImageBuffer>> {
        NonNull::new(handle as usize as *mut ImageBuffer)
    }

    #[inline]
    pub(super) fn unregister(handle: RawHandle) -> Option<NonNull<ImageBuffer>> {
        resolve(handle)
    }
}

/// Heap-allocated image that can be passed across the boundary as a handle.
///
/// Dropping an `OwnedImage` frees the image. [`OwnedImage::into_raw`] gives
/// up ownership to the caller; [`OwnedImage::from_raw`] takes it back.
#[derive(Debug)]
pub struct OwnedImage {
    ptr: NonNull<ImageBuffer>,
}

// The pointee is exclusively owned and `ImageBuffer` is Send + Sync.
unsafe impl Send for OwnedImage {}
unsafe impl Sync for OwnedImage {}

impl OwnedImage {
    /// Moves `image` to the heap.
    pub fn new(image: ImageBuffer) -> Self {
        Self {
            ptr: NonNull::from(Box::leak(Box::new(image))),
        }
    }

    /// Gives up ownership, returning a freshly minted handle.
    ///
    /// The image stays allocated until the handle is passed to
    /// [`release_edge_map`] (or [`OwnedImage::from_raw`]).
    pub fn into_raw(self) -> RawHandle {
        let handle = audit::register(self.ptr);
        std::mem::forget(self);
        trace!("minted image handle {:#x}", handle);
        handle
    }

    /// Takes back ownership of a handle minted by [`OwnedImage::into_raw`].
    ///
    /// The handle is retired by this call. With the liveness audit, of two
    /// threads reclaiming the same handle exactly one succeeds.
    ///
    /// # Safety
    ///
    /// - `handle` must have come from [`OwnedImage::into_raw`] and not have
    ///   been reclaimed or released since.
    /// - No borrow obtained through [`borrow_image`] may outlive this call.
    pub unsafe fn from_raw(handle: RawHandle) -> Result<Self> {
        if handle == NULL_HANDLE {
            return Err(EdgeError::NullHandle);
        }
        let ptr = audit::unregister(handle).ok_or(EdgeError::UnknownHandle(handle))?;
        trace!("reclaimed image handle {:#x}", handle);
        Ok(Self { ptr })
    }

    /// The owned image.
    pub fn image(&self) -> &ImageBuffer {
        // SAFETY: `ptr` came from a live Box and is owned by `self`
        unsafe { self.ptr.as_ref() }
    }
}

impl Drop for OwnedImage {
    fn drop(&mut self) {
        // SAFETY: `ptr` was produced by `Box::leak` in `new` and is owned by `self`
        drop(unsafe { Box::from_raw(self.ptr.as_ptr()) });
    }
}

fn check_live(handle: RawHandle) -> Result<NonNull<ImageBuffer>> {
    if handle == NULL_HANDLE {
        return Err(EdgeError::NullHandle);
    }
    audit::resolve(handle).ok_or(EdgeError::UnknownHandle(handle))
}

/// Reports whether `handle` is currently live.
///
/// Without the liveness audit every non-null handle reports live.
pub fn is_live(handle: RawHandle) -> bool {
    check_live(handle).is_ok()
}

/// Borrows the image behind a live handle without taking ownership.
///
/// # Safety
///
/// - `handle` must be a live handle from [`OwnedImage::into_raw`].
/// - The handle must not be released while the returned reference is alive;
///   the lifetime `'a` is chosen by the caller and is not checked.
pub unsafe fn borrow_image<'a>(handle: RawHandle) -> Result<&'a ImageBuffer> {
    let ptr = check_live(handle)?;
    Ok(ptr.as_ref())
}

/// Computes the edge map of the image behind `input` and returns a new handle.
///
/// `input` stays owned by the caller and remains valid. The returned handle
/// owns a 4-channel image of the same dimensions and must be passed to
/// [`release_edge_map`] exactly once.
///
/// # Errors
///
/// `NullHandle` for a null input, `UnknownHandle` for a handle the audit does
/// not know, and any pipeline error. No handle is minted on failure.
///
/// # Safety
///
/// `input` must be null or a live handle, and must not be released
/// concurrently with this call.
pub unsafe fn acquire_edge_map(input: RawHandle) -> Result<RawHandle> {
    let image = borrow_image(input)?;
    let edges = pipeline::transform(image)?;
    Ok(OwnedImage::new(edges).into_raw())
}

/// Frees the image behind `handle`.
///
/// A null handle is a no-op.
///
/// # Errors
///
/// With the liveness audit compiled in, a handle that is not live (already
/// released, or never minted) returns `UnknownHandle` and nothing is freed.
///
/// # Safety
///
/// `handle` must be null or a live handle that is not used again after this
/// call, by this or any other thread.
pub unsafe fn release_edge_map(handle: RawHandle) -> Result<()> {
    if handle == NULL_HANDLE {
        return Ok(());
    }
    drop(OwnedImage::from_raw(handle)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_image() -> ImageBuffer {
        let data: Vec<u8> = (0..12 * 12)
            .flat_map(|i| if i % 12 < 6 { [0, 0, 0] } else { [255, 255, 255] })
            .collect();
        ImageBuffer::from_raw(12, 12, 3, data).unwrap()
    }

    #[test]
    fn test_round_trip_owned_image() {
        let handle = OwnedImage::new(step_image()).into_raw();
        assert_ne!(handle, NULL_HANDLE);
        assert!(is_live(handle));

        let owned = unsafe { OwnedImage::from_raw(handle) }.unwrap();
        assert_eq!(owned.image().width(), 12);
        drop(owned);

        if HANDLE_AUDIT {
            assert!(!is_live(handle));
        }
    }

    #[test]
    fn test_acquire_leaves_input_valid() {
        let input = OwnedImage::new(step_image()).into_raw();
        let output = unsafe { acquire_edge_map(input) }.unwrap();
        assert_ne!(input, output);

        let image = unsafe { borrow_image(output) }.unwrap();
        assert_eq!(image.width(), 12);
        assert_eq!(image.height(), 12);
        assert_eq!(image.channels(), 4);

        assert!(is_live(input));
        unsafe {
            release_edge_map(output).unwrap();
            release_edge_map(input).unwrap();
        }
    }

    #[test]
    fn test_acquire_null_fails() {
        let err = unsafe { acquire_edge_map(NULL_HANDLE) }.unwrap_err();
        assert!(matches!(err, EdgeError::NullHandle));
    }

    #[test]
    fn test_release_null_is_noop() {
        unsafe { release_edge_map(NULL_HANDLE) }.unwrap();
        assert!(!is_live(NULL_HANDLE));
    }

    #[cfg(any(debug_assertions, feature = "handle-audit"))]
    #[test]
    fn test_audit_reports_double_release() {
        let handle = OwnedImage::new(step_image()).into_raw();
        unsafe { release_edge_map(handle) }.unwrap();

        let err = unsafe { release_edge_map(handle) }.unwrap_err();
        assert!(matches!(err, EdgeError::UnknownHandle(h) if h == handle));
    }

    #[cfg(any(debug_assertions, feature = "handle-audit"))]
    #[test]
    fn test_audit_stale_handle_survives_address_reuse() {
        let stale = OwnedImage::new(step_image()).into_raw();
        unsafe { release_edge_map(stale) }.unwrap();

        // Same size, so the allocator is free to hand back the same address.
        let fresh = OwnedImage::new(step_image()).into_raw();
        assert_ne!(fresh, stale);

        let err = unsafe { release_edge_map(stale) }.unwrap_err();
        assert!(matches!(err, EdgeError::UnknownHandle(h) if h == stale));
        assert!(is_live(fresh));
        assert_eq!(unsafe { borrow_image(fresh) }.unwrap(), &step_image());

        unsafe { release_edge_map(fresh) }.unwrap();
    }

    #[cfg(any(debug_assertions, feature = "handle-audit"))]
    #[test]
    fn test_audit_handles_are_not_addresses() {
        let owned = OwnedImage::new(step_image());
        let addr = owned.image() as *const ImageBuffer as usize as RawHandle;
        let handle = owned.into_raw();
        assert_ne!(handle, addr);
        assert!(!is_live(addr));
        unsafe { release_edge_map(handle) }.unwrap();
    }

    #[cfg(any(debug_assertions, feature = "handle-audit"))]
    #[test]
    fn test_audit_rejects_foreign_handle() {
        // Never minted; the audit rejects it before any dereference.
        let bogus: RawHandle = 0x10;
        assert!(matches!(
            unsafe { acquire_edge_map(bogus) },
            Err(EdgeError::UnknownHandle(0x10))
        ));
        assert!(matches!(
            unsafe { borrow_image(bogus) },
            Err(EdgeError::UnknownHandle(0x10))
        ));
    }
}
