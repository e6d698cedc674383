use crate::AllocRequest;
use core::ptr::{self, NonNull};

/// The allocation capability generated code is handed.
///
/// There is no process-wide "current allocator": whoever needs storage for a
/// dynamically sized value is given an `Allocator` (or, across the C ABI, an
/// [`FcAllocator`](crate::FcAllocator)).
///
/// Implementations return blocks of at least `request.size()` bytes aligned
/// to `request.align()`. Running out of memory is not an error condition for
/// the allocator: it returns `None` and leaves the decision to the caller.
/// An allocator never terminates the process.
pub trait Allocator {
    /// Allocate a block for `request`, or `None` if none is available.
    fn allocate(&self, request: AllocRequest) -> Option<NonNull<u8>>;

    /// Return a block to the allocator.
    ///
    /// # Safety
    /// `ptr` was returned by `allocate` on this allocator and has not been
    /// released since. Foreign pointers and double release are undefined;
    /// implementations may detect and ignore some of them, but need not.
    unsafe fn release(&self, ptr: NonNull<u8>);

    /// Usable bytes behind `ptr`, if the allocator records them.
    ///
    /// # Safety
    /// `ptr` is a live block of this allocator.
    unsafe fn usable_size(&self, ptr: NonNull<u8>) -> Option<usize> {
        let _ = ptr;
        None
    }

    /// `allocate` with the null sentinel instead of `Option`, and with an
    /// unvalidated `(size, align)` pair as it arrives from generated code.
    ///
    /// An invalid request yields null as well.
    fn allocate_raw(&self, size: usize, align: usize) -> *mut u8 {
        match AllocRequest::new(size, align) {
            Ok(request) => self.allocate(request).map_or(ptr::null_mut(), NonNull::as_ptr),
            Err(e) => {
                log::warn!("rejected allocation request: {e}");
                ptr::null_mut()
            }
        }
    }

    /// `release` that accepts, and ignores, null.
    ///
    /// # Safety
    /// As for [`release`](Self::release) when `ptr` is not null.
    unsafe fn release_raw(&self, ptr: *mut u8) {
        if let Some(ptr) = NonNull::new(ptr) {
            unsafe { self.release(ptr) }
        }
    }
}

impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn allocate(&self, request: AllocRequest) -> Option<NonNull<u8>> {
        (**self).allocate(request)
    }

    #[inline]
    unsafe fn release(&self, ptr: NonNull<u8>) {
        unsafe { (**self).release(ptr) }
    }

    #[inline]
    unsafe fn usable_size(&self, ptr: NonNull<u8>) -> Option<usize> {
        unsafe { (**self).usable_size(ptr) }
    }
}
