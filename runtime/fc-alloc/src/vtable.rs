use crate::{AllocRequest, Allocator, SystemAllocator};
use core::ffi::c_void;
use core::ptr::{self, NonNull};
use fc_layout::CLayout;

/// Allocation entry point of an [`FcAllocator`].
pub type FcAllocFn = unsafe extern "C" fn(ctx: *mut c_void, size: usize, align: usize) -> *mut c_void;

/// Release entry point of an [`FcAllocator`].
pub type FcFreeFn = unsafe extern "C" fn(ctx: *mut c_void, ptr: *mut c_void);

/// The allocator capability as C sees it: a context pointer plus two entry
/// points, passed by value to whoever needs storage.
///
/// ```c
/// typedef struct FcAllocator {
///     void *ctx;
///     void *(*alloc)(void *ctx, size_t size, size_t align);
///     void (*free)(void *ctx, void *ptr);
/// } FcAllocator;
/// ```
#[derive(Debug, Copy, Clone, CLayout)]
#[repr(C)]
pub struct FcAllocator {
    ctx: *mut c_void,
    alloc: FcAllocFn,
    free: FcFreeFn,
}

static SYSTEM: SystemAllocator = SystemAllocator;

unsafe extern "C" fn alloc_with<A: Allocator>(
    ctx: *mut c_void,
    size: usize,
    align: usize,
) -> *mut c_void {
    let allocator = unsafe { &*ctx.cast_const().cast::<A>() };
    allocator.allocate_raw(size, align).cast()
}

unsafe extern "C" fn free_with<A: Allocator>(ctx: *mut c_void, ptr: *mut c_void) {
    let allocator = unsafe { &*ctx.cast_const().cast::<A>() };
    unsafe { allocator.release_raw(ptr.cast()) }
}

impl FcAllocator {
    /// The vtable of the process-wide [`SystemAllocator`].
    #[must_use]
    pub const fn system() -> Self {
        Self::from_static(&SYSTEM)
    }

    /// Expose a Rust allocator through the C vtable.
    #[must_use]
    pub const fn from_static<A: Allocator + Sync>(allocator: &'static A) -> Self {
        Self {
            ctx: ptr::from_ref(allocator).cast_mut().cast(),
            alloc: alloc_with::<A>,
            free: free_with::<A>,
        }
    }

    /// Adopt a vtable assembled on the C side.
    ///
    /// # Safety
    /// `alloc` and `free` honor the [`Allocator`] contract for `ctx` for as
    /// long as the returned value (or any copy) is used.
    #[must_use]
    pub const unsafe fn from_raw_parts(ctx: *mut c_void, alloc: FcAllocFn, free: FcFreeFn) -> Self {
        Self { ctx, alloc, free }
    }

    #[must_use]
    pub const fn ctx(&self) -> *mut c_void {
        self.ctx
    }
}

impl Allocator for FcAllocator {
    fn allocate(&self, request: AllocRequest) -> Option<NonNull<u8>> {
        let p = unsafe { (self.alloc)(self.ctx, request.size(), request.align()) };
        NonNull::new(p.cast())
    }

    unsafe fn release(&self, ptr: NonNull<u8>) {
        unsafe { (self.free)(self.ctx, ptr.as_ptr().cast()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TrackingAllocator;
    use fc_layout::TypeShape;

    #[test]
    fn c_shape_is_three_pointers() {
        let TypeShape::Struct { fields, size, .. } = FcAllocator::SHAPE else {
            panic!("vtable must be a struct");
        };
        let names: Vec<_> = fields.iter().map(|f| f.name).collect();
        assert_eq!(names, ["ctx", "alloc", "free"]);
        assert_eq!(fields[1].offset, size_of::<*mut c_void>());
        assert_eq!(size, 3 * size_of::<*mut c_void>());
        assert_eq!(FcAllocator::C_NAME, "FcAllocator");
    }

    #[test]
    fn system_vtable_round_trip() {
        let a = FcAllocator::system();
        let p = a.allocate(AllocRequest::new(48, 16).unwrap()).unwrap();
        assert_eq!(p.as_ptr() as usize % 16, 0);
        unsafe { a.release(p) };
    }

    #[test]
    fn static_allocator_is_reached_through_ctx() {
        static TRACKED: TrackingAllocator<SystemAllocator> = TrackingAllocator::new(SystemAllocator);
        let a = FcAllocator::from_static(&TRACKED);
        let p = a.allocate_raw(24, 8);
        assert!(!p.is_null());
        assert_eq!(TRACKED.stats().allocations, 1);
        unsafe { a.release_raw(p) };
        assert_eq!(TRACKED.stats().releases, 1);
    }

    #[test]
    fn invalid_alignment_is_null_through_the_vtable() {
        let a = FcAllocator::system();
        assert!(unsafe { (a.alloc)(a.ctx, 8, 24) }.is_null());
    }
}
