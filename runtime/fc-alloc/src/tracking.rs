use crate::{AllocRequest, Allocator};
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};

/// A point-in-time copy of a [`TrackingAllocator`]'s counters.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct AllocStats {
    pub allocations: usize,
    pub releases: usize,
    /// Requests the inner allocator could not satisfy.
    pub failures: usize,
    /// Usable bytes currently allocated.
    pub live_bytes: usize,
    /// High-water mark of `live_bytes`.
    pub peak_bytes: usize,
}

impl AllocStats {
    /// Blocks allocated and not yet released.
    #[must_use]
    pub const fn live_blocks(&self) -> usize {
        self.allocations.saturating_sub(self.releases)
    }
}

/// Wraps another allocator and counts its traffic.
///
/// Byte counts come from [`Allocator::usable_size`]; an inner allocator that
/// does not report sizes contributes block counts only.
#[derive(Debug, Default)]
pub struct TrackingAllocator<A> {
    inner: A,
    allocations: AtomicUsize,
    releases: AtomicUsize,
    failures: AtomicUsize,
    live_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
}

impl<A> TrackingAllocator<A> {
    pub const fn new(inner: A) -> Self {
        Self {
            inner,
            allocations: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            live_bytes: AtomicUsize::new(0),
            peak_bytes: AtomicUsize::new(0),
        }
    }

    pub const fn inner(&self) -> &A {
        &self.inner
    }

    #[must_use]
    pub fn stats(&self) -> AllocStats {
        AllocStats {
            allocations: self.allocations.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            live_bytes: self.live_bytes.load(Ordering::Relaxed),
            peak_bytes: self.peak_bytes.load(Ordering::Relaxed),
        }
    }
}

impl<A: Allocator> Allocator for TrackingAllocator<A> {
    fn allocate(&self, request: AllocRequest) -> Option<NonNull<u8>> {
        let Some(ptr) = self.inner.allocate(request) else {
            self.failures.fetch_add(1, Ordering::Relaxed);
            return None;
        };
        let bytes = unsafe { self.inner.usable_size(ptr) }.unwrap_or(0);
        self.allocations.fetch_add(1, Ordering::Relaxed);
        let live = self.live_bytes.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.peak_bytes.fetch_max(live, Ordering::Relaxed);
        log::trace!("allocate {request:?} -> {ptr:p} ({bytes} usable)");
        Some(ptr)
    }

    unsafe fn release(&self, ptr: NonNull<u8>) {
        let bytes = unsafe { self.inner.usable_size(ptr) }.unwrap_or(0);
        unsafe { self.inner.release(ptr) };
        self.releases.fetch_add(1, Ordering::Relaxed);
        self.live_bytes.fetch_sub(bytes, Ordering::Relaxed);
        log::trace!("release {ptr:p} ({bytes} usable)");
    }

    unsafe fn usable_size(&self, ptr: NonNull<u8>) -> Option<usize> {
        unsafe { self.inner.usable_size(ptr) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FreeListHeap, SystemAllocator};

    #[test]
    fn counts_traffic() {
        let a = TrackingAllocator::new(SystemAllocator);
        let p = a.allocate(AllocRequest::new(100, 8).unwrap()).unwrap();
        let q = a.allocate(AllocRequest::new(50, 8).unwrap()).unwrap();
        assert_eq!(a.stats().live_bytes, 150);
        unsafe { a.release(p) };

        let s = a.stats();
        assert_eq!(s.allocations, 2);
        assert_eq!(s.releases, 1);
        assert_eq!(s.live_blocks(), 1);
        assert_eq!(s.live_bytes, 50);
        assert_eq!(s.peak_bytes, 150);

        unsafe { a.release(q) };
        assert_eq!(a.stats().live_bytes, 0);
    }

    #[test]
    fn counts_failures() {
        let a = TrackingAllocator::new(FreeListHeap::with_capacity(256).unwrap());
        assert!(a.allocate(AllocRequest::new(4096, 8).unwrap()).is_none());
        assert_eq!(a.stats().failures, 1);
        assert_eq!(a.stats().allocations, 0);
    }

    #[test]
    fn wraps_a_reference() {
        let heap = FreeListHeap::with_capacity(4096).unwrap();
        let a = TrackingAllocator::new(&heap);
        let p = a.allocate(AllocRequest::new(10, 4).unwrap()).unwrap();
        assert!(a.stats().live_bytes >= 10);
        unsafe { a.release(p) };
        assert_eq!(heap.free_bytes(), heap.capacity());
    }
}
