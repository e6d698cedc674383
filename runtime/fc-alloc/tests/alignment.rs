use fc_alloc::{
    AllocRequest, Allocator, FcAllocator, FreeListHeap, MAX_ALIGN, SystemAllocator,
    TrackingAllocator,
};
use std::ptr::NonNull;
use std::sync::Arc;
use std::thread;

fn powers_of_two() -> impl Iterator<Item = usize> {
    (0..=MAX_ALIGN.trailing_zeros()).map(|shift| 1usize << shift)
}

/// Allocate a few sizes at every alignment, check the address and that the
/// whole payload is writable, then release everything.
fn exercise(allocator: &dyn Allocator) {
    let mut live: Vec<(NonNull<u8>, usize)> = Vec::new();
    for align in powers_of_two() {
        for size in [1, 7, 64, 1000] {
            let p = allocator
                .allocate(AllocRequest::new(size, align).unwrap())
                .unwrap_or_else(|| panic!("allocate({size}, {align}) failed"));
            assert_eq!(p.as_ptr() as usize % align, 0, "allocate({size}, {align})");
            unsafe { p.as_ptr().write_bytes(0x5A, size) };
            live.push((p, size));
        }
    }
    for (p, size) in live {
        assert_eq!(unsafe { *p.as_ptr().add(size - 1) }, 0x5A);
        unsafe { allocator.release(p) };
    }
}

#[test]
fn system_allocator_honors_every_alignment() {
    exercise(&SystemAllocator);
}

#[test]
fn free_list_heap_honors_every_alignment() {
    let heap = FreeListHeap::with_capacity(4 * 1024 * 1024).unwrap();
    exercise(&heap);
    assert_eq!(heap.free_bytes(), heap.capacity());
    assert_eq!(heap.free_blocks(), 1);
}

#[test]
fn tracking_allocator_honors_every_alignment() {
    let tracked = TrackingAllocator::new(SystemAllocator);
    exercise(&tracked);
    let stats = tracked.stats();
    assert_eq!(stats.allocations, stats.releases);
    assert_eq!(stats.live_bytes, 0);
    assert!(stats.peak_bytes > 0);
}

#[test]
fn vtable_honors_every_alignment() {
    exercise(&FcAllocator::system());
}

#[test]
fn heap_is_shareable_between_threads() {
    let heap = Arc::new(FreeListHeap::with_capacity(1024 * 1024).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let heap = Arc::clone(&heap);
            thread::spawn(move || {
                for i in 0..500 {
                    let size = 16 + (i * 7 + t) % 200;
                    let p = heap.allocate(AllocRequest::new(size, 8).unwrap()).unwrap();
                    unsafe {
                        p.as_ptr().write_bytes(u8::try_from(t).unwrap(), size);
                        assert_eq!(*p.as_ptr(), u8::try_from(t).unwrap());
                        heap.release(p);
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(heap.free_bytes(), heap.capacity());
    assert_eq!(heap.free_blocks(), 1);
}
