//! # Free-list heap
//!
//! A fixed region carved up first-fit. Free blocks are kept in a singly linked
//! list sorted by address, with the list node stored in the free block itself:
//!
//! ```text
//! free block                        allocated block
//! ┌──────────┬─────────────────┐    ┌──── lead ────┬────────┬──────────┐
//! │ ListNode │ (unused)        │    │ padding      │ header │ payload  │
//! └──────────┴─────────────────┘    └──────────────┴────────┴──────────┘
//! ◄──────── node.size ─────────►    ◄──────────── block ──────────────►
//! ```
//!
//! Every block boundary is a multiple of [`GRANULE`], so any block, once
//! released, can hold a `ListNode` again. Releasing reinserts the block in
//! address order and merges it with free neighbors.

use crate::header::{AllocHeader, HEADER_SIZE};
use crate::spin_lock::SpinLock;
use crate::{AllocError, AllocRequest, Allocator};
use alloc::alloc::{Layout, alloc, dealloc};
use core::ptr::{self, NonNull, null_mut};
use fc_layout::align_up;

/// Header of a **free** block.
#[repr(C)]
struct ListNode {
    /// Total bytes of the free block, this node included.
    size: usize,
    next: *mut ListNode,
}

/// Block boundary granularity.
const GRANULE: usize = size_of::<ListNode>();

const _: () = assert!(GRANULE >= HEADER_SIZE && GRANULE.is_power_of_two());

/// Alignment of regions reserved by [`FreeListHeap::with_capacity`].
const REGION_ALIGN: usize = 4096;

/// An allocated block, by address.
#[derive(Debug, Copy, Clone)]
struct Block {
    start: usize,
    payload: usize,
    end: usize,
}

/// Address-ordered free list.
///
/// # Invariants
/// - Free blocks are non-overlapping, lie within the heap region and are
///   not adjacent (adjacent blocks are merged).
/// - Every block starts and ends on a [`GRANULE`] boundary.
/// - `head` is a sentinel; the first real block is at `head.next`.
struct FreeList {
    head: ListNode,
    free_bytes: usize,
}

// Safety: the list is only reached through the heap's `SpinLock`.
unsafe impl Send for FreeList {}

impl FreeList {
    const fn new() -> Self {
        Self {
            head: ListNode {
                size: 0,
                next: null_mut(),
            },
            free_bytes: 0,
        }
    }

    /// Insert `[addr, addr + size)` in address order and merge neighbors.
    ///
    /// # Safety
    /// The range is writable, not free yet, [`GRANULE`]-aligned at both ends
    /// and at least one `GRANULE` long.
    unsafe fn insert(&mut self, addr: usize, size: usize) {
        let mut prev = &raw mut self.head;
        let mut current = unsafe { (*prev).next };
        while !current.is_null() && (current as usize) < addr {
            prev = current;
            current = unsafe { (*current).next };
        }
        let node = addr as *mut ListNode;
        unsafe {
            node.write(ListNode {
                size,
                next: current,
            });
            (*prev).next = node;
        }
        self.free_bytes += size;
        unsafe { self.coalesce(prev) };
    }

    /// Merge the block after `prev` with its successor, then with `prev`.
    ///
    /// # Safety
    /// `prev` is a node of this list (possibly the sentinel).
    unsafe fn coalesce(&mut self, prev: *mut ListNode) {
        let curr = unsafe { (*prev).next };
        if curr.is_null() {
            return;
        }
        unsafe {
            let next = (*curr).next;
            if !next.is_null() && curr as usize + (*curr).size == next as usize {
                (*curr).size += (*next).size;
                (*curr).next = (*next).next;
            }
            if !ptr::eq(prev, &raw const self.head) && prev as usize + (*prev).size == curr as usize
            {
                (*prev).size += (*curr).size;
                (*prev).next = (*curr).next;
            }
        }
    }

    /// Where a payload of `size` bytes aligned to `align` fits in `[start, end)`.
    fn fit(start: usize, end: usize, size: usize, align: usize) -> Option<Block> {
        let payload = align_up(start.checked_add(HEADER_SIZE)?, align)?;
        let block_end = align_up(payload.checked_add(size)?, GRANULE)?;
        (block_end <= end).then_some(Block {
            start,
            payload,
            end: block_end,
        })
    }

    /// Remove the first block that fits and return the unused tail to the list.
    ///
    /// # Safety
    /// The list invariants hold; `align` is a power of two `>= HEADER_SIZE`.
    unsafe fn take(&mut self, size: usize, align: usize) -> Option<Block> {
        let mut prev = &raw mut self.head;
        let mut current = unsafe { (*prev).next };
        while !current.is_null() {
            let start = current as usize;
            let end = start + unsafe { (*current).size };
            if let Some(block) = Self::fit(start, end, size, align) {
                unsafe { (*prev).next = (*current).next };
                self.free_bytes -= end - start;
                if block.end < end {
                    unsafe { self.insert(block.end, end - block.end) };
                }
                return Some(block);
            }
            prev = current;
            current = unsafe { (*current).next };
        }
        None
    }

    fn blocks(&self) -> usize {
        let mut n = 0;
        let mut current = self.head.next;
        while !current.is_null() {
            n += 1;
            current = unsafe { (*current).next };
        }
        n
    }
}

/// A first-fit allocator over one fixed memory region.
///
/// Safe to share between threads: the free list sits behind a spin lock.
/// Block headers let `release` validate its argument; a pointer that does not
/// carry a live header or lies outside the region is logged and ignored.
pub struct FreeListHeap {
    free: SpinLock<FreeList>,
    start: usize,
    end: usize,
    /// Set when the region was reserved by [`with_capacity`](Self::with_capacity).
    owned: Option<(NonNull<u8>, Layout)>,
}

// Safety: all mutation goes through `free`; the region bounds are immutable.
unsafe impl Send for FreeListHeap {}
unsafe impl Sync for FreeListHeap {}

impl FreeListHeap {
    /// Reserve a region of `capacity` bytes from the process allocator.
    ///
    /// The region is returned to the process allocator on drop.
    ///
    /// # Errors
    /// [`AllocError::RegionUnavailable`] if the region cannot be reserved.
    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        let layout = Layout::from_size_align(capacity.max(GRANULE), REGION_ALIGN)
            .map_err(|_| AllocError::RegionUnavailable(capacity))?;
        let region =
            NonNull::new(unsafe { alloc(layout) }).ok_or(AllocError::RegionUnavailable(capacity))?;
        let mut heap = unsafe { Self::from_raw_region(region, layout.size()) };
        heap.owned = Some((region, layout));
        Ok(heap)
    }

    /// Manage the caller-provided region `[start, start + len)`.
    ///
    /// The region is trimmed inward to [`GRANULE`] boundaries. A region too
    /// small for a single block yields a heap on which every allocation fails.
    ///
    /// # Safety
    /// The region is valid, writable and exclusive to the heap for as long as
    /// the heap lives.
    pub unsafe fn from_raw_region(start: NonNull<u8>, len: usize) -> Self {
        let raw_start = start.as_ptr() as usize;
        let begin = align_up(raw_start, GRANULE).unwrap_or(usize::MAX);
        let end = raw_start.saturating_add(len) & !(GRANULE - 1);

        let mut free = FreeList::new();
        let (begin, end) = if begin < end {
            unsafe { free.insert(begin, end - begin) };
            (begin, end)
        } else {
            (begin, begin)
        };
        log::debug!(
            "free-list heap: {} bytes at {begin:#x}..{end:#x}",
            end - begin
        );

        Self {
            free: SpinLock::new(free),
            start: begin,
            end,
            owned: None,
        }
    }

    /// Managed bytes (after trimming).
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.end - self.start
    }

    /// Bytes currently on the free list.
    #[must_use]
    pub fn free_bytes(&self) -> usize {
        self.free.with_lock(|list| list.free_bytes)
    }

    /// Number of blocks on the free list.
    #[must_use]
    pub fn free_blocks(&self) -> usize {
        self.free.with_lock(|list| list.blocks())
    }

    fn contains(&self, start: usize, end: usize) -> bool {
        self.start <= start && start < end && end <= self.end
    }
}

impl Allocator for FreeListHeap {
    fn allocate(&self, request: AllocRequest) -> Option<NonNull<u8>> {
        let align = request.align().max(HEADER_SIZE);
        let found = self
            .free
            .with_lock(|list| unsafe { list.take(request.size(), align) });
        let Some(block) = found else {
            log::warn!(
                "free-list heap exhausted: no fit for {} bytes aligned to {}",
                request.size(),
                request.align()
            );
            return None;
        };

        let payload = NonNull::new(block.payload as *mut u8)?;
        let Some(header) = AllocHeader::live(block.end - block.payload, block.payload - block.start)
        else {
            // Unreachable for requests within MAX_ALIGN; hand the block back.
            self.free
                .with_lock(|list| unsafe { list.insert(block.start, block.end - block.start) });
            return None;
        };
        unsafe { header.store(payload) };
        Some(payload)
    }

    unsafe fn release(&self, ptr: NonNull<u8>) {
        let addr = ptr.as_ptr() as usize;
        if !self.contains(addr.saturating_sub(HEADER_SIZE), addr) {
            log::error!("ignoring release of {ptr:p}: outside the heap");
            return;
        }
        let Some(header) = (unsafe { AllocHeader::load(ptr) }) else {
            log::error!("ignoring release of {ptr:p}: not a live block");
            return;
        };
        let start = addr.wrapping_sub(header.lead_bytes());
        let end = addr.saturating_add(header.size_bytes());
        if !self.contains(start, end) || start % GRANULE != 0 || end % GRANULE != 0 {
            log::error!("ignoring release of {ptr:p}: corrupt block header");
            return;
        }

        unsafe { header.retire(ptr) };
        self.free
            .with_lock(|list| unsafe { list.insert(start, end - start) });
    }

    unsafe fn usable_size(&self, ptr: NonNull<u8>) -> Option<usize> {
        unsafe { AllocHeader::load(ptr) }.map(AllocHeader::size_bytes)
    }
}

impl Drop for FreeListHeap {
    fn drop(&mut self) {
        if let Some((region, layout)) = self.owned.take() {
            unsafe { dealloc(region.as_ptr(), layout) };
        }
    }
}

impl core::fmt::Debug for FreeListHeap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FreeListHeap")
            .field("start", &(self.start as *const u8))
            .field("capacity", &self.capacity())
            .field("free_bytes", &self.free_bytes())
            .finish_non_exhaustive()
    }
}
