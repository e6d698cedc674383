use crate::header::{AllocHeader, HEADER_SIZE};
use crate::{AllocRequest, Allocator};
use alloc::alloc::{Layout, alloc, dealloc};
use core::ptr::NonNull;

/// The default allocator: delegates to the process allocator.
///
/// Thread safety is inherited from the process allocator. Each block carries
/// a header in front of the payload so that `release` needs only the pointer.
#[derive(Debug, Default, Copy, Clone)]
pub struct SystemAllocator;

impl SystemAllocator {
    /// Block layout and header lead for `request`.
    ///
    /// The lead is at least one header wide and a multiple of the requested
    /// alignment, so the payload stays aligned.
    fn block(request: AllocRequest) -> Option<(Layout, usize)> {
        let lead = request.align().max(HEADER_SIZE);
        let total = lead.checked_add(request.size())?;
        let layout = Layout::from_size_align(total, lead).ok()?;
        Some((layout, lead))
    }
}

impl Allocator for SystemAllocator {
    fn allocate(&self, request: AllocRequest) -> Option<NonNull<u8>> {
        let Some((layout, lead)) = Self::block(request) else {
            log::warn!("no block layout for {request:?}");
            return None;
        };
        let header = AllocHeader::live(request.size(), lead)?;

        let Some(block) = NonNull::new(unsafe { alloc(layout) }) else {
            log::warn!("process allocator refused {} bytes", layout.size());
            return None;
        };
        let payload = unsafe { block.add(lead) };
        unsafe { header.store(payload) };
        Some(payload)
    }

    unsafe fn release(&self, ptr: NonNull<u8>) {
        let Some(header) = (unsafe { AllocHeader::load(ptr) }) else {
            log::error!("ignoring release of {ptr:p}: not a live block");
            return;
        };
        let lead = header.lead_bytes();
        let Ok(layout) = Layout::from_size_align(lead + header.size_bytes(), lead) else {
            log::error!("ignoring release of {ptr:p}: corrupt block header");
            return;
        };
        unsafe {
            header.retire(ptr);
            dealloc(ptr.as_ptr().sub(lead), layout);
        }
    }

    unsafe fn usable_size(&self, ptr: NonNull<u8>) -> Option<usize> {
        unsafe { AllocHeader::load(ptr) }.map(AllocHeader::size_bytes)
    }
}
