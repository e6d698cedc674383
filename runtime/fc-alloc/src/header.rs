//! # Block header
//!
//! Every block handed out by [`SystemAllocator`](crate::SystemAllocator) or
//! [`FreeListHeap`](crate::FreeListHeap) is preceded by one 8-byte word:
//!
//! ```text
//!  block start                       payload (returned pointer)
//!  │                                 │
//!  ▼                                 ▼
//! ┌─────────── lead ───────┬────────┬───────────────── size ───────┐
//! │ padding (if any)       │ header │ payload                      │
//! └────────────────────────┴────────┴──────────────────────────────┘
//!                           ◄─ 8 B ─►
//! ```
//!
//! `release` receives only the payload pointer; the header gives back how
//! far the block starts before it and how many payload bytes it spans.
//! The word is read and written by byte copy, so a corrupt or foreign
//! pointer is at worst garbage, never a misaligned typed load.

use bitfield_struct::bitfield;
use core::ptr::NonNull;

/// Width of the header word.
pub(crate) const HEADER_SIZE: usize = size_of::<u64>();

/// Marks a header that belongs to a live block.
const LIVE: u8 = 0xFC;

#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub(crate) struct AllocHeader {
    /// Usable payload bytes.
    #[bits(40)]
    size: u64,
    /// Distance from block start to payload.
    lead: u16,
    /// [`LIVE`] while the block is allocated.
    magic: u8,
}

impl AllocHeader {
    /// Header of a live block, or `None` if the values do not fit the fields.
    pub(crate) fn live(size: usize, lead: usize) -> Option<Self> {
        let size = u64::try_from(size).ok().filter(|&s| s < 1 << 40)?;
        let lead = u16::try_from(lead).ok()?;
        Some(Self::new().with_size(size).with_lead(lead).with_magic(LIVE))
    }

    #[inline]
    pub(crate) fn size_bytes(self) -> usize {
        // Fits: only ever set from a `usize`.
        usize::try_from(self.size()).unwrap_or(usize::MAX)
    }

    #[inline]
    pub(crate) fn lead_bytes(self) -> usize {
        usize::from(self.lead())
    }

    /// Write the header in front of `payload`.
    ///
    /// # Safety
    /// The [`HEADER_SIZE`] bytes before `payload` belong to the same block.
    pub(crate) unsafe fn store(self, payload: NonNull<u8>) {
        unsafe { fc_unaligned::write_u64(payload.as_ptr().sub(HEADER_SIZE), self.into_bits()) }
    }

    /// Read the header in front of `payload` if it marks a live block.
    ///
    /// # Safety
    /// The [`HEADER_SIZE`] bytes before `payload` are readable.
    pub(crate) unsafe fn load(payload: NonNull<u8>) -> Option<Self> {
        let word = unsafe { fc_unaligned::read_u64(payload.as_ptr().sub(HEADER_SIZE)) };
        let header = Self::from_bits(word);
        (header.magic() == LIVE).then_some(header)
    }

    /// Clear the live mark so a second release of the same block is noticed.
    ///
    /// # Safety
    /// As for [`store`](Self::store).
    pub(crate) unsafe fn retire(self, payload: NonNull<u8>) {
        unsafe { self.with_magic(0).store(payload) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_round_trip_through_the_word() {
        let h = AllocHeader::live(1_000_000, 64).unwrap();
        let h = AllocHeader::from_bits(h.into_bits());
        assert_eq!(h.size_bytes(), 1_000_000);
        assert_eq!(h.lead_bytes(), 64);
        assert_eq!(h.magic(), LIVE);
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert!(AllocHeader::live(8, 70_000).is_none());
        #[cfg(target_pointer_width = "64")]
        assert!(AllocHeader::live(1 << 40, 8).is_none());
    }

    #[test]
    fn store_load_retire() {
        let mut buf = [0u8; 24];
        let payload = NonNull::new(buf.as_mut_ptr().wrapping_add(HEADER_SIZE + 3)).unwrap();
        let h = AllocHeader::live(5, HEADER_SIZE).unwrap();
        unsafe {
            h.store(payload);
            assert_eq!(AllocHeader::load(payload), Some(h));
            h.retire(payload);
            assert_eq!(AllocHeader::load(payload), None);
        }
    }

    #[test]
    fn zeroed_memory_is_not_live() {
        let buf = [0u8; 16];
        let payload = NonNull::new(buf.as_ptr().wrapping_add(HEADER_SIZE).cast_mut()).unwrap();
        assert_eq!(unsafe { AllocHeader::load(payload) }, None);
    }
}
