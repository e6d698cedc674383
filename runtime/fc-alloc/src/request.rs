use crate::AllocError;
use crate::header::HEADER_SIZE;

/// Largest alignment an [`AllocRequest`] may ask for.
pub const MAX_ALIGN: usize = 32 * 1024;

/// Largest payload an [`AllocRequest`] may ask for.
///
/// Bounded by the 40-bit size field of the block header and by the address
/// space left after the worst-case header lead.
#[allow(clippy::cast_possible_truncation)]
pub const MAX_SIZE: usize = {
    const HEADER_LIMIT: u64 = (1 << 40) - 1;
    let address_limit = isize::MAX as usize - MAX_ALIGN - HEADER_SIZE;
    if (address_limit as u64) < HEADER_LIMIT {
        address_limit
    } else {
        HEADER_LIMIT as usize
    }
};

/// A validated `(size, align)` pair.
///
/// `align` is a power of two no larger than [`MAX_ALIGN`]. A request for zero
/// bytes is treated as a request for one byte, so every successful allocation
/// yields a distinct, releasable pointer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AllocRequest {
    size: usize,
    align: usize,
}

impl AllocRequest {
    /// # Errors
    /// - [`AllocError::AlignNotPowerOfTwo`] for `align` 0 or not a power of two.
    /// - [`AllocError::AlignTooLarge`] above [`MAX_ALIGN`].
    /// - [`AllocError::SizeTooLarge`] above [`MAX_SIZE`].
    pub const fn new(size: usize, align: usize) -> Result<Self, AllocError> {
        if !align.is_power_of_two() {
            return Err(AllocError::AlignNotPowerOfTwo(align));
        }
        if align > MAX_ALIGN {
            return Err(AllocError::AlignTooLarge(align));
        }
        if size > MAX_SIZE {
            return Err(AllocError::SizeTooLarge(size));
        }
        let size = if size == 0 { 1 } else { size };
        Ok(Self { size, align })
    }

    /// A request sized and aligned for `count` values of `T`.
    ///
    /// # Errors
    /// [`AllocError::SizeTooLarge`] if the array size overflows.
    pub const fn array<T>(count: usize) -> Result<Self, AllocError> {
        match size_of::<T>().checked_mul(count) {
            Some(size) => Self::new(size, align_of::<T>()),
            None => Err(AllocError::SizeTooLarge(usize::MAX)),
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn align(&self) -> usize {
        self.align
    }
}
