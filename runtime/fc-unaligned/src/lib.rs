//! # Unaligned Access Primitives
//!
//! Reads and writes of multi-byte integers at arbitrary byte addresses.
//!
//! Generated code uses these whenever it stores a typed value into a byte
//! buffer whose alignment cannot be proven at compile time: serialized
//! buffers, type-erased byte arrays, packed records.
//!
//! ## How the access works
//!
//! Every access goes through a naturally aligned scratch value on the stack:
//!
//! ```text
//!   buffer:  .. | b0 | b1 | b2 | b3 | ..      (any address)
//!                  │    │    │    │
//!                  ▼    ▼    ▼    ▼  byte copy
//!   scratch:     [ b0 | b1 | b2 | b3 ]        (aligned local)
//!                        │
//!                        ▼  from_ne_bytes
//!                     u32 value
//! ```
//!
//! The buffer address is never reinterpreted as `*const u32`. A typed load at
//! a misaligned address faults on strict-alignment targets and is undefined
//! behavior everywhere; the byte copy is portable and optimizes to a single
//! unaligned load where the target allows it.
//!
//! ## Contract
//!
//! * No alignment precondition on the address or offset.
//! * Bounds are **not** checked. The caller guarantees that
//!   `offset + size_of::<T>()` bytes are valid for the access.
//! * Host byte order; no endianness conversion.
//!
//! ## Example
//!
//! ```rust
//! use fc_unaligned::{read_at, write_at};
//!
//! let mut buf = [0u8; 8];
//! unsafe {
//!     write_at::<u32>(buf.as_mut_ptr(), 1, 0xDEAD_BEEF);
//!     assert_eq!(read_at::<u32>(buf.as_ptr(), 1), 0xDEAD_BEEF);
//! }
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code, clippy::inline_always)]

use core::ptr;

/// Sealed trait pattern to restrict [`UnalignedInt`] impls to the integer widths
/// the runtime supports.
mod sealed {
    pub trait Sealed {}
}

/// An integer type that can be moved through an unaligned byte address.
pub trait UnalignedInt: sealed::Sealed + Copy {
    /// Width of the value in bytes.
    const WIDTH: usize;

    /// Copy `WIDTH` bytes from `src` into an aligned scratch value.
    ///
    /// # Safety
    /// `src` must be valid for reads of `WIDTH` bytes. No alignment is required.
    unsafe fn read_from(src: *const u8) -> Self;

    /// Copy the bytes of `self` to `dst`.
    ///
    /// # Safety
    /// `dst` must be valid for writes of `WIDTH` bytes. No alignment is required.
    unsafe fn write_to(self, dst: *mut u8);
}

macro_rules! impl_unaligned_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl UnalignedInt for $ty {
                const WIDTH: usize = size_of::<$ty>();

                #[inline(always)]
                unsafe fn read_from(src: *const u8) -> Self {
                    let mut scratch = [0u8; size_of::<$ty>()];
                    unsafe {
                        copy_bytes(scratch.as_mut_ptr(), src, Self::WIDTH);
                    }
                    <$ty>::from_ne_bytes(scratch)
                }

                #[inline(always)]
                unsafe fn write_to(self, dst: *mut u8) {
                    let scratch = self.to_ne_bytes();
                    unsafe {
                        copy_bytes(dst, scratch.as_ptr(), Self::WIDTH);
                    }
                }
            }
        )*
    };
}

impl_unaligned_int!(u16, u32, u64, i16, i32, i64);

/// Copy `n` bytes from `src` to `dst`.
///
/// This is the runtime's `memcpy`: a plain byte copy with no alignment
/// requirement on either side.
///
/// # Safety
/// - `src` must be valid for reads of `n` bytes.
/// - `dst` must be valid for writes of `n` bytes.
/// - The two ranges must not overlap.
#[inline(always)]
pub unsafe fn copy_bytes(dst: *mut u8, src: *const u8, n: usize) {
    unsafe {
        ptr::copy_nonoverlapping(src, dst, n);
    }
}

/// Read a `T` located `offset` bytes past `buf`.
///
/// # Safety
/// `buf + offset .. buf + offset + T::WIDTH` must be readable.
#[inline(always)]
#[must_use]
pub unsafe fn read_at<T: UnalignedInt>(buf: *const u8, offset: usize) -> T {
    unsafe { T::read_from(buf.add(offset)) }
}

/// Write `value` at `offset` bytes past `buf`.
///
/// # Safety
/// `buf + offset .. buf + offset + T::WIDTH` must be writable.
#[inline(always)]
pub unsafe fn write_at<T: UnalignedInt>(buf: *mut u8, offset: usize, value: T) {
    unsafe { value.write_to(buf.add(offset)) }
}

/// Read a `u16` from a possibly unaligned address.
///
/// # Safety
/// `src` must be valid for reads of 2 bytes.
#[inline(always)]
#[must_use]
pub unsafe fn read_u16(src: *const u8) -> u16 {
    unsafe { u16::read_from(src) }
}

/// Read a `u32` from a possibly unaligned address.
///
/// # Safety
/// `src` must be valid for reads of 4 bytes.
#[inline(always)]
#[must_use]
pub unsafe fn read_u32(src: *const u8) -> u32 {
    unsafe { u32::read_from(src) }
}

/// Read a `u64` from a possibly unaligned address.
///
/// # Safety
/// `src` must be valid for reads of 8 bytes.
#[inline(always)]
#[must_use]
pub unsafe fn read_u64(src: *const u8) -> u64 {
    unsafe { u64::read_from(src) }
}

/// Write a `u16` to a possibly unaligned address.
///
/// # Safety
/// `dst` must be valid for writes of 2 bytes.
#[inline(always)]
pub unsafe fn write_u16(dst: *mut u8, value: u16) {
    unsafe { value.write_to(dst) }
}

/// Write a `u32` to a possibly unaligned address.
///
/// # Safety
/// `dst` must be valid for writes of 4 bytes.
#[inline(always)]
pub unsafe fn write_u32(dst: *mut u8, value: u32) {
    unsafe { value.write_to(dst) }
}

/// Write a `u64` to a possibly unaligned address.
///
/// # Safety
/// `dst` must be valid for writes of 8 bytes.
#[inline(always)]
pub unsafe fn write_u64(dst: *mut u8, value: u64) {
    unsafe { value.write_to(dst) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadbeef_at_odd_offset() {
        let mut buf = [0u8; 8];
        unsafe {
            write_at::<u32>(buf.as_mut_ptr(), 1, 0xDEAD_BEEF);
            assert_eq!(read_at::<u32>(buf.as_ptr(), 1), 0xDEAD_BEEF);
        }
        // neighbors untouched
        assert_eq!(buf[0], 0);
        assert_eq!(&buf[5..], &[0, 0, 0]);
    }

    #[test]
    fn every_offset_of_every_width() {
        let mut buf = [0u8; 24];
        for off in 0..=buf.len() - 8 {
            unsafe {
                write_u16(buf.as_mut_ptr().add(off), 0xBEEF);
                assert_eq!(read_u16(buf.as_ptr().add(off)), 0xBEEF);

                write_u32(buf.as_mut_ptr().add(off), 0x0102_0304);
                assert_eq!(read_u32(buf.as_ptr().add(off)), 0x0102_0304);

                write_u64(buf.as_mut_ptr().add(off), 0x1122_3344_5566_7788);
                assert_eq!(read_u64(buf.as_ptr().add(off)), 0x1122_3344_5566_7788);
            }
        }
    }

    #[test]
    fn host_byte_order_is_preserved() {
        let mut buf = [0u8; 5];
        unsafe { write_at::<u32>(buf.as_mut_ptr(), 1, 0x0A0B_0C0D) };
        assert_eq!(&buf[1..], &0x0A0B_0C0Du32.to_ne_bytes());
    }

    #[test]
    fn signed_values_keep_their_sign() {
        let mut buf = [0u8; 11];
        unsafe {
            write_at::<i16>(buf.as_mut_ptr(), 1, -2);
            assert_eq!(read_at::<i16>(buf.as_ptr(), 1), -2);
            write_at::<i64>(buf.as_mut_ptr(), 3, i64::MIN);
            assert_eq!(read_at::<i64>(buf.as_ptr(), 3), i64::MIN);
        }
    }

    #[test]
    fn copy_bytes_moves_exactly_n() {
        let src = [1u8, 2, 3, 4, 5];
        let mut dst = [0u8; 5];
        unsafe { copy_bytes(dst.as_mut_ptr().add(1), src.as_ptr(), 3) };
        assert_eq!(dst, [0, 1, 2, 3, 0]);
    }
}
