//! # Generated safety checks
//!
//! The checks FastC emits in front of operations that could otherwise invoke
//! undefined behavior. Each one either passes its operand through or faults;
//! none returns an error.
//!
//! ```rust
//! use fc_trap::check::{self, Trapping};
//!
//! let xs = [10, 20, 30];
//! check::bounds(2, xs.len());
//! assert_eq!(xs[2], 30);
//! assert_eq!(7i32.trapping_add(5), 12);
//! ```

use crate::{FaultKind, fault};
use core::ptr::NonNull;

/// Fault with [`FaultKind::BoundsCheck`] unless `index < len`.
#[inline]
#[track_caller]
pub fn bounds(index: usize, len: usize) {
    if index >= len {
        fault(FaultKind::BoundsCheck);
    }
}

/// Fault with [`FaultKind::NullPointer`] if `ptr` is null.
#[inline]
#[track_caller]
pub fn non_null<T>(ptr: *const T) -> NonNull<T> {
    match NonNull::new(ptr.cast_mut()) {
        Some(p) => p,
        None => fault(FaultKind::NullPointer),
    }
}

/// Fault with [`FaultKind::DivisionByZero`] if `divisor` is zero.
#[inline]
#[track_caller]
pub fn non_zero<T: Trapping>(divisor: T) -> T {
    if divisor == T::ZERO {
        fault(FaultKind::DivisionByZero);
    }
    divisor
}

/// Unwrap `value` or fault with `kind`.
#[inline]
#[track_caller]
pub fn unwrap_or_fault<T>(value: Option<T>, kind: FaultKind) -> T {
    match value {
        Some(v) => v,
        None => fault(kind),
    }
}

/// Integer arithmetic that faults instead of wrapping.
///
/// Overflow faults with [`FaultKind::Overflow`]; a zero divisor with
/// [`FaultKind::DivisionByZero`]. `MIN / -1` and `MIN % -1` overflow.
pub trait Trapping: Copy + PartialEq {
    const ZERO: Self;

    #[must_use]
    fn trapping_add(self, rhs: Self) -> Self;
    #[must_use]
    fn trapping_sub(self, rhs: Self) -> Self;
    #[must_use]
    fn trapping_mul(self, rhs: Self) -> Self;
    #[must_use]
    fn trapping_div(self, rhs: Self) -> Self;
    #[must_use]
    fn trapping_rem(self, rhs: Self) -> Self;
    #[must_use]
    fn trapping_neg(self) -> Self;
}

macro_rules! impl_trapping {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Trapping for $ty {
                const ZERO: Self = 0;

                #[inline]
                #[track_caller]
                fn trapping_add(self, rhs: Self) -> Self {
                    unwrap_or_fault(self.checked_add(rhs), FaultKind::Overflow)
                }

                #[inline]
                #[track_caller]
                fn trapping_sub(self, rhs: Self) -> Self {
                    unwrap_or_fault(self.checked_sub(rhs), FaultKind::Overflow)
                }

                #[inline]
                #[track_caller]
                fn trapping_mul(self, rhs: Self) -> Self {
                    unwrap_or_fault(self.checked_mul(rhs), FaultKind::Overflow)
                }

                #[inline]
                #[track_caller]
                fn trapping_div(self, rhs: Self) -> Self {
                    let rhs = non_zero(rhs);
                    unwrap_or_fault(self.checked_div(rhs), FaultKind::Overflow)
                }

                #[inline]
                #[track_caller]
                fn trapping_rem(self, rhs: Self) -> Self {
                    let rhs = non_zero(rhs);
                    unwrap_or_fault(self.checked_rem(rhs), FaultKind::Overflow)
                }

                #[inline]
                #[track_caller]
                fn trapping_neg(self) -> Self {
                    unwrap_or_fault(self.checked_neg(), FaultKind::Overflow)
                }
            }
        )*
    };
}

impl_trapping!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passing_checks_are_transparent() {
        bounds(0, 1);
        bounds(4, 5);
        let x = 5u8;
        assert_eq!(non_null(&raw const x).as_ptr().cast_const(), &raw const x);
        assert_eq!(non_zero(3i64), 3);
        assert_eq!(unwrap_or_fault(Some('a'), FaultKind::InvalidValue), 'a');
    }

    #[test]
    fn in_range_arithmetic() {
        assert_eq!(i32::MAX.trapping_sub(1).trapping_add(1), i32::MAX);
        assert_eq!(200u8.trapping_add(55), u8::MAX);
        assert_eq!((-7i16).trapping_mul(3), -21);
        assert_eq!((-7i32).trapping_div(2), -3);
        assert_eq!((-7i32).trapping_rem(2), -1);
        assert_eq!(i64::MAX.trapping_neg(), -i64::MAX);
        assert_eq!(0u32.trapping_neg(), 0);
        assert_eq!(usize::MAX.trapping_div(usize::MAX), 1);
    }
}
