//! # FastC Layout Contract
//!
//! The binary representation FastC values must have so that compiler-emitted
//! code and hand-written C can exchange them across a call boundary without
//! translation. Every rule here is measured against the platform C ABI, not
//! against FastC's own semantics.
//!
//! ## The rules
//!
//! | Value kind | Representation |
//! |------------|----------------|
//! | Fixed struct | Fields in declaration order, each at the next multiple of its alignment; size rounded up to the largest field alignment. No reordering, no hidden fields. |
//! | Tagged enum | A 4-byte C `int`; variant *k* has value *k*. |
//! | Slice | `{ T* data; size_t len; }`, pointer first, length (in elements) second. |
//!
//! ## What this crate provides
//!
//! * [`TargetAbi`] and [`Scalar`]: the widths the rules are expressed in.
//! * [`c_struct_layout`] / [`StructLayout`]: the struct algorithm, as a
//!   `const fn` for compile-time checks and as a runtime computation.
//! * [`EnumLayout`] and [`SliceLayout`]: the enum and slice rules.
//! * [`FcSlice`]: the slice value itself.
//! * [`CLayout`] and `#[derive(CLayout)]`: a type-level record of a type's C
//!   shape. The derive also emits `const` assertions, so a Rust type that
//!   drifts from the C algorithm stops compiling.
//!
//! ## Example
//!
//! ```rust
//! use fc_layout::{CLayout, TypeShape};
//!
//! #[derive(CLayout)]
//! #[repr(C)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let TypeShape::Struct { fields, size, .. } = Point::SHAPE else { unreachable!() };
//! assert_eq!(fields[1].offset, 4);
//! assert_eq!(size, 8);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

extern crate alloc;

// Lets the derive's `::fc_layout` paths resolve inside this crate too.
extern crate self as fc_layout;

mod enum_layout;
mod error;
mod scalar;
mod slice;
mod struct_layout;
mod target;

pub use enum_layout::{ENUM_REPR_SIZE, EnumLayout};
pub use error::LayoutError;
pub use scalar::Scalar;
pub use slice::{FcSlice, SLICE_ELEMENTS, SliceElement, SliceLayout, slice_c_name};
pub use struct_layout::{FieldLayout, StructLayout, StructShape, align_up, c_struct_layout};
pub use target::{DataModel, TargetAbi};

pub use fc_layout_derive::CLayout;

/// One field of a struct as seen from C.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldDesc {
    pub name: &'static str,
    pub offset: usize,
    pub layout: FieldLayout,
}

/// The C shape of a type implementing [`CLayout`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Struct {
        fields: &'static [FieldDesc],
        size: usize,
        align: usize,
    },
    Enum {
        /// Variant names; the index is the discriminant.
        variants: &'static [&'static str],
    },
}

impl TypeShape {
    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            Self::Struct { size, .. } => *size,
            Self::Enum { .. } => ENUM_REPR_SIZE,
        }
    }

    #[must_use]
    pub const fn align(&self) -> usize {
        match self {
            Self::Struct { align, .. } => *align,
            Self::Enum { .. } => ENUM_REPR_SIZE,
        }
    }
}

/// A type whose memory representation follows the layout contract.
///
/// Prefer `#[derive(CLayout)]`, which checks the claim at compile time.
///
/// # Safety
/// [`SHAPE`](Self::SHAPE) must describe the type's actual layout: the same
/// field offsets, size and alignment, or for enums the same discriminants.
/// Code on the C side relies on it.
pub unsafe trait CLayout {
    /// Name of the type in C declarations.
    const C_NAME: &'static str;
    const SHAPE: TypeShape;
}
